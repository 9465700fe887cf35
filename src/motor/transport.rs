// Serial link to the arm microcontroller
//
// Fire-and-forget: one frame per write, no acknowledgment, no retry.
// If the port cannot be opened the transport stays in degraded mode and
// every send reports NotReady.
//
// Frames carry no header, so the firmware finds boundaries by counting
// bytes. A write that times out after part of a frame went out shifts every
// later frame; that case is reported as PartialFrame and the firmware needs
// a resync (reset the board or reopen the port).

use serialport::{self, SerialPort};
use std::io::{self, Write};
use std::time::Duration;
use tracing::{debug, error, info, warn};

use super::codec::{FRAME_LEN, Frame};

/// Error types for the serial link
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("Serial link is not open")]
    NotReady,

    #[error("Serial write failed: {0}")]
    Write(#[from] std::io::Error),

    #[error("Only {written} of {} frame bytes written, framing lost: {source}", FRAME_LEN)]
    PartialFrame { written: usize, source: io::Error },

    #[error("Serial port error: {0}")]
    Open(#[from] serialport::Error),
}

pub type Result<T> = std::result::Result<T, TransportError>;

/// Anything that can deliver a position frame to the arm
pub trait FrameSink {
    fn send(&mut self, frame: &Frame) -> Result<()>;

    fn is_ready(&self) -> bool;
}

/// Serial port transport
pub struct SerialTransport {
    port_name: String,
    port: Option<Box<dyn SerialPort>>,
}

impl SerialTransport {
    /// Try to open the serial link once
    ///
    /// Never fails: a port that cannot be opened leaves the transport
    /// disconnected so the controller keeps running without hardware.
    pub fn open(port_name: &str, baudrate: u32, timeout: Duration) -> Self {
        match Self::try_open(port_name, baudrate, timeout) {
            Ok(transport) => {
                info!("Connected to {} at {} baud", port_name, baudrate);
                transport
            }
            Err(e) => {
                warn!("Failed to connect to {}: {}", port_name, e);
                Self {
                    port_name: port_name.to_string(),
                    port: None,
                }
            }
        }
    }

    /// Open the serial link, reporting failure to the caller
    pub fn try_open(port_name: &str, baudrate: u32, timeout: Duration) -> Result<Self> {
        let port = serialport::new(port_name, baudrate)
            .timeout(timeout)
            .open()?;

        Ok(Self {
            port_name: port_name.to_string(),
            port: Some(port),
        })
    }

    /// A transport with no link behind it
    pub fn disconnected() -> Self {
        Self {
            port_name: String::new(),
            port: None,
        }
    }

    pub fn port_name(&self) -> &str {
        &self.port_name
    }
}

impl FrameSink for SerialTransport {
    fn send(&mut self, frame: &Frame) -> Result<()> {
        let port = self.port.as_mut().ok_or(TransportError::NotReady)?;
        write_frame(port.as_mut(), frame)?;
        debug!("Sent frame {:02X?}", frame.as_bytes());
        Ok(())
    }

    fn is_ready(&self) -> bool {
        self.port.is_some()
    }
}

/// Write one frame, telling a clean failure apart from a torn frame
fn write_frame<W: Write + ?Sized>(out: &mut W, frame: &Frame) -> Result<()> {
    let bytes = frame.as_bytes();
    let mut written = 0;

    while written < bytes.len() {
        match out.write(&bytes[written..]) {
            Ok(0) => return Err(write_failed(written, io::ErrorKind::WriteZero.into())),
            Ok(n) => written += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(write_failed(written, e)),
        }
    }

    out.flush()?;
    Ok(())
}

fn write_failed(written: usize, source: io::Error) -> TransportError {
    if written == 0 {
        return TransportError::Write(source);
    }
    error!(
        "Frame torn after {} of {} bytes, arm framing is out of sync",
        written, FRAME_LEN
    );
    TransportError::PartialFrame { written, source }
}

impl Drop for SerialTransport {
    fn drop(&mut self) {
        // Release the device handle explicitly so the port is not left locked
        if let Some(mut port) = self.port.take() {
            if let Err(e) = port.flush() {
                warn!("Failed to flush {} on close: {}", self.port_name, e);
            }
            info!("Closed serial link {}", self.port_name);
        }
    }
}
