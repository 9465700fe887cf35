// Position frame codec for the arm microcontroller
//
// Frame format (12 bytes, no header, no checksum):
// [m1_lo, m1_hi, m2_lo, m2_hi, ..., m6_lo, m6_hi]
// One little-endian u16 per motor, in ARM_MOTOR_IDS order.

/// Number of motors carried by every frame
pub const MOTOR_COUNT: usize = 6;

/// Size of a complete frame in bytes
pub const FRAME_LEN: usize = MOTOR_COUNT * 2;

/// Error types for frame encoding/decoding
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    #[error("Expected {expected} motor positions, got {got}")]
    WrongCount { expected: usize, got: usize },

    #[error("Position {value} at slot {slot} does not fit in 16 bits")]
    ValueOutOfRange { slot: usize, value: u32 },

    #[error("Expected a {expected}-byte frame, got {got} bytes")]
    FrameLength { expected: usize, got: usize },
}

pub type Result<T> = std::result::Result<T, CodecError>;

/// A complete position frame, ready to be written to the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame([u8; FRAME_LEN]);

impl Frame {
    pub fn as_bytes(&self) -> &[u8; FRAME_LEN] {
        &self.0
    }

    /// Position carried in the given slot (0 = first motor in wire order)
    pub fn position(&self, slot: usize) -> Option<u16> {
        if slot >= MOTOR_COUNT {
            return None;
        }
        Some(u16::from_le_bytes([self.0[slot * 2], self.0[slot * 2 + 1]]))
    }
}

impl AsRef<[u8]> for Frame {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Encode the positions of all motors into a frame
///
/// Values are taken as `u32` so that out-of-range inputs can be reported
/// instead of being truncated.
pub fn encode(positions: &[u32]) -> Result<Frame> {
    if positions.len() != MOTOR_COUNT {
        return Err(CodecError::WrongCount {
            expected: MOTOR_COUNT,
            got: positions.len(),
        });
    }

    let mut bytes = [0u8; FRAME_LEN];
    for (slot, &value) in positions.iter().enumerate() {
        let value = u16::try_from(value).map_err(|_| CodecError::ValueOutOfRange { slot, value })?;
        bytes[slot * 2..slot * 2 + 2].copy_from_slice(&value.to_le_bytes());
    }

    Ok(Frame(bytes))
}

/// Decode a frame back into motor positions (telemetry direction)
pub fn decode(bytes: &[u8]) -> Result<[u16; MOTOR_COUNT]> {
    if bytes.len() != FRAME_LEN {
        return Err(CodecError::FrameLength {
            expected: FRAME_LEN,
            got: bytes.len(),
        });
    }

    let mut positions = [0u16; MOTOR_COUNT];
    for (slot, chunk) in bytes.chunks_exact(2).enumerate() {
        positions[slot] = u16::from_le_bytes([chunk[0], chunk[1]]);
    }
    Ok(positions)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_layout() {
        let frame = encode(&[100, 0x1234, 0, 65535, 1, 256]).unwrap();
        let bytes = frame.as_bytes();
        assert_eq!(bytes.len(), 12);
        assert_eq!(&bytes[0..2], &[100, 0]);
        assert_eq!(&bytes[2..4], &[0x34, 0x12]); // little-endian
        assert_eq!(&bytes[6..8], &[0xFF, 0xFF]);
        assert_eq!(&bytes[10..12], &[0x00, 0x01]);
        assert_eq!(frame.position(0), Some(100));
        assert_eq!(frame.position(6), None);
    }

    #[test]
    fn test_encode_is_deterministic() {
        let positions = [1, 2, 3, 4, 5, 6];
        assert_eq!(encode(&positions).unwrap(), encode(&positions).unwrap());
    }

    #[test]
    fn test_encode_rejects_wrong_count() {
        assert_eq!(
            encode(&[1, 2, 3, 4, 5]),
            Err(CodecError::WrongCount { expected: 6, got: 5 })
        );
        assert_eq!(
            encode(&[0; 7]),
            Err(CodecError::WrongCount { expected: 6, got: 7 })
        );
    }

    #[test]
    fn test_encode_rejects_value_above_16_bits() {
        assert_eq!(
            encode(&[0, 0, 70000, 0, 0, 0]),
            Err(CodecError::ValueOutOfRange { slot: 2, value: 70000 })
        );
    }

    #[test]
    fn test_decode_inverts_encode() {
        let positions = [0u16, 1, 4095, 32768, 65534, 65535];
        let wide: Vec<u32> = positions.iter().map(|&p| p as u32).collect();
        let frame = encode(&wide).unwrap();
        assert_eq!(decode(frame.as_bytes()).unwrap(), positions);
    }

    #[test]
    fn test_decode_rejects_short_frame() {
        assert_eq!(
            decode(&[0u8; 11]),
            Err(CodecError::FrameLength { expected: 12, got: 11 })
        );
    }
}
