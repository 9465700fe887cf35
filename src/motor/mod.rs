// Motor state for the six-axis arm
//
// Provides:
// - Motor identity and target position tracking
// - Position frame codec (wire format to the microcontroller)
// - Serial transport

pub mod codec;
pub mod transport;

use std::fmt;
use std::str::FromStr;

use crate::error::{ArmError, Result};

pub use codec::{CodecError, FRAME_LEN, Frame, MOTOR_COUNT};
pub use transport::{FrameSink, SerialTransport, TransportError};

/// Identifier of one arm axis, displayed as `motor<N>`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MotorId(pub u8);

/// All arm motors, in the order they appear in a frame
pub const ARM_MOTOR_IDS: [MotorId; MOTOR_COUNT] = [
    MotorId(1),
    MotorId(2),
    MotorId(3),
    MotorId(4),
    MotorId(5),
    MotorId(6),
];

impl fmt::Display for MotorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "motor{}", self.0)
    }
}

impl FromStr for MotorId {
    type Err = ArmError;

    /// Only the canonical spelling is accepted: `motor1`, not `motor01` or `motor+1`
    fn from_str(s: &str) -> Result<Self> {
        s.strip_prefix("motor")
            .filter(|n| n.bytes().all(|b| b.is_ascii_digit()))
            .filter(|n| *n == "0" || !n.starts_with('0'))
            .and_then(|n| n.parse::<u8>().ok())
            .map(MotorId)
            .ok_or_else(|| ArmError::UnknownMotor(s.to_string()))
    }
}

/// One controllable axis
#[derive(Debug, Clone)]
pub struct Motor {
    id: MotorId,
    name: String,
    position: u16,
    enabled: bool,
}

impl Motor {
    pub fn new(id: MotorId) -> Self {
        Self {
            id,
            name: id.to_string(),
            position: 0,
            enabled: false,
        }
    }

    pub fn id(&self) -> MotorId {
        self.id
    }

    /// Update the target position
    ///
    /// Out-of-range values are rejected rather than clamped so the caller's
    /// slider never disagrees with what is transmitted.
    pub fn set_position(&mut self, value: i64) -> Result<()> {
        self.position = u16::try_from(value)
            .map_err(|_| ArmError::PositionOutOfRange { id: self.id, value })?;
        Ok(())
    }

    pub fn position(&self) -> u16 {
        self.position
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Enabled/calibrated status
    pub fn status(&self) -> bool {
        self.enabled
    }

    pub fn set_status(&mut self, enabled: bool) {
        self.enabled = enabled;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_motor_id_display_and_parse() {
        assert_eq!(MotorId(3).to_string(), "motor3");
        assert_eq!("motor6".parse::<MotorId>().unwrap(), MotorId(6));
        assert!(matches!(
            "elbow".parse::<MotorId>(),
            Err(ArmError::UnknownMotor(ref s)) if s == "elbow"
        ));
        for alias in ["motor+1", "motor01", "motor 1", "motor", "motor1x", "Motor1", "motor256"] {
            assert!(alias.parse::<MotorId>().is_err(), "{alias} should not parse");
        }
        assert_eq!("motor0".parse::<MotorId>().unwrap(), MotorId(0));
    }

    #[test]
    fn test_new_motor_defaults() {
        let motor = Motor::new(MotorId(1));
        assert_eq!(motor.name(), "motor1");
        assert_eq!(motor.position(), 0);
        assert!(!motor.status());
    }

    #[test]
    fn test_set_position_rejects_out_of_range() {
        let mut motor = Motor::new(MotorId(1));
        motor.set_position(100).unwrap();
        assert!(matches!(
            motor.set_position(70000),
            Err(ArmError::PositionOutOfRange { value: 70000, .. })
        ));
        assert!(motor.set_position(-1).is_err());
        assert_eq!(motor.position(), 100);

        motor.set_position(65535).unwrap();
        assert_eq!(motor.position(), 65535);
    }

    #[test]
    fn test_accessors_do_not_touch_position() {
        let mut motor = Motor::new(MotorId(2));
        motor.set_position(42).unwrap();
        motor.set_name("shoulder");
        motor.set_status(true);
        assert_eq!(motor.name(), "shoulder");
        assert!(motor.status());
        assert_eq!(motor.position(), 42);
    }
}
