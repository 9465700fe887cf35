pub mod config;
pub mod console;
pub mod controller;
pub mod error;
pub mod motor;
pub mod runtime;
pub mod sequence;

pub use config::ArmConfig;
pub use controller::{CommitOutcome, Delivery, DeliveryReport, MotorController, RecordedMove};
pub use error::ArmError;
pub use motor::{ARM_MOTOR_IDS, Frame, FrameSink, Motor, MotorId, SerialTransport, TransportError};
pub use sequence::{Move, PLACEHOLDER_NAME, Sequence};
