// High-level controller for the six-motor arm
//
// Owns the motors, the serial transport, the sequence being edited and the
// saved sequences. Every position change goes through set_motor_position,
// which encodes the full frame and sends it.

use tracing::{debug, error, info, warn};

use crate::config::ArmConfig;
use crate::error::{ArmError, Result};
use crate::motor::codec;
use crate::motor::{ARM_MOTOR_IDS, FrameSink, Motor, MotorId, SerialTransport, TransportError};
use crate::sequence::{Move, PLACEHOLDER_NAME, Sequence, is_valid_name};

/// What happened to the frame produced by a position change
#[derive(Debug)]
#[must_use]
pub enum Delivery {
    Sent,
    /// Local state was updated but the frame did not reach the arm
    Dropped(TransportError),
}

impl Delivery {
    pub fn is_sent(&self) -> bool {
        matches!(self, Delivery::Sent)
    }
}

/// Result of confirming the sequence editor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    /// Saved at this index of the sequence list
    Committed { index: usize },
    /// Placeholder or blank name; nothing was saved or renamed
    NameRequired,
}

/// Frames delivered by an operation that moves several motors
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    pub sent: usize,
    pub dropped: usize,
}

impl DeliveryReport {
    fn record(&mut self, delivery: Delivery) {
        match delivery {
            Delivery::Sent => self.sent += 1,
            Delivery::Dropped(_) => self.dropped += 1,
        }
    }

    pub fn all_sent(&self) -> bool {
        self.dropped == 0
    }
}

/// A move appended to the sequence being edited
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordedMove {
    /// Moves in the sequence, this one included
    pub count: usize,
    pub report: DeliveryReport,
}

/// Arm controller, generic over the frame transport
pub struct MotorController<T: FrameSink = SerialTransport> {
    motors: Vec<Motor>, // wire order
    transport: T,
    editing: Option<Sequence>,
    saved: Vec<Sequence>,
}

impl MotorController<SerialTransport> {
    /// Open the serial link described by `config` and apply motor names
    ///
    /// A link that cannot be opened is not an error; the controller runs
    /// in degraded mode.
    pub fn from_config(config: &ArmConfig) -> Result<Self> {
        let transport =
            SerialTransport::open(&config.port, config.baudrate, config.write_timeout());
        let mut controller = Self::new(transport);

        for (id, name) in &config.motor_names {
            let id: MotorId = id.parse()?;
            controller
                .set_motor_name(id, name.clone())
                .map_err(|_| ArmError::Config(format!("no motor {} on this arm", id)))?;
        }

        Ok(controller)
    }
}

impl<T: FrameSink> MotorController<T> {
    pub fn new(transport: T) -> Self {
        Self {
            motors: ARM_MOTOR_IDS.iter().map(|&id| Motor::new(id)).collect(),
            transport,
            editing: None,
            saved: Vec::new(),
        }
    }

    fn motor(&self, id: MotorId) -> Result<&Motor> {
        self.motors
            .iter()
            .find(|m| m.id() == id)
            .ok_or_else(|| unknown_motor(id))
    }

    fn motor_mut(&mut self, id: MotorId) -> Result<&mut Motor> {
        self.motors
            .iter_mut()
            .find(|m| m.id() == id)
            .ok_or_else(|| unknown_motor(id))
    }

    /// Motor ids in wire order
    pub fn motor_ids(&self) -> Vec<MotorId> {
        self.motors.iter().map(Motor::id).collect()
    }

    pub fn motors(&self) -> &[Motor] {
        &self.motors
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Check if the serial link is up
    pub fn is_connected(&self) -> bool {
        self.transport.is_ready()
    }

    // === Motor state ===

    /// Set a motor's target position and transmit the full frame
    ///
    /// Invalid ids and out-of-range values are returned as errors and leave
    /// every motor untouched. Transport failures are logged and reported
    /// through [`Delivery::Dropped`]; the local position is kept.
    pub fn set_motor_position(&mut self, id: MotorId, value: i64) -> Result<Delivery> {
        self.motor_mut(id)?.set_position(value)?;
        debug!("{}: {}", id, value);
        self.transmit()
    }

    fn transmit(&mut self) -> Result<Delivery> {
        let positions: Vec<u32> = self.motors.iter().map(|m| m.position() as u32).collect();
        let frame = codec::encode(&positions).map_err(|e| {
            error!("Failed to encode frame: {}", e);
            ArmError::from(e)
        })?;

        match self.transport.send(&frame) {
            Ok(()) => Ok(Delivery::Sent),
            Err(e) => {
                warn!("Frame not delivered: {}", e);
                Ok(Delivery::Dropped(e))
            }
        }
    }

    pub fn motor_position(&self, id: MotorId) -> Result<u16> {
        Ok(self.motor(id)?.position())
    }

    pub fn motor_name(&self, id: MotorId) -> Result<&str> {
        Ok(self.motor(id)?.name())
    }

    pub fn set_motor_name(&mut self, id: MotorId, name: impl Into<String>) -> Result<()> {
        self.motor_mut(id)?.set_name(name);
        Ok(())
    }

    pub fn motor_status(&self, id: MotorId) -> Result<bool> {
        Ok(self.motor(id)?.status())
    }

    pub fn set_motor_status(&mut self, id: MotorId, enabled: bool) -> Result<()> {
        self.motor_mut(id)?.set_status(enabled);
        Ok(())
    }

    /// Start calibration of the vertical axis
    ///
    /// The firmware does not expose a calibration command yet, so this only
    /// reports the event.
    pub fn calibrate_vertical_axis(&self) {
        info!("Calibrating vertical axis");
    }

    // === Moves ===

    /// Build a move from requested positions, driving each motor as well
    ///
    /// All ids and values are validated before anything is written, so a
    /// rejected request changes neither the motors nor the returned move.
    /// One frame is sent per motor set; their fate is in the report.
    pub fn capture_move(&mut self, requested: &[(MotorId, i64)]) -> Result<(Move, DeliveryReport)> {
        let mut mv = Move::new(&self.motor_ids());
        for &(id, value) in requested {
            let position = u16::try_from(value)
                .map_err(|_| ArmError::PositionOutOfRange { id, value })?;
            self.motor(id)?;
            mv.set_motor_position(id, position)?;
        }

        let mut report = DeliveryReport::default();
        for (id, position) in mv.positions() {
            report.record(self.set_motor_position(id, position as i64)?);
        }
        Ok((mv, report))
    }

    /// Capture the current position of every motor
    pub fn current_positions(&self) -> Vec<(MotorId, i64)> {
        self.motors
            .iter()
            .map(|m| (m.id(), m.position() as i64))
            .collect()
    }

    // === Sequence editor ===

    /// Open a new editing session, dropping any unsaved one
    pub fn start_new_sequence(&mut self) {
        if let Some(old) = self.editing.replace(Sequence::new()) {
            info!(
                "Discarding unsaved sequence '{}' ({} moves)",
                old.name(),
                old.move_count()
            );
        }
        info!("Editing new sequence");
    }

    /// Sequence currently being edited
    pub fn current_sequence(&self) -> Option<&Sequence> {
        self.editing.as_ref()
    }

    fn editing_mut(&mut self) -> Result<&mut Sequence> {
        self.editing.as_mut().ok_or(ArmError::NoOpenSequence)
    }

    pub fn set_sequence_name(&mut self, name: impl Into<String>) -> Result<()> {
        self.editing_mut()?.set_name(name);
        Ok(())
    }

    /// Capture a move and append it to the open sequence
    pub fn add_move_to_current_sequence(
        &mut self,
        requested: &[(MotorId, i64)],
    ) -> Result<RecordedMove> {
        self.editing_mut()?;
        let (mv, report) = self.capture_move(requested)?;

        let number = self.editing_mut()?.move_count() + 1;
        let label = mv.label(number, |id| self.motor(id).map(Motor::name).unwrap_or("?"));
        info!("{}", label);

        let sequence = self.editing_mut()?;
        sequence.add_move(mv);
        Ok(RecordedMove {
            count: sequence.move_count(),
            report,
        })
    }

    /// Confirm the editor with `name`
    ///
    /// With the placeholder (or a blank) name this is a no-op: the session
    /// stays open and keeps its current name.
    pub fn commit_sequence(&mut self, name: impl Into<String>) -> Result<CommitOutcome> {
        self.editing_mut()?;
        let name = name.into();
        if !is_valid_name(&name) {
            warn!("Sequence must be renamed from '{}' before saving", PLACEHOLDER_NAME);
            return Ok(CommitOutcome::NameRequired);
        }

        let Some(mut sequence) = self.editing.take() else {
            return Err(ArmError::NoOpenSequence);
        };
        sequence.set_name(name);
        info!(
            "Saved sequence '{}' with {} moves",
            sequence.name(),
            sequence.move_count()
        );
        self.saved.push(sequence);
        Ok(CommitOutcome::Committed {
            index: self.saved.len() - 1,
        })
    }

    /// Cancel the editor, dropping the open sequence
    pub fn discard_sequence(&mut self) -> Result<Sequence> {
        let sequence = self.editing.take().ok_or(ArmError::NoOpenSequence)?;
        info!("Discarded sequence '{}'", sequence.name());
        Ok(sequence)
    }

    // === Saved sequences ===

    pub fn list_sequences(&self) -> &[Sequence] {
        &self.saved
    }

    fn saved_sequence(&self, index: usize) -> Result<&Sequence> {
        self.saved.get(index).ok_or(ArmError::SequenceNotFound {
            index,
            len: self.saved.len(),
        })
    }

    pub fn delete_sequence(&mut self, index: usize) -> Result<Sequence> {
        self.saved_sequence(index)?;
        let sequence = self.saved.remove(index);
        info!("Deleted sequence '{}'", sequence.name());
        Ok(sequence)
    }

    /// Log the positions recorded in one move without driving the motors
    pub fn preview_move(&self, sequence: usize, index: usize) -> Result<()> {
        let mv = self
            .saved_sequence(sequence)?
            .moves()
            .get(index)
            .ok_or(ArmError::MoveNotFound { sequence, index })?;

        for (id, position) in mv.positions() {
            info!("{} {}", id, position);
        }
        Ok(())
    }

    /// Drive the motors through every move of a saved sequence
    pub fn play_sequence(&mut self, index: usize) -> Result<DeliveryReport> {
        let sequence = self.saved_sequence(index)?;
        info!("Playing sequence '{}'", sequence.name());
        let moves = sequence.moves().to_vec();

        let mut report = DeliveryReport::default();
        for mv in &moves {
            for (id, position) in mv.positions() {
                report.record(self.set_motor_position(id, position as i64)?);
            }
        }

        if !report.all_sent() {
            warn!("{} of {} frames not delivered", report.dropped, report.sent + report.dropped);
        }
        Ok(report)
    }
}

fn unknown_motor(id: MotorId) -> ArmError {
    error!("Unknown motor {}", id);
    ArmError::UnknownMotor(id.to_string())
}
