// Recorded moves and sequences of moves

use std::collections::BTreeMap;

use crate::error::{ArmError, Result};
use crate::motor::MotorId;

/// Name every new sequence starts with
///
/// A sequence still carrying this name is never added to the saved list;
/// the operator has to name it first.
pub const PLACEHOLDER_NAME: &str = "name";

/// True for names a sequence may be saved under
pub fn is_valid_name(name: &str) -> bool {
    name != PLACEHOLDER_NAME && !name.trim().is_empty()
}

/// Snapshot of target positions for a set of motors
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Move {
    known: Vec<MotorId>,
    positions: BTreeMap<MotorId, u16>,
}

impl Move {
    /// Create an empty move that may reference only `known` motors
    pub fn new(known: &[MotorId]) -> Self {
        Self {
            known: known.to_vec(),
            positions: BTreeMap::new(),
        }
    }

    fn check_known(&self, id: MotorId) -> Result<()> {
        if self.known.contains(&id) {
            Ok(())
        } else {
            Err(ArmError::UnknownMotor(id.to_string()))
        }
    }

    /// Record a position in the snapshot
    pub fn set_motor_position(&mut self, id: MotorId, position: u16) -> Result<()> {
        self.check_known(id)?;
        self.positions.insert(id, position);
        Ok(())
    }

    /// Recorded position, which may differ from the motor's live position
    pub fn motor_position(&self, id: MotorId) -> Result<u16> {
        self.check_known(id)?;
        self.positions
            .get(&id)
            .copied()
            .ok_or_else(|| ArmError::UnknownMotor(id.to_string()))
    }

    /// Recorded positions in motor order
    pub fn positions(&self) -> impl Iterator<Item = (MotorId, u16)> + '_ {
        self.positions.iter().map(|(&id, &pos)| (id, pos))
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Editor label, e.g. `move 2: motor1 100, motor2 0, `
    pub fn label<'a, F>(&self, number: usize, name_of: F) -> String
    where
        F: Fn(MotorId) -> &'a str,
    {
        let mut label = format!("move {}: ", number);
        for (id, pos) in self.positions() {
            label.push_str(&format!("{} {}, ", name_of(id), pos));
        }
        label
    }
}

/// Ordered, named list of moves
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sequence {
    name: String,
    moves: Vec<Move>,
}

impl Default for Sequence {
    fn default() -> Self {
        Self::new()
    }
}

impl Sequence {
    pub fn new() -> Self {
        Self {
            name: PLACEHOLDER_NAME.to_string(),
            moves: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// True once the placeholder name has been replaced by a non-blank one
    pub fn is_named(&self) -> bool {
        is_valid_name(&self.name)
    }

    pub fn add_move(&mut self, mv: Move) {
        self.moves.push(mv);
    }

    pub fn move_count(&self) -> usize {
        self.moves.len()
    }

    /// Moves in playback order
    pub fn moves(&self) -> &[Move] {
        &self.moves
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::motor::ARM_MOTOR_IDS;

    #[test]
    fn test_move_rejects_unknown_motor() {
        let mut mv = Move::new(&ARM_MOTOR_IDS);
        assert!(matches!(
            mv.set_motor_position(MotorId(7), 10),
            Err(ArmError::UnknownMotor(ref s)) if s == "motor7"
        ));
        assert!(matches!(
            mv.motor_position(MotorId(7)),
            Err(ArmError::UnknownMotor(_))
        ));
        assert!(mv.is_empty());
    }

    #[test]
    fn test_move_records_positions() {
        let mut mv = Move::new(&ARM_MOTOR_IDS[..2]);
        mv.set_motor_position(MotorId(2), 300).unwrap();
        mv.set_motor_position(MotorId(1), 100).unwrap();
        assert_eq!(mv.motor_position(MotorId(1)).unwrap(), 100);
        assert_eq!(mv.motor_position(MotorId(2)).unwrap(), 300);
        assert!(mv.set_motor_position(MotorId(3), 1).is_err());

        let ordered: Vec<_> = mv.positions().collect();
        assert_eq!(ordered, vec![(MotorId(1), 100), (MotorId(2), 300)]);
    }

    #[test]
    fn test_move_label() {
        let mut mv = Move::new(&ARM_MOTOR_IDS[..2]);
        mv.set_motor_position(MotorId(1), 5).unwrap();
        mv.set_motor_position(MotorId(2), 9).unwrap();
        let label = mv.label(1, |id| if id == MotorId(1) { "base" } else { "elbow" });
        assert_eq!(label, "move 1: base 5, elbow 9, ");
    }

    #[test]
    fn test_sequence_starts_with_placeholder() {
        let mut seq = Sequence::new();
        assert_eq!(seq.name(), PLACEHOLDER_NAME);
        assert!(!seq.is_named());
        seq.set_name("  ");
        assert!(!seq.is_named());
        seq.set_name("wave");
        assert!(seq.is_named());
    }

    #[test]
    fn test_sequence_keeps_append_order() {
        let mut seq = Sequence::new();
        for pos in [10u16, 20, 30] {
            let mut mv = Move::new(&ARM_MOTOR_IDS);
            mv.set_motor_position(MotorId(1), pos).unwrap();
            seq.add_move(mv);
            assert_eq!(seq.move_count() as u16, pos / 10);
        }
        let recorded: Vec<u16> = seq
            .moves()
            .iter()
            .map(|mv| mv.motor_position(MotorId(1)).unwrap())
            .collect();
        assert_eq!(recorded, vec![10, 20, 30]);
    }
}
