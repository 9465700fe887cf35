// Serial link parameters and operator defaults
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ArmError, Result};

// Serial port of the arm microcontroller
pub const DEFAULT_PORT: &str = "/dev/ttyACM0";

// Baud rate agreed with the firmware
pub const DEFAULT_BAUDRATE: u32 = 9600;

// Upper bound on a single frame write, keeps the operator loop responsive
pub const WRITE_TIMEOUT: Duration = Duration::from_millis(100);

// Position increment per key press in jog mode
pub const JOG_STEP: i64 = 64;

/// Runtime configuration, loadable from a JSON file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArmConfig {
    pub port: String,
    pub baudrate: u32,
    pub write_timeout_ms: u64,
    /// Display names keyed by motor id (`"motor1"`, ...)
    pub motor_names: BTreeMap<String, String>,
}

impl Default for ArmConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT.to_string(),
            baudrate: DEFAULT_BAUDRATE,
            write_timeout_ms: WRITE_TIMEOUT.as_millis() as u64,
            motor_names: BTreeMap::new(),
        }
    }
}

impl ArmConfig {
    /// Load a config file, missing fields fall back to defaults
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| ArmError::Config(format!("cannot read {}: {}", path.display(), e)))?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| ArmError::Config(e.to_string()))
    }

    pub fn write_timeout(&self) -> Duration {
        Duration::from_millis(self.write_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = ArmConfig::default();
        assert_eq!(cfg.baudrate, 9600);
        assert_eq!(cfg.write_timeout(), WRITE_TIMEOUT);
        assert!(cfg.motor_names.is_empty());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let cfg = ArmConfig::from_json(r#"{ "port": "COM3", "motor_names": { "motor1": "base" } }"#)
            .unwrap();
        assert_eq!(cfg.port, "COM3");
        assert_eq!(cfg.baudrate, DEFAULT_BAUDRATE);
        assert_eq!(cfg.motor_names.get("motor1").map(String::as_str), Some("base"));
    }

    #[test]
    fn test_bad_json_is_config_error() {
        assert!(matches!(
            ArmConfig::from_json("{ port: }"),
            Err(ArmError::Config(_))
        ));
    }
}
