//! Output configuration — TOML loading and validation.
//!
//! Loads `OutputConfig` from a TOML file or string and validates it before
//! any bank is built. Validation failures are the only errors this
//! workspace propagates; once a bank exists, degradation is silent (see
//! `pulsar_output::motors`).

use crate::consts::{MAX_SUPPORTED_MOTORS, MAX_SUPPORTED_SERVOS};
use crate::protocol::MotorProtocol;
use crate::tag::PinTag;
use heapless::Vec;
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

/// Widest pulse any configuration may program [µs-equivalent ticks].
const MAX_PULSE: u16 = 2500;

// ─── Error Type ─────────────────────────────────────────────────────

/// Configuration loading/validation error.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File I/O error.
    #[error("failed to read {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// TOML parse error.
    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// Semantic validation error.
    #[error("config validation: {0}")]
    Validation(String),
}

// ─── Motor Configuration ────────────────────────────────────────────

/// Motor output bank configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MotorConfig {
    /// ESC signaling protocol.
    #[serde(default)]
    pub protocol: MotorProtocol,
    /// Output pins in slot order. The list ends at its length or at the
    /// first `"NONE"` entry; later slots stay unpopulated.
    #[serde(default)]
    pub pins: Vec<PinTag, MAX_SUPPORTED_MOTORS>,
    /// Pulse repetition rate for free-running PWM [Hz].
    #[serde(default = "default_motor_rate")]
    pub pwm_rate_hz: u32,
    /// Force oneshot-family protocols to free-run instead of being
    /// resynchronized once per control cycle.
    #[serde(default)]
    pub use_unsynced_pwm: bool,
    /// Pulse width programmed at initialization (motor off).
    #[serde(default = "default_idle_pulse")]
    pub idle_pulse: u16,
}

fn default_motor_rate() -> u32 {
    480
}

fn default_idle_pulse() -> u16 {
    1000
}

impl Default for MotorConfig {
    fn default() -> Self {
        Self {
            protocol: MotorProtocol::default(),
            pins: Vec::new(),
            pwm_rate_hz: default_motor_rate(),
            use_unsynced_pwm: false,
            idle_pulse: default_idle_pulse(),
        }
    }
}

impl MotorConfig {
    /// Pin tag for a slot; [`PinTag::NONE`] past the end of the list.
    #[inline]
    pub fn pin_tag(&self, index: usize) -> PinTag {
        self.pins.get(index).copied().unwrap_or(PinTag::NONE)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.idle_pulse > MAX_PULSE {
            return Err(ConfigError::Validation(format!(
                "motor idle_pulse {} exceeds {MAX_PULSE}",
                self.idle_pulse
            )));
        }
        if self.protocol.is_digital() {
            return Ok(()); // rate and idle are owned by the bridge
        }
        if self.pwm_rate_hz == 0 {
            return Err(ConfigError::Validation(
                "motor pwm_rate_hz must be nonzero".to_string(),
            ));
        }
        let free_running = self.protocol.is_fixed_rate() || self.use_unsynced_pwm;
        if free_running {
            // The timer period must fit the 16-bit auto-reload register.
            let mhz = self.protocol.timer_mhz().unwrap_or(1);
            let period = mhz as u64 * 1_000_000 / self.pwm_rate_hz as u64;
            if period > u16::MAX as u64 {
                return Err(ConfigError::Validation(format!(
                    "motor pwm_rate_hz {} too low for {:?} ({mhz} MHz clock): \
                     period {period} exceeds 16-bit timer range",
                    self.pwm_rate_hz, self.protocol
                )));
            }
        }
        Ok(())
    }
}

// ─── Servo Configuration ────────────────────────────────────────────

/// Servo output bank configuration. Servos always run fixed-rate PWM at
/// the 1 µs tick base.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServoConfig {
    /// Output pins in slot order.
    #[serde(default)]
    pub pins: Vec<PinTag, MAX_SUPPORTED_SERVOS>,
    /// Pulse repetition rate [Hz].
    #[serde(default = "default_servo_rate")]
    pub pwm_rate_hz: u32,
    /// Pulse width programmed at initialization (servo centered).
    #[serde(default = "default_center_pulse")]
    pub center_pulse: u16,
}

fn default_servo_rate() -> u32 {
    50
}

fn default_center_pulse() -> u16 {
    1500
}

impl Default for ServoConfig {
    fn default() -> Self {
        Self {
            pins: Vec::new(),
            pwm_rate_hz: default_servo_rate(),
            center_pulse: default_center_pulse(),
        }
    }
}

impl ServoConfig {
    /// Pin tag for a slot; [`PinTag::NONE`] past the end of the list.
    #[inline]
    pub fn pin_tag(&self, index: usize) -> PinTag {
        self.pins.get(index).copied().unwrap_or(PinTag::NONE)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.pwm_rate_hz == 0 {
            return Err(ConfigError::Validation(
                "servo pwm_rate_hz must be nonzero".to_string(),
            ));
        }
        let period = 1_000_000u64 / self.pwm_rate_hz as u64;
        if period > u16::MAX as u64 {
            return Err(ConfigError::Validation(format!(
                "servo pwm_rate_hz {} too low: period {period} exceeds 16-bit timer range",
                self.pwm_rate_hz
            )));
        }
        if !(500..=MAX_PULSE).contains(&self.center_pulse) {
            return Err(ConfigError::Validation(format!(
                "servo center_pulse {} outside 500..={MAX_PULSE}",
                self.center_pulse
            )));
        }
        Ok(())
    }
}

// ─── Top-Level Config ───────────────────────────────────────────────

/// Complete output configuration bundle.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    /// Motor bank settings.
    #[serde(default)]
    pub motors: MotorConfig,
    /// Servo bank settings.
    #[serde(default)]
    pub servos: ServoConfig,
}

impl OutputConfig {
    /// Parse and validate a configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: OutputConfig = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a configuration from a TOML file.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let toml_str = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&toml_str)
    }

    /// Run all validation rules, returning the first failure.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.motors.validate()?;
        self.servos.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    const GOOD_TOML: &str = r#"
[motors]
protocol = "oneshot125"
pins = ["A0", "A1", "B0", "B1"]
pwm_rate_hz = 480
idle_pulse = 1000

[servos]
pins = ["C0", "C1"]
pwm_rate_hz = 50
center_pulse = 1500
"#;

    #[test]
    fn parse_full_config() {
        let config = OutputConfig::from_toml(GOOD_TOML).unwrap();
        assert_eq!(config.motors.protocol, MotorProtocol::OneShot125);
        assert_eq!(config.motors.pins.len(), 4);
        assert_eq!(config.motors.pin_tag(0), PinTag::new(0, 0));
        assert_eq!(config.servos.pins.len(), 2);
        assert_eq!(config.servos.center_pulse, 1500);
    }

    #[test]
    fn missing_sections_use_defaults() {
        let config = OutputConfig::from_toml("").unwrap();
        assert_eq!(config.motors.protocol, MotorProtocol::OneShot125);
        assert_eq!(config.motors.pwm_rate_hz, 480);
        assert!(config.motors.pins.is_empty());
        assert_eq!(config.servos.pwm_rate_hz, 50);
    }

    #[test]
    fn pin_tag_past_list_is_none() {
        let config = OutputConfig::from_toml(GOOD_TOML).unwrap();
        assert!(config.motors.pin_tag(4).is_none());
        assert!(config.motors.pin_tag(99).is_none());
    }

    #[test]
    fn rejects_zero_motor_rate() {
        let err = OutputConfig::from_toml(
            r#"
[motors]
protocol = "standard"
pwm_rate_hz = 0
"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn rejects_rate_too_low_for_clock() {
        // Brushed runs an 8 MHz clock; 100 Hz needs an 80000-tick period.
        let err = OutputConfig::from_toml(
            r#"
[motors]
protocol = "brushed"
pwm_rate_hz = 100
"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn digital_skips_rate_checks() {
        let config = OutputConfig::from_toml(
            r#"
[motors]
protocol = "dshot600"
pins = ["A0"]
pwm_rate_hz = 0
"#,
        );
        assert!(config.is_ok());
    }

    #[test]
    fn rejects_excessive_idle_pulse() {
        let err = OutputConfig::from_toml(
            r#"
[motors]
idle_pulse = 3000
"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn rejects_servo_center_out_of_range() {
        let err = OutputConfig::from_toml(
            r#"
[servos]
center_pulse = 100
"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn rejects_too_many_pins() {
        let err = OutputConfig::from_toml(
            r#"
[motors]
pins = ["A0", "A1", "A2", "A3", "A4", "A5", "A6", "A7", "B0"]
"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn rejects_unknown_fields() {
        let err = OutputConfig::from_toml(
            r#"
[motors]
protcol = "oneshot125"
"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(GOOD_TOML.as_bytes()).unwrap();
        let config = OutputConfig::from_path(file.path()).unwrap();
        assert_eq!(config.motors.pins.len(), 4);
    }

    #[test]
    fn load_missing_file() {
        let err = OutputConfig::from_path(Path::new("/nonexistent/output.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
