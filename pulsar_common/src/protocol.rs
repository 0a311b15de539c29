//! ESC signaling protocol selection.

use crate::consts::{
    BRUSHED_TIMER_MHZ, MULTISHOT_TIMER_MHZ, ONESHOT125_TIMER_MHZ, ONESHOT42_TIMER_MHZ,
    PWM_TIMER_MHZ,
};
use serde::{Deserialize, Serialize};

/// Electrical protocol used to drive the connected ESCs.
///
/// Analog protocols encode the command value as a pulse width on a
/// hardware-timer output; digital (Dshot) protocols hand the whole frame
/// off to the digital bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MotorProtocol {
    /// Fixed-rate 1 µs-tick PWM, servo style.
    Standard,
    /// Brushed-motor duty-cycle PWM.
    Brushed,
    /// OneShot125 — 125..250 µs pulses, one per control cycle.
    #[default]
    OneShot125,
    /// OneShot42 — 42..84 µs pulses.
    OneShot42,
    /// Multishot — 5..25 µs pulses.
    Multishot,
    /// Dshot at 150 kbit/s.
    Dshot150,
    /// Dshot at 300 kbit/s.
    Dshot300,
    /// Dshot at 600 kbit/s.
    Dshot600,
}

impl MotorProtocol {
    /// Whether this is an opaque digital protocol handled by the bridge.
    #[inline]
    pub const fn is_digital(self) -> bool {
        matches!(self, Self::Dshot150 | Self::Dshot300 | Self::Dshot600)
    }

    /// Whether this protocol always free-runs at a fixed rate, regardless
    /// of the synced-PWM setting.
    #[inline]
    pub const fn is_fixed_rate(self) -> bool {
        matches!(self, Self::Standard | Self::Brushed)
    }

    /// Timer clock for this protocol [MHz]. `None` for digital protocols,
    /// whose clocking is owned by the bridge.
    pub const fn timer_mhz(self) -> Option<u32> {
        match self {
            Self::Standard => Some(PWM_TIMER_MHZ),
            Self::Brushed => Some(BRUSHED_TIMER_MHZ),
            Self::OneShot125 => Some(ONESHOT125_TIMER_MHZ),
            Self::OneShot42 => Some(ONESHOT42_TIMER_MHZ),
            Self::Multishot => Some(MULTISHOT_TIMER_MHZ),
            Self::Dshot150 | Self::Dshot300 | Self::Dshot600 => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unselected_defaults_to_oneshot125() {
        assert_eq!(MotorProtocol::default(), MotorProtocol::OneShot125);
    }

    #[test]
    fn digital_classification() {
        assert!(MotorProtocol::Dshot150.is_digital());
        assert!(MotorProtocol::Dshot300.is_digital());
        assert!(MotorProtocol::Dshot600.is_digital());
        assert!(!MotorProtocol::OneShot125.is_digital());
        assert!(!MotorProtocol::Brushed.is_digital());
    }

    #[test]
    fn fixed_rate_classification() {
        assert!(MotorProtocol::Standard.is_fixed_rate());
        assert!(MotorProtocol::Brushed.is_fixed_rate());
        assert!(!MotorProtocol::OneShot42.is_fixed_rate());
        assert!(!MotorProtocol::Dshot600.is_fixed_rate());
    }

    #[test]
    fn clock_table() {
        assert_eq!(MotorProtocol::Standard.timer_mhz(), Some(1));
        assert_eq!(MotorProtocol::Brushed.timer_mhz(), Some(8));
        assert_eq!(MotorProtocol::OneShot125.timer_mhz(), Some(8));
        assert_eq!(MotorProtocol::OneShot42.timer_mhz(), Some(24));
        assert_eq!(MotorProtocol::Multishot.timer_mhz(), Some(8));
        assert_eq!(MotorProtocol::Dshot300.timer_mhz(), None);
    }

    #[test]
    fn serde_names() {
        #[derive(serde::Deserialize)]
        struct Wrap {
            protocol: MotorProtocol,
        }
        let w: Wrap = toml::from_str(r#"protocol = "oneshot125""#).unwrap();
        assert_eq!(w.protocol, MotorProtocol::OneShot125);
        let w: Wrap = toml::from_str(r#"protocol = "dshot600""#).unwrap();
        assert_eq!(w.protocol, MotorProtocol::Dshot600);
        assert!(toml::from_str::<Wrap>(r#"protocol = "oneshot999""#).is_err());
    }
}
