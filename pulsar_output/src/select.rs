//! Protocol selection — resolve a configured protocol into clock rate,
//! encoder, and synchronization behavior.

use crate::encode::PulseEncoder;
use pulsar_common::protocol::MotorProtocol;

/// How a bank's pulse cycles are restarted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncMode {
    /// Free-running at a fixed rate; no completion step.
    Unsynced,
    /// Restarted once per control cycle by a forced timer overflow.
    OneshotSynced,
    /// Restarted by the digital-protocol bridge.
    Digital,
}

/// Resolved per-bank protocol plan.
///
/// Computed once at configuration time; the hot write path never
/// re-derives any of this.
#[derive(Debug, Clone, Copy)]
pub struct ProtocolPlan {
    /// Timer clock [MHz]. Zero for digital protocols (bridge-owned).
    pub timer_mhz: u32,
    /// Compare-value encoder shared by every channel in the bank.
    pub encoder: PulseEncoder,
    /// Synchronization behavior.
    pub sync: SyncMode,
    /// Effective idle pulse. Fixed-rate protocols idle at zero duty
    /// regardless of what was configured.
    pub idle_pulse: u16,
}

impl ProtocolPlan {
    /// Apply the selection table.
    ///
    /// Standard and brushed PWM always free-run; the oneshot family honors
    /// `use_unsynced_pwm`; digital protocols delegate everything to the
    /// bridge.
    pub fn resolve(protocol: MotorProtocol, use_unsynced_pwm: bool, idle_pulse: u16) -> Self {
        let encoder = match protocol {
            MotorProtocol::Standard => PulseEncoder::Standard,
            MotorProtocol::Brushed => PulseEncoder::Brushed,
            MotorProtocol::OneShot125 => PulseEncoder::OneShot125,
            MotorProtocol::OneShot42 => PulseEncoder::OneShot42,
            MotorProtocol::Multishot => PulseEncoder::Multishot,
            // The bridge encodes digital frames itself; the encoder here is
            // never reached because digital writes are routed to it.
            MotorProtocol::Dshot150 | MotorProtocol::Dshot300 | MotorProtocol::Dshot600 => {
                PulseEncoder::Standard
            }
        };

        let sync = if protocol.is_digital() {
            SyncMode::Digital
        } else if protocol.is_fixed_rate() || use_unsynced_pwm {
            SyncMode::Unsynced
        } else {
            SyncMode::OneshotSynced
        };

        Self {
            timer_mhz: protocol.timer_mhz().unwrap_or(0),
            encoder,
            sync,
            idle_pulse: if protocol.is_fixed_rate() { 0 } else { idle_pulse },
        }
    }

    /// Whether the plan routes all signaling through the digital bridge.
    #[inline]
    pub fn is_digital(&self) -> bool {
        self.sync == SyncMode::Digital
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_forces_unsynced_and_zero_idle() {
        let plan = ProtocolPlan::resolve(MotorProtocol::Standard, false, 1000);
        assert_eq!(plan.sync, SyncMode::Unsynced);
        assert_eq!(plan.idle_pulse, 0);
        assert_eq!(plan.timer_mhz, 1);
        assert_eq!(plan.encoder, PulseEncoder::Standard);
    }

    #[test]
    fn brushed_forces_unsynced_and_zero_idle() {
        let plan = ProtocolPlan::resolve(MotorProtocol::Brushed, false, 1000);
        assert_eq!(plan.sync, SyncMode::Unsynced);
        assert_eq!(plan.idle_pulse, 0);
        assert_eq!(plan.timer_mhz, 8);
        assert_eq!(plan.encoder, PulseEncoder::Brushed);
    }

    #[test]
    fn oneshot_family_honors_sync_setting() {
        for protocol in [
            MotorProtocol::OneShot125,
            MotorProtocol::OneShot42,
            MotorProtocol::Multishot,
        ] {
            let synced = ProtocolPlan::resolve(protocol, false, 1000);
            assert_eq!(synced.sync, SyncMode::OneshotSynced);
            assert_eq!(synced.idle_pulse, 1000);

            let unsynced = ProtocolPlan::resolve(protocol, true, 1000);
            assert_eq!(unsynced.sync, SyncMode::Unsynced);
        }
    }

    #[test]
    fn oneshot_clock_table() {
        assert_eq!(
            ProtocolPlan::resolve(MotorProtocol::OneShot125, false, 0).timer_mhz,
            8
        );
        assert_eq!(
            ProtocolPlan::resolve(MotorProtocol::OneShot42, false, 0).timer_mhz,
            24
        );
        assert_eq!(
            ProtocolPlan::resolve(MotorProtocol::Multishot, false, 0).timer_mhz,
            8
        );
    }

    #[test]
    fn digital_is_synced_via_bridge() {
        for protocol in [
            MotorProtocol::Dshot150,
            MotorProtocol::Dshot300,
            MotorProtocol::Dshot600,
        ] {
            // The unsynced setting has no effect on digital protocols.
            let plan = ProtocolPlan::resolve(protocol, true, 1000);
            assert_eq!(plan.sync, SyncMode::Digital);
            assert!(plan.is_digital());
        }
    }
}
