//! Motor output bank — registry, write dispatch, gating, synchronization.
//!
//! The bank is built once at configuration time and then driven by the
//! control loop: one `write` per channel per cycle, followed by a single
//! `complete_update` when the protocol requires explicit
//! resynchronization. All runtime operations are constant-time no-ops for
//! slots that never came up; failures never propagate upward. Arming
//! logic above this layer must compare configured vs populated motor
//! counts and refuse to arm on a shortfall.

use pulsar_common::config::MotorConfig;
use pulsar_common::consts::MAX_SUPPORTED_MOTORS;
use pulsar_common::hw::{
    DshotBridge, Owner, OutputFlags, OutputHardware, ResourceKind, TimerHardware, TimerId,
};
use tracing::{info, warn};

use crate::port::{OutputPort, configure_output};
use crate::select::{ProtocolPlan, SyncMode};

/// Fixed-capacity motor output bank.
///
/// Owned by the flight-control core and passed by reference into every
/// operation — no process-wide state.
pub struct MotorOutputs {
    ports: [OutputPort; MAX_SUPPORTED_MOTORS],
    plan: ProtocolPlan,
    /// Global enable gate over all per-channel writes.
    enabled: bool,
    /// Digital-protocol bridge. Held only when a digital protocol is
    /// configured; its presence routes writes and completion to it.
    bridge: Option<Box<dyn DshotBridge>>,
}

impl MotorOutputs {
    /// Build and populate the motor bank.
    ///
    /// Slots are populated in tag order and population is monotonic: the
    /// first unset or unresolvable tag stops it, and this slot plus all
    /// later ones stay permanently disabled for the session. No error is
    /// raised — degradation is silent by design.
    ///
    /// `bridge` must be supplied when the configured protocol is digital;
    /// without one, every slot stays disabled.
    pub fn init(
        config: &MotorConfig,
        motor_count: u8,
        hw: &mut dyn OutputHardware,
        bridge: Option<Box<dyn DshotBridge>>,
    ) -> Self {
        let plan = ProtocolPlan::resolve(
            config.protocol,
            config.use_unsynced_pwm,
            config.idle_pulse,
        );

        let mut bank = Self {
            ports: std::array::from_fn(|_| OutputPort::default()),
            plan,
            enabled: true,
            bridge: if plan.is_digital() { bridge } else { None },
        };

        if plan.is_digital() && bank.bridge.is_none() {
            warn!(
                protocol = ?config.protocol,
                "digital protocol selected but no bridge supplied; motor outputs stay disabled"
            );
            return bank;
        }

        let limit = (motor_count as usize).min(MAX_SUPPORTED_MOTORS);
        let mut seen_timers: heapless::Vec<TimerId, MAX_SUPPORTED_MOTORS> = heapless::Vec::new();
        let mut populated = 0usize;

        for index in 0..limit {
            let tag = config.pin_tag(index);
            if tag.is_none() {
                break;
            }

            let Some(descriptor) = hw.resolve(tag, OutputFlags::OUTPUT_ENABLED) else {
                warn!(slot = index, %tag, "no timer for pin tag; remaining motor slots disabled");
                break;
            };

            if plan.is_digital() {
                // Hardware setup, write routing, and completion are all
                // bridge-owned; this core only tracks the enabled flag.
                if let Some(bridge) = bank.bridge.as_mut() {
                    bridge.configure_hardware(&descriptor, index as u8, config.protocol);
                }
                bank.ports[index].enabled = true;
                populated = index + 1;
                continue;
            }

            let Some(io) = hw.resolve_by_tag(tag) else {
                warn!(slot = index, %tag, "no GPIO for pin tag; remaining motor slots disabled");
                break;
            };
            hw.claim(io, Owner::Motor, ResourceKind::Output, index as u8);
            hw.configure_alternate_function(io);

            // Free-running protocols wrap at a fixed rate; synced protocols
            // get the maximum period and rely on forced overflows instead.
            let (period, pulse) = if plan.sync == SyncMode::Unsynced {
                let hz = plan.timer_mhz * 1_000_000;
                ((hz / config.pwm_rate_hz) as u16, plan.idle_pulse)
            } else {
                (u16::MAX, 0)
            };

            let ccr = configure_output(hw, &descriptor, plan.timer_mhz, period, pulse);
            let timer_leader = !seen_timers.contains(&descriptor.timer);
            if timer_leader {
                // Capacity matches the bank; push cannot fail.
                let _ = seen_timers.push(descriptor.timer);
            }

            bank.ports[index] = OutputPort {
                ccr: Some(ccr),
                period,
                timer: Some(descriptor.timer),
                timer_leader,
                enabled: true,
            };
            populated = index + 1;
        }

        info!(
            protocol = ?config.protocol,
            requested = limit,
            populated,
            sync = ?plan.sync,
            "motor output bank initialized"
        );
        bank
    }

    /// Write one motor's command value.
    ///
    /// Silent no-op when the index is out of range, the global enable gate
    /// is cleared, or the slot never came up. Constant-time, non-blocking.
    #[inline]
    pub fn write(&mut self, index: u8, value: u16) {
        let Some(port) = self.ports.get(index as usize) else {
            return;
        };
        if !self.enabled || !port.enabled {
            return;
        }
        if let Some(bridge) = self.bridge.as_mut() {
            bridge.write(index, value);
            return;
        }
        if let Some(ccr) = &port.ccr {
            ccr.store(self.plan.encoder.encode(value, port.period));
        }
    }

    /// Per-cycle completion step for synced protocols.
    ///
    /// Digital: delegated to the bridge. Analog synced: exactly one forced
    /// overflow per distinct timer among the first `motor_count` ports
    /// (restarting pulse timing with minimal latency), and every processed
    /// compare register ends the call at zero so the output stays low until
    /// the next write arms the following pulse. Free-running banks ignore
    /// the call.
    pub fn complete_update(&mut self, motor_count: u8, hw: &mut dyn TimerHardware) {
        match self.plan.sync {
            SyncMode::Unsynced => {}
            SyncMode::Digital => {
                if let Some(bridge) = self.bridge.as_mut() {
                    bridge.complete_update(motor_count);
                }
            }
            SyncMode::OneshotSynced => {
                let limit = (motor_count as usize).min(MAX_SUPPORTED_MOTORS);
                for port in &self.ports[..limit] {
                    if !port.enabled {
                        continue;
                    }
                    if port.timer_leader {
                        if let Some(timer) = port.timer {
                            hw.force_overflow(timer);
                        }
                    }
                    if let Some(ccr) = &port.ccr {
                        ccr.store(0);
                    }
                }
            }
        }
    }

    /// Whether a completion call is required before the next cycle.
    #[inline]
    pub fn is_synced(&self) -> bool {
        self.plan.sync != SyncMode::Unsynced
    }

    /// Clear the global enable gate. Takes effect on the next write call;
    /// an already-stored register value is not cleared.
    pub fn disable(&mut self) {
        self.enabled = false;
    }

    /// Set the global enable gate.
    pub fn enable(&mut self) {
        self.enabled = true;
    }

    /// Emergency stop: unconditionally zero every configured compare
    /// register, bypassing the enable gate and the normal write path.
    ///
    /// Only atomic stores — safe from a signal/interrupt context while the
    /// control loop is mid-cycle. Digital slots hold no register here and
    /// are unaffected.
    pub fn shutdown_pulses(&self, motor_count: u8) {
        let limit = (motor_count as usize).min(MAX_SUPPORTED_MOTORS);
        for port in &self.ports[..limit] {
            if let Some(ccr) = &port.ccr {
                ccr.store(0);
            }
        }
    }

    /// Read view of the motor ports.
    pub fn ports(&self) -> &[OutputPort] {
        &self.ports
    }
}
