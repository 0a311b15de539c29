//! Servo output bank — fixed-rate PWM at the 1 µs tick base.
//!
//! Servos always free-run; there is no synchronization step and no global
//! gate. A write stores the command value directly — the 1 µs tick makes
//! the identity encoding exact.

use pulsar_common::config::ServoConfig;
use pulsar_common::consts::{MAX_SUPPORTED_SERVOS, PWM_TIMER_MHZ};
use pulsar_common::hw::{Owner, OutputFlags, OutputHardware, ResourceKind};
use tracing::{info, warn};

use crate::port::{OutputPort, configure_output};

/// Fixed-capacity servo output bank.
pub struct ServoOutputs {
    ports: [OutputPort; MAX_SUPPORTED_SERVOS],
}

impl ServoOutputs {
    /// Build and populate the servo bank.
    ///
    /// Same monotonic tag-order population as the motor bank: the first
    /// unset or unresolvable tag stops it and later slots stay disabled.
    pub fn init(config: &ServoConfig, hw: &mut dyn OutputHardware) -> Self {
        let mut bank = Self {
            ports: std::array::from_fn(|_| OutputPort::default()),
        };

        let period = (1_000_000 / config.pwm_rate_hz) as u16;
        let mut populated = 0usize;

        for index in 0..MAX_SUPPORTED_SERVOS {
            let tag = config.pin_tag(index);
            if tag.is_none() {
                break;
            }

            let Some(descriptor) = hw.resolve(tag, OutputFlags::OUTPUT_ENABLED) else {
                warn!(slot = index, %tag, "no timer for pin tag; remaining servo slots disabled");
                break;
            };
            let Some(io) = hw.resolve_by_tag(tag) else {
                warn!(slot = index, %tag, "no GPIO for pin tag; remaining servo slots disabled");
                break;
            };
            hw.claim(io, Owner::Servo, ResourceKind::Output, index as u8);
            hw.configure_alternate_function(io);

            let ccr = configure_output(
                hw,
                &descriptor,
                PWM_TIMER_MHZ,
                period,
                config.center_pulse,
            );

            bank.ports[index] = OutputPort {
                ccr: Some(ccr),
                period,
                timer: Some(descriptor.timer),
                timer_leader: false,
                enabled: true,
            };
            populated = index + 1;
        }

        info!(rate_hz = config.pwm_rate_hz, populated, "servo output bank initialized");
        bank
    }

    /// Write one servo's pulse width [µs]. Silent no-op for out-of-range
    /// indices and slots that never came up.
    #[inline]
    pub fn write(&mut self, index: u8, value: u16) {
        if let Some(port) = self.ports.get(index as usize) {
            if let Some(ccr) = &port.ccr {
                ccr.store(value);
            }
        }
    }

    /// Read view of the servo ports.
    pub fn ports(&self) -> &[OutputPort] {
        &self.ports
    }
}
