//! Output port slots.
//!
//! One `OutputPort` per motor/servo slot, held in fixed-capacity bank
//! arrays. A port that never came up during initialization holds no
//! compare handle, and every runtime operation treats it as a no-op.

use pulsar_common::hw::{CompareHandle, OutputFlags, TimerDescriptor, TimerHardware, TimerId};

/// One output slot bound to a hardware compare register.
#[derive(Debug, Default)]
pub struct OutputPort {
    /// Exclusive compare-register handle. `None` for disabled slots and
    /// for digital slots, whose registers the bridge owns.
    pub(crate) ccr: Option<CompareHandle>,
    /// Ticks per pulse cycle.
    pub(crate) period: u16,
    /// Owning timer peripheral.
    pub(crate) timer: Option<TimerId>,
    /// First enabled port in bank order on its timer. Drives the
    /// one-overflow-per-timer rule during synced completion.
    pub(crate) timer_leader: bool,
    /// Slot came up during initialization.
    pub(crate) enabled: bool,
}

impl OutputPort {
    /// Whether the slot came up during initialization.
    #[inline]
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Ticks per pulse cycle. Zero for slots without a timer.
    #[inline]
    pub fn period(&self) -> u16 {
        self.period
    }

    /// Owning timer, if the slot holds an analog output.
    #[inline]
    pub fn timer(&self) -> Option<TimerId> {
        self.timer
    }

    /// Current compare-register value, if the slot holds one.
    #[inline]
    pub fn compare(&self) -> Option<u16> {
        self.ccr.as_ref().map(CompareHandle::load)
    }
}

/// Program one analog output channel and mint its compare handle.
///
/// Sequence: time base, output compare with the initial pulse value, main
/// output gate (when the descriptor drives a pin), counter start. The
/// freshly minted register is parked at zero; the first write of the next
/// control cycle arms the real pulse width.
pub(crate) fn configure_output(
    hw: &mut dyn TimerHardware,
    descriptor: &TimerDescriptor,
    mhz: u32,
    period: u16,
    pulse: u16,
) -> CompareHandle {
    hw.configure_time_base(descriptor.timer, period, mhz);
    hw.configure_output_compare(descriptor.timer, descriptor.channel, pulse, descriptor.flags);
    if descriptor.flags.contains(OutputFlags::OUTPUT_ENABLED) {
        hw.enable_outputs(descriptor.timer);
    }
    hw.start(descriptor.timer);

    let ccr = hw.compare_handle(descriptor);
    ccr.store(0);
    ccr
}
