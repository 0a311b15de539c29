//! Hardware trait seams consumed by the output core.
//!
//! The output banks never touch timer registers or GPIO directly; they go
//! through these traits, which a platform (or the simulation backend)
//! implements. This keeps the core constructible in isolation for tests.

use crate::protocol::MotorProtocol;
use crate::tag::PinTag;
use bitflags::bitflags;
use std::sync::Arc;
use std::sync::atomic::{AtomicU16, Ordering};

bitflags! {
    /// Capability and polarity flags carried by a timer channel descriptor.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct OutputFlags: u8 {
        /// Channel drives a physical output pin.
        const OUTPUT_ENABLED = 0b0000_0001;
        /// Complementary (N) channel of the timer.
        const N_CHANNEL = 0b0000_0010;
        /// Output polarity is inverted.
        const INVERTED = 0b0000_0100;
    }
}

/// Identity of one hardware timer peripheral.
///
/// Channels sharing a `TimerId` share a counter, prescaler, and period;
/// a forced overflow on the timer restarts every channel on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(pub u8);

/// Resolved timer channel for one output pin.
#[derive(Debug, Clone, Copy)]
pub struct TimerDescriptor {
    /// Owning timer peripheral.
    pub timer: TimerId,
    /// Capture/compare channel number on that timer.
    pub channel: u8,
    /// Output capability/polarity flags.
    pub flags: OutputFlags,
}

/// Opaque handle to one hardware compare-register slot.
///
/// Minted once per channel by [`TimerHardware::compare_handle`]; the port
/// that receives it owns it exclusively for the session. Only `store` and
/// `load` are exposed — no raw address ever escapes this type. Stores are
/// atomic, so emergency shutdown may zero registers from a signal or
/// interrupt context while the control loop runs.
#[derive(Debug)]
pub struct CompareHandle {
    cell: Arc<AtomicU16>,
}

impl CompareHandle {
    /// Wrap a register cell. Hardware backends call this once per channel.
    pub fn new(cell: Arc<AtomicU16>) -> Self {
        Self { cell }
    }

    /// Store a compare value. Takes effect when the timer next wraps.
    #[inline]
    pub fn store(&self, value: u16) {
        self.cell.store(value, Ordering::Relaxed);
    }

    /// Read back the last stored compare value.
    #[inline]
    pub fn load(&self) -> u16 {
        self.cell.load(Ordering::Relaxed)
    }
}

/// Opaque handle to a resolved GPIO pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GpioHandle(pub PinTag);

/// Subsystem claiming a GPIO resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Owner {
    /// Motor output slot.
    Motor,
    /// Servo output slot.
    Servo,
}

/// Kind of resource being claimed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    /// Timer-driven output pin.
    Output,
}

/// Timer peripheral programming primitives.
pub trait TimerHardware {
    /// Program the timer's period (ticks per cycle) and clock [MHz].
    fn configure_time_base(&mut self, timer: TimerId, period: u16, mhz: u32);

    /// Program an output-compare channel with an initial pulse value.
    fn configure_output_compare(
        &mut self,
        timer: TimerId,
        channel: u8,
        pulse: u16,
        flags: OutputFlags,
    );

    /// Enable the timer's physical outputs (advanced-timer main-output gate).
    fn enable_outputs(&mut self, timer: TimerId);

    /// Start the timer counting.
    fn start(&mut self, timer: TimerId);

    /// Mint the exclusive compare-register handle for a channel.
    ///
    /// Called at most once per channel per session; the returned handle is
    /// owned by exactly one output port from then on.
    fn compare_handle(&mut self, descriptor: &TimerDescriptor) -> CompareHandle;

    /// Immediately reset the timer's counter to zero, ending the current
    /// pulse and restarting pulse timing on every channel of the timer.
    fn force_overflow(&mut self, timer: TimerId);
}

/// GPIO resolution and ownership bookkeeping.
pub trait GpioManager {
    /// Resolve a pin tag to a GPIO handle, if the pin exists on the target.
    fn resolve_by_tag(&mut self, tag: PinTag) -> Option<GpioHandle>;

    /// Record ownership of the pin for resource diagnostics.
    fn claim(&mut self, handle: GpioHandle, owner: Owner, kind: ResourceKind, index: u8);

    /// Switch the pin to its timer alternate function, push-pull.
    fn configure_alternate_function(&mut self, handle: GpioHandle);
}

/// Pin-tag to timer-channel resolution.
pub trait TimerResolver {
    /// Find a timer channel for the tag with at least the required flags.
    /// `None` means the slot cannot be driven and stays disabled.
    fn resolve(&mut self, tag: PinTag, required: OutputFlags) -> Option<TimerDescriptor>;
}

/// Everything the output banks need from the platform at init time.
pub trait OutputHardware: TimerHardware + GpioManager + TimerResolver {}

impl<T: TimerHardware + GpioManager + TimerResolver> OutputHardware for T {}

/// Digital-protocol (Dshot) bridge.
///
/// Present only on targets that support digital protocols. The bridge owns
/// bit encoding, DMA, and pulse-train completion; the output core only
/// routes writes and the per-cycle completion call to it.
pub trait DshotBridge {
    /// Configure timer hardware for digital signaling on one motor slot.
    fn configure_hardware(
        &mut self,
        descriptor: &TimerDescriptor,
        index: u8,
        protocol: MotorProtocol,
    );

    /// Queue a command value for one motor slot.
    fn write(&mut self, index: u8, value: u16);

    /// Kick off transmission of all queued frames for this cycle.
    fn complete_update(&mut self, motor_count: u8);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compare_handle_store_load() {
        let cell = Arc::new(AtomicU16::new(0));
        let handle = CompareHandle::new(cell.clone());
        handle.store(1500);
        assert_eq!(handle.load(), 1500);
        // The backing cell observes the store — this is the "hardware" side.
        assert_eq!(cell.load(Ordering::Relaxed), 1500);
    }

    #[test]
    fn output_flags_combine() {
        let flags = OutputFlags::OUTPUT_ENABLED | OutputFlags::INVERTED;
        assert!(flags.contains(OutputFlags::OUTPUT_ENABLED));
        assert!(!flags.contains(OutputFlags::N_CHANNEL));
    }
}
