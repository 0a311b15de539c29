//! Simulation hardware backend.
//!
//! Software stand-in for the timer/GPIO seams, used by unit tests,
//! integration tests, benches, and the demo runner. Every configuration
//! call is recorded so tests can assert on exactly what the core
//! programmed; compare registers are real atomic cells, so stored values
//! can be read back through [`SimBoard::register`].

use pulsar_common::hw::{
    CompareHandle, DshotBridge, GpioHandle, GpioManager, Owner, OutputFlags, ResourceKind,
    TimerDescriptor, TimerHardware, TimerId, TimerResolver,
};
use pulsar_common::protocol::MotorProtocol;
use pulsar_common::tag::PinTag;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU16, Ordering};
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Recorded time-base configuration for one timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeBase {
    /// Ticks per cycle.
    pub period: u16,
    /// Timer clock [MHz].
    pub mhz: u32,
}

/// Recorded output-compare channel configuration.
#[derive(Debug, Clone, Copy)]
pub struct OcRecord {
    /// Timer the channel belongs to.
    pub timer: TimerId,
    /// Channel number.
    pub channel: u8,
    /// Initial pulse value programmed at configuration.
    pub pulse: u16,
    /// Output flags passed through.
    pub flags: OutputFlags,
}

/// Recorded GPIO ownership claim.
#[derive(Debug, Clone, Copy)]
pub struct ClaimRecord {
    /// Claimed pin.
    pub pin: PinTag,
    /// Claiming subsystem.
    pub owner: Owner,
    /// Resource kind.
    pub kind: ResourceKind,
    /// Slot index within the owner's bank.
    pub index: u8,
}

/// Simulated board: pin map plus recorded timer/GPIO state.
///
/// Pins must be mapped to timer channels up front with [`map_pin`];
/// unmapped tags fail to resolve, which is how tests exercise the
/// stop-population path.
///
/// [`map_pin`]: SimBoard::map_pin
#[derive(Debug, Default)]
pub struct SimBoard {
    channels: HashMap<PinTag, TimerDescriptor>,
    registers: HashMap<(TimerId, u8), Arc<AtomicU16>>,
    time_bases: HashMap<TimerId, TimeBase>,
    oc_records: Vec<OcRecord>,
    outputs_enabled: HashSet<TimerId>,
    started: HashSet<TimerId>,
    overflows: HashMap<TimerId, u32>,
    claims: Vec<ClaimRecord>,
    af_pins: Vec<PinTag>,
}

impl SimBoard {
    /// Empty board with no pins mapped.
    pub fn new() -> Self {
        Self::default()
    }

    /// Map a pin to a timer channel with output capability.
    pub fn map_pin(&mut self, tag: PinTag, timer: TimerId, channel: u8) {
        self.map_pin_with_flags(tag, timer, channel, OutputFlags::OUTPUT_ENABLED);
    }

    /// Map a pin to a timer channel with explicit flags.
    pub fn map_pin_with_flags(
        &mut self,
        tag: PinTag,
        timer: TimerId,
        channel: u8,
        flags: OutputFlags,
    ) {
        self.channels.insert(
            tag,
            TimerDescriptor {
                timer,
                channel,
                flags,
            },
        );
    }

    // ─── Inspection ─────────────────────────────────────────────────

    /// Last programmed time base for a timer.
    pub fn time_base(&self, timer: TimerId) -> Option<TimeBase> {
        self.time_bases.get(&timer).copied()
    }

    /// All output-compare configuration calls, in order.
    pub fn oc_records(&self) -> &[OcRecord] {
        &self.oc_records
    }

    /// Current compare-register value for a channel, if one was minted.
    pub fn register(&self, timer: TimerId, channel: u8) -> Option<u16> {
        self.registers
            .get(&(timer, channel))
            .map(|cell| cell.load(Ordering::Relaxed))
    }

    /// Number of forced overflows seen by a timer.
    pub fn overflow_count(&self, timer: TimerId) -> u32 {
        self.overflows.get(&timer).copied().unwrap_or(0)
    }

    /// Whether the timer was started.
    pub fn started(&self, timer: TimerId) -> bool {
        self.started.contains(&timer)
    }

    /// Whether the timer's main output gate was enabled.
    pub fn outputs_enabled(&self, timer: TimerId) -> bool {
        self.outputs_enabled.contains(&timer)
    }

    /// All GPIO ownership claims, in order.
    pub fn claims(&self) -> &[ClaimRecord] {
        &self.claims
    }

    /// Pins switched to their timer alternate function, in order.
    pub fn af_pins(&self) -> &[PinTag] {
        &self.af_pins
    }
}

impl TimerHardware for SimBoard {
    fn configure_time_base(&mut self, timer: TimerId, period: u16, mhz: u32) {
        debug!(timer = timer.0, period, mhz, "sim: time base configured");
        self.time_bases.insert(timer, TimeBase { period, mhz });
    }

    fn configure_output_compare(
        &mut self,
        timer: TimerId,
        channel: u8,
        pulse: u16,
        flags: OutputFlags,
    ) {
        self.oc_records.push(OcRecord {
            timer,
            channel,
            pulse,
            flags,
        });
        // The OC init programs the compare register itself.
        self.registers
            .entry((timer, channel))
            .or_insert_with(|| Arc::new(AtomicU16::new(0)))
            .store(pulse, Ordering::Relaxed);
    }

    fn enable_outputs(&mut self, timer: TimerId) {
        self.outputs_enabled.insert(timer);
    }

    fn start(&mut self, timer: TimerId) {
        self.started.insert(timer);
    }

    fn compare_handle(&mut self, descriptor: &TimerDescriptor) -> CompareHandle {
        let cell = self
            .registers
            .entry((descriptor.timer, descriptor.channel))
            .or_insert_with(|| Arc::new(AtomicU16::new(0)))
            .clone();
        CompareHandle::new(cell)
    }

    fn force_overflow(&mut self, timer: TimerId) {
        debug!(timer = timer.0, "sim: forced overflow");
        *self.overflows.entry(timer).or_insert(0) += 1;
    }
}

impl GpioManager for SimBoard {
    fn resolve_by_tag(&mut self, tag: PinTag) -> Option<GpioHandle> {
        if tag.is_none() {
            None
        } else {
            Some(GpioHandle(tag))
        }
    }

    fn claim(&mut self, handle: GpioHandle, owner: Owner, kind: ResourceKind, index: u8) {
        self.claims.push(ClaimRecord {
            pin: handle.0,
            owner,
            kind,
            index,
        });
    }

    fn configure_alternate_function(&mut self, handle: GpioHandle) {
        self.af_pins.push(handle.0);
    }
}

impl TimerResolver for SimBoard {
    fn resolve(&mut self, tag: PinTag, required: OutputFlags) -> Option<TimerDescriptor> {
        let descriptor = self.channels.get(&tag)?;
        if descriptor.flags.contains(required) {
            Some(*descriptor)
        } else {
            None
        }
    }
}

// ─── Digital Bridge ─────────────────────────────────────────────────

#[derive(Debug, Default)]
struct DshotLogInner {
    configured: Vec<(u8, MotorProtocol, TimerId)>,
    writes: Vec<(u8, u16)>,
    completions: Vec<u8>,
}

/// Shared observation handle for a [`SimDshotBridge`].
///
/// The bridge itself is moved into the motor bank at init; tests keep the
/// log handle to assert on what was routed through.
#[derive(Debug, Clone, Default)]
pub struct DshotLog {
    inner: Arc<Mutex<DshotLogInner>>,
}

impl DshotLog {
    /// Hardware configuration calls: (slot, protocol, timer).
    pub fn configured(&self) -> Vec<(u8, MotorProtocol, TimerId)> {
        self.inner.lock().unwrap().configured.clone()
    }

    /// Queued write calls: (slot, value).
    pub fn writes(&self) -> Vec<(u8, u16)> {
        self.inner.lock().unwrap().writes.clone()
    }

    /// Completion calls, one motor count per call.
    pub fn completions(&self) -> Vec<u8> {
        self.inner.lock().unwrap().completions.clone()
    }
}

/// Recording digital-protocol bridge.
#[derive(Debug, Default)]
pub struct SimDshotBridge {
    log: DshotLog,
}

impl SimDshotBridge {
    /// Create a bridge plus the log handle that outlives it.
    pub fn new() -> (Self, DshotLog) {
        let log = DshotLog::default();
        (Self { log: log.clone() }, log)
    }
}

impl DshotBridge for SimDshotBridge {
    fn configure_hardware(
        &mut self,
        descriptor: &TimerDescriptor,
        index: u8,
        protocol: MotorProtocol,
    ) {
        self.log
            .inner
            .lock()
            .unwrap()
            .configured
            .push((index, protocol, descriptor.timer));
    }

    fn write(&mut self, index: u8, value: u16) {
        self.log.inner.lock().unwrap().writes.push((index, value));
    }

    fn complete_update(&mut self, motor_count: u8) {
        self.log.inner.lock().unwrap().completions.push(motor_count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unmapped_tag_does_not_resolve() {
        let mut board = SimBoard::new();
        board.map_pin(PinTag::new(0, 0), TimerId(1), 1);
        assert!(
            board
                .resolve(PinTag::new(0, 0), OutputFlags::OUTPUT_ENABLED)
                .is_some()
        );
        assert!(
            board
                .resolve(PinTag::new(0, 1), OutputFlags::OUTPUT_ENABLED)
                .is_none()
        );
    }

    #[test]
    fn resolve_honors_required_flags() {
        let mut board = SimBoard::new();
        board.map_pin_with_flags(PinTag::new(0, 0), TimerId(1), 1, OutputFlags::N_CHANNEL);
        assert!(
            board
                .resolve(PinTag::new(0, 0), OutputFlags::OUTPUT_ENABLED)
                .is_none()
        );
        assert!(
            board
                .resolve(PinTag::new(0, 0), OutputFlags::N_CHANNEL)
                .is_some()
        );
    }

    #[test]
    fn compare_handle_shares_cell_with_register_view() {
        let mut board = SimBoard::new();
        let descriptor = TimerDescriptor {
            timer: TimerId(3),
            channel: 2,
            flags: OutputFlags::OUTPUT_ENABLED,
        };
        let handle = board.compare_handle(&descriptor);
        handle.store(1200);
        assert_eq!(board.register(TimerId(3), 2), Some(1200));
    }

    #[test]
    fn overflow_counting() {
        let mut board = SimBoard::new();
        assert_eq!(board.overflow_count(TimerId(1)), 0);
        board.force_overflow(TimerId(1));
        board.force_overflow(TimerId(1));
        assert_eq!(board.overflow_count(TimerId(1)), 2);
        assert_eq!(board.overflow_count(TimerId(2)), 0);
    }

    #[test]
    fn bridge_log_outlives_bridge() {
        let (mut bridge, log) = SimDshotBridge::new();
        bridge.write(0, 48);
        bridge.complete_update(4);
        drop(bridge);
        assert_eq!(log.writes(), vec![(0, 48)]);
        assert_eq!(log.completions(), vec![4]);
    }
}
