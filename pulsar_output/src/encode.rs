//! Pulse-width encoders — command value to timer-tick compare count.
//!
//! Pure, stateless, constant-time. The command domain is nominally
//! 1000..=2000 (µs-equivalent); each protocol maps it onto its own tick
//! scale. ESCs are calibrated against these exact tick counts, so the
//! formulas are load-bearing down to the rounding mode.

use pulsar_common::consts::{
    MULTISHOT_TIMER_MHZ, ONESHOT125_TIMER_MHZ, ONESHOT42_TIMER_MHZ,
};

/// Fixed 5 µs head of every multishot pulse [ticks].
const MULTISHOT_5US_PW: f32 = (MULTISHOT_TIMER_MHZ * 5) as f32;

/// Ticks per command unit above 1000 for multishot.
const MULTISHOT_20US_MULT: f32 = MULTISHOT_TIMER_MHZ as f32 * 20.0 / 1000.0;

/// Protocol-specific compare-value encoder.
///
/// Resolved once at bank configuration time — every channel in a bank
/// shares one protocol, so dispatch happens here rather than through a
/// per-channel function binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PulseEncoder {
    /// `compare = value` (1 µs ticks).
    Standard,
    /// `compare = (value - 1000) * period / 1000` duty-cycle remap.
    Brushed,
    /// `compare = round(value * mhz / 8)`.
    OneShot125,
    /// `compare = round(value * mhz / 24)`.
    OneShot42,
    /// `compare = round((value - 1000) * mhz * 20 / 1000 + mhz * 5)`.
    Multishot,
}

impl PulseEncoder {
    /// Encode a command value into timer ticks for a port with the given
    /// period. Constant time, no allocation.
    #[inline]
    pub fn encode(self, value: u16, period: u16) -> u16 {
        match self {
            Self::Standard => value,
            Self::Brushed => {
                (value.saturating_sub(1000) as u32 * period as u32 / 1000) as u16
            }
            Self::OneShot125 => {
                (value as f32 * ONESHOT125_TIMER_MHZ as f32 / 8.0).round() as u16
            }
            Self::OneShot42 => {
                (value as f32 * ONESHOT42_TIMER_MHZ as f32 / 24.0).round() as u16
            }
            Self::Multishot => {
                (value.saturating_sub(1000) as f32 * MULTISHOT_20US_MULT + MULTISHOT_5US_PW)
                    .round() as u16
            }
        }
    }
}
