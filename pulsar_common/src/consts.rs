//! Capacity and timer-clock constants shared across the workspace.

use static_assertions::const_assert;

/// Maximum number of motor output slots a target can expose.
pub const MAX_SUPPORTED_MOTORS: usize = 8;

/// Maximum number of servo output slots a target can expose.
pub const MAX_SUPPORTED_SERVOS: usize = 8;

/// Timer clock for fixed-rate standard/servo PWM [MHz]. One tick = 1 µs.
pub const PWM_TIMER_MHZ: u32 = 1;

/// Timer clock for brushed-motor duty-cycle PWM [MHz].
pub const BRUSHED_TIMER_MHZ: u32 = 8;

/// Timer clock for OneShot125 [MHz] — 8x the 1 µs base.
pub const ONESHOT125_TIMER_MHZ: u32 = 8;

/// Timer clock for OneShot42 [MHz] — 24x the 1 µs base.
pub const ONESHOT42_TIMER_MHZ: u32 = 24;

/// Timer clock for Multishot [MHz].
pub const MULTISHOT_TIMER_MHZ: u32 = 8;

// Write operations index slots with a u8; capacities must fit.
const_assert!(MAX_SUPPORTED_MOTORS <= u8::MAX as usize);
const_assert!(MAX_SUPPORTED_SERVOS <= u8::MAX as usize);
