//! # Pulsar Output Library
//!
//! Motor/servo pulse generation core: converts normalized throttle and
//! servo command values into protocol-correct electrical pulses on
//! hardware-timer-driven outputs.
//!
//! # Module Structure
//!
//! - [`encode`] - Per-protocol command-value → timer-tick encoders
//! - [`select`] - Protocol selection table (clock, encoder, sync mode)
//! - [`port`] - Output port slots and the bank read view
//! - [`motors`] - Motor bank: init, write dispatch, gating, completion
//! - [`servos`] - Servo bank: fixed-rate PWM outputs
//! - [`sim`] - Simulation hardware backend for tests and the demo runner
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      flight-control core                       │
//! │        write(i, v) per cycle  ·  complete_update(n) once       │
//! └──────────────┬─────────────────────────────┬───────────────────┘
//!                ▼                             ▼
//!        ┌──────────────┐              ┌──────────────┐
//!        │ MotorOutputs │              │ ServoOutputs │
//!        └──────┬───────┘              └──────┬───────┘
//!               │  pulsar_common::hw traits   │
//!               ▼                             ▼
//!        platform timers / GPIO  (or sim::SimBoard in tests)
//! ```
//!
//! The control loop writes every channel each cycle, then — only when the
//! configured protocol requires explicit resynchronization — makes a
//! single completion call that forces one timer overflow per distinct
//! timer and re-arms every compare register at zero.

pub mod encode;
pub mod motors;
pub mod port;
pub mod select;
pub mod servos;
pub mod sim;

// Re-export key types for convenience
pub use crate::encode::PulseEncoder;
pub use crate::motors::MotorOutputs;
pub use crate::port::OutputPort;
pub use crate::select::{ProtocolPlan, SyncMode};
pub use crate::servos::ServoOutputs;
