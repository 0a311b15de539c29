//! # Pulsar Common Library
//!
//! Shared types for the pulsar motor/servo pulse-output workspace.
//!
//! # Module Structure
//!
//! - [`consts`] - Capacity and timer-clock constants
//! - [`tag`] - Compact pin tags binding output slots to physical pins
//! - [`protocol`] - ESC signaling protocol enum
//! - [`config`] - Motor/servo output configuration (TOML)
//! - [`hw`] - Hardware trait seams and the opaque compare-register handle
//!
//! The output core (`pulsar_output`) consumes the platform exclusively
//! through the traits in [`hw`], enabling isolated construction against a
//! simulation backend in tests.

pub mod config;
pub mod consts;
pub mod hw;
pub mod protocol;
pub mod tag;

// Re-export key types for convenience
pub use crate::config::{ConfigError, MotorConfig, OutputConfig, ServoConfig};
pub use crate::protocol::MotorProtocol;
pub use crate::tag::PinTag;
