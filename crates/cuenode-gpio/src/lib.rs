//! Cue Node GPIO - Indicator, button, and display collaborators
//!
//! This crate provides:
//! - Hex color to PWM brightness conversion
//! - The LED panel (indicator light, button light, button input)
//! - The 16x2 character display with priority latch
//! - MAC address discovery
//! - In-memory backends for simulation and tests

pub mod color;
pub mod panel;
pub mod lcd;
pub mod mac;
pub mod sim;

pub use color::*;
pub use panel::*;
pub use lcd::*;
pub use mac::*;
pub use sim::*;
