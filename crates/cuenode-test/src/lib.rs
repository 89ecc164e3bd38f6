//! Cue Node Test Harness - Show simulation and end-to-end scenarios
//!
//! This crate provides:
//! - A show controller that scripts the remote store
//! - Fully simulated nodes (store, LEDs, display, error log)
//! - End-to-end scenario tests against the real orchestrator

pub mod show;
pub mod scenario;

pub use show::*;
pub use scenario::*;
