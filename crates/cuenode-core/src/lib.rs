//! Cue Node Core - Records, state machine, and arbitration primitives
//!
//! This crate defines the core types used throughout the cue node:
//! - Identifiers (DatatypeId, RemoteClock, MacAddress)
//! - Remote records (CueRecord, NodeRecord, AttributesRecord, TransitionTable)
//! - The node state machine (NoCue → InitialPhase → FinalPhase)
//! - The indicator decision table and display priority latch
//! - Collaborator traits for the remote store and hardware

pub mod id;
pub mod record;
pub mod machine;
pub mod indicator;
pub mod display;
pub mod hardware;
pub mod error;

pub use id::*;
pub use record::*;
pub use machine::*;
pub use indicator::*;
pub use display::*;
pub use hardware::*;
pub use error::*;
