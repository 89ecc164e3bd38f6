//! Cue Node Runtime - Task orchestration for a field cue node
//!
//! The node runs these loops concurrently for its whole lifetime:
//! 1. Readiness gate (remote clock freshness)
//! 2. Setup group (attribute + transition table synchronizers)
//! 3. Cue tracker
//! 4. Node state machine (derive and publish the node record)
//! 5. Display presenter
//! 6. LED arbiter and LED runner
//! 7. Button monitor
//!
//! Any failure in any loop tears the whole node down (see [`CueNode::run`]).

pub mod config;
pub mod logging;
pub mod store;
pub mod errlog;
pub mod readiness;
pub mod sync;
pub mod tracker;
pub mod node_state;
pub mod presenter;
pub mod leds;
pub mod button;
pub mod orchestrator;

pub use config::*;
pub use logging::*;
pub use store::*;
pub use errlog::*;
pub use readiness::*;
pub use sync::*;
pub use tracker::*;
pub use node_state::*;
pub use presenter::*;
pub use leds::*;
pub use button::*;
pub use orchestrator::*;
