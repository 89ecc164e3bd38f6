//! Node state machine
//!
//! A node moves `NoCue → InitialPhase → FinalPhase` and re-enters
//! `InitialPhase` whenever a materially new cue arrives (cue number or cue
//! state differs from the current record). The decision is a pure function
//! of the current record, the tracked cue, and the transition flags; the
//! table lookups happen only when applying it.

use serde_json::Value;

use crate::{CueRecord, CueResult, NodeRecord, RemoteClock, TransitionTable};

/// Governs whether the node state may advance from initial to final
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TransitionFlags {
    /// The button asked for the final node state
    pub change_requested: bool,
    /// The node state is still the cue's initial state
    pub at_initial_phase: bool,
}

impl TransitionFlags {
    /// Flags for a freshly claimed cue
    pub const FRESH: TransitionFlags = TransitionFlags {
        change_requested: false,
        at_initial_phase: true,
    };
}

impl Default for TransitionFlags {
    fn default() -> Self {
        TransitionFlags::FRESH
    }
}

/// Where the node is in handling its current cue
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodePhase {
    /// No cue has been claimed yet
    NoCue,
    /// Holding the cue's initial node state
    InitialPhase,
    /// Advanced to the cue's final node state
    FinalPhase,
}

impl NodePhase {
    pub fn of(record: Option<&NodeRecord>, flags: TransitionFlags) -> Self {
        match record {
            None => NodePhase::NoCue,
            Some(_) if flags.at_initial_phase => NodePhase::InitialPhase,
            Some(_) => NodePhase::FinalPhase,
        }
    }
}

/// What one evaluation cycle does to the node record
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decision {
    /// Leave the record as it is
    Hold,
    /// Claim the tracked cue and adopt its initial node state
    StartCue,
    /// Adopt the cue's final node state
    Advance,
}

impl Decision {
    /// Whether the record changed and must be republished
    pub fn is_update(self) -> bool {
        !matches!(self, Decision::Hold)
    }
}

/// Decide the next step without touching any state
pub fn decide(
    current: Option<&NodeRecord>,
    cue: Option<&CueRecord>,
    flags: TransitionFlags,
) -> Decision {
    let Some(cue) = cue else {
        return Decision::Hold;
    };

    match current {
        Some(record) if record.cue.same_cue(cue) => {
            if flags.change_requested && flags.at_initial_phase {
                Decision::Advance
            } else {
                Decision::Hold
            }
        }
        _ => Decision::StartCue,
    }
}

/// The node's authoritative record plus its transition flags
#[derive(Clone, Debug, Default)]
pub struct NodeMachine {
    record: Option<NodeRecord>,
    flags: TransitionFlags,
}

impl NodeMachine {
    pub fn new() -> Self {
        NodeMachine::default()
    }

    pub fn record(&self) -> Option<&NodeRecord> {
        self.record.as_ref()
    }

    pub fn flags(&self) -> TransitionFlags {
        self.flags
    }

    pub fn phase(&self) -> NodePhase {
        NodePhase::of(self.record.as_ref(), self.flags)
    }

    pub fn change_requested(&self) -> bool {
        self.flags.change_requested
    }

    /// Record a button request to advance to the final state
    pub fn request_change(&mut self) {
        self.flags.change_requested = true;
    }

    /// Evaluate one cycle against the tracked cue.
    ///
    /// An unknown cue state leaves the machine untouched and returns the
    /// error.
    pub fn step(
        &mut self,
        cue: Option<&CueRecord>,
        table: &TransitionTable,
        node_number: &Value,
    ) -> CueResult<Decision> {
        let decision = decide(self.record.as_ref(), cue, self.flags);

        match decision {
            Decision::StartCue => {
                if let Some(cue) = cue {
                    let initial = table.initial(&cue.cue_state)?;
                    self.record = Some(NodeRecord::from_cue(cue, initial, node_number.clone()));
                    self.flags = TransitionFlags::FRESH;
                }
            }
            Decision::Advance => {
                if let Some(record) = self.record.as_mut() {
                    let final_state = table.final_state(&record.cue.cue_state)?;
                    record.node_state = final_state.to_string();
                    self.flags.at_initial_phase = false;
                }
            }
            Decision::Hold => {}
        }

        Ok(decision)
    }

    /// Stamp the record with the last observed remote clock and return a
    /// copy for publishing
    pub fn stamp(&mut self, clock: Option<RemoteClock>) -> Option<NodeRecord> {
        let record = self.record.as_mut()?;
        record.timestamp = clock;
        Some(record.clone())
    }
}
