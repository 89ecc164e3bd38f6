//! Node state machine task
//!
//! Owns the node record. Each ready cycle it steps the pure machine
//! against the tracked cue and publishes the record when it changes.

use std::convert::Infallible;

use parking_lot::Mutex;
use serde_json::Value;
use tracing::{debug, info};

use cuenode_core::{
    node_field_text, CueRecord, CueResult, Decision, IndicatorHardware, NodeMachine, NodePhase,
    NodeRecord, RemoteStore, TransitionFlags, TransitionTable, FIELD_CUE_NUMBER,
    NONE_SENTINEL,
};

use crate::{CueTracker, NodeConfig, ReadinessGate, SetupGroup};

/// Wait between deciding an update and publishing it, in time-units
pub const PUBLISH_DEBOUNCE_UNITS: f64 = 1.0;

/// Pause between cycles, in time-units
pub const MACHINE_CYCLE_UNITS: f64 = 1.0;

/// Shared cell around [`NodeMachine`].
///
/// Every read or mutation that spans more than one field happens under
/// the one lock, and the lock is never held across a suspension point.
#[derive(Debug, Default)]
pub struct NodeStateMachine {
    machine: Mutex<NodeMachine>,
}

impl NodeStateMachine {
    pub fn new() -> Self {
        NodeStateMachine::default()
    }

    pub fn snapshot(&self) -> Option<NodeRecord> {
        self.machine.lock().record().cloned()
    }

    pub fn flags(&self) -> TransitionFlags {
        self.machine.lock().flags()
    }

    pub fn phase(&self) -> NodePhase {
        self.machine.lock().phase()
    }

    /// Record field as text, or the sentinel when there is no record
    pub fn field_text(&self, name: &str) -> String {
        node_field_text(self.machine.lock().record(), name)
    }

    /// `(cue_state, node_state)` for LED arbitration
    pub fn led_inputs(&self) -> (String, String) {
        let machine = self.machine.lock();
        match machine.record() {
            Some(record) => (record.cue_state().to_string(), record.node_state().to_string()),
            None => (NONE_SENTINEL.to_string(), NONE_SENTINEL.to_string()),
        }
    }

    /// Request the final state if none is pending and `pressed` reports a
    /// press. Returns whether a change was requested.
    pub fn request_change_if(&self, pressed: impl FnOnce() -> bool) -> bool {
        let mut machine = self.machine.lock();
        if machine.change_requested() || !pressed() {
            return false;
        }
        machine.request_change();
        true
    }

    /// Step the machine once. A newly claimed cue also discards any stale
    /// press on the hardware button.
    pub fn evaluate<H: IndicatorHardware>(
        &self,
        hw: &H,
        cue: Option<&CueRecord>,
        table: &TransitionTable,
        node_number: &Value,
    ) -> CueResult<Decision> {
        let mut machine = self.machine.lock();
        let decision = machine.step(cue, table, node_number)?;

        match decision {
            Decision::StartCue => {
                hw.reset_button_pressed();
                if let Some(record) = machine.record() {
                    info!(
                        cue = %record.cue_number_text(),
                        cue_state = record.cue_state(),
                        node_state = record.node_state(),
                        "claimed cue"
                    );
                }
            }
            Decision::Advance => {
                if let Some(record) = machine.record() {
                    info!(
                        cue = %record.cue_number_text(),
                        node_state = record.node_state(),
                        "advanced to final state"
                    );
                }
            }
            Decision::Hold => {}
        }

        Ok(decision)
    }

    pub async fn run<S, H>(
        &self,
        store: &S,
        hw: &H,
        gate: &ReadinessGate,
        setup: &SetupGroup,
        tracker: &CueTracker,
        config: &NodeConfig,
    ) -> CueResult<Infallible>
    where
        S: RemoteStore,
        H: IndicatorHardware,
    {
        let view = setup.wait().await;
        let node_number = view.attributes.node_number();

        loop {
            gate.await_ready().await;

            let cue = tracker.current();
            let decision = self.evaluate(hw, cue.as_ref(), view.transitions, &node_number)?;

            if decision.is_update() {
                tokio::time::sleep(config.units(PUBLISH_DEBOUNCE_UNITS)).await;

                let stamped = self.machine.lock().stamp(gate.last_clock());
                if let Some(record) = stamped {
                    store.send_message(&record.to_value()?, config.datatypes.node)?;
                    debug!(
                        cue = %node_field_text(Some(&record), FIELD_CUE_NUMBER),
                        node_state = record.node_state(),
                        "published node record"
                    );
                }
            }

            tokio::time::sleep(config.units(MACHINE_CYCLE_UNITS)).await;
        }
    }
}
