//! Show controller
//!
//! Plays the upstream side of a show against a [`MemoryStore`]: the remote
//! clock, node attributes, the transition table, and the current cue per
//! prefix.

use std::convert::Infallible;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Map, Value};
use tracing::info;

use cuenode_core::{
    CueError, CueRecord, CueResult, DatatypeId, DatatypeIds, MacAddress, NodeRecord, TransitionTable,
    ATTR_CUE_PREFIX, ATTR_NODE_NAME, ATTR_NODE_NUMBER,
};
use cuenode_gpio::SimulatedLeds;
use cuenode_runtime::{MemoryStore, NodeConfig};

/// Upstream event in a scripted show
#[derive(Clone, Debug, PartialEq)]
pub enum ShowAction {
    /// Publish attributes for a node
    Attributes {
        mac: MacAddress,
        number: Value,
        name: String,
        prefix: String,
    },
    Transitions(TransitionTable),
    /// Set the current cue for a prefix
    Cue { prefix: String, cue: CueRecord },
    ClearCue { prefix: String },
    /// Press the node's button
    Press,
    /// Stop ticking the remote clock
    StopClock,
    StartClock,
}

/// An action at a point in show time, measured in time-units
#[derive(Clone, Debug, PartialEq)]
pub struct ShowStep {
    pub at: f64,
    pub action: ShowAction,
}

impl ShowStep {
    pub fn new(at: f64, action: ShowAction) -> Self {
        ShowStep { at, action }
    }
}

/// Scripts the remote store the way the show's control desk would
pub struct ShowController {
    store: Arc<MemoryStore>,
    datatypes: DatatypeIds,
    ticks: AtomicU64,
    clock_running: AtomicBool,
}

impl ShowController {
    pub fn new(store: Arc<MemoryStore>, datatypes: DatatypeIds) -> Self {
        ShowController {
            store,
            datatypes,
            ticks: AtomicU64::new(0),
            clock_running: AtomicBool::new(true),
        }
    }

    pub fn store(&self) -> &Arc<MemoryStore> {
        &self.store
    }

    /// Advance the remote clock by one tick
    pub fn tick(&self) -> u64 {
        let tick = self.ticks.fetch_add(1, Ordering::AcqRel) + 1;
        self.store
            .publish(self.datatypes.online, json!(format!("t{tick}")));
        tick
    }

    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::Acquire)
    }

    pub fn set_clock_running(&self, running: bool) {
        self.clock_running.store(running, Ordering::Release);
    }

    pub fn publish_attributes(&self, mac: &MacAddress, number: Value, name: &str, prefix: &str) {
        let mut table = self.table(self.datatypes.attributes);
        table.insert(
            mac.as_str().to_string(),
            json!({
                ATTR_NODE_NUMBER: number,
                ATTR_NODE_NAME: name,
                ATTR_CUE_PREFIX: prefix,
            }),
        );
        self.store.publish(self.datatypes.attributes, Value::Object(table));
    }

    pub fn publish_transitions(&self, table: &TransitionTable) -> CueResult<()> {
        let value = serde_json::to_value(table)?;
        self.store.publish(self.datatypes.cue_to_node, value);
        Ok(())
    }

    pub fn publish_cue(&self, prefix: &str, cue: &CueRecord) -> CueResult<()> {
        let mut table = self.table(self.datatypes.current);
        table.insert(prefix.to_string(), serde_json::to_value(cue)?);
        self.store.publish(self.datatypes.current, Value::Object(table));
        Ok(())
    }

    pub fn clear_cue(&self, prefix: &str) {
        let mut table = self.table(self.datatypes.current);
        table.remove(prefix);
        self.store.publish(self.datatypes.current, Value::Object(table));
    }

    /// Node records published so far, oldest first
    pub fn node_records(&self) -> CueResult<Vec<NodeRecord>> {
        self.store
            .sent_for(self.datatypes.node)
            .into_iter()
            .map(|v| serde_json::from_value(v).map_err(CueError::from))
            .collect()
    }

    pub fn apply(&self, action: &ShowAction, leds: &SimulatedLeds) -> CueResult<()> {
        match action {
            ShowAction::Attributes {
                mac,
                number,
                name,
                prefix,
            } => self.publish_attributes(mac, number.clone(), name, prefix),
            ShowAction::Transitions(table) => self.publish_transitions(table)?,
            ShowAction::Cue { prefix, cue } => self.publish_cue(prefix, cue)?,
            ShowAction::ClearCue { prefix } => self.clear_cue(prefix),
            ShowAction::Press => leds.press(),
            ShowAction::StopClock => self.set_clock_running(false),
            ShowAction::StartClock => self.set_clock_running(true),
        }
        info!(action = ?action, "show step");
        Ok(())
    }

    /// Tick the clock every `period` while it is running
    pub async fn run_clock(&self, period: Duration) -> Infallible {
        loop {
            if self.clock_running.load(Ordering::Acquire) {
                self.tick();
            }
            tokio::time::sleep(period).await;
        }
    }

    /// Apply each step at its time, relative to the call
    pub async fn play(
        &self,
        script: &[ShowStep],
        leds: &SimulatedLeds,
        config: &NodeConfig,
    ) -> CueResult<()> {
        let start = tokio::time::Instant::now();
        for step in script {
            tokio::time::sleep_until(start + config.units(step.at)).await;
            self.apply(&step.action, leds)?;
        }
        Ok(())
    }

    fn table(&self, datatype: DatatypeId) -> Map<String, Value> {
        match self.store.latest(datatype) {
            Some(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }
}
