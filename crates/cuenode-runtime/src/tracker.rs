//! Cue tracker
//!
//! Follows the remote cue table and keeps the cue addressed to this node's
//! prefix.

use std::convert::Infallible;

use parking_lot::RwLock;
use tracing::{debug, info, warn};

use cuenode_core::{CueRecord, CueResult, DatatypeId, RemoteStore, FIELD_CUE_NUMBER};

use crate::{NodeConfig, ReadinessGate, SetupGroup};

/// Pause after a lookup miss, in time-units
pub const TRACKER_MISS_UNITS: f64 = 1.0;

/// Pause between polls, in time-units
pub const TRACKER_CYCLE_UNITS: f64 = 1.0;

/// Latest cue seen for this node's prefix
#[derive(Debug, Default)]
pub struct CueTracker {
    current: RwLock<Option<CueRecord>>,
}

impl CueTracker {
    pub fn new() -> Self {
        CueTracker::default()
    }

    pub fn current(&self) -> Option<CueRecord> {
        self.current.read().clone()
    }

    /// One lookup; returns false on a miss, leaving the last cue in place
    pub fn poll<S: RemoteStore>(
        &self,
        store: &S,
        prefix: &str,
        datatype: DatatypeId,
    ) -> CueResult<bool> {
        let Some(table) = store.receive_data(datatype, true)? else {
            return Ok(false);
        };

        let cue = match CueRecord::lookup(&table, prefix) {
            Ok(Some(cue)) => cue,
            Ok(None) => return Ok(false),
            Err(err) => {
                warn!(prefix, %err, "ignoring malformed cue");
                return Ok(false);
            }
        };

        let mut current = self.current.write();
        if current.as_ref().map_or(true, |c| !c.same_cue(&cue)) {
            info!(
                prefix,
                cue = %cue.field_text(FIELD_CUE_NUMBER),
                state = %cue.cue_state,
                "new cue"
            );
        }
        *current = Some(cue);
        Ok(true)
    }

    pub async fn run<S: RemoteStore>(
        &self,
        store: &S,
        gate: &ReadinessGate,
        setup: &SetupGroup,
        config: &NodeConfig,
    ) -> CueResult<Infallible> {
        let prefix = setup.wait().await.attributes.cue_prefix();

        loop {
            gate.await_ready().await;
            if !self.poll(store, &prefix, config.datatypes.current)? {
                debug!(prefix = %prefix, "no cue for prefix");
                tokio::time::sleep(config.units(TRACKER_MISS_UNITS)).await;
            }
            tokio::time::sleep(config.units(TRACKER_CYCLE_UNITS)).await;
        }
    }
}
