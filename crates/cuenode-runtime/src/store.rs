//! In-memory remote store
//!
//! Holds the latest value per datatype and every record sent to it. Used
//! by the simulator and the tests in place of the mesh data store.

use std::collections::HashMap;

use parking_lot::Mutex;
use serde_json::Value;

use cuenode_core::{CueError, CueResult, DatatypeId, RemoteStore};

#[derive(Debug, Default)]
struct StoreState {
    values: HashMap<DatatypeId, Value>,
    sent: Vec<(DatatypeId, Value)>,
    reads: HashMap<DatatypeId, usize>,
    receive_failure: Option<String>,
    send_failure: Option<String>,
}

/// Remote store kept in process memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<StoreState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    /// Publish the latest value for a datatype
    pub fn publish(&self, datatype: DatatypeId, value: Value) {
        self.state.lock().values.insert(datatype, value);
    }

    pub fn remove(&self, datatype: DatatypeId) {
        self.state.lock().values.remove(&datatype);
    }

    pub fn latest(&self, datatype: DatatypeId) -> Option<Value> {
        self.state.lock().values.get(&datatype).cloned()
    }

    /// Every record sent so far, in order
    pub fn sent(&self) -> Vec<(DatatypeId, Value)> {
        self.state.lock().sent.clone()
    }

    /// Records sent under one datatype, in order
    pub fn sent_for(&self, datatype: DatatypeId) -> Vec<Value> {
        self.state
            .lock()
            .sent
            .iter()
            .filter(|(d, _)| *d == datatype)
            .map(|(_, v)| v.clone())
            .collect()
    }

    /// Number of `receive_data` calls made for a datatype
    pub fn reads_for(&self, datatype: DatatypeId) -> usize {
        self.state.lock().reads.get(&datatype).copied().unwrap_or(0)
    }

    /// Make every subsequent `receive_data` fail
    pub fn fail_receives(&self, reason: impl Into<String>) {
        self.state.lock().receive_failure = Some(reason.into());
    }

    /// Make every subsequent `send_message` fail
    pub fn fail_sends(&self, reason: impl Into<String>) {
        self.state.lock().send_failure = Some(reason.into());
    }
}

impl RemoteStore for MemoryStore {
    fn receive_data(&self, datatype: DatatypeId, _singular: bool) -> CueResult<Option<Value>> {
        let mut state = self.state.lock();
        *state.reads.entry(datatype).or_default() += 1;
        if let Some(reason) = &state.receive_failure {
            return Err(CueError::Store(reason.clone()));
        }
        Ok(state.values.get(&datatype).cloned())
    }

    fn send_message(&self, record: &Value, datatype: DatatypeId) -> CueResult<()> {
        let mut state = self.state.lock();
        if let Some(reason) = &state.send_failure {
            return Err(CueError::Store(reason.clone()));
        }
        state.sent.push((datatype, record.clone()));
        state.values.insert(datatype, record.clone());
        Ok(())
    }
}
