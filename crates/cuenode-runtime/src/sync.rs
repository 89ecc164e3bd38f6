//! Attribute and transition table synchronizers
//!
//! Both fetch a remote record once fresh data is available, retry with a
//! fixed backoff until the record is present, and then keep it for the
//! node's lifetime. Together they form the setup group the other loops
//! wait on.

use std::sync::OnceLock;

use serde_json::Value;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use cuenode_core::{
    AttributesRecord, CueResult, DatatypeId, MacAddress, RemoteStore, TransitionTable,
    ATTR_CUE_PREFIX, ATTR_NODE_NAME, ATTR_NODE_NUMBER, NONE_SENTINEL,
};

use crate::{NodeConfig, ReadinessGate};

/// Backoff after a failed lookup, in time-units
pub const SYNC_BACKOFF_UNITS: f64 = 5.0;

/// Fetches and caches this node's attributes
#[derive(Debug)]
pub struct AttributeSync {
    mac: MacAddress,
    cache: OnceLock<AttributesRecord>,
}

impl AttributeSync {
    pub fn new(mac: MacAddress) -> Self {
        AttributeSync {
            mac,
            cache: OnceLock::new(),
        }
    }

    pub fn mac(&self) -> &MacAddress {
        &self.mac
    }

    pub fn record(&self) -> Option<&AttributesRecord> {
        self.cache.get()
    }

    /// Attribute text, or the sentinel before the first successful fetch
    pub fn get(&self, key: &str) -> String {
        self.cache
            .get()
            .map(|attrs| attrs.text(key))
            .unwrap_or_else(|| NONE_SENTINEL.to_string())
    }

    /// One fetch attempt; true once the attributes are cached
    pub fn fetch<S: RemoteStore>(&self, store: &S, datatype: DatatypeId) -> CueResult<bool> {
        if self.cache.get().is_some() {
            return Ok(true);
        }

        let Some(table) = store.receive_data(datatype, true)? else {
            return Ok(false);
        };

        match AttributesRecord::lookup(&table, &self.mac) {
            Ok(Some(attrs)) => {
                info!(
                    mac = %self.mac,
                    number = %attrs.text(ATTR_NODE_NUMBER),
                    name = %attrs.text(ATTR_NODE_NAME),
                    prefix = %attrs.text(ATTR_CUE_PREFIX),
                    "node attributes received"
                );
                let _ = self.cache.set(attrs);
                Ok(true)
            }
            Ok(None) => Ok(false),
            Err(err) => {
                warn!(mac = %self.mac, %err, "ignoring malformed attributes");
                Ok(false)
            }
        }
    }

    pub async fn run<S: RemoteStore>(
        &self,
        store: &S,
        gate: &ReadinessGate,
        config: &NodeConfig,
    ) -> CueResult<()> {
        loop {
            gate.await_ready().await;
            if self.fetch(store, config.datatypes.attributes)? {
                return Ok(());
            }
            debug!(mac = %self.mac, "node not configured upstream yet");
            tokio::time::sleep(config.units(SYNC_BACKOFF_UNITS)).await;
        }
    }
}

/// Fetches and caches the global transition table
#[derive(Debug, Default)]
pub struct TransitionSync {
    cache: OnceLock<TransitionTable>,
}

impl TransitionSync {
    pub fn new() -> Self {
        TransitionSync::default()
    }

    pub fn table(&self) -> Option<&TransitionTable> {
        self.cache.get()
    }

    /// One fetch attempt; true once the table is cached
    pub fn fetch<S: RemoteStore>(&self, store: &S, datatype: DatatypeId) -> CueResult<bool> {
        if self.cache.get().is_some() {
            return Ok(true);
        }

        let value = match store.receive_data(datatype, true)? {
            None | Some(Value::Null) => return Ok(false),
            Some(value) => value,
        };

        match TransitionTable::from_value(&value) {
            Ok(table) => {
                info!(entries = table.len(), "transition table received");
                let _ = self.cache.set(table);
                Ok(true)
            }
            Err(err) => {
                warn!(%err, "ignoring malformed transition table");
                Ok(false)
            }
        }
    }

    pub async fn run<S: RemoteStore>(
        &self,
        store: &S,
        gate: &ReadinessGate,
        config: &NodeConfig,
    ) -> CueResult<()> {
        loop {
            gate.await_ready().await;
            if self.fetch(store, config.datatypes.cue_to_node)? {
                return Ok(());
            }
            debug!("transition table not published yet");
            tokio::time::sleep(config.units(SYNC_BACKOFF_UNITS)).await;
        }
    }
}

/// Cached setup data, available once the setup group completes
#[derive(Clone, Copy, Debug)]
pub struct SetupView<'a> {
    pub attributes: &'a AttributesRecord,
    pub transitions: &'a TransitionTable,
}

/// The two synchronizers, run as one joined group
#[derive(Debug)]
pub struct SetupGroup {
    attributes: AttributeSync,
    transitions: TransitionSync,
    done: watch::Sender<bool>,
}

impl SetupGroup {
    pub fn new(mac: MacAddress) -> Self {
        let (done, _) = watch::channel(false);
        SetupGroup {
            attributes: AttributeSync::new(mac),
            transitions: TransitionSync::new(),
            done,
        }
    }

    pub fn attributes(&self) -> &AttributeSync {
        &self.attributes
    }

    pub fn transitions(&self) -> &TransitionSync {
        &self.transitions
    }

    /// Setup data, if both synchronizers have finished
    pub fn view(&self) -> Option<SetupView<'_>> {
        Some(SetupView {
            attributes: self.attributes.record()?,
            transitions: self.transitions.table()?,
        })
    }

    pub fn is_done(&self) -> bool {
        self.view().is_some()
    }

    /// Suspend until setup completes
    pub async fn wait(&self) -> SetupView<'_> {
        let mut rx = self.done.subscribe();
        loop {
            if let Some(view) = self.view() {
                return view;
            }
            if rx.changed().await.is_err() {
                // sender lives in self; only reachable during teardown
                std::future::pending::<()>().await;
            }
        }
    }

    pub async fn run<S: RemoteStore>(
        &self,
        store: &S,
        gate: &ReadinessGate,
        config: &NodeConfig,
    ) -> CueResult<()> {
        tokio::try_join!(
            self.attributes.run(store, gate, config),
            self.transitions.run(store, gate, config),
        )?;
        self.done.send_replace(true);
        info!("setup complete");
        Ok(())
    }
}
