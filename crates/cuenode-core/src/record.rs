//! Records exchanged with the remote store
//!
//! Field names match the column names the remote store publishes
//! ("Cue Number", "Cue State", ...), so records round-trip through
//! `serde_json` without any renaming layer in the transport.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{CueError, CueResult, MacAddress, RemoteClock};

/// Placeholder text for any field that has not been populated yet
pub const NONE_SENTINEL: &str = "None";

pub const FIELD_CUE_NUMBER: &str = "Cue Number";
pub const FIELD_CUE_STATE: &str = "Cue State";
pub const FIELD_ACTION: &str = "Action";
pub const FIELD_NODE_STATE: &str = "Node State";
pub const FIELD_NODE_NUMBER: &str = "Node Number";
pub const FIELD_TIMESTAMP: &str = "Timestamp";

pub const ATTR_NODE_NUMBER: &str = "Node Number";
pub const ATTR_NODE_NAME: &str = "Node Name";
pub const ATTR_CUE_PREFIX: &str = "Cue Prefix";

/// Render a remote value as display text.
///
/// Strings are shown without quotes; missing and null values become
/// [`NONE_SENTINEL`].
pub fn field_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => NONE_SENTINEL.to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Remote-authored description of what a cue group should be doing
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CueRecord {
    #[serde(rename = "Cue Number")]
    pub cue_number: Value,
    #[serde(rename = "Cue State")]
    pub cue_state: String,
    #[serde(rename = "Action", default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    /// Any other columns the store attaches; copied through untouched
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl CueRecord {
    pub fn new(cue_number: impl Into<Value>, cue_state: impl Into<String>) -> Self {
        CueRecord {
            cue_number: cue_number.into(),
            cue_state: cue_state.into(),
            action: None,
            extra: BTreeMap::new(),
        }
    }

    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }

    /// Whether `other` describes the same cue (number and state)
    pub fn same_cue(&self, other: &CueRecord) -> bool {
        self.cue_number == other.cue_number && self.cue_state == other.cue_state
    }

    /// Look up the cue for `prefix` in the full remote cue table.
    ///
    /// Returns `Ok(None)` when the table has no entry for the prefix.
    pub fn lookup(table: &Value, prefix: &str) -> CueResult<Option<CueRecord>> {
        match table.get(prefix) {
            None | Some(Value::Null) => Ok(None),
            Some(entry) => Ok(Some(serde_json::from_value(entry.clone())?)),
        }
    }

    /// Field as display text, by remote column name
    pub fn field_text(&self, name: &str) -> String {
        match name {
            FIELD_CUE_NUMBER => field_text(Some(&self.cue_number)),
            FIELD_CUE_STATE => self.cue_state.clone(),
            FIELD_ACTION => self
                .action
                .clone()
                .unwrap_or_else(|| NONE_SENTINEL.to_string()),
            other => field_text(self.extra.get(other)),
        }
    }
}

/// This node's locally derived, published record for the current cue
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    #[serde(flatten)]
    pub cue: CueRecord,
    #[serde(rename = "Node State")]
    pub node_state: String,
    #[serde(rename = "Node Number")]
    pub node_number: Value,
    #[serde(rename = "Timestamp", default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<RemoteClock>,
}

impl NodeRecord {
    /// Start a record for a newly claimed cue
    pub fn from_cue(cue: &CueRecord, node_state: impl Into<String>, node_number: Value) -> Self {
        NodeRecord {
            cue: cue.clone(),
            node_state: node_state.into(),
            node_number,
            timestamp: None,
        }
    }

    pub fn cue_state(&self) -> &str {
        &self.cue.cue_state
    }

    pub fn cue_number_text(&self) -> String {
        field_text(Some(&self.cue.cue_number))
    }

    pub fn node_state(&self) -> &str {
        &self.node_state
    }

    /// Field as display text, by remote column name
    pub fn field_text(&self, name: &str) -> String {
        match name {
            FIELD_NODE_STATE => self.node_state.clone(),
            FIELD_NODE_NUMBER => field_text(Some(&self.node_number)),
            FIELD_TIMESTAMP => field_text(self.timestamp.as_ref().map(RemoteClock::as_value)),
            other => self.cue.field_text(other),
        }
    }

    pub fn to_value(&self) -> CueResult<Value> {
        Ok(serde_json::to_value(self)?)
    }
}

/// Field of an optional node record, or the sentinel when absent
pub fn node_field_text(record: Option<&NodeRecord>, name: &str) -> String {
    record
        .map(|r| r.field_text(name))
        .unwrap_or_else(|| NONE_SENTINEL.to_string())
}

/// Named attributes for this node (number, name, cue prefix)
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttributesRecord(pub BTreeMap<String, Value>);

impl AttributesRecord {
    /// Extract this node's attributes from the full remote attribute table.
    ///
    /// Returns `Ok(None)` when the table has no entry for `mac`.
    pub fn lookup(table: &Value, mac: &MacAddress) -> CueResult<Option<AttributesRecord>> {
        match table.get(mac.as_str()) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Object(map)) => Ok(Some(AttributesRecord(
                map.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
            ))),
            Some(other) => Err(CueError::Decode(format!(
                "attributes for {mac} are not a record: {other}"
            ))),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Attribute as display text, or the sentinel when missing
    pub fn text(&self, key: &str) -> String {
        field_text(self.0.get(key))
    }

    /// Node number to stamp into node records
    pub fn node_number(&self) -> Value {
        match self.0.get(ATTR_NODE_NUMBER) {
            Some(v) if !v.is_null() => v.clone(),
            _ => Value::String(NONE_SENTINEL.to_string()),
        }
    }

    pub fn cue_prefix(&self) -> String {
        self.text(ATTR_CUE_PREFIX)
    }
}

/// Node states to adopt at the start and end of a cue
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    #[serde(rename = "Initial Node State")]
    pub initial: String,
    #[serde(rename = "Final Node State")]
    pub final_state: String,
}

impl Transition {
    pub fn new(initial: impl Into<String>, final_state: impl Into<String>) -> Self {
        Transition {
            initial: initial.into(),
            final_state: final_state.into(),
        }
    }
}

/// Global mapping from cue state to node-state transition
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransitionTable(pub BTreeMap<String, Transition>);

impl TransitionTable {
    pub fn new() -> Self {
        TransitionTable::default()
    }

    pub fn with(mut self, cue_state: impl Into<String>, transition: Transition) -> Self {
        self.0.insert(cue_state.into(), transition);
        self
    }

    pub fn from_value(value: &Value) -> CueResult<Self> {
        Ok(serde_json::from_value(value.clone())?)
    }

    pub fn get(&self, cue_state: &str) -> CueResult<&Transition> {
        self.0
            .get(cue_state)
            .ok_or_else(|| CueError::UnknownCueState(cue_state.to_string()))
    }

    pub fn initial(&self, cue_state: &str) -> CueResult<&str> {
        Ok(&self.get(cue_state)?.initial)
    }

    pub fn final_state(&self, cue_state: &str) -> CueResult<&str> {
        Ok(&self.get(cue_state)?.final_state)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_field_text_sentinel() {
        assert_eq!(field_text(None), "None");
        assert_eq!(field_text(Some(&Value::Null)), "None");
        assert_eq!(field_text(Some(&json!("Hold"))), "Hold");
        assert_eq!(field_text(Some(&json!(12))), "12");
    }

    #[test]
    fn test_cue_lookup_by_prefix() {
        let table = json!({
            "A": { "Cue Number": 12, "Cue State": "Standby", "Action": "Hold", "Color": "Red" },
            "B": { "Cue Number": 3, "Cue State": "Go" }
        });

        let cue = CueRecord::lookup(&table, "A").unwrap().unwrap();
        assert_eq!(cue.cue_number, json!(12));
        assert_eq!(cue.cue_state, "Standby");
        assert_eq!(cue.field_text(FIELD_ACTION), "Hold");
        assert_eq!(cue.field_text("Color"), "Red");

        let cue = CueRecord::lookup(&table, "B").unwrap().unwrap();
        assert_eq!(cue.field_text(FIELD_ACTION), "None");

        assert!(CueRecord::lookup(&table, "C").unwrap().is_none());
        assert!(CueRecord::lookup(&Value::Null, "A").unwrap().is_none());
    }

    #[test]
    fn test_malformed_cue_is_decode_error() {
        let table = json!({ "A": { "Cue Number": 1 } });
        assert!(matches!(
            CueRecord::lookup(&table, "A"),
            Err(CueError::Decode(_))
        ));
    }

    #[test]
    fn test_same_cue() {
        let a = CueRecord::new(1, "Standby").with_action("Hold");
        let b = CueRecord::new(1, "Standby").with_action("Different");
        let c = CueRecord::new(1, "Go");
        assert!(a.same_cue(&b));
        assert!(!a.same_cue(&c));
    }

    #[test]
    fn test_node_record_serializes_flat() {
        let cue = CueRecord::new(12, "Standby").with_action("Hold");
        let mut record = NodeRecord::from_cue(&cue, "None", json!(4));
        record.timestamp = Some(RemoteClock::from(json!("t1")));

        let value = record.to_value().unwrap();
        assert_eq!(
            value,
            json!({
                "Cue Number": 12,
                "Cue State": "Standby",
                "Action": "Hold",
                "Node State": "None",
                "Node Number": 4,
                "Timestamp": "t1"
            })
        );

        let decoded: NodeRecord = serde_json::from_value(value).unwrap();
        assert_eq!(decoded, record);
    }

    #[test]
    fn test_node_field_text() {
        let cue = CueRecord::new(7, "Go").with_action("Lights");
        let record = NodeRecord::from_cue(&cue, "Go", json!(2));
        assert_eq!(node_field_text(Some(&record), FIELD_CUE_NUMBER), "7");
        assert_eq!(node_field_text(Some(&record), FIELD_NODE_STATE), "Go");
        assert_eq!(node_field_text(Some(&record), FIELD_TIMESTAMP), "None");
        assert_eq!(node_field_text(None, FIELD_ACTION), "None");
    }

    #[test]
    fn test_attributes_lookup() {
        let mac = MacAddress::new("b8:27:eb:00:00:01");
        let table = json!({
            "b8:27:eb:00:00:01": { "Node Number": 3, "Node Name": "Stage Left", "Cue Prefix": "SL" }
        });

        let attrs = AttributesRecord::lookup(&table, &mac).unwrap().unwrap();
        assert_eq!(attrs.node_number(), json!(3));
        assert_eq!(attrs.text(ATTR_NODE_NAME), "Stage Left");
        assert_eq!(attrs.cue_prefix(), "SL");
        assert_eq!(attrs.text("Missing"), "None");

        let other = MacAddress::new("b8:27:eb:00:00:02");
        assert!(AttributesRecord::lookup(&table, &other).unwrap().is_none());
    }

    #[test]
    fn test_missing_node_number_is_sentinel() {
        let attrs = AttributesRecord::default();
        assert_eq!(attrs.node_number(), json!("None"));
    }

    #[test]
    fn test_transition_table() {
        let value = json!({
            "Standby": { "Initial Node State": "None", "Final Node State": "Go" },
            "Go": { "Initial Node State": "None", "Final Node State": "Done" }
        });
        let table = TransitionTable::from_value(&value).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.initial("Standby").unwrap(), "None");
        assert_eq!(table.final_state("Standby").unwrap(), "Go");
        assert_eq!(
            table.initial("Blackout"),
            Err(CueError::UnknownCueState("Blackout".to_string()))
        );
    }
}
