//! Identity types for the cue node

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Datatype id agreed out-of-band with the remote store
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DatatypeId(pub u16);

impl DatatypeId {
    #[inline]
    pub fn new(id: u16) -> Self {
        DatatypeId(id)
    }
}

impl fmt::Debug for DatatypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Datatype({})", self.0)
    }
}

impl fmt::Display for DatatypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The datatype ids this node reads and writes
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatatypeIds {
    /// Remote clock, published by the store on every update
    pub online: DatatypeId,
    /// Per-node attributes keyed by MAC address
    pub attributes: DatatypeId,
    /// Cue state → node state transition table
    pub cue_to_node: DatatypeId,
    /// Current cue per cue prefix
    pub current: DatatypeId,
    /// Published node records
    pub node: DatatypeId,
}

impl Default for DatatypeIds {
    fn default() -> Self {
        DatatypeIds {
            online: DatatypeId(65),
            attributes: DatatypeId(68),
            cue_to_node: DatatypeId(69),
            current: DatatypeId(70),
            node: DatatypeId(71),
        }
    }
}

/// Remote clock value.
///
/// Opaque: only compared for equality, never used for ordering math.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RemoteClock(pub Value);

impl RemoteClock {
    pub fn new(value: Value) -> Self {
        RemoteClock(value)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }
}

impl From<Value> for RemoteClock {
    fn from(value: Value) -> Self {
        RemoteClock(value)
    }
}

/// Hardware address identifying this node to the remote store
#[derive(Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MacAddress(pub String);

impl MacAddress {
    pub fn new(addr: impl Into<String>) -> Self {
        MacAddress(addr.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Mac({})", self.0)
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
