//! Node configuration

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use cuenode_core::{CueError, CueResult, DatatypeIds};

/// Longest accepted `time_unit`
pub const MAX_TIME_UNIT: Duration = Duration::from_secs(3600);
/// Longest accepted `led_delay`, in time-units
pub const MAX_LED_DELAY: f64 = 3600.0;

/// Cue node configuration.
///
/// Every cadence in the runtime is expressed in time-units; `time_unit`
/// sets how long one unit is.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    /// Length of one time-unit (humantime, e.g. `"1s"`, `"250ms"`)
    #[serde(with = "duration_text")]
    pub time_unit: Duration,
    /// Datatype ids agreed with the remote store
    pub datatypes: DatatypeIds,
    /// Where fatal failure signatures are kept
    pub error_log: PathBuf,
    /// LED blink length, in time-units
    pub led_delay: f64,
    /// Idle indicator color
    pub default_color: String,
    /// Interface whose MAC address identifies the node
    pub mac_interface: String,
    /// Tracing filter directive, overridden by `RUST_LOG`
    pub log_filter: String,
    pub log_json: bool,
}

impl Default for NodeConfig {
    fn default() -> Self {
        NodeConfig {
            time_unit: Duration::from_secs(1),
            datatypes: DatatypeIds::default(),
            error_log: PathBuf::from("errors.json"),
            led_delay: 1.0,
            default_color: "0000FF".to_string(),
            mac_interface: "wlan0".to_string(),
            log_filter: "info".to_string(),
            log_json: false,
        }
    }
}

impl NodeConfig {
    pub fn from_json_str(text: &str) -> CueResult<Self> {
        let config: NodeConfig =
            serde_json::from_str(text).map_err(|e| CueError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> CueResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| CueError::Config(format!("{}: {e}", path.display())))?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> CueResult<()> {
        if self.time_unit.is_zero() || self.time_unit > MAX_TIME_UNIT {
            return Err(CueError::Config(format!(
                "time_unit must be between 0 and {}, got {}",
                humantime::format_duration(MAX_TIME_UNIT),
                humantime::format_duration(self.time_unit)
            )));
        }
        if !(0.0..=MAX_LED_DELAY).contains(&self.led_delay) {
            return Err(CueError::Config(format!(
                "led_delay must be between 0 and {MAX_LED_DELAY} units, got {}",
                self.led_delay
            )));
        }
        Ok(())
    }

    /// Convert a count of time-units into a duration.
    ///
    /// Negative or NaN counts give zero; overflow saturates.
    pub fn units(&self, units: f64) -> Duration {
        if units.is_nan() || units <= 0.0 {
            return Duration::ZERO;
        }
        Duration::try_from_secs_f64(self.time_unit.as_secs_f64() * units).unwrap_or(Duration::MAX)
    }

    pub fn led_delay(&self) -> Duration {
        self.units(self.led_delay)
    }
}

mod duration_text {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&humantime::format_duration(*value).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let text = String::deserialize(deserializer)?;
        humantime::parse_duration(&text).map_err(serde::de::Error::custom)
    }
}
