//! Display presenter

use std::convert::Infallible;

use tracing::debug;

use cuenode_core::{
    node_field_text, AttributesRecord, CueResult, TextDisplay, ATTR_CUE_PREFIX, ATTR_NODE_NAME,
    ATTR_NODE_NUMBER, FIELD_ACTION, FIELD_CUE_NUMBER, PRIORITY_IDLE, PRIORITY_NORMAL,
};

use crate::{NodeConfig, NodeStateMachine, SetupGroup};

/// Refresh interval, in time-units
pub const PRESENTER_CYCLE_UNITS: f64 = 2.0;

/// How long the setup summary stays up, in time-units
pub const SETUP_HOLD_UNITS: f64 = 8.0;

/// Identity summary shown once setup completes
pub fn setup_message(attributes: &AttributesRecord) -> String {
    format!(
        "Setup: {}, {}, {}",
        attributes.text(ATTR_NODE_NUMBER),
        attributes.text(ATTR_NODE_NAME),
        attributes.text(ATTR_CUE_PREFIX),
    )
}

/// Cue text for the current record; both fields come from one snapshot
pub fn cue_message(machine: &NodeStateMachine) -> String {
    let record = machine.snapshot();
    format!(
        "Cue {}: {}",
        node_field_text(record.as_ref(), FIELD_CUE_NUMBER),
        node_field_text(record.as_ref(), FIELD_ACTION),
    )
}

/// Keeps the character display showing what the node is doing
#[derive(Debug, Default)]
pub struct DisplayPresenter;

impl DisplayPresenter {
    pub fn new() -> Self {
        DisplayPresenter
    }

    pub async fn run<D: TextDisplay>(
        &self,
        display: &D,
        setup: &SetupGroup,
        machine: &NodeStateMachine,
        config: &NodeConfig,
    ) -> CueResult<Infallible> {
        let mut announced = false;

        loop {
            match setup.view() {
                None => {
                    let text = format!("MAC Addr: {}", setup.attributes().mac());
                    display.display_text(&text, PRIORITY_IDLE)?;
                }
                Some(view) if !announced => {
                    let text = setup_message(view.attributes);
                    debug!(%text, "showing setup summary");
                    display.display_text(&text, PRIORITY_NORMAL)?;
                    announced = true;
                    tokio::time::sleep(config.units(SETUP_HOLD_UNITS)).await;
                }
                Some(_) => {
                    display.display_text(&cue_message(machine), PRIORITY_NORMAL)?;
                }
            }

            tokio::time::sleep(config.units(PRESENTER_CYCLE_UNITS)).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MemoryStore, ReadinessGate};
    use cuenode_core::{CueRecord, MacAddress, Transition, TransitionTable, PRIORITY_ERROR};
    use cuenode_gpio::{LcdDisplay, LedPanel, SimulatedLcd, SimulatedLeds};
    use serde_json::json;
    use std::time::Duration;

    const MAC: &str = "b8:27:eb:00:00:01";

    #[test]
    fn test_setup_message() {
        let attrs: AttributesRecord = serde_json::from_value(json!({
            "Node Number": 3, "Node Name": "Stage Left", "Cue Prefix": "SL"
        }))
        .unwrap();
        assert_eq!(setup_message(&attrs), "Setup: 3, Stage Left, SL");
        assert_eq!(
            setup_message(&AttributesRecord::default()),
            "Setup: None, None, None"
        );
    }

    #[test]
    fn test_cue_message_uses_sentinel() {
        let machine = NodeStateMachine::new();
        assert_eq!(cue_message(&machine), "Cue None: None");

        let hw = LedPanel::new(SimulatedLeds::new(), "0000FF", Duration::from_secs(1)).unwrap();
        let table = TransitionTable::new().with("Standby", Transition::new("None", "Go"));
        let cue = CueRecord::new(12, "Standby").with_action("Hold");
        machine.evaluate(&hw, Some(&cue), &table, &json!(3)).unwrap();
        assert_eq!(cue_message(&machine), "Cue 12: Hold");

        // a new cue without an action replaces both fields together
        machine
            .evaluate(&hw, Some(&CueRecord::new(13, "Standby")), &table, &json!(3))
            .unwrap();
        assert_eq!(cue_message(&machine), "Cue 13: None");
    }

    #[tokio::test(start_paused = true)]
    async fn test_presenter_sequence() {
        let store = MemoryStore::new();
        let config = NodeConfig::default();
        let gate = ReadinessGate::new();
        gate.record_clock(Some(json!("t0").into()));
        gate.record_clock(Some(json!("t1").into()));
        let setup = SetupGroup::new(MacAddress::new(MAC));
        let machine = NodeStateMachine::new();
        let display = LcdDisplay::new(SimulatedLcd::new());
        let presenter = DisplayPresenter::new();

        let driver = async {
            tokio::time::sleep(Duration::from_millis(500)).await;
            assert_eq!(display.get(), format!("MAC Addr: {MAC}"));

            store.publish(
                config.datatypes.attributes,
                json!({ MAC: { "Node Number": 3, "Node Name": "Stage Left", "Cue Prefix": "SL" } }),
            );
            store.publish(
                config.datatypes.cue_to_node,
                json!({ "Standby": { "Initial Node State": "None", "Final Node State": "Go" } }),
            );
            setup.run(&store, &gate, &config).await.unwrap();

            // next refresh at 2s shows the summary and holds it
            tokio::time::sleep(Duration::from_millis(2000)).await;
            assert_eq!(display.get(), "Setup: 3, Stage Left, SL");
            tokio::time::sleep(Duration::from_millis(6000)).await;
            assert_eq!(display.get(), "Setup: 3, Stage Left, SL");

            // summary held until 10s, cue text from the refresh at 12s
            tokio::time::sleep(Duration::from_millis(4000)).await;
            assert_eq!(display.get(), "Cue None: None");
        };

        tokio::select! {
            result = presenter.run(&display, &setup, &machine, &config) => {
                panic!("presenter stopped: {:?}", result)
            }
            _ = driver => {}
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_error_message_survives_refresh() {
        let config = NodeConfig::default();
        let setup = SetupGroup::new(MacAddress::new(MAC));
        let machine = NodeStateMachine::new();
        let display = LcdDisplay::new(SimulatedLcd::new());
        let presenter = DisplayPresenter::new();
        display.display_text("An error has occurred: check log", PRIORITY_ERROR).unwrap();

        tokio::select! {
            result = presenter.run(&display, &setup, &machine, &config) => {
                panic!("presenter stopped: {:?}", result)
            }
            _ = tokio::time::sleep(Duration::from_secs(5)) => {}
        }
        assert_eq!(display.get(), "An error has occurred: check log");
    }
}
