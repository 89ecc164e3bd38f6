//! Simulated nodes and end-to-end scenarios
//!
//! A [`SimNode`] is the real orchestrator wired to in-memory collaborators,
//! so a whole show can run in virtual time.

use std::sync::Arc;

use serde_json::json;

use cuenode_core::{CueRecord, CueResult, MacAddress, Transition, TransitionTable};
use cuenode_gpio::{LcdDisplay, LedPanel, SimulatedLcd, SimulatedLeds};
use cuenode_runtime::{CueNode, JsonErrorLog, MemoryStore, NodeConfig};

use crate::show::{ShowAction, ShowStep};

/// A cue node over simulated hardware and an in-memory store
pub type SimNode =
    CueNode<Arc<MemoryStore>, LedPanel<SimulatedLeds>, LcdDisplay<SimulatedLcd>, JsonErrorLog>;

/// Build a simulated node sharing `store` with a show controller
pub fn sim_node(config: NodeConfig, mac: MacAddress, store: Arc<MemoryStore>) -> CueResult<SimNode> {
    let hw = LedPanel::new(SimulatedLeds::new(), &config.default_color, config.led_delay())?;
    let display = LcdDisplay::new(SimulatedLcd::new());
    let errors = JsonErrorLog::open(config.error_log.clone());
    Ok(CueNode::new(config, mac, store, hw, display, errors))
}

/// Transition table used by the stock show
pub fn stock_transitions() -> TransitionTable {
    TransitionTable::new()
        .with("Standby", Transition::new("None", "Go"))
        .with("Multiple Standbys", Transition::new("None", "Standby"))
        .with("Go", Transition::new("None", "Go"))
}

/// A short show for one node on prefix `SL`
pub fn stage_left_script(mac: &MacAddress) -> Vec<ShowStep> {
    let cue = |prefix: &str, cue: CueRecord| ShowAction::Cue {
        prefix: prefix.to_string(),
        cue,
    };

    vec![
        ShowStep::new(
            2.0,
            ShowAction::Attributes {
                mac: mac.clone(),
                number: json!(3),
                name: "Stage Left".to_string(),
                prefix: "SL".to_string(),
            },
        ),
        ShowStep::new(2.0, ShowAction::Transitions(stock_transitions())),
        ShowStep::new(12.0, cue("SL", CueRecord::new(12, "Standby").with_action("Hold"))),
        ShowStep::new(16.0, ShowAction::Press),
        ShowStep::new(22.0, cue("SL", CueRecord::new(13, "Go").with_action("Fly in"))),
        ShowStep::new(26.0, ShowAction::Press),
        ShowStep::new(
            32.0,
            cue("SL", CueRecord::new(14, "Multiple Standbys").with_action("Wait")),
        ),
        ShowStep::new(40.0, ShowAction::StopClock),
        ShowStep::new(50.0, ShowAction::StartClock),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ShowController;
    use cuenode_core::{
        ButtonLight, ErrorLog, IndicatorState, LedDecision, NodePhase, RemoteStore,
    };
    use cuenode_gpio::Brightness;
    use cuenode_runtime::ERROR_MESSAGE;
    use std::time::Duration;
    use tokio::time::{sleep_until, Instant};

    const MAC: &str = "b8:27:eb:00:00:01";

    fn temp_log(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("cuenode-scenario-{}-{}.json", name, std::process::id()))
    }

    fn setup(name: &str) -> (Arc<MemoryStore>, ShowController, SimNode) {
        let config = NodeConfig {
            error_log: temp_log(name),
            ..NodeConfig::default()
        };
        let _ = std::fs::remove_file(&config.error_log);

        let store = Arc::new(MemoryStore::new());
        let show = ShowController::new(store.clone(), config.datatypes);
        let node = sim_node(config, MacAddress::new(MAC), store.clone()).unwrap();
        (store, show, node)
    }

    fn publish_stage_left(show: &ShowController) {
        show.publish_attributes(&MacAddress::new(MAC), json!(3), "Stage Left", "SL");
        show.publish_transitions(&stock_transitions()).unwrap();
    }

    // ========================================================================
    // READINESS
    // ========================================================================

    #[test]
    fn test_clock_t0_t0_t1_readiness() {
        let gate = cuenode_runtime::ReadinessGate::new();
        let store = Arc::new(MemoryStore::new());
        let show = ShowController::new(store.clone(), Default::default());
        let online = cuenode_core::DatatypeIds::default().online;

        show.tick();
        let mut seen = Vec::new();
        for advance in [false, false, true] {
            if advance {
                show.tick();
            }
            let clock = store.receive_data(online, true).unwrap().map(Into::into);
            gate.record_clock(clock);
            seen.push(gate.observe());
        }
        assert_eq!(seen, vec![false, false, true]);
    }

    // ========================================================================
    // FULL SHOW
    // ========================================================================

    #[tokio::test(start_paused = true)]
    async fn test_full_show() {
        let (_store, show, node) = setup("show");
        show.tick();
        publish_stage_left(&show);
        show.publish_cue("SL", &CueRecord::new(12, "Standby").with_action("Hold"))
            .unwrap();

        let leds = node.hardware().backend();
        let start = Instant::now();
        let until = |secs: f64| sleep_until(start + Duration::from_secs_f64(secs));

        let driver = async {
            // before setup: identity on the display
            until(0.5).await;
            assert_eq!(node.display().get(), format!("MAC Addr: {MAC}"));

            // cue 12 claimed with its initial state
            until(5.0).await;
            let records = show.node_records().unwrap();
            let first = records.first().expect("node record published");
            assert_eq!(first.cue.cue_number, json!(12));
            assert_eq!(first.cue_state(), "Standby");
            assert_eq!(first.node_state(), "None");
            assert_eq!(first.node_number, json!(3));
            assert!(first.timestamp.is_some());
            assert_eq!(
                node.arbiter().last(),
                Some(LedDecision::new(IndicatorState::Standby, ButtonLight::Off))
            );
            assert_eq!(leds.rgb(), Brightness::new(100, 100, 0));

            // the press advances to the final state once
            until(6.0).await;
            leds.press();
            until(9.0).await;
            assert_eq!(node.display().get(), "Setup: 3, Stage Left, SL");
            until(10.0).await;
            let last = show.node_records().unwrap().pop().unwrap();
            assert_eq!(last.node_state(), "Go");
            assert_eq!(node.machine().phase(), NodePhase::FinalPhase);
            assert!(!node.machine().flags().at_initial_phase);
            assert_eq!(
                node.arbiter().last(),
                Some(LedDecision::new(IndicatorState::Default, ButtonLight::Off))
            );

            // a Go cue solicits the press, then lights the button
            show.publish_cue("SL", &CueRecord::new(13, "Go").with_action("Fly in"))
                .unwrap();
            until(15.0).await;
            assert_eq!(
                node.arbiter().last(),
                Some(LedDecision::new(IndicatorState::Go, ButtonLight::Blinking))
            );
            assert!(!node.machine().flags().change_requested);
            leds.press();
            until(17.0).await;
            assert_eq!(node.display().get(), "Cue 13: Fly in");
            until(18.0).await;
            assert!(node.button().just_pressed());
            assert_eq!(
                node.arbiter().last(),
                Some(LedDecision::new(IndicatorState::Default, ButtonLight::Solid))
            );
            until(20.0).await;
            assert!(!node.button().just_pressed());
            assert_eq!(
                node.arbiter().last(),
                Some(LedDecision::new(IndicatorState::Default, ButtonLight::Off))
            );

            // upstream goes quiet
            show.set_clock_running(false);
            until(32.0).await;
            assert!(!node.gate().observe());
            assert_eq!(node.arbiter().last(), Some(LedDecision::DISCONNECTED));
            let published = show.node_records().unwrap().len();
            until(40.0).await;
            assert_eq!(show.node_records().unwrap().len(), published);
        };

        tokio::select! {
            failure = node.run() => panic!("node stopped: {failure}"),
            never = show.run_clock(Duration::from_secs(1)) => match never {},
            _ = driver => {}
        }
    }

    // ========================================================================
    // FATAL FAILURE
    // ========================================================================

    #[tokio::test(start_paused = true)]
    async fn test_publish_failure_is_fatal() {
        let (store, show, node) = setup("fatal");
        show.tick();
        publish_stage_left(&show);
        show.publish_cue("SL", &CueRecord::new(1, "Go")).unwrap();
        store.fail_sends("mesh rejected publish");

        let failure = tokio::select! {
            failure = node.run() => failure,
            never = show.run_clock(Duration::from_secs(1)) => match never {},
        };

        assert_eq!(failure.task, "node state");
        assert_eq!(node.errors().get(), vec![failure.signature()]);
        assert_eq!(node.display().get(), ERROR_MESSAGE);
        assert!(node.hardware().backend().is_shut_down());
        assert_eq!(node.hardware().backend().rgb(), Brightness::OFF);

        let _ = std::fs::remove_file(&node.config().error_log);
    }

    #[tokio::test(start_paused = true)]
    async fn test_repeated_failure_logged_once() {
        let path = temp_log("repeat");
        let _ = std::fs::remove_file(&path);

        for _ in 0..2 {
            let config = NodeConfig {
                error_log: path.clone(),
                ..NodeConfig::default()
            };
            let store = Arc::new(MemoryStore::new());
            store.fail_receives("link down");
            let node = sim_node(config, MacAddress::new(MAC), store).unwrap();
            let _ = node.run().await;
        }

        let log = JsonErrorLog::open(&path);
        assert_eq!(
            log.get(),
            vec!["readiness task failed: Remote store error: link down".to_string()]
        );
        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test(start_paused = true)]
    async fn test_scripted_show_plays() {
        let (_store, show, node) = setup("script");
        let script = stage_left_script(&MacAddress::new(MAC));
        let config = node.config().clone();

        let play = async {
            show.play(&script, node.hardware().backend(), &config).await.unwrap();
            tokio::time::sleep(Duration::from_secs(10)).await;
        };

        tokio::select! {
            failure = node.run() => panic!("node stopped: {failure}"),
            never = show.run_clock(Duration::from_secs(1)) => match never {},
            _ = play => {}
        }

        let records = show.node_records().unwrap();
        let cues: Vec<_> = records.iter().map(|r| r.cue_number_text()).collect();
        assert!(cues.contains(&"14".to_string()));
        assert_eq!(records.last().unwrap().node_state(), "None");
        assert!(node.gate().observe());
    }
}
