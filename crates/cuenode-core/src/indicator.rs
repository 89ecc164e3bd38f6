//! Indicator arbitration
//!
//! Picks the indicator light and the button light from connectivity, the
//! published cue state, the node state, and whether the button was just
//! pressed. A node state other than the sentinel means the node has locked
//! in for this cue and stops soliciting a press.

use std::fmt;

use crate::NONE_SENTINEL;

pub const CUE_STATE_GO: &str = "Go";
pub const CUE_STATE_STANDBY: &str = "Standby";
pub const CUE_STATE_MULTIPLE_STANDBYS: &str = "Multiple Standbys";

/// State of the main indicator light
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IndicatorState {
    Default,
    Standby,
    MultipleStandbys,
    Go,
    Disconnected,
}

impl fmt::Display for IndicatorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            IndicatorState::Default => "default",
            IndicatorState::Standby => "standby",
            IndicatorState::MultipleStandbys => "multiple-standbys",
            IndicatorState::Go => "go",
            IndicatorState::Disconnected => "disconnected",
        };
        f.write_str(name)
    }
}

/// Mode of the light inside the button
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ButtonLight {
    Off,
    Solid,
    Blinking,
}

/// Output of one arbitration cycle
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LedDecision {
    pub indicator: IndicatorState,
    pub button: ButtonLight,
}

impl LedDecision {
    pub const DISCONNECTED: LedDecision = LedDecision {
        indicator: IndicatorState::Disconnected,
        button: ButtonLight::Off,
    };

    pub fn new(indicator: IndicatorState, button: ButtonLight) -> Self {
        LedDecision { indicator, button }
    }
}

/// Select the indicator and button light.
///
/// `cue_state` and `node_state` are ignored when not connected.
pub fn arbitrate(
    connected: bool,
    cue_state: &str,
    node_state: &str,
    just_pressed: bool,
) -> LedDecision {
    if !connected {
        return LedDecision::DISCONNECTED;
    }

    if node_state != NONE_SENTINEL {
        let button = if cue_state == CUE_STATE_GO && just_pressed {
            ButtonLight::Solid
        } else {
            ButtonLight::Off
        };
        return LedDecision::new(IndicatorState::Default, button);
    }

    match cue_state {
        CUE_STATE_GO => LedDecision::new(IndicatorState::Go, ButtonLight::Blinking),
        CUE_STATE_STANDBY => LedDecision::new(IndicatorState::Standby, ButtonLight::Off),
        CUE_STATE_MULTIPLE_STANDBYS => {
            LedDecision::new(IndicatorState::MultipleStandbys, ButtonLight::Off)
        }
        _ => LedDecision::new(IndicatorState::Default, ButtonLight::Off),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_locked_in_go_just_pressed() {
        let d = arbitrate(true, "Go", "Go", true);
        assert_eq!(d, LedDecision::new(IndicatorState::Default, ButtonLight::Solid));
    }

    #[test]
    fn test_locked_in_other() {
        assert_eq!(
            arbitrate(true, "Go", "Go", false),
            LedDecision::new(IndicatorState::Default, ButtonLight::Off)
        );
        assert_eq!(
            arbitrate(true, "Standby", "Done", true),
            LedDecision::new(IndicatorState::Default, ButtonLight::Off)
        );
    }

    #[test]
    fn test_soliciting_go() {
        assert_eq!(
            arbitrate(true, "Go", "None", false),
            LedDecision::new(IndicatorState::Go, ButtonLight::Blinking)
        );
    }

    #[test]
    fn test_soliciting_standby() {
        assert_eq!(
            arbitrate(true, "Standby", "None", false),
            LedDecision::new(IndicatorState::Standby, ButtonLight::Off)
        );
        assert_eq!(
            arbitrate(true, "Multiple Standbys", "None", true),
            LedDecision::new(IndicatorState::MultipleStandbys, ButtonLight::Off)
        );
    }

    #[test]
    fn test_waiting_without_cue() {
        assert_eq!(
            arbitrate(true, "None", "None", false),
            LedDecision::new(IndicatorState::Default, ButtonLight::Off)
        );
        assert_eq!(
            arbitrate(true, "Fade", "None", false),
            LedDecision::new(IndicatorState::Default, ButtonLight::Off)
        );
    }

    #[test]
    fn test_disconnected() {
        assert_eq!(arbitrate(false, "Go", "None", true), LedDecision::DISCONNECTED);
    }

    proptest! {
        #[test]
        fn prop_arbitration_is_pure(
            connected in any::<bool>(),
            cue in prop::sample::select(vec!["Go", "Standby", "Multiple Standbys", "None", "Fade"]),
            node in prop::sample::select(vec!["None", "Go", "Standby", "Done"]),
            pressed in any::<bool>(),
        ) {
            let a = arbitrate(connected, cue, node, pressed);
            let b = arbitrate(connected, cue, node, pressed);
            prop_assert_eq!(a, b);
            if !connected {
                prop_assert_eq!(a, LedDecision::DISCONNECTED);
            }
            if a.button == ButtonLight::Solid {
                prop_assert!(pressed && cue == "Go" && node != "None");
            }
        }
    }
}
