use boxwatch_core::{
    update, ActivityKind, AppState, Clock, Effect, FeedRequest, InspectorMsg, InspectorPhase,
    Location, Msg, StateChange, StateSignal, UnitState,
};
use pretty_assertions::assert_eq;
use serde_json::json;

fn ready(total_units: u32) -> AppState {
    let state = AppState::new().with_clock(Clock::new(|| "12:00:00".to_string()));
    let (state, _) = update(
        state,
        Msg::AppStarted {
            server_address: "runner".to_string(),
            location: Location::default(),
        },
    );
    let (state, _) = update(state, Msg::UnitCountLoaded(total_units));
    state
}

fn state_request(effects: &[Effect]) -> FeedRequest {
    effects
        .iter()
        .find_map(|effect| match effect {
            Effect::FetchStates { request } => Some(*request),
            _ => None,
        })
        .expect("state request")
}

fn apply_states(state: AppState, records: Vec<StateChange>) -> AppState {
    let (state, effects) = update(state, Msg::RefreshAllClicked);
    let request = state_request(&effects);
    let (state, _) = update(
        state,
        Msg::StatesFetched {
            seq: request.seq,
            records,
        },
    );
    state
}

fn open_inspector(state: AppState, unit: u32) -> AppState {
    let (state, effects) = update(state, Msg::UnitSelected { unit });
    assert_eq!(effects, vec![Effect::FetchUnitDetail { unit }]);
    let (state, effects) = update(
        state,
        Msg::UnitDetailLoaded {
            unit,
            snapshot: json!({"id": unit, "algo": "prm", "sentTo": "w3"}),
        },
    );
    assert!(effects.is_empty());
    state
}

fn press(state: AppState, msg: InspectorMsg) -> (AppState, Vec<Effect>) {
    update(state, Msg::Inspector(msg))
}

#[test]
fn reset_round_trip_refreshes_states_after_close() {
    let state = ready(10);
    let state = apply_states(
        state,
        vec![StateChange {
            id: 20,
            unit_index: 7,
            signal: StateSignal::Running,
            assigned_worker: Some("w3".into()),
        }],
    );
    assert_eq!(state.unit(7).map(|unit| unit.state), Some(UnitState::Running));

    let state = open_inspector(state, 7);
    let view = state.view().inspector.expect("inspector open");
    assert_eq!(view.target_id, 7);
    assert!(view.snapshot_text.contains("\"algo\": \"prm\""));

    let (state, effects) = press(state, InspectorMsg::ResetPressed);
    assert!(effects.is_empty());
    assert_eq!(
        state.inspector().map(|inspector| inspector.phase()),
        Some(InspectorPhase::ConfirmingReset)
    );
    let (state, effects) = press(state, InspectorMsg::ConfirmPressed);
    assert_eq!(effects, vec![Effect::ResetUnit { unit_id: 7 }]);

    // Closing while the reset is in flight waits for the acknowledgement.
    let (state, effects) = press(state, InspectorMsg::ClosePressed);
    assert!(effects.is_empty());
    assert!(state.inspector().is_some());

    let (state, effects) = update(
        state,
        Msg::ResetCompleted {
            unit_id: 7,
            result: Ok("Box 7 reset".into()),
        },
    );
    assert!(state.inspector().is_none());
    let refresh = state_request(&effects);
    assert_eq!(effects.len(), 1);
    assert_eq!(refresh.after, 20);
    assert_eq!(state.view().activity[0].text, "Reset 7: Box 7 reset");
    assert_eq!(state.view().activity[0].kind, ActivityKind::Info);

    let (state, _) = update(
        state,
        Msg::StatesFetched {
            seq: refresh.seq,
            records: vec![StateChange {
                id: 21,
                unit_index: 7,
                signal: StateSignal::Reset,
                assigned_worker: None,
            }],
        },
    );
    let unit = state.unit(7).expect("unit 7 on page");
    assert_eq!(unit.state, UnitState::Waiting);
    assert_eq!(unit.assigned_worker, None);
    assert_eq!(state.view().units[6].label, "7 is Waiting");
}

#[test]
fn failed_reset_is_reported_and_still_closes() {
    let state = open_inspector(ready(10), 4);
    let (state, _) = press(state, InspectorMsg::ResetPressed);
    let (state, _) = press(state, InspectorMsg::ConfirmPressed);

    let (state, effects) = update(
        state,
        Msg::ResetCompleted {
            unit_id: 4,
            result: Err("HTTP status 500".into()),
        },
    );

    assert!(state.inspector().is_none());
    assert_eq!(effects.len(), 1);
    let notice = &state.view().activity[0];
    assert_eq!(notice.kind, ActivityKind::Error);
    assert_eq!(notice.text, "Error occurred during reset of 4: HTTP status 500");
}

#[test]
fn closing_without_reset_refreshes_states() {
    let state = open_inspector(ready(10), 2);
    let (state, effects) = press(state, InspectorMsg::ClosePressed);
    assert!(state.inspector().is_none());
    assert!(matches!(effects.as_slice(), [Effect::FetchStates { .. }]));
}

#[test]
fn second_inspector_is_blocked() {
    let state = open_inspector(ready(10), 2);
    let (state, _) = update(state, Msg::UnitSelected { unit: 3 });
    let (state, _) = update(
        state,
        Msg::UnitDetailLoaded {
            unit: 3,
            snapshot: json!({"id": 3}),
        },
    );

    assert_eq!(state.inspector().map(|inspector| inspector.unit()), Some(2));
    assert_eq!(
        state.view().activity[0].text,
        "Popup blocked. Close the open box view before inspecting another box."
    );
}

#[test]
fn detail_failure_and_off_page_selection() {
    let state = ready(10);
    let (state, effects) = update(state, Msg::UnitSelected { unit: 55 });
    assert!(effects.is_empty());

    let (state, _) = update(
        state,
        Msg::UnitDetailFailed {
            unit: 5,
            error: "timed out".into(),
        },
    );
    assert!(state.inspector().is_none());
    assert_eq!(
        state.view().activity[0].text,
        "Failed to load box information for 5: timed out"
    );
}

#[test]
fn late_reset_ack_after_close_is_only_reported() {
    let state = ready(10);
    let (state, effects) = update(
        state,
        Msg::ResetCompleted {
            unit_id: 9,
            result: Ok("done".into()),
        },
    );
    assert!(effects.is_empty());
    assert_eq!(state.view().activity[0].text, "Reset 9: done");
}

#[test]
fn server_address_change_refetches_count_and_keeps_cursors() {
    let state = apply_states(
        ready(10),
        vec![StateChange {
            id: 3,
            unit_index: 1,
            signal: StateSignal::Finished,
            assigned_worker: Some("w".into()),
        }],
    );

    let (state, effects) = update(state, Msg::ServerAddressSubmitted("   ".into()));
    assert!(effects.is_empty());
    assert_eq!(state.server_address(), "runner");
    assert_eq!(
        state.view().activity[0].text,
        "Please enter a valid server address"
    );

    let (state, effects) = update(state, Msg::ServerAddressSubmitted(" 10.0.0.5:3753 ".into()));
    assert_eq!(
        effects,
        vec![
            Effect::ServerAddressChanged {
                address: "10.0.0.5:3753".into()
            },
            Effect::FetchUnitCount,
        ]
    );
    assert_eq!(state.server_address(), "10.0.0.5:3753");
    assert_eq!(state.cursor().last_state_change_id, 3);
    assert_eq!(state.units().len(), 10);
    let first = state.unit(1).expect("unit 1 on screen");
    assert_eq!(first.state, UnitState::Waiting);
    assert_eq!(first.assigned_worker, None);
    assert_eq!(state.view().units[0].label, "1 is Waiting");
    assert_eq!(
        state.view().activity[0].text,
        "Server address updated to 10.0.0.5:3753"
    );
}
