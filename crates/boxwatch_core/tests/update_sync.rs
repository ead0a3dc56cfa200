use std::sync::Once;

use boxwatch_core::{
    update, ActivityKind, AppState, Clock, Effect, FeedRequest, Location, LogEntry, Msg,
    StateChange, StateSignal, UnitState, ACTIVITY_CAPACITY, CURSOR_SENTINEL,
};
use pretty_assertions::assert_eq;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(sync_logging::initialize_for_tests);
}

fn started() -> AppState {
    let state = AppState::new().with_clock(Clock::new(|| "12:00:00".to_string()));
    let (state, effects) = update(
        state,
        Msg::AppStarted {
            server_address: "runner".to_string(),
            location: Location::default(),
        },
    );
    assert_eq!(effects, vec![Effect::FetchUnitCount]);
    state
}

fn ready(total_units: u32) -> (AppState, Vec<Effect>) {
    update(started(), Msg::UnitCountLoaded(total_units))
}

fn feed_requests(effects: &[Effect]) -> (FeedRequest, FeedRequest) {
    let logs = effects.iter().find_map(|effect| match effect {
        Effect::FetchLogs { request } => Some(*request),
        _ => None,
    });
    let states = effects.iter().find_map(|effect| match effect {
        Effect::FetchStates { request } => Some(*request),
        _ => None,
    });
    (logs.expect("log request"), states.expect("state request"))
}

fn log(id: i64, text: &str) -> LogEntry {
    LogEntry {
        id,
        text: text.to_string(),
        timestamp: "2024-05-01 10:00:00".to_string(),
    }
}

fn change(id: i64, unit_index: i64, signal: StateSignal, worker: Option<&str>) -> StateChange {
    StateChange {
        id,
        unit_index,
        signal,
        assigned_worker: worker.map(str::to_string),
    }
}

fn log_ids(state: &AppState) -> Vec<i64> {
    state.activity().log_entries().map(|entry| entry.id).collect()
}

#[test]
fn no_cycle_before_unit_count_is_known() {
    init_logging();
    let (state, effects) = update(started(), Msg::PollTick);
    assert!(effects.is_empty());
    assert!(!state.is_page_ready());
    assert!(state.units().is_empty());
}

#[test]
fn unit_count_triggers_immediate_cycle_with_sentinel_cursors() {
    init_logging();
    let (state, effects) = ready(250);
    let (logs, states) = feed_requests(&effects);

    assert_eq!(effects.len(), 2);
    assert_eq!(logs.after, CURSOR_SENTINEL);
    assert_eq!(states.after, CURSOR_SENTINEL);
    assert_eq!(state.units().len(), 100);
}

#[test]
fn first_log_batch_is_shown_newest_first() {
    init_logging();
    let (state, effects) = ready(10);
    let (logs, _) = feed_requests(&effects);

    let (state, effects) = update(
        state,
        Msg::LogsFetched {
            seq: logs.seq,
            entries: vec![log(5, "a"), log(6, "b")],
        },
    );

    assert!(effects.is_empty());
    assert_eq!(log_ids(&state), vec![6, 5]);
    assert_eq!(state.cursor().last_log_id, 6);
    assert_eq!(state.view().activity[0].text, "b");
}

#[test]
fn log_cursor_tracks_maximum_id_across_batches() {
    init_logging();
    let (mut state, _) = ready(10);
    let batches: Vec<Vec<i64>> = vec![vec![0, 1, 2], vec![], vec![3], vec![4, 5, 6, 7], vec![]];
    let mut max_seen = CURSOR_SENTINEL;

    for batch in batches {
        let (next, effects) = update(state, Msg::PollTick);
        let (logs, _) = feed_requests(&effects);
        assert_eq!(logs.after, max_seen);

        let entries = batch.iter().map(|id| log(*id, "x")).collect();
        let (next, _) = update(next, Msg::LogsFetched { seq: logs.seq, entries });
        let cursor = next.cursor().last_log_id;
        assert!(cursor >= max_seen);
        max_seen = batch.iter().copied().fold(max_seen, i64::max);
        assert_eq!(cursor, max_seen);
        state = next;
    }
    assert_eq!(state.cursor().last_log_id, 7);
}

#[test]
fn activity_panel_never_exceeds_capacity() {
    init_logging();
    let (mut state, _) = ready(10);
    let mut next_id = 0;

    for batch_size in [13, 1, 29, 40, 0, 7] {
        let (next, effects) = update(state, Msg::PollTick);
        let (logs, _) = feed_requests(&effects);
        let entries = (next_id..next_id + batch_size).map(|id| log(id, "x")).collect();
        next_id += batch_size;
        let (next, _) = update(next, Msg::LogsFailed { seq: logs.seq, error: "flaky".into() });
        let (next, _) = update(next, Msg::LogsFetched { seq: logs.seq, entries });
        assert!(next.activity().len() <= ACTIVITY_CAPACITY);
        state = next;
    }
    assert_eq!(state.activity().len(), ACTIVITY_CAPACITY);
    assert_eq!(log_ids(&state).first(), Some(&(next_id - 1)));
}

#[test]
fn running_record_updates_unit_projection() {
    init_logging();
    let (state, effects) = ready(10);
    let (_, states) = feed_requests(&effects);
    assert_eq!(state.unit(3).map(|unit| unit.state), Some(UnitState::Waiting));

    let (state, _) = update(
        state,
        Msg::StatesFetched {
            seq: states.seq,
            records: vec![change(10, 3, StateSignal::Running, Some("w1"))],
        },
    );

    let view = state.view();
    let unit = view.units.iter().find(|unit| unit.id == 3).unwrap();
    assert_eq!(unit.label, "3 is Running on w1");
    assert_eq!(state.cursor().last_state_change_id, 10);
}

#[test]
fn applying_a_record_twice_matches_applying_once() {
    init_logging();
    let record = change(4, 2, StateSignal::Finished, Some("pc-7"));

    let (once, effects) = ready(10);
    let (_, states) = feed_requests(&effects);
    let (once, _) = update(
        once,
        Msg::StatesFetched {
            seq: states.seq,
            records: vec![record.clone()],
        },
    );

    let (twice, effects) = update(once.clone(), Msg::PollTick);
    let (_, states) = feed_requests(&effects);
    let (twice, _) = update(
        twice,
        Msg::StatesFetched {
            seq: states.seq,
            records: vec![record],
        },
    );

    assert_eq!(once.view().units, twice.view().units);
    assert_eq!(
        twice.view().units[1].label,
        "2 was Finished by pc-7".to_string()
    );
}

#[test]
fn off_page_record_is_dropped_quietly() {
    init_logging();
    let (state, effects) = ready(250);
    let (_, states) = feed_requests(&effects);

    let (state, effects) = update(
        state,
        Msg::StatesFetched {
            seq: states.seq,
            records: vec![change(3, 180, StateSignal::Running, Some("w2"))],
        },
    );

    assert!(effects.is_empty());
    assert!(state.activity().is_empty());
    assert_eq!(state.cursor().last_log_id, CURSOR_SENTINEL);
    assert_eq!(state.cursor().last_state_change_id, 3);
    assert!(state.unit(180).is_none());
    assert!(state
        .units()
        .values()
        .all(|unit| unit.state == UnitState::Waiting));
}

#[test]
fn stale_state_response_cannot_overwrite_newer_one() {
    init_logging();
    let (state, effects) = ready(10);
    let (_, older) = feed_requests(&effects);
    let (state, effects) = update(state, Msg::PollTick);
    let (_, newer) = feed_requests(&effects);

    let (state, _) = update(
        state,
        Msg::StatesFetched {
            seq: newer.seq,
            records: vec![
                change(1, 1, StateSignal::Running, Some("a")),
                change(2, 1, StateSignal::Finished, Some("a")),
            ],
        },
    );
    let (state, _) = update(
        state,
        Msg::StatesFetched {
            seq: older.seq,
            records: vec![change(1, 1, StateSignal::Running, Some("a"))],
        },
    );

    assert_eq!(state.unit(1).map(|unit| unit.state), Some(UnitState::Finished));
    assert_eq!(state.cursor().last_state_change_id, 2);
}

#[test]
fn overlapping_log_responses_do_not_duplicate_entries() {
    init_logging();
    let (state, effects) = ready(10);
    let (first, _) = feed_requests(&effects);
    let (state, effects) = update(state, Msg::PollTick);
    let (second, _) = feed_requests(&effects);
    assert_eq!(first.after, second.after);

    let (state, _) = update(
        state,
        Msg::LogsFetched {
            seq: first.seq,
            entries: vec![log(1, "one"), log(2, "two")],
        },
    );
    let (state, _) = update(
        state,
        Msg::LogsFetched {
            seq: second.seq,
            entries: vec![log(1, "one"), log(2, "two"), log(3, "three")],
        },
    );

    assert_eq!(log_ids(&state), vec![3, 2, 1]);
}

#[test]
fn failed_feed_is_reported_and_retried_without_blocking_the_other() {
    init_logging();
    let (state, effects) = ready(10);
    let (logs, states) = feed_requests(&effects);

    let (state, _) = update(
        state,
        Msg::LogsFailed {
            seq: logs.seq,
            error: "connection refused".into(),
        },
    );
    let (state, _) = update(
        state,
        Msg::StatesFetched {
            seq: states.seq,
            records: vec![change(0, 4, StateSignal::Running, Some("w"))],
        },
    );

    assert_eq!(state.cursor().last_log_id, CURSOR_SENTINEL);
    assert_eq!(state.cursor().last_state_change_id, 0);
    let notice = &state.view().activity[0];
    assert_eq!(notice.kind, ActivityKind::Error);
    assert_eq!(notice.text, "Failed to fetch logs: connection refused");
    assert_eq!(notice.timestamp, "12:00:00");

    let (_, effects) = update(state, Msg::PollTick);
    let (retry, states) = feed_requests(&effects);
    assert_eq!(retry.after, CURSOR_SENTINEL);
    assert_eq!(states.after, 0);
}

#[test]
fn unit_count_failure_falls_back_and_keeps_polling() {
    init_logging();
    let (state, effects) = update(
        started(),
        Msg::UnitCountFailed {
            error: "network error".into(),
        },
    );

    assert!(effects.is_empty());
    assert!(state.is_page_ready());
    assert_eq!(state.units().len(), 10);
    assert_eq!(
        state.view().activity[0].text,
        "Failed to connect to server at runner: network error"
    );

    let (_, effects) = update(state, Msg::PollTick);
    assert_eq!(effects.len(), 2);
}

#[test]
fn refresh_all_issues_a_full_cycle() {
    init_logging();
    let (state, _) = ready(10);
    let (state, effects) = update(state, Msg::RefreshAllClicked);
    let (logs, states) = feed_requests(&effects);
    assert!(states.seq > logs.seq);
    assert_eq!(state.sync().cycles(), 2);
}
