use boxwatch_core::{
    update, AppState, Clock, Effect, LogEntry, Location, Msg, NavTarget, PageLink, StateChange,
    StateSignal, UnitState, CURSOR_SENTINEL,
};
use pretty_assertions::assert_eq;

fn started_at(location: Location) -> AppState {
    let state = AppState::new().with_clock(Clock::new(|| "12:00:00".to_string()));
    let (state, _) = update(
        state,
        Msg::AppStarted {
            server_address: "runner".to_string(),
            location,
        },
    );
    state
}

fn ready(total_units: u32, location: Location) -> AppState {
    let (state, _) = update(started_at(location), Msg::UnitCountLoaded(total_units));
    state
}

fn unit_ids(state: &AppState) -> Vec<u32> {
    state.units().keys().copied().collect()
}

fn fetch_count(effects: &[Effect]) -> usize {
    effects
        .iter()
        .filter(|effect| matches!(effect, Effect::FetchLogs { .. } | Effect::FetchStates { .. }))
        .count()
}

#[test]
fn initial_page_is_clamped_to_last_page() {
    let state = ready(250, Location::parse("?page=4"));

    assert_eq!(state.page().current_page(), 3);
    assert_eq!(state.history().current().to_string(), "?page=3");
    assert_eq!(unit_ids(&state), (201..=250).collect::<Vec<_>>());
    assert_eq!(state.view().page_info, "Showing boxes 201 to 250 of 250");
}

#[test]
fn page_info_while_count_is_loading() {
    let state = started_at(Location::default());
    assert_eq!(state.view().page_info, "Loading box count...");
    assert!(state.view().units.is_empty());
}

#[test]
fn each_page_materializes_exactly_its_range() {
    let mut state = ready(250, Location::default());
    for (page, expected) in [(1, 1..=100), (2, 101..=200), (3, 201..=250), (1, 1..=100)] {
        let (next, effects) = update(state, Msg::Navigate(NavTarget::Page(page)));
        state = next;
        assert_eq!(unit_ids(&state), expected.clone().collect::<Vec<_>>());
        assert!(state
            .units()
            .values()
            .all(|unit| unit.state == UnitState::Waiting));
        if page != 1 || !effects.is_empty() {
            assert_eq!(fetch_count(&effects), 2);
        }
    }
}

#[test]
fn navigating_to_current_page_does_nothing() {
    let state = ready(250, Location::parse("?page=2"));
    let (next, effects) = update(state.clone(), Msg::Navigate(NavTarget::Page(2)));
    assert!(effects.is_empty());
    assert_eq!(next.history(), state.history());

    let (_, effects) = update(state, Msg::Navigate(NavTarget::Page(9)));
    assert!(effects.is_empty());
}

#[test]
fn prev_next_first_last_targets() {
    let state = ready(1_000, Location::parse("?page=5"));

    let (state, _) = update(state, Msg::Navigate(NavTarget::Next));
    assert_eq!(state.page().current_page(), 6);
    let (state, _) = update(state, Msg::Navigate(NavTarget::Prev));
    assert_eq!(state.page().current_page(), 5);
    let (state, _) = update(state, Msg::Navigate(NavTarget::Last));
    assert_eq!(state.page().current_page(), 10);
    let (state, effects) = update(state, Msg::Navigate(NavTarget::Next));
    assert!(effects.is_empty());
    let (state, _) = update(state, Msg::Navigate(NavTarget::First));
    assert_eq!(state.page().current_page(), 1);
    assert_eq!(state.history().current().to_string(), "?page=1");
}

#[test]
fn navigation_keeps_cursors_and_drops_old_unit_state() {
    let state = ready(250, Location::default());
    let (state, effects) = update(state, Msg::PollTick);
    let requests: Vec<_> = effects
        .iter()
        .filter_map(|effect| match effect {
            Effect::FetchLogs { request } | Effect::FetchStates { request } => Some(*request),
            _ => None,
        })
        .collect();

    let (state, _) = update(
        state,
        Msg::LogsFetched {
            seq: requests[0].seq,
            entries: vec![LogEntry {
                id: 41,
                text: "box 5 started".into(),
                timestamp: "t".into(),
            }],
        },
    );
    let (state, _) = update(
        state,
        Msg::StatesFetched {
            seq: requests[1].seq,
            records: vec![StateChange {
                id: 17,
                unit_index: 5,
                signal: StateSignal::Running,
                assigned_worker: Some("w".into()),
            }],
        },
    );
    assert_eq!(state.unit(5).map(|unit| unit.state), Some(UnitState::Running));

    let (state, effects) = update(state, Msg::Navigate(NavTarget::Page(2)));
    assert!(state.unit(5).is_none());
    assert_eq!(state.cursor().last_log_id, 41);
    assert_eq!(state.cursor().last_state_change_id, 17);
    assert!(effects.iter().all(|effect| match effect {
        Effect::FetchLogs { request } => request.after == 41,
        Effect::FetchStates { request } => request.after == 17,
        _ => false,
    }));

    let (state, _) = update(state, Msg::Navigate(NavTarget::Page(1)));
    assert_eq!(state.unit(5).map(|unit| unit.state), Some(UnitState::Waiting));
    assert_ne!(state.cursor().last_log_id, CURSOR_SENTINEL);
}

#[test]
fn invalid_page_jump_posts_notice() {
    let state = ready(250, Location::default());
    for raw in ["0", "4", "abc", "", "-1"] {
        let (next, effects) = update(state.clone(), Msg::PageJumpSubmitted(raw.to_string()));
        assert!(effects.is_empty(), "jump to {raw:?}");
        assert_eq!(next.page().current_page(), 1);
        assert_eq!(
            next.view().activity[0].text,
            "Please enter a page number between 1 and 3"
        );
    }

    let (state, effects) = update(state, Msg::PageJumpSubmitted(" 3 ".into()));
    assert_eq!(state.page().current_page(), 3);
    assert_eq!(fetch_count(&effects), 2);
}

#[test]
fn history_back_and_forward_restore_pages() {
    let state = ready(350, Location::default());
    let (state, _) = update(state, Msg::Navigate(NavTarget::Page(2)));
    let (state, _) = update(state, Msg::Navigate(NavTarget::Page(4)));

    let (state, effects) = update(state, Msg::HistoryBack);
    assert_eq!(state.page().current_page(), 2);
    assert_eq!(fetch_count(&effects), 2);
    let (state, _) = update(state, Msg::HistoryBack);
    assert_eq!(state.page().current_page(), 1);
    let (state, effects) = update(state, Msg::HistoryBack);
    assert!(effects.is_empty());
    assert_eq!(state.page().current_page(), 1);

    let (state, _) = update(state, Msg::HistoryForward);
    let (state, _) = update(state, Msg::HistoryForward);
    assert_eq!(state.page().current_page(), 4);
    assert_eq!(unit_ids(&state), (301..=350).collect::<Vec<_>>());
    let (_, effects) = update(state, Msg::HistoryForward);
    assert!(effects.is_empty());
}

#[test]
fn pagination_links_in_view() {
    let state = ready(250, Location::parse("?page=2"));
    assert_eq!(
        state.view().pagination,
        vec![
            PageLink::Prev { target: 1, enabled: true },
            PageLink::Page { number: 1, active: false },
            PageLink::Page { number: 2, active: true },
            PageLink::Page { number: 3, active: false },
            PageLink::Next { target: 3, enabled: true },
        ]
    );

    let single = ready(40, Location::default());
    assert!(single.view().pagination.is_empty());
}

#[test]
fn zero_units_shows_empty_grid_and_still_polls() {
    let (state, effects) = update(started_at(Location::parse("?page=3")), Msg::UnitCountLoaded(0));
    assert!(state.units().is_empty());
    assert_eq!(state.page().current_page(), 1);
    assert_eq!(fetch_count(&effects), 2);
}

#[test]
fn last_page_of_the_largest_count_materializes_its_tail() {
    let state = ready(u32::MAX, Location::default());
    let (state, effects) = update(state, Msg::Navigate(NavTarget::Last));

    assert_eq!(state.page().current_page(), 42_949_673);
    assert_eq!(unit_ids(&state), (4_294_967_201..=u32::MAX).collect::<Vec<_>>());
    assert_eq!(fetch_count(&effects), 2);
}
