use sync_logging::{sync_debug, sync_info, sync_trace, sync_warn};

use crate::inspect::encode_snapshot;
use crate::{
    AppState, Effect, Feed, Inspector, InspectorAction, InspectorMsg, InspectorPhase, Location,
    Msg, NavHistory, NavTarget, NoticeLevel, DEFAULT_UNIT_COUNT,
};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::AppStarted {
            server_address,
            location,
        } => {
            state.set_server_address(server_address);
            *state.history_mut() = NavHistory::new(location);
            vec![Effect::FetchUnitCount]
        }
        Msg::UnitCountLoaded(total_units) => {
            sync_info!("Unit count loaded: {}", total_units);
            state.settle_unit_count(total_units);
            state.sync_cycle()
        }
        Msg::UnitCountFailed { error } => {
            let address = state.server_address().to_string();
            state.notice(
                NoticeLevel::Error,
                format!("Failed to connect to server at {address}: {error}"),
            );
            // Keep the grid usable with whatever count is already known.
            let fallback = if state.is_page_ready() {
                state.page().total_units()
            } else {
                DEFAULT_UNIT_COUNT
            };
            state.settle_unit_count(fallback);
            Vec::new()
        }
        Msg::PollTick | Msg::RefreshAllClicked => {
            if !state.is_page_ready() {
                sync_trace!("Skipping sync cycle until unit count is settled");
            }
            state.sync_cycle()
        }
        Msg::LogsFetched { seq, entries } => {
            if state.accept_response(Feed::Log, seq) {
                let merge = state.apply_logs(entries);
                if merge.skipped > 0 {
                    sync_debug!("Log response {} skipped {} seen entries", seq, merge.skipped);
                }
            } else {
                sync_debug!("Dropping stale log response {}", seq);
            }
            Vec::new()
        }
        Msg::LogsFailed { seq, error } => {
            sync_warn!("Log request {} failed: {}", seq, error);
            state.notice(NoticeLevel::Error, format!("Failed to fetch logs: {error}"));
            Vec::new()
        }
        Msg::StatesFetched { seq, records } => {
            if state.accept_response(Feed::State, seq) {
                let merge = state.apply_states(records);
                sync_trace!(
                    "State response {}: applied {}, off-page {}, stale {}",
                    seq,
                    merge.applied,
                    merge.off_page,
                    merge.stale
                );
            } else {
                sync_debug!("Dropping stale state response {}", seq);
            }
            Vec::new()
        }
        Msg::StatesFailed { seq, error } => {
            sync_warn!("State request {} failed: {}", seq, error);
            state.notice(NoticeLevel::Error, format!("Failed to fetch states: {error}"));
            Vec::new()
        }
        Msg::Navigate(target) => {
            let current = state.page().current_page();
            let last = state.page().last_page();
            let page = match target {
                NavTarget::Prev => current.saturating_sub(1),
                NavTarget::Next => current + 1,
                NavTarget::First => 1,
                NavTarget::Last => last,
                NavTarget::Page(page) => page,
            };
            if page == current || !state.page().is_valid_page(page) {
                Vec::new()
            } else {
                navigate_to(&mut state, page)
            }
        }
        Msg::PageJumpSubmitted(raw) => match raw.trim().parse::<u32>() {
            Ok(page) if state.page().is_valid_page(page) => navigate_to(&mut state, page),
            _ => {
                let last = state.page().last_page();
                state.notice(
                    NoticeLevel::Error,
                    format!("Please enter a page number between 1 and {last}"),
                );
                Vec::new()
            }
        },
        Msg::HistoryBack => match state.history_mut().back() {
            Some(location) => restore_location(&mut state, location),
            None => Vec::new(),
        },
        Msg::HistoryForward => match state.history_mut().forward() {
            Some(location) => restore_location(&mut state, location),
            None => Vec::new(),
        },
        Msg::ServerAddressSubmitted(raw) => {
            let address = raw.trim();
            if address.is_empty() {
                state.notice(NoticeLevel::Error, "Please enter a valid server address");
                Vec::new()
            } else {
                let address = address.to_string();
                state.switch_server(address.clone());
                state.notice(
                    NoticeLevel::Info,
                    format!("Server address updated to {address}"),
                );
                vec![
                    Effect::ServerAddressChanged { address },
                    Effect::FetchUnitCount,
                ]
            }
        }
        Msg::UnitSelected { unit } => {
            if state.unit(unit).is_some() {
                vec![Effect::FetchUnitDetail { unit }]
            } else {
                sync_debug!("Ignoring selection of unit {} outside the current page", unit);
                Vec::new()
            }
        }
        Msg::UnitDetailLoaded { unit, snapshot } => {
            if state.inspector().is_some() {
                state.notice(
                    NoticeLevel::Error,
                    "Popup blocked. Close the open box view before inspecting another box.",
                );
            } else {
                match Inspector::open(unit, &encode_snapshot(&snapshot)) {
                    Ok(inspector) => state.open_secondary(inspector),
                    Err(err) => state.notice(
                        NoticeLevel::Error,
                        format!("Failed to load box information: {err}"),
                    ),
                }
            }
            Vec::new()
        }
        Msg::UnitDetailFailed { unit, error } => {
            state.notice(
                NoticeLevel::Error,
                format!("Failed to load box information for {unit}: {error}"),
            );
            Vec::new()
        }
        Msg::Inspector(inspector_msg) => route_to_inspector(&mut state, inspector_msg),
        Msg::ResetCompleted { unit_id, result } => {
            match result {
                Ok(text) => state.notice(NoticeLevel::Info, format!("Reset {unit_id}: {text}")),
                Err(error) => state.notice(
                    NoticeLevel::Error,
                    format!("Error occurred during reset of {unit_id}: {error}"),
                ),
            }
            let awaiting = state.inspector().is_some_and(|inspector| {
                inspector.phase() == InspectorPhase::Resetting && inspector.target_id() == unit_id
            });
            if awaiting {
                route_to_inspector(&mut state, InspectorMsg::ResetAcknowledged)
            } else {
                Vec::new()
            }
        }
    };

    (state, effects)
}

fn navigate_to(state: &mut AppState, page: u32) -> Vec<Effect> {
    state.history_mut().push(Location::for_page(page));
    state.show_page(page);
    state.sync_cycle()
}

fn restore_location(state: &mut AppState, location: Location) -> Vec<Effect> {
    state.show_page(location.page());
    state.sync_cycle()
}

fn route_to_inspector(state: &mut AppState, msg: InspectorMsg) -> Vec<Effect> {
    let Some(inspector) = state.secondary_mut() else {
        return Vec::new();
    };
    let action = inspector.update(msg);
    state.mark_dirty();
    match action {
        InspectorAction::None => Vec::new(),
        InspectorAction::SendReset { unit_id } => vec![Effect::ResetUnit { unit_id }],
        InspectorAction::Close => {
            if let Some(closed) = state.close_secondary() {
                sync_info!("Box view for unit {} closed; refreshing states", closed.unit());
            }
            vec![state.state_refresh()]
        }
    }
}
