use serde_json::Value;

use crate::{InspectorMsg, Location, LogEntry, NavTarget, RequestSeq, StateChange, UnitId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Dashboard opened with the persisted server address and the initial location.
    AppStarted {
        server_address: String,
        location: Location,
    },
    /// Service reported the number of units.
    UnitCountLoaded(u32),
    /// Unit count could not be fetched or parsed.
    UnitCountFailed { error: String },
    /// Poll timer fired.
    PollTick,
    /// User asked for an immediate refresh of both feeds.
    RefreshAllClicked,
    LogsFetched {
        seq: RequestSeq,
        entries: Vec<LogEntry>,
    },
    LogsFailed { seq: RequestSeq, error: String },
    StatesFetched {
        seq: RequestSeq,
        records: Vec<StateChange>,
    },
    StatesFailed { seq: RequestSeq, error: String },
    /// User clicked a pagination control.
    Navigate(NavTarget),
    /// User typed a page number into the jump box.
    PageJumpSubmitted(String),
    HistoryBack,
    HistoryForward,
    /// User entered a new server address.
    ServerAddressSubmitted(String),
    /// User selected a unit for inspection.
    UnitSelected { unit: UnitId },
    UnitDetailLoaded { unit: UnitId, snapshot: Value },
    UnitDetailFailed { unit: UnitId, error: String },
    /// Input routed to the open secondary view.
    Inspector(InspectorMsg),
    /// Reset command finished; `Ok` carries the service's acknowledgement text.
    ResetCompleted {
        unit_id: i64,
        result: Result<String, String>,
    },
}
