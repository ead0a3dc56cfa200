//! Boxwatch core: pure synchronization state machine and view-model helpers.
mod activity;
mod effect;
mod inspect;
mod msg;
mod paging;
mod state;
mod sync;
mod units;
mod update;
mod view_model;

pub use activity::{ActivityFeed, ActivityItem, LogEntry, NoticeLevel, ACTIVITY_CAPACITY};
pub use effect::Effect;
pub use inspect::{
    decode_snapshot, encode_snapshot, Inspector, InspectorAction, InspectorMsg, InspectorPhase,
    SnapshotError,
};
pub use msg::Msg;
pub use paging::{
    pagination_links, Location, NavHistory, NavTarget, PageContext, PageLink, DEFAULT_UNIT_COUNT,
    PAGE_SIZE,
};
pub use state::{AppState, Clock, DEFAULT_SERVER_ADDRESS};
pub use sync::{Cursor, Feed, FeedRequest, RequestSeq, SyncState, CURSOR_SENTINEL};
pub use units::{StateChange, StateSignal, Unit, UnitId, UnitState};
pub use update::update;
pub use view_model::{
    ActivityKind, ActivityView, AppViewModel, InspectorView, StatusIcon, UnitView, VisualClass,
};
