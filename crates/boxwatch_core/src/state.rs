use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::activity::{reconcile_logs, LogMerge};
use crate::units::{materialize, reconcile_states, StateMerge};
use crate::view_model::AppViewModel;
use crate::{
    ActivityFeed, ActivityItem, Cursor, Effect, Feed, Inspector, Location, LogEntry, NavHistory,
    NoticeLevel, PageContext, RequestSeq, StateChange, SyncState, Unit, UnitId,
};

pub const DEFAULT_SERVER_ADDRESS: &str = "localhost";

/// Source of wall-clock labels for locally raised notices.
#[derive(Clone)]
pub struct Clock(Arc<dyn Fn() -> String + Send + Sync>);

impl Clock {
    pub fn new(now: impl Fn() -> String + Send + Sync + 'static) -> Self {
        Self(Arc::new(now))
    }

    pub fn now(&self) -> String {
        (self.0)()
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new(String::new)
    }
}

impl fmt::Debug for Clock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Clock")
    }
}

// Clocks never take part in state comparisons.
impl PartialEq for Clock {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

impl Eq for Clock {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    sync: SyncState,
    activity: ActivityFeed,
    units: BTreeMap<UnitId, Unit>,
    page: PageContext,
    page_ready: bool,
    history: NavHistory,
    server_address: String,
    secondary: Option<Inspector>,
    clock: Clock,
    dirty: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            sync: SyncState::default(),
            activity: ActivityFeed::default(),
            units: BTreeMap::new(),
            page: PageContext::default(),
            page_ready: false,
            history: NavHistory::default(),
            server_address: DEFAULT_SERVER_ADDRESS.to_string(),
            secondary: None,
            clock: Clock::default(),
            dirty: false,
        }
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn view(&self) -> AppViewModel {
        AppViewModel::from_state(self)
    }

    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn cursor(&self) -> Cursor {
        self.sync.cursor()
    }

    pub fn sync(&self) -> &SyncState {
        &self.sync
    }

    pub fn activity(&self) -> &ActivityFeed {
        &self.activity
    }

    pub fn units(&self) -> &BTreeMap<UnitId, Unit> {
        &self.units
    }

    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.units.get(&id)
    }

    pub fn page(&self) -> &PageContext {
        &self.page
    }

    /// Whether the unit count has been settled and placeholders exist.
    pub fn is_page_ready(&self) -> bool {
        self.page_ready
    }

    pub fn history(&self) -> &NavHistory {
        &self.history
    }

    pub fn server_address(&self) -> &str {
        &self.server_address
    }

    pub fn inspector(&self) -> Option<&Inspector> {
        self.secondary.as_ref()
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn set_server_address(&mut self, address: String) {
        self.server_address = address;
        self.mark_dirty();
    }

    /// Points the dashboard at another server. Projections from the old one are
    /// rebuilt as fresh placeholders.
    pub(crate) fn switch_server(&mut self, address: String) {
        self.set_server_address(address);
        self.units.clear();
        if self.page_ready {
            materialize(&mut self.units, self.page.visible_range());
        }
    }

    pub(crate) fn history_mut(&mut self) -> &mut NavHistory {
        &mut self.history
    }

    pub(crate) fn notice(&mut self, level: NoticeLevel, text: impl Into<String>) {
        let timestamp = self.clock.now();
        self.activity.push_front(ActivityItem::Notice {
            level,
            text: text.into(),
            timestamp,
        });
        self.mark_dirty();
    }

    /// Effects for one full synchronization cycle, or none while the page is unsettled.
    pub(crate) fn sync_cycle(&mut self) -> Vec<Effect> {
        if !self.page_ready {
            return Vec::new();
        }
        let (logs, states) = self.sync.begin_cycle();
        vec![
            Effect::FetchLogs { request: logs },
            Effect::FetchStates { request: states },
        ]
    }

    pub(crate) fn state_refresh(&mut self) -> Effect {
        Effect::FetchStates {
            request: self.sync.issue(Feed::State),
        }
    }

    /// Settles the unit count, clamps the current location and materializes the page.
    pub(crate) fn settle_unit_count(&mut self, total_units: u32) {
        let requested = self.history.current().page();
        self.page = PageContext::new(total_units, requested);
        let clamped = self.page.current_page();
        if clamped != requested {
            self.history.replace(Location::for_page(clamped));
        }
        materialize(&mut self.units, self.page.visible_range());
        self.page_ready = true;
        self.mark_dirty();
    }

    pub(crate) fn show_page(&mut self, page: u32) {
        self.page = self.page.with_page(page);
        if self.page_ready {
            materialize(&mut self.units, self.page.visible_range());
        }
        self.mark_dirty();
    }

    pub(crate) fn accept_response(&mut self, feed: Feed, seq: RequestSeq) -> bool {
        self.sync.accept(feed, seq)
    }

    pub(crate) fn apply_logs(&mut self, entries: Vec<LogEntry>) -> LogMerge {
        let merge = reconcile_logs(&mut self.activity, self.sync.cursor_mut(), entries);
        if merge.applied > 0 {
            self.mark_dirty();
        }
        merge
    }

    pub(crate) fn apply_states(&mut self, records: Vec<StateChange>) -> StateMerge {
        let merge = reconcile_states(&mut self.units, self.sync.cursor_mut(), records);
        if merge.applied > 0 {
            self.mark_dirty();
        }
        merge
    }

    pub(crate) fn secondary_mut(&mut self) -> Option<&mut Inspector> {
        self.secondary.as_mut()
    }

    pub(crate) fn open_secondary(&mut self, inspector: Inspector) {
        self.secondary = Some(inspector);
        self.mark_dirty();
    }

    pub(crate) fn close_secondary(&mut self) -> Option<Inspector> {
        self.mark_dirty();
        self.secondary.take()
    }
}
