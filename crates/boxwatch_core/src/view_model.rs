use crate::paging::pagination_links;
use crate::{
    ActivityItem, AppState, Cursor, InspectorPhase, NoticeLevel, PageLink, Unit, UnitId, UnitState,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusIcon {
    Hourglass,
    Spinner,
    Check,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisualClass {
    Running,
    Finished,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitView {
    pub id: UnitId,
    pub state: UnitState,
    pub label: String,
    pub icon: StatusIcon,
    pub class: Option<VisualClass>,
}

impl From<&Unit> for UnitView {
    fn from(unit: &Unit) -> Self {
        let worker = unit.assigned_worker.as_deref().unwrap_or("unknown");
        let (label, icon, class) = match unit.state {
            UnitState::Running => (
                format!("{} is Running on {}", unit.id, worker),
                StatusIcon::Spinner,
                Some(VisualClass::Running),
            ),
            UnitState::Finished => (
                format!("{} was Finished by {}", unit.id, worker),
                StatusIcon::Check,
                Some(VisualClass::Finished),
            ),
            UnitState::Waiting => (
                format!("{} is Waiting", unit.id),
                StatusIcon::Hourglass,
                None,
            ),
        };
        Self {
            id: unit.id,
            state: unit.state,
            label,
            icon,
            class,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityKind {
    Log,
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityView {
    pub kind: ActivityKind,
    pub text: String,
    pub timestamp: String,
}

impl From<&ActivityItem> for ActivityView {
    fn from(item: &ActivityItem) -> Self {
        match item {
            ActivityItem::Log(entry) => Self {
                kind: ActivityKind::Log,
                text: entry.text.clone(),
                timestamp: entry.timestamp.clone(),
            },
            ActivityItem::Notice {
                level,
                text,
                timestamp,
            } => Self {
                kind: match level {
                    NoticeLevel::Info => ActivityKind::Info,
                    NoticeLevel::Error => ActivityKind::Error,
                },
                text: text.clone(),
                timestamp: timestamp.clone(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InspectorView {
    pub unit: UnitId,
    pub target_id: i64,
    pub phase: InspectorPhase,
    pub snapshot_text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub location: String,
    pub server_address: String,
    pub page_ready: bool,
    pub current_page: u32,
    pub total_pages: u32,
    pub total_units: u32,
    pub page_info: String,
    pub pagination: Vec<PageLink>,
    pub units: Vec<UnitView>,
    pub activity: Vec<ActivityView>,
    pub inspector: Option<InspectorView>,
    pub cursor: Cursor,
}

impl AppViewModel {
    pub(crate) fn from_state(state: &AppState) -> Self {
        let page = state.page();
        let range = page.visible_range();
        let page_info = if state.is_page_ready() {
            format!(
                "Showing boxes {} to {} of {}",
                range.start(),
                range.end(),
                page.total_units()
            )
        } else {
            "Loading box count...".to_string()
        };
        Self {
            location: state.history().current().to_string(),
            server_address: state.server_address().to_string(),
            page_ready: state.is_page_ready(),
            current_page: page.current_page(),
            total_pages: page.total_pages(),
            total_units: page.total_units(),
            page_info,
            pagination: pagination_links(page),
            units: state.units().values().map(UnitView::from).collect(),
            activity: state.activity().iter().map(ActivityView::from).collect(),
            inspector: state.inspector().map(|inspector| InspectorView {
                unit: inspector.unit(),
                target_id: inspector.target_id(),
                phase: inspector.phase(),
                snapshot_text: inspector.snapshot_text(),
            }),
            cursor: state.cursor(),
        }
    }
}
