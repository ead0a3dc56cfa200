use std::collections::VecDeque;

use crate::Cursor;

/// Maximum number of entries kept in the activity panel.
pub const ACTIVITY_CAPACITY: usize = 30;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub id: i64,
    pub text: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// One line of the activity panel: a server log entry or a locally raised notice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivityItem {
    Log(LogEntry),
    Notice {
        level: NoticeLevel,
        text: String,
        timestamp: String,
    },
}

/// Newest-first, capacity-bounded activity buffer.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ActivityFeed {
    items: VecDeque<ActivityItem>,
}

impl ActivityFeed {
    pub fn push_front(&mut self, item: ActivityItem) {
        self.items.push_front(item);
        self.items.truncate(ACTIVITY_CAPACITY);
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActivityItem> {
        self.items.iter()
    }

    pub fn log_entries(&self) -> impl Iterator<Item = &LogEntry> {
        self.items.iter().filter_map(|item| match item {
            ActivityItem::Log(entry) => Some(entry),
            ActivityItem::Notice { .. } => None,
        })
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct LogMerge {
    pub applied: usize,
    pub skipped: usize,
}

/// Merges a log batch into the feed, newest first, and advances the log cursor.
///
/// Entries at or below the cursor were already shown by an overlapping request
/// and are skipped.
pub(crate) fn reconcile_logs(
    feed: &mut ActivityFeed,
    cursor: &mut Cursor,
    batch: Vec<LogEntry>,
) -> LogMerge {
    let floor = cursor.last_log_id;
    let mut merge = LogMerge::default();
    for entry in batch {
        if entry.id <= floor {
            merge.skipped += 1;
            continue;
        }
        cursor.advance_log(entry.id);
        feed.push_front(ActivityItem::Log(entry));
        merge.applied += 1;
    }
    merge
}
