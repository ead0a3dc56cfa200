//! Cursor store and request sequencing for the two delta feeds.

/// Cursor value meaning "nothing seen yet".
pub const CURSOR_SENTINEL: i64 = -1;

pub type RequestSeq = u64;

/// Watermarks into the log feed and the state-change feed.
///
/// Both fields only ever move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    pub last_log_id: i64,
    pub last_state_change_id: i64,
}

impl Default for Cursor {
    fn default() -> Self {
        Self {
            last_log_id: CURSOR_SENTINEL,
            last_state_change_id: CURSOR_SENTINEL,
        }
    }
}

impl Cursor {
    pub fn advance_log(&mut self, id: i64) {
        self.last_log_id = self.last_log_id.max(id);
    }

    pub fn advance_state(&mut self, id: i64) {
        self.last_state_change_id = self.last_state_change_id.max(id);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feed {
    Log,
    State,
}

/// One outgoing delta request: its sequence number and the cursor value it carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedRequest {
    pub seq: RequestSeq,
    pub after: i64,
}

/// Synchronization bookkeeping owned by [`crate::AppState`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SyncState {
    cursor: Cursor,
    last_seq: RequestSeq,
    applied_log_seq: Option<RequestSeq>,
    applied_state_seq: Option<RequestSeq>,
    cycles: u64,
}

impl SyncState {
    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub(crate) fn cursor_mut(&mut self) -> &mut Cursor {
        &mut self.cursor
    }

    /// Number of full synchronization cycles issued so far.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Issues a request for one feed, stamped with the next sequence number.
    pub fn issue(&mut self, feed: Feed) -> FeedRequest {
        self.last_seq += 1;
        let after = match feed {
            Feed::Log => self.cursor.last_log_id,
            Feed::State => self.cursor.last_state_change_id,
        };
        FeedRequest {
            seq: self.last_seq,
            after,
        }
    }

    /// Issues the log and state requests of one synchronization cycle.
    pub fn begin_cycle(&mut self) -> (FeedRequest, FeedRequest) {
        self.cycles += 1;
        sync_logging::set_poll_cycle(self.cycles);
        (self.issue(Feed::Log), self.issue(Feed::State))
    }

    /// Marks a response as applied unless a newer response for the same feed
    /// has already been applied. Returns `false` for stale responses.
    pub fn accept(&mut self, feed: Feed, seq: RequestSeq) -> bool {
        let slot = match feed {
            Feed::Log => &mut self.applied_log_seq,
            Feed::State => &mut self.applied_state_seq,
        };
        if slot.is_some_and(|applied| seq <= applied) {
            return false;
        }
        *slot = Some(seq);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_never_regresses() {
        let mut cursor = Cursor::default();
        cursor.advance_log(9);
        cursor.advance_log(4);
        cursor.advance_state(2);
        cursor.advance_state(CURSOR_SENTINEL);
        assert_eq!(cursor.last_log_id, 9);
        assert_eq!(cursor.last_state_change_id, 2);
    }

    #[test]
    fn stale_responses_are_rejected_per_feed() {
        let mut sync = SyncState::default();
        let (log_a, state_a) = sync.begin_cycle();
        let (log_b, state_b) = sync.begin_cycle();

        assert!(sync.accept(Feed::Log, log_b.seq));
        assert!(!sync.accept(Feed::Log, log_a.seq));
        assert!(sync.accept(Feed::State, state_a.seq));
        assert!(sync.accept(Feed::State, state_b.seq));
        assert!(!sync.accept(Feed::State, state_b.seq));
        assert_eq!(sync.cycles(), 2);
    }

    #[test]
    fn requests_carry_current_cursor() {
        let mut sync = SyncState::default();
        sync.cursor_mut().advance_log(12);
        let (log, state) = sync.begin_cycle();
        assert_eq!(log.after, 12);
        assert_eq!(state.after, CURSOR_SENTINEL);
        assert!(state.seq > log.seq);
    }
}
