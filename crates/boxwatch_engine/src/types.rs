use std::fmt;

use boxwatch_core::{LogEntry, RequestSeq, StateChange, StateSignal, UnitId};
use serde::Deserialize;
use serde_json::Value;

/// Worker name the service reports for a unit nobody has picked up.
const NO_WORKER: &str = "Null";

/// One entry of the `/logs` feed as sent over the wire.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LogRecord {
    #[serde(rename = "ID")]
    pub id: i64,
    #[serde(rename = "Text")]
    pub text: String,
    #[serde(rename = "time", default)]
    pub time: String,
}

impl From<LogRecord> for LogEntry {
    fn from(record: LogRecord) -> Self {
        LogEntry {
            id: record.id,
            text: record.text,
            timestamp: record.time,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum WireState {
    Waiting,
    Running,
    Finished,
    Reset,
}

impl From<WireState> for StateSignal {
    fn from(state: WireState) -> Self {
        match state {
            WireState::Waiting => StateSignal::Waiting,
            WireState::Running => StateSignal::Running,
            WireState::Finished => StateSignal::Finished,
            WireState::Reset => StateSignal::Reset,
        }
    }
}

/// One entry of the `/status` feed as sent over the wire.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StateRecord {
    #[serde(rename = "ID")]
    pub id: i64,
    pub index: i64,
    pub state: WireState,
    #[serde(rename = "sentTo", default)]
    pub sent_to: Option<String>,
}

impl From<StateRecord> for StateChange {
    fn from(record: StateRecord) -> Self {
        StateChange {
            id: record.id,
            unit_index: record.index,
            signal: record.state.into(),
            assigned_worker: record
                .sent_to
                .filter(|worker| !worker.is_empty() && worker != NO_WORKER),
        }
    }
}

/// Body of a `/reset` acknowledgement.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ResetReply {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// Poll timer fired.
    PollTick,
    UnitCount(Result<u32, FetchError>),
    Logs {
        seq: RequestSeq,
        result: Result<Vec<LogEntry>, FetchError>,
    },
    States {
        seq: RequestSeq,
        result: Result<Vec<StateChange>, FetchError>,
    },
    UnitDetail {
        unit: UnitId,
        result: Result<Value, FetchError>,
    },
    ResetCompleted {
        unit_id: i64,
        result: Result<String, FetchError>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchError {
    pub kind: FailureKind,
    pub message: String,
}

impl FetchError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            write!(f, "{}", self.kind)
        } else {
            write!(f, "{} ({})", self.kind, self.message)
        }
    }
}

impl std::error::Error for FetchError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidAddress,
    HttpStatus(u16),
    Timeout,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    /// Body arrived but could not be decoded.
    Malformed,
    Network,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidAddress => write!(f, "invalid server address"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::Malformed => write!(f, "malformed response"),
            FailureKind::Network => write!(f, "network error"),
        }
    }
}
