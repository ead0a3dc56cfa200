//! Boxwatch engine: job-runner client, poll timer and effect execution.
mod engine;
mod fetch;
mod persist;
mod types;

pub use engine::{EngineHandle, POLL_INTERVAL};
pub use fetch::{server_base_url, ClientSettings, JobRunnerApi, ReqwestJobRunner, DEFAULT_PORT};
pub use persist::{ensure_state_dir, AtomicFileWriter, PersistError};
pub use types::{
    EngineEvent, FailureKind, FetchError, LogRecord, ResetReply, StateRecord, WireState,
};
