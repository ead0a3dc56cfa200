use crate::{FeedRequest, UnitId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    FetchUnitCount,
    FetchLogs { request: FeedRequest },
    FetchStates { request: FeedRequest },
    FetchUnitDetail { unit: UnitId },
    /// Fire-and-forget reset, keyed by the unit's id.
    ResetUnit { unit_id: i64 },
    /// Persist the address and point the engine at it.
    ServerAddressChanged { address: String },
}
