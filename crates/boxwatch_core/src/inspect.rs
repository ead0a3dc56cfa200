//! Secondary view for inspecting and resetting a single unit.
//!
//! The view is opened from a URL-encoded snapshot (`data=<json>`), exactly what
//! the primary view hands over, and runs its own small state machine. When it
//! finishes it reports [`InspectorAction::Close`] and the primary view
//! refreshes the state feed.

use serde_json::Value;
use url::form_urlencoded;

use crate::UnitId;

const SNAPSHOT_PARAM: &str = "data";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SnapshotError {
    #[error("snapshot payload is missing the `data` parameter")]
    MissingData,
    #[error("snapshot payload is not valid JSON: {0}")]
    InvalidJson(String),
}

/// Encodes a unit snapshot as the query handed to the secondary view.
pub fn encode_snapshot(snapshot: &Value) -> String {
    form_urlencoded::Serializer::new(String::new())
        .append_pair(SNAPSHOT_PARAM, &snapshot.to_string())
        .finish()
}

pub fn decode_snapshot(query: &str) -> Result<Value, SnapshotError> {
    let raw = form_urlencoded::parse(query.trim_start_matches('?').as_bytes())
        .find(|(key, _)| *key == SNAPSHOT_PARAM)
        .map(|(_, value)| value.into_owned())
        .ok_or(SnapshotError::MissingData)?;
    serde_json::from_str(&raw).map_err(|err| SnapshotError::InvalidJson(err.to_string()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InspectorPhase {
    Viewing,
    ConfirmingReset,
    Resetting,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InspectorMsg {
    ResetPressed,
    ConfirmPressed,
    CancelPressed,
    ClosePressed,
    /// The reset command finished, successfully or not.
    ResetAcknowledged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InspectorAction {
    None,
    SendReset { unit_id: i64 },
    Close,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inspector {
    unit: UnitId,
    snapshot: Value,
    target_id: i64,
    phase: InspectorPhase,
}

impl Inspector {
    /// Opens the view for `unit` from an encoded snapshot query.
    ///
    /// The reset command is keyed by the snapshot's own `id` when it carries
    /// one, otherwise by the unit index that was selected.
    pub fn open(unit: UnitId, query: &str) -> Result<Self, SnapshotError> {
        let snapshot = decode_snapshot(query)?;
        let target_id = snapshot
            .get("id")
            .and_then(Value::as_i64)
            .unwrap_or(i64::from(unit));
        Ok(Self {
            unit,
            snapshot,
            target_id,
            phase: InspectorPhase::Viewing,
        })
    }

    pub fn update(&mut self, msg: InspectorMsg) -> InspectorAction {
        match (self.phase, msg) {
            (InspectorPhase::Viewing, InspectorMsg::ResetPressed) => {
                self.phase = InspectorPhase::ConfirmingReset;
                InspectorAction::None
            }
            (InspectorPhase::ConfirmingReset, InspectorMsg::ConfirmPressed) => {
                self.phase = InspectorPhase::Resetting;
                InspectorAction::SendReset {
                    unit_id: self.target_id,
                }
            }
            (InspectorPhase::ConfirmingReset, InspectorMsg::CancelPressed) => {
                self.phase = InspectorPhase::Viewing;
                InspectorAction::None
            }
            (InspectorPhase::Resetting, InspectorMsg::ResetAcknowledged) => InspectorAction::Close,
            // Closing is held back while a reset is in flight so the refresh sees it.
            (InspectorPhase::Resetting, _) => InspectorAction::None,
            (_, InspectorMsg::ClosePressed) => InspectorAction::Close,
            _ => InspectorAction::None,
        }
    }

    pub fn unit(&self) -> UnitId {
        self.unit
    }

    pub fn target_id(&self) -> i64 {
        self.target_id
    }

    pub fn phase(&self) -> InspectorPhase {
        self.phase
    }

    pub fn snapshot_text(&self) -> String {
        serde_json::to_string_pretty(&self.snapshot).unwrap_or_else(|_| self.snapshot.to_string())
    }
}
