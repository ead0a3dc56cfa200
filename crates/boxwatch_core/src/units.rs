use std::collections::BTreeMap;
use std::ops::RangeInclusive;

use crate::Cursor;

pub type UnitId = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnitState {
    #[default]
    Waiting,
    Running,
    Finished,
}

/// State carried by a state-change record. `Reset` is a transient signal
/// that returns a unit to `Waiting`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateSignal {
    Waiting,
    Running,
    Finished,
    Reset,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateChange {
    pub id: i64,
    pub unit_index: i64,
    pub signal: StateSignal,
    pub assigned_worker: Option<String>,
}

/// On-screen placeholder for one unit of the current page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unit {
    pub id: UnitId,
    pub state: UnitState,
    pub assigned_worker: Option<String>,
    /// Id of the last state-change record applied to this unit.
    pub version: Option<i64>,
}

impl Unit {
    pub fn placeholder(id: UnitId) -> Self {
        Self {
            id,
            state: UnitState::Waiting,
            assigned_worker: None,
            version: None,
        }
    }

    /// Applies a record unless one with an equal or newer id was applied already.
    pub fn apply(&mut self, change: &StateChange) -> bool {
        if self.version.is_some_and(|version| change.id <= version) {
            return false;
        }
        let (state, worker) = match change.signal {
            StateSignal::Running => (UnitState::Running, change.assigned_worker.clone()),
            StateSignal::Finished => (UnitState::Finished, change.assigned_worker.clone()),
            StateSignal::Waiting | StateSignal::Reset => (UnitState::Waiting, None),
        };
        self.state = state;
        self.assigned_worker = worker;
        self.version = Some(change.id);
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct StateMerge {
    pub applied: usize,
    pub off_page: usize,
    pub stale: usize,
}

/// Applies a state-change batch onto the materialized units and advances the
/// state cursor. Records for units that are not on screen are dropped.
pub(crate) fn reconcile_states(
    units: &mut BTreeMap<UnitId, Unit>,
    cursor: &mut Cursor,
    batch: Vec<StateChange>,
) -> StateMerge {
    let floor = cursor.last_state_change_id;
    let mut merge = StateMerge::default();
    for change in batch {
        if change.id <= floor {
            merge.stale += 1;
            continue;
        }
        cursor.advance_state(change.id);
        let unit = UnitId::try_from(change.unit_index)
            .ok()
            .and_then(|id| units.get_mut(&id));
        match unit {
            None => merge.off_page += 1,
            Some(unit) => {
                if unit.apply(&change) {
                    merge.applied += 1;
                } else {
                    merge.stale += 1;
                }
            }
        }
    }
    merge
}

/// Keeps exactly the units in `range`, creating placeholders for new ids.
pub(crate) fn materialize(units: &mut BTreeMap<UnitId, Unit>, range: RangeInclusive<UnitId>) {
    units.retain(|id, _| range.contains(id));
    for id in range {
        units.entry(id).or_insert_with(|| Unit::placeholder(id));
    }
}
