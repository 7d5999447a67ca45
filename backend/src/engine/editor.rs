//! Manual slot edits.

use serde::{Deserialize, Serialize};

use super::identity::resolve;
use crate::models::{StaffRegistry, TimetableActivity, TimetableGrid, TimetableSet};

/// Largest day index an edit may create, beyond what the grid already has.
pub const MAX_EDIT_DAYS: usize = 7;
/// Largest period count per day an edit may create.
pub const MAX_EDIT_PERIODS: usize = 24;
/// Largest slot count per period an edit may create.
pub const MAX_EDIT_SLOTS: usize = 8;

/// One manual change to a timetable slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotEdit {
    pub class_name: String,
    pub day: usize,
    pub period: usize,
    pub slot: usize,
    /// Stable id or positional index of the staff member; `None` clears the slot.
    #[serde(default)]
    pub staff: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditError {
    #[error("No class selected")]
    NoClassSelected,

    #[error("Unknown class: {0}")]
    UnknownClass(String),

    #[error("Staff reference '{0}' does not match any current staff member")]
    StaleStaffReference(String),

    #[error("Slot day {day}, period {period}, slot {slot} is outside the timetable")]
    CoordinateOutOfRange {
        day: usize,
        period: usize,
        slot: usize,
    },
}

/// Edits may address anything already in the grid, and grow it up to the
/// `MAX_EDIT_*` limits.
fn check_coordinates(grid: &TimetableGrid, edit: &SlotEdit) -> Result<(), EditError> {
    let slots_here = grid.period(edit.day, edit.period).map_or(0, Vec::len);
    let in_range = edit.day < grid.day_count().max(MAX_EDIT_DAYS)
        && edit.period < grid.period_count(edit.day).max(MAX_EDIT_PERIODS)
        && edit.slot < slots_here.max(MAX_EDIT_SLOTS);
    if in_range {
        Ok(())
    } else {
        Err(EditError::CoordinateOutOfRange {
            day: edit.day,
            period: edit.period,
            slot: edit.slot,
        })
    }
}

/// Apply `edit` and return the updated set.
///
/// Only the edited class grid is copied; every other grid stays shared with
/// `timetables`. On error nothing is changed.
pub fn apply_edit(
    timetables: &TimetableSet,
    registry: &StaffRegistry,
    edit: &SlotEdit,
) -> Result<TimetableSet, EditError> {
    if edit.class_name.trim().is_empty() {
        return Err(EditError::NoClassSelected);
    }
    let current = timetables
        .get(&edit.class_name)
        .ok_or_else(|| EditError::UnknownClass(edit.class_name.clone()))?;
    check_coordinates(current, edit)?;

    let value = match &edit.staff {
        None => None,
        Some(reference) => {
            let member = resolve(reference, registry)
                .ok_or_else(|| EditError::StaleStaffReference(reference.clone()))?;
            let index = registry
                .position_of(&member.id)
                .ok_or_else(|| EditError::StaleStaffReference(reference.clone()))?;
            Some(TimetableActivity::for_index(index))
        }
    };

    let mut updated = timetables.clone();
    let grid = updated
        .grid_mut(&edit.class_name)
        .ok_or_else(|| EditError::UnknownClass(edit.class_name.clone()))?;
    grid.set_slot(edit.day, edit.period, edit.slot, value);
    Ok(updated)
}
