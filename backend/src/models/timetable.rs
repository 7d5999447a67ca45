//! Timetable grid types.
//!
//! A grid is addressed `[day][period][slot]`. Each slot is either empty
//! (`null`: a break or an unassigned period) or an activity naming the staff
//! member by the positional index used during generation.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// One assignment inside a period.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimetableActivity {
    /// Positional index of the staff member, as a decimal string.
    pub staff_id: String,
}

impl TimetableActivity {
    pub fn new(staff_id: impl Into<String>) -> Self {
        Self {
            staff_id: staff_id.into(),
        }
    }

    pub fn for_index(index: usize) -> Self {
        Self::new(index.to_string())
    }

    /// The numeric positional index, if the stored id is one.
    pub fn positional_index(&self) -> Option<usize> {
        parse_positional_index(&self.staff_id)
    }
}

/// Parse a non-negative decimal index, rejecting signs and whitespace.
pub fn parse_positional_index(raw: &str) -> Option<usize> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}

pub type Slot = Option<TimetableActivity>;
pub type Period = Vec<Slot>;
pub type Day = Vec<Period>;

/// The timetable of a single class.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimetableGrid(pub Vec<Day>);

impl TimetableGrid {
    /// An all-empty grid with a single slot per period.
    pub fn fallback(days_per_week: usize, periods_per_day: usize) -> Self {
        TimetableGrid(vec![vec![vec![None]; periods_per_day]; days_per_week])
    }

    pub fn days(&self) -> &[Day] {
        &self.0
    }

    pub fn day_count(&self) -> usize {
        self.0.len()
    }

    pub fn period_count(&self, day: usize) -> usize {
        self.0.get(day).map_or(0, Vec::len)
    }

    pub fn period(&self, day: usize, period: usize) -> Option<&Period> {
        self.0.get(day).and_then(|d| d.get(period))
    }

    /// The activity at a coordinate; `None` for empty or out-of-range slots.
    pub fn activity(&self, day: usize, period: usize, slot: usize) -> Option<&TimetableActivity> {
        self.period(day, period)
            .and_then(|p| p.get(slot))
            .and_then(Option::as_ref)
    }

    /// Set one slot, growing days, periods and slots as needed.
    ///
    /// Missing days and periods are created empty; missing slots are `None`.
    pub fn set_slot(&mut self, day: usize, period: usize, slot: usize, value: Slot) {
        if self.0.len() <= day {
            self.0.resize_with(day + 1, Vec::new);
        }
        let periods = &mut self.0[day];
        if periods.len() <= period {
            periods.resize_with(period + 1, Vec::new);
        }
        let slots = &mut periods[period];
        if slots.len() <= slot {
            slots.resize(slot + 1, None);
        }
        slots[slot] = value;
    }

    /// Iterate over every assigned activity with its coordinate.
    pub fn assignments(&self) -> impl Iterator<Item = ((usize, usize, usize), &TimetableActivity)> {
        self.0.iter().enumerate().flat_map(|(d, day)| {
            day.iter().enumerate().flat_map(move |(p, period)| {
                period
                    .iter()
                    .enumerate()
                    .filter_map(move |(s, slot)| slot.as_ref().map(|a| ((d, p, s), a)))
            })
        })
    }

    /// True if every period of every day has the given shape.
    pub fn has_dimensions(&self, days_per_week: usize, periods_per_day: usize) -> bool {
        self.0.len() == days_per_week && self.0.iter().all(|d| d.len() == periods_per_day)
    }
}

/// Timetables of every class, keyed by class name.
///
/// Grids are shared behind `Arc` so that an edit only clones the grid it touches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimetableSet {
    grids: BTreeMap<String, Arc<TimetableGrid>>,
}

impl TimetableSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, class_name: impl Into<String>, grid: TimetableGrid) {
        self.grids.insert(class_name.into(), Arc::new(grid));
    }

    pub fn get(&self, class_name: &str) -> Option<&TimetableGrid> {
        self.grids.get(class_name).map(Arc::as_ref)
    }

    pub fn contains(&self, class_name: &str) -> bool {
        self.grids.contains_key(class_name)
    }

    pub fn class_names(&self) -> impl Iterator<Item = &str> {
        self.grids.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TimetableGrid)> {
        self.grids.iter().map(|(k, v)| (k.as_str(), v.as_ref()))
    }

    pub fn len(&self) -> usize {
        self.grids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grids.is_empty()
    }

    /// Move every grid of `other` into this set, replacing same-named classes.
    pub fn merge(&mut self, other: TimetableSet) {
        self.grids.extend(other.grids);
    }

    /// Mutable access to one grid, cloning it first if it is shared.
    pub(crate) fn grid_mut(&mut self, class_name: &str) -> Option<&mut TimetableGrid> {
        self.grids.get_mut(class_name).map(Arc::make_mut)
    }

    /// Whether two sets share the same allocation for a class grid.
    pub fn shares_grid_with(&self, other: &TimetableSet, class_name: &str) -> bool {
        match (self.grids.get(class_name), other.grids.get(class_name)) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_dimensions() {
        let grid = TimetableGrid::fallback(5, 8);
        assert!(grid.has_dimensions(5, 8));
        assert!(grid.days().iter().flatten().all(|p| p == &vec![None]));
    }

    #[test]
    fn test_set_slot_grows_grid() {
        let mut grid = TimetableGrid::fallback(1, 1);
        grid.set_slot(2, 3, 1, Some(TimetableActivity::for_index(4)));

        assert_eq!(grid.day_count(), 3);
        assert_eq!(grid.period_count(1), 0);
        assert_eq!(grid.period_count(2), 4);
        assert_eq!(grid.period(2, 0), Some(&vec![]));
        assert_eq!(grid.period(2, 3), Some(&vec![None, Some(TimetableActivity::new("4"))]));
    }

    #[test]
    fn test_parse_positional_index() {
        assert_eq!(parse_positional_index("0"), Some(0));
        assert_eq!(parse_positional_index("12"), Some(12));
        assert_eq!(parse_positional_index("-1"), None);
        assert_eq!(parse_positional_index(" 1"), None);
        assert_eq!(parse_positional_index("abc"), None);
        assert_eq!(parse_positional_index(""), None);
    }

    #[test]
    fn test_set_serializes_as_plain_mapping() {
        let mut set = TimetableSet::new();
        let mut grid = TimetableGrid::fallback(1, 2);
        grid.set_slot(0, 1, 0, Some(TimetableActivity::for_index(0)));
        set.insert("Class 1", grid);

        let json = serde_json::to_value(&set).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"Class 1": [[[null], [{"staffId": "0"}]]]})
        );
        let back: TimetableSet = serde_json::from_value(json).unwrap();
        assert_eq!(back, set);
    }
}
