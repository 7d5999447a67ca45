//! Reconciliation of generator output into a complete timetable set.
//!
//! The reconciler never fails: every requested class ends up with a grid,
//! either the one the generator produced (after shape checks and slot repair)
//! or an all-empty fallback sized from the request.

use std::collections::{BTreeSet, HashMap};

use log::{debug, warn};
use serde::Serialize;

use super::raw::{RawClassEntry, RawGrid, RawResponse};
use super::request::GenerationRequest;
use crate::models::{TimetableGrid, TimetableSet};

/// Result of a reconciliation run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reconciliation {
    pub timetables: TimetableSet,
    /// Requested classes that received a fallback grid, in request order.
    pub fallback_classes: Vec<String>,
    /// Classes the generator returned without being asked for.
    pub ignored_classes: Vec<String>,
    /// Slots blanked across all adopted grids.
    pub repaired_slots: usize,
    pub warnings: Vec<String>,
}

impl Reconciliation {
    /// True when no requested class got a generated grid.
    pub fn is_total_fallback(&self) -> bool {
        self.fallback_classes.len() == self.timetables.len()
    }

    pub fn is_partial(&self) -> bool {
        !self.fallback_classes.is_empty() && !self.is_total_fallback()
    }

    pub fn adopted_count(&self) -> usize {
        self.timetables.len() - self.fallback_classes.len()
    }

    fn warn(&mut self, message: String) {
        warn!("{}", message);
        self.warnings.push(message);
    }
}

/// Fallback grid for a request: `days_per_week × periods_per_day × [null]`.
pub fn fallback_grid(request: &GenerationRequest) -> TimetableGrid {
    TimetableGrid::fallback(request.days_per_week, request.periods_per_day)
}

/// Turn a raw response into a timetable for every requested class.
pub fn reconcile(request: &GenerationRequest, raw: RawResponse) -> Reconciliation {
    let mut out = Reconciliation::default();

    let (entries, unattributed) = match raw {
        RawResponse::Absent => {
            out.warn("generator returned no timetable, using empty grids".to_string());
            (Vec::new(), Vec::new())
        }
        RawResponse::Malformed(reason) => {
            out.warn(format!(
                "generator output is not a class timetable mapping ({}), using empty grids",
                reason
            ));
            (Vec::new(), Vec::new())
        }
        RawResponse::PerClass {
            entries,
            unattributed,
        } => (entries, unattributed),
    };

    for reason in unattributed {
        out.warn(format!("discarded generator entry: {}", reason));
    }

    let requested: BTreeSet<&str> = request.class_names.iter().map(String::as_str).collect();
    let mut adopted: HashMap<String, (TimetableGrid, usize)> = HashMap::new();
    let mut ignored = BTreeSet::new();

    for RawClassEntry { class_name, grid } in entries {
        if !requested.contains(class_name.as_str()) {
            ignored.insert(class_name);
            continue;
        }
        match grid {
            RawGrid::Malformed(reason) => {
                out.warn(format!(
                    "discarded malformed timetable for '{}': {}",
                    class_name, reason
                ));
            }
            RawGrid::Valid {
                grid,
                repaired_slots,
            } => {
                if adopted.contains_key(&class_name) {
                    out.warn(format!(
                        "duplicate timetable for '{}' ignored, keeping the first",
                        class_name
                    ));
                } else {
                    adopted.insert(class_name, (grid, repaired_slots));
                }
            }
        }
    }

    for class_name in &request.class_names {
        match adopted.remove(class_name) {
            Some((grid, repaired)) => {
                if repaired > 0 {
                    out.warn(format!(
                        "blanked {} unusable slot(s) in '{}'",
                        repaired, class_name
                    ));
                }
                out.repaired_slots += repaired;
                out.timetables.insert(class_name.clone(), grid);
            }
            None => {
                debug!("using fallback grid for '{}'", class_name);
                out.fallback_classes.push(class_name.clone());
                out.timetables.insert(class_name.clone(), fallback_grid(request));
            }
        }
    }

    if !ignored.is_empty() {
        warn!(
            "ignored {} class(es) that were not requested: {:?}",
            ignored.len(),
            ignored
        );
    }
    out.ignored_classes = ignored.into_iter().collect();
    out
}

#[cfg(test)]
#[path = "reconciler_tests.rs"]
mod tests;
