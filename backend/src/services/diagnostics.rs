//! Advisory checks over stored timetables.
//!
//! Reconciliation keeps whatever the generator produced. This module reports
//! what looks wrong about it (shape drift, staff that no longer resolve,
//! qualification violations, clashes and break counts) without touching the
//! data.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::engine::{resolve, roster_fingerprint};
use crate::models::{GenerationParams, StaffRegistry, TimetableSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    DimensionDrift,
    UnresolvedStaff,
    UnqualifiedStaff,
    DoubleBooking,
    BreakCountMismatch,
    RosterDrift,
}

/// A single finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticIssue {
    pub severity: Severity,
    pub kind: IssueKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<usize>,
    pub message: String,
}

/// Summary counts.
///
/// * `classes` - Timetables inspected
/// * `empty_classes` - Timetables without a single assignment (fallback grids)
/// * `assignments` - Occupied slots across all classes
/// * `unresolved_staff` - Slots whose staff reference does not resolve
/// * `unqualified_assignments` - Slots assigning staff outside their classes
/// * `double_bookings` - Day/period/staff combinations used by several classes
/// * `dimension_mismatches` - Classes whose shape differs from the parameters
/// * `break_mismatches` - Class days with an unexpected number of empty periods
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticStats {
    pub classes: usize,
    pub empty_classes: usize,
    pub assignments: usize,
    pub unresolved_staff: usize,
    pub unqualified_assignments: usize,
    pub double_bookings: usize,
    pub dimension_mismatches: usize,
    pub break_mismatches: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticsReport {
    pub is_clean: bool,
    pub issues: Vec<DiagnosticIssue>,
    pub stats: DiagnosticStats,
}

impl DiagnosticsReport {
    pub fn new() -> Self {
        Self {
            is_clean: true,
            ..Default::default()
        }
    }

    fn add(&mut self, issue: DiagnosticIssue) {
        self.is_clean = false;
        self.issues.push(issue);
    }

    pub fn errors(&self) -> impl Iterator<Item = &DiagnosticIssue> {
        self.issues.iter().filter(|i| i.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &DiagnosticIssue> {
        self.issues.iter().filter(|i| i.severity == Severity::Warning)
    }

    pub fn count_of(&self, kind: IssueKind) -> usize {
        self.issues.iter().filter(|i| i.kind == kind).count()
    }
}

fn issue(severity: Severity, kind: IssueKind, message: String) -> DiagnosticIssue {
    DiagnosticIssue {
        severity,
        kind,
        class_name: None,
        day: None,
        period: None,
        message,
    }
}

fn at(
    mut issue: DiagnosticIssue,
    class_name: &str,
    day: Option<usize>,
    period: Option<usize>,
) -> DiagnosticIssue {
    issue.class_name = Some(class_name.to_string());
    issue.day = day;
    issue.period = period;
    issue
}

/// Inspect `timetables` against the current roster and parameters.
///
/// `generated_with` is the roster fingerprint recorded when the timetables
/// were generated, if known.
pub fn diagnose(
    timetables: &TimetableSet,
    registry: &StaffRegistry,
    params: &GenerationParams,
    generated_with: Option<&str>,
) -> DiagnosticsReport {
    let mut report = DiagnosticsReport::new();

    if let Some(expected) = generated_with {
        if expected != roster_fingerprint(registry) {
            report.add(issue(
                Severity::Warning,
                IssueKind::RosterDrift,
                "Staff roster changed since these timetables were generated; \
                 positional staff references may point at different people"
                    .to_string(),
            ));
        }
    }

    // (day, period, staff index) -> classes
    let mut bookings: BTreeMap<(usize, usize, usize), BTreeSet<&str>> = BTreeMap::new();

    for (class_name, grid) in timetables.iter() {
        report.stats.classes += 1;

        if !grid.has_dimensions(params.days_per_week, params.periods_per_day) {
            report.stats.dimension_mismatches += 1;
            let periods: BTreeSet<usize> = grid.days().iter().map(Vec::len).collect();
            report.add(at(
                issue(
                    Severity::Warning,
                    IssueKind::DimensionDrift,
                    format!(
                        "'{}' has {} day(s) with {:?} period(s), expected {} × {}",
                        class_name,
                        grid.day_count(),
                        periods,
                        params.days_per_week,
                        params.periods_per_day
                    ),
                ),
                class_name,
                None,
                None,
            ));
        }

        let mut assigned_here = 0;
        for ((day, period, _), activity) in grid.assignments() {
            assigned_here += 1;
            match resolve(&activity.staff_id, registry) {
                None => {
                    report.stats.unresolved_staff += 1;
                    report.add(at(
                        issue(
                            Severity::Error,
                            IssueKind::UnresolvedStaff,
                            format!(
                                "Staff ID: {} does not match any staff member",
                                activity.staff_id
                            ),
                        ),
                        class_name,
                        Some(day),
                        Some(period),
                    ));
                }
                Some(member) => {
                    if !member.is_qualified_for(class_name) {
                        report.stats.unqualified_assignments += 1;
                        report.add(at(
                            issue(
                                Severity::Warning,
                                IssueKind::UnqualifiedStaff,
                                format!("{} is not assigned to teach {}", member.name, class_name),
                            ),
                            class_name,
                            Some(day),
                            Some(period),
                        ));
                    }
                    if let Some(index) = registry.position_of(&member.id) {
                        bookings
                            .entry((day, period, index))
                            .or_default()
                            .insert(class_name);
                    }
                }
            }
        }
        report.stats.assignments += assigned_here;

        if assigned_here == 0 {
            report.stats.empty_classes += 1;
            continue;
        }

        for (day, periods) in grid.days().iter().enumerate() {
            let empty = periods
                .iter()
                .filter(|slots| slots.iter().all(Option::is_none))
                .count();
            if empty != params.breaks_per_day {
                report.stats.break_mismatches += 1;
                report.add(at(
                    issue(
                        Severity::Warning,
                        IssueKind::BreakCountMismatch,
                        format!(
                            "'{}' day {} has {} empty period(s), expected {} break(s)",
                            class_name, day, empty, params.breaks_per_day
                        ),
                    ),
                    class_name,
                    Some(day),
                    None,
                ));
            }
        }
    }

    for ((day, period, index), classes) in bookings {
        if classes.len() < 2 {
            continue;
        }
        report.stats.double_bookings += 1;
        let name = registry
            .at(index)
            .map(|m| m.name.as_str())
            .unwrap_or("unknown");
        let listed: Vec<&str> = classes.into_iter().collect();
        let mut found = issue(
            Severity::Error,
            IssueKind::DoubleBooking,
            format!(
                "{} is scheduled in {} at the same time",
                name,
                listed.join(", ")
            ),
        );
        found.day = Some(day);
        found.period = Some(period);
        report.add(found);
    }

    report
}
