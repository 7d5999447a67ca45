//! Data Transfer Objects for the HTTP API.
//!
//! Domain types that already serialize in the wire shape (staff members,
//! reports, diagnostics) are returned as-is; the types here cover request
//! bodies, list envelopes and the labelled timetable view.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::engine::{staff_label, SlotEdit};
use crate::models::{StaffMember, StaffRegistry, TimetableGrid, TimetableSet};

pub use crate::models::StaffDraft;
pub use crate::services::{DiagnosticsReport, GenerationReport, GenerationRun};

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Status of the service
    pub status: String,
    /// Version of the API
    pub version: String,
    /// Storage status
    pub database: String,
    /// Name of the configured generator
    pub generator: String,
}

/// Staff list response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaffListResponse {
    pub staff: Vec<StaffMember>,
    pub total: usize,
}

impl From<StaffRegistry> for StaffListResponse {
    fn from(registry: StaffRegistry) -> Self {
        let staff = registry.members().to_vec();
        let total = staff.len();
        Self { staff, total }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassListResponse {
    pub classes: Vec<String>,
}

/// Request body for `POST /v1/timetables/generate`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    /// Classes to generate; all classes with staff when omitted.
    #[serde(default)]
    pub class_names: Option<Vec<String>>,
}

/// Request body for `PUT /v1/timetables/{class}/slots`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotEditRequest {
    pub day: usize,
    pub period: usize,
    #[serde(default)]
    pub slot: usize,
    /// Stable staff id or positional index; `null` clears the slot.
    #[serde(default)]
    pub staff: Option<String>,
}

impl SlotEditRequest {
    pub fn into_edit(self, class_name: String) -> SlotEdit {
        SlotEdit {
            class_name,
            day: self.day,
            period: self.period,
            slot: self.slot,
            staff: self.staff,
        }
    }
}

/// One occupied slot with a display label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotView {
    pub staff_id: String,
    pub label: String,
}

/// A class timetable as shown to users: `[day][period][slot]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimetableView {
    pub class_name: String,
    pub days: Vec<Vec<Vec<Option<SlotView>>>>,
}

impl TimetableView {
    pub fn build(class_name: &str, grid: &TimetableGrid, registry: &StaffRegistry) -> Self {
        let days = grid
            .days()
            .iter()
            .map(|day| {
                day.iter()
                    .map(|period| {
                        period
                            .iter()
                            .map(|slot| {
                                slot.as_ref().map(|activity| SlotView {
                                    staff_id: activity.staff_id.clone(),
                                    label: staff_label(activity, registry),
                                })
                            })
                            .collect()
                    })
                    .collect()
            })
            .collect();
        Self {
            class_name: class_name.to_string(),
            days,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimetableListResponse {
    pub timetables: BTreeMap<String, TimetableView>,
}

impl TimetableListResponse {
    pub fn build(set: &TimetableSet, registry: &StaffRegistry) -> Self {
        let timetables = set
            .iter()
            .map(|(name, grid)| (name.to_string(), TimetableView::build(name, grid, registry)))
            .collect();
        Self { timetables }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunListResponse {
    pub runs: Vec<GenerationRun>,
}
