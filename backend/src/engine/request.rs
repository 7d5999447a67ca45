//! Generation request construction.

use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

use super::identity::RosterIndex;
use crate::models::{GenerationParams, StaffRegistry};

/// One roster line sent to the generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterEntry {
    /// Position in the registry at request time, as a decimal string.
    pub positional_index: String,
    pub qualified_classes: BTreeSet<String>,
}

/// Normalized input for the external generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    pub staff_roster: Vec<RosterEntry>,
    pub class_names: Vec<String>,
    pub periods_per_day: usize,
    pub days_per_week: usize,
    pub breaks_per_day: usize,
}

impl GenerationRequest {
    pub fn params(&self) -> GenerationParams {
        GenerationParams {
            periods_per_day: self.periods_per_day,
            days_per_week: self.days_per_week,
            breaks_per_day: self.breaks_per_day,
        }
    }

    /// Stable key for the class group this request covers.
    pub fn class_group_key(&self) -> String {
        class_group_key(&self.class_names)
    }
}

/// Order-insensitive key for a set of class names.
pub fn class_group_key(class_names: &[String]) -> String {
    let sorted: BTreeSet<&str> = class_names.iter().map(String::as_str).collect();
    sorted.into_iter().collect::<Vec<_>>().join("\u{1f}")
}

/// Errors raised before any external call is made.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RequestError {
    #[error("No staff registered: add staff before generating timetables")]
    EmptyRoster,

    #[error("No classes to schedule: assign staff to classes first")]
    NoClasses,

    #[error("Invalid generation parameters: {0}")]
    InvalidParameters(String),
}

/// Builds [`GenerationRequest`]s from the live registry.
pub struct ScheduleRequestBuilder;

impl ScheduleRequestBuilder {
    /// Build a request for `class_names`, or for every class with staff when `None`.
    ///
    /// Returns the request and the positional-index table the caller must keep
    /// to translate generator output back to stable ids.
    pub fn build(
        registry: &StaffRegistry,
        class_names: Option<&[String]>,
        params: GenerationParams,
    ) -> Result<(GenerationRequest, RosterIndex), RequestError> {
        if registry.is_empty() {
            return Err(RequestError::EmptyRoster);
        }
        if params.periods_per_day == 0 {
            return Err(RequestError::InvalidParameters(
                "periods_per_day must be positive".to_string(),
            ));
        }
        if params.days_per_week == 0 {
            return Err(RequestError::InvalidParameters(
                "days_per_week must be positive".to_string(),
            ));
        }

        let class_names = match class_names {
            Some(names) => dedup_class_names(names),
            None => registry.class_names(),
        };
        if class_names.is_empty() {
            return Err(RequestError::NoClasses);
        }

        let staff_roster = registry
            .iter()
            .enumerate()
            .map(|(index, member)| RosterEntry {
                positional_index: index.to_string(),
                qualified_classes: member.qualified_classes.clone(),
            })
            .collect();

        let request = GenerationRequest {
            staff_roster,
            class_names,
            periods_per_day: params.periods_per_day,
            days_per_week: params.days_per_week,
            breaks_per_day: params.breaks_per_day,
        };

        Ok((request, RosterIndex::from_registry(registry)))
    }
}

fn dedup_class_names(names: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    names
        .iter()
        .map(|n| n.trim())
        .filter(|n| !n.is_empty())
        .filter(|n| seen.insert(n.to_string()))
        .map(str::to_string)
        .collect()
}
