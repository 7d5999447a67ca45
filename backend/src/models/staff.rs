//! Staff members and the ordered staff registry.
//!
//! The registry order matters: generation requests address staff by their
//! position in it (see [`crate::engine::identity`]), while everything else in
//! the application uses the stable [`StaffId`].

use std::cmp::Ordering;
use std::collections::{BTreeSet, HashSet};

use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::define_string_id;

define_string_id!(StaffId);

impl StaffId {
    /// Fresh random identifier for a newly registered member.
    pub fn generate() -> Self {
        StaffId(uuid::Uuid::new_v4().to_string())
    }
}

const MIN_TEXT_LEN: usize = 2;
const UNKNOWN_NAME: &str = "Unknown";

/// A registered staff member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffMember {
    pub id: StaffId,
    pub name: String,
    pub subject: String,
    #[serde(alias = "assignedClass")]
    pub qualified_classes: BTreeSet<String>,
}

impl StaffMember {
    pub fn is_qualified_for(&self, class_name: &str) -> bool {
        self.qualified_classes.contains(class_name)
    }
}

/// Form input for registering or editing a staff member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffDraft {
    pub name: String,
    pub subject: String,
    #[serde(alias = "assignedClass")]
    pub qualified_classes: Vec<String>,
}

impl StaffDraft {
    pub fn new(
        name: impl Into<String>,
        subject: impl Into<String>,
        classes: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            name: name.into(),
            subject: subject.into(),
            qualified_classes: classes.into_iter().map(Into::into).collect(),
        }
    }

    /// Trim and check the draft, returning `(name, subject, classes)`.
    fn normalize(&self) -> Result<(String, String, BTreeSet<String>), StaffError> {
        let name = self.name.trim();
        if name.chars().count() < MIN_TEXT_LEN {
            return Err(StaffError::invalid("name must be at least 2 characters"));
        }
        let subject = self.subject.trim();
        if subject.chars().count() < MIN_TEXT_LEN {
            return Err(StaffError::invalid("subject must be at least 2 characters"));
        }
        let classes: BTreeSet<String> = self
            .qualified_classes
            .iter()
            .map(|c| c.trim())
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .collect();
        if classes.is_empty() {
            return Err(StaffError::invalid("select at least one class"));
        }
        Ok((name.to_string(), subject.to_string(), classes))
    }
}

/// Errors raised by registry mutations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StaffError {
    #[error("Invalid staff member: {0}")]
    InvalidStaffMember(String),

    #[error("Staff member not found: {0}")]
    StaffNotFound(StaffId),
}

impl StaffError {
    fn invalid(message: &str) -> Self {
        StaffError::InvalidStaffMember(message.to_string())
    }
}

/// Ordered collection of staff members.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StaffRegistry {
    members: Vec<StaffMember>,
}

impl StaffRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from already-validated members, re-keying any duplicate id.
    pub fn from_members(members: Vec<StaffMember>) -> Self {
        let mut seen = HashSet::new();
        let members = members
            .into_iter()
            .map(|mut member| {
                if !seen.insert(member.id.clone()) {
                    let fresh = StaffId::generate();
                    warn!("Duplicate staff id {} re-keyed as {}", member.id, fresh);
                    member.id = fresh;
                    seen.insert(member.id.clone());
                }
                member
            })
            .collect();
        Self { members }
    }

    /// Rebuild a registry from a persisted roster, tolerating older or partial records.
    ///
    /// Missing ids are regenerated, a missing name becomes `"Unknown"`, and a
    /// single class string is accepted where a list is expected. Entries that
    /// are not JSON objects are skipped.
    pub fn from_persisted(value: &Value) -> Self {
        let Some(entries) = value.as_array() else {
            warn!("Persisted staff roster is not an array; starting with an empty registry");
            return Self::new();
        };

        let members = entries
            .iter()
            .enumerate()
            .filter_map(|(idx, entry)| {
                let Some(obj) = entry.as_object() else {
                    warn!("Skipping persisted staff entry {}: not an object", idx);
                    return None;
                };
                let id = obj
                    .get("id")
                    .and_then(Value::as_str)
                    .filter(|s| !s.is_empty())
                    .map(StaffId::from)
                    .unwrap_or_else(StaffId::generate);
                let name = obj
                    .get("name")
                    .and_then(Value::as_str)
                    .filter(|s| !s.is_empty())
                    .unwrap_or(UNKNOWN_NAME)
                    .to_string();
                let subject = obj
                    .get("subject")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string();
                let classes = obj
                    .get("qualifiedClasses")
                    .or_else(|| obj.get("assignedClass"))
                    .map(lenient_class_list)
                    .unwrap_or_default();

                Some(StaffMember {
                    id,
                    name,
                    subject,
                    qualified_classes: classes,
                })
            })
            .collect();

        Self::from_members(members)
    }

    pub fn members(&self) -> &[StaffMember] {
        &self.members
    }

    pub fn iter(&self) -> impl Iterator<Item = &StaffMember> {
        self.members.iter()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn get(&self, id: &StaffId) -> Option<&StaffMember> {
        self.members.iter().find(|m| &m.id == id)
    }

    /// Current position of a member in registry order.
    pub fn position_of(&self, id: &StaffId) -> Option<usize> {
        self.members.iter().position(|m| &m.id == id)
    }

    pub fn at(&self, index: usize) -> Option<&StaffMember> {
        self.members.get(index)
    }

    /// Register a new member at the end of the roster.
    pub fn register(&mut self, draft: &StaffDraft) -> Result<StaffMember, StaffError> {
        let (name, subject, qualified_classes) = draft.normalize()?;
        let member = StaffMember {
            id: StaffId::generate(),
            name,
            subject,
            qualified_classes,
        };
        self.members.push(member.clone());
        Ok(member)
    }

    /// Edit a member in place; its position is unchanged.
    pub fn update(&mut self, id: &StaffId, draft: &StaffDraft) -> Result<StaffMember, StaffError> {
        let (name, subject, qualified_classes) = draft.normalize()?;
        let member = self
            .members
            .iter_mut()
            .find(|m| &m.id == id)
            .ok_or_else(|| StaffError::StaffNotFound(id.clone()))?;
        member.name = name;
        member.subject = subject;
        member.qualified_classes = qualified_classes;
        Ok(member.clone())
    }

    /// Remove a member. Members after it shift down one position.
    pub fn remove(&mut self, id: &StaffId) -> Result<StaffMember, StaffError> {
        let position = self
            .position_of(id)
            .ok_or_else(|| StaffError::StaffNotFound(id.clone()))?;
        Ok(self.members.remove(position))
    }

    /// Every class with at least one qualified member, in school order.
    pub fn class_names(&self) -> Vec<String> {
        let unique: BTreeSet<&str> = self
            .members
            .iter()
            .flat_map(|m| m.qualified_classes.iter().map(String::as_str))
            .filter(|c| !c.is_empty())
            .collect();
        let mut classes: Vec<String> = unique.into_iter().map(str::to_string).collect();
        classes.sort_by(|a, b| compare_class_names(a, b));
        classes
    }
}

fn lenient_class_list(value: &Value) -> BTreeSet<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => BTreeSet::from([s.trim().to_string()]),
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        _ => BTreeSet::new(),
    }
}

/// Leading integer of a `"Class N"` style name.
fn class_number(name: &str) -> Option<u32> {
    let rest = name.strip_prefix("Class ").unwrap_or(name).trim_start();
    let digits: String = rest.chars().take_while(char::is_ascii_digit).collect();
    digits.parse().ok()
}

fn class_rank(name: &str) -> u8 {
    match name {
        "LKG" => 0,
        "UKG" => 1,
        _ if class_number(name).is_none() => 2,
        _ => 3,
    }
}

/// School ordering: LKG, UKG, other named groups, then numbered classes ascending.
pub fn compare_class_names(a: &str, b: &str) -> Ordering {
    class_rank(a)
        .cmp(&class_rank(b))
        .then_with(|| match (class_number(a), class_number(b)) {
            (Some(x), Some(y)) => x.cmp(&y),
            _ => Ordering::Equal,
        })
        .then_with(|| a.cmp(b))
}
