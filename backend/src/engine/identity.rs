//! Staff identity translation.
//!
//! The generator only knows staff by their position in the roster it was sent,
//! while the application keys staff by a stable [`StaffId`]. Positional indices
//! stored in a timetable are weak references: they are resolved lazily against
//! the current registry and may fail to resolve after the roster changes.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::define_index_type;
use crate::models::{parse_positional_index, StaffId, StaffMember, StaffRegistry, TimetableActivity};

define_index_type!(usize, PositionalIndex);

/// Request-scoped table from positional index to stable id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterIndex {
    ids: Vec<StaffId>,
}

impl RosterIndex {
    /// Snapshot the registry in its current order.
    pub fn from_registry(registry: &StaffRegistry) -> Self {
        Self {
            ids: registry.iter().map(|m| m.id.clone()).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn id_at(&self, index: PositionalIndex) -> Option<&StaffId> {
        self.ids.get(index.value())
    }

    pub fn index_of(&self, id: &StaffId) -> Option<PositionalIndex> {
        self.ids
            .iter()
            .position(|candidate| candidate == id)
            .map(PositionalIndex::new)
    }

    /// SHA-256 over the ordered ids, hex encoded.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        for id in &self.ids {
            hasher.update(id.as_str().as_bytes());
            hasher.update([0u8]);
        }
        hex::encode(hasher.finalize())
    }
}

/// Fingerprint of the registry's current order, comparable with [`RosterIndex::fingerprint`].
pub fn roster_fingerprint(registry: &StaffRegistry) -> String {
    RosterIndex::from_registry(registry).fingerprint()
}

/// Resolve a staff reference that may be a stable id or a positional index.
///
/// A stable-id match wins; otherwise the reference is read as a decimal index
/// into the current registry order.
pub fn resolve<'a>(reference: &str, registry: &'a StaffRegistry) -> Option<&'a StaffMember> {
    if reference.is_empty() {
        return None;
    }
    registry
        .get(&StaffId::from(reference))
        .or_else(|| parse_positional_index(reference).and_then(|i| registry.at(i)))
}

/// Display name for an activity, falling back to the raw identifier.
pub fn staff_label(activity: &TimetableActivity, registry: &StaffRegistry) -> String {
    match resolve(&activity.staff_id, registry) {
        Some(member) => member.name.clone(),
        None => format!("Staff ID: {}", activity.staff_id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StaffDraft;

    fn registry() -> StaffRegistry {
        let mut registry = StaffRegistry::new();
        registry
            .register(&StaffDraft::new("Asha", "Maths", ["Class 1"]))
            .unwrap();
        registry
            .register(&StaffDraft::new("Ravi", "Science", ["Class 2"]))
            .unwrap();
        registry
    }

    #[test]
    fn test_resolve_prefers_stable_id() {
        let registry = registry();
        let ravi = registry.at(1).unwrap().clone();

        assert_eq!(resolve(ravi.id.as_str(), &registry), Some(&ravi));
        assert_eq!(resolve("1", &registry), Some(&ravi));
        assert_eq!(resolve("2", &registry), None);
        assert_eq!(resolve("", &registry), None);
    }

    #[test]
    fn test_staff_label_degrades_to_raw_id() {
        let registry = registry();
        assert_eq!(staff_label(&TimetableActivity::new("0"), &registry), "Asha");
        assert_eq!(
            staff_label(&TimetableActivity::new("99"), &registry),
            "Staff ID: 99"
        );
    }

    #[test]
    fn test_fingerprint_tracks_order() {
        let mut registry = registry();
        let before = roster_fingerprint(&registry);
        assert_eq!(before, RosterIndex::from_registry(&registry).fingerprint());

        let first = registry.at(0).unwrap().id.clone();
        registry.remove(&first).unwrap();
        assert_ne!(before, roster_fingerprint(&registry));
    }

    #[test]
    fn test_roster_index_round_trip() {
        let registry = registry();
        let index = RosterIndex::from_registry(&registry);
        let ravi = &registry.at(1).unwrap().id;

        assert_eq!(index.index_of(ravi), Some(PositionalIndex::new(1)));
        assert_eq!(index.id_at(PositionalIndex::new(1)), Some(ravi));
        assert_eq!(index.id_at(PositionalIndex::new(5)), None);
    }
}
