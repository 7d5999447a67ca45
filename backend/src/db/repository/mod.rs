//! Repository trait for timetable persistence.
//!
//! Storage is a plain key-value store: the staff roster and the timetable set
//! are each written as a single JSON value under a fixed key and replaced
//! wholesale on every save.

use async_trait::async_trait;
use log::warn;
use serde_json::Value;

pub mod error;

pub use error::{ErrorContext, RepositoryError, RepositoryResult};

use crate::engine::RawGrid;
use crate::models::{StaffRegistry, TimetableSet};

/// Key holding the ordered staff roster.
pub const STAFF_ROSTER_KEY: &str = "staff_roster";
/// Key holding the class → grid mapping.
pub const TIMETABLES_KEY: &str = "timetables";

/// Repository trait for timetable state.
///
/// Implementations only need the raw key-value operations; typed accessors
/// are provided on top of them.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to work with async Rust.
#[async_trait]
pub trait TimetableRepository: Send + Sync {
    /// Check that the backing store is usable.
    async fn health_check(&self) -> RepositoryResult<bool>;

    /// Read the value stored under `key`, if any.
    async fn get_value(&self, key: &str) -> RepositoryResult<Option<Value>>;

    /// Overwrite the value stored under `key`.
    async fn put_value(&self, key: &str, value: Value) -> RepositoryResult<()>;

    /// Load the staff roster. Missing or partially invalid data is read leniently.
    async fn load_staff(&self) -> RepositoryResult<StaffRegistry> {
        let value = self
            .get_value(STAFF_ROSTER_KEY)
            .await
            .map_err(|e| e.with_operation("load_staff"))?;
        Ok(value
            .map(|v| StaffRegistry::from_persisted(&v))
            .unwrap_or_default())
    }

    /// Persist the full staff roster.
    async fn save_staff(&self, registry: &StaffRegistry) -> RepositoryResult<()> {
        let value = serde_json::to_value(registry).map_err(|e| {
            RepositoryError::serialization_with_context(
                e.to_string(),
                ErrorContext::new("save_staff").with_entity(STAFF_ROSTER_KEY),
            )
        })?;
        self.put_value(STAFF_ROSTER_KEY, value)
            .await
            .map_err(|e| e.with_operation("save_staff"))
    }

    /// Load the timetable set, class by class.
    ///
    /// Each class grid goes through the same shape check as generator output:
    /// unusable slots are blanked and a class whose grid is malformed is
    /// dropped with a warning. The remaining classes are kept.
    async fn load_timetables(&self) -> RepositoryResult<TimetableSet> {
        let value = self
            .get_value(TIMETABLES_KEY)
            .await
            .map_err(|e| e.with_operation("load_timetables"))?;
        Ok(value
            .map(|v| timetables_from_persisted(&v))
            .unwrap_or_default())
    }

    /// Persist the full timetable set.
    async fn save_timetables(&self, timetables: &TimetableSet) -> RepositoryResult<()> {
        let value = serde_json::to_value(timetables).map_err(|e| {
            RepositoryError::serialization_with_context(
                e.to_string(),
                ErrorContext::new("save_timetables").with_entity(TIMETABLES_KEY),
            )
        })?;
        self.put_value(TIMETABLES_KEY, value)
            .await
            .map_err(|e| e.with_operation("save_timetables"))
    }
}

fn timetables_from_persisted(value: &Value) -> TimetableSet {
    let mut set = TimetableSet::new();
    let Some(classes) = value.as_object() else {
        warn!("Stored timetables are not a class mapping; starting with no timetables");
        return set;
    };
    for (class_name, grid) in classes {
        match RawGrid::from_value(grid) {
            RawGrid::Valid {
                grid,
                repaired_slots,
            } => {
                if repaired_slots > 0 {
                    warn!(
                        "Stored timetable for '{}' had {} unusable slot(s); blanked",
                        class_name, repaired_slots
                    );
                }
                set.insert(class_name.clone(), grid);
            }
            RawGrid::Malformed(reason) => {
                warn!("Dropping stored timetable for '{}': {}", class_name, reason);
            }
        }
    }
    set
}
