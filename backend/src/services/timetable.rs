//! Timetable service: staff management, generation and editing.
//!
//! The service owns the orchestration between the repository, the request
//! builder, the external generator and the reconciler. Generator failures
//! never surface as errors; they produce fallback grids and an advisory.

use std::sync::Arc;
use std::time::Duration;

use log::{error, info, warn};
use serde::Serialize;
use tokio::sync::Mutex as AsyncMutex;

use super::diagnostics::{diagnose, DiagnosticsReport};
use super::generation_tracker::{GenerationRun, GenerationTracker};
use crate::db::{RepositoryError, TimetableRepository};
use crate::engine::{
    apply_edit, reconcile, EditError, ExternalScheduleGenerator, GenerationError, RawResponse,
    RequestError, ScheduleRequestBuilder, SlotEdit,
};
use crate::models::{
    GenerationParams, StaffDraft, StaffError, StaffId, StaffMember, StaffRegistry, TimetableGrid,
    TimetableSet,
};

/// Default time allowed for one generator call.
pub const DEFAULT_GENERATION_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Request(#[from] RequestError),

    #[error(transparent)]
    Staff(#[from] StaffError),

    #[error(transparent)]
    Edit(#[from] EditError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("A timetable generation for {0} is already in progress")]
    GenerationInProgress(String),

    #[error("No timetable for class: {0}")]
    ClassNotFound(String),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// User-facing outcome of a generation beyond the data itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationAdvisory {
    /// Every class received a generated timetable.
    None,
    /// Some classes fell back to empty grids.
    Partial,
    /// The generator reported overload; everything fell back.
    Overloaded,
    /// The generator failed or returned nothing usable; everything fell back.
    Failed,
}

impl GenerationAdvisory {
    pub fn message(&self) -> Option<&'static str> {
        match self {
            GenerationAdvisory::None => None,
            GenerationAdvisory::Partial => {
                Some("Some classes could not be generated and were left empty.")
            }
            GenerationAdvisory::Overloaded => Some(
                "The timetable generator is currently overloaded. Empty timetables were created; please try again later.",
            ),
            GenerationAdvisory::Failed => Some(
                "Timetable generation failed. Empty timetables were created; you can fill them in manually or try again.",
            ),
        }
    }
}

/// Result of [`TimetableService::generate`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationReport {
    pub run_id: String,
    /// Timetables of the requested classes.
    pub timetables: TimetableSet,
    pub fallback_classes: Vec<String>,
    pub ignored_classes: Vec<String>,
    pub repaired_slots: usize,
    pub warnings: Vec<String>,
    pub advisory: GenerationAdvisory,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advisory_message: Option<String>,
    /// Fingerprint of the roster the positional indices refer to.
    pub roster_fingerprint: String,
}

pub struct TimetableService {
    repository: Arc<dyn TimetableRepository>,
    generator: Arc<dyn ExternalScheduleGenerator>,
    params: GenerationParams,
    timeout: Duration,
    tracker: GenerationTracker,
    // Serializes read-modify-write cycles on the store.
    store_lock: AsyncMutex<()>,
    generated_with: parking_lot::Mutex<Option<String>>,
}

impl TimetableService {
    pub fn new(
        repository: Arc<dyn TimetableRepository>,
        generator: Arc<dyn ExternalScheduleGenerator>,
    ) -> Self {
        Self {
            repository,
            generator,
            params: GenerationParams::default(),
            timeout: DEFAULT_GENERATION_TIMEOUT,
            tracker: GenerationTracker::new(),
            store_lock: AsyncMutex::new(()),
            generated_with: parking_lot::Mutex::new(None),
        }
    }

    pub fn with_params(mut self, params: GenerationParams) -> Self {
        self.params = params;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn params(&self) -> GenerationParams {
        self.params
    }

    pub fn tracker(&self) -> &GenerationTracker {
        &self.tracker
    }

    pub fn repository(&self) -> &Arc<dyn TimetableRepository> {
        &self.repository
    }

    pub fn generator_name(&self) -> &str {
        self.generator.name()
    }

    // ==================== Staff ====================

    pub async fn list_staff(&self) -> ServiceResult<StaffRegistry> {
        Ok(self.repository.load_staff().await?)
    }

    pub async fn add_staff(&self, draft: StaffDraft) -> ServiceResult<StaffMember> {
        let _guard = self.store_lock.lock().await;
        let mut registry = self.repository.load_staff().await?;
        let member = registry.register(&draft)?;
        self.repository.save_staff(&registry).await?;
        info!("Registered staff member {} ({})", member.name, member.id);
        Ok(member)
    }

    pub async fn update_staff(&self, id: &StaffId, draft: StaffDraft) -> ServiceResult<StaffMember> {
        let _guard = self.store_lock.lock().await;
        let mut registry = self.repository.load_staff().await?;
        let member = registry.update(id, &draft)?;
        self.repository.save_staff(&registry).await?;
        info!("Updated staff member {}", id);
        Ok(member)
    }

    /// Remove a staff member. Timetables are left as they are; references to
    /// the removed member stop resolving.
    pub async fn delete_staff(&self, id: &StaffId) -> ServiceResult<StaffMember> {
        let _guard = self.store_lock.lock().await;
        let mut registry = self.repository.load_staff().await?;
        let member = registry.remove(id)?;
        self.repository.save_staff(&registry).await?;
        info!("Removed staff member {} ({})", member.name, id);
        Ok(member)
    }

    /// Classes with at least one qualified staff member, in school order.
    pub async fn list_classes(&self) -> ServiceResult<Vec<String>> {
        Ok(self.repository.load_staff().await?.class_names())
    }

    // ==================== Timetables ====================

    pub async fn timetables(&self) -> ServiceResult<TimetableSet> {
        Ok(self.repository.load_timetables().await?)
    }

    pub async fn timetable(&self, class_name: &str) -> ServiceResult<TimetableGrid> {
        self.repository
            .load_timetables()
            .await?
            .get(class_name)
            .cloned()
            .ok_or_else(|| ServiceError::ClassNotFound(class_name.to_string()))
    }

    /// Generate timetables for `class_names`, or for every class with staff.
    ///
    /// Request construction errors are returned before the generator is
    /// contacted. Generator failures are absorbed: affected classes get
    /// fallback grids and the report carries an advisory.
    pub async fn generate(&self, class_names: Option<Vec<String>>) -> ServiceResult<GenerationReport> {
        let registry = self.repository.load_staff().await?;
        let (request, roster_index) =
            ScheduleRequestBuilder::build(&registry, class_names.as_deref(), self.params)?;

        let guard = self
            .tracker
            .try_begin(&request.class_names)
            .ok_or_else(|| ServiceError::GenerationInProgress(request.class_names.join(", ")))?;

        info!(
            "Generation {} started for {} class(es) with {} staff via {} generator",
            guard.run_id(),
            request.class_names.len(),
            request.staff_roster.len(),
            self.generator.name()
        );

        let outcome = match tokio::time::timeout(self.timeout, self.generator.generate(&request)).await {
            Ok(result) => result,
            Err(_) => Err(GenerationError::Timeout(self.timeout)),
        };

        let (raw, failure) = match outcome {
            Ok(value) => (RawResponse::from_value(Some(value)), None),
            Err(GenerationError::Decode(reason)) => {
                warn!("Generator output could not be decoded: {}", reason);
                (RawResponse::Malformed(reason.clone()), Some(GenerationError::Decode(reason)))
            }
            Err(e) => {
                warn!("Generator call failed: {}", e);
                (RawResponse::Absent, Some(e))
            }
        };

        let reconciliation = reconcile(&request, raw);
        let advisory = match &failure {
            Some(e) if e.is_overloaded() => GenerationAdvisory::Overloaded,
            Some(_) => GenerationAdvisory::Failed,
            None if reconciliation.is_total_fallback() => GenerationAdvisory::Failed,
            None if reconciliation.is_partial() => GenerationAdvisory::Partial,
            None => GenerationAdvisory::None,
        };

        let persisted = {
            let _lock = self.store_lock.lock().await;
            match self.repository.load_timetables().await {
                Ok(mut stored) => {
                    if class_names.is_none() {
                        stored = TimetableSet::new();
                    }
                    stored.merge(reconciliation.timetables.clone());
                    self.repository.save_timetables(&stored).await
                }
                Err(e) => Err(e),
            }
        };
        if let Err(e) = persisted {
            error!("Failed to persist generated timetables: {}", e);
            guard.fail(e.to_string());
            return Err(e.into());
        }

        let fingerprint = roster_index.fingerprint();
        *self.generated_with.lock() = Some(fingerprint.clone());

        let mut warnings = reconciliation.warnings;
        if let Some(e) = &failure {
            warnings.insert(0, e.to_string());
        }
        let summary = match advisory {
            GenerationAdvisory::None => None,
            _ => Some(format!(
                "{:?}: {} of {} class(es) fell back",
                advisory,
                reconciliation.fallback_classes.len(),
                request.class_names.len()
            )),
        };
        let run_id = guard.run_id().to_string();
        guard.complete(summary);

        info!(
            "Generation {} finished: advisory={:?}, fallback={}, repaired={}",
            run_id,
            advisory,
            reconciliation.fallback_classes.len(),
            reconciliation.repaired_slots
        );

        Ok(GenerationReport {
            run_id,
            timetables: reconciliation.timetables,
            fallback_classes: reconciliation.fallback_classes,
            ignored_classes: reconciliation.ignored_classes,
            repaired_slots: reconciliation.repaired_slots,
            warnings,
            advisory,
            advisory_message: advisory.message().map(str::to_string),
            roster_fingerprint: fingerprint,
        })
    }

    /// Apply one manual edit and persist it. Returns the updated class grid.
    pub async fn edit_slot(&self, edit: SlotEdit) -> ServiceResult<TimetableGrid> {
        let _lock = self.store_lock.lock().await;
        let registry = self.repository.load_staff().await?;
        let timetables = self.repository.load_timetables().await?;

        let updated = apply_edit(&timetables, &registry, &edit)?;
        self.repository.save_timetables(&updated).await?;

        let grid = updated
            .get(&edit.class_name)
            .cloned()
            .ok_or_else(|| ServiceError::ClassNotFound(edit.class_name.clone()))?;
        info!(
            "Edited {} day {} period {} slot {}",
            edit.class_name, edit.day, edit.period, edit.slot
        );
        Ok(grid)
    }

    /// Advisory report over the stored timetables.
    pub async fn diagnostics(&self) -> ServiceResult<DiagnosticsReport> {
        let registry = self.repository.load_staff().await?;
        let timetables = self.repository.load_timetables().await?;
        let generated_with = self.generated_with.lock().clone();
        Ok(diagnose(
            &timetables,
            &registry,
            &self.params,
            generated_with.as_deref(),
        ))
    }

    /// Running and recent generation runs.
    pub fn generation_runs(&self) -> Vec<GenerationRun> {
        self.tracker.runs()
    }

    pub fn generation_run(&self, run_id: &str) -> Option<GenerationRun> {
        self.tracker.get_run(run_id)
    }
}

#[cfg(test)]
#[path = "timetable_tests.rs"]
mod tests;
