//! Service layer for business logic and orchestration.
//!
//! Services sit between the HTTP handlers and the repository. They load
//! state, run the engine and persist the results.

pub mod diagnostics;
pub mod generation_tracker;
pub mod timetable;

pub use diagnostics::{diagnose, DiagnosticIssue, DiagnosticStats, DiagnosticsReport, IssueKind, Severity};
pub use generation_tracker::{GenerationRun, GenerationTracker, RunGuard, RunStatus};
pub use timetable::{
    GenerationAdvisory, GenerationReport, ServiceError, ServiceResult, TimetableService,
    DEFAULT_GENERATION_TIMEOUT,
};
