//! Persistence for staff and timetables.
//!
//! Storage is abstracted behind the [`TimetableRepository`] trait so the
//! backing store can be swapped:
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │  HTTP API / binaries                         │
//! └───────────────────┬──────────────────────────┘
//!                     │
//! ┌───────────────────▼──────────────────────────┐
//! │  services::TimetableService                  │
//! └───────────────────┬──────────────────────────┘
//!                     │
//! ┌───────────────────▼──────────────────────────┐
//! │  repository::TimetableRepository (trait)     │
//! └──────────┬────────────────────────┬──────────┘
//!            │                        │
//!   ┌────────▼────────┐      ┌────────▼────────┐
//!   │ LocalRepository │      │ FileRepository  │
//!   │   (in-memory)   │      │  (JSON files)   │
//!   └─────────────────┘      └─────────────────┘
//! ```
//!
//! Two keys are persisted: `staff_roster` and `timetables`. Each is replaced
//! wholesale on save.

pub mod factory;
pub mod repo_config;
pub mod repositories;
pub mod repository;

pub use factory::{RepositoryFactory, RepositoryType};
pub use repo_config::RepositorySettings;
pub use repositories::{FileRepository, LocalRepository};
pub use repository::{
    ErrorContext, RepositoryError, RepositoryResult, TimetableRepository, STAFF_ROSTER_KEY,
    TIMETABLES_KEY,
};
