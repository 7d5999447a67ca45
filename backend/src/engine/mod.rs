//! Timetable generation pipeline.
//!
//! Request building, the generator boundary, response classification,
//! reconciliation and manual editing. Everything here is synchronous and
//! storage-agnostic except the generator trait.

pub mod editor;
pub mod generator;
pub mod identity;
pub mod prompt;
pub mod raw;
pub mod reconciler;
pub mod request;

pub use editor::{apply_edit, EditError, SlotEdit};
pub use generator::{
    ExternalScheduleGenerator, GenerationError, HttpScheduleGenerator, OfflineGenerator,
};
pub use identity::{resolve, roster_fingerprint, staff_label, PositionalIndex, RosterIndex};
pub use prompt::render_prompt;
pub use raw::{RawClassEntry, RawGrid, RawResponse};
pub use reconciler::{fallback_grid, reconcile, Reconciliation};
pub use request::{class_group_key, GenerationRequest, RequestError, RosterEntry, ScheduleRequestBuilder};
