//! Tracking of timetable generation runs.
//!
//! Holds the set of class groups with a generation in flight (so a second
//! request for the same group is rejected) and a short history of finished
//! runs for inspection.

use parking_lot::Mutex;
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use uuid::Uuid;

use crate::engine::class_group_key;

/// Finished runs kept in memory.
const MAX_HISTORY: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Running,
    Completed,
    Failed,
}

/// One generation run.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRun {
    pub run_id: String,
    pub class_names: Vec<String>,
    pub status: RunStatus,
    pub started_at: chrono::DateTime<chrono::Utc>,
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
    /// Short outcome summary, e.g. fallback classes or the generator error.
    pub summary: Option<String>,
}

#[derive(Default)]
struct TrackerState {
    in_flight: HashSet<String>,
    running: Vec<GenerationRun>,
    history: VecDeque<GenerationRun>,
}

/// In-memory generation tracker.
#[derive(Clone, Default)]
pub struct GenerationTracker {
    state: Arc<Mutex<TrackerState>>,
}

impl GenerationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the class group of `class_names`.
    ///
    /// Returns `None` if a run for the same group is already in flight. The
    /// claim is released when the returned guard is dropped.
    pub fn try_begin(&self, class_names: &[String]) -> Option<RunGuard> {
        let key = class_group_key(class_names);
        let mut state = self.state.lock();
        if !state.in_flight.insert(key.clone()) {
            return None;
        }
        let run = GenerationRun {
            run_id: Uuid::new_v4().to_string(),
            class_names: class_names.to_vec(),
            status: RunStatus::Running,
            started_at: chrono::Utc::now(),
            completed_at: None,
            summary: None,
        };
        let run_id = run.run_id.clone();
        state.running.push(run);
        Some(RunGuard {
            tracker: self.clone(),
            key,
            run_id,
            finished: false,
        })
    }

    #[cfg(test)]
    pub(crate) fn is_in_flight(&self, class_names: &[String]) -> bool {
        self.state
            .lock()
            .in_flight
            .contains(&class_group_key(class_names))
    }

    /// Running runs followed by finished ones, newest first.
    pub fn runs(&self) -> Vec<GenerationRun> {
        let state = self.state.lock();
        state
            .running
            .iter()
            .rev()
            .chain(state.history.iter())
            .cloned()
            .collect()
    }

    pub fn get_run(&self, run_id: &str) -> Option<GenerationRun> {
        let state = self.state.lock();
        state
            .running
            .iter()
            .chain(state.history.iter())
            .find(|r| r.run_id == run_id)
            .cloned()
    }

    fn finish(&self, key: &str, run_id: &str, status: RunStatus, summary: Option<String>) {
        let mut state = self.state.lock();
        state.in_flight.remove(key);
        if let Some(pos) = state.running.iter().position(|r| r.run_id == run_id) {
            let mut run = state.running.remove(pos);
            run.status = status;
            run.completed_at = Some(chrono::Utc::now());
            run.summary = summary;
            state.history.push_front(run);
            state.history.truncate(MAX_HISTORY);
        }
    }
}

/// Claim on a class group. Dropping it without finishing records the run as failed.
pub struct RunGuard {
    tracker: GenerationTracker,
    key: String,
    run_id: String,
    finished: bool,
}

impl RunGuard {
    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn complete(mut self, summary: Option<String>) {
        self.finished = true;
        self.tracker
            .finish(&self.key, &self.run_id, RunStatus::Completed, summary);
    }

    pub fn fail(mut self, message: impl Into<String>) {
        self.finished = true;
        self.tracker
            .finish(&self.key, &self.run_id, RunStatus::Failed, Some(message.into()));
    }
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        if !self.finished {
            self.tracker.finish(
                &self.key,
                &self.run_id,
                RunStatus::Failed,
                Some("interrupted".to_string()),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_same_group_is_single_flight() {
        let tracker = GenerationTracker::new();
        let guard = tracker.try_begin(&names(&["Class 1", "LKG"])).unwrap();

        assert!(tracker.try_begin(&names(&["LKG", "Class 1"])).is_none());
        assert!(tracker.try_begin(&names(&["Class 2"])).is_some());
        assert!(tracker.is_in_flight(&names(&["Class 1", "LKG"])));

        guard.complete(None);
        assert!(!tracker.is_in_flight(&names(&["Class 1", "LKG"])));
        assert!(tracker.try_begin(&names(&["Class 1", "LKG"])).is_some());
    }

    #[test]
    fn test_history_records_outcome() {
        let tracker = GenerationTracker::new();
        let guard = tracker.try_begin(&names(&["Class 1"])).unwrap();
        let run_id = guard.run_id().to_string();
        assert_eq!(tracker.get_run(&run_id).unwrap().status, RunStatus::Running);

        guard.fail("generator unavailable");
        let run = tracker.get_run(&run_id).unwrap();
        assert_eq!(run.status, RunStatus::Failed);
        assert_eq!(run.summary.as_deref(), Some("generator unavailable"));
        assert!(run.completed_at.is_some());
    }

    #[test]
    fn test_dropped_guard_releases_claim() {
        let tracker = GenerationTracker::new();
        {
            let _guard = tracker.try_begin(&names(&["Class 1"])).unwrap();
        }
        assert!(!tracker.is_in_flight(&names(&["Class 1"])));
        assert_eq!(tracker.runs()[0].summary.as_deref(), Some("interrupted"));
    }
}
