//! Shared helpers for integration tests.
#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};

use timetable_rust::db::{LocalRepository, TimetableRepository};
use timetable_rust::engine::{ExternalScheduleGenerator, GenerationError, GenerationRequest};
use timetable_rust::models::StaffDraft;
use timetable_rust::services::TimetableService;

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Runs `f` with environment variables temporarily modified.
///
/// Restores variables on unwind and serializes access to process-global env
/// vars so tests running in parallel do not see each other's changes.
///
/// `changes` is a list of `(key, value)` pairs:
/// - `Some(v)` sets the variable to `v`
/// - `None` removes the variable
pub fn with_scoped_env<F, R>(changes: &[(&str, Option<&str>)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _lock = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let _guard = ScopedEnv::new(changes);
    f()
}

struct ScopedEnv {
    snapshot: Vec<(String, Option<String>)>,
}

impl ScopedEnv {
    fn new(changes: &[(&str, Option<&str>)]) -> Self {
        let keys: HashSet<&str> = changes.iter().map(|(k, _)| *k).collect();
        let snapshot = keys
            .into_iter()
            .map(|k| (k.to_string(), std::env::var(k).ok()))
            .collect::<Vec<_>>();

        for (k, v) in changes {
            match v {
                Some(val) => std::env::set_var(k, val),
                None => std::env::remove_var(k),
            }
        }

        Self { snapshot }
    }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        for (k, v) in self.snapshot.drain(..) {
            match v {
                Some(val) => std::env::set_var(&k, val),
                None => std::env::remove_var(&k),
            }
        }
    }
}

/// Generator returning a fixed result, counting calls and keeping the last request.
pub struct CannedGenerator {
    result: Result<Value, GenerationError>,
    calls: AtomicUsize,
    last_request: Mutex<Option<GenerationRequest>>,
}

impl CannedGenerator {
    pub fn ok(value: Value) -> Arc<Self> {
        Arc::new(Self {
            result: Ok(value),
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        })
    }

    pub fn err(error: GenerationError) -> Arc<Self> {
        Arc::new(Self {
            result: Err(error),
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<GenerationRequest> {
        self.last_request
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[async_trait]
impl ExternalScheduleGenerator for CannedGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<Value, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap_or_else(|e| e.into_inner()) = Some(request.clone());
        self.result.clone()
    }

    fn name(&self) -> &str {
        "canned"
    }
}

/// A `days × periods` grid with every slot assigned to `staff`.
pub fn grid_json(days: usize, periods: usize, staff: &str) -> Value {
    let day: Vec<Value> = (0..periods).map(|_| json!([{ "staffId": staff }])).collect();
    Value::Array((0..days).map(|_| Value::Array(day.clone())).collect())
}

/// Asha (index 0) teaches Class 1 and Class 2, Ravi (index 1) teaches Class 1.
pub async fn seed_staff(service: &TimetableService) {
    service
        .add_staff(StaffDraft::new("Asha", "Maths", ["Class 1", "Class 2"]))
        .await
        .unwrap();
    service
        .add_staff(StaffDraft::new("Ravi", "Science", ["Class 1"]))
        .await
        .unwrap();
}

pub fn service_over(
    repository: Arc<dyn TimetableRepository>,
    generator: Arc<dyn ExternalScheduleGenerator>,
) -> TimetableService {
    TimetableService::new(repository, generator)
}

pub fn local_service(generator: Arc<dyn ExternalScheduleGenerator>) -> TimetableService {
    service_over(Arc::new(LocalRepository::new()), generator)
}
