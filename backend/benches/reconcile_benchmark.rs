use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use serde_json::{json, Value};
use timetable_rust::engine::{reconcile, RawResponse, ScheduleRequestBuilder};
use timetable_rust::models::{GenerationParams, StaffDraft, StaffRegistry};

fn registry(classes: usize) -> StaffRegistry {
    let mut registry = StaffRegistry::new();
    for i in 0..classes {
        let class = format!("Class {}", i + 1);
        registry
            .register(&StaffDraft::new(format!("Teacher {i}"), "Maths", [class]))
            .unwrap();
    }
    registry
}

fn response(classes: usize, params: GenerationParams) -> Value {
    let mut map = serde_json::Map::new();
    for i in 0..classes {
        let day: Vec<Value> = (0..params.periods_per_day)
            .map(|p| json!([{ "staffId": (p % classes).to_string() }]))
            .collect();
        let grid: Vec<Value> = (0..params.days_per_week).map(|_| Value::Array(day.clone())).collect();
        map.insert(format!("Class {}", i + 1), Value::Array(grid));
    }
    Value::Object(map)
}

fn bench_reconcile(c: &mut Criterion) {
    let mut group = c.benchmark_group("reconcile");
    let params = GenerationParams::default();

    for classes in [4usize, 16, 64] {
        let registry = registry(classes);
        let (request, _) = ScheduleRequestBuilder::build(&registry, None, params).unwrap();
        let body = response(classes, params);

        group.bench_with_input(BenchmarkId::new("valid", classes), &body, |b, body| {
            b.iter(|| {
                let raw = RawResponse::from_value(Some(body.clone()));
                black_box(reconcile(&request, raw))
            });
        });

        group.bench_with_input(BenchmarkId::new("fallback", classes), &request, |b, request| {
            b.iter(|| black_box(reconcile(request, RawResponse::Absent)));
        });
    }

    group.finish();
}

fn bench_parse_body(c: &mut Criterion) {
    let params = GenerationParams::default();
    let text = response(32, params).to_string();
    c.bench_function("raw_from_body_32_classes", |b| {
        b.iter(|| black_box(RawResponse::from_body(black_box(&text))));
    });
}

criterion_group!(benches, bench_reconcile, bench_parse_body);
criterion_main!(benches);
