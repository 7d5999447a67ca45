use super::*;
use crate::models::TimetableActivity;
use proptest::prelude::*;
use serde_json::{json, Value};

fn request(classes: &[&str]) -> GenerationRequest {
    GenerationRequest {
        staff_roster: Vec::new(),
        class_names: classes.iter().map(|c| c.to_string()).collect(),
        periods_per_day: 8,
        days_per_week: 5,
        breaks_per_day: 2,
    }
}

fn grid_json(days: usize, periods: usize, staff: &str) -> Value {
    let period = json!([{ "staffId": staff }]);
    let day: Vec<Value> = (0..periods).map(|_| period.clone()).collect();
    Value::Array((0..days).map(|_| Value::Array(day.clone())).collect())
}

#[test]
fn test_valid_grid_passes_through() {
    let req = request(&["Class 1"]);
    let raw = RawResponse::from_value(Some(json!({ "Class 1": grid_json(5, 8, "1") })));
    let out = reconcile(&req, raw);

    assert_eq!(out.timetables.class_names().collect::<Vec<_>>(), vec!["Class 1"]);
    let grid = out.timetables.get("Class 1").unwrap();
    assert!(grid.has_dimensions(5, 8));
    assert_eq!(grid.activity(4, 7, 0), Some(&TimetableActivity::new("1")));
    assert!(out.fallback_classes.is_empty());
    assert!(out.warnings.is_empty());
}

#[test]
fn test_missing_class_gets_fallback() {
    let req = request(&["Class 1", "Class 2"]);
    let raw = RawResponse::from_value(Some(json!({ "Class 1": grid_json(5, 8, "0") })));
    let out = reconcile(&req, raw);

    assert_eq!(out.timetables.len(), 2);
    assert_eq!(out.fallback_classes, vec!["Class 2"]);
    assert_eq!(
        out.timetables.get("Class 2"),
        Some(&TimetableGrid::fallback(5, 8))
    );
    assert!(out.is_partial());
    assert_eq!(out.adopted_count(), 1);
}

#[test]
fn test_absent_output_falls_back_everywhere() {
    let req = request(&["LKG", "Class 1"]);
    let out = reconcile(&req, RawResponse::Absent);

    assert!(out.is_total_fallback());
    assert_eq!(out.fallback_classes, vec!["LKG", "Class 1"]);
    assert_eq!(out.warnings.len(), 1);
    for (_, grid) in out.timetables.iter() {
        assert_eq!(grid, &TimetableGrid::fallback(5, 8));
    }
}

#[test]
fn test_generator_dimensions_are_kept() {
    let req = request(&["Class 1"]);
    let raw = RawResponse::from_value(Some(json!({ "Class 1": grid_json(6, 3, "0") })));
    let out = reconcile(&req, raw);

    assert!(out.timetables.get("Class 1").unwrap().has_dimensions(6, 3));
    assert!(out.fallback_classes.is_empty());
}

#[test]
fn test_unrequested_classes_dropped() {
    let req = request(&["Class 1"]);
    let raw = RawResponse::from_value(Some(json!({
        "Class 1": grid_json(1, 1, "0"),
        "Class 9": grid_json(1, 1, "0"),
    })));
    let out = reconcile(&req, raw);

    assert!(!out.timetables.contains("Class 9"));
    assert_eq!(out.ignored_classes, vec!["Class 9"]);
}

#[test]
fn test_first_valid_duplicate_wins() {
    let req = request(&["Class 1"]);
    let raw = RawResponse::from_value(Some(json!([
        { "className": "Class 1", "data": "broken" },
        { "className": "Class 1", "data": grid_json(1, 1, "3") },
        { "className": "Class 1", "data": grid_json(1, 1, "4") },
    ])));
    let out = reconcile(&req, raw);

    assert_eq!(
        out.timetables.get("Class 1").unwrap().activity(0, 0, 0),
        Some(&TimetableActivity::new("3"))
    );
    assert_eq!(out.warnings.len(), 2);
}

#[test]
fn test_repaired_slots_counted() {
    let req = request(&["Class 1"]);
    let raw = RawResponse::from_value(Some(json!({
        "Class 1": [[[{ "staffId": "abc" }, { "staffId": "2" }], [true]]]
    })));
    let out = reconcile(&req, raw);

    assert_eq!(out.repaired_slots, 2);
    let grid = out.timetables.get("Class 1").unwrap();
    assert_eq!(grid.activity(0, 0, 0), None);
    assert_eq!(grid.activity(0, 0, 1), Some(&TimetableActivity::new("2")));
}

fn arb_json() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|n| json!(n)),
        "[a-z0-9 ]{0,6}".prop_map(Value::String),
    ];
    leaf.prop_recursive(5, 64, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..5).prop_map(Value::Array),
            prop::collection::btree_map("Class [1-4]|LKG|UKG|staffId|data|className", inner, 0..4)
                .prop_map(|m| Value::Object(m.into_iter().collect())),
        ]
    })
}

fn arb_classes() -> impl Strategy<Value = Vec<String>> {
    prop::collection::btree_set("Class [1-6]|LKG|UKG", 1..5).prop_map(|s| s.into_iter().collect())
}

proptest! {
    #[test]
    fn prop_output_keys_are_exactly_requested(classes in arb_classes(), raw in arb_json()) {
        let req = GenerationRequest {
            class_names: classes.clone(),
            ..request(&[])
        };
        let out = reconcile(&req, RawResponse::from_value(Some(raw)));
        let keys: BTreeSet<String> = out.timetables.class_names().map(str::to_string).collect();
        let expected: BTreeSet<String> = classes.into_iter().collect();
        prop_assert_eq!(keys, expected);
    }

    #[test]
    fn prop_grids_are_nested_arrays_with_valid_indices(classes in arb_classes(), raw in arb_json()) {
        let req = GenerationRequest {
            class_names: classes,
            ..request(&[])
        };
        let out = reconcile(&req, RawResponse::from_value(Some(raw)));
        for (_, grid) in out.timetables.iter() {
            let value = serde_json::to_value(grid).unwrap();
            let days = value.as_array().unwrap();
            for day in days {
                for period in day.as_array().unwrap() {
                    prop_assert!(period.is_array());
                }
            }
            for (_, activity) in grid.assignments() {
                prop_assert!(activity.positional_index().is_some());
            }
        }
    }

    #[test]
    fn prop_absent_fallback_is_idempotent(
        classes in arb_classes(),
        days in 1usize..7,
        periods in 1usize..10,
    ) {
        let req = GenerationRequest {
            class_names: classes,
            days_per_week: days,
            periods_per_day: periods,
            ..request(&[])
        };
        let first = reconcile(&req, RawResponse::Absent);
        let second = reconcile(&req, RawResponse::from_value(Some(Value::Null)));
        prop_assert_eq!(&first.timetables, &second.timetables);
        for (_, grid) in first.timetables.iter() {
            prop_assert_eq!(grid, &TimetableGrid::fallback(days, periods));
        }
    }

    #[test]
    fn prop_unrequested_classes_never_leak(classes in arb_classes(), extra in "Extra [a-z]{1,4}") {
        let req = GenerationRequest {
            class_names: classes,
            ..request(&[])
        };
        let raw = RawResponse::from_value(Some(json!({ (extra.clone()): [[[null]]] })));
        let out = reconcile(&req, raw);
        prop_assert!(!out.timetables.contains(&extra));
        prop_assert_eq!(out.ignored_classes, vec![extra]);
    }
}
