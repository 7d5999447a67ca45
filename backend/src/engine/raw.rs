//! Classification of untrusted generator output.
//!
//! Whatever the generator sends back is sorted into one of three cases before
//! reconciliation: nothing at all, something that is not a per-class mapping,
//! or a list of per-class entries which are individually valid or malformed.

use serde_json::{Map, Value};

use crate::models::{parse_positional_index, Day, Period, Slot, TimetableActivity, TimetableGrid};

const ENTRIES_KEY: &str = "allClassTimetables";
const MAPPING_KEY: &str = "timetablesByClass";

/// Generator output after the outer shape has been inspected.
#[derive(Debug, Clone, PartialEq)]
pub enum RawResponse {
    /// No output: transport failure, timeout or empty body.
    Absent,
    /// Output that is not a mapping or list of class timetables.
    Malformed(String),
    /// Per-class entries, in the order the generator sent them.
    PerClass {
        entries: Vec<RawClassEntry>,
        /// Entries that could not be attributed to any class.
        unattributed: Vec<String>,
    },
}

/// One class as returned by the generator.
#[derive(Debug, Clone, PartialEq)]
pub struct RawClassEntry {
    pub class_name: String,
    pub grid: RawGrid,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RawGrid {
    /// Passed the shape check. `repaired_slots` counts slots blanked because
    /// they did not hold a usable staff index.
    Valid {
        grid: TimetableGrid,
        repaired_slots: usize,
    },
    Malformed(String),
}

impl RawGrid {
    /// Shape-check one class grid.
    pub fn from_value(value: &Value) -> Self {
        check_grid(value)
    }
}

impl RawResponse {
    /// Classify a response body. Unparseable text is `Malformed`, blank text is `Absent`.
    pub fn from_body(body: &str) -> Self {
        if body.trim().is_empty() {
            return RawResponse::Absent;
        }
        match serde_json::from_str::<Value>(body) {
            Ok(value) => Self::from_value(Some(value)),
            Err(e) => RawResponse::Malformed(format!("invalid JSON: {}", e)),
        }
    }

    /// Classify an already-decoded response.
    pub fn from_value(value: Option<Value>) -> Self {
        match value {
            None | Some(Value::Null) => RawResponse::Absent,
            Some(Value::Array(items)) => from_entry_list(items),
            Some(Value::Object(mut obj)) => {
                if let Some(inner) = obj.remove(ENTRIES_KEY) {
                    match inner {
                        Value::Array(items) => from_entry_list(items),
                        other => RawResponse::Malformed(format!(
                            "'{}' is {}, expected an array",
                            ENTRIES_KEY,
                            kind(&other)
                        )),
                    }
                } else if let Some(inner) = obj.remove(MAPPING_KEY) {
                    match inner {
                        Value::Object(map) => from_mapping(map),
                        other => RawResponse::Malformed(format!(
                            "'{}' is {}, expected an object",
                            MAPPING_KEY,
                            kind(&other)
                        )),
                    }
                } else {
                    from_mapping(obj)
                }
            }
            Some(other) => RawResponse::Malformed(format!(
                "top-level value is {}, expected an object or array",
                kind(&other)
            )),
        }
    }
}

fn from_mapping(map: Map<String, Value>) -> RawResponse {
    let entries = map
        .into_iter()
        .map(|(class_name, value)| RawClassEntry {
            class_name,
            grid: check_grid(&value),
        })
        .collect();
    RawResponse::PerClass {
        entries,
        unattributed: Vec::new(),
    }
}

fn from_entry_list(items: Vec<Value>) -> RawResponse {
    let mut entries = Vec::new();
    let mut unattributed = Vec::new();

    for (idx, item) in items.into_iter().enumerate() {
        let class_name = item.get("className").and_then(Value::as_str);
        let data = item.get("data").or_else(|| item.get("grid"));
        match (class_name, data) {
            (Some(name), Some(data)) => entries.push(RawClassEntry {
                class_name: name.to_string(),
                grid: check_grid(data),
            }),
            (Some(name), None) => entries.push(RawClassEntry {
                class_name: name.to_string(),
                grid: RawGrid::Malformed("missing 'data'".to_string()),
            }),
            (None, _) => unattributed.push(format!("entry {} has no 'className'", idx)),
        }
    }

    RawResponse::PerClass {
        entries,
        unattributed,
    }
}

/// Shape check: array of days, each an array of periods, each an array of slots.
fn check_grid(value: &Value) -> RawGrid {
    let Some(days) = value.as_array() else {
        return RawGrid::Malformed(format!("grid is {}, expected an array", kind(value)));
    };

    let mut repaired_slots = 0;
    let mut grid: Vec<Day> = Vec::with_capacity(days.len());

    for (d, day) in days.iter().enumerate() {
        let Some(periods) = day.as_array() else {
            return RawGrid::Malformed(format!("day {} is {}, expected an array", d, kind(day)));
        };
        let mut out_day: Day = Vec::with_capacity(periods.len());
        for (p, period) in periods.iter().enumerate() {
            let Some(slots) = period.as_array() else {
                return RawGrid::Malformed(format!(
                    "day {} period {} is {}, expected an array",
                    d,
                    p,
                    kind(period)
                ));
            };
            let out_period: Period = slots
                .iter()
                .map(|slot| {
                    let converted = convert_slot(slot);
                    if converted.is_none() && !slot.is_null() {
                        repaired_slots += 1;
                    }
                    converted
                })
                .collect();
            out_day.push(out_period);
        }
        grid.push(out_day);
    }

    RawGrid::Valid {
        grid: TimetableGrid(grid),
        repaired_slots,
    }
}

fn convert_slot(slot: &Value) -> Slot {
    let staff_id = slot.get("staffId")?;
    let index = match staff_id {
        Value::String(s) => parse_positional_index(s)?,
        Value::Number(n) => usize::try_from(n.as_u64()?).ok()?,
        _ => return None,
    };
    Some(TimetableActivity::for_index(index))
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn only_entry(response: RawResponse) -> RawClassEntry {
        match response {
            RawResponse::PerClass { mut entries, .. } => {
                assert_eq!(entries.len(), 1);
                entries.remove(0)
            }
            other => panic!("expected PerClass, got {:?}", other),
        }
    }

    #[test]
    fn test_absent_and_malformed_outer_shapes() {
        assert_eq!(RawResponse::from_value(None), RawResponse::Absent);
        assert_eq!(RawResponse::from_value(Some(Value::Null)), RawResponse::Absent);
        assert_eq!(RawResponse::from_body("   "), RawResponse::Absent);
        assert!(matches!(
            RawResponse::from_value(Some(json!(42))),
            RawResponse::Malformed(_)
        ));
        assert!(matches!(
            RawResponse::from_body("{not json"),
            RawResponse::Malformed(_)
        ));
        assert!(matches!(
            RawResponse::from_value(Some(json!({"allClassTimetables": "nope"}))),
            RawResponse::Malformed(_)
        ));
    }

    #[test]
    fn test_mapping_shape() {
        let entry = only_entry(RawResponse::from_value(Some(json!({
            "Class 1": [[[{"staffId": "0"}], [null]]]
        }))));
        assert_eq!(entry.class_name, "Class 1");
        let RawGrid::Valid { grid, repaired_slots } = entry.grid else {
            panic!("expected valid grid");
        };
        assert_eq!(repaired_slots, 0);
        assert_eq!(grid.activity(0, 0, 0), Some(&TimetableActivity::new("0")));
    }

    #[test]
    fn test_entry_list_shape() {
        let response = RawResponse::from_value(Some(json!({
            "allClassTimetables": [
                {"className": "LKG", "data": [[[null]]]},
                {"data": [[[null]]]},
                {"className": "UKG"}
            ]
        })));
        let RawResponse::PerClass { entries, unattributed } = response else {
            panic!("expected PerClass");
        };
        assert_eq!(entries.len(), 2);
        assert!(matches!(entries[0].grid, RawGrid::Valid { .. }));
        assert!(matches!(entries[1].grid, RawGrid::Malformed(_)));
        assert_eq!(unattributed.len(), 1);
    }

    #[test]
    fn test_wrapped_mapping_shape() {
        let entry = only_entry(RawResponse::from_value(Some(json!({
            "timetablesByClass": {"Class 3": []}
        }))));
        assert_eq!(entry.class_name, "Class 3");
        assert!(matches!(entry.grid, RawGrid::Valid { .. }));
    }

    #[test]
    fn test_period_not_array_is_malformed() {
        let entry = only_entry(RawResponse::from_value(Some(json!({
            "Class 1": [[[null], {"staffId": "0"}]]
        }))));
        assert!(matches!(entry.grid, RawGrid::Malformed(_)));
    }

    #[test]
    fn test_unusable_slots_are_blanked() {
        let entry = only_entry(RawResponse::from_value(Some(json!({
            "Class 1": [[[{"staffId": 2}, {"staffId": "x"}, 7, {"other": 1}, null, {"staffId": "-1"}]]]
        }))));
        let RawGrid::Valid { grid, repaired_slots } = entry.grid else {
            panic!("expected valid grid");
        };
        assert_eq!(repaired_slots, 4);
        assert_eq!(
            grid.period(0, 0).unwrap(),
            &vec![Some(TimetableActivity::new("2")), None, None, None, None, None]
        );
    }
}
