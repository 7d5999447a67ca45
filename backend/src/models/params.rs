use serde::{Deserialize, Serialize};

/// Teaching periods per day requested from the generator.
pub const DEFAULT_PERIODS_PER_DAY: usize = 8;
/// School days per week.
pub const DEFAULT_DAYS_PER_WEEK: usize = 5;
/// Breaks per day and per class.
pub const DEFAULT_BREAKS_PER_DAY: usize = 2;

/// Weekly shape of the timetable a generation run asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationParams {
    pub periods_per_day: usize,
    pub days_per_week: usize,
    pub breaks_per_day: usize,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            periods_per_day: DEFAULT_PERIODS_PER_DAY,
            days_per_week: DEFAULT_DAYS_PER_WEEK,
            breaks_per_day: DEFAULT_BREAKS_PER_DAY,
        }
    }
}
