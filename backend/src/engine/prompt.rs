//! Instruction text for the generative scheduling service.

use std::fmt::Write;

use super::request::GenerationRequest;

/// Render the natural-language instructions for `request`.
///
/// The structured request is sent alongside, so the text only has to explain
/// the constraints and the expected output shape.
pub fn render_prompt(request: &GenerationRequest) -> String {
    let mut out = String::with_capacity(2048);

    out.push_str(
        "Generate weekly school timetables for every listed class at once. \
         A staff member may teach at most one class in any given day and period.\n\n",
    );

    out.push_str("Staff (id = roster index):\n");
    for entry in &request.staff_roster {
        let classes = if entry.qualified_classes.is_empty() {
            "none".to_string()
        } else {
            entry
                .qualified_classes
                .iter()
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(", ")
        };
        let _ = writeln!(out, "- {}: teaches {}", entry.positional_index, classes);
    }

    let _ = writeln!(out, "\nClasses: {}", request.class_names.join(", "));
    let _ = writeln!(out, "Days per week: {}", request.days_per_week);
    let _ = writeln!(
        out,
        "Teaching periods per day: {} (breaks excluded)",
        request.periods_per_day
    );
    let _ = writeln!(out, "Breaks per day for each class: {}", request.breaks_per_day);

    let _ = write!(
        out,
        "\nRules:\n\
         1. Only assign a staff member to a class listed in their qualifications.\n\
         2. Never assign the same staff member to two classes in the same day and period.\n\
         3. Mark each of the {} daily breaks of a class with a null slot.\n\
         4. Spread teaching load across qualified staff where possible.\n\
         5. Return an entry for every listed class and no others.\n\n\
         Respond with JSON only: {{\"allClassTimetables\": [{{\"className\": string, \
         \"data\": [day][period][slot]}}]}} where day is 0..{}, period is 0..{} and each \
         slot is {{\"staffId\": \"<roster index>\"}} or null. Use one slot per period.\n",
        request.breaks_per_day,
        request.days_per_week.saturating_sub(1),
        request.periods_per_day.saturating_sub(1),
    );

    out
}
