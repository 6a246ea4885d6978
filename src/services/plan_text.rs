use serde_json::Value;

use super::prompt_builder::day_count;
use crate::models::trip::TripParams;

/// JSON pointers where a generated plan may appear, in priority order. The
/// response schema has shifted between API versions, so new shapes go here.
const PLAN_TEXT_PATHS: &[&str] = &[
    "/candidates/0/content/parts/0/text",
    "/candidates/0/content/text",
    "/outputs/0/content/0/text",
];

pub const MOCK_REASON: &str = "mock";
pub const GENERIC_REASON: &str = "AI error";

/// Returns the first non-empty plan text found in `response`.
pub fn extract_plan_text(response: &Value) -> Option<String> {
    PLAN_TEXT_PATHS
        .iter()
        .filter_map(|path| response.pointer(path))
        .filter_map(Value::as_str)
        .find(|text| !text.is_empty())
        .map(str::to_string)
}

fn days_label(days: i64) -> String {
    if days == 1 {
        "1 day".to_string()
    } else {
        format!("{} days", days)
    }
}

/// Plan used when no AI key is configured.
pub fn mock_plan(params: &TripParams) -> String {
    let days = day_count(params.start_date, params.end_date);
    format!(
        "Mock plan for {} ({}). Day 1: Arrival. Day 2: Sightseeing.",
        params.destination,
        days_label(days)
    )
}

/// Plan used when the live call failed or returned nothing usable.
pub fn fallback_plan(params: &TripParams) -> String {
    let days = day_count(params.start_date, params.end_date);
    format!(
        "Fallback plan for {} ({}).\n\
         AI temporarily unavailable, here's a starter plan:\n\
         Day 1: Arrival.\n\
         Day 2: Sightseeing.",
        params.destination,
        days_label(days)
    )
}
