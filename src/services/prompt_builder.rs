use chrono::NaiveDate;

use crate::models::trip::TripParams;

/// Number of days the trip covers. Never less than one, even for a same-day trip.
pub fn day_count(start: NaiveDate, end: NaiveDate) -> i64 {
    (end - start).num_days().max(1)
}

pub fn build_prompt(params: &TripParams) -> String {
    let days = day_count(params.start_date, params.end_date);
    let budget = match params.budget {
        Some(amount) => format!("Budget: {} USD.", amount),
        None => "Budget: not specified.".to_string(),
    };
    let preferences = params
        .preferences
        .as_deref()
        .map(str::trim)
        .filter(|prefs| !prefs.is_empty())
        .unwrap_or("none");

    format!(
        "Plan a {days}-day trip to {destination}.\n\
         {budget}\n\
         Preferences: {preferences}.\n\
         Provide a day-by-day itinerary, estimated cost, transport suggestions and a short packing list.",
        days = days,
        destination = params.destination,
        budget = budget,
        preferences = preferences,
    )
}
