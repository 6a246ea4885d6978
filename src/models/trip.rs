use chrono::{DateTime, NaiveDate, Utc};
use mongodb::bson::{self, oid::ObjectId};
use serde::{Deserialize, Serialize};

/// A persisted trip and its generated plan.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Trip {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub user: ObjectId,
    pub destination: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub budget: Option<f64>,
    pub preferences: Option<String>,
    pub ai_plan: String,
    // "mock", an HTTP status such as "503", or "AI error"; None when the live call succeeded
    pub fallback_reason: Option<String>,
    pub created_at: Option<bson::DateTime>,
    pub updated_at: Option<bson::DateTime>,
}

impl Trip {
    pub fn params(&self) -> TripParams {
        TripParams {
            destination: self.destination.clone(),
            start_date: self.start_date,
            end_date: self.end_date,
            budget: self.budget,
            preferences: self.preferences.clone(),
        }
    }

    pub fn apply_params(&mut self, params: TripParams) {
        self.destination = params.destination;
        self.start_date = params.start_date;
        self.end_date = params.end_date;
        self.budget = params.budget;
        self.preferences = params.preferences;
    }
}

/// Validated trip parameters, the input to prompt building.
#[derive(Debug, Clone, PartialEq)]
pub struct TripParams {
    pub destination: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub budget: Option<f64>,
    pub preferences: Option<String>,
}

/// Budget as sent by the browser: either a JSON number or the raw text of an
/// input field.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum BudgetInput {
    Amount(f64),
    Text(String),
}

impl BudgetInput {
    pub fn to_amount(&self) -> Result<Option<f64>, String> {
        let amount = match self {
            BudgetInput::Amount(amount) => *amount,
            BudgetInput::Text(text) if text.trim().is_empty() => return Ok(None),
            BudgetInput::Text(text) => text
                .trim()
                .parse::<f64>()
                .map_err(|_| format!("budget must be a number, got '{}'", text))?,
        };

        if !amount.is_finite() || amount < 0.0 {
            return Err("budget must be a non-negative number".to_string());
        }
        Ok(Some(amount))
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripPlanRequest {
    pub destination: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub budget: Option<BudgetInput>,
    pub preferences: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripUpdateRequest {
    pub destination: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub budget: Option<BudgetInput>,
    pub preferences: Option<String>,
    pub ai_plan: Option<String>,
    #[serde(default)]
    pub regenerate: bool,
}

/// Trip as returned over HTTP, with ids rendered as hex strings.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TripView {
    #[serde(rename = "_id")]
    pub id: String,
    pub user: String,
    pub destination: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub budget: Option<f64>,
    pub preferences: Option<String>,
    pub ai_plan: String,
    pub fallback_reason: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<&Trip> for TripView {
    fn from(trip: &Trip) -> Self {
        Self {
            id: trip.id.map(|id| id.to_hex()).unwrap_or_default(),
            user: trip.user.to_hex(),
            destination: trip.destination.clone(),
            start_date: trip.start_date,
            end_date: trip.end_date,
            budget: trip.budget,
            preferences: trip.preferences.clone(),
            ai_plan: trip.ai_plan.clone(),
            fallback_reason: trip.fallback_reason.clone(),
            created_at: trip.created_at.map(|at| at.to_chrono()),
            updated_at: trip.updated_at.map(|at| at.to_chrono()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TripPlanResponse {
    pub trip: TripView,
    pub fallback: bool,
}

#[derive(Debug, Serialize)]
pub struct TripUpdateResponse {
    pub trip: TripView,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub regenerated: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct TripListResponse {
    pub trips: Vec<TripView>,
}
