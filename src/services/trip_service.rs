use chrono::{DateTime, NaiveDate, Utc};
use mongodb::bson::{self, oid::ObjectId};
use std::sync::Arc;

use super::planner_service::TripPlanner;
use crate::db::TripStore;
use crate::error::ApiError;
use crate::models::trip::{BudgetInput, Trip, TripParams, TripPlanRequest, TripUpdateRequest};

/// Result of `PUT /api/plan/{id}`.
pub struct TripUpdate {
    pub trip: Trip,
    pub regenerated: bool,
}

/// Trip lifecycle: generate, list, edit, regenerate and delete, with
/// ownership enforced on every operation that targets an existing trip.
pub struct TripService {
    store: Arc<dyn TripStore>,
    planner: Arc<TripPlanner>,
}

impl TripService {
    pub fn new(store: Arc<dyn TripStore>, planner: Arc<TripPlanner>) -> Self {
        Self { store, planner }
    }

    pub async fn create(&self, owner: ObjectId, request: TripPlanRequest) -> Result<Trip, ApiError> {
        let params = validate_plan_request(request)?;
        let outcome = self.planner.plan(&params).await?;

        let now = bson::DateTime::now();
        let mut trip = Trip {
            id: None,
            user: owner,
            destination: params.destination,
            start_date: params.start_date,
            end_date: params.end_date,
            budget: params.budget,
            preferences: params.preferences,
            ai_plan: outcome.plan,
            fallback_reason: outcome.fallback_reason,
            created_at: Some(now),
            updated_at: Some(now),
        };
        trip.id = Some(self.store.create(&trip).await?);

        log::info!(
            "Created trip {} for user {} (fallback: {})",
            trip.id.map(|id| id.to_hex()).unwrap_or_default(),
            owner,
            trip.fallback_reason.as_deref().unwrap_or("none")
        );
        Ok(trip)
    }

    pub async fn list(&self, owner: &ObjectId) -> Result<Vec<Trip>, ApiError> {
        Ok(self.store.list_by_owner(owner).await?)
    }

    pub async fn update(
        &self,
        owner: &ObjectId,
        id: &ObjectId,
        request: TripUpdateRequest,
    ) -> Result<TripUpdate, ApiError> {
        let mut trip = self.owned_trip(owner, id).await?;
        let params = merge_params(&trip, &request)?;

        if request.regenerate {
            let outcome = self.planner.plan(&params).await?;
            trip.apply_params(params);
            trip.ai_plan = outcome.plan;
            trip.fallback_reason = outcome.fallback_reason;
        } else {
            trip.apply_params(params);
            if let Some(plan) = request.ai_plan {
                if plan.trim().is_empty() {
                    return Err(ApiError::Validation("aiPlan cannot be empty".to_string()));
                }
                trip.ai_plan = plan;
            }
        }

        trip.updated_at = Some(bson::DateTime::now());
        self.store.save(&trip).await?;

        Ok(TripUpdate {
            trip,
            regenerated: request.regenerate,
        })
    }

    pub async fn delete(&self, owner: &ObjectId, id: &ObjectId) -> Result<(), ApiError> {
        self.owned_trip(owner, id).await?;
        self.store.delete(id).await?;
        log::info!("Deleted trip {} for user {}", id, owner);
        Ok(())
    }

    async fn owned_trip(&self, owner: &ObjectId, id: &ObjectId) -> Result<Trip, ApiError> {
        let trip = self
            .store
            .find_by_id(id)
            .await?
            .ok_or(ApiError::NotFound("Trip"))?;

        if trip.user != *owner {
            log::warn!("User {} tried to modify trip {} owned by {}", owner, id, trip.user);
            return Err(ApiError::Forbidden);
        }
        Ok(trip)
    }
}

fn present(value: Option<&String>) -> Option<&str> {
    value.map(|v| v.trim()).filter(|v| !v.is_empty())
}

/// Accepts `YYYY-MM-DD` or a full RFC 3339 timestamp (as echoed back from a
/// stored trip).
pub fn parse_date(field: &str, raw: &str) -> Result<NaiveDate, ApiError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| DateTime::parse_from_rfc3339(raw).map(|dt| dt.with_timezone(&Utc).date_naive()))
        .map_err(|_| ApiError::Validation(format!("{} must be a valid date", field)))
}

fn ensure_order(start: NaiveDate, end: NaiveDate) -> Result<(), ApiError> {
    if start > end {
        return Err(ApiError::Validation(
            "startDate must be on or before endDate".to_string(),
        ));
    }
    Ok(())
}

fn budget_amount(budget: &BudgetInput) -> Result<Option<f64>, ApiError> {
    budget.to_amount().map_err(ApiError::Validation)
}

pub fn validate_plan_request(request: TripPlanRequest) -> Result<TripParams, ApiError> {
    let (Some(destination), Some(start), Some(end)) = (
        present(request.destination.as_ref()),
        present(request.start_date.as_ref()),
        present(request.end_date.as_ref()),
    ) else {
        return Err(ApiError::Validation("Missing required fields".to_string()));
    };

    let start_date = parse_date("startDate", start)?;
    let end_date = parse_date("endDate", end)?;
    ensure_order(start_date, end_date)?;

    let budget = match &request.budget {
        Some(budget) => budget_amount(budget)?,
        None => None,
    };

    Ok(TripParams {
        destination: destination.to_string(),
        start_date,
        end_date,
        budget,
        preferences: present(request.preferences.as_ref()).map(str::to_string),
    })
}

/// Overlays the fields present in `request` on the stored trip. Blank
/// destination or dates keep the stored value; a blank budget or preferences
/// clears it.
fn merge_params(trip: &Trip, request: &TripUpdateRequest) -> Result<TripParams, ApiError> {
    let mut params = trip.params();

    if let Some(destination) = present(request.destination.as_ref()) {
        params.destination = destination.to_string();
    }
    if let Some(start) = present(request.start_date.as_ref()) {
        params.start_date = parse_date("startDate", start)?;
    }
    if let Some(end) = present(request.end_date.as_ref()) {
        params.end_date = parse_date("endDate", end)?;
    }
    ensure_order(params.start_date, params.end_date)?;

    if let Some(budget) = &request.budget {
        params.budget = budget_amount(budget)?;
    }
    if request.preferences.is_some() {
        params.preferences = present(request.preferences.as_ref()).map(str::to_string);
    }

    Ok(params)
}
