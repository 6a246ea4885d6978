use actix_web::{web, HttpResponse};
use mongodb::bson::oid::ObjectId;
use serde_json::json;

use crate::error::ApiError;
use crate::middleware::auth_context::AuthenticatedUser;
use crate::models::trip::{
    TripListResponse, TripPlanRequest, TripPlanResponse, TripUpdateRequest, TripUpdateResponse,
    TripView,
};
use crate::state::AppState;

fn trip_id(path: web::Path<String>) -> Result<ObjectId, ApiError> {
    ObjectId::parse_str(path.into_inner().as_str())
        .map_err(|_| ApiError::Validation("Invalid trip id".to_string()))
}

/*
    POST /api/plan/generate
*/
pub async fn generate(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    input: web::Json<TripPlanRequest>,
) -> Result<HttpResponse, ApiError> {
    let trip = state.trips.create(user.user_id, input.into_inner()).await?;

    Ok(HttpResponse::Ok().json(TripPlanResponse {
        fallback: trip.fallback_reason.is_some(),
        trip: TripView::from(&trip),
    }))
}

/*
    GET /api/plan/mytrips
*/
pub async fn my_trips(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, ApiError> {
    let trips = state.trips.list(&user.user_id).await?;

    Ok(HttpResponse::Ok().json(TripListResponse {
        trips: trips.iter().map(TripView::from).collect(),
    }))
}

/*
    PUT /api/plan/{id}
    Edits the trip, or regenerates its plan when `regenerate` is true.
*/
pub async fn update(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
    input: web::Json<TripUpdateRequest>,
) -> Result<HttpResponse, ApiError> {
    let id = trip_id(path)?;
    let update = state
        .trips
        .update(&user.user_id, &id, input.into_inner())
        .await?;

    let response = if update.regenerated {
        TripUpdateResponse {
            regenerated: Some(true),
            fallback: Some(update.trip.fallback_reason.is_some()),
            trip: TripView::from(&update.trip),
        }
    } else {
        TripUpdateResponse {
            regenerated: None,
            fallback: None,
            trip: TripView::from(&update.trip),
        }
    };
    Ok(HttpResponse::Ok().json(response))
}

/*
    DELETE /api/plan/{id}
*/
pub async fn delete(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id = trip_id(path)?;
    state.trips.delete(&user.user_id, &id).await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Trip deleted" })))
}
