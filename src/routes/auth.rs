use actix_web::{web, HttpResponse};

use crate::error::ApiError;
use crate::middleware::auth_context::AuthenticatedUser;
use crate::models::user::{LoginRequest, RegisterRequest};
use crate::state::AppState;

/*
    POST /api/auth/register
*/
pub async fn register(
    state: web::Data<AppState>,
    input: web::Json<RegisterRequest>,
) -> Result<HttpResponse, ApiError> {
    let response = state.accounts.register(input.into_inner()).await?;
    Ok(HttpResponse::Created().json(response))
}

/*
    POST /api/auth/login
*/
pub async fn login(
    state: web::Data<AppState>,
    input: web::Json<LoginRequest>,
) -> Result<HttpResponse, ApiError> {
    let response = state.accounts.login(input.into_inner()).await?;
    Ok(HttpResponse::Ok().json(response))
}

/*
    GET /api/auth/me
*/
pub async fn me(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, ApiError> {
    let profile = state.accounts.profile(&user.user_id).await?;
    Ok(HttpResponse::Ok().json(profile))
}
