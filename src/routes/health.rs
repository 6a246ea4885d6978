use actix_web::{web, HttpResponse, Responder};
use serde::Serialize;
use std::collections::HashMap;

use crate::config::AiMode;
use crate::state::AppState;

#[derive(Serialize)]
struct HealthStatus {
    status: String,
    services: HashMap<String, ServiceStatus>,
    version: String,
}

#[derive(Serialize, Clone)]
struct ServiceStatus {
    status: String,
    details: Option<String>,
}

pub async fn index() -> impl Responder {
    "AI Trip Planner Server is running"
}

pub async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let mut health = HealthStatus {
        status: "ok".to_string(),
        services: HashMap::new(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };

    let database = match state.trip_store.ping().await {
        Ok(()) => ServiceStatus {
            status: "ok".to_string(),
            details: None,
        },
        Err(e) => ServiceStatus {
            status: "error".to_string(),
            details: Some(e.to_string()),
        },
    };
    health
        .services
        .insert("database".to_string(), database.clone());

    // Mock mode still serves plans, so only a broken configuration degrades.
    let ai = ServiceStatus {
        status: match state.ai_mode {
            AiMode::Misconfigured => "error".to_string(),
            _ => "ok".to_string(),
        },
        details: Some(state.ai_mode.as_str().to_string()),
    };
    health.services.insert("ai".to_string(), ai.clone());

    if database.status != "ok" || ai.status != "ok" {
        health.status = "degraded".to_string();
    }

    HttpResponse::Ok().json(health)
}
