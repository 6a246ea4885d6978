use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{http::header, middleware::Logger, web, App, HttpServer};
use env_logger::Env;

use trip_planner_api::{
    config::AppConfig,
    db::mongo::{create_mongo_client, MongoStore},
    routes,
    services::planner_service::TripPlanner,
    state::AppState,
};

fn cors(allowed_origins: &[String]) -> Cors {
    allowed_origins
        .iter()
        .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
        .allowed_methods(vec!["GET", "POST", "PUT", "PATCH", "DELETE", "OPTIONS"])
        .allowed_headers(vec![header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
        .supports_credentials()
        .max_age(3600)
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if cfg!(debug_assertions) {
        dotenv::dotenv().ok();
    }

    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let config = AppConfig::from_env()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()))?;

    let client = create_mongo_client(&config.mongo_uri)
        .await
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;
    let store = Arc::new(MongoStore::new(&client, &config.database));
    if let Err(e) = store.ensure_indexes().await {
        log::warn!("Failed to create indexes: {}", e);
    }

    let ai_mode = config.gemini.mode();
    log::info!("AI mode: {}", ai_mode.as_str());

    let state = web::Data::new(AppState::new(
        store.clone(),
        store,
        TripPlanner::from_settings(&config.gemini),
        &config.jwt_secret,
        ai_mode,
    ));

    let allowed_origins = config.allowed_origins();
    let jwt_secret = config.jwt_secret.clone();

    log::info!("Server running on {}:{}", config.host, config.port);

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(cors(&allowed_origins))
            .app_data(state.clone())
            .configure(|cfg| routes::config(cfg, &jwt_secret))
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
