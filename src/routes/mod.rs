pub mod auth;
pub mod health;
pub mod planner;

use actix_web::{error::JsonPayloadError, web, HttpRequest};

use crate::error::ApiError;
use crate::middleware::auth::AuthMiddleware;

fn json_error(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    ApiError::Validation(format!("Invalid request body: {}", err)).into()
}

pub fn config(cfg: &mut web::ServiceConfig, jwt_secret: &str) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error))
        .route("/", web::get().to(health::index))
        .route("/health", web::get().to(health::health_check))
        .service(
            web::scope("/api")
                .service(
                    web::scope("/auth")
                        .route("/register", web::post().to(auth::register))
                        .route("/login", web::post().to(auth::login))
                        .service(
                            web::scope("")
                                .wrap(AuthMiddleware::new(jwt_secret))
                                .route("/me", web::get().to(auth::me)),
                        ),
                )
                // Protected routes
                .service(
                    web::scope("/plan")
                        .wrap(AuthMiddleware::new(jwt_secret))
                        .route("/generate", web::post().to(planner::generate))
                        .route("/mytrips", web::get().to(planner::my_trips))
                        .route("/{id}", web::put().to(planner::update))
                        .route("/{id}", web::delete().to(planner::delete)),
                ),
        );
}
