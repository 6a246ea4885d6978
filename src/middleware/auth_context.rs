use std::future::{ready, Ready};

use actix_web::{dev::Payload, Error, FromRequest, HttpMessage, HttpRequest};
use mongodb::bson::oid::ObjectId;

use crate::error::ApiError;
use crate::middleware::auth::Claims;

/// The caller behind a request that passed [`AuthMiddleware`](super::auth::AuthMiddleware).
#[derive(Clone)]
pub struct AuthenticatedUser {
    pub user_id: ObjectId,
}

impl FromRequest for AuthenticatedUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let user = match req.extensions().get::<Claims>() {
            Some(claims) => ObjectId::parse_str(&claims.user_id)
                .map(|user_id| AuthenticatedUser { user_id })
                .map_err(|_| ApiError::Unauthorized("Token invalid or expired".to_string())),
            None => Err(ApiError::Unauthorized("User not authenticated".to_string())),
        };
        ready(user.map_err(Error::from))
    }
}
