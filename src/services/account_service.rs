use mongodb::bson::{self, oid::ObjectId};
use regex::Regex;
use std::sync::{Arc, OnceLock};

use crate::db::UserStore;
use crate::error::ApiError;
use crate::middleware::auth::generate_token;
use crate::models::user::{AuthResponse, LoginRequest, RegisterRequest, User, UserProfile};

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]*[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]*[a-zA-Z0-9])?)*$",
        )
        .expect("email pattern is valid")
    })
}

pub fn is_valid_email(email: &str) -> bool {
    email_pattern().is_match(email)
}

pub struct AccountService {
    users: Arc<dyn UserStore>,
    jwt_secret: String,
    hash_cost: u32,
}

impl AccountService {
    pub fn new(users: Arc<dyn UserStore>, jwt_secret: impl Into<String>) -> Self {
        Self {
            users,
            jwt_secret: jwt_secret.into(),
            hash_cost: bcrypt::DEFAULT_COST,
        }
    }

    /// Lowers the bcrypt cost, for tests.
    pub fn with_hash_cost(mut self, cost: u32) -> Self {
        self.hash_cost = cost;
        self
    }

    pub async fn register(&self, request: RegisterRequest) -> Result<AuthResponse, ApiError> {
        let email = normalize_email(request.email.as_deref());
        if !is_valid_email(&email) {
            return Err(ApiError::Validation("Invalid email address".to_string()));
        }
        let password = request.password.unwrap_or_default();
        if password.is_empty() {
            return Err(ApiError::Validation("Password is required".to_string()));
        }

        let password_hash = bcrypt::hash(&password, self.hash_cost)
            .map_err(|e| ApiError::Internal(format!("password hashing failed: {}", e)))?;

        let now = bson::DateTime::now();
        let mut user = User {
            id: None,
            name: request
                .name
                .map(|name| name.trim().to_string())
                .filter(|name| !name.is_empty()),
            email,
            password_hash,
            created_at: Some(now),
            updated_at: Some(now),
        };
        user.id = Some(self.users.insert(&user).await?);

        log::info!("Registered user {}", user.email);
        self.auth_response(&user)
    }

    pub async fn login(&self, request: LoginRequest) -> Result<AuthResponse, ApiError> {
        let email = normalize_email(request.email.as_deref());
        let password = request.password.unwrap_or_default();
        if email.is_empty() || password.is_empty() {
            return Err(ApiError::Validation("Email and password are required".to_string()));
        }

        let invalid = || ApiError::Unauthorized("Invalid credentials".to_string());
        let user = self.users.find_by_email(&email).await?.ok_or_else(invalid)?;

        if !bcrypt::verify(&password, &user.password_hash).unwrap_or(false) {
            log::warn!("Failed sign in for {}", email);
            return Err(invalid());
        }

        self.auth_response(&user)
    }

    pub async fn profile(&self, user_id: &ObjectId) -> Result<UserProfile, ApiError> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(ApiError::NotFound("User"))?;
        Ok(UserProfile::from(&user))
    }

    fn auth_response(&self, user: &User) -> Result<AuthResponse, ApiError> {
        let id = user
            .id
            .ok_or_else(|| ApiError::Internal("user has no id".to_string()))?;
        let token = generate_token(&self.jwt_secret, &user.email, &id)
            .map_err(|e| ApiError::Internal(format!("token generation failed: {}", e)))?;

        Ok(AuthResponse {
            token,
            user: UserProfile::from(user),
        })
    }
}

fn normalize_email(email: Option<&str>) -> String {
    email.unwrap_or_default().trim().to_lowercase()
}
