#![allow(dead_code)]

use actix_web::{test, web, App};
use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use serde_json::Value;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use trip_planner_api::{
    config::{AiMode, GeminiSettings},
    db::{StoreError, TripStore, UserStore},
    models::{trip::Trip, user::User},
    routes,
    services::{
        account_service::AccountService,
        gemini_service::{AiError, AiTransport, Delay, GeminiClient, RetryPolicy},
        planner_service::TripPlanner,
    },
    state::AppState,
};

pub const JWT_SECRET: &str = "test-secret";
pub const AI_ENDPOINT: &str = "https://ai.test/v1beta/models/gemini:generateContent";

#[derive(Default)]
pub struct InMemoryTripStore {
    trips: Mutex<Vec<Trip>>,
    pub fail_writes: Mutex<bool>,
    /// Drops the record right after the next lookup, as a concurrent delete would.
    pub vanish_after_read: Mutex<bool>,
}

impl InMemoryTripStore {
    pub fn all(&self) -> Vec<Trip> {
        self.trips.lock().unwrap().clone()
    }

    pub fn get(&self, id: &ObjectId) -> Option<Trip> {
        self.trips
            .lock()
            .unwrap()
            .iter()
            .find(|trip| trip.id.as_ref() == Some(id))
            .cloned()
    }

    fn check_writes(&self) -> Result<(), StoreError> {
        if *self.fail_writes.lock().unwrap() {
            return Err(StoreError::Database(mongodb::error::Error::custom(
                "writes disabled",
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl TripStore for InMemoryTripStore {
    async fn create(&self, trip: &Trip) -> Result<ObjectId, StoreError> {
        self.check_writes()?;
        let id = ObjectId::new();
        let mut stored = trip.clone();
        stored.id = Some(id);
        self.trips.lock().unwrap().push(stored);
        Ok(id)
    }

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<Trip>, StoreError> {
        let found = self.get(id);
        if std::mem::take(&mut *self.vanish_after_read.lock().unwrap()) {
            self.trips
                .lock()
                .unwrap()
                .retain(|trip| trip.id.as_ref() != Some(id));
        }
        Ok(found)
    }

    async fn save(&self, trip: &Trip) -> Result<(), StoreError> {
        self.check_writes()?;
        let id = trip.id.ok_or(StoreError::MissingId)?;
        let mut trips = self.trips.lock().unwrap();
        let existing = trips
            .iter_mut()
            .find(|t| t.id == Some(id))
            .ok_or(StoreError::NotFound("Trip"))?;
        *existing = trip.clone();
        Ok(())
    }

    async fn delete(&self, id: &ObjectId) -> Result<(), StoreError> {
        self.check_writes()?;
        self.trips
            .lock()
            .unwrap()
            .retain(|trip| trip.id.as_ref() != Some(id));
        Ok(())
    }

    async fn list_by_owner(&self, owner: &ObjectId) -> Result<Vec<Trip>, StoreError> {
        let mut trips: Vec<Trip> = self
            .trips
            .lock()
            .unwrap()
            .iter()
            .filter(|trip| trip.user == *owner)
            .cloned()
            .collect();
        // ObjectIds grow with insertion order, which breaks createdAt ties
        trips.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(trips)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryUserStore {
    users: Mutex<Vec<User>>,
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn insert(&self, user: &User) -> Result<ObjectId, StoreError> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.email == user.email) {
            return Err(StoreError::Duplicate("User".to_string()));
        }
        let id = ObjectId::new();
        let mut stored = user.clone();
        stored.id = Some(id);
        users.push(stored);
        Ok(id)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<User>, StoreError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.id.as_ref() == Some(id))
            .cloned())
    }
}

/// AI transport that replays a fixed list of results and records prompts.
#[derive(Default)]
pub struct ScriptedTransport {
    responses: Mutex<Vec<Result<Value, AiError>>>,
    pub prompts: Mutex<Vec<String>>,
}

impl ScriptedTransport {
    pub fn new(responses: Vec<Result<Value, AiError>>) -> Self {
        Self {
            responses: Mutex::new(responses),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl AiTransport for ScriptedTransport {
    async fn post_prompt(
        &self,
        _endpoint: &str,
        prompt: &str,
        _timeout: Duration,
    ) -> Result<Value, AiError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        let mut queue = self.responses.lock().unwrap();
        if queue.is_empty() {
            return Err(AiError::Transport("script exhausted".to_string()));
        }
        queue.remove(0)
    }
}

#[derive(Default)]
pub struct RecordingDelay {
    pub waits: Mutex<Vec<Duration>>,
}

#[async_trait]
impl Delay for RecordingDelay {
    async fn wait(&self, duration: Duration) {
        self.waits.lock().unwrap().push(duration);
    }
}

pub fn status_error(status: u16) -> Result<Value, AiError> {
    Err(AiError::Status {
        status,
        message: "upstream error".to_string(),
    })
}

pub fn gemini_text(text: &str) -> Result<Value, AiError> {
    Ok(serde_json::json!({
        "candidates": [{ "content": { "parts": [{ "text": text }] } }]
    }))
}

pub enum Ai {
    Mock,
    Live(Vec<Result<Value, AiError>>),
    LiveWithoutEndpoint,
}

pub struct TestApp {
    pub trips: Arc<InMemoryTripStore>,
    pub users: Arc<InMemoryUserStore>,
    pub transport: Arc<ScriptedTransport>,
    pub delay: Arc<RecordingDelay>,
    pub state: web::Data<AppState>,
}

impl TestApp {
    pub fn new(ai: Ai) -> Self {
        let trips = Arc::new(InMemoryTripStore::default());
        let users = Arc::new(InMemoryUserStore::default());
        let delay = Arc::new(RecordingDelay::default());

        let (transport, planner, mode) = match ai {
            Ai::Mock => (
                Arc::new(ScriptedTransport::default()),
                TripPlanner::mock(),
                AiMode::Mock,
            ),
            Ai::Live(responses) => {
                let transport = Arc::new(ScriptedTransport::new(responses));
                let planner = TripPlanner::live(
                    Some(AI_ENDPOINT.to_string()),
                    GeminiClient::new(
                        transport.clone(),
                        delay.clone(),
                        RetryPolicy::from(&GeminiSettings::default()),
                    ),
                );
                (transport, planner, AiMode::Live)
            }
            Ai::LiveWithoutEndpoint => {
                let transport = Arc::new(ScriptedTransport::default());
                let planner = TripPlanner::live(
                    None,
                    GeminiClient::new(
                        transport.clone(),
                        delay.clone(),
                        RetryPolicy::from(&GeminiSettings::default()),
                    ),
                );
                (transport, planner, AiMode::Misconfigured)
            }
        };

        let state = AppState::new(trips.clone(), users.clone(), planner, JWT_SECRET, mode)
            .with_accounts(AccountService::new(users.clone(), JWT_SECRET).with_hash_cost(4));

        Self {
            trips,
            users,
            transport,
            delay,
            state: web::Data::new(state),
        }
    }

    pub fn create_app(
        &self,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new()
            .app_data(self.state.clone())
            .configure(|cfg| routes::config(cfg, JWT_SECRET))
    }
}

/// Registers a user through the API and returns `(bearer header, user id)`.
pub async fn register<S>(app: &S, email: &str) -> (String, String)
where
    S: actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
    >,
{
    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(serde_json::json!({
            "name": "Test Traveler",
            "email": email,
            "password": "testpassword123"
        }))
        .to_request();
    let resp = test::call_service(app, req).await;
    assert_eq!(resp.status(), 201);

    let body: Value = test::read_body_json(resp).await;
    let token = body["token"].as_str().unwrap().to_string();
    let user_id = body["user"]["_id"].as_str().unwrap().to_string();
    (format!("Bearer {}", token), user_id)
}

pub fn paris_request() -> Value {
    serde_json::json!({
        "destination": "Paris",
        "startDate": "2025-06-01",
        "endDate": "2025-06-03",
        "budget": "1500",
        "preferences": "museums"
    })
}
