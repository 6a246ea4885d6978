pub mod mongo;

use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use thiserror::Error;

use crate::models::{trip::Trip, user::User};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0} already exists")]
    Duplicate(String),
    #[error("record has no id")]
    MissingId,
    #[error("database error: {0}")]
    Database(#[from] mongodb::error::Error),
    #[error("{0} not found")]
    NotFound(&'static str),
}

/// Persistence for trip records. Field values round-trip exactly as written.
#[async_trait]
pub trait TripStore: Send + Sync {
    async fn create(&self, trip: &Trip) -> Result<ObjectId, StoreError>;
    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<Trip>, StoreError>;
    /// Replaces the stored record with the same id in a single write. Fails
    /// with [`StoreError::NotFound`] when no record has that id.
    async fn save(&self, trip: &Trip) -> Result<(), StoreError>;
    async fn delete(&self, id: &ObjectId) -> Result<(), StoreError>;
    /// Trips owned by `owner`, newest first.
    async fn list_by_owner(&self, owner: &ObjectId) -> Result<Vec<Trip>, StoreError>;
    async fn ping(&self) -> Result<(), StoreError>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fails with [`StoreError::Duplicate`] when the email is taken.
    async fn insert(&self, user: &User) -> Result<ObjectId, StoreError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<User>, StoreError>;
}
