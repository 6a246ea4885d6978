use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, oid::ObjectId},
    error::{ErrorKind, WriteError, WriteFailure},
    options::{ClientOptions, IndexOptions, ServerApi, ServerApiVersion},
    Client, Collection, Database, IndexModel,
};
use std::time::Duration;

use super::{StoreError, TripStore, UserStore};
use crate::models::{trip::Trip, user::User};

const TRIPS: &str = "trips";
const USERS: &str = "users";
const DUPLICATE_KEY: i32 = 11000;

pub async fn create_mongo_client(uri: &str) -> Result<Client, mongodb::error::Error> {
    log::info!("Connecting to MongoDB");

    let mut client_options = ClientOptions::parse(uri).await?;

    client_options.connect_timeout = Some(Duration::from_secs(10));
    client_options.server_selection_timeout = Some(Duration::from_secs(10));
    client_options.max_pool_size = Some(10);
    client_options.min_pool_size = Some(1);

    // Set the server API if using MongoDB 5.0+
    let server_api = ServerApi::builder().version(ServerApiVersion::V1).build();
    client_options.server_api = Some(server_api);

    let client = Client::with_options(client_options)?;

    match client
        .database("admin")
        .run_command(doc! {"ping": 1})
        .await
    {
        Ok(_) => log::info!("Connected to MongoDB and verified with ping"),
        Err(e) => log::warn!(
            "Connected to MongoDB but ping failed: {}. Requests may fail until it is reachable",
            e
        ),
    }

    Ok(client)
}

/// Trip and user storage backed by one MongoDB database.
#[derive(Clone)]
pub struct MongoStore {
    db: Database,
}

impl MongoStore {
    pub fn new(client: &Client, database: &str) -> Self {
        Self {
            db: client.database(database),
        }
    }

    fn trips(&self) -> Collection<Trip> {
        self.db.collection(TRIPS)
    }

    fn users(&self) -> Collection<User> {
        self.db.collection(USERS)
    }

    /// Creates the unique email index and the owner/createdAt index used by
    /// trip listing.
    pub async fn ensure_indexes(&self) -> Result<(), StoreError> {
        let unique_email = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        self.users().create_index(unique_email).await?;

        let by_owner = IndexModel::builder()
            .keys(doc! { "user": 1, "createdAt": -1 })
            .build();
        self.trips().create_index(by_owner).await?;

        Ok(())
    }
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    matches!(
        err.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(WriteError { code, .. })) if *code == DUPLICATE_KEY
    )
}

#[async_trait]
impl TripStore for MongoStore {
    async fn create(&self, trip: &Trip) -> Result<ObjectId, StoreError> {
        let result = self.trips().insert_one(trip).await?;
        result
            .inserted_id
            .as_object_id()
            .ok_or(StoreError::MissingId)
    }

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<Trip>, StoreError> {
        Ok(self.trips().find_one(doc! { "_id": id }).await?)
    }

    async fn save(&self, trip: &Trip) -> Result<(), StoreError> {
        let id = trip.id.ok_or(StoreError::MissingId)?;
        let result = self.trips().replace_one(doc! { "_id": id }, trip).await?;
        if result.matched_count == 0 {
            return Err(StoreError::NotFound("Trip"));
        }
        Ok(())
    }

    async fn delete(&self, id: &ObjectId) -> Result<(), StoreError> {
        self.trips().delete_one(doc! { "_id": id }).await?;
        Ok(())
    }

    async fn list_by_owner(&self, owner: &ObjectId) -> Result<Vec<Trip>, StoreError> {
        let cursor = self
            .trips()
            .find(doc! { "user": owner })
            .sort(doc! { "createdAt": -1 })
            .await?;
        let trips: Vec<Trip> = cursor.try_collect().await?;
        Ok(trips)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.db.run_command(doc! { "ping": 1 }).await?;
        Ok(())
    }
}

#[async_trait]
impl UserStore for MongoStore {
    async fn insert(&self, user: &User) -> Result<ObjectId, StoreError> {
        match self.users().insert_one(user).await {
            Ok(result) => result
                .inserted_id
                .as_object_id()
                .ok_or(StoreError::MissingId),
            Err(err) if is_duplicate_key(&err) => Err(StoreError::Duplicate("User".to_string())),
            Err(err) => Err(err.into()),
        }
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self.users().find_one(doc! { "email": email }).await?)
    }

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<User>, StoreError> {
        Ok(self.users().find_one(doc! { "_id": id }).await?)
    }
}
