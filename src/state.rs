use std::sync::Arc;

use crate::config::AiMode;
use crate::db::{TripStore, UserStore};
use crate::services::{
    account_service::AccountService, planner_service::TripPlanner, trip_service::TripService,
};

/// Shared handles given to every actix worker.
pub struct AppState {
    pub trips: TripService,
    pub accounts: AccountService,
    pub trip_store: Arc<dyn TripStore>,
    pub ai_mode: AiMode,
}

impl AppState {
    pub fn new(
        trip_store: Arc<dyn TripStore>,
        user_store: Arc<dyn UserStore>,
        planner: TripPlanner,
        jwt_secret: &str,
        ai_mode: AiMode,
    ) -> Self {
        Self {
            trips: TripService::new(trip_store.clone(), Arc::new(planner)),
            accounts: AccountService::new(user_store, jwt_secret),
            trip_store,
            ai_mode,
        }
    }

    /// Replaces the account service, e.g. to lower the bcrypt cost in tests.
    pub fn with_accounts(mut self, accounts: AccountService) -> Self {
        self.accounts = accounts;
        self
    }
}
