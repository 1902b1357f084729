use std::sync::Arc;

use application::services::{RatingService, UserService};

/// Shared handler state. Both services are behind `Arc` so the state stays
/// cheap to clone per request.
#[derive(Clone)]
pub struct AppState {
    pub rating_service: Arc<RatingService>,
    pub user_service: Arc<UserService>,
}

impl AppState {
    pub fn new(rating_service: Arc<RatingService>, user_service: Arc<UserService>) -> Self {
        Self {
            rating_service,
            user_service,
        }
    }
}
