//! HTTP surface: router, JSON envelopes, error mapping and auth guards.

pub mod auth;
pub mod error;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::router;
pub use state::AppState;
