//! Postgres repositories and the bcrypt password hasher.

pub mod db;
pub mod password;

pub use db::repositories::{
    PgCatalogRepository, PgRatingRepository, PgSessionRepository, PgUserRepository,
};
pub use db::{create_pg_pool, DbPool};
pub use password::BcryptPasswordHasher;
