use domain::RepositoryError;

mod catalog_repository_impl;
mod rating_repository_impl;
mod session_repository_impl;
mod user_repository_impl;

pub use catalog_repository_impl::PgCatalogRepository;
pub use rating_repository_impl::PgRatingRepository;
pub use session_repository_impl::PgSessionRepository;
pub use user_repository_impl::PgUserRepository;

/// Postgres unique-violation SQLSTATE.
const UNIQUE_VIOLATION: &str = "23505";

/// Maps a sqlx failure onto the repository taxonomy. Unique violations
/// become `Conflict` so the constraint itself is the source of truth for
/// duplicates.
pub(crate) fn storage_error(err: sqlx::Error) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = err {
        if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) {
            return RepositoryError::Conflict;
        }
    }
    RepositoryError::storage(err.to_string())
}

/// Catalog rows are seeded and trusted; a row that fails value-object
/// validation indicates corrupt storage, not caller error.
pub(crate) fn corrupt_row(err: domain::DomainError) -> RepositoryError {
    RepositoryError::storage(format!("corrupt row: {err}"))
}
