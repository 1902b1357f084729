use async_trait::async_trait;
use domain::{
    AcademicYear, ModuleCode, ModuleInstance, Professor, ProfessorCode, Rating, RepositoryError,
    Semester, Session, Timestamp, User, UserEmail, Username,
};
use serde::Serialize;

/// Projection row for the all-professors listing. `rating` is `None` when
/// the professor has no ratings at all; the aggregation never fabricates a
/// zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfessorAverage {
    pub professor_code: String,
    pub name: String,
    pub rating: Option<i32>,
}

/// Projection row for the per-(professor, module) view. One row per
/// distinct teaching combination, pooled across all instances of the
/// module regardless of year and semester.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfessorModuleAverage {
    pub module_code: String,
    pub module_name: String,
    pub professor_code: String,
    pub professor_name: String,
    pub rating: Option<i32>,
}

/// Read access to the seeded catalog.
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    async fn find_professor(
        &self,
        code: &ProfessorCode,
    ) -> Result<Option<Professor>, RepositoryError>;

    async fn find_module_instance(
        &self,
        module_code: &ModuleCode,
        year: AcademicYear,
        semester: Semester,
    ) -> Result<Option<ModuleInstance>, RepositoryError>;

    async fn list_module_instances(&self) -> Result<Vec<ModuleInstance>, RepositoryError>;
}

/// Rating writes and aggregate reads.
///
/// `create` relies on the storage uniqueness constraint for duplicate
/// detection: a unique violation surfaces as `RepositoryError::Conflict`
/// and is the single source of truth, with no read-then-write pre-check.
#[async_trait]
pub trait RatingRepository: Send + Sync {
    async fn create(&self, rating: Rating) -> Result<Rating, RepositoryError>;

    async fn all_professor_averages(&self) -> Result<Vec<ProfessorAverage>, RepositoryError>;

    /// Empty result means the professor teaches no instance of the module;
    /// rows with `rating: None` mean the relationship exists but has no
    /// ratings yet.
    async fn professor_module_averages(
        &self,
        professor_code: &ProfessorCode,
        module_code: &ModuleCode,
    ) -> Result<Vec<ProfessorModuleAverage>, RepositoryError>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: User) -> Result<User, RepositoryError>;
    async fn find_by_username(&self, username: &Username)
        -> Result<Option<User>, RepositoryError>;
    async fn username_exists(&self, username: &Username) -> Result<bool, RepositoryError>;
    async fn email_exists(&self, email: &UserEmail) -> Result<bool, RepositoryError>;
}

#[async_trait]
pub trait SessionRepository: Send + Sync {
    async fn create(&self, session: Session) -> Result<Session, RepositoryError>;
    /// Expired sessions are treated as absent.
    async fn find(&self, token: &str) -> Result<Option<Session>, RepositoryError>;
    async fn delete(&self, token: &str) -> Result<(), RepositoryError>;
    /// Removes every session that expired at or before `now`.
    async fn purge_expired(&self, now: Timestamp) -> Result<(), RepositoryError>;
}
