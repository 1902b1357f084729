use thiserror::Error;

/// Classified domain failures. Each variant maps to exactly one API status
/// and message at the web boundary.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A submitted field could not be parsed as an integer.
    #[error("{field} is not a valid integer")]
    InvalidFormat { field: &'static str },

    /// A submitted field parsed but fell outside its allowed bounds.
    #[error("{field} is out of range")]
    OutOfRange { field: &'static str },

    /// A module or professor code failed the code format rules.
    #[error("{field} must be a non-empty alphanumeric code of at most 5 characters")]
    InvalidCode { field: &'static str },

    #[error("professor not found")]
    ProfessorNotFound,

    #[error("module instance not found")]
    ModuleInstanceNotFound,

    /// The professor teaches no instance of the given module.
    #[error("professor {professor_code} does not teach module {module_code}")]
    NoTeachingRecord {
        professor_code: String,
        module_code: String,
    },

    /// Cross-entity invariant: a rating may only target a professor who is
    /// in the module instance's membership set.
    #[error("the selected professor does not teach this module instance")]
    ProfessorNotOnInstance,

    #[error("a rating for this user, professor and module instance already exists")]
    DuplicateRating,

    #[error("username already in use")]
    UsernameTaken,

    #[error("email already in use")]
    EmailTaken,
}

pub type DomainResult<T> = Result<T, DomainError>;

/// Failures surfaced by the persistence layer. `Conflict` is the single
/// source of truth for uniqueness violations; repositories never pre-read
/// to detect duplicates.
#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("requested resource not found")]
    NotFound,

    #[error("resource already exists")]
    Conflict,

    #[error("storage error: {message}")]
    Storage { message: String },
}

impl RepositoryError {
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;
