//! Domain model for the professor rating service.
//!
//! Entities, value objects and the error taxonomy shared by every layer.

pub mod catalog;
pub mod errors;
pub mod rating;
pub mod user;
pub mod value_objects;

pub use catalog::{Module, ModuleInstance, Professor};
pub use errors::{DomainError, DomainResult, RepositoryError, RepositoryResult};
pub use rating::Rating;
pub use user::{Session, User};
pub use value_objects::{
    AcademicYear, ModuleCode, PasswordHash, ProfessorCode, RatingScore, Semester, Timestamp,
    UserEmail, Username,
};
