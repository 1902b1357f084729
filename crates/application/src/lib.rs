//! Application layer: repository seams, the integrity validator, rating
//! aggregation and the use-case services.

pub mod aggregate;
pub mod clock;
pub mod error;
pub mod password;
pub mod repository;
pub mod services;
pub mod validation;

pub use clock::{Clock, SystemClock};
pub use error::ApplicationError;
pub use password::{PasswordHasher, PasswordHasherError};
pub use repository::{
    CatalogRepository, ProfessorAverage, ProfessorModuleAverage, RatingRepository,
    SessionRepository, UserRepository,
};
pub use validation::{RatingSubmission, RawRatingSubmission};
