mod rating_service;
mod user_service;

pub use rating_service::{RatingService, RatingServiceDependencies};
pub use user_service::{
    AuthenticateUserRequest, RegisterUserRequest, UserService, UserServiceDependencies,
};
