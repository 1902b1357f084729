use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use application::ApplicationError;
use domain::DomainError;

/// An API failure, already resolved to a status code and the message the
/// client will see. Every response body is `{"error": message}`.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

fn domain_error(err: DomainError) -> ApiError {
    match err {
        DomainError::InvalidFormat { field: "rating" } => {
            ApiError::bad_request("Provided rating must be a number between 1 and 5.")
        }
        DomainError::OutOfRange { field: "rating" } => {
            ApiError::bad_request("Provided rating must be between 1 and 5.")
        }
        DomainError::InvalidFormat { field: "year" } => {
            ApiError::bad_request("Provided year must be a year between 2000 and 3000.")
        }
        DomainError::OutOfRange { field: "year" } => {
            ApiError::bad_request("Provided year must be between 2000 and 3000.")
        }
        DomainError::InvalidFormat { field: "semester" }
        | DomainError::OutOfRange { field: "semester" } => {
            ApiError::bad_request("Provided semester must be either 1 or 2.")
        }
        DomainError::InvalidFormat { .. } | DomainError::OutOfRange { .. } => {
            ApiError::bad_request("Provided value is invalid.")
        }
        DomainError::InvalidCode {
            field: "professor code",
        } => ApiError::bad_request("Provided professor code is invalid."),
        DomainError::InvalidCode {
            field: "module code",
        } => ApiError::bad_request("Provided module code is invalid."),
        DomainError::InvalidCode { .. } => ApiError::bad_request(
            "Input data is invalid. Please ensure you have submitted correctly formatted \
             username, email, and password.",
        ),
        DomainError::ProfessorNotFound => ApiError::new(
            StatusCode::NOT_FOUND,
            "Provided professor code is invalid.",
        ),
        DomainError::ModuleInstanceNotFound => ApiError::new(
            StatusCode::NOT_FOUND,
            "Provided module instance is invalid. Please check the module code, year, and semester.",
        ),
        DomainError::NoTeachingRecord {
            professor_code,
            module_code,
        } => ApiError::new(
            StatusCode::NOT_FOUND,
            format!("Professor {professor_code} does not teach Module {module_code}"),
        ),
        DomainError::ProfessorNotOnInstance => {
            ApiError::bad_request("The selected professor does not teach this module instance.")
        }
        DomainError::DuplicateRating => ApiError::new(
            StatusCode::CONFLICT,
            "This rating has previously been made for this professor and module instance.",
        ),
        DomainError::UsernameTaken => ApiError::new(
            StatusCode::CONFLICT,
            "Username already in use. Please use a different username.",
        ),
        DomainError::EmailTaken => ApiError::new(
            StatusCode::CONFLICT,
            "Email already in use. Please register with a different email.",
        ),
    }
}

impl From<ApplicationError> for ApiError {
    fn from(err: ApplicationError) -> Self {
        match err {
            ApplicationError::Domain(domain) => domain_error(domain),
            ApplicationError::Repository(repo) => {
                tracing::error!(error = %repo, "storage failure");
                ApiError::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database encountered an error.",
                )
            }
            ApplicationError::Password(hash) => {
                tracing::error!(error = %hash, "password hashing failure");
                ApiError::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An unexpected error occurred.",
                )
            }
            ApplicationError::Authentication => {
                ApiError::unauthorized("Session is invalid or has expired.")
            }
        }
    }
}
