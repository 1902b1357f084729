//! The wire protocol against the rating service.
//!
//! Cookies are managed by hand through [`SessionState`] so every transition
//! of the session lifecycle stays observable. Token-bearing requests fail
//! closed: a missing token at call time is a local error, not a request.

use reqwest::header::SET_COOKIE;
use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

use crate::session::{ProtocolState, SessionState};

const CSRF_HEADER: &str = "X-CSRFToken";

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Network request failed. Please check the service URL and try again.")]
    Transport(#[from] reqwest::Error),
    #[error("{0}")]
    Auth(String),
    #[error("{0}")]
    Api(String),
    #[error("No service selected. Use: login <url>")]
    NoBaseUrl,
}

#[derive(Debug, Deserialize)]
pub struct TaughtByRow {
    pub professor_code: String,
    pub professor_name: String,
}

#[derive(Debug, Deserialize)]
pub struct ModuleInstanceRow {
    pub module_code: String,
    pub module_name: String,
    pub academic_year: i32,
    pub semester: i16,
    pub taught_by: Vec<TaughtByRow>,
}

#[derive(Debug, Deserialize)]
pub struct ProfessorRatingRow {
    pub professor_code: String,
    pub name: String,
    pub rating: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct ProfessorModuleRatingRow {
    pub module_code: String,
    pub module_name: String,
    pub professor_code: String,
    pub professor_name: String,
    pub rating: Option<i32>,
}

#[derive(Deserialize)]
struct ModuleInstancesEnvelope {
    module_instances: Vec<ModuleInstanceRow>,
}

#[derive(Deserialize)]
struct ProfessorRatingsEnvelope {
    all_professor_ratings: Vec<ProfessorRatingRow>,
}

#[derive(Deserialize)]
struct ProfessorModuleRatingEnvelope {
    professor_module_rating: Vec<ProfessorModuleRatingRow>,
}

fn set_cookie_value(headers: &reqwest::header::HeaderMap, name: &str) -> Option<String> {
    for header in headers.get_all(SET_COOKIE) {
        let Ok(raw) = header.to_str() else { continue };
        let Some(first) = raw.split(';').next() else {
            continue;
        };
        if let Some((key, value)) = first.split_once('=') {
            if key == name {
                return Some(value.to_owned());
            }
        }
    }
    None
}

async fn api_error(response: reqwest::Response) -> ClientError {
    #[derive(Deserialize)]
    struct ErrorEnvelope {
        error: String,
    }
    match response.json::<ErrorEnvelope>().await {
        Ok(envelope) => ClientError::Api(envelope.error),
        Err(_) => ClientError::Api("The service returned an unexpected response.".to_owned()),
    }
}

pub struct ApiClient {
    http: reqwest::Client,
    pub session: SessionState,
}

impl Default for ApiClient {
    fn default() -> Self {
        Self::new()
    }
}

impl ApiClient {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
            session: SessionState::default(),
        }
    }

    fn url(&self, path: &str) -> Result<String, ClientError> {
        let base = self.session.base_url.as_deref().ok_or(ClientError::NoBaseUrl)?;
        Ok(format!("{base}/api/v1{path}"))
    }

    fn csrf_token(&self) -> Result<String, ClientError> {
        self.session
            .csrf_token
            .clone()
            .ok_or_else(|| ClientError::Auth("No CSRF token held. Please log in first.".to_owned()))
    }

    /// Fetches the login form to acquire a fresh CSRF token.
    async fn fetch_login_form(&mut self) -> Result<(), ClientError> {
        let url = self.url("/auth/login")?;
        let response = self.http.get(url).send().await?;
        let token = set_cookie_value(response.headers(), "csrftoken").ok_or_else(|| {
            ClientError::Auth(
                "Login failed: CSRF token could not be found in the login response.".to_owned(),
            )
        })?;
        self.session.token_acquired(token);
        Ok(())
    }

    /// Points the client at a service and authenticates. A failed attempt
    /// drops back to the anonymous state; the next try fetches a fresh
    /// token.
    pub async fn login(
        &mut self,
        url: &str,
        username: &str,
        password: &str,
    ) -> Result<(), ClientError> {
        self.session.set_base_url(url);
        self.fetch_login_form().await?;
        let csrf = self.csrf_token()?;

        let response = self
            .http
            .post(self.url("/auth/login")?)
            .header(CSRF_HEADER, &csrf)
            .header(reqwest::header::COOKIE, self.session.cookie_header())
            .form(&[("username", username), ("password", password)])
            .send()
            .await?;

        if response.status() == StatusCode::OK {
            if let Some(session_id) = set_cookie_value(response.headers(), "sessionid") {
                self.session.authenticated(session_id);
                return Ok(());
            }
        }
        self.session.login_failed();
        Err(ClientError::Auth(
            "Login failed, please ensure you are using a valid username and password.".to_owned(),
        ))
    }

    pub async fn logout(&mut self) -> Result<(), ClientError> {
        if self.session.state() != ProtocolState::Authenticated {
            return Err(ClientError::Auth(
                "Logout failed. Please make sure you are logged in first.".to_owned(),
            ));
        }
        let csrf = self.csrf_token()?;

        let response = self
            .http
            .post(self.url("/auth/logout")?)
            .header(CSRF_HEADER, &csrf)
            .header(reqwest::header::COOKIE, self.session.cookie_header())
            .send()
            .await?;

        if response.status() != StatusCode::OK {
            return Err(api_error(response).await);
        }
        self.session.logged_out();
        Ok(())
    }

    /// Registers a new account. Needs a CSRF token but no session; fetches
    /// a token first when none is held.
    pub async fn register(
        &mut self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<String, ClientError> {
        if self.session.csrf_token.is_none() {
            self.fetch_login_form().await?;
        }
        let csrf = self.csrf_token()?;

        let response = self
            .http
            .post(self.url("/auth/register")?)
            .header(CSRF_HEADER, &csrf)
            .header(reqwest::header::COOKIE, self.session.cookie_header())
            .form(&[
                ("new_username", username),
                ("new_email", email),
                ("new_password", password),
            ])
            .send()
            .await?;

        if response.status() != StatusCode::CREATED {
            return Err(api_error(response).await);
        }
        #[derive(Deserialize)]
        struct Envelope {
            register_user: String,
        }
        let envelope: Envelope = response.json().await?;
        Ok(envelope.register_user)
    }

    /// Submits one rating. Requires the authenticated state; anything less
    /// fails locally without touching the network.
    pub async fn rate(
        &mut self,
        professor_code: &str,
        module_code: &str,
        year: &str,
        semester: &str,
        rating: &str,
    ) -> Result<String, ClientError> {
        if self.session.state() != ProtocolState::Authenticated {
            return Err(ClientError::Auth(
                "User must be logged in to use the rating service.".to_owned(),
            ));
        }
        let csrf = self.csrf_token()?;

        let response = self
            .http
            .post(self.url("/ratings")?)
            .header(CSRF_HEADER, &csrf)
            .header(reqwest::header::COOKIE, self.session.cookie_header())
            .form(&[
                ("professor_code", professor_code),
                ("module_code", module_code),
                ("year", year),
                ("semester", semester),
                ("rating", rating),
            ])
            .send()
            .await?;

        if response.status() != StatusCode::CREATED {
            return Err(api_error(response).await);
        }
        #[derive(Deserialize)]
        struct Envelope {
            rating_created: String,
        }
        let envelope: Envelope = response.json().await?;
        Ok(envelope.rating_created)
    }

    pub async fn list_module_instances(&self) -> Result<Vec<ModuleInstanceRow>, ClientError> {
        let response = self.http.get(self.url("/module-instances")?).send().await?;
        if response.status() != StatusCode::OK {
            return Err(api_error(response).await);
        }
        let envelope: ModuleInstancesEnvelope = response.json().await?;
        Ok(envelope.module_instances)
    }

    pub async fn all_professor_ratings(&self) -> Result<Vec<ProfessorRatingRow>, ClientError> {
        let response = self.http.get(self.url("/professor-ratings")?).send().await?;
        if response.status() != StatusCode::OK {
            return Err(api_error(response).await);
        }
        let envelope: ProfessorRatingsEnvelope = response.json().await?;
        Ok(envelope.all_professor_ratings)
    }

    pub async fn professor_module_rating(
        &self,
        professor_code: &str,
        module_code: &str,
    ) -> Result<Vec<ProfessorModuleRatingRow>, ClientError> {
        let response = self
            .http
            .get(self.url(&format!(
                "/professor-module-rating/{professor_code}/{module_code}"
            ))?)
            .send()
            .await?;
        if response.status() != StatusCode::OK {
            return Err(api_error(response).await);
        }
        let envelope: ProfessorModuleRatingEnvelope = response.json().await?;
        Ok(envelope.professor_module_rating)
    }
}
