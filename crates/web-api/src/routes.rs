use axum::extract::{Path, State};
use axum::http::header::SET_COOKIE;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{AppendHeaders, IntoResponse};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::trace::TraceLayer;

use application::services::{AuthenticateUserRequest, RegisterUserRequest};
use application::RawRatingSubmission;
use domain::ModuleInstance;

use crate::auth::{
    expire_cookie, generate_token, session_user, set_csrf_cookie, set_session_cookie, verify_csrf,
    CSRF_COOKIE, SESSION_COOKIE,
};
use crate::error::ApiError;
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/api/v1", api_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", get(login_form).post(login))
        .route("/auth/logout", post(logout))
        .route("/auth/register", post(register))
        .route("/module-instances", get(list_module_instances))
        .route("/professor-ratings", get(all_professor_ratings))
        .route(
            "/professor-module-rating/{professor_code}/{module_code}",
            get(professor_module_rating),
        )
        .route("/ratings", post(rate_professor))
}

async fn health() -> &'static str {
    "OK"
}

#[derive(Serialize)]
struct TaughtByDto {
    professor_code: String,
    professor_name: String,
}

#[derive(Serialize)]
struct ModuleInstanceDto {
    module_code: String,
    module_name: String,
    academic_year: i32,
    semester: i16,
    taught_by: Vec<TaughtByDto>,
}

impl From<&ModuleInstance> for ModuleInstanceDto {
    fn from(instance: &ModuleInstance) -> Self {
        Self {
            module_code: instance.module.code.as_str().to_owned(),
            module_name: instance.module.name.clone(),
            academic_year: instance.academic_year.value(),
            semester: instance.semester.number(),
            taught_by: instance
                .professors
                .iter()
                .map(|p| TaughtByDto {
                    professor_code: p.code.as_str().to_owned(),
                    professor_name: p.name.clone(),
                })
                .collect(),
        }
    }
}

async fn list_module_instances(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let instances = state.rating_service.list_module_instances().await?;
    let rows: Vec<ModuleInstanceDto> = instances.iter().map(ModuleInstanceDto::from).collect();
    Ok(Json(json!({ "module_instances": rows })))
}

async fn all_professor_ratings(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let rows = state.rating_service.all_professor_averages().await?;
    Ok(Json(json!({ "all_professor_ratings": rows })))
}

async fn professor_module_rating(
    State(state): State<AppState>,
    Path((professor_code, module_code)): Path<(String, String)>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let rows = state
        .rating_service
        .professor_module_averages(&professor_code, &module_code)
        .await?;
    Ok(Json(json!({ "professor_module_rating": rows })))
}

#[derive(Deserialize)]
struct RateForm {
    professor_code: String,
    module_code: String,
    year: String,
    semester: String,
    rating: String,
}

/// Session first, then CSRF: an anonymous caller learns they must log in
/// before anything else is checked.
async fn rate_professor(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<RateForm>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = session_user(&state, &headers).await?;
    verify_csrf(&headers)?;

    let raw = RawRatingSubmission {
        professor_code: form.professor_code,
        module_code: form.module_code,
        year: form.year,
        semester: form.semester,
        rating: form.rating,
    };
    state.rating_service.submit_rating(user_id, raw).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "rating_created": "Rating successfully added to system." })),
    ))
}

#[derive(Deserialize)]
struct RegisterForm {
    new_username: String,
    new_email: String,
    new_password: String,
}

async fn register(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<RegisterForm>,
) -> Result<impl IntoResponse, ApiError> {
    verify_csrf(&headers)?;

    state
        .user_service
        .register(RegisterUserRequest {
            username: form.new_username,
            email: form.new_email,
            password: form.new_password,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "register_user": "User registered successfully." })),
    ))
}

/// Hands out a fresh CSRF token. Anonymous by design; the token only proves
/// the poster could read our cookies.
async fn login_form() -> impl IntoResponse {
    let token = generate_token();
    (
        AppendHeaders([(SET_COOKIE, set_csrf_cookie(&token))]),
        Json(json!({ "login_form": "CSRF token issued." })),
    )
}

#[derive(Deserialize)]
struct LoginForm {
    username: String,
    password: String,
}

async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<LoginForm>,
) -> Result<impl IntoResponse, ApiError> {
    verify_csrf(&headers)?;

    let session = state
        .user_service
        .login(AuthenticateUserRequest {
            username: form.username,
            password: form.password,
        })
        .await
        .map_err(|err| match err {
            application::ApplicationError::Authentication
            | application::ApplicationError::Domain(_) => ApiError::unauthorized(
                "Login failed, please ensure you are using a valid username and password.",
            ),
            other => other.into(),
        })?;

    let max_age = (session.expires_at - session.created_at).num_seconds();
    Ok((
        AppendHeaders([(SET_COOKIE, set_session_cookie(&session.token, max_age))]),
        Json(json!({ "login": "Login successful." })),
    ))
}

async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let token = crate::auth::cookie_value(&headers, SESSION_COOKIE).ok_or_else(|| {
        ApiError::new(
            StatusCode::UNAUTHORIZED,
            "User must be logged in to use the rating service.",
        )
    })?;
    verify_csrf(&headers)?;

    // an unknown or expired cookie is not a session to end
    state.user_service.authenticate_session(&token).await?;
    state.user_service.logout(&token).await?;

    Ok((
        AppendHeaders([
            (SET_COOKIE, expire_cookie(SESSION_COOKIE)),
            (SET_COOKIE, expire_cookie(CSRF_COOKIE)),
        ]),
        Json(json!({ "logout": "Logout successful." })),
    ))
}
