//! In-memory repositories and request helpers for router tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use tower::util::ServiceExt;
use uuid::Uuid;

use application::aggregate::rounded_average;
use application::services::{
    RatingService, RatingServiceDependencies, UserService, UserServiceDependencies,
};
use application::{
    CatalogRepository, PasswordHasher, PasswordHasherError, ProfessorAverage,
    ProfessorModuleAverage, RatingRepository, SessionRepository, SystemClock, UserRepository,
};
use domain::{
    AcademicYear, Module, ModuleCode, ModuleInstance, PasswordHash, Professor, ProfessorCode,
    Rating, RepositoryError, Semester, Session, Timestamp, User, UserEmail, Username,
};
use web_api::{router, AppState};

pub struct MemoryCatalog {
    pub professors: Vec<Professor>,
    pub instances: Vec<ModuleInstance>,
}

#[async_trait]
impl CatalogRepository for MemoryCatalog {
    async fn find_professor(
        &self,
        code: &ProfessorCode,
    ) -> Result<Option<Professor>, RepositoryError> {
        Ok(self.professors.iter().find(|p| &p.code == code).cloned())
    }

    async fn find_module_instance(
        &self,
        module_code: &ModuleCode,
        year: AcademicYear,
        semester: Semester,
    ) -> Result<Option<ModuleInstance>, RepositoryError> {
        Ok(self
            .instances
            .iter()
            .find(|i| {
                &i.module.code == module_code && i.academic_year == year && i.semester == semester
            })
            .cloned())
    }

    async fn list_module_instances(&self) -> Result<Vec<ModuleInstance>, RepositoryError> {
        Ok(self.instances.clone())
    }
}

#[derive(Default)]
pub struct MemoryRatings {
    pub catalog: Vec<ModuleInstance>,
    pub rows: Mutex<Vec<Rating>>,
}

#[async_trait]
impl RatingRepository for MemoryRatings {
    async fn create(&self, rating: Rating) -> Result<Rating, RepositoryError> {
        let mut rows = self.rows.lock().unwrap();
        let duplicate = rows.iter().any(|r| {
            r.user_id == rating.user_id
                && r.module_instance_id == rating.module_instance_id
                && r.professor_id == rating.professor_id
        });
        if duplicate {
            return Err(RepositoryError::Conflict);
        }
        rows.push(rating.clone());
        Ok(rating)
    }

    async fn all_professor_averages(&self) -> Result<Vec<ProfessorAverage>, RepositoryError> {
        let rows = self.rows.lock().unwrap();
        let mut seen: Vec<&Professor> = Vec::new();
        for instance in &self.catalog {
            for professor in &instance.professors {
                if !seen.iter().any(|p| p.id == professor.id) {
                    seen.push(professor);
                }
            }
        }
        Ok(seen
            .into_iter()
            .map(|professor| {
                let scores: Vec<i32> = rows
                    .iter()
                    .filter(|r| r.professor_id == professor.id)
                    .map(|r| i32::from(r.score.value()))
                    .collect();
                ProfessorAverage {
                    professor_code: professor.code.as_str().to_owned(),
                    name: professor.name.clone(),
                    rating: rounded_average(scores),
                }
            })
            .collect())
    }

    async fn professor_module_averages(
        &self,
        professor_code: &ProfessorCode,
        module_code: &ModuleCode,
    ) -> Result<Vec<ProfessorModuleAverage>, RepositoryError> {
        let rows = self.rows.lock().unwrap();
        let mut result = Vec::new();
        for instance in &self.catalog {
            if &instance.module.code != module_code {
                continue;
            }
            for professor in &instance.professors {
                if &professor.code != professor_code {
                    continue;
                }
                if result.is_empty() {
                    let scores: Vec<i32> = rows
                        .iter()
                        .filter(|r| {
                            r.professor_id == professor.id
                                && self.catalog.iter().any(|i| {
                                    i.id == r.module_instance_id && &i.module.code == module_code
                                })
                        })
                        .map(|r| i32::from(r.score.value()))
                        .collect();
                    result.push(ProfessorModuleAverage {
                        module_code: instance.module.code.as_str().to_owned(),
                        module_name: instance.module.name.clone(),
                        professor_code: professor.code.as_str().to_owned(),
                        professor_name: professor.name.clone(),
                        rating: rounded_average(scores),
                    });
                }
            }
        }
        Ok(result)
    }
}

#[derive(Default)]
pub struct MemoryUsers {
    pub rows: Mutex<Vec<User>>,
}

#[async_trait]
impl UserRepository for MemoryUsers {
    async fn create(&self, user: User) -> Result<User, RepositoryError> {
        let mut rows = self.rows.lock().unwrap();
        if rows
            .iter()
            .any(|u| u.username == user.username || u.email == user.email)
        {
            return Err(RepositoryError::Conflict);
        }
        rows.push(user.clone());
        Ok(user)
    }

    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<User>, RepositoryError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|u| &u.username == username)
            .cloned())
    }

    async fn username_exists(&self, username: &Username) -> Result<bool, RepositoryError> {
        Ok(self.find_by_username(username).await?.is_some())
    }

    async fn email_exists(&self, email: &UserEmail) -> Result<bool, RepositoryError> {
        Ok(self.rows.lock().unwrap().iter().any(|u| &u.email == email))
    }
}

#[derive(Default)]
pub struct MemorySessions {
    pub rows: Mutex<HashMap<String, Session>>,
}

#[async_trait]
impl SessionRepository for MemorySessions {
    async fn create(&self, session: Session) -> Result<Session, RepositoryError> {
        self.rows
            .lock()
            .unwrap()
            .insert(session.token.clone(), session.clone());
        Ok(session)
    }

    async fn find(&self, token: &str) -> Result<Option<Session>, RepositoryError> {
        Ok(self.rows.lock().unwrap().get(token).cloned())
    }

    async fn delete(&self, token: &str) -> Result<(), RepositoryError> {
        self.rows.lock().unwrap().remove(token);
        Ok(())
    }

    async fn purge_expired(&self, now: Timestamp) -> Result<(), RepositoryError> {
        self.rows.lock().unwrap().retain(|_, s| !s.is_expired(now));
        Ok(())
    }
}

/// Reversible stand-in for bcrypt so tests stay fast.
pub struct PlainHasher;

#[async_trait]
impl PasswordHasher for PlainHasher {
    async fn hash(&self, password: &str) -> Result<PasswordHash, PasswordHasherError> {
        PasswordHash::new(format!("plain:{password}"))
            .map_err(|err| PasswordHasherError::Hash(err.to_string()))
    }

    async fn verify(
        &self,
        password: &str,
        hash: &PasswordHash,
    ) -> Result<bool, PasswordHasherError> {
        Ok(hash.as_str() == format!("plain:{password}"))
    }
}

pub fn professor(name: &str, code: &str) -> Professor {
    Professor {
        id: Uuid::new_v4(),
        name: name.to_owned(),
        code: ProfessorCode::parse(code).unwrap(),
    }
}

pub fn instance(
    module_name: &str,
    module_code: &str,
    year: i32,
    semester: i32,
    professors: Vec<Professor>,
) -> ModuleInstance {
    ModuleInstance {
        id: Uuid::new_v4(),
        module: Module {
            id: Uuid::new_v4(),
            name: module_name.to_owned(),
            code: ModuleCode::parse(module_code).unwrap(),
        },
        academic_year: AcademicYear::new(year).unwrap(),
        semester: Semester::new(semester).unwrap(),
        professors,
    }
}

/// A router over a catalog where Smith (P001) teaches CS101 in 2024
/// semester 1 and Jones (P002) teaches nothing.
pub fn seeded_app() -> Router {
    let smith = professor("Smith", "P001");
    let jones = professor("Jones", "P002");
    let cs101 = instance("Intro to CS", "CS101", 2024, 1, vec![smith.clone()]);

    let catalog = Arc::new(MemoryCatalog {
        professors: vec![smith, jones],
        instances: vec![cs101.clone()],
    });
    let ratings = Arc::new(MemoryRatings {
        catalog: vec![cs101],
        rows: Mutex::new(Vec::new()),
    });

    let rating_service = Arc::new(RatingService::new(RatingServiceDependencies {
        catalog_repository: catalog,
        rating_repository: ratings,
    }));
    let user_service = Arc::new(UserService::new(UserServiceDependencies {
        user_repository: Arc::new(MemoryUsers::default()),
        session_repository: Arc::new(MemorySessions::default()),
        password_hasher: Arc::new(PlainHasher),
        clock: Arc::new(SystemClock),
        session_ttl: chrono::Duration::hours(24),
    }));

    router(AppState::new(rating_service, user_service))
}

pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

pub fn get(path: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(path)
        .body(Body::empty())
        .unwrap()
}

pub fn post_form(path: &str, body: &str, headers: &[(&str, &str)]) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(path)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    builder.body(Body::from(body.to_owned())).unwrap()
}

/// Registers and logs in a user, returning (csrf_token, session_id).
pub async fn authenticated_cookies(app: &Router, username: &str) -> (String, String) {
    let response = app.clone().oneshot(get("/api/v1/auth/login")).await.unwrap();
    let csrf = cookie_from_response(response.headers(), "csrftoken").unwrap();

    let csrf_cookie = format!("csrftoken={csrf}");
    let headers: [(&str, &str); 2] = [("cookie", csrf_cookie.as_str()), ("x-csrftoken", &csrf)];

    let body = format!(
        "new_username={username}&new_email={username}%40example.com&new_password=pw123456"
    );
    let (status, _) = send(app, post_form("/api/v1/auth/register", &body, &headers)).await;
    assert_eq!(status, StatusCode::CREATED);

    let login_body = format!("username={username}&password=pw123456");
    let response = app
        .clone()
        .oneshot(post_form("/api/v1/auth/login", &login_body, &headers))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let session = cookie_from_response(response.headers(), "sessionid").unwrap();
    (csrf, session)
}

pub fn cookie_from_response(headers: &axum::http::HeaderMap, name: &str) -> Option<String> {
    for header in headers.get_all(header::SET_COOKIE) {
        let raw = header.to_str().ok()?;
        let first = raw.split(';').next()?;
        if let Some((key, value)) = first.split_once('=') {
            if key == name {
                return Some(value.to_owned());
            }
        }
    }
    None
}
