use std::sync::Arc;

use domain::{DomainError, RepositoryError, Session, User, UserEmail, Username};
use rand::RngCore;
use uuid::Uuid;

use crate::clock::Clock;
use crate::error::ApplicationError;
use crate::password::PasswordHasher;
use crate::repository::{SessionRepository, UserRepository};

#[derive(Debug, Clone)]
pub struct RegisterUserRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct AuthenticateUserRequest {
    pub username: String,
    pub password: String,
}

pub struct UserServiceDependencies {
    pub user_repository: Arc<dyn UserRepository>,
    pub session_repository: Arc<dyn SessionRepository>,
    pub password_hasher: Arc<dyn PasswordHasher>,
    pub clock: Arc<dyn Clock>,
    pub session_ttl: chrono::Duration,
}

/// Registration, credential checks and server-side session lifecycle.
pub struct UserService {
    deps: UserServiceDependencies,
}

fn generate_session_token() -> String {
    let mut bytes = [0u8; 20];
    rand::rng().fill_bytes(&mut bytes);
    data_encoding::HEXLOWER.encode(&bytes)
}

impl UserService {
    pub fn new(deps: UserServiceDependencies) -> Self {
        Self { deps }
    }

    pub async fn register(&self, request: RegisterUserRequest) -> Result<User, ApplicationError> {
        let username = Username::parse(request.username)?;
        let email = UserEmail::parse(request.email)?;

        if self.deps.user_repository.email_exists(&email).await? {
            return Err(DomainError::EmailTaken.into());
        }
        if self.deps.user_repository.username_exists(&username).await? {
            return Err(DomainError::UsernameTaken.into());
        }

        let password_hash = self.deps.password_hasher.hash(&request.password).await?;
        let email_check = email.clone();
        let user = User::register(
            Uuid::new_v4(),
            username,
            email,
            password_hash,
            self.deps.clock.now(),
        );

        // the pre-checks give friendly errors; the unique constraints in
        // storage still decide races, so a conflict here means a concurrent
        // registration won and is classified like the pre-check would have
        match self.deps.user_repository.create(user).await {
            Ok(stored) => {
                tracing::info!(username = %stored.username, "user registered");
                Ok(stored)
            }
            Err(RepositoryError::Conflict) => {
                if self.deps.user_repository.email_exists(&email_check).await? {
                    Err(DomainError::EmailTaken.into())
                } else {
                    Err(DomainError::UsernameTaken.into())
                }
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Verifies credentials and issues a fresh session. Unknown users and
    /// wrong passwords are indistinguishable to the caller.
    pub async fn login(
        &self,
        request: AuthenticateUserRequest,
    ) -> Result<Session, ApplicationError> {
        let username = Username::parse(request.username)?;
        let user = self
            .deps
            .user_repository
            .find_by_username(&username)
            .await?
            .ok_or(ApplicationError::Authentication)?;

        let password_ok = self
            .deps
            .password_hasher
            .verify(&request.password, &user.password_hash)
            .await?;
        if !password_ok {
            return Err(ApplicationError::Authentication);
        }

        // each login sweeps out sessions that have already expired, so the
        // store does not accumulate dead rows between explicit logouts
        let now = self.deps.clock.now();
        self.deps.session_repository.purge_expired(now).await?;

        let session = Session::issue(
            generate_session_token(),
            user.id,
            now,
            self.deps.session_ttl,
        );
        let stored = self.deps.session_repository.create(session).await?;
        Ok(stored)
    }

    /// Resolves a session cookie to the user it belongs to.
    pub async fn authenticate_session(&self, token: &str) -> Result<Uuid, ApplicationError> {
        let session = self
            .deps
            .session_repository
            .find(token)
            .await?
            .ok_or(ApplicationError::Authentication)?;
        if session.is_expired(self.deps.clock.now()) {
            return Err(ApplicationError::Authentication);
        }
        Ok(session.user_id)
    }

    pub async fn logout(&self, token: &str) -> Result<(), ApplicationError> {
        self.deps.session_repository.delete(token).await?;
        Ok(())
    }
}
