use async_trait::async_trait;
use sqlx::FromRow;
use uuid::Uuid;

use application::UserRepository;
use domain::{PasswordHash, RepositoryError, Timestamp, User, UserEmail, Username};

use crate::db::DbPool;

use super::{corrupt_row, storage_error};

pub struct PgUserRepository {
    pool: DbPool,
}

impl PgUserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct DbUser {
    id: Uuid,
    username: String,
    email: String,
    password_hash: String,
    created_at: Timestamp,
}

impl DbUser {
    fn into_domain(self) -> Result<User, RepositoryError> {
        Ok(User {
            id: self.id,
            username: Username::parse(self.username).map_err(corrupt_row)?,
            email: UserEmail::parse(self.email).map_err(corrupt_row)?,
            password_hash: PasswordHash::new(self.password_hash).map_err(corrupt_row)?,
            created_at: self.created_at,
        })
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create(&self, user: User) -> Result<User, RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO users (id, username, email, password_hash, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(user.id)
        .bind(user.username.as_str())
        .bind(user.email.as_str())
        .bind(user.password_hash.as_str())
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(storage_error)?;

        Ok(user)
    }

    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, DbUser>(
            r#"
            SELECT id, username, email, password_hash, created_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_error)?;

        row.map(DbUser::into_domain).transpose()
    }

    async fn username_exists(&self, username: &Username) -> Result<bool, RepositoryError> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE username = $1)")
            .bind(username.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(storage_error)
    }

    async fn email_exists(&self, email: &UserEmail) -> Result<bool, RepositoryError> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
            .bind(email.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(storage_error)
    }
}
