use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::value_objects::{PasswordHash, Timestamp, UserEmail, Username};

/// A registered student account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: Username,
    pub email: UserEmail,
    #[serde(skip_serializing)]
    pub password_hash: PasswordHash,
    pub created_at: Timestamp,
}

impl User {
    pub fn register(
        id: Uuid,
        username: Username,
        email: UserEmail,
        password_hash: PasswordHash,
        now: Timestamp,
    ) -> Self {
        Self {
            id,
            username,
            email,
            password_hash,
            created_at: now,
        }
    }
}

/// A server-side session record behind the `sessionid` cookie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user_id: Uuid,
    pub created_at: Timestamp,
    pub expires_at: Timestamp,
}

impl Session {
    pub fn issue(token: String, user_id: Uuid, now: Timestamp, ttl: chrono::Duration) -> Self {
        Self {
            token,
            user_id,
            created_at: now,
            expires_at: now + ttl,
        }
    }

    pub fn is_expired(&self, now: Timestamp) -> bool {
        now >= self.expires_at
    }
}
