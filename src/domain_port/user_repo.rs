use crate::application_port::*;
use crate::domain_model::*;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone)]
pub struct UserRecord {
    pub user_id: UserId,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    /// The only refresh token accepted for rotation. Absent until first
    /// login and after logout.
    pub current_refresh_token: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&UserRecord> for PublicUser {
    fn from(record: &UserRecord) -> Self {
        PublicUser {
            user_id: record.user_id,
            username: record.username.clone(),
            email: record.email.clone(),
            created_at: record.created_at,
        }
    }
}

#[async_trait::async_trait]
pub trait UserRepo: Send + Sync {
    /// Insert a new row. A duplicate username or email is `UserExists`.
    async fn create(&self, record: &UserRecord) -> Result<(), AuthError>;

    async fn find_by_id(&self, user_id: UserId) -> Result<Option<UserRecord>, AuthError>;

    async fn find_by_username_or_email(
        &self,
        username: Option<&str>,
        email: Option<&str>,
    ) -> Result<Option<UserRecord>, AuthError>;

    /// Unconditionally overwrite or clear the refresh token slot. Writes
    /// only that column; nothing else on the record is re-validated. A
    /// missing user is a no-op.
    async fn set_refresh_token(
        &self,
        user_id: UserId,
        token: Option<&str>,
    ) -> Result<(), AuthError>;

    /// Compare-and-set the slot from `current` to `next`. `Ok(false)` means
    /// the slot no longer holds `current` (rotated concurrently, cleared by
    /// logout, or never set) and the swap did not happen.
    async fn swap_refresh_token(
        &self,
        user_id: UserId,
        current: &str,
        next: &str,
    ) -> Result<bool, AuthError>;
}
