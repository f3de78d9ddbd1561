use super::util::is_dup_key;
use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use chrono::{DateTime, Utc};
use sqlx::mysql::MySqlRow;
use sqlx::{MySqlPool, Row};

pub struct MySqlUserRepo {
    pool: MySqlPool,
}

impl MySqlUserRepo {
    pub fn new(pool: MySqlPool) -> Self {
        MySqlUserRepo { pool }
    }
}

fn row_to_record(row: &MySqlRow) -> UserRecord {
    UserRecord {
        user_id: row.get::<UserId, _>("user_id"),
        username: row.get::<String, _>("username"),
        email: row.get::<String, _>("email"),
        password_hash: row.get::<String, _>("password_hash"),
        current_refresh_token: row.get::<Option<String>, _>("current_refresh_token"),
        created_at: row.get::<DateTime<Utc>, _>("created_at"),
    }
}

const SELECT_COLUMNS: &str =
    "user_id, username, email, password_hash, current_refresh_token, created_at";

#[async_trait::async_trait]
impl UserRepo for MySqlUserRepo {
    async fn create(&self, record: &UserRecord) -> Result<(), AuthError> {
        sqlx::query(
            r#"
INSERT INTO user (user_id, username, email, password_hash, created_at)
VALUES (?, ?, ?, ?, ?)
"#,
        )
        .bind(record.user_id)
        .bind(&record.username)
        .bind(&record.email)
        .bind(&record.password_hash)
        .bind(record.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_dup_key(&e) {
                AuthError::UserExists
            } else {
                AuthError::Store(e.to_string())
            }
        })?;

        Ok(())
    }

    async fn find_by_id(&self, user_id: UserId) -> Result<Option<UserRecord>, AuthError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM user WHERE user_id = ?",
            SELECT_COLUMNS
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AuthError::Store(format!("query user by id: {e}")))?;

        Ok(row.as_ref().map(row_to_record))
    }

    async fn find_by_username_or_email(
        &self,
        username: Option<&str>,
        email: Option<&str>,
    ) -> Result<Option<UserRecord>, AuthError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM user WHERE username = ? OR email = ?",
            SELECT_COLUMNS
        ))
        .bind(username)
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AuthError::Store(format!("query user by identifier: {e}")))?;

        Ok(row.as_ref().map(row_to_record))
    }

    async fn set_refresh_token(
        &self,
        user_id: UserId,
        token: Option<&str>,
    ) -> Result<(), AuthError> {
        // No affected-rows check: MySQL reports changed rows, and clearing
        // an already-empty slot is a legitimate no-op (idempotent logout).
        sqlx::query("UPDATE user SET current_refresh_token = ? WHERE user_id = ?")
            .bind(token)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AuthError::Store(format!("write refresh token: {e}")))?;

        Ok(())
    }

    async fn swap_refresh_token(
        &self,
        user_id: UserId,
        current: &str,
        next: &str,
    ) -> Result<bool, AuthError> {
        // The conditional UPDATE is the rotation's atomicity guarantee: two
        // concurrent swaps from the same value leave exactly one winner.
        let result = sqlx::query(
            r#"
UPDATE user
SET current_refresh_token = ?
WHERE user_id = ? AND current_refresh_token = ?
"#,
        )
        .bind(next)
        .bind(user_id)
        .bind(current)
        .execute(&self.pool)
        .await
        .map_err(|e| AuthError::Store(format!("swap refresh token: {e}")))?;

        Ok(result.rows_affected() == 1)
    }
}
