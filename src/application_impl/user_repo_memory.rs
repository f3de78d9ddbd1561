use crate::application_port::*;
use crate::domain_model::UserId;
use crate::domain_port::{UserRecord, UserRepo};
use dashmap::DashMap;

/// In-memory adapter for the `memory` store backend and for tests. The CAS
/// in `swap_refresh_token` runs under the entry's shard write lock, so it
/// gives the same single-winner guarantee as the SQL conditional UPDATE.
pub struct MemoryUserRepo {
    users: DashMap<UserId, UserRecord>,
}

impl MemoryUserRepo {
    pub fn new() -> Self {
        MemoryUserRepo {
            users: DashMap::new(),
        }
    }
}

impl Default for MemoryUserRepo {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl UserRepo for MemoryUserRepo {
    async fn create(&self, record: &UserRecord) -> Result<(), AuthError> {
        let taken = self.users.iter().any(|entry| {
            entry.username == record.username || entry.email == record.email
        });
        if taken {
            return Err(AuthError::UserExists);
        }
        self.users.insert(record.user_id, record.clone());
        Ok(())
    }

    async fn find_by_id(&self, user_id: UserId) -> Result<Option<UserRecord>, AuthError> {
        Ok(self.users.get(&user_id).map(|entry| entry.value().clone()))
    }

    async fn find_by_username_or_email(
        &self,
        username: Option<&str>,
        email: Option<&str>,
    ) -> Result<Option<UserRecord>, AuthError> {
        let found = self.users.iter().find(|entry| {
            username.is_some_and(|u| entry.username == u)
                || email.is_some_and(|e| entry.email == e)
        });
        Ok(found.map(|entry| entry.value().clone()))
    }

    async fn set_refresh_token(
        &self,
        user_id: UserId,
        token: Option<&str>,
    ) -> Result<(), AuthError> {
        // Absent user is a no-op, matching the SQL UPDATE semantics.
        if let Some(mut user) = self.users.get_mut(&user_id) {
            user.current_refresh_token = token.map(str::to_string);
        }
        Ok(())
    }

    async fn swap_refresh_token(
        &self,
        user_id: UserId,
        current: &str,
        next: &str,
    ) -> Result<bool, AuthError> {
        let Some(mut user) = self.users.get_mut(&user_id) else {
            return Ok(false);
        };
        if user.current_refresh_token.as_deref() != Some(current) {
            return Ok(false);
        }
        user.current_refresh_token = Some(next.to_string());
        Ok(true)
    }
}
