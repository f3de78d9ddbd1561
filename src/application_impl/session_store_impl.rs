use crate::application_port::*;
use crate::domain_model::UserId;
use crate::domain_port::{SessionStore, UserRepo};
use std::sync::Arc;
use tracing::error;

/// Session store backed by the user repository: the refresh token slot on
/// the user record is the session table.
pub struct RepoSessionStore {
    user_repo: Arc<dyn UserRepo>,
    token_codec: Arc<dyn TokenCodec>,
}

impl RepoSessionStore {
    pub fn new(user_repo: Arc<dyn UserRepo>, token_codec: Arc<dyn TokenCodec>) -> Self {
        RepoSessionStore {
            user_repo,
            token_codec,
        }
    }

    async fn mint_pair(&self, user_id: UserId) -> Result<TokenPair, AuthError> {
        let user = self
            .user_repo
            .find_by_id(user_id)
            .await
            .map_err(|e| Self::sanitize("load user", user_id, e))?
            .ok_or(AuthError::UserNotFound)?;

        let (access_token, _) = self
            .token_codec
            .issue_access_token(user.user_id, &user.username, &user.email)
            .await?;
        let (refresh_token, _) = self.token_codec.issue_refresh_token(user.user_id).await?;

        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }

    /// Storage failures are logged in full here and reach the caller only as
    /// a generic internal error.
    fn sanitize(op: &str, user_id: UserId, err: AuthError) -> AuthError {
        match err {
            AuthError::Store(detail) => {
                error!(%user_id, %detail, "session store failure: {}", op);
                AuthError::Internal(format!("something went wrong while trying to {}", op))
            }
            other => other,
        }
    }
}

#[async_trait::async_trait]
impl SessionStore for RepoSessionStore {
    async fn issue_session(&self, user_id: UserId) -> Result<TokenPair, AuthError> {
        let tokens = self.mint_pair(user_id).await?;

        self.user_repo
            .set_refresh_token(user_id, Some(&tokens.refresh_token.0))
            .await
            .map_err(|e| Self::sanitize("persist refresh token", user_id, e))?;

        Ok(tokens)
    }

    async fn rotate_session(
        &self,
        user_id: UserId,
        presented: &RefreshToken,
    ) -> Result<TokenPair, AuthError> {
        let tokens = self.mint_pair(user_id).await?;

        let swapped = self
            .user_repo
            .swap_refresh_token(user_id, &presented.0, &tokens.refresh_token.0)
            .await
            .map_err(|e| Self::sanitize("rotate refresh token", user_id, e))?;
        if !swapped {
            return Err(AuthError::TokenReused);
        }

        Ok(tokens)
    }

    async fn revoke_session(&self, user_id: UserId) -> Result<(), AuthError> {
        self.user_repo
            .set_refresh_token(user_id, None)
            .await
            .map_err(|e| Self::sanitize("clear refresh token", user_id, e))
    }
}
