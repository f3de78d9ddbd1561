use crate::application_port::*;
use crate::domain_model::*;

#[async_trait::async_trait]
pub trait SessionStore: Send + Sync {
    /// Mint a fresh token pair and overwrite the user's refresh token slot,
    /// invalidating whatever was stored before. Login path.
    async fn issue_session(&self, user_id: UserId) -> Result<TokenPair, AuthError>;
    /// Mint a fresh pair and swap the slot from `presented` to the new
    /// refresh token in one atomic step. A failed swap is reuse detection:
    /// two concurrent rotations of the same token leave exactly one winner.
    async fn rotate_session(
        &self,
        user_id: UserId,
        presented: &RefreshToken,
    ) -> Result<TokenPair, AuthError>;
    /// Clear the slot unconditionally, invalidating all outstanding refresh
    /// tokens for the user.
    async fn revoke_session(&self, user_id: UserId) -> Result<(), AuthError>;
}
