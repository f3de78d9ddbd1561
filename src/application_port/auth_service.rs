use crate::domain_model::{PublicUser, UserId};
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("{0} is required")]
    Validation(&'static str),
    #[error("username or email already exists")]
    UserExists,
    #[error("user does not exist")]
    UserNotFound,
    #[error("invalid user credentials")]
    InvalidCredentials,
    #[error("token invalid")]
    TokenInvalid,
    #[error("token expired")]
    TokenExpired,
    #[error("refresh token is stale or reused")]
    TokenReused,
    #[error("store error: {0}")]
    Store(String),
    #[error("internal error: {0}")]
    Internal(String),
}

#[derive(Debug, Clone)]
pub struct SignupInput {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Either identifier is enough for login; validation rejects the request
/// when both are missing.
#[derive(Debug, Clone)]
pub struct LoginInput {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct LoginResult {
    pub user: PublicUser,
    pub tokens: TokenPair,
}

#[derive(Debug, Clone, Serialize)]
pub struct AccessToken(pub String);

#[derive(Debug, Clone, Serialize)]
pub struct RefreshToken(pub String);

/// Transient pairing of the two tokens. Only the refresh half is ever
/// persisted, on the user record's single slot.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: AccessToken,
    pub refresh_token: RefreshToken,
}

#[derive(Debug, Clone)]
pub struct TokenVerifyResult {
    pub user_id: UserId,
}

#[async_trait::async_trait]
pub trait TokenCodec: Send + Sync {
    async fn issue_access_token(
        &self,
        user_id: UserId,
        username: &str,
        email: &str,
    ) -> Result<(AccessToken, chrono::DateTime<chrono::Utc>), AuthError>;
    async fn issue_refresh_token(
        &self,
        user_id: UserId,
    ) -> Result<(RefreshToken, chrono::DateTime<chrono::Utc>), AuthError>;
    /// Signature and expiry only; never consults storage.
    async fn verify_access_token(
        &self,
        token: &AccessToken,
    ) -> Result<TokenVerifyResult, AuthError>;
    /// Signature and expiry only; never consults storage.
    async fn verify_refresh_token(
        &self,
        token: &RefreshToken,
    ) -> Result<TokenVerifyResult, AuthError>;
}

#[async_trait::async_trait]
pub trait CredentialHasher: Send + Sync {
    async fn hash_password(&self, password: &str) -> Result<String, AuthError>;
    /// `Ok(false)` for a non-matching password; errors only on a malformed
    /// stored hash.
    async fn verify_password(&self, password: &str, password_hash: &str)
    -> Result<bool, AuthError>;
}

#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    async fn signup(&self, request: SignupInput) -> Result<PublicUser, AuthError>;
    async fn login(&self, request: LoginInput) -> Result<LoginResult, AuthError>;
    /// Validate the presented refresh token against the stored slot and
    /// rotate it. A stale or superseded token rejects only this request.
    async fn refresh(&self, presented: Option<RefreshToken>) -> Result<TokenPair, AuthError>;
    /// `user_id` comes from the transport-layer identity check; the stored
    /// refresh token is cleared unconditionally.
    async fn logout(&self, user_id: UserId) -> Result<(), AuthError>;
    async fn verify_access_token(&self, token: &str) -> Result<UserId, AuthError>;
}
