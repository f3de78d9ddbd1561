use crate::application_port::*;
use crate::domain_model::{PublicUser, UserId};
use chrono::Utc;

#[derive(Debug)]
pub struct FakeAuthService;

impl FakeAuthService {
    pub fn new() -> Self {
        Self
    }
}

impl Default for FakeAuthService {
    fn default() -> Self {
        Self::new()
    }
}

// Minimal fake implementation for routing and transport tests. No crypto,
// no storage; tokens are derived from the username.
#[async_trait::async_trait]
impl AuthService for FakeAuthService {
    async fn signup(&self, request: SignupInput) -> Result<PublicUser, AuthError> {
        Ok(fake_user(&request.username, &request.email))
    }

    async fn login(&self, request: LoginInput) -> Result<LoginResult, AuthError> {
        let identifier = request
            .username
            .or(request.email)
            .ok_or(AuthError::Validation("username or email"))?;
        Ok(LoginResult {
            user: fake_user(&identifier, &format!("{}@example.com", identifier)),
            tokens: fake_tokens(&identifier),
        })
    }

    async fn refresh(&self, presented: Option<RefreshToken>) -> Result<TokenPair, AuthError> {
        let presented = presented.ok_or(AuthError::TokenInvalid)?;
        if let Some(identifier) = presented.0.strip_prefix("fake-refresh-token:") {
            Ok(fake_tokens(identifier))
        } else {
            Err(AuthError::TokenInvalid)
        }
    }

    async fn logout(&self, _user_id: UserId) -> Result<(), AuthError> {
        Ok(())
    }

    async fn verify_access_token(&self, token: &str) -> Result<UserId, AuthError> {
        if let Some(identifier) = token.strip_prefix("fake-access-token:") {
            Ok(fake_id(identifier))
        } else {
            Err(AuthError::TokenInvalid)
        }
    }
}

fn fake_id(identifier: &str) -> UserId {
    UserId(uuid::Uuid::new_v5(
        &uuid::Uuid::NAMESPACE_OID,
        identifier.as_bytes(),
    ))
}

fn fake_user(identifier: &str, email: &str) -> PublicUser {
    PublicUser {
        user_id: fake_id(identifier),
        username: identifier.to_string(),
        email: email.to_string(),
        created_at: Utc::now(),
    }
}

fn fake_tokens(identifier: &str) -> TokenPair {
    TokenPair {
        access_token: AccessToken(format!("fake-access-token:{}", identifier)),
        refresh_token: RefreshToken(format!("fake-refresh-token:{}", identifier)),
    }
}
