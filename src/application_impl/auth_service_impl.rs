use crate::application_port::*;
use crate::domain_model::{PublicUser, UserId};
use crate::domain_port::{SessionStore, UserRepo};
use argon2::password_hash::rand_core::OsRng;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use chrono::{DateTime, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

pub struct Argon2PasswordHasher;

#[async_trait::async_trait]
impl CredentialHasher for Argon2PasswordHasher {
    async fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        let salt = argon2::password_hash::SaltString::generate(&mut OsRng);
        let argon2 = argon2::Argon2::default();
        let hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AuthError::Internal(e.to_string()))?
            .to_string();
        Ok(hash)
    }

    async fn verify_password(
        &self,
        password: &str,
        password_hash: &str,
    ) -> Result<bool, AuthError> {
        let parsed = PasswordHash::new(password_hash)
            .map_err(|e| AuthError::Internal(format!("invalid PHC hash: {}", e)))?;

        match Argon2::default().verify_password(password.as_bytes(), &parsed) {
            Ok(_) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(AuthError::Internal(format!("verify error: {}", e))),
        }
    }
}

/// Signing configuration built once at startup. The two token kinds use
/// distinct secrets so a leaked access secret cannot forge refresh tokens.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub access_secret: Vec<u8>,
    pub refresh_secret: Vec<u8>,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
}

#[derive(Debug, Serialize, Deserialize)]
struct AccessClaims {
    sub: String, // user id as string
    username: String,
    email: String,
    exp: i64,
    iat: i64,
}

#[derive(Debug, Serialize, Deserialize)]
struct RefreshClaims {
    sub: String, // user id as string
    exp: i64,
    iat: i64,
    jti: String, // keeps two rotations within one second distinct
}

fn encode_access(
    uid: UserId,
    username: &str,
    email: &str,
    cfg: &JwtConfig,
) -> Result<(String, DateTime<Utc>), AuthError> {
    let iat_dt = Utc::now();
    let exp_dt = iat_dt + cfg.access_ttl;
    let claims = AccessClaims {
        sub: uid.to_string(),
        username: username.to_string(),
        email: email.to_string(),
        exp: exp_dt.timestamp(),
        iat: iat_dt.timestamp(),
    };
    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(&cfg.access_secret),
    )
    .map_err(|e| AuthError::Internal(e.to_string()))?;
    Ok((token, exp_dt))
}

fn encode_refresh(uid: UserId, cfg: &JwtConfig) -> Result<(String, DateTime<Utc>), AuthError> {
    let iat_dt = Utc::now();
    let exp_dt = iat_dt + cfg.refresh_ttl;
    let claims = RefreshClaims {
        sub: uid.to_string(),
        exp: exp_dt.timestamp(),
        iat: iat_dt.timestamp(),
        jti: Uuid::new_v4().to_string(),
    };
    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(&cfg.refresh_secret),
    )
    .map_err(|e| AuthError::Internal(e.to_string()))?;
    Ok((token, exp_dt))
}

fn strict_validation() -> Validation {
    let mut v = Validation::new(Algorithm::HS256);
    v.validate_exp = true;
    v.leeway = 0;
    v
}

fn decode_access(token: &str, cfg: &JwtConfig) -> Result<AccessClaims, AuthError> {
    let v = strict_validation();
    let data = decode::<AccessClaims>(token, &DecodingKey::from_secret(&cfg.access_secret), &v)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            _ => AuthError::TokenInvalid,
        })?;
    Ok(data.claims)
}

fn decode_refresh(token: &str, cfg: &JwtConfig) -> Result<RefreshClaims, AuthError> {
    let v = strict_validation();
    let data = decode::<RefreshClaims>(token, &DecodingKey::from_secret(&cfg.refresh_secret), &v)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            _ => AuthError::TokenInvalid,
        })?;
    Ok(data.claims)
}

pub struct JwtHs256Codec {
    cfg: JwtConfig,
}

impl JwtHs256Codec {
    pub fn new(cfg: JwtConfig) -> Self {
        JwtHs256Codec { cfg }
    }

    #[inline]
    fn parse_user_id(sub: &str) -> Result<UserId, AuthError> {
        let id = sub.parse::<UserId>().map_err(|_| AuthError::TokenInvalid)?;
        Ok(id)
    }
}

#[async_trait::async_trait]
impl TokenCodec for JwtHs256Codec {
    async fn issue_access_token(
        &self,
        user_id: UserId,
        username: &str,
        email: &str,
    ) -> Result<(AccessToken, DateTime<Utc>), AuthError> {
        let (token, exp_dt) = encode_access(user_id, username, email, &self.cfg)?;
        Ok((AccessToken(token), exp_dt))
    }

    async fn issue_refresh_token(
        &self,
        user_id: UserId,
    ) -> Result<(RefreshToken, DateTime<Utc>), AuthError> {
        let (token, exp_dt) = encode_refresh(user_id, &self.cfg)?;
        Ok((RefreshToken(token), exp_dt))
    }

    async fn verify_access_token(
        &self,
        token: &AccessToken,
    ) -> Result<TokenVerifyResult, AuthError> {
        let claims = decode_access(&token.0, &self.cfg)?;
        let user_id = Self::parse_user_id(&claims.sub)?;
        Ok(TokenVerifyResult { user_id })
    }

    async fn verify_refresh_token(
        &self,
        token: &RefreshToken,
    ) -> Result<TokenVerifyResult, AuthError> {
        let claims = decode_refresh(&token.0, &self.cfg)?;
        let user_id = Self::parse_user_id(&claims.sub)?;
        Ok(TokenVerifyResult { user_id })
    }
}

pub struct RealAuthService {
    user_repo: Arc<dyn UserRepo>,
    credential_hasher: Arc<dyn CredentialHasher>,
    token_codec: Arc<dyn TokenCodec>,
    session_store: Arc<dyn SessionStore>,
}

impl RealAuthService {
    pub fn new(
        user_repo: Arc<dyn UserRepo>,
        credential_hasher: Arc<dyn CredentialHasher>,
        token_codec: Arc<dyn TokenCodec>,
        session_store: Arc<dyn SessionStore>,
    ) -> Self {
        Self {
            user_repo,
            credential_hasher,
            token_codec,
            session_store,
        }
    }

    #[inline]
    fn new_user_id() -> UserId {
        UserId(Uuid::new_v4())
    }

    fn non_empty(value: Option<String>) -> Option<String> {
        value.filter(|s| !s.trim().is_empty())
    }
}

#[async_trait::async_trait]
impl AuthService for RealAuthService {
    async fn signup(&self, request: SignupInput) -> Result<PublicUser, AuthError> {
        let SignupInput {
            username,
            email,
            password,
        } = request;

        if username.trim().is_empty() {
            return Err(AuthError::Validation("username"));
        }
        if email.trim().is_empty() {
            return Err(AuthError::Validation("email"));
        }
        if password.trim().is_empty() {
            return Err(AuthError::Validation("password"));
        }

        if self
            .user_repo
            .find_by_username_or_email(Some(&username), Some(&email))
            .await?
            .is_some()
        {
            return Err(AuthError::UserExists);
        }

        let password_hash = self.credential_hasher.hash_password(&password).await?;
        let record = crate::domain_port::UserRecord {
            user_id: Self::new_user_id(),
            username,
            email,
            password_hash,
            current_refresh_token: None,
            created_at: Utc::now(),
        };
        self.user_repo.create(&record).await?;

        Ok(PublicUser::from(&record))
    }

    async fn login(&self, request: LoginInput) -> Result<LoginResult, AuthError> {
        let LoginInput {
            username,
            email,
            password,
        } = request;

        if password.trim().is_empty() {
            return Err(AuthError::Validation("password"));
        }
        let username = Self::non_empty(username);
        let email = Self::non_empty(email);
        if username.is_none() && email.is_none() {
            return Err(AuthError::Validation("username or email"));
        }

        let user = self
            .user_repo
            .find_by_username_or_email(username.as_deref(), email.as_deref())
            .await?
            .ok_or(AuthError::UserNotFound)?;

        let ok = self
            .credential_hasher
            .verify_password(&password, &user.password_hash)
            .await?;
        if !ok {
            return Err(AuthError::InvalidCredentials);
        }

        let tokens = self.session_store.issue_session(user.user_id).await?;

        Ok(LoginResult {
            user: PublicUser::from(&user),
            tokens,
        })
    }

    async fn refresh(&self, presented: Option<RefreshToken>) -> Result<TokenPair, AuthError> {
        let presented = presented
            .filter(|t| !t.0.is_empty())
            .ok_or(AuthError::TokenInvalid)?;

        let verified = self.token_codec.verify_refresh_token(&presented).await?;

        // An unknown user id must look like any other bad token here; the
        // refresh path never reveals whether an id exists.
        let user = self
            .user_repo
            .find_by_id(verified.user_id)
            .await?
            .ok_or(AuthError::TokenInvalid)?;

        if user.current_refresh_token.as_deref() != Some(presented.0.as_str()) {
            return Err(AuthError::TokenReused);
        }

        self.session_store
            .rotate_session(user.user_id, &presented)
            .await
    }

    async fn logout(&self, user_id: UserId) -> Result<(), AuthError> {
        self.session_store.revoke_session(user_id).await
    }

    async fn verify_access_token(&self, token: &str) -> Result<UserId, AuthError> {
        let verified = self
            .token_codec
            .verify_access_token(&AccessToken(token.to_string()))
            .await?;

        match self.user_repo.find_by_id(verified.user_id).await? {
            Some(_) => Ok(verified.user_id),
            None => Err(AuthError::TokenInvalid),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> JwtConfig {
        JwtConfig {
            access_secret: b"test-access-secret".to_vec(),
            refresh_secret: b"test-refresh-secret".to_vec(),
            access_ttl: Duration::from_secs(900),
            refresh_ttl: Duration::from_secs(7 * 24 * 3600),
        }
    }

    #[tokio::test]
    async fn access_token_claims_match_issuer_input() {
        let cfg = test_config();
        let codec = JwtHs256Codec::new(cfg.clone());
        let user_id = UserId(Uuid::new_v4());

        let (token, exp) = codec
            .issue_access_token(user_id, "alice", "alice@example.com")
            .await
            .unwrap();

        let claims = decode_access(&token.0, &cfg).unwrap();
        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.email, "alice@example.com");
        assert!(claims.exp > claims.iat);
        assert_eq!(claims.exp, exp.timestamp());
    }

    #[tokio::test]
    async fn refresh_token_round_trips_user_id() {
        let codec = JwtHs256Codec::new(test_config());
        let user_id = UserId(Uuid::new_v4());

        let (token, _) = codec.issue_refresh_token(user_id).await.unwrap();
        let verified = codec.verify_refresh_token(&token).await.unwrap();
        assert_eq!(verified.user_id, user_id);
    }

    #[tokio::test]
    async fn access_token_is_not_a_valid_refresh_token() {
        // Distinct secrets: the token kinds must not be interchangeable.
        let codec = JwtHs256Codec::new(test_config());
        let user_id = UserId(Uuid::new_v4());

        let (access, _) = codec
            .issue_access_token(user_id, "alice", "alice@example.com")
            .await
            .unwrap();
        let result = codec
            .verify_refresh_token(&RefreshToken(access.0.clone()))
            .await;
        assert!(matches!(result, Err(AuthError::TokenInvalid)));
    }

    #[tokio::test]
    async fn expired_refresh_token_is_rejected() {
        let cfg = test_config();
        let codec = JwtHs256Codec::new(cfg.clone());
        let user_id = UserId(Uuid::new_v4());

        let iat = Utc::now().timestamp() - 7200;
        let claims = RefreshClaims {
            sub: user_id.to_string(),
            exp: iat + 3600,
            iat,
            jti: Uuid::new_v4().to_string(),
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(&cfg.refresh_secret),
        )
        .unwrap();

        let result = codec.verify_refresh_token(&RefreshToken(token)).await;
        assert!(matches!(result, Err(AuthError::TokenExpired)));
    }

    #[tokio::test]
    async fn tampered_token_is_rejected() {
        let codec = JwtHs256Codec::new(test_config());
        let user_id = UserId(Uuid::new_v4());

        let (token, _) = codec.issue_refresh_token(user_id).await.unwrap();
        let mut tampered = token.0.clone();
        tampered.pop();
        let result = codec.verify_refresh_token(&RefreshToken(tampered)).await;
        assert!(matches!(result, Err(AuthError::TokenInvalid)));
    }

    #[tokio::test]
    async fn password_verify_distinguishes_mismatch_from_malformed_hash() {
        let hasher = Argon2PasswordHasher;
        let hash = hasher.hash_password("secret1").await.unwrap();

        assert!(hasher.verify_password("secret1", &hash).await.unwrap());
        assert!(!hasher.verify_password("wrong", &hash).await.unwrap());

        let result = hasher.verify_password("secret1", "not-a-phc-hash").await;
        assert!(matches!(result, Err(AuthError::Internal(_))));
    }
}
