use super::error::*;
use crate::application_port::*;
use crate::domain_model::{PublicUser, UserId};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use warp::http::StatusCode;
use warp::http::header::{HeaderValue, SET_COOKIE};
use warp::{self, Reply, reject};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub status_code: u16,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(status_code: u16, data: T, message: impl Into<String>) -> Self {
        ApiResponse {
            status_code,
            success: true,
            data: Some(data),
            message: message.into(),
            errors: None,
        }
    }

    pub fn err(status_code: u16, message: impl Into<String>) -> Self {
        ApiResponse {
            status_code,
            success: false,
            data: None,
            message: message.into(),
            errors: Some(Vec::new()),
        }
    }
}

const COOKIE_ATTRIBUTES: &str = "Path=/; HttpOnly; Secure; SameSite=Strict";

fn with_auth_cookies(
    json: warp::reply::Json,
    tokens: &TokenPair,
) -> Result<warp::reply::Response, warp::Rejection> {
    let mut response = json.into_response();
    for (name, value) in [
        ("accessToken", tokens.access_token.0.as_str()),
        ("refreshToken", tokens.refresh_token.0.as_str()),
    ] {
        let cookie = format!("{}={}; {}", name, value, COOKIE_ATTRIBUTES);
        let cookie = HeaderValue::from_str(&cookie)
            .map_err(|e| reject::custom(ApiErrorCode::internal(e)))?;
        response.headers_mut().append(SET_COOKIE, cookie);
    }
    Ok(response)
}

fn clear_auth_cookies(
    json: warp::reply::Json,
) -> Result<warp::reply::Response, warp::Rejection> {
    let mut response = json.into_response();
    for name in ["accessToken", "refreshToken"] {
        let cookie = format!("{}=; Max-Age=0; {}", name, COOKIE_ATTRIBUTES);
        let cookie = HeaderValue::from_str(&cookie)
            .map_err(|e| reject::custom(ApiErrorCode::internal(e)))?;
        response.headers_mut().append(SET_COOKIE, cookie);
    }
    Ok(response)
}

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

pub async fn signup(
    body: SignupRequest,
    auth_service: Arc<dyn AuthService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let signup_input = SignupInput {
        username: body.username,
        email: body.email,
        password: body.password,
    };
    let user = auth_service
        .signup(signup_input)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    let response = ApiResponse::ok(
        StatusCode::CREATED.as_u16(),
        user,
        "user registered successfully",
    );
    Ok(warp::reply::with_status(
        warp::reply::json(&response),
        StatusCode::CREATED,
    ))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user: PublicUser,
    #[serde(flatten)]
    pub tokens: TokenPair,
}

pub async fn login(
    body: LoginRequest,
    auth_service: Arc<dyn AuthService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let login_input = LoginInput {
        username: body.username,
        email: body.email,
        password: body.password,
    };
    let login_result = auth_service
        .login(login_input)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    let tokens = login_result.tokens.clone();
    let response = ApiResponse::ok(
        StatusCode::OK.as_u16(),
        LoginResponse {
            user: login_result.user,
            tokens: login_result.tokens,
        },
        "user logged in successfully",
    );
    with_auth_cookies(warp::reply::json(&response), &tokens)
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: Option<String>,
}

pub async fn refresh(
    cookie_token: Option<String>,
    body: RefreshRequest,
    auth_service: Arc<dyn AuthService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    // The cookie wins over the body when both are present.
    let presented = cookie_token.or(body.refresh_token).map(RefreshToken);

    let tokens = auth_service
        .refresh(presented)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    let response = ApiResponse::ok(
        StatusCode::OK.as_u16(),
        tokens.clone(),
        "access token refreshed",
    );
    with_auth_cookies(warp::reply::json(&response), &tokens)
}

pub async fn logout(
    user_id: UserId,
    auth_service: Arc<dyn AuthService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    auth_service
        .logout(user_id)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    let response =
        ApiResponse::<()>::ok(StatusCode::OK.as_u16(), (), "user logged out successfully");
    clear_auth_cookies(warp::reply::json(&response))
}
