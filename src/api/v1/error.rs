use crate::api::v1::handler::ApiResponse;
use crate::application_port::*;
use std::convert::Infallible;
use thiserror::Error;
use tracing::warn;
use warp::http::StatusCode;
use warp::{Rejection, reject};

pub async fn recover_error(err: Rejection) -> Result<impl warp::Reply, Infallible> {
    if let Some(err) = err.find::<ApiErrorCode>() {
        let status = err.status();
        let json = warp::reply::json(&ApiResponse::<()>::err(status.as_u16(), err.to_string()));
        Ok(warp::reply::with_status(json, status))
    } else if let Some(err) = err.find::<warp::filters::body::BodyDeserializeError>() {
        let json = warp::reply::json(&ApiResponse::<()>::err(
            StatusCode::BAD_REQUEST.as_u16(),
            err.to_string(),
        ));
        Ok(warp::reply::with_status(json, StatusCode::BAD_REQUEST))
    } else if err.is_not_found() {
        let json = warp::reply::json(&ApiResponse::<()>::err(
            StatusCode::NOT_FOUND.as_u16(),
            "not found",
        ));
        Ok(warp::reply::with_status(json, StatusCode::NOT_FOUND))
    } else {
        let json = warp::reply::json(&ApiResponse::<()>::err(
            StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
            format!("Unhandled error: {:?}", err),
        ));
        Ok(warp::reply::with_status(
            json,
            StatusCode::INTERNAL_SERVER_ERROR,
        ))
    }
}

#[derive(Debug, Clone, Error)]
pub enum ApiErrorCode {
    #[error("{0} is required")]
    MissingField(String),
    #[error("username or email already exists")]
    Conflict,
    #[error("user does not exist")]
    NotFound,
    #[error("invalid user credentials")]
    InvalidCredentials,
    #[error("token is not valid")]
    InvalidToken,
    #[error("token expired")]
    ExpiredToken,
    #[error("refresh token is stale or reused")]
    StaleRefreshToken,
    #[error("internal error")]
    InternalError,
}

impl ApiErrorCode {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiErrorCode::MissingField(_) => StatusCode::BAD_REQUEST,
            ApiErrorCode::Conflict => StatusCode::CONFLICT,
            ApiErrorCode::NotFound => StatusCode::NOT_FOUND,
            ApiErrorCode::InvalidCredentials
            | ApiErrorCode::InvalidToken
            | ApiErrorCode::ExpiredToken
            | ApiErrorCode::StaleRefreshToken => StatusCode::UNAUTHORIZED,
            ApiErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn internal<E: std::fmt::Display>(error: E) -> ApiErrorCode {
        warn!("Internal error: {}", error);
        ApiErrorCode::InternalError
    }
}

impl reject::Reject for ApiErrorCode {}

impl From<AuthError> for ApiErrorCode {
    fn from(error: AuthError) -> Self {
        match error {
            AuthError::Validation(field) => ApiErrorCode::MissingField(field.to_string()),
            AuthError::UserExists => ApiErrorCode::Conflict,
            AuthError::UserNotFound => ApiErrorCode::NotFound,
            AuthError::InvalidCredentials => ApiErrorCode::InvalidCredentials,
            AuthError::TokenInvalid => ApiErrorCode::InvalidToken,
            AuthError::TokenExpired => ApiErrorCode::ExpiredToken,
            AuthError::TokenReused => ApiErrorCode::StaleRefreshToken,
            AuthError::Store(e) | AuthError::Internal(e) => ApiErrorCode::internal(e),
        }
    }
}
