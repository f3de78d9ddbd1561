use super::error::*;
use super::handler;
use super::handler::RefreshRequest;
use crate::application_port::AuthService;
use crate::domain_model::UserId;
use crate::server::Server;
use std::convert::Infallible;
use std::sync::Arc;
use warp::{Filter, reject};

pub fn routes(
    server: Arc<Server>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    let signup = warp::post()
        .and(warp::path("signup"))
        .and(warp::path::end())
        .and(warp::body::json())
        .and(with(server.auth_service.clone()))
        .and_then(handler::signup);

    let login = warp::post()
        .and(warp::path("login"))
        .and(warp::path::end())
        .and(warp::body::json())
        .and(with(server.auth_service.clone()))
        .and_then(handler::login);

    // The refresh token may arrive as a cookie or in the body; an empty
    // body is fine.
    let refresh = warp::post()
        .and(warp::path("refresh"))
        .and(warp::path::end())
        .and(warp::cookie::optional("refreshToken"))
        .and(
            warp::body::json()
                .or_else(|_| async { Ok::<(RefreshRequest,), warp::Rejection>((RefreshRequest::default(),)) }),
        )
        .and(with(server.auth_service.clone()))
        .and_then(handler::refresh);

    let logout = warp::post()
        .and(warp::path("logout"))
        .and(warp::path::end())
        .and(with_verification(server.auth_service.clone()))
        .and(with(server.auth_service.clone()))
        .and_then(handler::logout);

    signup.or(login).or(refresh).or(logout)
}

fn with<ServiceType>(
    service: Arc<ServiceType>,
) -> impl Filter<Extract = (Arc<ServiceType>,), Error = Infallible> + Clone
where
    ServiceType: Send + Sync + ?Sized,
{
    warp::any().map(move || service.clone())
}

/// Resolves the caller from a Bearer header or the access token cookie.
/// This is the upstream identity check for routes that require auth; the
/// protocol itself never re-verifies the access token.
fn with_verification(
    auth_service: Arc<dyn AuthService>,
) -> impl Filter<Extract = (UserId,), Error = warp::Rejection> + Clone {
    warp::header::optional::<String>("authorization")
        .and(warp::cookie::optional("accessToken"))
        .and_then(move |header: Option<String>, cookie: Option<String>| {
            let auth_service = auth_service.clone();
            async move {
                let token = header
                    .as_deref()
                    .and_then(|h| h.strip_prefix("Bearer "))
                    .map(str::to_string)
                    .or(cookie);
                let Some(token) = token else {
                    return Err(reject::custom(ApiErrorCode::InvalidToken));
                };
                auth_service
                    .verify_access_token(&token)
                    .await
                    .map_err(ApiErrorCode::from)
                    .map_err(reject::custom)
            }
        })
}
