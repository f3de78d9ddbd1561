//! Route-level tests through `warp::test`: envelope shape, cookie
//! transport, and the cookie/header fallbacks for refresh and logout.

use serde_json::{Value, json};
use std::sync::Arc;
use turnstile::api;
use turnstile::server::Server;
use turnstile::settings::{Auth, Http, Log, Settings, Store};
use warp::filters::BoxedFilter;
use warp::http::header::SET_COOKIE;
use bytes::Bytes;
use warp::{Filter, Reply};

type Routes = BoxedFilter<(warp::reply::Response,)>;

fn test_settings(auth_backend: &str) -> Settings {
    Settings {
        auth: Auth {
            backend: auth_backend.to_string(),
            access_token_secret: "http-test-access-secret".to_string(),
            refresh_token_secret: "http-test-refresh-secret".to_string(),
            access_ttl_secs: 900,
            refresh_ttl_secs: 3600,
        },
        http: Http {
            cert_path: "unused".to_string(),
            key_path: "unused".to_string(),
            address: "127.0.0.1:0".to_string(),
        },
        log: Log {
            filter: "info".to_string(),
        },
        store: Store {
            backend: "memory".to_string(),
            mysql_dsn: None,
        },
    }
}

async fn test_routes(auth_backend: &str) -> Routes {
    let server = Arc::new(
        Server::try_new(&test_settings(auth_backend))
            .await
            .expect("server"),
    );
    api::v1::routes(server)
        .recover(api::v1::recover_error)
        .map(|reply| Reply::into_response(reply))
        .boxed()
}

fn body_json(res: &warp::http::Response<Bytes>) -> Value {
    serde_json::from_slice(res.body()).expect("json body")
}

fn cookie_value(res: &warp::http::Response<Bytes>, name: &str) -> Option<String> {
    res.headers().get_all(SET_COOKIE).iter().find_map(|v| {
        let s = v.to_str().ok()?;
        let (key, rest) = s.split_once('=')?;
        if key == name {
            Some(rest.split(';').next().unwrap_or("").to_string())
        } else {
            None
        }
    })
}

async fn signup_and_login(routes: &Routes) -> warp::http::Response<Bytes> {
    let res = warp::test::request()
        .method("POST")
        .path("/signup")
        .json(&json!({
            "username": "alice",
            "email": "alice@example.com",
            "password": "secret1"
        }))
        .reply(routes)
        .await;
    assert_eq!(res.status(), 201);

    warp::test::request()
        .method("POST")
        .path("/login")
        .json(&json!({ "username": "alice", "password": "secret1" }))
        .reply(routes)
        .await
}

#[tokio::test]
async fn login_sets_secure_cookies_and_envelope() {
    let routes = test_routes("real").await;
    let res = signup_and_login(&routes).await;

    assert_eq!(res.status(), 200);
    let body = body_json(&res);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["statusCode"], json!(200));
    assert_eq!(body["data"]["user"]["username"], json!("alice"));
    assert!(body["data"]["accessToken"].is_string());
    assert!(body["data"]["refreshToken"].is_string());
    assert!(body["data"]["user"].get("password").is_none());

    for name in ["accessToken", "refreshToken"] {
        let raw = res
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .find(|v| v.to_str().unwrap_or("").starts_with(name))
            .expect("cookie set");
        let raw = raw.to_str().unwrap();
        assert!(raw.contains("HttpOnly"));
        assert!(raw.contains("Secure"));
    }
}

#[tokio::test]
async fn login_with_bad_credentials_is_401() {
    let routes = test_routes("real").await;
    signup_and_login(&routes).await;

    let res = warp::test::request()
        .method("POST")
        .path("/login")
        .json(&json!({ "username": "alice", "password": "wrong" }))
        .reply(&routes)
        .await;

    assert_eq!(res.status(), 401);
    let body = body_json(&res);
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["statusCode"], json!(401));
    assert_eq!(body["errors"], json!([]));
}

#[tokio::test]
async fn login_without_identifier_is_400() {
    let routes = test_routes("real").await;

    let res = warp::test::request()
        .method("POST")
        .path("/login")
        .json(&json!({ "password": "secret1" }))
        .reply(&routes)
        .await;

    assert_eq!(res.status(), 400);
    assert_eq!(body_json(&res)["success"], json!(false));
}

#[tokio::test]
async fn refresh_via_cookie_rotates_and_rejects_replay() {
    let routes = test_routes("real").await;
    let login = signup_and_login(&routes).await;
    let r0 = cookie_value(&login, "refreshToken").expect("refresh cookie");

    let res = warp::test::request()
        .method("POST")
        .path("/refresh")
        .header("cookie", format!("refreshToken={}", r0))
        .reply(&routes)
        .await;
    assert_eq!(res.status(), 200);
    let r1 = cookie_value(&res, "refreshToken").expect("rotated cookie");
    assert_ne!(r0, r1);

    // Replay of the superseded cookie.
    let replay = warp::test::request()
        .method("POST")
        .path("/refresh")
        .header("cookie", format!("refreshToken={}", r0))
        .reply(&routes)
        .await;
    assert_eq!(replay.status(), 401);
    assert_eq!(
        body_json(&replay)["message"],
        json!("refresh token is stale or reused")
    );
}

#[tokio::test]
async fn refresh_accepts_a_body_token_when_no_cookie_is_present() {
    let routes = test_routes("real").await;
    let login = signup_and_login(&routes).await;
    let r0 = cookie_value(&login, "refreshToken").expect("refresh cookie");

    let res = warp::test::request()
        .method("POST")
        .path("/refresh")
        .json(&json!({ "refreshToken": r0 }))
        .reply(&routes)
        .await;

    assert_eq!(res.status(), 200);
    assert!(body_json(&res)["data"]["refreshToken"].is_string());
}

#[tokio::test]
async fn refresh_without_any_token_is_401() {
    let routes = test_routes("real").await;

    let res = warp::test::request()
        .method("POST")
        .path("/refresh")
        .reply(&routes)
        .await;

    assert_eq!(res.status(), 401);
}

#[tokio::test]
async fn logout_clears_cookies_and_kills_the_session() {
    let routes = test_routes("real").await;
    let login = signup_and_login(&routes).await;
    let access = cookie_value(&login, "accessToken").expect("access cookie");
    let refresh = cookie_value(&login, "refreshToken").expect("refresh cookie");

    let res = warp::test::request()
        .method("POST")
        .path("/logout")
        .header("authorization", format!("Bearer {}", access))
        .reply(&routes)
        .await;
    assert_eq!(res.status(), 200);
    for name in ["accessToken", "refreshToken"] {
        let raw = res
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .find(|v| v.to_str().unwrap_or("").starts_with(name))
            .expect("cookie cleared");
        assert!(raw.to_str().unwrap().contains("Max-Age=0"));
    }

    let after = warp::test::request()
        .method("POST")
        .path("/refresh")
        .header("cookie", format!("refreshToken={}", refresh))
        .reply(&routes)
        .await;
    assert_eq!(after.status(), 401);
}

#[tokio::test]
async fn logout_accepts_the_access_token_cookie() {
    let routes = test_routes("real").await;
    let login = signup_and_login(&routes).await;
    let access = cookie_value(&login, "accessToken").expect("access cookie");

    let res = warp::test::request()
        .method("POST")
        .path("/logout")
        .header("cookie", format!("accessToken={}", access))
        .reply(&routes)
        .await;

    assert_eq!(res.status(), 200);
}

#[tokio::test]
async fn logout_without_a_token_is_401() {
    let routes = test_routes("real").await;

    let res = warp::test::request()
        .method("POST")
        .path("/logout")
        .reply(&routes)
        .await;

    assert_eq!(res.status(), 401);
}

#[tokio::test]
async fn fake_backend_serves_deterministic_tokens() {
    let routes = test_routes("fake").await;

    let res = warp::test::request()
        .method("POST")
        .path("/login")
        .json(&json!({ "username": "alice", "password": "anything" }))
        .reply(&routes)
        .await;

    assert_eq!(res.status(), 200);
    let body = body_json(&res);
    assert_eq!(body["data"]["accessToken"], json!("fake-access-token:alice"));
    assert_eq!(
        body["data"]["refreshToken"],
        json!("fake-refresh-token:alice")
    );
}
