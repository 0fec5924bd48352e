//! Integration tests — start ephemeral PG, build the router, and drive the
//! full session lifecycle through it: register, login, gate, rotation,
//! logout.

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use cliptide_api::{AppState, config::ApiConfig};
use cliptide_core::db::LocalDbManager;
use serde_json::{Value, json};
use tower::ServiceExt;

const ACCESS_SECRET: &str = "test-access-secret";
const REFRESH_SECRET: &str = "test-refresh-secret";

/// Spin up an ephemeral PostgreSQL instance, run migrations, and build
/// the application router against it.
async fn setup() -> (LocalDbManager, Router) {
    let mut db = LocalDbManager::ephemeral()
        .await
        .expect("LocalDbManager::ephemeral");
    db.setup().await.expect("db setup");
    db.start().await.expect("db start");

    let pool = sqlx::PgPool::connect(&db.connection_url())
        .await
        .expect("connect to ephemeral PG");

    cliptide_api::migrate(&pool).await.expect("migrations");

    let state = AppState {
        pool,
        config: ApiConfig {
            bind_addr: "127.0.0.1:0".into(),
            pg_connection_url: db.connection_url(),
            access_token_secret: ACCESS_SECRET.into(),
            refresh_token_secret: REFRESH_SECRET.into(),
            access_token_expiry_secs: 900,
            refresh_token_expiry_secs: 3600,
        },
    };

    (db, cliptide_api::router(state))
}

/// POST a JSON body; returns status, Set-Cookie headers, and parsed body.
async fn post_json(app: &Router, uri: &str, body: Value) -> (StatusCode, Vec<String>, Value) {
    let req = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, req).await
}

/// GET with an optional bearer token.
async fn get_with_bearer(app: &Router, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
    let mut builder = Request::builder().uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let (status, _, body) = send(app, builder.body(Body::empty()).unwrap()).await;
    (status, body)
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Vec<String>, Value) {
    let resp = app.clone().oneshot(req).await.expect("request");
    let status = resp.status();
    let cookies = resp
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|v| v.to_str().expect("cookie header is ascii").to_string())
        .collect();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("read body");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("parse JSON")
    };
    (status, cookies, body)
}

fn register_body(username: &str) -> Value {
    json!({
        "username": username,
        "email": format!("{}@example.com", username.to_lowercase()),
        "password": "correct-horse",
        "fullName": "Test User",
    })
}

#[tokio::test]
async fn register_login_and_gate_flow() {
    let (mut db, app) = setup().await;

    // Register — mixed case username is normalized, tokens come back,
    // both cookies are set with the expected flags.
    let (status, cookies, body) =
        post_json(&app, "/api/v1/auth/register", register_body("Alice")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["username"], "alice");
    assert!(!body["accessToken"].as_str().unwrap().is_empty());
    assert!(!body["refreshToken"].as_str().unwrap().is_empty());
    assert!(
        cookies
            .iter()
            .any(|c| c.starts_with("cliptide_access=") && c.contains("HttpOnly")),
        "missing access cookie: {cookies:?}"
    );
    assert!(
        cookies
            .iter()
            .any(|c| c.starts_with("cliptide_refresh=") && c.contains("Secure")),
        "missing refresh cookie: {cookies:?}"
    );

    // Duplicate username is a validation failure.
    let (status, _, _) = post_json(&app, "/api/v1/auth/register", register_body("alice")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Login by username.
    let (status, _, body) = post_json(
        &app,
        "/api/v1/auth/login",
        json!({"username": "alice", "password": "correct-horse"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let access = body["accessToken"].as_str().unwrap().to_string();

    // Wrong password and unknown user collapse to the same 401.
    let (status, _, body) = post_json(
        &app,
        "/api/v1/auth/login",
        json!({"username": "alice", "password": "wrong-password"}),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthorized");
    let (status, _, _) = post_json(
        &app,
        "/api/v1/auth/login",
        json!({"username": "nobody", "password": "correct-horse"}),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // The gate resolves the freshly minted access token via header...
    let (status, body) = get_with_bearer(&app, "/api/v1/users/me", Some(&access)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "alice");

    // ...and via cookie.
    let req = Request::builder()
        .uri("/api/v1/users/me")
        .header(header::COOKIE, format!("cliptide_access={access}"))
        .body(Body::empty())
        .unwrap();
    let (status, _, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "alice");

    // Missing and tampered tokens are rejected alike.
    let (status, _) = get_with_bearer(&app, "/api/v1/users/me", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let mut tampered = access.clone();
    tampered.pop();
    tampered.push(if access.ends_with('A') { 'B' } else { 'A' });
    let (status, _) = get_with_bearer(&app, "/api/v1/users/me", Some(&tampered)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    db.stop().await.expect("db stop");
}

#[tokio::test]
async fn rotation_is_single_use_and_sessions_are_exclusive() {
    let (mut db, app) = setup().await;

    let (_, _, body) = post_json(&app, "/api/v1/auth/register", register_body("bob")).await;
    let refresh1 = body["refreshToken"].as_str().unwrap().to_string();

    // Rotation via request body returns a different refresh token.
    let (status, _, body) = post_json(
        &app,
        "/api/v1/auth/refresh",
        json!({"refreshToken": refresh1}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let refresh2 = body["refreshToken"].as_str().unwrap().to_string();
    assert_ne!(refresh1, refresh2);

    // The superseded token is dead, with the distinct stale outcome.
    let (status, _, body) = post_json(
        &app,
        "/api/v1/auth/refresh",
        json!({"refreshToken": refresh1}),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "refresh_token_stale");
    assert_eq!(body["message"], "Refresh token is expired or used");

    // Rotation via cookie works and supersedes refresh2.
    let req = Request::builder()
        .method("POST")
        .uri("/api/v1/auth/refresh")
        .header(header::COOKIE, format!("cliptide_refresh={refresh2}"))
        .body(Body::empty())
        .unwrap();
    let (status, _, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    let refresh3 = body["refreshToken"].as_str().unwrap().to_string();

    let (status, _, _) = post_json(
        &app,
        "/api/v1/auth/refresh",
        json!({"refreshToken": refresh2}),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // A new login supersedes the rotated session: single active session.
    let (status, _, _) = post_json(
        &app,
        "/api/v1/auth/login",
        json!({"email": "bob@example.com", "password": "correct-horse"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _, body) = post_json(
        &app,
        "/api/v1/auth/refresh",
        json!({"refreshToken": refresh3}),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "refresh_token_stale");

    // An access token never passes the refresh gate (independent secrets),
    // and a garbage token fails before any comparison.
    let (_, _, body) = post_json(
        &app,
        "/api/v1/auth/login",
        json!({"username": "bob", "password": "correct-horse"}),
    )
    .await;
    let access = body["accessToken"].as_str().unwrap().to_string();
    let (status, _, body) = post_json(
        &app,
        "/api/v1/auth/refresh",
        json!({"refreshToken": access}),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthorized");

    db.stop().await.expect("db stop");
}

#[tokio::test]
async fn logout_revokes_and_expired_tokens_are_rejected() {
    let (mut db, app) = setup().await;

    let (_, _, body) = post_json(&app, "/api/v1/auth/register", register_body("carol")).await;
    let access = body["accessToken"].as_str().unwrap().to_string();
    let refresh = body["refreshToken"].as_str().unwrap().to_string();
    let user_id = body["user"]["id"].as_str().unwrap().to_string();

    // Logout clears the cookies and the stored token.
    let req = Request::builder()
        .method("POST")
        .uri("/api/v1/auth/logout")
        .header(header::AUTHORIZATION, format!("Bearer {access}"))
        .body(Body::empty())
        .unwrap();
    let (status, cookies, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert!(
        cookies.iter().any(|c| c.contains("Max-Age=0")),
        "cookies not cleared: {cookies:?}"
    );

    // Logout is final: the old refresh token now surfaces as stale.
    let (status, _, body) = post_json(
        &app,
        "/api/v1/auth/refresh",
        json!({"refreshToken": refresh}),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "refresh_token_stale");

    // An access token past its expiry is rejected even though the
    // signature is intact.
    let user = cliptide_core::models::auth::User {
        id: user_id.parse().unwrap(),
        username: "carol".into(),
        email: "carol@example.com".into(),
        full_name: "Test User".into(),
        avatar_url: None,
        cover_url: None,
        created_at: chrono::Utc::now(),
    };
    let expired =
        cliptide_core::auth::jwt::generate_access_token(&user, ACCESS_SECRET.as_bytes(), -120)
            .expect("sign expired token");
    let (status, _) = get_with_bearer(&app, "/api/v1/users/me", Some(&expired)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    db.stop().await.expect("db stop");
}
