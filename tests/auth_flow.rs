mod common;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use serde_json::json;
use storefront_orders_api::{
    error::AppError,
    models::{Account, Role},
    services::auth_service::{TokenKeys, login_user, register_user},
};
use uuid::Uuid;

use common::{TestApp, jwt_config};

#[tokio::test]
async fn register_normalizes_email() {
    let app = TestApp::new();

    let (status, body) = app
        .send(
            "POST",
            "/auth/register",
            None,
            Some(json!({ "email": "  Alice@Example.COM ", "password": "pw-1" })),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "alice@example.com");
    assert!(body["id"].as_str().is_some());
    assert!(body.get("passwordHash").is_none());
}

#[tokio::test]
async fn duplicate_email_in_any_case_is_a_conflict() {
    let app = TestApp::new();
    app.sign_up("bob@example.com", "pw-1").await;

    let (status, body) = app
        .send(
            "POST",
            "/auth/register",
            None,
            Some(json!({ "email": "BOB@example.com", "password": "other" })),
        )
        .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "duplicate_email");
}

#[tokio::test]
async fn blank_fields_are_rejected() {
    let app = TestApp::new();

    for payload in [
        json!({ "email": "   ", "password": "pw" }),
        json!({ "email": "carol@example.com", "password": "  " }),
        json!({ "email": "carol@example.com" }),
    ] {
        let (status, body) = app.send("POST", "/auth/register", None, Some(payload)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "invalid_input");
    }
}

#[tokio::test]
async fn concurrent_registrations_yield_one_winner() {
    let app = TestApp::new();

    let (a, b) = tokio::join!(
        register_user(&app.state, "race@example.com", "pw-a"),
        register_user(&app.state, "RACE@example.com", "pw-b"),
    );

    let outcomes = [a, b];
    let wins = outcomes.iter().filter(|r| r.is_ok()).count();
    let dups = outcomes
        .iter()
        .filter(|r| matches!(r, Err(AppError::DuplicateEmail)))
        .count();
    assert_eq!((wins, dups), (1, 1));
}

#[tokio::test]
async fn login_failures_are_indistinguishable() {
    let app = TestApp::new();
    app.sign_up("dave@example.com", "right").await;

    let (wrong_pw_status, wrong_pw_body) = app
        .send(
            "POST",
            "/auth/login",
            None,
            Some(json!({ "email": "dave@example.com", "password": "wrong" })),
        )
        .await;
    let (unknown_status, unknown_body) = app
        .send(
            "POST",
            "/auth/login",
            None,
            Some(json!({ "email": "nobody@example.com", "password": "right" })),
        )
        .await;

    assert_eq!(wrong_pw_status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_pw_body, unknown_body);
}

#[tokio::test]
async fn login_accepts_differently_cased_email() {
    let app = TestApp::new();
    app.sign_up("erin@example.com", "pw").await;

    let session = login_user(&app.state, " ERIN@Example.com", "pw").await.unwrap();
    assert_eq!(session.account.email, "erin@example.com");
    assert_eq!(session.account.role, Role::User);
}

#[tokio::test]
async fn me_echoes_token_claims() {
    let app = TestApp::new();
    let (id, token) = app.sign_up("frank@example.com", "pw").await;

    let (status, body) = app.send("GET", "/auth/me", Some(&token), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["userId"], id.to_string());
    assert_eq!(body["email"], "frank@example.com");
    assert_eq!(body["role"], "User");
}

#[tokio::test]
async fn me_without_valid_token_is_unauthorized() {
    let app = TestApp::new();

    let (status, _) = app.send("GET", "/auth/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = app.send("GET", "/auth/me", Some("garbage"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthorized");
}

#[tokio::test]
async fn expired_token_is_unauthorized() {
    let app = TestApp::new();
    let account = Account {
        id: Uuid::new_v4(),
        email: "gina@example.com".into(),
        password_hash: String::new(),
        role: Role::User,
        created_at: Utc::now(),
    };
    let keys = TokenKeys::new(&jwt_config());
    let stale = keys
        .issue_at(&account, Utc::now() - Duration::hours(6) - Duration::minutes(1))
        .unwrap();

    let (status, _) = app.send("GET", "/auth/me", Some(&stale), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app.send("GET", "/orders/my", Some(&stale), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
