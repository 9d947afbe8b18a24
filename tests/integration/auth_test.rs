//! Integration tests for sign-in and access validation.

use axum::http::StatusCode;

use warden_entity::user::UserRole;

use crate::helpers::{self, TestApp};

#[tokio::test]
async fn test_sign_in_success() {
    let app = TestApp::new().await;
    let id = app.create_user("doctor", UserRole::Doctor);

    let response = app
        .request(
            "POST",
            "/api/v1/auth/sign-in",
            Some(serde_json::json!({
                "username": "doctor",
                "password": helpers::PASSWORD,
            })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.code(), "OK");
    let data = &response.body["data"];
    assert!(data["access_token"].is_string());
    assert!(data["refresh_token"].is_string());
    assert!(data["session_id"].is_string());
    assert_eq!(data["user"]["id"], id.to_string());
    assert_eq!(data["user"]["role"], "doctor");
    assert_eq!(data["user"]["tenant_id"], app.tenant_id.to_string());
}

#[tokio::test]
async fn test_sign_in_wrong_password_and_unknown_user_look_alike() {
    let app = TestApp::new().await;
    app.create_user("nurse", UserRole::Nurse);

    let wrong = app
        .request(
            "POST",
            "/api/v1/auth/sign-in",
            Some(serde_json::json!({ "username": "nurse", "password": "nope" })),
            None,
        )
        .await;
    let unknown = app
        .request(
            "POST",
            "/api/v1/auth/sign-in",
            Some(serde_json::json!({ "username": "ghost", "password": "nope" })),
            None,
        )
        .await;

    assert_eq!(wrong.status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown.status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong.code(), "AUTH_INVALID_CREDENTIALS");
    assert_eq!(wrong.body, unknown.body);
}

#[tokio::test]
async fn test_sign_in_inactive_account() {
    let app = TestApp::new().await;
    let id = app.create_user("reception", UserRole::Reception);
    app.users.set_active(id, false);

    let right = app
        .request(
            "POST",
            "/api/v1/auth/sign-in",
            Some(serde_json::json!({
                "username": "reception",
                "password": helpers::PASSWORD,
            })),
            None,
        )
        .await;
    assert_eq!(right.status, StatusCode::FORBIDDEN);
    assert_eq!(right.code(), "ACCOUNT_BLOCKED");

    // Without the right password the account state is not revealed.
    let wrong = app
        .request(
            "POST",
            "/api/v1/auth/sign-in",
            Some(serde_json::json!({ "username": "reception", "password": "nope" })),
            None,
        )
        .await;
    assert_eq!(wrong.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_sign_in_rejects_empty_fields() {
    let app = TestApp::new().await;

    let response = app
        .request(
            "POST",
            "/api/v1/auth/sign-in",
            Some(serde_json::json!({ "username": "", "password": "x" })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.code(), "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_me_authenticated() {
    let app = TestApp::new().await;
    app.create_user("owner", UserRole::Owner);
    let (access, _) = app.sign_in("owner").await;

    let response = app.request("GET", "/api/v1/users/me", None, Some(&access)).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["username"], "owner");
    assert!(response.body["data"].get("password_hash").is_none());
}

#[tokio::test]
async fn test_me_requires_valid_token() {
    let app = TestApp::new().await;

    let missing = app.request("GET", "/api/v1/users/me", None, None).await;
    assert_eq!(missing.status, StatusCode::UNAUTHORIZED);

    let garbage = app
        .request("GET", "/api/v1/users/me", None, Some("not.a.jwt"))
        .await;
    assert_eq!(garbage.status, StatusCode::UNAUTHORIZED);
    assert_eq!(garbage.code(), "AUTH_TOKEN_INVALID");
    assert_eq!(garbage.body["success"], false);
}

#[tokio::test]
async fn test_sign_in_rate_limited_per_client() {
    let mut config = helpers::test_config();
    config.server.auth_rate_per_minute = 2;
    config.server.trusted_proxies = vec![helpers::peer().ip()];
    let app = TestApp::with_config(config).await;
    let body = serde_json::json!({ "username": "ghost", "password": "nope" });

    for _ in 0..2 {
        let response = app
            .send(
                "POST",
                "/api/v1/auth/sign-in",
                Some(body.clone()),
                None,
                &[("x-forwarded-for", "203.0.113.7")],
            )
            .await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    }

    let limited = app
        .send(
            "POST",
            "/api/v1/auth/sign-in",
            Some(body.clone()),
            None,
            &[("x-forwarded-for", "203.0.113.7")],
        )
        .await;
    assert_eq!(limited.status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(limited.code(), "RATE_LIMITED");

    let other_client = app
        .send(
            "POST",
            "/api/v1/auth/sign-in",
            Some(body),
            None,
            &[("x-forwarded-for", "198.51.100.1")],
        )
        .await;
    assert_eq!(other_client.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_spoofed_forwarded_for_does_not_evade_limit() {
    let mut config = helpers::test_config();
    config.server.auth_rate_per_minute = 2;
    let app = TestApp::with_config(config).await;
    let body = serde_json::json!({ "username": "ghost", "password": "nope" });

    let mut statuses = Vec::new();
    for hop in ["203.0.113.1", "203.0.113.2", "203.0.113.3"] {
        let response = app
            .send(
                "POST",
                "/api/v1/auth/sign-in",
                Some(body.clone()),
                None,
                &[("x-forwarded-for", hop)],
            )
            .await;
        statuses.push(response.status);
    }

    assert_eq!(
        statuses,
        vec![
            StatusCode::UNAUTHORIZED,
            StatusCode::UNAUTHORIZED,
            StatusCode::TOO_MANY_REQUESTS
        ]
    );
}

