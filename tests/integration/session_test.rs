//! Integration tests for refresh, logout, session listing, and blocking.

use axum::http::StatusCode;

use warden_entity::user::UserRole;

use crate::helpers::TestApp;

const UA: &str = "integration-tests";

#[tokio::test]
async fn test_refresh_rotates_tokens() {
    let app = TestApp::new().await;
    app.create_user("doctor", UserRole::Doctor);
    let (access, refresh) = app.sign_in("doctor").await;

    let response = app.refresh(&access, &refresh, UA).await;

    assert_eq!(response.status, StatusCode::OK);
    let new_refresh = response.body["data"]["refresh_token"].as_str().unwrap();
    let new_access = response.body["data"]["access_token"].as_str().unwrap();
    assert_ne!(new_refresh, refresh);

    let me = app.request("GET", "/api/v1/users/me", None, Some(new_access)).await;
    assert_eq!(me.status, StatusCode::OK);
}

#[tokio::test]
async fn test_refresh_replay_revokes_session() {
    let app = TestApp::new().await;
    app.create_user("doctor", UserRole::Doctor);
    let (access, refresh) = app.sign_in("doctor").await;

    let first = app.refresh(&access, &refresh, UA).await;
    assert_eq!(first.status, StatusCode::OK);
    let rotated_access = first.body["data"]["access_token"].as_str().unwrap().to_string();

    let replay = app.refresh(&access, &refresh, UA).await;
    assert_eq!(replay.status, StatusCode::UNAUTHORIZED);
    assert_eq!(replay.code(), "SESSION_MISMATCH");

    let me = app
        .request("GET", "/api/v1/users/me", None, Some(&rotated_access))
        .await;
    assert_eq!(me.status, StatusCode::UNAUTHORIZED);
    assert_eq!(me.code(), "SESSION_REVOKED");

    assert!(
        app.alerts
            .messages()
            .iter()
            .any(|m| m.contains("refresh token mismatch"))
    );
}

#[tokio::test]
async fn test_refresh_from_other_client_keeps_session() {
    let app = TestApp::new().await;
    app.create_user("nurse", UserRole::Nurse);
    let (access, refresh) = app.sign_in("nurse").await;

    let foreign = app.refresh(&access, &refresh, "OtherBrowser/2.0").await;
    assert_eq!(foreign.status, StatusCode::UNAUTHORIZED);
    assert_eq!(foreign.code(), "SESSION_REVOKED");

    let own = app.refresh(&access, &refresh, UA).await;
    assert_eq!(own.status, StatusCode::OK);
}

#[tokio::test]
async fn test_refresh_requires_bearer() {
    let app = TestApp::new().await;

    let response = app
        .request(
            "POST",
            "/api/v1/auth/refresh",
            Some(serde_json::json!({ "refresh_token": "anything" })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_always_succeeds() {
    let app = TestApp::new().await;

    let anonymous = app.request("POST", "/api/v1/auth/logout", None, None).await;
    assert_eq!(anonymous.status, StatusCode::OK);

    let garbage = app
        .request("POST", "/api/v1/auth/logout", None, Some("garbage"))
        .await;
    assert_eq!(garbage.status, StatusCode::OK);
}

#[tokio::test]
async fn test_logout_ends_session() {
    let app = TestApp::new().await;
    app.create_user("owner", UserRole::Owner);
    let (access, _) = app.sign_in("owner").await;

    let logout = app
        .request("POST", "/api/v1/auth/logout", None, Some(&access))
        .await;
    assert_eq!(logout.status, StatusCode::OK);

    let me = app.request("GET", "/api/v1/users/me", None, Some(&access)).await;
    assert_eq!(me.status, StatusCode::UNAUTHORIZED);
    assert_eq!(me.code(), "SESSION_REVOKED");
}

#[tokio::test]
async fn test_sessions_and_logout_all() {
    let app = TestApp::new().await;
    app.create_user("owner", UserRole::Owner);
    let (first, _) = app.sign_in_as("owner", "Laptop/1.0").await;
    let (second, _) = app.sign_in_as("owner", "Phone/1.0").await;

    let list = app
        .request("GET", "/api/v1/auth/sessions", None, Some(&first))
        .await;
    assert_eq!(list.status, StatusCode::OK);
    let sessions = list.body["data"].as_array().unwrap();
    assert_eq!(sessions.len(), 2);
    let current: Vec<_> = sessions
        .iter()
        .filter(|s| s["is_current"] == true)
        .collect();
    assert_eq!(current.len(), 1);
    assert_eq!(current[0]["user_agent"], "Laptop/1.0");

    let all = app
        .request("POST", "/api/v1/auth/logout-all", None, Some(&first))
        .await;
    assert_eq!(all.status, StatusCode::OK);
    assert_eq!(all.body["data"]["revoked"], 2);

    for token in [&first, &second] {
        let me = app.request("GET", "/api/v1/users/me", None, Some(token)).await;
        assert_eq!(me.status, StatusCode::UNAUTHORIZED);
    }
}

#[tokio::test]
async fn test_block_and_unblock_user() {
    let app = TestApp::new().await;
    app.create_user("owner", UserRole::Owner);
    let doctor = app.create_user("doctor", UserRole::Doctor);
    let (owner_token, _) = app.sign_in("owner").await;
    let (doctor_token, _) = app.sign_in("doctor").await;

    let path = format!("/api/v1/admin/users/{doctor}/block");
    let block = app.request("POST", &path, None, Some(&owner_token)).await;
    assert_eq!(block.status, StatusCode::OK);

    let me = app
        .request("GET", "/api/v1/users/me", None, Some(&doctor_token))
        .await;
    assert_eq!(me.status, StatusCode::FORBIDDEN);
    assert_eq!(me.code(), "ACCOUNT_BLOCKED");

    let sign_in = app
        .request(
            "POST",
            "/api/v1/auth/sign-in",
            Some(serde_json::json!({
                "username": "doctor",
                "password": crate::helpers::PASSWORD,
            })),
            None,
        )
        .await;
    assert_eq!(sign_in.status, StatusCode::FORBIDDEN);

    let unblock = app.request("DELETE", &path, None, Some(&owner_token)).await;
    assert_eq!(unblock.status, StatusCode::OK);

    let me = app
        .request("GET", "/api/v1/users/me", None, Some(&doctor_token))
        .await;
    assert_eq!(me.status, StatusCode::OK);
}

#[tokio::test]
async fn test_zero_ttl_block_is_rejected_and_keeps_block() {
    let app = TestApp::new().await;
    app.create_user("owner", UserRole::Owner);
    let doctor = app.create_user("doctor", UserRole::Doctor);
    let (owner_token, _) = app.sign_in("owner").await;
    let (doctor_token, _) = app.sign_in("doctor").await;

    let path = format!("/api/v1/admin/users/{doctor}/block");
    let block = app.request("POST", &path, None, Some(&owner_token)).await;
    assert_eq!(block.status, StatusCode::OK);

    let zero = app
        .request("POST", &format!("{path}?ttl_seconds=0"), None, Some(&owner_token))
        .await;
    assert_eq!(zero.status, StatusCode::BAD_REQUEST);
    assert_eq!(zero.code(), "VALIDATION_ERROR");

    let me = app
        .request("GET", "/api/v1/users/me", None, Some(&doctor_token))
        .await;
    assert_eq!(me.status, StatusCode::FORBIDDEN);
    assert_eq!(me.code(), "ACCOUNT_BLOCKED");

    let timed = app
        .request("POST", &format!("{path}?ttl_seconds=60"), None, Some(&owner_token))
        .await;
    assert_eq!(timed.status, StatusCode::OK);
}

#[tokio::test]
async fn test_clinical_staff_cannot_block() {
    let app = TestApp::new().await;
    let owner = app.create_user("owner", UserRole::Owner);
    app.create_user("nurse", UserRole::Nurse);
    let (nurse_token, _) = app.sign_in("nurse").await;

    let response = app
        .request(
            "POST",
            &format!("/api/v1/admin/users/{owner}/block"),
            None,
            Some(&nurse_token),
        )
        .await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.code(), "FORBIDDEN");
}
