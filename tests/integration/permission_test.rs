//! Integration tests for the policy gate and the outer middleware stack.

use axum::http::StatusCode;

use warden_entity::user::UserRole;

use std::sync::Arc;

use crate::helpers::{StaticDatabase, SwitchableCache, TestApp};

#[tokio::test]
async fn test_role_probes() {
    let app = TestApp::new().await;
    app.create_user("owner", UserRole::Owner);
    app.create_user("doctor", UserRole::Doctor);
    app.create_user("nurse", UserRole::Nurse);
    app.create_user("reception", UserRole::Reception);

    let cases = [
        ("owner", "owner", StatusCode::OK),
        ("owner", "nurse", StatusCode::OK),
        ("doctor", "doctor", StatusCode::OK),
        ("doctor", "owner", StatusCode::FORBIDDEN),
        ("nurse", "nurse", StatusCode::OK),
        ("nurse", "doctor", StatusCode::FORBIDDEN),
        ("reception", "nurse", StatusCode::FORBIDDEN),
    ];

    for (user, probe, expected) in cases {
        let (token, _) = app.sign_in(user).await;
        let response = app
            .request("GET", &format!("/api/v1/test/{probe}"), None, Some(&token))
            .await;
        assert_eq!(response.status, expected, "{user} -> /test/{probe}");
    }
}

#[tokio::test]
async fn test_super_admin_passes_every_tenant_gate() {
    let app = TestApp::new().await;
    app.create_user("root", UserRole::SuperAdmin);
    let (token, _) = app.sign_in("root").await;

    let probe = app
        .request("GET", "/api/v1/test/owner", None, Some(&token))
        .await;
    assert_eq!(probe.status, StatusCode::OK);

    // Authorized, but the listing needs a tenant.
    let list = app.request("GET", "/api/v1/users", None, Some(&token)).await;
    assert_eq!(list.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_list_users_of_own_tenant() {
    let app = TestApp::new().await;
    app.create_user("owner", UserRole::Owner);
    app.create_user("doctor", UserRole::Doctor);
    app.create_user("root", UserRole::SuperAdmin);
    let (owner_token, _) = app.sign_in("owner").await;
    let (doctor_token, _) = app.sign_in("doctor").await;

    let list = app
        .request("GET", "/api/v1/users", None, Some(&owner_token))
        .await;
    assert_eq!(list.status, StatusCode::OK);
    let names: Vec<_> = list.body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["username"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["doctor", "owner"]);

    let denied = app
        .request("GET", "/api/v1/users", None, Some(&doctor_token))
        .await;
    assert_eq!(denied.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_gate_requires_authentication_first() {
    let app = TestApp::new().await;

    let response = app.request("GET", "/api/v1/test/owner", None, None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_request_id_is_assigned_and_propagated() {
    let app = TestApp::new().await;

    let assigned = app.request("GET", "/api/v1/health", None, None).await;
    assert!(assigned.headers.contains_key("x-request-id"));

    let propagated = app
        .send(
            "GET",
            "/api/v1/health",
            None,
            None,
            &[("x-request-id", "trace-abc-123")],
        )
        .await;
    assert_eq!(
        propagated.headers.get("x-request-id").unwrap(),
        "trace-abc-123"
    );
}

#[tokio::test]
async fn test_health_reports_cache() {
    let app = TestApp::new().await;

    let response = app.request("GET", "/api/v1/health", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["status"], "ok");
    assert_eq!(response.body["data"]["cache"], "up");
    assert!(response.body["data"].get("database").is_none());
}

#[tokio::test]
async fn test_health_reports_database() {
    let up = TestApp::with_backends(
        Arc::new(SwitchableCache::new()),
        Some(Arc::new(StaticDatabase { up: true })),
    )
    .await;
    let response = up.request("GET", "/api/v1/health", None, None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["database"], "up");

    let down = TestApp::with_backends(
        Arc::new(SwitchableCache::new()),
        Some(Arc::new(StaticDatabase { up: false })),
    )
    .await;
    let response = down.request("GET", "/api/v1/health", None, None).await;
    assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(response.body["data"]["status"], "degraded");
    assert_eq!(response.body["data"]["cache"], "up");
    assert_eq!(response.body["data"]["database"], "down");
    assert!(down.alerts.messages().is_empty());
}

#[tokio::test]
async fn test_session_store_outage_is_503_and_alerts() {
    let cache = Arc::new(SwitchableCache::new());
    let app = TestApp::with_backends(cache.clone(), None).await;
    app.create_user("doctor", UserRole::Doctor);
    let (access, _) = app.sign_in("doctor").await;
    assert!(app.alerts.messages().is_empty());

    cache.set_down(true);
    let response = app
        .request("GET", "/api/v1/users/me", None, Some(&access))
        .await;

    assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(response.code(), "TRANSIENT");
    let alerts = app.alerts.messages();
    assert!(
        alerts
            .iter()
            .any(|m| m.contains("CRITICAL ERROR") && m.contains("503") && m.contains("/users/me")),
        "no server-error alert in {alerts:?}"
    );

    let health = app.request("GET", "/api/v1/health", None, None).await;
    assert_eq!(health.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(health.body["data"]["cache"], "down");

    cache.set_down(false);
    let recovered = app
        .request("GET", "/api/v1/users/me", None, Some(&access))
        .await;
    assert_eq!(recovered.status, StatusCode::OK);
}

#[tokio::test]
async fn test_client_errors_raise_no_alerts() {
    let app = TestApp::new().await;

    app.request("GET", "/api/v1/users/me", None, Some("bad")).await;
    app.request("GET", "/api/v1/test/owner", None, None).await;

    assert!(app.alerts.messages().is_empty());
}
