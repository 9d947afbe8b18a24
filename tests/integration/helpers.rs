//! Shared test helpers for integration tests.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::{HeaderMap, Request, StatusCode};
use chrono::Utc;
use futures::StreamExt;
use futures::stream::{self, BoxStream};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use warden_api::{AppState, build_router};
use warden_auth::rbac::platform_policies;
use warden_auth::{
    AuthorizationGate, MemoryPolicyStore, MemoryUserDirectory, PasswordHasher, SessionManager,
    SessionStore, TokenCodec,
};
use warden_cache::CacheManager;
use warden_cache::memory::MemoryCacheProvider;
use warden_core::config::AppConfig;
use warden_core::config::DatabaseConfig;
use warden_core::config::alert::AlertConfig;
use warden_core::config::app::ServerConfig;
use warden_core::config::auth::AuthConfig;
use warden_core::config::cache::{CacheConfig, MemoryCacheConfig};
use warden_core::config::logging::LoggingConfig;
use warden_core::config::seed::SeedConfig;
use warden_core::config::session::SessionConfig;
use warden_core::config::worker::WorkerConfig;
use warden_core::error::AppError;
use warden_core::result::AppResult;
use warden_core::traits::alert::AlertSink;
use warden_core::traits::cache::CacheProvider;
use warden_core::traits::health::HealthCheck;
use warden_entity::user::{User, UserRole};

/// Password of every user created by the helpers.
pub const PASSWORD: &str = "password";

/// Alert sink that keeps every message for inspection.
#[derive(Debug, Default)]
pub struct RecordingAlertSink {
    messages: Mutex<Vec<String>>,
}

impl RecordingAlertSink {
    /// Messages sent so far.
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

impl AlertSink for RecordingAlertSink {
    fn send(&self, message: String) {
        self.messages.lock().unwrap().push(message);
    }
}

/// Socket peer every test request appears to come from.
pub fn peer() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 40_000))
}

/// In-memory store that can be switched into a hard outage.
#[derive(Debug)]
pub struct SwitchableCache {
    inner: MemoryCacheProvider,
    down: AtomicBool,
}

impl SwitchableCache {
    /// A healthy store.
    pub fn new() -> Self {
        Self {
            inner: MemoryCacheProvider::new(&MemoryCacheConfig::default()),
            down: AtomicBool::new(false),
        }
    }

    /// Make every following call fail, or recover.
    pub fn set_down(&self, down: bool) {
        self.down.store(down, Ordering::SeqCst);
    }

    fn guard(&self) -> AppResult<()> {
        if self.down.load(Ordering::SeqCst) {
            Err(AppError::cache("connection refused"))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl CacheProvider for SwitchableCache {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        self.guard()?;
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()> {
        self.guard()?;
        self.inner.set(key, value, ttl).await
    }

    async fn set_persistent(&self, key: &str, value: &str) -> AppResult<()> {
        self.guard()?;
        self.inner.set_persistent(key, value).await
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.guard()?;
        self.inner.delete(key).await
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        self.guard()?;
        self.inner.exists(key).await
    }

    fn scan_prefix(&self, prefix: &str) -> BoxStream<'static, AppResult<String>> {
        match self.guard() {
            Ok(()) => self.inner.scan_prefix(prefix),
            Err(e) => stream::once(async move { Err(e) }).boxed(),
        }
    }

    async fn compare_and_swap(
        &self,
        key: &str,
        expected: &str,
        new_value: &str,
        ttl: Duration,
    ) -> AppResult<bool> {
        self.guard()?;
        self.inner.compare_and_swap(key, expected, new_value, ttl).await
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(!self.down.load(Ordering::SeqCst))
    }
}

/// Database stand-in with a fixed health answer.
#[derive(Debug)]
pub struct StaticDatabase {
    /// Whether `check` succeeds.
    pub up: bool,
}

#[async_trait]
impl HealthCheck for StaticDatabase {
    fn component(&self) -> &'static str {
        "database"
    }

    async fn check(&self) -> AppResult<()> {
        if self.up {
            Ok(())
        } else {
            Err(AppError::database("connection refused"))
        }
    }
}

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// User directory behind the router
    pub users: Arc<MemoryUserDirectory>,
    /// Alerts raised while serving requests
    pub alerts: Arc<RecordingAlertSink>,
    /// The tenant every non-platform test user belongs to
    pub tenant_id: Uuid,
}

/// Configuration for tests: in-memory cache, no scheduler, no alerts.
pub fn test_config() -> AppConfig {
    AppConfig {
        server: ServerConfig {
            auth_rate_per_minute: 1_000,
            ..ServerConfig::default()
        },
        database: DatabaseConfig {
            url: "postgres://unused".to_string(),
            max_connections: 1,
            acquire_timeout_seconds: 1,
        },
        cache: CacheConfig::default(),
        auth: AuthConfig {
            jwt_secret: "integration-test-secret-integration-test".to_string(),
            issuer: "warden".to_string(),
            access_ttl_minutes: 15,
            refresh_ttl_hours: 24,
        },
        session: SessionConfig::default(),
        alert: AlertConfig::default(),
        worker: WorkerConfig {
            enabled: false,
            ..WorkerConfig::default()
        },
        logging: LoggingConfig::default(),
        seed: SeedConfig::default(),
    }
}

impl TestApp {
    /// Create a new test application
    pub async fn new() -> Self {
        Self::with_config(test_config()).await
    }

    /// Create a test application from an explicit configuration
    pub async fn with_config(config: AppConfig) -> Self {
        let cache = CacheManager::new(&config.cache)
            .await
            .expect("Failed to init cache");
        Self::build(config, cache, None).await
    }

    /// Create a test application over explicit backends
    pub async fn with_backends(
        cache: Arc<dyn CacheProvider>,
        database: Option<Arc<dyn HealthCheck>>,
    ) -> Self {
        Self::build(test_config(), CacheManager::from_provider(cache), database).await
    }

    async fn build(
        config: AppConfig,
        cache: CacheManager,
        database: Option<Arc<dyn HealthCheck>>,
    ) -> Self {
        let cache = Arc::new(cache);
        let users = Arc::new(MemoryUserDirectory::new());
        let alerts = Arc::new(RecordingAlertSink::default());

        let gate = Arc::new(AuthorizationGate::new(Arc::new(MemoryPolicyStore::new())));
        let tenant_id = Uuid::new_v4();
        gate.setup_default_policies(&tenant_id.to_string())
            .await
            .expect("Failed to install tenant policies");
        for rule in platform_policies() {
            gate.add_policy(rule)
                .await
                .expect("Failed to install platform policies");
        }

        let codec = Arc::new(TokenCodec::new(&config.auth).expect("Failed to build codec"));
        let store = Arc::new(SessionStore::new(Arc::clone(&cache), &config.session));
        let session_manager = Arc::new(SessionManager::new(
            codec,
            store,
            users.clone(),
            Arc::new(PasswordHasher::new()),
            alerts.clone(),
            &config.auth,
        ));

        let mut state = AppState::new(
            Arc::new(config),
            cache,
            session_manager,
            gate,
            users.clone(),
            alerts.clone(),
        );
        if let Some(database) = database {
            state = state.with_database(database);
        }

        Self {
            router: build_router(state),
            users,
            alerts,
            tenant_id,
        }
    }

    /// Create a user in the test tenant (or without tenant for platform roles).
    pub fn create_user(&self, username: &str, role: UserRole) -> Uuid {
        let hash = PasswordHasher::new()
            .hash_password(PASSWORD)
            .expect("Failed to hash password");
        let id = Uuid::new_v4();
        self.users.insert(User {
            id,
            tenant_id: (!role.is_platform()).then_some(self.tenant_id),
            full_name: format!("Test {username}"),
            username: username.to_string(),
            password_hash: hash,
            phone: None,
            role,
            is_active: true,
            created_at: Utc::now(),
        });
        id
    }

    /// Sign in and return `(access_token, refresh_token)`.
    pub async fn sign_in(&self, username: &str) -> (String, String) {
        self.sign_in_as(username, "integration-tests").await
    }

    /// Sign in with an explicit User-Agent.
    pub async fn sign_in_as(&self, username: &str, user_agent: &str) -> (String, String) {
        let body = serde_json::json!({
            "username": username,
            "password": PASSWORD,
        });

        let response = self
            .send(
                "POST",
                "/api/v1/auth/sign-in",
                Some(body),
                None,
                &[("user-agent", user_agent)],
            )
            .await;

        assert_eq!(
            response.status,
            StatusCode::OK,
            "Sign-in failed: {:?}",
            response.body
        );

        let data = &response.body["data"];
        (
            data["access_token"]
                .as_str()
                .expect("No access_token in sign-in response")
                .to_string(),
            data["refresh_token"]
                .as_str()
                .expect("No refresh_token in sign-in response")
                .to_string(),
        )
    }

    /// Refresh a session with the given User-Agent.
    pub async fn refresh(
        &self,
        access_token: &str,
        refresh_token: &str,
        user_agent: &str,
    ) -> TestResponse {
        self.send(
            "POST",
            "/api/v1/auth/refresh",
            Some(serde_json::json!({ "refresh_token": refresh_token })),
            Some(access_token),
            &[("user-agent", user_agent)],
        )
        .await
    }

    /// Make an HTTP request to the test app
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        self.send(method, path, body, token, &[]).await
    }

    /// Make an HTTP request with extra headers
    pub async fn send(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
        headers: &[(&str, &str)],
    ) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json");

        if let Some(token) = token {
            req = req.header("Authorization", format!("Bearer {}", token));
        }
        for (name, value) in headers {
            req = req.header(*name, *value);
        }

        let mut req = req
            .body(Body::from(body_str))
            .expect("Failed to build request");
        req.extensions_mut().insert(ConnectInfo(peer()));

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let headers = response.headers().clone();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");

        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse {
            status,
            headers,
            body,
        }
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Response headers
    pub headers: HeaderMap,
    /// Parsed JSON body
    pub body: Value,
}

impl TestResponse {
    /// The `code` field of the envelope.
    pub fn code(&self) -> &str {
        self.body["code"].as_str().unwrap_or_default()
    }
}
