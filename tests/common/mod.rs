#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{self, Body},
    http::{Method, Request, StatusCode},
    response::Response,
    Router,
};
use gudang_api::{
    auth::{AuthConfig, AuthService},
    config::AppConfig,
    db,
    events::{self, ChangeFeed, EventHandler, EventSender, MetricsEventHandler},
    handlers::AppServices,
    models::UserRole,
    services::users::NewUser,
    AppState,
};
use serde_json::{json, Value};
use tempfile::TempDir;
use tokio::sync::mpsc;
use tower::ServiceExt;
use uuid::Uuid;

pub const TEST_SECRET: &str = "Xk9#mQ2vL7pR4wZ8nB3cF6hJ1tY5uE0sA9dG2kM7qW4xV8zN3bC6fH1jT5yU0iOp";
pub const PASSWORD: &str = "rahasia123";

/// A seeded account and the token it logged in with.
pub struct TestUser {
    pub id: Uuid,
    pub email: String,
    pub token: String,
}

/// Helper harness for spinning up the full application on a throwaway SQLite file.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    pub staff: TestUser,
    pub verifier: TestUser,
    pub admin: TestUser,
    _event_task: tokio::task::JoinHandle<()>,
    _dir: TempDir,
}

impl TestApp {
    /// Construct a new test application with fresh database state and one
    /// account per role.
    pub async fn new() -> Self {
        let dir = tempfile::tempdir().expect("temp dir for test database");
        let db_path = dir.path().join("gudang_test.db");

        let mut cfg = AppConfig::new(
            format!("sqlite://{}?mode=rwc", db_path.display()),
            TEST_SECRET.to_string(),
            3600,
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );
        cfg.auto_migrate = true;
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;
        cfg.low_stock_threshold = 10;

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let db_arc = Arc::new(pool);
        let (event_tx, event_rx) = mpsc::channel(256);
        let event_sender = EventSender::new(event_tx);
        let handlers: Vec<Arc<dyn EventHandler>> = vec![Arc::new(MetricsEventHandler)];
        let event_task = tokio::spawn(events::process_events(event_rx, handlers));

        let services = AppServices::new(
            db_arc.clone(),
            Arc::new(event_sender.clone()),
            ChangeFeed::new(cfg.change_feed_capacity),
            &cfg,
        );
        let auth_service = Arc::new(
            AuthService::new(AuthConfig::from(&cfg), db_arc.clone())
                .with_event_sender(event_sender.clone()),
        );

        let state = AppState {
            db: db_arc,
            config: cfg,
            event_sender,
            services,
            auth_service: auth_service.clone(),
        };

        let staff = seed_user(&state, &auth_service, "staff@pln.co.id", "Budi Staff", UserRole::Staff).await;
        let verifier = seed_user(
            &state,
            &auth_service,
            "verifikator@pln.co.id",
            "Sari Verifikator",
            UserRole::Verifikator,
        )
        .await;
        let admin = seed_user(
            &state,
            &auth_service,
            "admin@pln.co.id",
            "Andi Admin",
            UserRole::AdminGudang,
        )
        .await;

        let router = gudang_api::app_router(state.clone());

        Self {
            router,
            state,
            staff,
            verifier,
            admin,
            _event_task: event_task,
            _dir: dir,
        }
    }

    /// Send a request against the router with an optional bearer token.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(tok) = token {
            builder = builder.header("authorization", format!("Bearer {}", tok));
        }

        let body = if let Some(json) = body {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
        } else {
            Body::empty()
        };

        let request = builder.body(body).expect("failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    /// Sends a request and returns the status with the decoded JSON body.
    pub async fn call(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: &str,
    ) -> (StatusCode, Value) {
        let response = self.request(method, uri, body, Some(token)).await;
        let status = response.status();
        (status, response_json(response).await)
    }

    /// Logs in through `/auth/login` and returns the raw response.
    pub async fn login(&self, email: &str, password: &str) -> Response {
        self.request(
            Method::POST,
            "/auth/login",
            Some(json!({ "email": email, "password": password })),
            None,
        )
        .await
    }

    /// Submits a general material as `token` and returns the created item.
    pub async fn submit_material(&self, token: &str, name: &str, quantity: i64) -> Value {
        let (status, body) = self
            .call(
                Method::POST,
                "/api/v1/items",
                Some(json!({
                    "kind": "material_umum",
                    "name": name,
                    "quantity": quantity,
                    "location": "Rak 2",
                    "category": "MCB",
                    "condition": "andal"
                })),
                token,
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "submit failed: {body}");
        body["data"].clone()
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        self._event_task.abort();
    }
}

async fn seed_user(
    state: &AppState,
    auth: &AuthService,
    email: &str,
    name: &str,
    role: UserRole,
) -> TestUser {
    let profile = state
        .services
        .users
        .create(NewUser {
            email: email.to_string(),
            name: name.to_string(),
            password: PASSWORD.to_string(),
            role: Some(role),
        })
        .await
        .expect("seed user");
    let token = auth
        .login(email, PASSWORD)
        .await
        .expect("seeded user can log in")
        .access_token;

    TestUser {
        id: profile.id,
        email: profile.email,
        token,
    }
}

pub async fn response_json(response: Response) -> Value {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body bytes");
    if bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(&bytes).expect("json response")
}
