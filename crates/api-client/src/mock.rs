//! In-process backend used by the client tests.
//!
//! Mimics the Q&A backend's auth behavior: login issues `A`/`R`, refresh
//! swaps the valid access token for `T2`, protected routes answer 401 with
//! the backend's `token_not_valid` payload when the bearer does not match.

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use axum::Json;
use axum::Router;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, Uri};
use axum::routing::{get, post};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::sync::Notify;

pub const REFRESHED_ACCESS: &str = "T2";

#[derive(Default)]
pub struct Backend {
    pub valid_access: Mutex<String>,
    pub valid_refresh: Mutex<String>,
    pub reject_refresh: AtomicBool,
    pub rotate_refresh: AtomicBool,
    pub refresh_calls: AtomicUsize,
    pub refresh_delay: Mutex<Duration>,
    /// When set, the refresh handler signals `refresh_entered` and waits on
    /// `refresh_gate` before answering.
    pub hold_refresh: AtomicBool,
    pub refresh_entered: Notify,
    pub refresh_gate: Notify,
    /// `(path, authorization header)` for every resource request
    pub seen: Mutex<Vec<(String, Option<String>)>>,
}

impl Backend {
    pub fn new() -> Arc<Self> {
        let backend = Self::default();
        *backend.valid_access.lock().unwrap() = "A".into();
        *backend.valid_refresh.lock().unwrap() = "R".into();
        Arc::new(backend)
    }

    /// Invalidate the current access token, as if it expired.
    pub fn expire_access(&self) {
        *self.valid_access.lock().unwrap() = "expired-on-server".into();
    }

    pub fn refresh_calls(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }

    /// Authorization headers seen for requests to `path`, in order.
    pub fn auth_for(&self, path: &str) -> Vec<Option<String>> {
        self.seen
            .lock()
            .unwrap()
            .iter()
            .filter(|(p, _)| p == path)
            .map(|(_, a)| a.clone())
            .collect()
    }

    fn record(&self, uri: &Uri, headers: &HeaderMap) -> Option<String> {
        let auth = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        self.seen
            .lock()
            .unwrap()
            .push((uri.path().to_owned(), auth.clone()));
        auth
    }

    fn authorized(&self, auth: Option<&str>) -> bool {
        let expected = format!("Bearer {}", self.valid_access.lock().unwrap());
        auth == Some(expected.as_str())
    }
}

fn token_not_valid() -> (StatusCode, Json<Value>) {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({
            "detail": "Given token not valid for any token type",
            "code": "token_not_valid"
        })),
    )
}

async fn login(State(b): State<Arc<Backend>>, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    if body["username"] == "alice" && body["password"] == "secret" {
        *b.valid_access.lock().unwrap() = "A".into();
        *b.valid_refresh.lock().unwrap() = "R".into();
        (StatusCode::OK, Json(json!({"access": "A", "refresh": "R"})))
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({"detail": "No active account found with the given credentials"})),
        )
    }
}

async fn refresh(State(b): State<Arc<Backend>>, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    b.refresh_calls.fetch_add(1, Ordering::SeqCst);

    if b.hold_refresh.load(Ordering::SeqCst) {
        b.refresh_entered.notify_one();
        b.refresh_gate.notified().await;
    }
    let delay = *b.refresh_delay.lock().unwrap();
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }

    let presented = body["refresh"].as_str().unwrap_or_default().to_owned();
    let valid = b.valid_refresh.lock().unwrap().clone();
    if b.reject_refresh.load(Ordering::SeqCst) || presented != valid {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"detail": "Token is invalid or expired", "code": "token_not_valid"})),
        );
    }

    *b.valid_access.lock().unwrap() = REFRESHED_ACCESS.into();
    if b.rotate_refresh.load(Ordering::SeqCst) {
        *b.valid_refresh.lock().unwrap() = "R2".into();
        (
            StatusCode::OK,
            Json(json!({"access": REFRESHED_ACCESS, "refresh": "R2"})),
        )
    } else {
        (StatusCode::OK, Json(json!({"access": REFRESHED_ACCESS})))
    }
}

async fn register(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    if body["username"].as_str().unwrap_or_default().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"username": ["This field may not be blank."]})),
        );
    }
    (
        StatusCode::CREATED,
        Json(json!({"username": body["username"], "email": body["email"]})),
    )
}

async fn list_questions(
    State(b): State<Arc<Backend>>,
    uri: Uri,
    headers: HeaderMap,
) -> (StatusCode, Json<Value>) {
    b.record(&uri, &headers);
    (
        StatusCode::OK,
        Json(json!([
            {"id": 1, "title": "How do lifetimes work?"},
            {"id": 2, "title": "Why is my future not Send?"}
        ])),
    )
}

async fn create_question(
    State(b): State<Arc<Backend>>,
    uri: Uri,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let auth = b.record(&uri, &headers);
    if !b.authorized(auth.as_deref()) {
        return token_not_valid();
    }
    (
        StatusCode::CREATED,
        Json(json!({"id": 42, "title": body["title"], "content": body["content"]})),
    )
}

async fn profile(State(b): State<Arc<Backend>>, uri: Uri, headers: HeaderMap) -> (StatusCode, Json<Value>) {
    let auth = b.record(&uri, &headers);
    if !b.authorized(auth.as_deref()) {
        return token_not_valid();
    }
    (StatusCode::OK, Json(json!({"id": 7, "username": "alice"})))
}

async fn always_unauthorized(
    State(b): State<Arc<Backend>>,
    uri: Uri,
    headers: HeaderMap,
) -> (StatusCode, Json<Value>) {
    b.record(&uri, &headers);
    token_not_valid()
}

async fn broken(State(b): State<Arc<Backend>>, uri: Uri, headers: HeaderMap) -> (StatusCode, Json<Value>) {
    b.record(&uri, &headers);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({"detail": "A server error occurred."})),
    )
}

async fn echo(State(b): State<Arc<Backend>>, uri: Uri, headers: HeaderMap) -> (StatusCode, Json<Value>) {
    b.record(&uri, &headers);
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned)
    };
    (
        StatusCode::OK,
        Json(json!({
            "path": uri.path(),
            "query": uri.query(),
            "request_id": header("x-request-id"),
            "content_type": header("content-type"),
        })),
    )
}

/// Serve `backend` on an ephemeral port. Returns the API base URL (`.../api`).
pub async fn spawn(backend: Arc<Backend>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let api = Router::new()
        .route("/auth/login/", post(login))
        .route("/auth/token/refresh/", post(refresh))
        .route("/auth/register/", post(register))
        .route("/auth/profile/", get(profile))
        .route("/questions/", get(list_questions).post(create_question))
        .route("/always-401/", get(always_unauthorized))
        .route("/broken/", get(broken))
        .route("/echo/", get(echo))
        .with_state(backend);
    let app = Router::new().nest("/api", api);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{addr}/api")
}
