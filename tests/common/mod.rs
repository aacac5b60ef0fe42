#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};

use hanuman_web::config::AppConfig;

pub const OTP: &str = "123456";
pub const SERVICE_TOKEN: &str = "service-token";

static SERVER: OnceLock<TestServer> = OnceLock::new();
static BACKEND: OnceLock<MockBackend> = OnceLock::new();

/// Counters the mock backend keeps so tests can assert on call counts
#[derive(Default)]
pub struct Calls {
    pub role: AtomicUsize,
    pub logout: AtomicUsize,
    pub unauthorized: AtomicUsize,
}

pub struct MockBackend {
    pub base_url: String,
    pub calls: Arc<Calls>,
}

impl MockBackend {
    pub fn role_calls(&self) -> usize {
        self.calls.role.load(Ordering::SeqCst)
    }

    pub fn logout_calls(&self) -> usize {
        self.calls.logout.load(Ordering::SeqCst)
    }

    pub fn unauthorized_calls(&self) -> usize {
        self.calls.unauthorized.load(Ordering::SeqCst)
    }
}

// Tokens the mock accepts and the identity /role reports for each.
fn identity_for(token: &str) -> Option<Value> {
    match token {
        "tok1" => Some(json!({ "role": "owner", "email": "a@b.com" })),
        "tok-user" => Some(json!({ "role": "user", "email": "u@b.com", "name": "Uma" })),
        "tok-admin" => Some(json!({ "role": "admin", "email": "root@b.com" })),
        "tok-norole" => Some(json!({ "email": "n@b.com" })),
        _ => None,
    }
}

fn bearer(headers: &HeaderMap) -> Option<String> {
    headers
        .get("authorization")?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::to_string)
}

fn unauthorized(calls: &Calls) -> Response {
    calls.unauthorized.fetch_add(1, Ordering::SeqCst);
    (StatusCode::UNAUTHORIZED, Json(json!({ "error": "Token expired" }))).into_response()
}

fn mock_router(calls: Arc<Calls>) -> Router {
    Router::new()
        .route("/login", post(mock_login))
        .route("/register", post(mock_register))
        .route("/role", get(mock_role))
        .route("/logout", post(mock_logout))
        .route("/user/bookings/:kind", get(mock_bookings))
        .route("/owner/block/:car_id", get(mock_blocks).post(mock_block_create))
        .route("/owner/ride_action/:booking_id", get(mock_ride_action))
        .route("/owner/start_ride/:booking_id", post(mock_start_ride))
        .with_state(calls)
}

async fn mock_login(Json(body): Json<Value>) -> Response {
    match body["action"].as_str() {
        Some("send_otp") => Json(json!({ "otp_sent": true })).into_response(),
        Some("login") if body["otp"] == OTP => {
            let token = match body["email"].as_str() {
                Some("u@b.com") => "tok-user",
                Some("root@b.com") => "tok-admin",
                Some("n@b.com") => "tok-norole",
                _ => "tok1",
            };
            Json(json!({ "access_token": token })).into_response()
        }
        _ => (StatusCode::BAD_REQUEST, Json(json!({ "error": "Invalid OTP" }))).into_response(),
    }
}

async fn mock_register(Json(body): Json<Value>) -> Json<Value> {
    match body["action"].as_str() {
        Some("register") => Json(json!({ "registered": true })),
        _ => Json(json!({ "otp_sent": true })),
    }
}

async fn mock_role(State(calls): State<Arc<Calls>>, headers: HeaderMap) -> Response {
    calls.role.fetch_add(1, Ordering::SeqCst);
    match bearer(&headers).as_deref().and_then(identity_for) {
        Some(identity) => Json(identity).into_response(),
        None => unauthorized(&calls),
    }
}

async fn mock_logout(State(calls): State<Arc<Calls>>) -> Json<Value> {
    calls.logout.fetch_add(1, Ordering::SeqCst);
    Json(json!({ "logged_out": true }))
}

async fn mock_bookings(State(calls): State<Arc<Calls>>, Path(kind): Path<String>, headers: HeaderMap) -> Response {
    match bearer(&headers).as_deref().and_then(identity_for) {
        Some(_) => Json(json!({ "kind": kind, "bookings": [] })).into_response(),
        None => unauthorized(&calls),
    }
}

async fn mock_blocks(State(calls): State<Arc<Calls>>, Path(car_id): Path<u64>, headers: HeaderMap) -> Response {
    if bearer(&headers).as_deref() != Some(SERVICE_TOKEN) {
        return unauthorized(&calls);
    }
    Json(json!({ "car_id": car_id, "blocks": [] })).into_response()
}

async fn mock_block_create(
    State(calls): State<Arc<Calls>>,
    Path(car_id): Path<u64>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if bearer(&headers).as_deref() != Some(SERVICE_TOKEN) {
        return unauthorized(&calls);
    }
    (StatusCode::CREATED, Json(json!({ "car_id": car_id, "block": body }))).into_response()
}

async fn mock_ride_action(State(calls): State<Arc<Calls>>, Path(booking_id): Path<u64>, headers: HeaderMap) -> Response {
    if bearer(&headers).as_deref() != Some(SERVICE_TOKEN) {
        return unauthorized(&calls);
    }
    Json(json!({ "booking_id": booking_id, "status": "ongoing" })).into_response()
}

async fn mock_start_ride(
    State(calls): State<Arc<Calls>>,
    Path(booking_id): Path<u64>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if bearer(&headers).as_deref() != Some(SERVICE_TOKEN) {
        return unauthorized(&calls);
    }
    if body["otp"] != "4321" {
        return (StatusCode::BAD_REQUEST, Json(json!({ "error": "Wrong ride OTP" }))).into_response();
    }
    Json(json!({ "booking": { "id": booking_id, "status": "ongoing" } })).into_response()
}

/// Mock backend on the current runtime; lives as long as the test
pub async fn spawn_backend() -> Result<MockBackend> {
    let calls = Arc::new(Calls::default());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let app = mock_router(calls.clone());
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok(MockBackend {
        base_url: format!("http://{}", addr),
        calls,
    })
}

/// Mock backend on its own thread, shared by every test in the binary.
/// Each #[tokio::test] has its own runtime, so the spawned gateway needs a
/// backend that outlives any single test.
pub fn shared_backend() -> &'static MockBackend {
    BACKEND.get_or_init(|| {
        let calls = Arc::new(Calls::default());
        let (tx, rx) = std::sync::mpsc::channel::<SocketAddr>();
        let app = mock_router(calls.clone());

        std::thread::spawn(move || {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .expect("mock backend runtime");
            runtime.block_on(async move {
                let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
                    .await
                    .expect("bind mock backend");
                tx.send(listener.local_addr().expect("mock backend address"))
                    .expect("report mock backend address");
                let _ = axum::serve(listener, app).await;
            });
        });

        let addr = rx.recv().expect("mock backend did not start");
        MockBackend {
            base_url: format!("http://{}", addr),
            calls,
        }
    })
}

/// Static client bundle with a single SPA entry point
pub fn static_root() -> Result<tempfile::TempDir> {
    let dir = tempfile::tempdir()?;
    std::fs::write(dir.path().join("index.html"), "<!doctype html><title>HanumanCars</title>")?;
    std::fs::write(dir.path().join("logo.svg"), "<svg/>")?;
    Ok(dir)
}

/// Development config pointed at `backend_url` and `static_root`
pub fn test_config(backend_url: &str, static_root: PathBuf) -> AppConfig {
    let mut config = AppConfig::development();
    config.server.static_root = static_root;
    config.server.enable_request_logging = false;
    config.backend.base_url = backend_url.to_string();
    config.backend.service_token = Some(SERVICE_TOKEN.to_string());
    config.backend.timeout_secs = 5;
    config
}

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    child: Child,
    _static_root: tempfile::TempDir,
}

impl TestServer {
    fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);
        let static_root = static_root()?;
        let backend = shared_backend();

        let mut cmd = Command::new(env!("CARGO_BIN_EXE_hanuman-web"));
        cmd.env("HANUMAN_PORT", port.to_string())
            .env("HANUMAN_STATIC_ROOT", static_root.path())
            .env("HANUMAN_API_BASE_URL", &backend.base_url)
            .env("BACKEND_API_TOKEN", SERVICE_TOKEN)
            .env("APP_ENV", "development")
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        let child = cmd.spawn().context("failed to spawn gateway binary")?;

        Ok(Self {
            port,
            base_url,
            child,
            _static_root: static_root,
        })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            let url = format!("{}/health", self.base_url);
            if let Ok(resp) = client.get(&url).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!("gateway did not become ready on {} within {:?}", self.base_url, timeout)
    }
}

pub async fn ensure_server() -> Result<&'static TestServer> {
    let server = SERVER.get_or_init(|| TestServer::spawn().expect("failed to spawn gateway binary"));
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(server)
}

/// HTTP client that leaves redirects for the test to inspect
pub fn no_redirect_client() -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()?)
}
