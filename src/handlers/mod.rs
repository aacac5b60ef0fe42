// handlers/mod.rs - Gateway endpoints
//
// Everything except /api/* passes the route guard middleware first; the
// handlers here are all reachable without a session.
pub mod owner;   // /api/owner/* - backend proxies using the service token
pub mod session; // /auth/otp, /auth/session - browser login and logout

use serde_json::{json, Value};

use crate::middleware::ApiResponse;

/// GET /health - liveness probe
pub async fn health() -> ApiResponse<Value> {
    ApiResponse::success(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now(),
    }))
}
