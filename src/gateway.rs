use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

use crate::client::{ApiClient, ClientError, LogNavigator};
use crate::config::AppConfig;
use crate::handlers;
use crate::middleware::route_guard_middleware;
use crate::session::SessionStore;

/// Shared state of the gateway server
#[derive(Clone)]
pub struct GatewayState {
    pub config: Arc<AppConfig>,
    pub http: reqwest::Client,
}

impl GatewayState {
    pub fn new(config: AppConfig) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.backend.timeout_secs))
            .build()?;
        Ok(Self {
            config: Arc::new(config),
            http,
        })
    }

    /// API client over a fresh in-memory session, one per browser request
    pub fn ephemeral_client(&self) -> Result<ApiClient, ClientError> {
        let session = Arc::new(SessionStore::ephemeral(&self.config.session));
        Ok(ApiClient::new(&self.config.backend.base_url, session, Arc::new(LogNavigator::new()))?
            .with_http(self.http.clone())
            .with_login_path(self.config.routes.login_path.clone()))
    }

    pub fn backend_url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.config.backend.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

pub fn app(state: GatewayState) -> Router {
    let static_root = state.config.server.static_root.clone();
    let index = static_root.join("index.html");

    let mut router = Router::new()
        // Public
        .route("/health", get(handlers::health))
        // Browser login / logout
        .merge(auth_routes())
        // Server-side backend proxies
        .merge(proxy_routes())
        // Client bundle with SPA fallback
        .fallback_service(ServeDir::new(&static_root).fallback(ServeFile::new(index)))
        .layer(middleware::from_fn_with_state(state.clone(), route_guard_middleware))
        .with_state(state.clone());

    if state.config.security.enable_cors {
        router = router.layer(cors_layer(&state.config.security.cors_origins));
    }
    if state.config.server.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }
    router
}

fn auth_routes() -> Router<GatewayState> {
    use handlers::session;

    Router::new()
        .route("/auth/otp", post(session::send_otp))
        .route("/auth/session", post(session::login).delete(session::logout))
}

fn proxy_routes() -> Router<GatewayState> {
    use handlers::owner;

    Router::new()
        .route("/api/owner/blocks/:car_id", get(owner::blocks_get).post(owner::blocks_post))
        .route(
            "/api/owner/ride_action/:booking_id",
            get(owner::ride_action_get).post(owner::ride_action_post),
        )
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
}
