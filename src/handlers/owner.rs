// Owner screens the backend only serves to the server-held token.
// /api/* is skipped by the route guard, so each handler resolves the caller's
// token through the backend's /role before spending the service token.
use axum::{
    extract::{Json, Path, Query, State},
    http::{HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::Value;

use crate::client::RideAction;
use crate::error::ApiError;
use crate::gateway::GatewayState;
use crate::middleware::route_guard::identify;
use crate::session::RoleLookup;
use crate::types::Role;

#[derive(Debug, Deserialize)]
pub struct RideQuery {
    pub action: RideAction,
}

/// GET /api/owner/blocks/:car_id
pub async fn blocks_get(
    State(state): State<GatewayState>,
    headers: HeaderMap,
    Path(car_id): Path<String>,
) -> Result<Response, ApiError> {
    require_owner(&state, &headers).await?;
    proxy(&state, Method::GET, &format!("/owner/block/{}", car_id), None).await
}

/// POST /api/owner/blocks/:car_id
pub async fn blocks_post(
    State(state): State<GatewayState>,
    headers: HeaderMap,
    Path(car_id): Path<String>,
    Json(body): Json<Value>,
) -> Result<Response, ApiError> {
    require_owner(&state, &headers).await?;
    proxy(&state, Method::POST, &format!("/owner/block/{}", car_id), Some(body)).await
}

/// GET /api/owner/ride_action/:booking_id
pub async fn ride_action_get(
    State(state): State<GatewayState>,
    headers: HeaderMap,
    Path(booking_id): Path<String>,
) -> Result<Response, ApiError> {
    require_owner(&state, &headers).await?;
    proxy(&state, Method::GET, &format!("/owner/ride_action/{}", booking_id), None).await
}

/// POST /api/owner/ride_action/:booking_id?action=start|end
pub async fn ride_action_post(
    State(state): State<GatewayState>,
    headers: HeaderMap,
    Path(booking_id): Path<String>,
    Query(query): Query<RideQuery>,
    Json(body): Json<Value>,
) -> Result<Response, ApiError> {
    require_owner(&state, &headers).await?;
    proxy(&state, Method::POST, &query.action.path(&booking_id), Some(body)).await
}

async fn require_owner(state: &GatewayState, headers: &HeaderMap) -> Result<(), ApiError> {
    let identity = identify(headers, &state.config.session.storage_name)
        .ok_or_else(|| ApiError::unauthorized("Login required"))?;

    // The bridge cookie is client-written; only the backend's answer counts.
    let client = state.ephemeral_client()?;
    let role = client
        .lookup_role(&identity.token)
        .await?
        .role
        .ok_or_else(|| ApiError::unauthorized("Login required"))?;

    if role != Role::Owner {
        return Err(ApiError::forbidden(format!("{} accounts cannot manage owner rides", role)));
    }
    Ok(())
}

// Forward to the backend and relay its status and JSON body unchanged.
async fn proxy(state: &GatewayState, method: Method, path: &str, body: Option<Value>) -> Result<Response, ApiError> {
    let token = state
        .config
        .backend
        .service_token
        .as_deref()
        .ok_or_else(|| ApiError::service_unavailable("Backend service token is not configured"))?;

    let mut request = state.http.request(method, state.backend_url(path)).bearer_auth(token);
    if let Some(body) = body {
        request = request.json(&body);
    }

    let response = request.send().await.map_err(|e| {
        tracing::error!("Backend request {} failed: {}", path, e);
        ApiError::bad_gateway("Backend unavailable")
    })?;

    let status = StatusCode::from_u16(response.status().as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
    let text = response
        .text()
        .await
        .map_err(|e| ApiError::bad_gateway(format!("Failed to read backend response: {}", e)))?;
    let data = if text.trim().is_empty() {
        Value::Null
    } else {
        serde_json::from_str(&text).unwrap_or(Value::String(text))
    };

    Ok((status, Json(data)).into_response())
}
