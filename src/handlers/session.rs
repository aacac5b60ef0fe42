use axum::{
    extract::{Json, State},
    http::{header::SET_COOKIE, HeaderValue},
    response::{IntoResponse, Response},
    Extension,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::{self, AuthFlow};
use crate::error::ApiError;
use crate::gateway::GatewayState;
use crate::middleware::{ApiResponse, ApiResult, RequestIdentity};
use crate::session::bridge::{removal_cookie, BridgeSettings};

#[derive(Debug, Deserialize)]
pub struct OtpRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub otp: String,
    /// Page the route guard bounced the browser from
    #[serde(default)]
    pub redirect: Option<String>,
}

/// POST /auth/otp
pub async fn send_otp(State(state): State<GatewayState>, Json(request): Json<OtpRequest>) -> ApiResult<Value> {
    let email = request.email.trim();
    if email.is_empty() {
        return Err(ApiError::bad_request("Email is required"));
    }

    let client = state.ephemeral_client()?;
    let otp_sent = AuthFlow::new(&client).send_otp(email).await?;
    Ok(ApiResponse::success(json!({ "otp_sent": otp_sent })))
}

/// POST /auth/session
///
/// Runs the OTP login against the backend and hands the browser the bridge
/// cookie the route guard reads on every later navigation.
pub async fn login(State(state): State<GatewayState>, Json(request): Json<LoginRequest>) -> Result<Response, ApiError> {
    let email = request.email.trim();
    if email.is_empty() || request.otp.trim().is_empty() {
        return Err(ApiError::bad_request("Email and OTP are required"));
    }

    let client = state.ephemeral_client()?;
    let user = AuthFlow::new(&client).login(email, request.otp.trim()).await?;
    let redirect_to = auth::destination(&user, request.redirect.as_deref());
    tracing::info!("Login succeeded for {} ({})", user.email, user.role);

    let cookie = client
        .session()
        .bridge()
        .set_cookie_header()
        .ok_or_else(|| ApiError::internal_server_error("Session cookie was not written"))?;
    let cookie = HeaderValue::from_str(&cookie)
        .map_err(|_| ApiError::internal_server_error("Session cookie is not a valid header"))?;

    let body = ApiResponse::success(json!({
        "user": user,
        "token": client.session().token(),
        "redirect_to": redirect_to,
    }));
    let mut response = body.into_response();
    response.headers_mut().append(SET_COOKIE, cookie);
    Ok(response)
}

/// DELETE /auth/session
///
/// Always clears the bridge cookie; telling the backend is best-effort.
pub async fn logout(State(state): State<GatewayState>, identity: Option<Extension<RequestIdentity>>) -> Response {
    if let Some(Extension(identity)) = identity {
        let result = state
            .http
            .post(state.backend_url("/logout"))
            .bearer_auth(&identity.token)
            .send()
            .await;
        if let Err(e) = result {
            tracing::debug!("Backend logout failed: {}", e);
        }
    }

    let removal = removal_cookie(&BridgeSettings::from_config(&state.config.session));
    let mut response = ApiResponse::success(json!({ "logged_out": true })).into_response();
    match HeaderValue::from_str(&removal.encoded().to_string()) {
        Ok(value) => {
            response.headers_mut().append(SET_COOKIE, value);
        }
        Err(e) => tracing::warn!("Could not encode removal cookie: {}", e),
    }
    response
}
