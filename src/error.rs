// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::client::ClientError;

/// Gateway error with appropriate status codes and client-friendly messages
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),

    // 401 Unauthorized
    Unauthorized(String),

    // 403 Forbidden
    Forbidden(String),

    // 404 Not Found
    NotFound(String),

    // 500 Internal Server Error
    InternalServerError(String),

    // 502 Bad Gateway (backend issues)
    BadGateway(String),

    // 503 Service Unavailable
    ServiceUnavailable(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::BadRequest(_) => 400,
            ApiError::Unauthorized(_) => 401,
            ApiError::Forbidden(_) => 403,
            ApiError::NotFound(_) => 404,
            ApiError::InternalServerError(_) => 500,
            ApiError::BadGateway(_) => 502,
            ApiError::ServiceUnavailable(_) => 503,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::Forbidden(msg)
            | ApiError::NotFound(msg)
            | ApiError::InternalServerError(msg)
            | ApiError::BadGateway(msg)
            | ApiError::ServiceUnavailable(msg) => msg,
        }
    }

    /// Get error code for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
            ApiError::BadGateway(_) => "BAD_GATEWAY",
            ApiError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        json!({
            "success": false,
            "error": self.message(),
            "code": self.error_code()
        })
    }
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }

    pub fn bad_gateway(message: impl Into<String>) -> Self {
        ApiError::BadGateway(message.into())
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        ApiError::ServiceUnavailable(message.into())
    }
}

impl From<ClientError> for ApiError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Unauthorized => ApiError::unauthorized("Invalid or expired credentials"),
            ClientError::Status { status, message } => match status {
                400 | 422 => ApiError::bad_request(message),
                403 => ApiError::forbidden(message),
                404 => ApiError::not_found(message),
                400..=499 => ApiError::bad_request(message),
                _ => {
                    tracing::error!("Backend returned {}: {}", status, message);
                    ApiError::bad_gateway("Backend request failed")
                }
            },
            ClientError::MissingField(field) => {
                tracing::error!("Backend response missing '{}'", field);
                ApiError::bad_gateway(format!("Backend response missing '{}'", field))
            }
            ClientError::Http(e) if e.is_timeout() || e.is_connect() => {
                tracing::error!("Backend unreachable: {}", e);
                ApiError::service_unavailable("Backend temporarily unavailable")
            }
            ClientError::Http(e) => {
                tracing::error!("Backend HTTP error: {}", e);
                ApiError::bad_gateway("Backend request failed")
            }
            ClientError::Json(e) => {
                tracing::error!("Backend returned invalid JSON: {}", e);
                ApiError::bad_gateway("Backend returned an invalid response")
            }
            ClientError::Url(e) => {
                tracing::error!("Invalid backend URL: {}", e);
                ApiError::internal_server_error("Gateway misconfigured")
            }
            ClientError::Io(e) => {
                tracing::error!("Gateway I/O error: {}", e);
                ApiError::internal_server_error("An error occurred while processing your request")
            }
        }
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.to_json())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_statuses_map_to_gateway_errors() {
        let err: ApiError = ClientError::Status { status: 404, message: "no car".into() }.into();
        assert_eq!(err.status_code(), 404);
        assert_eq!(err.message(), "no car");

        let err: ApiError = ClientError::Status { status: 500, message: "boom".into() }.into();
        assert_eq!(err.status_code(), 502);

        let err: ApiError = ClientError::Unauthorized.into();
        assert_eq!(err.status_code(), 401);
        assert_eq!(err.to_json()["code"], "UNAUTHORIZED");
    }
}
