pub mod error;
pub mod navigator;
pub mod resources;

pub use error::ClientError;
pub use navigator::{LogNavigator, Navigator};
pub use resources::{Admin, BlockWindow, BookingWindow, Cars, DocumentUpload, Documents, Owner, PaymentConfirmation, Payments, RideAction, Users};

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{multipart::Form, RequestBuilder, StatusCode};
use serde::Serialize;
use serde_json::Value;
use url::Url;

use crate::config::AppConfig;
use crate::session::{RoleLookup, SessionStore};
use crate::types::Identity;

/// HTTP client for the marketplace backend.
///
/// Attaches the session's bearer token to every request and reacts to a 401
/// by expiring the session and redirecting to the login page, once per
/// rejected token.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: Arc<SessionStore>,
    navigator: Arc<dyn Navigator>,
    login_path: String,
}

enum Auth<'a> {
    Session,
    Token(&'a str),
    Anonymous,
}

impl ApiClient {
    pub fn new(
        base_url: &str,
        session: Arc<SessionStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, ClientError> {
        Url::parse(base_url)?;
        Ok(Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
            navigator,
            login_path: "/auth".to_string(),
        })
    }

    pub fn from_config(
        config: &AppConfig,
        session: Arc<SessionStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.backend.timeout_secs))
            .build()?;

        Ok(Self::new(&config.backend.base_url, session, navigator)?
            .with_http(http)
            .with_login_path(config.routes.login_path.clone()))
    }

    /// Share an existing connection pool
    pub fn with_http(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    pub fn with_login_path(mut self, login_path: impl Into<String>) -> Self {
        self.login_path = login_path.into();
        self
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    pub fn navigator(&self) -> &Arc<dyn Navigator> {
        &self.navigator
    }

    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    fn url(&self, path: &str) -> Result<Url, ClientError> {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        Ok(Url::parse(&url)?)
    }

    pub async fn get(&self, path: &str) -> Result<Value, ClientError> {
        let request = self.http.get(self.url(path)?);
        self.send(request, Auth::Session).await
    }

    pub async fn get_query<Q: Serialize + ?Sized>(&self, path: &str, query: &Q) -> Result<Value, ClientError> {
        let request = self.http.get(self.url(path)?).query(query);
        self.send(request, Auth::Session).await
    }

    pub async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Value, ClientError> {
        let request = self.http.post(self.url(path)?).json(body);
        self.send(request, Auth::Session).await
    }

    pub async fn post_empty(&self, path: &str) -> Result<Value, ClientError> {
        let request = self.http.post(self.url(path)?);
        self.send(request, Auth::Session).await
    }

    pub async fn post_multipart(&self, path: &str, form: Form) -> Result<Value, ClientError> {
        let request = self.http.post(self.url(path)?).multipart(form);
        self.send(request, Auth::Session).await
    }

    /// POST without a bearer token; a 401 here never expires the session
    pub async fn post_public<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Value, ClientError> {
        let request = self.http.post(self.url(path)?).json(body);
        self.send(request, Auth::Anonymous).await
    }

    /// GET with an explicit token instead of the session's
    pub async fn get_with_token(&self, path: &str, token: &str) -> Result<Value, ClientError> {
        let request = self.http.get(self.url(path)?);
        self.send(request, Auth::Token(token)).await
    }

    async fn send(&self, request: RequestBuilder, auth: Auth<'_>) -> Result<Value, ClientError> {
        let from_session = matches!(auth, Auth::Session);
        let token = match auth {
            Auth::Session => self.session.bearer_token(),
            Auth::Token(token) => Some(token.to_string()),
            Auth::Anonymous => None,
        };
        let request = match token.as_deref() {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            // Only the session's own token can expire the session.
            if from_session {
                self.handle_unauthorized(token.as_deref());
            }
            return Err(ClientError::Unauthorized);
        }

        let body = response.text().await?;
        if !status.is_success() {
            return Err(ClientError::Status {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }
        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&body)?)
    }

    fn handle_unauthorized(&self, token: Option<&str>) {
        let Some(token) = token else {
            tracing::debug!("Unauthorized response to a request without a token");
            return;
        };
        if self.session.expire_token(token) {
            self.navigator.redirect(&self.login_path);
        }
    }
}

// Pull a readable message out of an error body, JSON or not.
fn error_message(body: &str) -> String {
    match serde_json::from_str::<Value>(body) {
        Ok(json) => ["error", "message", "detail"]
            .iter()
            .find_map(|key| json.get(*key).and_then(Value::as_str))
            .map(str::to_string)
            .unwrap_or_else(|| json.to_string()),
        Err(_) => body.trim().to_string(),
    }
}

#[async_trait]
impl RoleLookup for ApiClient {
    async fn lookup_role(&self, token: &str) -> Result<Identity, ClientError> {
        let body = self.get_with_token("/role", token).await?;
        Ok(serde_json::from_value(body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_message_prefers_error_fields() {
        assert_eq!(error_message(r#"{"error":"Car unavailable"}"#), "Car unavailable");
        assert_eq!(error_message(r#"{"message":"Bad dates"}"#), "Bad dates");
        assert_eq!(error_message("gateway timeout\n"), "gateway timeout");
        assert_eq!(error_message(r#"{"code":7}"#), r#"{"code":7}"#);
    }

    #[test]
    fn url_keeps_base_path() {
        let session = Arc::new(SessionStore::ephemeral(&AppConfig::development().session));
        let client = ApiClient::new("http://127.0.0.1:5000/api/", session, Arc::new(LogNavigator::new())).unwrap();
        assert_eq!(client.url("/role").unwrap().as_str(), "http://127.0.0.1:5000/api/role");
        assert_eq!(client.url("user/bookings/live").unwrap().as_str(), "http://127.0.0.1:5000/api/user/bookings/live");
    }
}
