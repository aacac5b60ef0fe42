use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::client::{ApiClient, ClientError};
use crate::routes;
use crate::session::RoleLookup;
use crate::types::User;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub contact: String,
    pub action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub otp: Option<String>,
}

/// OTP login flow over the API client and its session store
pub struct AuthFlow<'a> {
    client: &'a ApiClient,
}

impl<'a> AuthFlow<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Ask the backend to email a one-time passcode; returns `otp_sent`
    pub async fn send_otp(&self, email: &str) -> Result<bool, ClientError> {
        let body = self
            .client
            .post_public("/login", &json!({ "email": email, "action": "send_otp" }))
            .await?;
        Ok(body.get("otp_sent").and_then(Value::as_bool).unwrap_or(false))
    }

    /// Exchange email + OTP for a token, resolve the role with that token,
    /// then commit both to the session store.
    pub async fn login(&self, email: &str, otp: &str) -> Result<User, ClientError> {
        let body = self
            .client
            .post_public("/login", &json!({ "email": email, "action": "login", "otp": otp }))
            .await?;
        let token = body
            .get("access_token")
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty())
            .ok_or(ClientError::MissingField("access_token"))?
            .to_string();

        let identity = self.client.lookup_role(&token).await?;
        let role = identity.role.ok_or(ClientError::MissingField("role"))?;

        let user = User {
            email: email.to_string(),
            role,
            name: identity.name,
        };
        self.client.session().login(user.clone(), token);
        Ok(user)
    }

    pub async fn register(&self, request: &RegisterRequest) -> Result<Value, ClientError> {
        self.client.post_public("/register", request).await
    }

    /// Tell the backend, then clear the session whatever it answered
    pub async fn logout(&self) {
        if self.client.session().bearer_token().is_some() {
            if let Err(e) = self.client.post_empty("/logout").await {
                tracing::debug!("Backend logout failed: {}", e);
            }
        }
        self.client.session().logout();
    }
}

/// Where to send a freshly logged-in user: the requested page if their role
/// may enter it, otherwise their landing page
pub fn destination(user: &User, redirect: Option<&str>) -> String {
    match redirect {
        Some(path) if path.starts_with('/') && !path.starts_with("//") && routes::role_permitted(path, user.role) => {
            path.to_string()
        }
        _ => user.role.landing_path().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Role;

    #[test]
    fn destination_honours_permitted_redirect() {
        let owner = User::new("a@b.com", Role::Owner);
        assert_eq!(destination(&owner, Some("/owner/blocks/12")), "/owner/blocks/12");
        assert_eq!(destination(&owner, Some("/bookings")), "/bookings");
    }

    #[test]
    fn destination_falls_back_to_landing() {
        let owner = User::new("a@b.com", Role::Owner);
        assert_eq!(destination(&owner, None), "/owner");
        assert_eq!(destination(&owner, Some("/admin")), "/owner");
        assert_eq!(destination(&owner, Some("https://evil.example")), "/owner");
        assert_eq!(destination(&owner, Some("//evil.example")), "/owner");

        let user = User::new("u@b.com", Role::User);
        assert_eq!(destination(&user, Some("/owner")), "/dashboard");
    }
}
