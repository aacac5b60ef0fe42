use axum::{
    extract::{Request, State},
    http::{
        header::{AUTHORIZATION, COOKIE},
        HeaderMap, HeaderValue,
    },
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use crate::gateway::GatewayState;
use crate::routes;
use crate::session::read_for_middleware;
use crate::types::User;

/// Identity the gateway could recover for a request
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequestIdentity {
    /// None when only a bearer header was presented (role unknown)
    pub user: Option<User>,
    pub token: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    Allow,
    /// No session where one is required; carries the login URL
    Login(String),
    /// Session present, role not permitted; carries the role's landing path
    Landing(&'static str),
}

/// Read identity from the bridge cookie, falling back to a bearer header
pub fn identify(headers: &HeaderMap, cookie_name: &str) -> Option<RequestIdentity> {
    let cookie_header = headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .collect::<Vec<_>>()
        .join("; ");

    if let Some(bridged) = read_for_middleware(&cookie_header, cookie_name) {
        return Some(RequestIdentity {
            user: Some(bridged.user),
            token: bridged.token,
        });
    }

    bearer_token(headers).map(|token| RequestIdentity { user: None, token })
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then(|| token.to_string())
}

/// Decide what the gateway does with a request for `path`
pub fn decide(path: &str, identity: Option<&RequestIdentity>, login_path: &str) -> Access {
    if routes::is_bypassed(path) {
        return Access::Allow;
    }
    let Some(rule) = routes::match_rule(path) else {
        return Access::Allow;
    };
    if rule.is_public() {
        return Access::Allow;
    }

    match identity.and_then(|i| i.user.as_ref()) {
        None => Access::Login(routes::login_redirect(login_path, path)),
        Some(user) if !rule.permits(user.role) => Access::Landing(user.role.landing_path()),
        Some(_) => Access::Allow,
    }
}

/// Request-time route guard, run before any page is served
pub async fn route_guard_middleware(
    State(state): State<GatewayState>,
    mut request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    if routes::is_bypassed(&path) {
        return next.run(request).await;
    }

    let identity = identify(request.headers(), &state.config.session.storage_name);

    match decide(&path, identity.as_ref(), &state.config.routes.login_path) {
        Access::Login(location) => {
            tracing::debug!("No session for {}; redirecting to {}", path, location);
            Redirect::temporary(&location).into_response()
        }
        Access::Landing(location) => {
            tracing::debug!("Role not permitted for {}; redirecting to {}", path, location);
            Redirect::temporary(location).into_response()
        }
        Access::Allow => {
            let user = identity.as_ref().and_then(|i| i.user.clone());
            if let Some(identity) = identity {
                request.extensions_mut().insert(identity);
            }

            let mut response = next.run(request).await;
            if let Some(user) = user {
                let headers = response.headers_mut();
                headers.insert("x-user-role", HeaderValue::from_static(user.role.as_str()));
                if let Ok(email) = HeaderValue::from_str(&user.email) {
                    headers.insert("x-user-email", email);
                }
            }
            response
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{bridge::build_cookie, BridgeSettings};
    use crate::types::Role;

    fn cookie_headers(user: &User, token: &str) -> HeaderMap {
        let cookie = build_cookie(&BridgeSettings::default(), user, token);
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_str(&cookie.encoded().stripped().to_string()).unwrap());
        headers
    }

    #[test]
    fn identify_prefers_cookie() {
        let user = User::new("a@b.com", Role::Owner);
        let mut headers = cookie_headers(&user, "tok1");
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer other"));

        let identity = identify(&headers, "auth-storage").unwrap();
        assert_eq!(identity.user, Some(user));
        assert_eq!(identity.token, "tok1");
    }

    #[test]
    fn identify_falls_back_to_bearer_without_role() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer tok9"));
        let identity = identify(&headers, "auth-storage").unwrap();
        assert_eq!(identity.user, None);
        assert_eq!(identity.token, "tok9");

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert_eq!(identify(&headers, "auth-storage"), None);
    }

    #[test]
    fn decide_covers_each_outcome() {
        let owner = RequestIdentity {
            user: Some(User::new("o@b.com", Role::Owner)),
            token: "tok".into(),
        };
        let header_only = RequestIdentity { user: None, token: "tok".into() };

        assert_eq!(decide("/help", None, "/auth"), Access::Allow);
        assert_eq!(decide("/no/rule/here", None, "/auth"), Access::Allow);
        assert_eq!(decide("/logo.svg", None, "/auth"), Access::Allow);
        assert_eq!(
            decide("/owner/blocks/12", None, "/auth"),
            Access::Login("/auth?redirect=%2Fowner%2Fblocks%2F12".into())
        );
        assert_eq!(
            decide("/bookings", Some(&header_only), "/auth"),
            Access::Login("/auth?redirect=%2Fbookings".into())
        );
        assert_eq!(decide("/admin", Some(&owner), "/auth"), Access::Landing("/owner"));
        assert_eq!(decide("/owner/ride_action/3", Some(&owner), "/auth"), Access::Allow);
    }
}
