// Token bridge: mirrors the session into the cookie the gateway middleware reads.

use std::sync::Arc;

use chrono::Utc;
use cookie::time::{Duration, OffsetDateTime};
use cookie::{Cookie, SameSite};
use serde::{Deserialize, Serialize};

use super::storage::Storage;
use crate::config::{clamp_cookie_max_age_days, SessionConfig};
use crate::types::User;

#[derive(Debug, Serialize, Deserialize)]
struct BridgeEnvelope {
    state: BridgeState,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BridgeState {
    #[serde(default)]
    user: Option<User>,
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    is_authenticated: bool,
    #[serde(default)]
    timestamp: i64,
}

/// Identity recovered from a bridge cookie
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeIdentity {
    pub user: User,
    pub token: String,
    pub is_authenticated: bool,
}

#[derive(Debug, Clone)]
pub struct BridgeSettings {
    pub cookie_name: String,
    pub max_age_days: i64,
    pub secure: bool,
}

impl BridgeSettings {
    pub fn from_config(session: &SessionConfig) -> Self {
        Self {
            cookie_name: session.storage_name.clone(),
            max_age_days: session.cookie_max_age_days,
            secure: session.cookie_secure,
        }
    }
}

impl Default for BridgeSettings {
    fn default() -> Self {
        Self {
            cookie_name: "auth-storage".to_string(),
            max_age_days: 7,
            secure: false,
        }
    }
}

/// Build the bridge cookie for an authenticated user
pub fn build_cookie(settings: &BridgeSettings, user: &User, token: &str) -> Cookie<'static> {
    let envelope = BridgeEnvelope {
        state: BridgeState {
            user: Some(user.clone()),
            token: Some(token.to_string()),
            is_authenticated: true,
            timestamp: Utc::now().timestamp_millis(),
        },
    };
    // Serializing plain structs of strings cannot fail.
    let value = serde_json::to_string(&envelope).unwrap_or_default();
    let max_age = Duration::days(clamp_cookie_max_age_days(settings.max_age_days));

    Cookie::build((settings.cookie_name.clone(), value))
        .path("/")
        .same_site(SameSite::Strict)
        .secure(settings.secure)
        .max_age(max_age)
        .expires(OffsetDateTime::now_utc() + max_age)
        .build()
}

/// Already-expired cookie that deletes the bridge cookie
pub fn removal_cookie(settings: &BridgeSettings) -> Cookie<'static> {
    let mut cookie = Cookie::build((settings.cookie_name.clone(), ""))
        .path("/")
        .same_site(SameSite::Strict)
        .build();
    cookie.make_removal();
    cookie
}

/// Parse a `Cookie` request header and recover the bridged identity.
///
/// Returns `None` for a missing, malformed or incomplete cookie; never fails.
pub fn read_for_middleware(cookie_header: &str, cookie_name: &str) -> Option<BridgeIdentity> {
    let cookie = Cookie::split_parse_encoded(cookie_header)
        .filter_map(Result::ok)
        .find(|c| c.name() == cookie_name)?;

    let envelope: BridgeEnvelope = match serde_json::from_str(cookie.value()) {
        Ok(envelope) => envelope,
        Err(e) => {
            tracing::debug!("Ignoring malformed {} cookie: {}", cookie_name, e);
            return None;
        }
    };

    let BridgeState { user, token, is_authenticated, .. } = envelope.state;
    match (user, token) {
        (Some(user), Some(token)) if !token.is_empty() => Some(BridgeIdentity {
            user,
            token,
            is_authenticated,
        }),
        _ => None,
    }
}

/// Client-side mirror of the bridge cookie.
///
/// The last emitted `Set-Cookie` value is kept in storage, the same way a
/// browser keeps its cookie jar next to local storage.
pub struct TokenBridge {
    settings: BridgeSettings,
    storage: Arc<dyn Storage>,
}

impl TokenBridge {
    pub fn new(settings: BridgeSettings, storage: Arc<dyn Storage>) -> Self {
        Self { settings, storage }
    }

    pub fn settings(&self) -> &BridgeSettings {
        &self.settings
    }

    fn mirror_key(&self) -> String {
        format!("cookie:{}", self.settings.cookie_name)
    }

    pub fn store(&self, user: &User, token: &str) -> Cookie<'static> {
        let cookie = build_cookie(&self.settings, user, token);
        self.remember(&cookie);
        cookie
    }

    pub fn clear(&self) -> Cookie<'static> {
        let cookie = removal_cookie(&self.settings);
        self.remember(&cookie);
        cookie
    }

    fn remember(&self, cookie: &Cookie<'static>) {
        let header = cookie.encoded().to_string();
        if let Err(e) = self.storage.set(&self.mirror_key(), &header) {
            tracing::warn!("Failed to persist {} cookie: {}", self.settings.cookie_name, e);
        }
    }

    /// Last `Set-Cookie` value emitted by `store` or `clear`
    pub fn set_cookie_header(&self) -> Option<String> {
        match self.storage.get(&self.mirror_key()) {
            Ok(header) => header,
            Err(e) => {
                tracing::warn!("Failed to read {} cookie: {}", self.settings.cookie_name, e);
                None
            }
        }
    }

    /// `name=value` pair to present as a `Cookie` request header, if the
    /// mirrored cookie is still live
    pub fn cookie_header(&self) -> Option<String> {
        let raw = self.set_cookie_header()?;
        let cookie = Cookie::parse_encoded(raw).ok()?;

        if cookie.value().is_empty() {
            return None;
        }
        if let Some(expires) = cookie.expires_datetime() {
            if expires <= OffsetDateTime::now_utc() {
                return None;
            }
        }
        Some(cookie.encoded().stripped().to_string())
    }

    /// The identity the gateway middleware would currently see
    pub fn current(&self) -> Option<BridgeIdentity> {
        let header = self.cookie_header()?;
        read_for_middleware(&header, &self.settings.cookie_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::storage::MemoryStorage;
    use crate::types::Role;

    fn bridge() -> TokenBridge {
        TokenBridge::new(BridgeSettings::default(), Arc::new(MemoryStorage::new()))
    }

    #[test]
    fn cookie_attributes() {
        let user = User::new("a@b.com", Role::Owner);
        let cookie = build_cookie(&BridgeSettings::default(), &user, "tok1");

        assert_eq!(cookie.name(), "auth-storage");
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.same_site(), Some(SameSite::Strict));
        assert_eq!(cookie.max_age(), Some(Duration::days(7)));
        assert!(cookie.expires_datetime().is_some());

        let envelope: serde_json::Value = serde_json::from_str(cookie.value()).unwrap();
        assert_eq!(envelope["state"]["token"], "tok1");
        assert_eq!(envelope["state"]["user"]["role"], "owner");
        assert_eq!(envelope["state"]["isAuthenticated"], true);
        assert!(envelope["state"]["timestamp"].as_i64().unwrap() > 0);
    }

    #[test]
    fn oversized_max_age_is_clamped() {
        let settings = BridgeSettings {
            max_age_days: i64::MAX,
            ..BridgeSettings::default()
        };
        let cookie = build_cookie(&settings, &User::new("a@b.com", Role::User), "tok1");
        assert_eq!(cookie.max_age(), Some(Duration::days(crate::config::MAX_COOKIE_AGE_DAYS)));
    }

    #[test]
    fn read_round_trips_through_encoded_header() {
        let user = User::new("a@b.com", Role::Admin).with_name("Asha");
        let cookie = build_cookie(&BridgeSettings::default(), &user, "tok1");
        let header = format!("theme=dark; {}", cookie.encoded().stripped());

        let identity = read_for_middleware(&header, "auth-storage").unwrap();
        assert_eq!(identity.user, user);
        assert_eq!(identity.token, "tok1");
        assert!(identity.is_authenticated);
    }

    #[test]
    fn malformed_cookies_are_no_session() {
        assert_eq!(read_for_middleware("", "auth-storage"), None);
        assert_eq!(read_for_middleware("auth-storage=not-json", "auth-storage"), None);
        assert_eq!(read_for_middleware("auth-storage=%7B%22state%22%3A%7B%7D%7D", "auth-storage"), None);
        assert_eq!(read_for_middleware("auth-storage=%ZZ%", "auth-storage"), None);
        assert_eq!(read_for_middleware(";;;=", "auth-storage"), None);
    }

    #[test]
    fn user_without_token_is_no_session() {
        let raw = r#"{"state":{"user":{"email":"a@b.com","role":"user"},"token":null}}"#;
        let header = Cookie::new("auth-storage", raw).encoded().to_string();
        assert_eq!(read_for_middleware(&header, "auth-storage"), None);
    }

    #[test]
    fn store_then_clear_updates_mirror() {
        let bridge = bridge();
        assert_eq!(bridge.current(), None);

        let user = User::new("a@b.com", Role::User);
        bridge.store(&user, "tok1");
        let seen = bridge.current().unwrap();
        assert_eq!(seen.user, user);
        assert_eq!(seen.token, "tok1");

        let removal = bridge.clear();
        assert_eq!(removal.value(), "");
        assert_eq!(bridge.current(), None);
        assert_eq!(bridge.cookie_header(), None);
        assert!(bridge.set_cookie_header().unwrap().starts_with("auth-storage="));
    }
}
