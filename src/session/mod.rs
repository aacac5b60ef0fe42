pub mod bridge;
pub mod storage;

pub use bridge::{read_for_middleware, BridgeIdentity, BridgeSettings, TokenBridge};
pub use storage::{FileStorage, MemoryStorage, Storage};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockWriteGuard};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::watch;

use crate::client::ClientError;
use crate::config::SessionConfig;
use crate::types::{Identity, User, UserPatch};

/// Legacy key the bearer token is also written under
const TOKEN_KEY: &str = "auth_token";

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Session storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Session storage JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Who is logged in, with what token
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub is_authenticated: bool,
    #[serde(default)]
    pub is_initialized: bool,
}

#[derive(Debug, Serialize, Deserialize)]
struct PersistedSession {
    state: Session,
}

/// Resolves a bearer token to the identity the backend reports for it
#[async_trait]
pub trait RoleLookup: Send + Sync {
    async fn lookup_role(&self, token: &str) -> Result<Identity, ClientError>;
}

/// Single source of truth for the current session.
///
/// Every mutation persists the session and resynchronises the token bridge in
/// the same call; nothing else writes either.
pub struct SessionStore {
    name: String,
    storage: Arc<dyn Storage>,
    bridge: TokenBridge,
    state: RwLock<Session>,
    initializing: AtomicBool,
    initialized: watch::Sender<bool>,
}

impl SessionStore {
    /// Open the store over `storage`, restoring any persisted user/token pair.
    ///
    /// A restored pair is not trusted until `initialize_auth` has validated it.
    pub fn open(storage: Arc<dyn Storage>, bridge: BridgeSettings) -> Self {
        let name = bridge.cookie_name.clone();
        let restored = match storage.get(&name) {
            Ok(Some(raw)) => match serde_json::from_str::<PersistedSession>(&raw) {
                Ok(persisted) => persisted.state,
                Err(e) => {
                    tracing::warn!("Discarding malformed persisted session '{}': {}", name, e);
                    Session::default()
                }
            },
            Ok(None) => Session::default(),
            Err(e) => {
                tracing::warn!("Failed to read persisted session '{}': {}", name, e);
                Session::default()
            }
        };

        let state = Session {
            user: restored.user,
            token: restored.token,
            is_authenticated: false,
            is_initialized: false,
        };
        let (initialized, _) = watch::channel(false);

        Self {
            name,
            bridge: TokenBridge::new(bridge, storage.clone()),
            storage,
            state: RwLock::new(state),
            initializing: AtomicBool::new(false),
            initialized,
        }
    }

    pub fn from_config(storage: Arc<dyn Storage>, config: &SessionConfig) -> Self {
        Self::open(storage, BridgeSettings::from_config(config))
    }

    /// Empty, non-persistent store
    pub fn ephemeral(config: &SessionConfig) -> Self {
        Self::from_config(Arc::new(MemoryStorage::new()), config)
    }

    pub fn bridge(&self) -> &TokenBridge {
        &self.bridge
    }

    pub fn session(&self) -> Session {
        self.state.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn user(&self) -> Option<User> {
        self.session().user
    }

    pub fn token(&self) -> Option<String> {
        self.session().token
    }

    pub fn is_authenticated(&self) -> bool {
        self.session().is_authenticated
    }

    pub fn is_initialized(&self) -> bool {
        self.session().is_initialized
    }

    /// Token to attach to outgoing requests, falling back to the legacy key
    pub fn bearer_token(&self) -> Option<String> {
        if let Some(token) = self.token() {
            return Some(token);
        }
        match self.storage.get(TOKEN_KEY) {
            Ok(token) => token.filter(|t| !t.is_empty()),
            Err(e) => {
                tracing::warn!("Failed to read fallback token: {}", e);
                None
            }
        }
    }

    fn write(&self) -> RwLockWriteGuard<'_, Session> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn login(&self, user: User, token: impl Into<String>) {
        let token = token.into();
        let mut state = self.write();
        *state = Session {
            user: Some(user.clone()),
            token: Some(token.clone()),
            is_authenticated: true,
            is_initialized: true,
        };
        self.persist(&state);
        self.bridge.store(&user, &token);
        drop(state);

        self.mark_initialized();
        tracing::info!("Logged in as {} ({})", user.email, user.role);
    }

    /// Clear the session. Always succeeds and is idempotent.
    pub fn logout(&self) {
        let mut state = self.write();
        self.clear_locked(&mut state);
        drop(state);

        self.mark_initialized();
    }

    fn clear_locked(&self, state: &mut Session) {
        *state = Session {
            is_initialized: true,
            ..Session::default()
        };
        for key in [self.name.as_str(), TOKEN_KEY] {
            if let Err(e) = self.storage.remove(key) {
                tracing::warn!("Failed to remove persisted '{}': {}", key, e);
            }
        }
        self.bridge.clear();
    }

    /// Merge profile fields into the current user; no-op when logged out
    pub fn update_user(&self, patch: UserPatch) {
        let mut state = self.write();
        let Some(user) = state.user.as_mut() else {
            return;
        };
        user.merge(patch);
        let user = user.clone();

        self.persist(&state);
        if let Some(token) = state.token.clone() {
            self.bridge.store(&user, &token);
        }
    }

    /// Clear the session if `token` is still the one it holds.
    ///
    /// Returns true only for the call that actually cleared it, so concurrent
    /// failures on the same expired token are handled once.
    pub fn expire_token(&self, token: &str) -> bool {
        let mut state = self.write();
        let held = match state.token.as_deref() {
            Some(current) => current == token,
            None => matches!(self.storage.get(TOKEN_KEY), Ok(Some(ref t)) if t == token),
        };
        if !held {
            return false;
        }

        tracing::warn!("Session token rejected by backend; clearing session");
        self.clear_locked(&mut state);
        drop(state);

        self.mark_initialized();
        true
    }

    /// Validate the persisted pair once per process.
    ///
    /// Concurrent or repeated calls return immediately; callers that need the
    /// outcome wait on `wait_initialized`.
    pub async fn initialize_auth(&self, lookup: &dyn RoleLookup) {
        if self.is_initialized() {
            return;
        }
        if self
            .initializing
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return;
        }
        // Another run may have finished between the check above and the swap.
        if self.is_initialized() {
            self.initializing.store(false, Ordering::Release);
            return;
        }

        let has_pair = {
            let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
            state.user.is_some() && state.token.is_some()
        };

        if !has_pair {
            let mut state = self.write();
            state.is_authenticated = false;
            state.is_initialized = true;
            self.persist(&state);
            drop(state);
        } else if self.validate_token(lookup).await {
            let mut state = self.write();
            state.is_authenticated = state.user.is_some() && state.token.is_some();
            state.is_initialized = true;
            self.persist(&state);
            if let (Some(user), Some(token)) = (state.user.clone(), state.token.clone()) {
                self.bridge.store(&user, &token);
            }
            drop(state);
            tracing::debug!("Restored session validated");
        } else {
            tracing::info!("Restored session failed validation; logging out");
            self.logout();
        }

        self.initializing.store(false, Ordering::Release);
        self.mark_initialized();
    }

    /// Ask the backend who the current token belongs to.
    ///
    /// True only when the answer carries a role; any error counts as invalid.
    pub async fn validate_token(&self, lookup: &dyn RoleLookup) -> bool {
        let Some(token) = self.token() else {
            return false;
        };

        let identity = match lookup.lookup_role(&token).await {
            Ok(identity) => identity,
            Err(e) => {
                tracing::warn!("Token validation failed: {}", e);
                return false;
            }
        };
        let Some(role) = identity.role else {
            tracing::warn!("Token validation response carried no role");
            return false;
        };

        let mut state = self.write();
        // A logout may have raced the lookup.
        if state.token.as_deref() != Some(token.as_str()) {
            return false;
        }
        let previous = state.user.clone();
        let user = User {
            email: identity
                .email
                .or_else(|| previous.as_ref().map(|u| u.email.clone()))
                .unwrap_or_default(),
            role,
            name: identity.name.or_else(|| previous.and_then(|u| u.name)),
        };
        state.user = Some(user.clone());
        self.persist(&state);
        self.bridge.store(&user, &token);
        true
    }

    /// Resolves once `initialize_auth` (or any login/logout) has completed
    pub async fn wait_initialized(&self) {
        let mut rx = self.initialized.subscribe();
        if self.is_initialized() {
            return;
        }
        // The sender lives as long as the store, so this cannot fail.
        let _ = rx.wait_for(|done| *done).await;
    }

    fn mark_initialized(&self) {
        self.initialized.send_replace(true);
    }

    fn persist(&self, state: &Session) {
        let result = serde_json::to_string(&PersistedSession { state: state.clone() })
            .map_err(SessionError::from)
            .and_then(|raw| self.storage.set(&self.name, &raw));
        if let Err(e) = result {
            tracing::warn!("Failed to persist session '{}': {}", self.name, e);
        }
        if let Some(token) = state.token.as_deref() {
            if let Err(e) = self.storage.set(TOKEN_KEY, token) {
                tracing::warn!("Failed to persist fallback token: {}", e);
            }
        }
    }
}
