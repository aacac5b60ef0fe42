// Component-level route guard, re-checked after the session store initializes.

use std::future::Future;

use crate::client::Navigator;
use crate::routes;
use crate::session::{Session, SessionStore};
use crate::types::Role;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardState {
    /// Session store still initializing; nothing protected may render
    Checking,
    Allowed,
    Denied { redirect: String },
}

/// Outcome of running protected content behind the guard
#[derive(Debug, PartialEq, Eq)]
pub enum Guarded<T> {
    Rendered(T),
    Denied { redirect: String },
}

impl<T> Guarded<T> {
    pub fn rendered(self) -> Option<T> {
        match self {
            Guarded::Rendered(value) => Some(value),
            Guarded::Denied { .. } => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ComponentGuard {
    path: String,
    required_roles: Vec<Role>,
    login_path: String,
}

impl ComponentGuard {
    /// Guard for `path` using the shared route table
    pub fn for_path(path: impl Into<String>) -> Self {
        let path = path.into();
        let required_roles = routes::required_roles(&path).to_vec();
        Self::with_roles(path, &required_roles)
    }

    pub fn with_roles(path: impl Into<String>, required_roles: &[Role]) -> Self {
        Self {
            path: path.into(),
            required_roles: required_roles.to_vec(),
            login_path: "/auth".to_string(),
        }
    }

    pub fn login_path(mut self, login_path: impl Into<String>) -> Self {
        self.login_path = login_path.into();
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn required_roles(&self) -> &[Role] {
        &self.required_roles
    }

    pub fn evaluate(&self, session: &Session) -> GuardState {
        if !session.is_initialized {
            return GuardState::Checking;
        }

        let user = match (&session.user, session.is_authenticated) {
            (Some(user), true) => user,
            _ => {
                return GuardState::Denied {
                    redirect: routes::login_redirect(&self.login_path, &self.path),
                }
            }
        };

        if !self.required_roles.is_empty() && !self.required_roles.contains(&user.role) {
            return GuardState::Denied {
                redirect: user.role.landing_path().to_string(),
            };
        }

        GuardState::Allowed
    }

    /// Wait for the store to finish initializing, then decide. A denial
    /// triggers the redirect through `navigator`.
    pub async fn check(&self, store: &SessionStore, navigator: &dyn Navigator) -> GuardState {
        store.wait_initialized().await;

        let state = self.evaluate(&store.session());
        if let GuardState::Denied { redirect } = &state {
            tracing::debug!("Guard denied {}; redirecting to {}", self.path, redirect);
            navigator.redirect(redirect);
        }
        state
    }

    /// Run `children` only once access is confirmed
    pub async fn protect<F, Fut, T>(&self, store: &SessionStore, navigator: &dyn Navigator, children: F) -> Guarded<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        match self.check(store, navigator).await {
            GuardState::Allowed => Guarded::Rendered(children().await),
            GuardState::Denied { redirect } => Guarded::Denied { redirect },
            // check() only returns after initialization
            GuardState::Checking => Guarded::Denied {
                redirect: routes::login_redirect(&self.login_path, &self.path),
            },
        }
    }
}
