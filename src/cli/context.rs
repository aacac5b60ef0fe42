use std::future::Future;
use std::sync::Arc;

use crate::client::{ApiClient, LogNavigator, Navigator};
use crate::config::config;
use crate::guard::{ComponentGuard, Guarded};
use crate::session::SessionStore;

use super::config::session_storage;

/// Session store, API client and navigator shared by every command
pub struct CliContext {
    client: ApiClient,
    navigator: Arc<LogNavigator>,
}

impl CliContext {
    pub fn load() -> anyhow::Result<Self> {
        let config = config();
        let storage = Arc::new(session_storage()?);
        let store = Arc::new(SessionStore::from_config(storage, &config.session));

        let navigator = Arc::new(LogNavigator::new());
        let redirects: Arc<dyn Navigator> = navigator.clone();
        let client = ApiClient::from_config(config, store, redirects)?;

        Ok(Self { client, navigator })
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn store(&self) -> &SessionStore {
        self.client.session()
    }

    pub fn navigator(&self) -> &LogNavigator {
        &self.navigator
    }

    /// Validate the persisted session against the backend (once per process)
    pub async fn initialize(&self) {
        self.store().initialize_auth(&self.client).await;
    }

    /// Run `command` only if the session may open `path`
    pub async fn guarded<F, Fut, T>(&self, path: &str, command: F) -> anyhow::Result<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = anyhow::Result<T>>,
    {
        self.initialize().await;

        let guard = ComponentGuard::for_path(path).login_path(self.client.login_path());
        match guard.protect(self.store(), &*self.navigator, command).await {
            Guarded::Rendered(result) => result,
            Guarded::Denied { redirect } => Err(anyhow::anyhow!(
                "Not allowed to open {}; redirected to {}",
                path,
                redirect
            )),
        }
    }
}
