use std::sync::{Mutex, PoisonError};

/// Performs the navigation side effects of the guards and the API client
pub trait Navigator: Send + Sync {
    fn redirect(&self, location: &str);
}

/// Records the last redirect and logs it; used where there is no browser
#[derive(Debug, Default)]
pub struct LogNavigator {
    last: Mutex<Option<String>>,
}

impl LogNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_redirect(&self) -> Option<String> {
        self.last.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl Navigator for LogNavigator {
    fn redirect(&self, location: &str) {
        tracing::info!("Redirecting to {}", location);
        *self.last.lock().unwrap_or_else(PoisonError::into_inner) = Some(location.to_string());
    }
}
