//! Dispatcher configuration.

use std::time::Duration;

/// Settings for `Dispatcher::standard`.
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    /// Process variable consulted on every call to choose the request mode.
    pub environment_var: String,

    /// Value of `environment_var` that means "development".
    pub development_value: String,

    /// Total per-request timeout enforced by the transport.
    pub timeout: Duration,

    /// User-Agent sent by the transport.
    pub user_agent: String,

    /// Largest response body the transport will read, in bytes.
    pub body_limit: u64,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            environment_var: "APP_ENV".to_string(),
            development_value: "development".to_string(),
            timeout: Duration::from_secs(30),
            user_agent: format!("fetch-core/{}", env!("CARGO_PKG_VERSION")),
            body_limit: 64 * 1024 * 1024,
        }
    }
}

impl DispatcherConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn environment_var(mut self, var: impl Into<String>) -> Self {
        self.environment_var = var.into();
        self
    }

    pub fn development_value(mut self, value: impl Into<String>) -> Self {
        self.development_value = value.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout_secs(mut self, secs: f64) -> Self {
        self.timeout = Duration::from_secs_f64(secs);
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn body_limit(mut self, bytes: u64) -> Self {
        self.body_limit = bytes;
        self
    }
}
