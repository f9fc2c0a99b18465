// HTTP Adapter Configuration

use std::time::Duration;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(3);

/// Shared settings for both remote endpoints.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub base_url: String,
    pub project_key: String,
    /// Client-level timeout, kept below the provider's step timeout so
    /// the adapter reports failure before the chain gives up on it.
    pub timeout: Duration,
}

impl HttpConfig {
    pub fn new(base_url: impl Into<String>, project_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            project_key: project_key.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}
