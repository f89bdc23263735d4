//! HTTP client construction.

use std::time::Duration;

use crate::error::DeployError;

/// Default `User-Agent` header.
pub const DEFAULT_USER_AGENT: &str = concat!("denpush/", env!("CARGO_PKG_VERSION"));

/// Settings for the HTTP clients the pipeline creates.
///
/// Each network stage builds its own client from these settings and drops
/// it when the stage ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpSettings {
    /// Whole-request timeout. `None` keeps the transport default (no limit).
    pub timeout: Option<Duration>,
    pub user_agent: String,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl HttpSettings {
    /// Builds a `reqwest` client from these settings.
    pub fn build(&self) -> Result<reqwest::Client, DeployError> {
        let mut builder = reqwest::Client::builder().user_agent(&self.user_agent);
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        builder.build().map_err(DeployError::HttpClient)
    }
}
