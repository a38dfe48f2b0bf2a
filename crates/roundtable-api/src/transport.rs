// Shared transport configuration for building reqwest::Client instances.
//
// Every request to the platform carries the same bearer token, timeout,
// and user agent, so they are baked into the client at build time rather
// than repeated per call site.

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};

/// Transport configuration for building HTTP clients.
#[derive(Debug, Clone, Default)]
pub struct Transport {
    /// Request timeout. `None` uses [`Transport::DEFAULT_TIMEOUT`].
    pub timeout: Option<Duration>,
    /// Bearer token injected as a default `Authorization` header on every
    /// request. `None` builds an unauthenticated client (login endpoints).
    pub bearer_token: Option<SecretString>,
}

impl Transport {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    /// Transport with a bearer token and the default timeout.
    pub fn with_token(token: SecretString) -> Self {
        Self {
            timeout: None,
            bearer_token: Some(token),
        }
    }

    /// Build a `reqwest::Client` from this config.
    pub fn build_client(&self) -> Result<reqwest::Client, crate::error::Error> {
        let mut headers = HeaderMap::new();

        if let Some(ref token) = self.bearer_token {
            let mut value =
                HeaderValue::from_str(&format!("Bearer {}", token.expose_secret().trim()))
                    .map_err(|_| crate::error::Error::InvalidInput {
                        field: "bearer_token",
                        reason: "token contains non-header-safe characters".into(),
                    })?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        reqwest::Client::builder()
            .timeout(self.timeout.unwrap_or(Self::DEFAULT_TIMEOUT))
            .user_agent(concat!("roundtable/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()
            .map_err(crate::error::Error::Transport)
    }
}
