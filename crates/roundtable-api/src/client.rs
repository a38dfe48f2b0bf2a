// GD platform HTTP client
//
// Wraps `reqwest::Client` with base-path URL construction, envelope
// unwrapping, and status mapping. Endpoint methods live in `admin.rs`
// and `student.rs` as inherent impls, keeping this module focused on
// transport mechanics.

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::envelope;
use crate::error::Error;
use crate::transport::Transport;

/// Base path every platform endpoint hangs off.
const API_PREFIX: &str = "api/gd";

/// Raw HTTP client for the GD platform REST API.
///
/// All methods return unwrapped payloads -- the response envelope (in any
/// of its three shapes) is stripped before the caller sees it, and
/// non-success statuses are mapped into [`Error`] variants.
pub struct GdClient {
    http: reqwest::Client,
    base_url: Url,
}

impl GdClient {
    /// Create a new client from a server base URL and transport config.
    ///
    /// `base_url` is the server root (e.g. `https://gd.example.edu`); the
    /// `/api/gd` prefix is appended per request.
    pub fn new(base_url: Url, transport: &Transport) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self { http, base_url })
    }

    /// Create a client with a pre-built `reqwest::Client`.
    ///
    /// Used by tests and by callers that already hold a configured client.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    /// The server base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Build a full URL: `{base}/api/gd/{path}`.
    pub(crate) fn api_url(&self, path: &str) -> Result<Url, Error> {
        let full = format!(
            "{}/{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            API_PREFIX,
            path.trim_start_matches('/'),
        );
        Url::parse(&full).map_err(Error::InvalidUrl)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send a GET request with query parameters and unwrap the envelope.
    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, Error> {
        let url = self.api_url(path)?;
        debug!("GET {}", url);

        let resp = self
            .http
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(Error::Transport)?;

        Self::parse_response(resp).await
    }

    /// Send a POST request with a JSON body and unwrap the envelope.
    pub(crate) async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &impl Serialize,
    ) -> Result<T, Error> {
        let url = self.api_url(path)?;
        debug!("POST {}", url);

        let resp = self
            .http
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(Error::Transport)?;

        Self::parse_response(resp).await
    }

    /// POST whose response body is irrelevant (ack-only endpoints).
    pub(crate) async fn post_unit(&self, path: &str, body: &impl Serialize) -> Result<(), Error> {
        let url = self.api_url(path)?;
        debug!("POST {}", url);

        let resp = self
            .http
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(Error::Transport)?;

        Self::check_status(resp).await?;
        Ok(())
    }

    /// Map the HTTP status and run the body through the envelope adapter.
    async fn parse_response<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
        let body = Self::check_status(resp).await?;
        envelope::decode(&body.text, body.status)
    }

    /// Reject 401 and non-success statuses, preferring the server's own
    /// error message from the body over the canonical reason phrase.
    async fn check_status(resp: reqwest::Response) -> Result<RawBody, Error> {
        let status = resp.status();

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(Error::Unauthorized);
        }

        let text = resp.text().await.map_err(Error::Transport)?;

        if !status.is_success() {
            let message = envelope::server_message(&text).unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_owned()
            });
            return Err(Error::Rejected {
                message,
                status: status.as_u16(),
            });
        }

        Ok(RawBody {
            text,
            status: status.as_u16(),
        })
    }

    /// Reject blank identifiers before they reach the wire.
    pub(crate) fn require_id(field: &'static str, value: &str) -> Result<(), Error> {
        if value.trim().is_empty() {
            return Err(Error::InvalidInput {
                field,
                reason: "identifier must not be empty".into(),
            });
        }
        Ok(())
    }
}

/// Successful response body plus the status it arrived with.
struct RawBody {
    text: String,
    status: u16,
}
