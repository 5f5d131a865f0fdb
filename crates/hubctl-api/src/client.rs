// Admin API HTTP client
//
// Wraps `reqwest::Client` with hub-specific URL construction under the
// `/_admin_` prefix and shared status/decode handling. Endpoint groups
// (devices, subdevices, services, account) are implemented as inherent
// methods in separate files to keep this module focused on transport
// mechanics.

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;

/// Raw HTTP client for the hub's local admin API.
///
/// All endpoints live under the `/_admin_` prefix and exchange plain JSON
/// payloads -- there is no response envelope. Non-2xx responses surface as
/// [`Error::Status`] carrying the backend's message when it sends one.
pub struct AdminClient {
    http: reqwest::Client,
    base_url: Url,
}

impl AdminClient {
    /// Create a new admin client from a `TransportConfig`.
    ///
    /// `base_url` is the hub root (e.g. `http://homeassistant.local:2002`).
    /// Every request carries `Content-Type: application/json; charset=utf-8`
    /// as a default header, matching what the backend expects.
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let mut headers = HeaderMap::new();
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/json; charset=utf-8"),
        );
        let http = transport.build_client_with_headers(headers)?;
        Ok(Self { http, base_url })
    }

    /// Create an admin client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    /// The hub base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The underlying HTTP client.
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Build a full URL for an admin API path: `{base}/_admin_/{path}`.
    ///
    /// Path segments with spaces (service names like `Local Agent`) are
    /// percent-encoded by the URL parser.
    pub(crate) fn admin_url(&self, path: &str) -> Url {
        let base = self.base_url.as_str().trim_end_matches('/');
        Url::parse(&format!("{base}/_admin_/{path}")).expect("invalid admin URL")
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send a GET request and decode the JSON payload.
    pub(crate) async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        debug!("GET {}", url);

        let resp = self.http.get(url).send().await.map_err(Error::Transport)?;

        parse_response(resp).await
    }

    /// Send a PUT request with a JSON body and decode the JSON payload.
    pub(crate) async fn put<T: DeserializeOwned>(
        &self,
        url: Url,
        body: &impl Serialize,
    ) -> Result<T, Error> {
        debug!("PUT {}", url);

        let resp = self
            .http
            .put(url)
            .json(body)
            .send()
            .await
            .map_err(Error::Transport)?;

        parse_response(resp).await
    }

    /// Send a bodyless POST and decode the JSON payload.
    ///
    /// Command endpoints take their arguments in the path.
    pub(crate) async fn post<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        debug!("POST {}", url);

        let resp = self.http.post(url).send().await.map_err(Error::Transport)?;

        parse_response(resp).await
    }
}

/// Check the HTTP status, then decode the body.
///
/// Error bodies are probed for a `msg`/`message`/`error` string so the
/// backend's own wording ("Unsupported patch arguments: ...") reaches the
/// caller instead of a bare status code.
async fn parse_response<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
    let status = resp.status();
    let body = resp.text().await.map_err(Error::Transport)?;

    if !status.is_success() {
        return Err(Error::Status {
            status: status.as_u16(),
            message: error_message(&body).unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_owned()
            }),
        });
    }

    serde_json::from_str(&body).map_err(|e| Error::Deserialization {
        message: e.to_string(),
        body,
    })
}

/// Pull a human-readable message out of a JSON error body, if present.
fn error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    ["msg", "message", "error"]
        .iter()
        .find_map(|key| value.get(key).and_then(serde_json::Value::as_str))
        .map(str::to_owned)
}
