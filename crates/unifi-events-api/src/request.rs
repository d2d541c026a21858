// Raw authenticated request primitive
//
// URL construction for controller-level (`/api/{path}`), site-scoped
// (`/api/s/{site}/{path}`) and WebSocket endpoints, plus a single
// `send` that every resource call funnels through. No session guard
// here -- that lives one layer up, in the core gateway.

use reqwest::Method;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::session::{ControllerSession, preview};

impl ControllerSession {
    // ── URL builders ─────────────────────────────────────────────────

    /// Build a controller-level URL: `{base}/api/{path}`.
    pub fn api_url(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        Url::parse(&format!("{base}/api/{path}")).map_err(Error::InvalidUrl)
    }

    /// Build a site-scoped URL: `{base}/api/s/{site}/{path}`.
    pub fn site_url(&self, path: &str) -> Result<Url, Error> {
        self.api_url(&format!("s/{}/{}", self.site, path.trim_start_matches('/')))
    }

    /// Build the event stream URL: `wss://{host}/wss/s/{site}/events`.
    ///
    /// Only the controller's host and port are kept. A plain `http`
    /// controller gets `ws://`; everything else gets `wss://`.
    pub fn events_url(&self) -> Result<Url, Error> {
        let scheme = if self.base_url.scheme() == "http" {
            "ws"
        } else {
            "wss"
        };
        let host = self
            .base_url
            .host_str()
            .ok_or(Error::InvalidUrl(url::ParseError::EmptyHost))?;
        let authority = match self.base_url.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_owned(),
        };
        Url::parse(&format!(
            "{scheme}://{authority}/wss/s/{}/events",
            self.site
        ))
        .map_err(Error::InvalidUrl)
    }

    // ── Request helper ───────────────────────────────────────────────

    /// Send a request with an optional JSON body and parse the JSON reply.
    ///
    /// The full response body is returned, envelope included. HTTP 401
    /// maps to [`Error::Authentication`], other failures to [`Error::Api`].
    /// An empty body parses as `null`.
    pub async fn send(
        &self,
        method: Method,
        url: Url,
        body: Option<&serde_json::Value>,
    ) -> Result<serde_json::Value, Error> {
        debug!("{} {}", method, url);

        let mut builder = self.http.request(method, url);
        if let Some(body) = body {
            builder = builder.json(body);
        }
        let resp = builder.send().await.map_err(Error::Transport)?;

        let status = resp.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(Error::Authentication {
                message: "session expired or invalid credentials".into(),
            });
        }

        let text = resp.text().await.map_err(Error::Transport)?;

        if !status.is_success() {
            return Err(Error::Api {
                status: status.as_u16(),
                message: preview(&text),
            });
        }

        if text.trim().is_empty() {
            return Ok(serde_json::Value::Null);
        }

        serde_json::from_str(&text).map_err(|e| Error::Deserialization {
            message: format!("{e} (body preview: {:?})", preview(&text)),
            body: text.clone(),
        })
    }
}
