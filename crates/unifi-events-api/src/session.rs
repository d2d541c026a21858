// Controller session
//
// Cookie-based login and session probing. The login endpoint sets a
// session cookie in the client's jar; subsequent requests and the
// WebSocket handshake present that cookie. The jar itself never leaves
// this module -- callers get the `Cookie` header value or nothing.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use reqwest::cookie::{CookieStore, Jar};
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;

/// Username/password pair for the controller's legacy login.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: SecretString,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: SecretString::from(password.into()),
        }
    }
}

/// Authenticated session against a single controller and site.
///
/// Owns the cookie-bearing HTTP client and the "believed valid" flag.
/// The flag is set by a successful [`login`](Self::login) and cleared by
/// a failed login or a failed [`check_session`](Self::check_session).
pub struct ControllerSession {
    pub(crate) http: reqwest::Client,
    pub(crate) base_url: Url,
    pub(crate) site: String,
    credentials: Credentials,
    cookie_jar: Option<Arc<Jar>>,
    valid: AtomicBool,
}

impl ControllerSession {
    /// Create a session from a `TransportConfig`.
    ///
    /// If the config doesn't already include a cookie jar, one is created
    /// automatically. `base_url` is the controller root, e.g.
    /// `https://controller:8443`.
    pub fn new(
        base_url: Url,
        site: String,
        credentials: Credentials,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let config = if transport.cookie_jar.is_some() {
            transport.clone()
        } else {
            transport.clone().with_cookie_jar()
        };
        let cookie_jar = config.cookie_jar.clone();
        let http = config.build_client()?;
        Ok(Self {
            http,
            base_url,
            site,
            credentials,
            cookie_jar,
            valid: AtomicBool::new(false),
        })
    }

    /// Create a session around a pre-built `reqwest::Client`.
    ///
    /// No jar reference is kept, so [`cookie_header`](Self::cookie_header)
    /// returns `None` unless `cookie_jar` is supplied.
    pub fn with_client(
        http: reqwest::Client,
        base_url: Url,
        site: String,
        credentials: Credentials,
        cookie_jar: Option<Arc<Jar>>,
    ) -> Self {
        Self {
            http,
            base_url,
            site,
            credentials,
            cookie_jar,
            valid: AtomicBool::new(false),
        }
    }

    /// The site identifier requests are scoped to.
    pub fn site(&self) -> &str {
        &self.site
    }

    /// The controller base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The configured username.
    pub fn username(&self) -> &str {
        &self.credentials.username
    }

    /// Whether the last login/probe left the session believed valid.
    pub fn is_valid(&self) -> bool {
        self.valid.load(Ordering::Acquire)
    }

    /// Extract the session cookie header value for the WebSocket handshake.
    ///
    /// Returns the `Cookie` header string (e.g. `"unifises=abc123"`) if the
    /// jar holds cookies for the controller URL.
    pub fn cookie_header(&self) -> Option<String> {
        let jar = self.cookie_jar.as_ref()?;
        let cookies = jar.cookies(&self.base_url)?;
        cookies.to_str().ok().map(String::from)
    }

    // ── Authentication ───────────────────────────────────────────────

    /// Authenticate with the controller using the stored credentials.
    ///
    /// `POST /api/login` with `{username, password, strict: true}`.
    /// Any non-success status is an [`Error::Authentication`].
    pub async fn login(&self) -> Result<(), Error> {
        let url = self.api_url("login")?;
        debug!("logging in at {}", url);

        let body = json!({
            "username": self.credentials.username,
            "password": self.credentials.password.expose_secret(),
            "strict": true,
        });

        let resp = match self.http.post(url).json(&body).send().await {
            Ok(resp) => resp,
            Err(e) => {
                self.valid.store(false, Ordering::Release);
                return Err(Error::Transport(e));
            }
        };

        let status = resp.status();
        if !status.is_success() {
            self.valid.store(false, Ordering::Release);
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Authentication {
                message: format!("login failed (HTTP {status}): {}", preview(&body)),
            });
        }

        self.valid.store(true, Ordering::Release);
        debug!("login successful");
        Ok(())
    }

    /// Probe the session with `GET /api/self`.
    ///
    /// Any failure, transport or status, reads as [`Error::SessionExpired`].
    pub async fn check_session(&self) -> Result<(), Error> {
        let url = self.api_url("self")?;
        debug!("probing session at {}", url);

        let outcome = match self.http.get(url).send().await {
            Ok(resp) if resp.status().is_success() => Ok(()),
            Ok(resp) => Err(format!("HTTP {}", resp.status())),
            Err(e) => Err(e.to_string()),
        };

        match outcome {
            Ok(()) => {
                self.valid.store(true, Ordering::Release);
                Ok(())
            }
            Err(reason) => {
                debug!(%reason, "session probe failed");
                self.valid.store(false, Ordering::Release);
                Err(Error::SessionExpired)
            }
        }
    }
}

/// First 200 characters of a response body, for error messages.
pub(crate) fn preview(body: &str) -> String {
    body.chars().take(200).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(base: &str) -> ControllerSession {
        ControllerSession::with_client(
            reqwest::Client::new(),
            Url::parse(base).unwrap(),
            "default".into(),
            Credentials::new("admin", "hunter2"),
            Some(Arc::new(Jar::default())),
        )
    }

    #[test]
    fn new_session_is_not_valid() {
        assert!(!session("https://controller:8443").is_valid());
    }

    #[test]
    fn cookie_header_reads_jar_for_controller_origin() {
        let jar = Arc::new(Jar::default());
        let base = Url::parse("https://controller:8443").unwrap();
        jar.add_cookie_str("unifises=abc123; Path=/", &base);

        let session = ControllerSession::with_client(
            reqwest::Client::new(),
            base,
            "default".into(),
            Credentials::new("admin", "hunter2"),
            Some(jar),
        );

        assert_eq!(session.cookie_header().as_deref(), Some("unifises=abc123"));
    }

    #[test]
    fn empty_jar_yields_no_cookie() {
        assert!(session("https://controller:8443").cookie_header().is_none());
    }

    #[test]
    fn preview_truncates_on_char_boundaries() {
        let body = "é".repeat(300);
        assert_eq!(preview(&body).chars().count(), 200);
    }
}
