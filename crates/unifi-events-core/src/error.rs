// ── Core error types ──
//
// Subscriber-facing errors. These are what `unifi.error` notifications
// and gateway calls carry; the `From<unifi_events_api::Error>` impl
// folds transport detail into them.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Session expired -- re-authentication required")]
    SessionExpired,

    /// A guarded request found the session stale and the re-login failed.
    /// The original request was not sent.
    #[error("Re-authentication failed: {message}")]
    Reauthentication { message: String },

    // ── Connection ───────────────────────────────────────────────────
    #[error("Cannot connect to controller at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    // ── Data ─────────────────────────────────────────────────────────
    #[error("Malformed event message: {message}")]
    MalformedMessage { message: String },

    #[error("API error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Lifecycle ────────────────────────────────────────────────────
    #[error("Event client has been shut down")]
    ClientShutdown,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Socket-level failure (refused, reset, TLS, handshake).
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::ConnectionFailed { .. })
    }

    /// Login rejected or session no longer valid.
    pub fn is_auth(&self) -> bool {
        matches!(
            self,
            Self::AuthenticationFailed { .. } | Self::SessionExpired | Self::Reauthentication { .. }
        )
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<unifi_events_api::Error> for CoreError {
    fn from(err: unifi_events_api::Error) -> Self {
        match err {
            unifi_events_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            unifi_events_api::Error::SessionExpired => CoreError::SessionExpired,
            unifi_events_api::Error::Transport(ref e) => {
                if e.is_connect() || e.is_timeout() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map(ToString::to_string)
                            .unwrap_or_else(|| "<unknown>".into()),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            unifi_events_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            unifi_events_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            unifi_events_api::Error::Api { status, message } => CoreError::Api {
                message,
                status: Some(status),
            },
            unifi_events_api::Error::WebSocketConnect(reason) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("WebSocket connection failed: {reason}"),
            },
            unifi_events_api::Error::WebSocket(reason) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("WebSocket error: {reason}"),
            },
            unifi_events_api::Error::MalformedMessage { message, frame: _ } => {
                CoreError::MalformedMessage { message }
            }
            unifi_events_api::Error::Deserialization { message, body: _ } => CoreError::Api {
                message: format!("Unexpected response body: {message}"),
                status: None,
            },
        }
    }
}
