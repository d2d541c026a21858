use thiserror::Error;

/// Top-level error type for the `unifi-events-api` crate.
///
/// Covers every transport-level failure: login, session probing,
/// authenticated requests, and the event WebSocket.
/// `unifi-events-core` maps these into subscriber-facing errors.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Login rejected (wrong credentials, account locked, etc.)
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// The `api/self` probe failed -- the session cookie is stale or missing.
    #[error("Session expired -- re-authentication required")]
    SessionExpired,

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS setup error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Controller API ──────────────────────────────────────────────
    /// Non-success HTTP status from an authenticated request.
    #[error("Controller API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    // ── WebSocket ───────────────────────────────────────────────────
    /// WebSocket handshake failed.
    #[error("WebSocket connection failed: {0}")]
    WebSocketConnect(String),

    /// WebSocket errored after the handshake completed.
    #[error("WebSocket error: {0}")]
    WebSocket(String),

    // ── Data ────────────────────────────────────────────────────────
    /// A stream frame was not JSON, or lacked the `data` array.
    #[error("Malformed event message: {message}")]
    MalformedMessage { message: String, frame: String },

    /// JSON deserialization of an HTTP body failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if this error indicates auth has expired
    /// and re-authentication might resolve it.
    pub fn is_auth_expired(&self) -> bool {
        matches!(self, Self::Authentication { .. } | Self::SessionExpired)
    }

    /// Returns `true` if this is a socket-level failure.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Transport(_) | Self::Tls(_) | Self::WebSocketConnect(_) | Self::WebSocket(_)
        )
    }

    /// HTTP status attached to the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            Self::Api { status, .. } => Some(*status),
            Self::Authentication { .. } | Self::SessionExpired => Some(401),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_errors_count_as_expired() {
        assert!(Error::SessionExpired.is_auth_expired());
        assert!(
            Error::Authentication {
                message: "nope".into()
            }
            .is_auth_expired()
        );
        assert!(!Error::WebSocket("reset".into()).is_auth_expired());
    }

    #[test]
    fn malformed_is_not_transport() {
        let err = Error::MalformedMessage {
            message: "expected value".into(),
            frame: "garbage".into(),
        };
        assert!(!err.is_transport());
        assert!(Error::WebSocketConnect("refused".into()).is_transport());
    }

    #[test]
    fn status_extraction() {
        let err = Error::Api {
            status: 404,
            message: "not found".into(),
        };
        assert_eq!(err.status(), Some(404));
        assert_eq!(Error::SessionExpired.status(), Some(401));
        assert_eq!(Error::Tls("bad".into()).status(), None);
    }
}
