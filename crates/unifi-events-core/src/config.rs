// ── Runtime client configuration ──
//
// Describes *how* to reach a controller and how the event client paces
// itself. Carries credential data but never touches disk; the CLI builds
// a `ClientConfig` from profiles/flags and hands it in.

use std::time::Duration;

use secrecy::SecretString;
use url::Url;

use unifi_events_api::TlsMode;
use unifi_events_api::websocket::KEEPALIVE_INTERVAL;

use crate::error::CoreError;

/// Site used when none is configured.
pub const DEFAULT_SITE: &str = "default";

/// Fixed wait between a lost connection and the next attempt.
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_millis(5000);

/// HTTP request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// TLS verification strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System/webpki roots (strict).
    #[default]
    SystemDefaults,
    /// Skip verification (self-signed controller certs).
    DangerAcceptInvalid,
}

impl TlsVerification {
    /// `true` verifies certificates, `false` accepts anything.
    pub fn from_verify_flag(verify: bool) -> Self {
        if verify {
            Self::SystemDefaults
        } else {
            Self::DangerAcceptInvalid
        }
    }
}

impl From<TlsVerification> for TlsMode {
    fn from(tls: TlsVerification) -> Self {
        match tls {
            TlsVerification::SystemDefaults => TlsMode::Strict,
            TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
        }
    }
}

/// Configuration for one event client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Controller base URL (e.g. `https://192.168.1.1:8443`).
    pub url: Url,
    pub username: String,
    pub password: SecretString,
    /// Site name used for site-scoped requests and the event stream.
    pub site: String,
    pub tls: TlsVerification,
    /// Wait between losing the stream and reconnecting.
    pub reconnect_delay: Duration,
    /// Interval between keepalive `ping` frames.
    pub keepalive_interval: Duration,
    /// HTTP request timeout.
    pub timeout: Duration,
}

impl ClientConfig {
    /// Config with default site, TLS, and timings.
    pub fn new(url: Url, username: impl Into<String>, password: SecretString) -> Self {
        Self {
            url,
            username: username.into(),
            password,
            site: DEFAULT_SITE.into(),
            tls: TlsVerification::default(),
            reconnect_delay: DEFAULT_RECONNECT_DELAY,
            keepalive_interval: KEEPALIVE_INTERVAL,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Reject configs the client cannot run with.
    pub fn validate(&self) -> Result<(), CoreError> {
        if !matches!(self.url.scheme(), "http" | "https") {
            return Err(CoreError::Config {
                message: format!("controller URL must be http(s), got '{}'", self.url.scheme()),
            });
        }
        if self.url.host_str().is_none() {
            return Err(CoreError::Config {
                message: "controller URL has no host".into(),
            });
        }
        if self.username.trim().is_empty() {
            return Err(CoreError::Config {
                message: "username is required".into(),
            });
        }
        if self.site.trim().is_empty() {
            return Err(CoreError::Config {
                message: "site name must not be empty".into(),
            });
        }
        if self.reconnect_delay.is_zero() {
            return Err(CoreError::Config {
                message: "reconnect delay must be greater than zero".into(),
            });
        }
        if self.keepalive_interval.is_zero() {
            return Err(CoreError::Config {
                message: "keepalive interval must be greater than zero".into(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(url: &str) -> ClientConfig {
        ClientConfig::new(url.parse().unwrap(), "admin", SecretString::from("pw".to_owned()))
    }

    #[test]
    fn defaults_are_applied() {
        let cfg = config("https://controller:8443");
        assert_eq!(cfg.site, "default");
        assert_eq!(cfg.reconnect_delay, Duration::from_secs(5));
        assert_eq!(cfg.keepalive_interval, Duration::from_secs(15));
        assert_eq!(cfg.tls, TlsVerification::SystemDefaults);
        cfg.validate().unwrap();
    }

    #[test]
    fn non_http_scheme_is_rejected() {
        let err = config("ftp://controller").validate().unwrap_err();
        assert!(matches!(err, CoreError::Config { .. }));
    }

    #[test]
    fn empty_site_and_zero_delay_are_rejected() {
        let mut cfg = config("https://controller");
        cfg.site = " ".into();
        assert!(cfg.validate().is_err());

        let mut cfg = config("https://controller");
        cfg.reconnect_delay = Duration::ZERO;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn verify_flag_maps_to_tls_mode() {
        assert_eq!(
            TlsMode::from(TlsVerification::from_verify_flag(false)),
            TlsMode::DangerAcceptInvalid
        );
        assert_eq!(
            TlsMode::from(TlsVerification::from_verify_flag(true)),
            TlsMode::Strict
        );
    }
}
