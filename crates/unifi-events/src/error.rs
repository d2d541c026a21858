//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with help text.

use miette::Diagnostic;
use thiserror::Error;

use unifi_events_config::ConfigError;
use unifi_events_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────

    #[error("Could not connect to controller at {url}")]
    #[diagnostic(
        code(unifi_events::connection_failed),
        help(
            "Check that the controller is running and reachable.\n\
             Self-signed certificate? Retry with --insecure (-k)."
        )
    )]
    ConnectionFailed {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    // ── Authentication ───────────────────────────────────────────────

    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(unifi_events::auth_failed),
        help(
            "Verify the username and password for this controller.\n\
             Passwords resolve from --password, UNIFI_EVENTS_PASSWORD, the keyring, then the profile."
        )
    )]
    AuthFailed { message: String },

    #[error("No {what} configured for profile '{profile}'")]
    #[diagnostic(
        code(unifi_events::no_credentials),
        help("Pass --username/--password or add them to the profile in the config file.")
    )]
    NoCredentials { profile: String, what: String },

    // ── API ──────────────────────────────────────────────────────────

    #[error("Controller returned HTTP {status}: {message}")]
    #[diagnostic(code(unifi_events::not_found), help("Check the request path: {hint}"))]
    NotFound {
        status: u16,
        message: String,
        hint: String,
    },

    #[error("API error: {message}")]
    #[diagnostic(code(unifi_events::api_error))]
    ApiError { message: String },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(unifi_events::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(unifi_events::profile_not_found),
        help("Available profiles: {available}\nConfig file: {path}")
    )]
    ProfileNotFound {
        name: String,
        available: String,
        path: String,
    },

    #[error("No controller configured")]
    #[diagnostic(
        code(unifi_events::no_config),
        help(
            "Pass --controller (-c) or create a profile in:\n  {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(unifi_events::config))]
    Config(Box<ConfigError>),

    // ── IO / Serialization ───────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON payload: {0}")]
    #[diagnostic(code(unifi_events::json), help("Check the JSON body and try again."))]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Validation { .. } | Self::NoConfig { .. } | Self::ProfileNotFound { .. } => {
                exit_code::USAGE
            }
            _ => exit_code::GENERAL,
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::NoCredentials { profile, what } => CliError::NoCredentials {
                profile,
                what: what.into(),
            },
            other => CliError::Config(Box::new(other)),
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => CliError::ConnectionFailed {
                url,
                source: reason.into(),
            },

            CoreError::AuthenticationFailed { message }
            | CoreError::Reauthentication { message } => CliError::AuthFailed { message },

            CoreError::SessionExpired => CliError::AuthFailed {
                message: "session expired".into(),
            },

            CoreError::Api {
                message,
                status: Some(404),
            } => CliError::NotFound {
                status: 404,
                message,
                hint: "paths are relative to api/s/{site}/".into(),
            },

            CoreError::Api { message, status: _ }
            | CoreError::MalformedMessage { message }
            | CoreError::Internal(message) => CliError::ApiError { message },

            CoreError::Config { message } => CliError::Validation {
                field: "configuration".into(),
                reason: message,
            },

            CoreError::ClientShutdown => CliError::ApiError {
                message: "event client already shut down".into(),
            },
        }
    }
}
