//! Profile configuration for the UniFi event client.
//!
//! TOML profiles, credential resolution (env + keyring + plaintext),
//! and translation to `unifi_events_core::ClientConfig`. The CLI layers
//! its own flag overrides on top.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use unifi_events_core::{ClientConfig, TlsVerification};

/// Service name used for keyring entries (`<profile>/password`).
pub const KEYRING_SERVICE: &str = "unifi-events";

/// Prefix for environment overrides (`UNIFI_EVENTS_DEFAULTS__SITE`, ...).
pub const ENV_PREFIX: &str = "UNIFI_EVENTS_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{profile}' not found")]
    UnknownProfile { profile: String },

    #[error("no {what} configured for profile '{profile}'")]
    NoCredentials { profile: String, what: &'static str },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when none is named.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Named controller profiles.
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_site")]
    pub site: String,

    /// Skip TLS certificate checks.
    #[serde(default)]
    pub insecure: bool,

    /// HTTP timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    #[serde(default = "default_reconnect_delay_ms")]
    pub reconnect_delay_ms: u64,

    #[serde(default = "default_keepalive_secs")]
    pub keepalive_secs: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            site: default_site(),
            insecure: false,
            timeout: default_timeout(),
            reconnect_delay_ms: default_reconnect_delay_ms(),
            keepalive_secs: default_keepalive_secs(),
        }
    }
}

fn default_site() -> String {
    "default".into()
}
fn default_timeout() -> u64 {
    30
}
fn default_reconnect_delay_ms() -> u64 {
    5000
}
fn default_keepalive_secs() -> u64 {
    15
}

/// A named controller profile. Unset fields fall back to [`Defaults`].
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Profile {
    /// Controller base URL (e.g., "https://192.168.1.1:8443").
    pub controller: String,

    pub site: Option<String>,

    pub username: Option<String>,

    /// Password (plaintext -- prefer keyring or env var).
    pub password: Option<String>,

    /// Environment variable name containing the password.
    pub password_env: Option<String>,

    pub insecure: Option<bool>,

    pub timeout: Option<u64>,

    pub reconnect_delay_ms: Option<u64>,

    pub keepalive_secs: Option<u64>,
}

impl Config {
    /// Look up a profile by name, falling back to `default_profile`.
    pub fn profile(&self, name: Option<&str>) -> Result<(String, &Profile), ConfigError> {
        let name = name
            .or(self.default_profile.as_deref())
            .unwrap_or("default")
            .to_owned();
        match self.profiles.get(&name) {
            Some(profile) => Ok((name, profile)),
            None => Err(ConfigError::UnknownProfile { profile: name }),
        }
    }

    /// TOML rendering with plaintext passwords masked.
    pub fn to_redacted_toml(&self) -> Result<String, ConfigError> {
        let mut redacted = self.clone();
        for profile in redacted.profiles.values_mut() {
            if profile.password.is_some() {
                profile.password = Some("********".into());
            }
        }
        Ok(toml::to_string_pretty(&redacted)?)
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "unifi-events", "unifi-events").map_or_else(
        || {
            let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
            p.push(".config");
            p.push("unifi-events");
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from an explicit file + environment. A missing file is fine.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"));

    Ok(figment.extract()?)
}

// ── Credential resolution ───────────────────────────────────────────

/// Username from the profile, else `UNIFI_EVENTS_USERNAME`.
pub fn resolve_username(profile: &Profile, profile_name: &str) -> Result<String, ConfigError> {
    profile
        .username
        .clone()
        .or_else(|| std::env::var(format!("{ENV_PREFIX}USERNAME")).ok())
        .filter(|u| !u.trim().is_empty())
        .ok_or_else(|| ConfigError::NoCredentials {
            profile: profile_name.into(),
            what: "username",
        })
}

/// Password from the credential chain: the profile's `password_env`,
/// then `UNIFI_EVENTS_PASSWORD`, then the system keyring, then plaintext.
pub fn resolve_password(profile: &Profile, profile_name: &str) -> Result<SecretString, ConfigError> {
    // 1. Env vars
    if let Some(ref env_name) = profile.password_env {
        if let Ok(val) = std::env::var(env_name) {
            return Ok(SecretString::from(val));
        }
    }
    if let Ok(val) = std::env::var(format!("{ENV_PREFIX}PASSWORD")) {
        return Ok(SecretString::from(val));
    }

    // 2. System keyring
    if let Ok(entry) = keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/password")) {
        if let Ok(secret) = entry.get_password() {
            return Ok(SecretString::from(secret));
        }
    }

    // 3. Plaintext in config
    if let Some(ref pw) = profile.password {
        return Ok(SecretString::from(pw.clone()));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
        what: "password",
    })
}

/// Build a `ClientConfig` from a profile and defaults -- no CLI overrides.
pub fn profile_to_client_config(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<ClientConfig, ConfigError> {
    let password = resolve_password(profile, profile_name)?;
    client_config_with_password(profile, profile_name, defaults, password)
}

/// Like [`profile_to_client_config`], with the password already resolved.
pub fn client_config_with_password(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
    password: SecretString,
) -> Result<ClientConfig, ConfigError> {
    let url: url::Url = profile
        .controller
        .parse()
        .map_err(|_| ConfigError::Validation {
            field: "controller".into(),
            reason: format!("invalid URL: {}", profile.controller),
        })?;

    let username = resolve_username(profile, profile_name)?;

    let mut config = ClientConfig::new(url, username, password);
    config.site = profile.site.clone().unwrap_or_else(|| defaults.site.clone());
    config.tls = TlsVerification::from_verify_flag(!profile.insecure.unwrap_or(defaults.insecure));
    config.timeout = Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout));
    config.reconnect_delay = Duration::from_millis(
        profile
            .reconnect_delay_ms
            .unwrap_or(defaults.reconnect_delay_ms),
    );
    config.keepalive_interval =
        Duration::from_secs(profile.keepalive_secs.unwrap_or(defaults.keepalive_secs));

    config.validate().map_err(|e| ConfigError::Validation {
        field: format!("profile '{profile_name}'"),
        reason: e.to_string(),
    })?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use pretty_assertions::assert_eq;
    use secrecy::ExposeSecret;

    use super::*;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    const SAMPLE: &str = r#"
default_profile = "home"

[defaults]
reconnect_delay_ms = 2500

[profiles.home]
controller = "https://192.168.1.1:8443"
username = "admin"
password = "hunter2"
insecure = true

[profiles.lab]
controller = "https://lab.example.com"
site = "lab"
username = "ops"
password = "pw"
keepalive_secs = 30
"#;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_from(&dir.path().join("absent.toml")).unwrap();

        assert_eq!(config.default_profile.as_deref(), Some("default"));
        assert_eq!(config.defaults.reconnect_delay_ms, 5000);
        assert!(config.profiles.is_empty());
    }

    #[test]
    fn profiles_merge_with_defaults() {
        let file = write_config(SAMPLE);
        let config = load_config_from(file.path()).unwrap();

        let (name, home) = config.profile(None).unwrap();
        assert_eq!(name, "home");
        let client = profile_to_client_config(home, &name, &config.defaults).unwrap();
        assert_eq!(client.site, "default");
        assert_eq!(client.tls, TlsVerification::DangerAcceptInvalid);
        assert_eq!(client.reconnect_delay, Duration::from_millis(2500));
        assert_eq!(client.keepalive_interval, Duration::from_secs(15));

        let (name, lab) = config.profile(Some("lab")).unwrap();
        let client = profile_to_client_config(lab, &name, &config.defaults).unwrap();
        assert_eq!(client.site, "lab");
        assert_eq!(client.tls, TlsVerification::SystemDefaults);
        assert_eq!(client.keepalive_interval, Duration::from_secs(30));
    }

    #[test]
    fn unknown_profile_is_an_error() {
        let file = write_config(SAMPLE);
        let config = load_config_from(file.path()).unwrap();
        assert!(matches!(
            config.profile(Some("nope")),
            Err(ConfigError::UnknownProfile { .. })
        ));
    }

    #[test]
    fn password_env_wins_over_plaintext() {
        let profile = Profile {
            controller: "https://c".into(),
            username: Some("admin".into()),
            password: Some("plaintext".into()),
            // PATH is always set; stands in for a password variable.
            password_env: Some("PATH".into()),
            ..Profile::default()
        };
        let secret = resolve_password(&profile, "test").unwrap();
        assert_eq!(secret.expose_secret(), std::env::var("PATH").unwrap());
    }

    #[test]
    fn bad_controller_url_is_validation_error() {
        let profile = Profile {
            controller: "not a url".into(),
            username: Some("admin".into()),
            password: Some("pw".into()),
            ..Profile::default()
        };
        assert!(matches!(
            profile_to_client_config(&profile, "x", &Defaults::default()),
            Err(ConfigError::Validation { .. })
        ));
    }

    #[test]
    fn redacted_toml_hides_passwords() {
        let file = write_config(SAMPLE);
        let config = load_config_from(file.path()).unwrap();
        let rendered = config.to_redacted_toml().unwrap();

        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("********"));
        assert!(rendered.contains("https://lab.example.com"));
    }
}
