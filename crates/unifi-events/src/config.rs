//! Bridges the shared config crate and CLI flags into a `ClientConfig`.
//!
//! Flags override the selected profile field by field; with no profile at
//! all, `--controller` plus credentials is enough.

use std::io::IsTerminal;

use secrecy::SecretString;

use unifi_events_config::{self as config, ConfigError, Profile};
use unifi_events_core::ClientConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Build the client config from the config file, profile, and CLI overrides.
pub fn build_client_config(global: &GlobalOpts) -> Result<ClientConfig, CliError> {
    let cfg = config::load_config()?;

    let (profile_name, profile) = match cfg.profile(global.profile.as_deref()) {
        Ok((name, profile)) => (name, profile.clone()),
        // An explicitly named profile must exist.
        Err(ConfigError::UnknownProfile { profile }) if global.profile.is_some() => {
            return Err(CliError::ProfileNotFound {
                name: profile,
                available: available_profiles(&cfg),
                path: config::config_path().display().to_string(),
            });
        }
        Err(ConfigError::UnknownProfile { profile }) => (profile, Profile::default()),
        Err(e) => return Err(e.into()),
    };

    let merged = apply_overrides(profile, global);
    if merged.controller.is_empty() {
        return Err(CliError::NoConfig {
            path: config::config_path().display().to_string(),
        });
    }

    let password = resolve_password(&merged, &profile_name, global)?;
    let client = config::client_config_with_password(&merged, &profile_name, &cfg.defaults, password)?;

    tracing::debug!(
        profile = %profile_name,
        url = %client.url,
        site = %client.site,
        "resolved client config"
    );
    Ok(client)
}

fn apply_overrides(mut profile: Profile, global: &GlobalOpts) -> Profile {
    if let Some(ref controller) = global.controller {
        profile.controller.clone_from(controller);
    }
    if let Some(ref site) = global.site {
        profile.site = Some(site.clone());
    }
    if let Some(ref username) = global.username {
        profile.username = Some(username.clone());
    }
    if global.insecure {
        profile.insecure = Some(true);
    }
    if let Some(timeout) = global.timeout {
        profile.timeout = Some(timeout);
    }
    if let Some(delay) = global.reconnect_delay {
        profile.reconnect_delay_ms = Some(u64::try_from(delay.as_millis()).unwrap_or(u64::MAX));
    }
    profile
}

/// `--password` first, then the config crate's chain, then an interactive
/// prompt when stdin is a terminal.
fn resolve_password(
    profile: &Profile,
    profile_name: &str,
    global: &GlobalOpts,
) -> Result<SecretString, CliError> {
    if let Some(ref pw) = global.password {
        return Ok(SecretString::from(pw.clone()));
    }

    match config::resolve_password(profile, profile_name) {
        Ok(secret) => Ok(secret),
        Err(ConfigError::NoCredentials { .. }) if std::io::stdin().is_terminal() => {
            let user = profile.username.as_deref().unwrap_or("admin");
            let pw = rpassword::prompt_password(format!("Password for {user}: "))?;
            Ok(SecretString::from(pw))
        }
        Err(e) => Err(e.into()),
    }
}

fn available_profiles(cfg: &config::Config) -> String {
    if cfg.profiles.is_empty() {
        "(none)".into()
    } else {
        cfg.profiles.keys().cloned().collect::<Vec<_>>().join(", ")
    }
}
