//! Clap derive structures for the `unifi-events` CLI.

use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

use unifi_events_core::Topic;

// ── Top-Level CLI ────────────────────────────────────────────────────

/// unifi-events -- follow and query a UniFi controller
#[derive(Debug, Parser)]
#[command(
    name = "unifi-events",
    version,
    about = "Stream UniFi controller events and query its API",
    long_about = "Logs in to a UniFi Network controller, keeps its event WebSocket open\n\
        (reconnecting after a fixed delay when it drops), and prints classified\n\
        events. Also issues session-guarded REST requests.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Controller profile to use
    #[arg(long, short = 'p', env = "UNIFI_EVENTS_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Controller URL (overrides profile)
    #[arg(long, short = 'c', env = "UNIFI_EVENTS_CONTROLLER", global = true)]
    pub controller: Option<String>,

    /// Site name
    #[arg(long, short = 's', env = "UNIFI_EVENTS_SITE", global = true)]
    pub site: Option<String>,

    /// Controller username
    #[arg(long, short = 'u', env = "UNIFI_EVENTS_USERNAME", global = true)]
    pub username: Option<String>,

    /// Controller password
    #[arg(long, env = "UNIFI_EVENTS_PASSWORD", global = true, hide_env_values = true)]
    pub password: Option<String>,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "UNIFI_EVENTS_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds
    #[arg(long, env = "UNIFI_EVENTS_TIMEOUT", global = true)]
    pub timeout: Option<u64>,

    /// Wait before reconnecting the event stream (e.g. "5s", "500ms")
    #[arg(long, value_parser = humantime::parse_duration, global = true)]
    pub reconnect_delay: Option<Duration>,

    /// Output format
    #[arg(long, short = 'o', default_value = "json", global = true)]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// One human-readable line per item
    Plain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Follow the controller event stream
    #[command(alias = "watch")]
    Listen(ListenArgs),

    /// Site-scoped GET request (api/s/{site}/{path})
    Get(PathArgs),

    /// Site-scoped POST request with a JSON body
    Post(PostArgs),

    /// Site-scoped DELETE request
    Delete(PathArgs),

    /// List sites visible to this account
    Sites,

    /// Per-site health and statistics (super-admin)
    SiteStats,

    /// List active clients
    #[command(alias = "cl")]
    Clients,

    /// Show one client by MAC address
    Client(ClientArgs),

    /// Inspect configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Command args ─────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ListenArgs {
    /// Topics to print: `*`, `unifi.*`, `wu.*`, `lu.login`, ... (repeatable)
    #[arg(long = "filter", short = 'f', default_value = "*")]
    pub filters: Vec<Topic>,

    /// Exit after this many controller events
    #[arg(long, short = 'n')]
    pub count: Option<u64>,
}

#[derive(Debug, Args)]
pub struct PathArgs {
    /// Path below api/s/{site}/, e.g. `stat/device`
    pub path: String,
}

#[derive(Debug, Args)]
pub struct PostArgs {
    /// Path below api/s/{site}/, e.g. `cmd/stamgr`
    pub path: String,

    /// JSON body (inline), or `@file.json` to read from a file
    #[arg(long, short = 'd', default_value = "{}")]
    pub data: String,
}

#[derive(Debug, Args)]
pub struct ClientArgs {
    /// Client MAC address
    pub mac: String,
}

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the config file location
    Path,
    /// Print the effective configuration (passwords masked)
    Show,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell
    pub shell: Shell,
}
