//! `config` subcommands. No controller connection needed.

use unifi_events_config as config;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

pub fn handle(args: &ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Path => {
            output::print_output(&config::config_path().display().to_string(), global.quiet);
        }
        ConfigCommand::Show => {
            let cfg = config::load_config()?;
            output::print_output(cfg.to_redacted_toml()?.trim_end(), global.quiet);
        }
    }
    Ok(())
}
