pub use tasklist_core::config::*;

use crate::cli::Cli;

pub fn from_cli(cli: &Cli) -> anyhow::Result<AppConfig> {
    AppConfig::discover(ConfigOverrides {
        api_url: cli.api_url.clone(),
        user_id: cli.user_id,
        config_path: cli.config.clone(),
    })
}
