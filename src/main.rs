use anyhow::Result;
use clap::Parser;
use talent_matcher::app_log;
use talent_matcher::cli::{handle_command, Cli};
use talent_matcher::core::ConfigManager;
use talent_matcher::logging::init_tracing;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = ConfigManager::load()?;
    init_tracing(&config.environment.log_file)?;

    app_log!(info, "Environment: {}", config.environment_name);
    match &config.source {
        Some(path) => app_log!(info, "Configuration: {}", path.display()),
        None => app_log!(info, "No configuration file found, using built-in defaults"),
    }
    app_log!(
        info,
        "Database: {}",
        config.environment.database_path.display()
    );

    handle_command(cli, config).await
}
