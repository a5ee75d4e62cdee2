use anyhow::{Context, Result};
use clap::Parser;

use navtile::{
    app::load_config,
    cli::{handle_command, Cli},
    utils::init_logger,
    Config,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    init_logger(cli.verbose);

    // Load configuration
    let mut config = if let Some(config_path) = &cli.config {
        let toml_str = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;
        toml::from_str::<Config>(&toml_str)
            .with_context(|| format!("Failed to parse {}", config_path.display()))?
    } else {
        load_config().unwrap_or_default()
    };

    // Command-line cache root wins over every configuration layer
    if let Some(cache_dir) = cli.cache_dir.clone() {
        config.cache.directory = Some(cache_dir);
    }

    handle_command(&cli.command, &config).await
}
