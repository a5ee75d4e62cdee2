use std::time::Duration;

use anyhow::{Context, Result};
use colored::Colorize;
use tracing::info;

use crate::app::{init_config, Config};
use crate::cache::{self, CacheStats};
use crate::layers::LayerRegistry;

use super::Commands;

/// Handle CLI subcommands
pub async fn handle_command(command: &Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Sweep { delay_secs } => {
            sweep(config, delay_secs.unwrap_or(config.cache.cleanup_delay_secs)).await
        }
        Commands::Stats { json } => show_stats(config, *json),
        Commands::Layers => {
            list_layers(config);
            Ok(())
        }
        Commands::Init => {
            println!("Initializing navtile configuration...");
            init_config()?;
            println!("Configuration initialized successfully!");
            Ok(())
        }
        Commands::Version => {
            show_version();
            Ok(())
        }
    }
}

/// Run the maintenance sweep after the configured startup delay
async fn sweep(config: &Config, delay_secs: u64) -> Result<()> {
    let cache = cache::init(config).context("Failed to open the tile cache")?;
    println!("Cache root: {}", cache.root().display());

    if delay_secs > 0 {
        info!(delay_secs, "waiting before sweep");
        tokio::time::sleep(Duration::from_secs(delay_secs)).await;
    }

    // The CLI is the one caller that awaits the fire-and-forget handle;
    // the desktop host just drops it.
    cache
        .trigger_cleanup()
        .await
        .context("Sweep worker panicked")?;
    println!("{}", "Sweep complete.".green());
    Ok(())
}

/// Print cache statistics
fn show_stats(config: &Config, json: bool) -> Result<()> {
    let root = config.cache.resolve_directory()?;
    let stats = CacheStats::gather(&root)
        .with_context(|| format!("Failed to read cache at {}", root.display()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        println!("{}", stats.format());
    }
    Ok(())
}

/// List the map layers usable with the current configuration
fn list_layers(config: &Config) {
    let registry = LayerRegistry::from_config(&config.map);
    let current = registry.current().name.clone();

    println!("Available map layers:");
    for source in registry.available() {
        let marker = if source.name == current { "*" } else { " " };
        println!(
            "{} {} (max zoom {})",
            marker,
            source.name.green(),
            source.max_zoom
        );
        println!("      {}", source.url_template);
        if !source.attribution.is_empty() {
            println!("      {}", source.attribution.dimmed());
        }
    }
}

/// Show version information
pub fn show_version() {
    println!("navtile v{}", env!("CARGO_PKG_VERSION"));
    println!("   Expiring slippy-map tile cache for flight-sim moving maps");
}
