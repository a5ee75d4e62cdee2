use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "navtile")]
#[command(version)]
#[command(about = "Expiring slippy-map tile cache for flight-sim moving maps", long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Cache root directory (overrides configuration)
    #[arg(long, env = "NAVTILE_CACHE_DIR")]
    pub cache_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sweep expired tiles out of the cache
    Sweep {
        /// Seconds to wait before sweeping, as at application startup
        #[arg(long)]
        delay_secs: Option<u64>,
    },
    /// Show cache statistics
    Stats {
        /// Emit JSON instead of plain text
        #[arg(long)]
        json: bool,
    },
    /// List available map layers
    Layers,
    /// Initialize configuration
    Init,
    /// Show version information
    Version,
}
