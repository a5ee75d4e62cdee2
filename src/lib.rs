pub mod app;
pub mod cache;
pub mod cli;
pub mod geo;
pub mod layers;
pub mod utils;

pub use app::{load_config, Config};
pub use cache::{CachedTile, Expiration, ExpiringTileCache, TileFileCache, TileId, TileStore};
pub use layers::{LayerRegistry, TileSource};
pub use utils::NavtileError;
