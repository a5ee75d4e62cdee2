mod expiring;
mod file_cache;
mod stats;
mod trailer;
mod traits;
mod types;

pub use expiring::ExpiringTileCache;
pub use file_cache::TileFileCache;
pub use stats::CacheStats;
pub use trailer::{decode_trailer, encode_trailer, Expiration, EXPIRES_TAG, TRAILER_LEN};
pub use traits::TileStore;
pub use types::{CachedTile, TileId};

use crate::app::Config;
use crate::utils::NavtileError;

/// Open the tile cache at the directory the configuration resolves to
pub fn init(config: &Config) -> Result<ExpiringTileCache, NavtileError> {
    let root = config.cache.resolve_directory()?;
    ExpiringTileCache::new(root)
}
