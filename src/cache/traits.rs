use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use super::trailer::Expiration;
use super::types::{CachedTile, TileId};
use crate::utils::NavtileError;

/// The key→bytes seam the map control loads tiles through.
///
/// Both the base file store and the expiring decorator implement it, so
/// hosts can wire either into their tile pipeline.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait TileStore: Send + Sync {
    /// Fetch a cached tile, or `None` when the key has no entry.
    async fn get(&self, tile: &TileId) -> Result<Option<CachedTile>, NavtileError>;

    /// Persist a tile payload together with its expiration trailer.
    async fn set(
        &self,
        tile: &TileId,
        payload: &[u8],
        expires: Expiration,
    ) -> Result<(), NavtileError>;
}
