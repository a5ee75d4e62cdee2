use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use super::trailer::{encode_trailer, Expiration, TRAILER_LEN};
use super::traits::TileStore;
use super::types::{CachedTile, TileId};
use crate::utils::NavtileError;

/// The base key-addressed tile store: one file per tile under a root
/// directory, payload immediately followed by the expiration trailer.
///
/// This is the store the expiring decorator wraps; it knows nothing about
/// reclaiming entries.
#[derive(Debug, Clone)]
pub struct TileFileCache {
    root: PathBuf,
}

impl TileFileCache {
    /// Create a store rooted at `root`, creating the directory if needed.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, NavtileError> {
        let root = root.into();
        if root.as_os_str().is_empty() {
            return Err(NavtileError::InvalidArgument(
                "cache root directory must not be empty".into(),
            ));
        }
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn entry_path(&self, tile: &TileId) -> PathBuf {
        self.root.join(tile.relative_path())
    }
}

#[async_trait]
impl TileStore for TileFileCache {
    async fn get(&self, tile: &TileId) -> Result<Option<CachedTile>, NavtileError> {
        let path = self.entry_path(tile);
        match fs::read(&path).await {
            Ok(buffer) => Ok(Some(CachedTile::from_buffer(buffer))),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    async fn set(
        &self,
        tile: &TileId,
        payload: &[u8],
        expires: Expiration,
    ) -> Result<(), NavtileError> {
        let path = self.entry_path(tile);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let mut buffer = Vec::with_capacity(payload.len() + TRAILER_LEN);
        buffer.extend_from_slice(payload);
        buffer.extend_from_slice(&encode_trailer(expires));
        fs::write(&path, buffer).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use tempfile::tempdir;

    #[test]
    fn empty_root_is_rejected() {
        let result = TileFileCache::new("");
        assert!(matches!(result, Err(NavtileError::InvalidArgument(_))));
    }

    #[tokio::test]
    async fn set_then_get_round_trips_payload_and_expiration() {
        let dir = tempdir().unwrap();
        let cache = TileFileCache::new(dir.path()).unwrap();

        let tile = TileId::new("osm", 12, 2154, 1363);
        let expires = Expiration::from_datetime(Utc::now() + Duration::days(7));
        cache.set(&tile, b"tile bytes", expires).await.unwrap();

        let cached = cache.get(&tile).await.unwrap().unwrap();
        assert_eq!(cached.payload.as_ref(), b"tile bytes");
        assert_eq!(cached.expires, expires);
        assert!(!cached.is_expired());
    }

    #[tokio::test]
    async fn entry_lands_under_layer_zoom_x_y() {
        let dir = tempdir().unwrap();
        let cache = TileFileCache::new(dir.path()).unwrap();

        let tile = TileId::new("osm", 3, 4, 5);
        cache.set(&tile, b"x", Expiration::NEVER).await.unwrap();

        assert!(dir.path().join("osm/3/4/5.png").is_file());
    }

    #[tokio::test]
    async fn absent_tile_is_none() {
        let dir = tempdir().unwrap();
        let cache = TileFileCache::new(dir.path()).unwrap();

        let tile = TileId::new("osm", 1, 0, 0);
        assert!(cache.get(&tile).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn trailerless_file_reads_as_never_expiring_payload() {
        let dir = tempdir().unwrap();
        let cache = TileFileCache::new(dir.path()).unwrap();

        let tile = TileId::new("osm", 1, 0, 0);
        let path = dir.path().join(tile.relative_path());
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, b"raw bytes, no trailer, long enough").unwrap();

        let cached = cache.get(&tile).await.unwrap().unwrap();
        assert_eq!(
            cached.payload.as_ref(),
            b"raw bytes, no trailer, long enough"
        );
        assert_eq!(cached.expires, Expiration::NEVER);
    }
}
