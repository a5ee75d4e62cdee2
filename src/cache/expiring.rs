//! The expiring decorator around the base tile store.
//!
//! `trigger_cleanup` schedules a recursive sweep on a dedicated blocking
//! thread: tiles whose trailer expiration has passed are deleted, and
//! directories emptied by those deletions are pruned bottom-up. Every
//! failure is contained to the file or directory that caused it, so one
//! bad entry never aborts a pass.

use std::fs::{self, File};
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use super::file_cache::TileFileCache;
use super::trailer::{decode_trailer, Expiration, TRAILER_LEN};
use super::traits::TileStore;
use super::types::{CachedTile, TileId};
use crate::utils::NavtileError;

/// A tile store that can reclaim expired entries in the background.
///
/// Reads and writes are delegated to the wrapped store untouched; the
/// decorator only adds the maintenance sweep over the directory tree the
/// store writes into.
pub struct ExpiringTileCache<S: TileStore = TileFileCache> {
    inner: S,
    root: PathBuf,
}

impl ExpiringTileCache<TileFileCache> {
    /// Build the decorator over a file store rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, NavtileError> {
        let root = root.into();
        let inner = TileFileCache::new(root.clone())?;
        Ok(Self { inner, root })
    }
}

impl<S: TileStore> ExpiringTileCache<S> {
    /// Decorate an arbitrary store, sweeping the tree under `root`.
    pub fn with_store(store: S, root: impl Into<PathBuf>) -> Result<Self, NavtileError> {
        let root = root.into();
        if root.as_os_str().is_empty() {
            return Err(NavtileError::InvalidArgument(
                "cache root directory must not be empty".into(),
            ));
        }
        Ok(Self { inner: store, root })
    }

    /// Directory the sweep maintains.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Schedule a cleanup sweep on a dedicated background thread and
    /// return immediately.
    ///
    /// The handle may be dropped (fire-and-forget) or awaited by callers
    /// that want to observe completion. The sweep never reports failure:
    /// problem files are logged and skipped, and whatever they held is
    /// retried on the next pass.
    pub fn trigger_cleanup(&self) -> JoinHandle<()> {
        let root = self.root.clone();
        tokio::task::spawn_blocking(move || {
            let deleted = sweep_root(&root);
            info!(deleted, root = %root.display(), "tile cache sweep finished");
        })
    }
}

#[async_trait]
impl<S: TileStore> TileStore for ExpiringTileCache<S> {
    async fn get(&self, tile: &TileId) -> Result<Option<CachedTile>, NavtileError> {
        self.inner.get(tile).await
    }

    async fn set(
        &self,
        tile: &TileId,
        payload: &[u8],
        expires: Expiration,
    ) -> Result<(), NavtileError> {
        self.inner.set(tile, payload, expires).await
    }
}

/// Sweep every subdirectory of the cache root.
///
/// Files directly in the root are left alone and the root itself is never
/// removed, matching the original cleaner.
fn sweep_root(root: &Path) -> usize {
    let entries = match fs::read_dir(root) {
        Ok(entries) => entries,
        Err(err) => {
            warn!(root = %root.display(), error = %err, "failed listing cache root");
            return 0;
        }
    };

    let mut deleted = 0;
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            deleted += sweep_directory(&path);
        }
    }
    deleted
}

/// Depth-first post-order sweep of one directory. Returns the number of
/// files deleted in this subtree.
fn sweep_directory(dir: &Path) -> usize {
    let mut subdirs = Vec::new();
    let mut files = Vec::new();

    match fs::read_dir(dir) {
        Ok(entries) => {
            for entry in entries.flatten() {
                let path = entry.path();
                if path.is_dir() {
                    subdirs.push(path);
                } else {
                    files.push(path);
                }
            }
        }
        Err(err) => {
            warn!(directory = %dir.display(), error = %err, "failed listing cache directory");
            return 0;
        }
    }

    let mut deleted = 0;

    // Children first, so directories emptied below are already gone when
    // this directory is considered for pruning.
    for subdir in &subdirs {
        deleted += sweep_directory(subdir);
    }

    for file in &files {
        match remove_if_expired(file) {
            Ok(true) => deleted += 1,
            Ok(false) => {}
            Err(err) => {
                warn!(file = %file.display(), error = %err, "failed cleaning cache file");
            }
        }
    }

    prune_if_empty(dir);

    deleted
}

/// Delete `file` when its embedded expiration lies strictly in the past.
/// The current time is sampled per call, matching the original cleaner.
fn remove_if_expired(file: &Path) -> io::Result<bool> {
    if read_expiration(file)? < Expiration::now() {
        fs::remove_file(file)?;
        return Ok(true);
    }
    Ok(false)
}

/// Read the expiration embedded in the trailing 16 bytes of `file`.
///
/// Files of 16 bytes or fewer, short reads, and mismatched tags all mean
/// "never expires"; only genuine I/O failures surface as errors.
pub(crate) fn read_expiration(file: &Path) -> io::Result<Expiration> {
    let length = fs::metadata(file)?.len();
    if length <= TRAILER_LEN as u64 {
        return Ok(Expiration::NEVER);
    }

    let mut handle = File::open(file)?;
    handle.seek(SeekFrom::End(-(TRAILER_LEN as i64)))?;

    let mut trailer = [0u8; TRAILER_LEN];
    match handle.read_exact(&mut trailer) {
        Ok(()) => Ok(decode_trailer(&trailer).unwrap_or(Expiration::NEVER)),
        // The file shrank between metadata and read; treat as no trailer.
        Err(err) if err.kind() == io::ErrorKind::UnexpectedEof => Ok(Expiration::NEVER),
        Err(err) => Err(err),
    }
}

/// Remove `dir` if the sweep left it with no entries at all. A concurrent
/// write can legitimately make the removal fail; that is logged and
/// ignored.
fn prune_if_empty(dir: &Path) {
    let is_empty = match fs::read_dir(dir) {
        Ok(mut entries) => entries.next().is_none(),
        Err(err) => {
            warn!(directory = %dir.display(), error = %err, "failed re-listing cache directory");
            return;
        }
    };

    if is_empty {
        if let Err(err) = fs::remove_dir(dir) {
            warn!(directory = %dir.display(), error = %err, "failed removing empty cache directory");
        }
    }
}
