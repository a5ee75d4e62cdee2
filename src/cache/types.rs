use std::fmt;
use std::path::PathBuf;

use bytes::Bytes;

use super::trailer::{decode_trailer, Expiration, TRAILER_LEN};

/// Address of a single map tile within a named layer.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct TileId {
    pub layer: String,
    pub zoom: u8,
    pub x: u32,
    pub y: u32,
}

impl TileId {
    pub fn new(layer: impl Into<String>, zoom: u8, x: u32, y: u32) -> Self {
        Self {
            layer: layer.into(),
            zoom,
            x,
            y,
        }
    }

    /// Path of this tile relative to the cache root:
    /// `<layer>/<zoom>/<x>/<y>.png`.
    ///
    /// The layer name is sanitized to `[A-Za-z0-9_-]` so a key can never
    /// address anything outside the root.
    pub fn relative_path(&self) -> PathBuf {
        let mut path = PathBuf::from(sanitize_layer(&self.layer));
        path.push(self.zoom.to_string());
        path.push(self.x.to_string());
        path.push(format!("{}.png", self.y));
        path
    }

    /// Bing-style quadkey: one base-4 digit per zoom level, most
    /// significant level first.
    pub fn quadkey(&self) -> String {
        let mut key = String::with_capacity(self.zoom as usize);
        for level in (1..=self.zoom).rev() {
            let mask = 1u32 << (level - 1);
            let mut digit = 0u8;
            if self.x & mask != 0 {
                digit += 1;
            }
            if self.y & mask != 0 {
                digit += 2;
            }
            key.push(char::from(b'0' + digit));
        }
        key
    }
}

impl fmt::Display for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}/{}", self.layer, self.zoom, self.x, self.y)
    }
}

fn sanitize_layer(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// A tile payload together with its decoded expiration.
#[derive(Debug, Clone)]
pub struct CachedTile {
    pub payload: Bytes,
    pub expires: Expiration,
}

impl CachedTile {
    /// Split a raw cache file buffer into payload and expiration.
    ///
    /// Buffers of 16 bytes or fewer, and buffers whose last 16 bytes do
    /// not carry the `EXPIRES:` tag, are all payload and never expire.
    pub fn from_buffer(buffer: Vec<u8>) -> Self {
        if buffer.len() > TRAILER_LEN {
            let split = buffer.len() - TRAILER_LEN;
            let mut trailer = [0u8; TRAILER_LEN];
            trailer.copy_from_slice(&buffer[split..]);
            if let Some(expires) = decode_trailer(&trailer) {
                let mut payload = buffer;
                payload.truncate(split);
                return Self {
                    payload: Bytes::from(payload),
                    expires,
                };
            }
        }
        Self {
            payload: Bytes::from(buffer),
            expires: Expiration::NEVER,
        }
    }

    /// True once the tile's expiration lies strictly in the past.
    pub fn is_expired(&self) -> bool {
        self.expires.is_past()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::trailer::encode_trailer;
    use pretty_assertions::assert_eq;

    #[test]
    fn relative_path_nests_layer_zoom_x_y() {
        let tile = TileId::new("osm", 12, 2154, 1363);
        assert_eq!(
            tile.relative_path(),
            PathBuf::from("osm/12/2154/1363.png")
        );
    }

    #[test]
    fn hostile_layer_names_stay_under_the_root() {
        let tile = TileId::new("../evil", 1, 0, 0);
        assert_eq!(tile.relative_path(), PathBuf::from("___evil/1/0/0.png"));
    }

    #[test]
    fn quadkey_interleaves_x_and_y_bits() {
        // Worked example from the Bing tile system documentation.
        let tile = TileId::new("bing", 3, 3, 5);
        assert_eq!(tile.quadkey(), "213");

        let origin = TileId::new("bing", 2, 0, 0);
        assert_eq!(origin.quadkey(), "00");
    }

    #[test]
    fn buffer_with_valid_trailer_splits_payload() {
        let expires = Expiration::from_ticks(42);
        let mut buffer = b"payload".to_vec();
        buffer.extend_from_slice(&encode_trailer(expires));

        let tile = CachedTile::from_buffer(buffer);
        assert_eq!(tile.payload.as_ref(), b"payload");
        assert_eq!(tile.expires, expires);
    }

    #[test]
    fn short_buffer_is_all_payload() {
        let tile = CachedTile::from_buffer(b"0123456789".to_vec());
        assert_eq!(tile.payload.as_ref(), b"0123456789");
        assert_eq!(tile.expires, Expiration::NEVER);
        assert!(!tile.is_expired());
    }

    #[test]
    fn exactly_trailer_sized_buffer_is_all_payload() {
        let buffer = encode_trailer(Expiration::from_ticks(1)).to_vec();
        let tile = CachedTile::from_buffer(buffer.clone());
        assert_eq!(tile.payload.as_ref(), buffer.as_slice());
        assert_eq!(tile.expires, Expiration::NEVER);
    }

    #[test]
    fn garbage_tail_is_payload_not_metadata() {
        let mut buffer = b"payload".to_vec();
        buffer.extend_from_slice(b"NOTATAG:AAAAAAAA");

        let tile = CachedTile::from_buffer(buffer.clone());
        assert_eq!(tile.payload.as_ref(), buffer.as_slice());
        assert_eq!(tile.expires, Expiration::NEVER);
    }
}
