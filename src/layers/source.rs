//! Descriptions of slippy-map tile servers.

use serde::{Deserialize, Serialize};

use crate::cache::TileId;
use crate::utils::NavtileError;

/// One tile server and how to build request URLs for it.
///
/// Templates may contain `{z}`, `{x}` and `{y}` for tile coordinates,
/// `{q}` for the Bing-style quadkey, `{c}` for a rotating subdomain and
/// `{k}` for an API key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TileSource {
    pub name: String,
    pub url_template: String,
    #[serde(default)]
    pub subdomains: Vec<String>,
    #[serde(default = "default_max_zoom")]
    pub max_zoom: u8,
    #[serde(default)]
    pub attribution: String,
    #[serde(default)]
    pub requires_api_key: bool,
}

fn default_max_zoom() -> u8 {
    19
}

impl TileSource {
    /// Render the request URL for one tile.
    pub fn tile_url(&self, tile: &TileId, api_key: Option<&str>) -> Result<String, NavtileError> {
        let mut url = self.url_template.clone();

        if url.contains("{c}") {
            if self.subdomains.is_empty() {
                return Err(NavtileError::LayerError(format!(
                    "layer '{}' uses {{c}} but lists no subdomains",
                    self.name
                )));
            }
            // Spread successive tiles across the server pool while keeping
            // each tile pinned to one host.
            let index = (tile.x as u64 + tile.y as u64) % self.subdomains.len() as u64;
            url = url.replace("{c}", &self.subdomains[index as usize]);
        }

        if url.contains("{k}") {
            let key = api_key.ok_or_else(|| {
                NavtileError::LayerError(format!("layer '{}' requires an API key", self.name))
            })?;
            url = url.replace("{k}", key);
        }

        if url.contains("{q}") {
            url = url.replace("{q}", &tile.quadkey());
        }

        Ok(url
            .replace("{z}", &tile.zoom.to_string())
            .replace("{x}", &tile.x.to_string())
            .replace("{y}", &tile.y.to_string()))
    }
}
