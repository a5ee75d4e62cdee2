//! Registry of selectable map layers.

use once_cell::sync::Lazy;
use tracing::warn;

use super::source::TileSource;
use crate::app::MapConfig;
use crate::cache::TileId;
use crate::utils::NavtileError;

/// Layer selected when nothing else is configured.
pub const DEFAULT_LAYER: &str = "OpenStreetMap";

static BUILTIN_SOURCES: Lazy<Vec<TileSource>> = Lazy::new(|| {
    vec![
        TileSource {
            name: DEFAULT_LAYER.into(),
            url_template: "https://{c}.tile.openstreetmap.org/{z}/{x}/{y}.png".into(),
            subdomains: vec!["a".into(), "b".into(), "c".into()],
            max_zoom: 19,
            attribution: "© OpenStreetMap contributors".into(),
            requires_api_key: false,
        },
        TileSource {
            name: "Bing Maps Road".into(),
            url_template: "https://ecn.t{c}.tiles.virtualearth.net/tiles/r{q}.jpeg?g=1&key={k}"
                .into(),
            subdomains: vec!["0".into(), "1".into(), "2".into(), "3".into()],
            max_zoom: 20,
            attribution: "© Microsoft".into(),
            requires_api_key: true,
        },
        TileSource {
            name: "Bing Maps Aerial".into(),
            url_template: "https://ecn.t{c}.tiles.virtualearth.net/tiles/a{q}.jpeg?g=1&key={k}"
                .into(),
            subdomains: vec!["0".into(), "1".into(), "2".into(), "3".into()],
            max_zoom: 20,
            attribution: "© Microsoft".into(),
            requires_api_key: true,
        },
        TileSource {
            name: "Bing Maps Aerial with Labels".into(),
            url_template: "https://ecn.t{c}.tiles.virtualearth.net/tiles/h{q}.jpeg?g=1&key={k}"
                .into(),
            subdomains: vec!["0".into(), "1".into(), "2".into(), "3".into()],
            max_zoom: 20,
            attribution: "© Microsoft".into(),
            requires_api_key: true,
        },
    ]
});

/// The set of layers a map can draw from, with one selected.
///
/// Layers that need an API key are hidden until a key is supplied, the
/// same way the desktop map only lists keyed providers once configured.
pub struct LayerRegistry {
    sources: Vec<TileSource>,
    current: String,
    api_key: Option<String>,
}

impl LayerRegistry {
    /// Registry preloaded with the builtin sources and the default layer
    /// selected.
    pub fn new() -> Self {
        Self {
            sources: BUILTIN_SOURCES.clone(),
            current: DEFAULT_LAYER.to_string(),
            api_key: None,
        }
    }

    /// Like [`LayerRegistry::new`] but with keyed layers unlocked.
    pub fn with_api_key(key: impl Into<String>) -> Self {
        let mut registry = Self::new();
        registry.api_key = Some(key.into());
        registry
    }

    /// Build a registry from the map section of the configuration:
    /// custom layers are registered and the configured layer selected,
    /// falling back to the default when it is unknown or still locked.
    pub fn from_config(config: &MapConfig) -> Self {
        let mut registry = Self::new();
        registry.api_key = config.api_key.clone();
        for source in &config.layers {
            registry.register(source.clone());
        }
        if registry.select(&config.layer).is_err() {
            warn!(
                layer = %config.layer,
                fallback = DEFAULT_LAYER,
                "configured map layer is unavailable"
            );
        }
        registry
    }

    /// Add a source, replacing any existing one with the same name.
    pub fn register(&mut self, source: TileSource) {
        match self
            .sources
            .iter_mut()
            .find(|existing| existing.name == source.name)
        {
            Some(existing) => *existing = source,
            None => self.sources.push(source),
        }
    }

    /// Sources usable right now, in registration order.
    pub fn available(&self) -> impl Iterator<Item = &TileSource> + '_ {
        self.sources.iter().filter(|source| self.is_unlocked(source))
    }

    /// Names of the usable sources.
    pub fn names(&self) -> Vec<&str> {
        self.available().map(|source| source.name.as_str()).collect()
    }

    /// Look up a usable source by name.
    pub fn get(&self, name: &str) -> Option<&TileSource> {
        self.sources
            .iter()
            .find(|source| source.name == name && self.is_unlocked(source))
    }

    /// Switch the current layer.
    pub fn select(&mut self, name: &str) -> Result<(), NavtileError> {
        if self.get(name).is_none() {
            return Err(NavtileError::LayerError(format!(
                "unknown or unavailable map layer '{name}'"
            )));
        }
        self.current = name.to_string();
        Ok(())
    }

    /// The selected source. When a later registration locks the selected
    /// layer behind a key, the first open layer takes over.
    pub fn current(&self) -> &TileSource {
        match self.get(&self.current) {
            Some(source) => source,
            None => self.available().next().unwrap_or(&BUILTIN_SOURCES[0]),
        }
    }

    /// Render the request URL for a tile on the current layer.
    pub fn tile_url(&self, tile: &TileId) -> Result<String, NavtileError> {
        self.current().tile_url(tile, self.api_key.as_deref())
    }

    fn is_unlocked(&self, source: &TileSource) -> bool {
        !source.requires_api_key || self.api_key.is_some()
    }
}

impl Default for LayerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyed_layers_are_hidden_without_a_key() {
        let registry = LayerRegistry::new();
        assert_eq!(registry.names(), vec![DEFAULT_LAYER]);
        assert_eq!(registry.current().name, DEFAULT_LAYER);
    }

    #[test]
    fn a_key_unlocks_the_bing_layers() {
        let registry = LayerRegistry::with_api_key("k3y");
        assert_eq!(registry.names().len(), 4);

        let mut registry = registry;
        registry.select("Bing Maps Aerial").unwrap();
        let url = registry.tile_url(&TileId::new("bing", 3, 3, 5)).unwrap();
        assert_eq!(
            url,
            "https://ecn.t0.tiles.virtualearth.net/tiles/a213.jpeg?g=1&key=k3y"
        );
    }

    #[test]
    fn selecting_a_locked_layer_fails() {
        let mut registry = LayerRegistry::new();
        let err = registry.select("Bing Maps Road");
        assert!(matches!(err, Err(NavtileError::LayerError(_))));
        assert_eq!(registry.current().name, DEFAULT_LAYER);
    }

    #[test]
    fn selecting_an_unknown_layer_fails() {
        let mut registry = LayerRegistry::new();
        assert!(registry.select("No Such Layer").is_err());
    }

    #[test]
    fn registering_a_source_with_an_existing_name_replaces_it() {
        let mut registry = LayerRegistry::new();
        let mut replacement = registry.get(DEFAULT_LAYER).unwrap().clone();
        replacement.max_zoom = 12;
        registry.register(replacement);

        assert_eq!(registry.get(DEFAULT_LAYER).unwrap().max_zoom, 12);
        assert_eq!(
            registry.available().filter(|s| s.name == DEFAULT_LAYER).count(),
            1
        );
    }

    #[test]
    fn from_config_registers_custom_layers_and_selects_one() {
        let custom = TileSource {
            name: "Topo".into(),
            url_template: "https://tiles.example.com/{z}/{x}/{y}.png".into(),
            subdomains: Vec::new(),
            max_zoom: 17,
            attribution: "example".into(),
            requires_api_key: false,
        };
        let config = MapConfig {
            layer: "Topo".into(),
            layers: vec![custom],
            ..MapConfig::default()
        };

        let registry = LayerRegistry::from_config(&config);
        assert_eq!(registry.current().name, "Topo");
        assert_eq!(registry.current().max_zoom, 17);
    }

    #[test]
    fn from_config_falls_back_when_the_layer_is_unknown() {
        let config = MapConfig {
            layer: "Missing".into(),
            ..MapConfig::default()
        };
        let registry = LayerRegistry::from_config(&config);
        assert_eq!(registry.current().name, DEFAULT_LAYER);
    }
}
