use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use serde::de::DeserializeOwned;

use super::types::{BrandConfig, ChunkingConfig, PlatformConfig, PlatformInfo, StyleConfig};

/// Lookup capability the planner depends on. A miss is never an error.
pub trait PlatformResolver: Send + Sync {
    fn resolve_platform(&self, name: &str) -> Option<PlatformInfo>;
}

/// Layered store of named definitions: built-in platforms, then user files.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    platforms: BTreeMap<String, PlatformConfig>,
    brands: BTreeMap<String, BrandConfig>,
    styles: BTreeMap<String, StyleConfig>,
}

impl Catalog {
    /// Platforms every installation knows about.
    pub fn builtin() -> Self {
        let mut platforms = BTreeMap::new();
        let mut add = |name: &str, cfg: PlatformConfig| {
            platforms.insert(name.to_string(), cfg);
        };

        add("youtube", PlatformConfig::new("YouTube", "16:9"));
        add("twitter", PlatformConfig::new("X / Twitter", "16:9"));
        add("linkedin", PlatformConfig::new("LinkedIn", "1:1"));
        add("instagram", PlatformConfig::new("Instagram Reels", "9:16"));
        add("shorts", PlatformConfig::new("YouTube Shorts", "9:16"));
        let mut tiktok = PlatformConfig::new("TikTok", "9:16");
        tiktok.chunking = Some(ChunkingConfig {
            enabled: true,
            overlap_seconds: Some(2.0),
        });
        add("tiktok", tiktok);

        Self {
            platforms,
            ..Self::default()
        }
    }

    /// Built-in defaults overlaid with the definitions found under `config_dir`.
    ///
    /// Missing directories and malformed files are skipped with a warning.
    pub fn load(config_dir: &Path) -> Self {
        let mut catalog = Self::builtin();
        catalog
            .platforms
            .extend(load_definitions::<PlatformConfig>(&config_dir.join("platforms")));
        catalog
            .brands
            .extend(load_definitions::<BrandConfig>(&config_dir.join("brands")));
        catalog
            .styles
            .extend(load_definitions::<StyleConfig>(&config_dir.join("styles")));

        tracing::debug!(
            platforms = catalog.platforms.len(),
            brands = catalog.brands.len(),
            styles = catalog.styles.len(),
            dir = %config_dir.display(),
            "catalog loaded"
        );
        catalog
    }

    pub fn with_platform(mut self, name: &str, cfg: PlatformConfig) -> Self {
        self.platforms.insert(name.to_string(), cfg);
        self
    }

    pub fn platform(&self, name: &str) -> Option<&PlatformConfig> {
        self.platforms.get(name)
    }

    pub fn brand(&self, name: &str) -> Option<&BrandConfig> {
        self.brands.get(name)
    }

    pub fn style(&self, name: &str) -> Option<&StyleConfig> {
        self.styles.get(name)
    }

    pub fn platforms(&self) -> impl Iterator<Item = (&str, &PlatformConfig)> {
        self.platforms.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn brands(&self) -> impl Iterator<Item = (&str, &BrandConfig)> {
        self.brands.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn styles(&self) -> impl Iterator<Item = (&str, &StyleConfig)> {
        self.styles.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl PlatformResolver for Catalog {
    fn resolve_platform(&self, name: &str) -> Option<PlatformInfo> {
        self.platform(name).map(PlatformConfig::info)
    }
}

/// Plain name -> platform map, handy for fixtures.
#[derive(Debug, Clone, Default)]
pub struct FixedPlatforms(HashMap<String, PlatformInfo>);

impl FixedPlatforms {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, aspect_ratio: &str) -> Self {
        self.0.insert(
            name.to_string(),
            PlatformInfo {
                aspect_ratio: aspect_ratio.to_string(),
                chunking_enabled: false,
            },
        );
        self
    }
}

impl PlatformResolver for FixedPlatforms {
    fn resolve_platform(&self, name: &str) -> Option<PlatformInfo> {
        self.0.get(name).cloned()
    }
}

/// Read every `*.toml` in `dir`; each file is a table of named entries.
fn load_definitions<T: DeserializeOwned>(dir: &Path) -> BTreeMap<String, T> {
    let mut out = BTreeMap::new();
    if !dir.is_dir() {
        return out;
    }

    let pattern = dir.join("*.toml").to_string_lossy().to_string();
    let paths = match glob::glob(&pattern) {
        Ok(paths) => paths,
        Err(e) => {
            tracing::warn!(pattern = %pattern, error = %e, "invalid catalog glob");
            return out;
        }
    };

    for path in paths.flatten() {
        let content = match std::fs::read_to_string(&path) {
            Ok(s) => s,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "skipping unreadable catalog file");
                continue;
            }
        };
        let table: BTreeMap<String, toml::Value> = match toml::from_str(&content) {
            Ok(t) => t,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "skipping malformed catalog file");
                continue;
            }
        };

        for (name, value) in table {
            if name == "_template" || !value.is_table() {
                continue;
            }
            match value.try_into::<T>() {
                Ok(entry) => {
                    out.insert(name, entry);
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), entry = %name, error = %e, "skipping invalid catalog entry");
                }
            }
        }
    }

    out
}
