//! Bundled default styles, copied once into a process-lifetime cache

use once_cell::sync::{Lazy, OnceCell};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Compiled-in (url, name) pairs, in presentation order
pub const DEFAULT_STYLE_SOURCE: &[(&str, &str)] = &[
    ("mapbox://styles/mapbox/streets-v10", "Streets"),
    ("mapbox://styles/mapbox/outdoors-v10", "Outdoors"),
    ("mapbox://styles/mapbox/light-v9", "Light"),
    ("mapbox://styles/mapbox/dark-v9", "Dark"),
    ("mapbox://styles/mapbox/satellite-v9", "Satellite"),
    ("mapbox://styles/mapbox/satellite-streets-v10", "Satellite Streets"),
];

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StyleCatalogEntry {
    pub url: String,
    pub name: String,
}

impl StyleCatalogEntry {
    pub fn new(url: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            name: name.into(),
        }
    }
}

/// Lazily populated list of bundled styles
///
/// The first call to [`entries`](Self::entries) copies the source list; racing
/// first callers block until that single copy finishes and then share it.
#[derive(Debug)]
pub struct StyleCatalog {
    source: &'static [(&'static str, &'static str)],
    entries: OnceCell<Vec<StyleCatalogEntry>>,
    populations: AtomicUsize,
}

impl StyleCatalog {
    pub const fn new(source: &'static [(&'static str, &'static str)]) -> Self {
        Self {
            source,
            entries: OnceCell::new(),
            populations: AtomicUsize::new(0),
        }
    }

    pub fn entries(&self) -> &[StyleCatalogEntry] {
        self.entries.get_or_init(|| {
            self.populations.fetch_add(1, Ordering::Relaxed);
            if self.source.is_empty() {
                log::debug!("no bundled default styles");
            }
            self.source
                .iter()
                .map(|(url, name)| StyleCatalogEntry::new(*url, *name))
                .collect()
        })
    }

    pub fn is_populated(&self) -> bool {
        self.entries.get().is_some()
    }

    /// How many times the cache was filled; 0 or 1 for the catalog's lifetime
    pub fn population_count(&self) -> usize {
        self.populations.load(Ordering::Relaxed)
    }

    pub fn find_by_name(&self, name: &str) -> Option<&StyleCatalogEntry> {
        self.entries().iter().find(|entry| entry.name == name)
    }

    pub fn find_by_url(&self, url: &str) -> Option<&StyleCatalogEntry> {
        self.entries().iter().find(|entry| entry.url == url)
    }
}

impl Default for StyleCatalog {
    fn default() -> Self {
        Self::new(DEFAULT_STYLE_SOURCE)
    }
}

static DEFAULT_STYLES: Lazy<StyleCatalog> = Lazy::new(StyleCatalog::default);

/// The process-wide catalog of bundled styles
pub fn default_styles() -> &'static [StyleCatalogEntry] {
    DEFAULT_STYLES.entries()
}
