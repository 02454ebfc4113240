use crate::core::geo::TileCoord;
use crate::tiles::prefetch::ZoomRange;

/// Anything that can produce tile URLs for a given coordinate
pub trait TileSource: Send + Sync {
    /// Build a URL for the requested `coord`.
    fn url(&self, coord: TileCoord) -> String;

    /// Zoom levels the source serves
    fn zoom_range(&self) -> ZoomRange {
        ZoomRange::default()
    }
}

/// URL template with `{s}`, `{z}`, `{x}`, `{y}` and optional `{r}` placeholders
#[derive(Debug, Clone)]
pub struct UrlTemplate {
    template: String,
    subdomains: Vec<String>,
    zoom_range: ZoomRange,
    retina_suffix: Option<String>,
}

impl UrlTemplate {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            subdomains: Vec::new(),
            zoom_range: ZoomRange::default(),
            retina_suffix: None,
        }
    }

    /// The public OpenStreetMap raster tiles
    pub fn openstreetmap() -> Self {
        Self::new("https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png")
            .with_subdomains(["a", "b", "c"])
            .with_zoom_range(ZoomRange::new(0, 19))
    }

    pub fn with_subdomains<I, S>(mut self, subdomains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.subdomains = subdomains.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_zoom_range(mut self, zoom_range: ZoomRange) -> Self {
        self.zoom_range = zoom_range;
        self
    }

    /// Substituted for `{r}` when the template is expanded for a high-density display
    pub fn with_retina_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.retina_suffix = Some(suffix.into());
        self
    }

    /// URL for `coord` at the given device pixel ratio
    pub fn url_for_ratio(&self, coord: TileCoord, pixel_ratio: f32) -> String {
        let retina = match &self.retina_suffix {
            Some(suffix) if pixel_ratio > 1.0 => suffix.as_str(),
            _ => "",
        };
        let subdomain = if self.subdomains.is_empty() {
            ""
        } else {
            let idx = ((coord.x as u64 + coord.y as u64) % self.subdomains.len() as u64) as usize;
            self.subdomains[idx].as_str()
        };

        self.template
            .replace("{s}", subdomain)
            .replace("{z}", &coord.z.to_string())
            .replace("{x}", &coord.x.to_string())
            .replace("{y}", &coord.y.to_string())
            .replace("{r}", retina)
    }
}

impl TileSource for UrlTemplate {
    fn url(&self, coord: TileCoord) -> String {
        self.url_for_ratio(coord, 1.0)
    }

    fn zoom_range(&self) -> ZoomRange {
        self.zoom_range
    }
}
