use serde::{Deserialize, Serialize};

/// Normalized content entry from the upstream catalog. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: u64,
    #[serde(alias = "name")]
    pub title: String,
    #[serde(rename = "media_type", default)]
    pub media_kind: MediaKind,
    /// Everything else the catalog sent (poster path, overview, ...). Not interpreted.
    #[serde(flatten)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

impl ContentItem {
    pub fn new(id: u64, title: &str, media_kind: MediaKind) -> Self {
        Self {
            id,
            title: title.to_string(),
            media_kind,
            metadata: serde_json::Map::new(),
        }
    }

    pub fn key(&self) -> ItemKey {
        ItemKey::new(self.id, self.media_kind)
    }
}

/// Identity of an item in a row. Movie and TV ids come from separate id spaces,
/// so the id alone is not enough.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ItemKey {
    pub id: u64,
    pub kind: MediaKind,
}

impl ItemKey {
    pub fn new(id: u64, kind: MediaKind) -> Self {
        Self { id, kind }
    }

    pub fn movie(id: u64) -> Self {
        Self::new(id, MediaKind::Movie)
    }

    pub fn series(id: u64) -> Self {
        Self::new(id, MediaKind::Series)
    }
}

impl std::fmt::Display for ItemKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.kind.query_value(), self.id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MediaKind {
    #[default]
    #[serde(rename = "movie")]
    Movie,
    #[serde(rename = "tv", alias = "series")]
    Series,
}

impl MediaKind {
    /// Value of the `media_type` query parameter on the details endpoint.
    pub fn query_value(self) -> &'static str {
        match self {
            MediaKind::Movie => "movie",
            MediaKind::Series => "tv",
        }
    }
}

// ── Details endpoint response ────────────────────────────────────────

/// Subset of `/api/movies/details/{id}` the loader cares about.
#[derive(Debug, Default, Deserialize)]
pub struct ContentDetails {
    #[serde(default)]
    pub videos: Option<VideoList>,
}

#[derive(Debug, Default, Deserialize)]
pub struct VideoList {
    #[serde(default)]
    pub results: Vec<Video>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Video {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub site: String,
    #[serde(default)]
    pub key: String,
}

impl ContentDetails {
    pub fn videos(&self) -> &[Video] {
        self.videos.as_ref().map_or(&[], |v| v.results.as_slice())
    }
}
