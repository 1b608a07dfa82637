use crate::catalog::types::{ContentDetails, Video};

const TRAILER_TYPE: &str = "Trailer";
const TRAILER_SITE: &str = "YouTube";

/// Opaque YouTube video key; enough to build a playback URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrailerRef(String);

impl TrailerRef {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn key(&self) -> &str {
        &self.0
    }

    pub fn watch_url(&self) -> String {
        format!("https://www.youtube.com/watch?v={}", self.0)
    }

    pub fn embed_url(&self) -> String {
        format!("https://www.youtube.com/embed/{}", self.0)
    }
}

fn is_trailer(v: &Video) -> bool {
    v.kind == TRAILER_TYPE && v.site == TRAILER_SITE && !v.key.is_empty()
}

/// First YouTube trailer in the details' video list, if any.
pub fn find_trailer(details: &ContentDetails) -> Option<TrailerRef> {
    details
        .videos()
        .iter()
        .find(|v| is_trailer(v))
        .map(|v| TrailerRef::new(v.key.clone()))
}
