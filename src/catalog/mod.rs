pub mod details_api;
pub mod types;

use crate::error::LookupError;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::Path;
use types::{ContentDetails, ContentItem};

/// Anything that can answer "what are the details (and videos) for this item".
#[async_trait]
pub trait DetailsSource: Send + Sync {
    async fn fetch_details(&self, item: &ContentItem) -> Result<ContentDetails, LookupError>;
}

/// Read the row's source list: a JSON array of catalog items, in display order.
pub fn load_items(path: &Path) -> Result<Vec<ContentItem>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read items file: {}", path.display()))?;
    let items: Vec<ContentItem> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse items file: {}", path.display()))?;
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_sample_items() {
        let items = load_items(Path::new("items.json")).unwrap();
        assert!(!items.is_empty());
        assert!(items.iter().all(|i| !i.title.is_empty()));
    }

    #[test]
    fn test_load_missing_file_errors() {
        let err = load_items(Path::new("does-not-exist.json")).unwrap_err();
        assert!(format!("{:#}", err).contains("does-not-exist.json"));
    }
}
