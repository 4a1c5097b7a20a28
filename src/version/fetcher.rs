//! Tag fetching for a watched image
//!
//! Wraps the registry with the image's include/exclude policy so callers
//! only ever see candidate tags.

use std::sync::Arc;

use tracing::debug;

use crate::version::error::FetchError;
use crate::version::registry::Registry;
use crate::version::types::WatchedImage;

#[derive(Clone)]
pub struct TagFetcher {
    registry: Arc<dyn Registry>,
}

impl TagFetcher {
    pub fn new(registry: Arc<dyn Registry>) -> Self {
        Self { registry }
    }

    /// Lists the image's tags and applies its filter.
    ///
    /// Registry failures are returned as-is, tagged with the image name.
    pub async fn fetch(&self, image: &WatchedImage) -> Result<Vec<String>, FetchError> {
        let tags = self
            .registry
            .list_tags(&image.name)
            .await
            .map_err(|source| FetchError {
                image: image.name.to_string(),
                source,
            })?;

        let candidates = image.filter.apply(&tags);
        debug!(
            "Kept {} of {} tags for {}",
            candidates.len(),
            tags.len(),
            image.name
        );

        Ok(candidates)
    }
}
