//! Concurrent version resolution for all watched images
//!
//! One task per watched image fetches, filters and parses its tags. Each task
//! returns its result into its own slot; slots are merged after the group
//! finishes. The first failure aborts every sibling task and is returned,
//! so callers never observe a partial [`VersionSet`].

use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::{debug, info};

use crate::version::error::ResolveError;
use crate::version::fetcher::TagFetcher;
use crate::version::registry::Registry;
use crate::version::semver::Version;
use crate::version::types::{VersionSet, WatchedImage};

pub struct VersionResolver {
    fetcher: TagFetcher,
}

impl VersionResolver {
    pub fn new(registry: Arc<dyn Registry>) -> Self {
        Self {
            fetcher: TagFetcher::new(registry),
        }
    }

    /// Resolve the parsed versions of every watched image.
    ///
    /// Fails with the first error any image reports, in completion order.
    /// A tag that passes the filter but is not a version fails the run.
    pub async fn resolve(&self, images: &[WatchedImage]) -> Result<VersionSet, ResolveError> {
        let mut join_set = JoinSet::new();
        for (idx, image) in images.iter().cloned().enumerate() {
            let fetcher = self.fetcher.clone();
            join_set.spawn(async move {
                let versions = resolve_image(&fetcher, &image).await?;
                Ok::<(usize, Vec<Version>), ResolveError>((idx, versions))
            });
        }

        let mut slots: Vec<Option<Vec<Version>>> = std::iter::repeat_with(|| None)
            .take(images.len())
            .collect();
        while let Some(joined) = join_set.join_next().await {
            match joined.map_err(ResolveError::from).and_then(|result| result) {
                Ok((idx, versions)) => slots[idx] = Some(versions),
                Err(e) => {
                    join_set.abort_all();
                    return Err(e);
                }
            }
        }

        let mut resolved = VersionSet::default();
        for (image, slot) in images.iter().zip(slots) {
            let versions =
                slot.ok_or_else(|| ResolveError::MissingResult(image.name.to_string()))?;
            resolved.insert(image.name.clone(), versions);
        }

        info!("Resolved versions for {} images", resolved.len());
        Ok(resolved)
    }
}

async fn resolve_image(
    fetcher: &TagFetcher,
    image: &WatchedImage,
) -> Result<Vec<Version>, ResolveError> {
    let tags = fetcher.fetch(image).await?;

    let versions = tags
        .iter()
        .map(|tag| {
            Version::parse(tag).map_err(|source| ResolveError::Parse {
                image: image.name.to_string(),
                source,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    debug!("Parsed {} versions for {}", versions.len(), image.name);
    Ok(versions)
}
