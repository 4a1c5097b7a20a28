//! Registry trait for listing the tags of an image repository

#[cfg(test)]
use mockall::automock;

use crate::image::ImageName;
use crate::version::error::RegistryError;

/// Trait for listing tags from a container registry
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait Registry: Send + Sync {
    /// Lists every tag of a repository
    ///
    /// # Arguments
    /// * `image` - Canonical image name (e.g., "docker.io/library/nginx")
    ///
    /// # Returns
    /// * `Ok(Vec<String>)` - Tags in the order the registry returned them
    /// * `Err(RegistryError)` - If the listing fails
    async fn list_tags(&self, image: &ImageName) -> Result<Vec<String>, RegistryError>;
}
