//! Registry test utilities

use std::collections::HashMap;

use async_trait::async_trait;

use tagwatch::image::{ImageName, normalize_name};
use tagwatch::version::error::RegistryError;
use tagwatch::version::registry::Registry;

/// In-memory registry keyed by canonical image name
#[derive(Default)]
pub struct MockRegistry {
    tags: HashMap<String, Vec<String>>,
    failures: HashMap<String, String>,
}

impl MockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tags(mut self, image: &str, tags: Vec<&str>) -> Self {
        self.tags.insert(
            canonical(image),
            tags.into_iter().map(|t| t.to_string()).collect(),
        );
        self
    }

    /// Listing this image fails with a transport-style error
    pub fn with_failure(mut self, image: &str, message: &str) -> Self {
        self.failures.insert(canonical(image), message.to_string());
        self
    }
}

fn canonical(image: &str) -> String {
    normalize_name(image).unwrap().to_string()
}

#[async_trait]
impl Registry for MockRegistry {
    async fn list_tags(&self, image: &ImageName) -> Result<Vec<String>, RegistryError> {
        if let Some(message) = self.failures.get(image.as_str()) {
            return Err(RegistryError::InvalidResponse(message.clone()));
        }
        match self.tags.get(image.as_str()) {
            Some(tags) => Ok(tags.clone()),
            None => Err(RegistryError::NotFound(image.to_string())),
        }
    }
}
