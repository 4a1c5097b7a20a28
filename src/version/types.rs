//! Types shared by the resolution pipeline

use std::collections::HashMap;
use std::collections::hash_map;

use crate::image::{ImageName, normalize_name};
use crate::version::filter::TagFilter;
use crate::version::semver::Version;

/// An image the operator wants update reports for
#[derive(Debug, Clone)]
pub struct WatchedImage {
    pub name: ImageName,
    pub filter: TagFilter,
}

impl WatchedImage {
    pub fn new(name: ImageName, filter: TagFilter) -> Self {
        Self { name, filter }
    }
}

/// Parsed versions per watched image, built once per run
#[derive(Debug, Clone, Default)]
pub struct VersionSet {
    versions: HashMap<ImageName, Vec<Version>>,
}

impl VersionSet {
    pub fn insert(&mut self, name: ImageName, versions: Vec<Version>) {
        self.versions.insert(name, versions);
    }

    /// Look up versions by canonical or raw image name.
    ///
    /// "nginx" and "docker.io/library/nginx" resolve to the same entry.
    pub fn get(&self, name: &str) -> Option<&[Version]> {
        if let Some(versions) = self.versions.get(name) {
            return Some(versions.as_slice());
        }
        let canonical = normalize_name(name).ok()?;
        self.versions.get(&canonical).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.versions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }

    pub fn iter(&self) -> hash_map::Iter<'_, ImageName, Vec<Version>> {
        self.versions.iter()
    }
}

impl FromIterator<(ImageName, Vec<Version>)> for VersionSet {
    fn from_iter<I: IntoIterator<Item = (ImageName, Vec<Version>)>>(iter: I) -> Self {
        Self {
            versions: iter.into_iter().collect(),
        }
    }
}
