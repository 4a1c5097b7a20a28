//! Container image reference parsing
//!
//! Watched images and running task images are compared by their canonical
//! name (`docker.io/library/nginx`), so every name entering the system goes
//! through [`normalize_name`] exactly once.

use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

/// Registry domain assumed when a reference does not name one
pub const DEFAULT_DOMAIN: &str = "docker.io";

/// Tag assumed when a running image reference carries neither tag nor digest
pub const DEFAULT_TAG: &str = "latest";

const LEGACY_DEFAULT_DOMAIN: &str = "index.docker.io";
const OFFICIAL_REPO_PREFIX: &str = "library/";

static PATH_COMPONENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9]+(?:(?:[._]|__|-+)[a-z0-9]+)*$").expect("path component pattern")
});

static TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9_][A-Za-z0-9_.-]{0,127}$").expect("tag pattern")
});

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImageError {
    #[error("image reference is empty")]
    Empty,

    #[error("repository name must be lowercase: {0}")]
    Uppercase(String),

    #[error("invalid repository path component {component:?} in {reference}")]
    InvalidComponent { reference: String, component: String },

    #[error("image name must not carry a tag or digest: {0}")]
    Qualified(String),

    #[error("image reference has a digest but no tag: {0}")]
    Untagged(String),

    #[error("invalid tag {0:?}")]
    InvalidTag(String),
}

/// Canonical `domain/repository` image name
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ImageName(String);

impl ImageName {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Registry host, including the port when there is one
    pub fn domain(&self) -> &str {
        self.split().0
    }

    /// Repository path within the registry (`library/nginx`)
    pub fn repository(&self) -> &str {
        self.split().1
    }

    fn split(&self) -> (&str, &str) {
        self.0
            .split_once('/')
            .unwrap_or((DEFAULT_DOMAIN, self.0.as_str()))
    }
}

impl fmt::Display for ImageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for ImageName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ImageName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for ImageName {
    type Err = ImageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        normalize_name(s)
    }
}

/// A running image: canonical name plus the tag it was started from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedImage {
    pub name: ImageName,
    pub tag: String,
}

impl fmt::Display for TaggedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.tag)
    }
}

impl FromStr for TaggedImage {
    type Err = ImageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_tagged(s)
    }
}

/// Normalize a bare image name into its canonical form.
///
/// Examples:
/// - "nginx" -> "docker.io/library/nginx"
/// - "grafana/loki" -> "docker.io/grafana/loki"
/// - "index.docker.io/nginx" -> "docker.io/library/nginx"
/// - "ghcr.io/owner/app" -> "ghcr.io/owner/app"
///
/// Names carrying a tag or digest are rejected.
pub fn normalize_name(raw: &str) -> Result<ImageName, ImageError> {
    if raw.is_empty() {
        return Err(ImageError::Empty);
    }
    if raw.contains('@') {
        return Err(ImageError::Qualified(raw.to_string()));
    }

    let (domain, remainder) = split_domain(raw);
    if remainder.contains(':') {
        return Err(ImageError::Qualified(raw.to_string()));
    }

    for component in remainder.split('/') {
        if component.chars().any(|c| c.is_ascii_uppercase()) {
            return Err(ImageError::Uppercase(raw.to_string()));
        }
        if !PATH_COMPONENT.is_match(component) {
            return Err(ImageError::InvalidComponent {
                reference: raw.to_string(),
                component: component.to_string(),
            });
        }
    }

    Ok(ImageName(format!("{domain}/{remainder}")))
}

/// Parse a running image reference such as `nginx:1.25` or
/// `ghcr.io/owner/app:v2@sha256:...`.
///
/// A reference without tag or digest runs `latest`. A digest-only reference
/// cannot be compared against registry tags and is rejected.
pub fn parse_tagged(raw: &str) -> Result<TaggedImage, ImageError> {
    if raw.is_empty() {
        return Err(ImageError::Empty);
    }

    let (named, digest) = match raw.split_once('@') {
        Some((named, digest)) => (named, Some(digest)),
        None => (raw, None),
    };

    let last_component = named.rfind('/').map_or(0, |i| i + 1);
    let (name, tag) = match named[last_component..].rfind(':') {
        Some(i) => {
            let split = last_component + i;
            (&named[..split], Some(&named[split + 1..]))
        }
        None => (named, None),
    };

    let tag = match (tag, digest) {
        (Some(tag), _) => tag,
        (None, Some(_)) => return Err(ImageError::Untagged(raw.to_string())),
        (None, None) => DEFAULT_TAG,
    };
    if !TAG.is_match(tag) {
        return Err(ImageError::InvalidTag(tag.to_string()));
    }

    Ok(TaggedImage {
        name: normalize_name(name)?,
        tag: tag.to_string(),
    })
}

fn split_domain(name: &str) -> (&str, String) {
    let (domain, remainder) = match name.split_once('/') {
        Some((first, rest)) if is_domain(first) => (first, rest),
        _ => (DEFAULT_DOMAIN, name),
    };

    let domain = if domain == LEGACY_DEFAULT_DOMAIN {
        DEFAULT_DOMAIN
    } else {
        domain
    };

    // Docker Hub official images live under library/
    let remainder = if domain == DEFAULT_DOMAIN && !remainder.contains('/') {
        format!("{OFFICIAL_REPO_PREFIX}{remainder}")
    } else {
        remainder.to_string()
    };

    (domain, remainder)
}

fn is_domain(component: &str) -> bool {
    component.contains('.') || component.contains(':') || component == "localhost"
}
