use std::path::{Path, PathBuf};
use std::time::Duration;

use regex::Regex;
use serde::Deserialize;
use thiserror::Error;

use crate::image::{ImageError, normalize_name};
use crate::version::filter::TagFilter;
use crate::version::types::WatchedImage;

// =============================================================================
// Defaults
// =============================================================================

/// Config file read when no path is given
pub const DEFAULT_CONFIG_PATH: &str = "./config.toml";

/// Nomad agent address used when the config does not set `server`
pub const DEFAULT_NOMAD_ADDR: &str = "http://127.0.0.1:4646";

/// Namespace value selecting every namespace
pub const ALL_NAMESPACES: &str = "*";

/// Timeout for a single HTTP request in seconds
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

pub const DEFAULT_USER_AGENT: &str = concat!("tagwatch/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid image name {name:?}: {source}")]
    ImageName {
        name: String,
        #[source]
        source: ImageError,
    },

    #[error("invalid {kind} pattern {pattern:?} for image {image}: {source}")]
    Pattern {
        image: String,
        kind: &'static str,
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Config file layout
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct RawConfig {
    pub server: Option<String>,
    pub token: Option<String>,
    pub namespaces: Vec<String>,
    pub images: Vec<RawWatchedImage>,
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct RawWatchedImage {
    pub name: String,
    #[serde(default)]
    pub include: Vec<String>,
    #[serde(default)]
    pub exclude: Vec<String>,
}

/// Settings shared by the registry and Nomad HTTP clients
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl HttpConfig {
    pub fn build_client(&self) -> reqwest::Result<reqwest::Client> {
        reqwest::Client::builder()
            .user_agent(self.user_agent.as_str())
            .timeout(Duration::from_secs(self.timeout_secs))
            .build()
    }
}

/// Validated configuration: names normalized, patterns compiled
#[derive(Debug, Clone)]
pub struct Config {
    pub server: String,
    pub token: Option<String>,
    pub namespaces: Vec<String>,
    pub images: Vec<WatchedImage>,
    pub http: HttpConfig,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = toml::from_str(content)?;
        Self::try_from(raw)
    }
}

impl TryFrom<RawConfig> for Config {
    type Error = ConfigError;

    fn try_from(raw: RawConfig) -> Result<Self, Self::Error> {
        let images = raw
            .images
            .iter()
            .map(watched_image)
            .collect::<Result<Vec<_>, _>>()?;

        let namespaces = if raw.namespaces.is_empty() {
            vec![ALL_NAMESPACES.to_string()]
        } else {
            raw.namespaces
        };

        Ok(Self {
            server: raw
                .server
                .unwrap_or_else(|| DEFAULT_NOMAD_ADDR.to_string()),
            token: raw.token,
            namespaces,
            images,
            http: raw.http,
        })
    }
}

fn watched_image(raw: &RawWatchedImage) -> Result<WatchedImage, ConfigError> {
    let name = normalize_name(&raw.name).map_err(|source| ConfigError::ImageName {
        name: raw.name.clone(),
        source,
    })?;

    let compile = |kind: &'static str, patterns: &[String]| {
        patterns
            .iter()
            .map(|pattern| {
                Regex::new(pattern).map_err(|source| ConfigError::Pattern {
                    image: raw.name.clone(),
                    kind,
                    pattern: pattern.clone(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()
    };

    let include = compile("include", &raw.include)?;
    let exclude = compile("exclude", &raw.exclude)?;

    Ok(WatchedImage::new(name, TagFilter::new(include, exclude)))
}
