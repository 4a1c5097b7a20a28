use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Rate limited: retry after {retry_after_secs:?} seconds")]
    RateLimited { retry_after_secs: Option<u64> },

    #[error("Repository not found: {0}")]
    NotFound(String),

    #[error("Unauthorized to pull {0}")]
    Unauthorized(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// A tag that could not be interpreted as a version
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{tag:?} is not a valid version: {reason}")]
pub struct ParseError {
    pub tag: String,
    pub reason: String,
}

/// Listing tags for one watched image failed
#[derive(Debug, Error)]
#[error("couldn't fetch tags for {image}: {source}")]
pub struct FetchError {
    pub image: String,
    #[source]
    pub source: RegistryError,
}

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("couldn't parse image tag version for {image}: {source}")]
    Parse {
        image: String,
        #[source]
        source: ParseError,
    },

    #[error("resolution task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("missing resolution result for {0}")]
    MissingResult(String),
}
