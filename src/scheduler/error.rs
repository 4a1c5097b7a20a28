use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Permission denied listing {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}
