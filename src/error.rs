use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ScorerError {
    #[error("Process error: {0}")]
    Process(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("No results found at {0:?}. Run \"calculate\" first.")]
    ResultsNotFound(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}
