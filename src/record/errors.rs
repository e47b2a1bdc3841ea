use thiserror::Error;

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("Invalid report pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Invalid score: {0}")]
    InvalidScore(String),

    #[error("Invalid result rows: {0}")]
    InvalidRows(String),
}
