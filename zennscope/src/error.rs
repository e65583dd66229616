use std::path::PathBuf;
use thiserror::Error;

/// Failure categories of the digest pipeline.
///
/// Only `InvalidArgument` is returned from `Summarizer::process_topic`; the other
/// variants are absorbed by the step that produced them and replaced with that
/// step's fallback value (empty list, empty text, placeholder summary, `false`).
#[derive(Error, Debug)]
pub enum DigestError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("fetch failed: {0}")]
    Fetch(String),

    #[error("summarization failed: {0}")]
    Summarization(String),

    #[error("could not write {path}: {source}")]
    Persistence {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("file already exists: {0}")]
    AlreadyExists(PathBuf),

    #[error("configuration error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for DigestError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            DigestError::Fetch(format!("request timed out: {}", err))
        } else {
            DigestError::Fetch(err.to_string())
        }
    }
}

pub type Result<T> = std::result::Result<T, DigestError>;
