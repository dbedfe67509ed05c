//! Error types for telex-tracker.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("telex not found: {0}")]
    NotFound(i64),

    #[error("invalid track kind: {0:?} (expected \"widebody\" or \"narrowbody\")")]
    InvalidTrackKind(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("template error: {0}")]
    Template(#[from] minijinja::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, Error>;
