//! Error types for the ergonomic risk assessment system.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid score table for {region}: {reason}")]
    InvalidScoreTable { region: String, reason: String },

    #[error("Invalid action breakpoints: {0}")]
    InvalidBreakpoints(String),

    #[error("Malformed frame input at index {index}: {reason}")]
    MalformedFrame { index: u64, reason: String },

    #[error("Failed to persist result record: {0}")]
    Persistence(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unsupported input: {0}")]
    UnsupportedInput(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<csv::Error> for Error {
    fn from(e: csv::Error) -> Self {
        Error::Csv(e.to_string())
    }
}

impl Error {
    /// True for errors confined to a single input frame.
    ///
    /// The pipeline skips these and keeps going; anything else aborts the run.
    pub fn is_frame_local(&self) -> bool {
        matches!(self, Error::MalformedFrame { .. })
    }
}
