use thiserror::Error;

pub type Result<T> = std::result::Result<T, GitCountError>;

#[derive(Error, Debug)]
pub enum GitCountError {
    #[error("Input unavailable: {0}")]
    InputUnavailable(String),
    #[error("Unsupported output mode: '{0}' (expected text, json, csv or svg)")]
    UnsupportedOutputMode(String),
    #[error("Invalid date: {0}")]
    InvalidDate(String),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Config error: {0}")]
    Config(String),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Format error: {0}")]
    Fmt(#[from] std::fmt::Error),
}

impl From<csv::IntoInnerError<csv::Writer<Vec<u8>>>> for GitCountError {
    fn from(err: csv::IntoInnerError<csv::Writer<Vec<u8>>>) -> Self {
        GitCountError::Io(err.into_error())
    }
}
