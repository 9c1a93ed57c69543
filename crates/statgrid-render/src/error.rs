//! Error types for grid rendering.

use thiserror::Error;

/// Errors raised while building or writing a [`Grid`](crate::Grid).
///
/// Directives are validated by the producer before they reach a backend, so
/// in practice these surface only for hand-built directive lists, theme files
/// and serialization failures.
#[derive(Debug, Error)]
pub enum RenderError {
    /// A directive addressed a column id that the grid does not have.
    #[error("unknown column '{0}'")]
    UnknownColumn(String),

    /// A directive addressed a body row past the end of the grid.
    #[error("row {row} out of range (grid has {rows} rows)")]
    RowOutOfRange { row: usize, rows: usize },

    /// A directive was applied before the backend was bootstrapped.
    #[error("backend received a directive before bootstrap")]
    NotBootstrapped,

    /// Theme definition could not be parsed.
    #[error("theme error: {0}")]
    Theme(String),

    /// CSV or JSON serialization failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// I/O error (e.g., reading a theme file).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for RenderError {
    fn from(err: serde_json::Error) -> Self {
        RenderError::Serialization(err.to_string())
    }
}

impl From<csv::Error> for RenderError {
    fn from(err: csv::Error) -> Self {
        RenderError::Serialization(err.to_string())
    }
}

impl From<csv::IntoInnerError<csv::Writer<Vec<u8>>>> for RenderError {
    fn from(err: csv::IntoInnerError<csv::Writer<Vec<u8>>>) -> Self {
        RenderError::Serialization(err.to_string())
    }
}

impl From<std::string::FromUtf8Error> for RenderError {
    fn from(err: std::string::FromUtf8Error) -> Self {
        RenderError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for RenderError {
    fn from(err: serde_yaml::Error) -> Self {
        RenderError::Theme(err.to_string())
    }
}

/// Result type for rendering operations.
pub type Result<T> = std::result::Result<T, RenderError>;
