//! Error types for summary construction, add-ons and queries.

use thiserror::Error;

use crate::classify::VariableKind;
use statgrid_render::RenderError;

/// Errors raised by `statgrid`.
///
/// Every domain error is raised by the call that introduces the problem.
/// Rendering only re-executes validated render calls, so the only error it
/// can surface is [`StatgridError::Render`].
#[derive(Debug, Error)]
pub enum StatgridError {
    /// A kind override (or declared kind) does not fit the observed data.
    #[error("variable '{variable}' cannot be summarized as {kind}: {reason}")]
    InvalidKind {
        variable: String,
        kind: VariableKind,
        reason: String,
    },

    /// A template references a statistic that does not exist for the
    /// variable's kind.
    #[error("unknown placeholder '{{{placeholder}}}' for '{variable}'")]
    UnknownPlaceholder {
        placeholder: String,
        variable: String,
    },

    /// A template could not be parsed.
    #[error("invalid template '{template}': {reason}")]
    InvalidTemplate { template: String, reason: String },

    /// A comparison was requested on a table with fewer than two groups.
    #[error("comparison needs at least 2 groups, found {found}")]
    InsufficientGroups { found: usize },

    /// A positional insert named an anchor call that is not in the pipeline.
    #[error("render call '{0}' not found in pipeline")]
    UnknownAnchor(String),

    /// No variable (or dataset column) with this name.
    #[error("variable '{0}' not found")]
    VariableNotFound(String),

    /// The variable exists but has no such level, or takes no level.
    #[error("level '{level}' not found for variable '{variable}'")]
    LevelNotFound { variable: String, level: String },

    /// No column with this id, group level, or alias.
    #[error("column '{0}' not found")]
    ColumnNotFound(String),

    /// A render call addresses a body row that does not exist.
    #[error("row {row} out of range, the table has {rows} rows")]
    RowOutOfRange { row: usize, rows: usize },

    /// The dataset has no rows, no columns, or nothing left to summarize.
    #[error("empty dataset: {0}")]
    EmptyDataset(String),

    /// A test override cannot be applied to this variable.
    #[error("test '{test}' cannot be used for '{variable}': {reason}")]
    IncompatibleTest {
        test: &'static str,
        variable: String,
        reason: String,
    },

    /// An add-on needs `add_comparison` to have run first.
    #[error("{0} requires a prior add_comparison")]
    MissingComparison(&'static str),

    /// Columns of a dataset differ in length.
    #[error("column '{column}' has {actual} values, expected {expected}")]
    LengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },

    /// Two dataset columns share a name.
    #[error("duplicate column '{0}'")]
    DuplicateColumn(String),

    /// Options could not be loaded or are inconsistent.
    #[error("configuration error: {0}")]
    Config(String),

    /// The rendering backend failed.
    #[error(transparent)]
    Render(#[from] RenderError),

    /// I/O error (e.g., reading an options file).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_yaml::Error> for StatgridError {
    fn from(err: serde_yaml::Error) -> Self {
        StatgridError::Config(err.to_string())
    }
}

/// Result type for `statgrid` operations.
pub type Result<T> = std::result::Result<T, StatgridError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_placeholder_shows_braces() {
        let err = StatgridError::UnknownPlaceholder {
            placeholder: "mean".into(),
            variable: "grade".into(),
        };
        assert_eq!(err.to_string(), "unknown placeholder '{mean}' for 'grade'");
    }

    #[test]
    fn invalid_kind_names_kind() {
        let err = StatgridError::InvalidKind {
            variable: "age".into(),
            kind: VariableKind::Categorical,
            reason: "non-integer values".into(),
        };
        assert!(err.to_string().contains("as categorical"));
    }

    #[test]
    fn render_errors_pass_through() {
        let err: StatgridError = RenderError::UnknownColumn("stat_9".into()).into();
        assert_eq!(err.to_string(), "unknown column 'stat_9'");
    }

    #[test]
    fn yaml_errors_become_config() {
        let yaml_err = serde_yaml::from_str::<u32>("[1, 2").unwrap_err();
        let err: StatgridError = yaml_err.into();
        assert!(matches!(err, StatgridError::Config(_)));
    }
}
