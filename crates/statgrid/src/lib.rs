//! # Statgrid - Publication-Style Summary Tables
//!
//! Statgrid turns a column-oriented dataset into the descriptive summary
//! table found at the top of most clinical and survey reports: one block of
//! rows per variable, one column per group, formatted statistics in every
//! cell, and optional comparison tests.
//!
//! Statistics are computed and formatted once, when the summary is built.
//! Everything presentational (labels, alignment, indentation, emphasis,
//! footnotes) is recorded as named render calls and only executed against a
//! rendering backend at output time, so callers can omit any of them by name.
//!
//! ## Core Concepts
//!
//! - [`Dataset`]: Named, equal-length columns of numeric, text, factor, or
//!   boolean values
//! - [`VariableKind`]: Continuous, categorical, or dichotomous, inferred from
//!   each column unless declared
//! - [`Template`]: A statistic-format string such as `{mean} ({sd})`
//! - [`Summary`]: The built table ([`TableBody`]), its [`MetaData`], and the
//!   [`RenderPipeline`] of deferred [`RenderCall`]s
//! - [`ComparisonOptions`]: Test selection, p-value formatting and
//!   multiplicity adjustment for [`Summary::add_comparison`]
//! - [`RenderOptions`]: Omitted calls, output mode, border, and theme
//!
//! ## Quick Start
//!
//! ```rust
//! use statgrid::{build_summary, inline_text, ComparisonOptions, Dataset, RenderOptions, SummaryOptions};
//!
//! let data = Dataset::builder()
//!     .text("trt", ["Drug A", "Drug A", "Drug A", "Drug B", "Drug B", "Drug B"])
//!     .numeric("age", [41.5, 52.0, 47.5, 60.0, 58.5, 63.0])
//!     .text("grade", ["I", "II", "I", "III", "II", "III"])
//!     .build()
//!     .unwrap();
//!
//! let options = SummaryOptions::new()
//!     .group_by("trt")
//!     .label("age", "Age")
//!     .statistic("age", "{mean} ({sd})");
//!
//! let summary = build_summary(&data, &options)
//!     .unwrap()
//!     .add_overall()
//!     .add_comparison(ComparisonOptions::default())
//!     .unwrap()
//!     .bold_labels();
//!
//! assert_eq!(inline_text(&summary, "grade", Some("I"), "Drug A").unwrap(), "2 (67%)");
//!
//! let text = summary
//!     .render_text(&RenderOptions::new().omit("footnote_test"))
//!     .unwrap();
//! assert!(text.contains("Overall, N = 6"));
//! ```
//!
//! ## Configuration
//!
//! [`SummaryOptions`] and [`ComparisonOptions`] deserialize from YAML, and
//! unknown keys are rejected:
//!
//! ```rust
//! use statgrid::SummaryOptions;
//!
//! let options = SummaryOptions::from_yaml(
//!     "group_by: trt\nlabels:\n  age: Age\nmissing_policy: hide\n",
//! ).unwrap();
//! assert_eq!(options.group_by.as_deref(), Some("trt"));
//! ```
//!
//! ## Logging
//!
//! Statgrid emits [`tracing`] events: construction and comparisons at
//! `debug`, test fallbacks at `warn`, and each executed render call at
//! `trace`. Install any subscriber to see them.

pub mod classify;
pub mod compare;
pub mod dataset;
mod error;
pub mod options;
pub mod partition;
pub mod pipeline;
pub mod stats;
pub mod summary;
pub mod table;
pub mod template;

pub use classify::{classify, Classified, ClassifyOptions, VariableKind};
pub use compare::{adjust, AdjustMethod, ComparisonOptions, PvalueStyle, TestKind, TestOutcome};
pub use dataset::{Column, ColumnData, Dataset, DatasetBuilder};
pub use error::{Result, StatgridError};
pub use options::{DefaultStatistics, MissingPolicy, OverallPosition, SummaryOptions};
pub use partition::GroupPartition;
pub use pipeline::{RenderCall, RenderPipeline};
pub use stats::{Stat, StatisticBundle};
pub use summary::{build_summary, inline_text, render, RenderOptions, StatLabelLocation, Summary};
pub use table::{
    ColumnRole, MetaData, RowType, TableBody, TableColumn, TableRow, VariableMeta, VariableSpec,
};
pub use template::{Digits, Rounding, Template};

// Rendering layer
pub use statgrid_render::{
    Align, Backend, BorderStyle, Directive, Emphasis, Grid, GridBackend, GridSource, OutputMode,
    OutputOptions, Region, RenderError, Theme,
};
