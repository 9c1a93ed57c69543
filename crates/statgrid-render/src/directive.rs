//! Rendering directives.
//!
//! A [`Directive`] is one presentational instruction for a backend: relabel
//! columns, indent rows, embolden cells, add a footnote. Directives are plain
//! data so producers can store, reorder, and filter them before anything is
//! drawn.

use serde::{Deserialize, Serialize};

/// Text alignment within a column.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    /// Left-align text (pad on the right).
    #[default]
    Left,
    /// Right-align text (pad on the left).
    Right,
    /// Center text (pad on both sides).
    Center,
}

/// Cell emphasis. Each variant maps to a theme style of the same name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emphasis {
    Bold,
    Italic,
}

impl Emphasis {
    /// Theme style name used for this emphasis.
    pub fn style_name(&self) -> &'static str {
        match self {
            Emphasis::Bold => "bold",
            Emphasis::Italic => "italic",
        }
    }
}

/// The part of the table a directive affects.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Region {
    /// Column header cells.
    Header,
    /// Whole columns (layout, visibility).
    Columns,
    /// Body cells.
    Body,
    /// Spanning headers above the column headers.
    Spanner,
    /// Notes printed below the table.
    Footer,
    /// Title printed above the table.
    Caption,
}

/// A presentational instruction applied to a bootstrapped grid.
///
/// Column references are column ids, row references are zero-based body row
/// indices.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "directive", rename_all = "snake_case")]
pub enum Directive {
    /// Set header text for columns, as `(column id, label)` pairs.
    LabelColumns { labels: Vec<(String, String)> },
    /// Set alignment for columns.
    AlignColumns { columns: Vec<String>, align: Align },
    /// Hide columns from every output mode.
    HideColumns { columns: Vec<String> },
    /// Indent the text of one column in the given rows.
    IndentRows {
        rows: Vec<usize>,
        column: String,
        indent: usize,
    },
    /// Add emphasis to the cells at the intersection of rows and columns.
    Emphasize {
        rows: Vec<usize>,
        columns: Vec<String>,
        emphasis: Emphasis,
    },
    /// Add a spanning header above a set of columns.
    SpanningHeader { columns: Vec<String>, text: String },
    /// Add a footnote. With columns, a reference mark is attached to their
    /// headers; without, the note is printed unmarked.
    Footnote { columns: Vec<String>, text: String },
    /// Set the table caption.
    Caption { text: String },
    /// Replace `from` wherever it stands as a whole word in the cells of the
    /// given columns (e.g. a missing-value sentinel inside `NA (NA, NA)`).
    ReplaceText {
        columns: Vec<String>,
        from: String,
        to: String,
    },
}

impl Directive {
    /// The region this directive affects.
    pub fn region(&self) -> Region {
        match self {
            Directive::LabelColumns { .. } => Region::Header,
            Directive::AlignColumns { .. } | Directive::HideColumns { .. } => Region::Columns,
            Directive::IndentRows { .. }
            | Directive::Emphasize { .. }
            | Directive::ReplaceText { .. } => Region::Body,
            Directive::SpanningHeader { .. } => Region::Spanner,
            Directive::Footnote { .. } => Region::Footer,
            Directive::Caption { .. } => Region::Caption,
        }
    }

    /// Column ids the directive addresses.
    pub fn columns(&self) -> Vec<&str> {
        match self {
            Directive::LabelColumns { labels } => {
                labels.iter().map(|(id, _)| id.as_str()).collect()
            }
            Directive::AlignColumns { columns, .. }
            | Directive::HideColumns { columns }
            | Directive::Emphasize { columns, .. }
            | Directive::SpanningHeader { columns, .. }
            | Directive::Footnote { columns, .. }
            | Directive::ReplaceText { columns, .. } => {
                columns.iter().map(String::as_str).collect()
            }
            Directive::IndentRows { column, .. } => vec![column.as_str()],
            Directive::Caption { .. } => Vec::new(),
        }
    }

    /// Body rows the directive addresses.
    pub fn rows(&self) -> &[usize] {
        match self {
            Directive::IndentRows { rows, .. } | Directive::Emphasize { rows, .. } => {
                rows.as_slice()
            }
            _ => &[],
        }
    }

    /// Short name of the directive kind, used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Directive::LabelColumns { .. } => "label_columns",
            Directive::AlignColumns { .. } => "align_columns",
            Directive::HideColumns { .. } => "hide_columns",
            Directive::IndentRows { .. } => "indent_rows",
            Directive::Emphasize { .. } => "emphasize",
            Directive::SpanningHeader { .. } => "spanning_header",
            Directive::Footnote { .. } => "footnote",
            Directive::Caption { .. } => "caption",
            Directive::ReplaceText { .. } => "replace_text",
        }
    }
}
