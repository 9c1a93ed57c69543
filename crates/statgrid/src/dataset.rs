//! In-memory datasets.
//!
//! A [`Dataset`] is an ordered list of named, equal-length [`Column`]s. It is
//! immutable once built; summaries copy everything they need out of it.
//!
//! ```rust
//! use statgrid::{Dataset, VariableKind};
//!
//! let data = Dataset::builder()
//!     .text("trt", ["Drug A", "Drug B", "Drug A"])
//!     .numeric("age", [Some(41.0), None, Some(57.5)])
//!     .boolean("response", [true, false, true])
//!     .factor("grade", ["I", "II", "III"], ["II", "I", "II"])
//!     .label("age", "Age (years)")
//!     .kind("grade", VariableKind::Categorical)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(data.num_rows(), 3);
//! assert_eq!(data.column("age").unwrap().display_label(), "Age (years)");
//! ```

use std::collections::HashSet;

use crate::classify::VariableKind;
use crate::error::{Result, StatgridError};

/// The values of one column.
#[derive(Clone, Debug, PartialEq)]
pub enum ColumnData {
    /// Numbers; `None` and NaN are missing.
    Numeric(Vec<Option<f64>>),
    Text(Vec<Option<String>>),
    Boolean(Vec<Option<bool>>),
    /// Ordered categories: declared levels plus one code per row.
    Factor {
        levels: Vec<String>,
        codes: Vec<Option<usize>>,
    },
}

impl ColumnData {
    pub fn len(&self) -> usize {
        match self {
            ColumnData::Numeric(v) => v.len(),
            ColumnData::Text(v) => v.len(),
            ColumnData::Boolean(v) => v.len(),
            ColumnData::Factor { codes, .. } => codes.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_missing(&self, row: usize) -> bool {
        match self {
            ColumnData::Numeric(v) => v[row].is_none(),
            ColumnData::Text(v) => v[row].is_none(),
            ColumnData::Boolean(v) => v[row].is_none(),
            ColumnData::Factor { codes, .. } => codes[row].is_none(),
        }
    }

    /// Number of missing values.
    pub fn missing_count(&self) -> usize {
        (0..self.len()).filter(|&row| self.is_missing(row)).count()
    }

    /// Short type name used in messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            ColumnData::Numeric(_) => "numeric",
            ColumnData::Text(_) => "text",
            ColumnData::Boolean(_) => "boolean",
            ColumnData::Factor { .. } => "factor",
        }
    }
}

/// A named column with an optional display label and declared kind.
#[derive(Clone, Debug, PartialEq)]
pub struct Column {
    name: String,
    label: Option<String>,
    kind: Option<VariableKind>,
    data: ColumnData,
}

impl Column {
    /// Creates a column. NaN numeric values are stored as missing.
    pub fn new(name: impl Into<String>, data: ColumnData) -> Self {
        let data = match data {
            ColumnData::Numeric(values) => ColumnData::Numeric(
                values
                    .into_iter()
                    .map(|v| v.filter(|x| !x.is_nan()))
                    .collect(),
            ),
            other => other,
        };
        Column {
            name: name.into(),
            label: None,
            kind: None,
            data,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_kind(mut self, kind: VariableKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// The label if set, else the name.
    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.name)
    }

    pub fn kind(&self) -> Option<VariableKind> {
        self.kind
    }

    pub fn data(&self) -> &ColumnData {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// An immutable collection of equal-length named columns.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Dataset {
    columns: Vec<Column>,
    rows: usize,
}

impl Dataset {
    /// Creates a dataset from columns.
    ///
    /// # Errors
    ///
    /// [`StatgridError::LengthMismatch`] on ragged columns and
    /// [`StatgridError::DuplicateColumn`] on repeated names.
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        let rows = columns.first().map(Column::len).unwrap_or(0);
        let mut seen = HashSet::new();
        for column in &columns {
            if !seen.insert(column.name()) {
                return Err(StatgridError::DuplicateColumn(column.name().to_string()));
            }
            if column.len() != rows {
                return Err(StatgridError::LengthMismatch {
                    column: column.name().to_string(),
                    expected: rows,
                    actual: column.len(),
                });
            }
        }
        Ok(Dataset { columns, rows })
    }

    pub fn builder() -> DatasetBuilder {
        DatasetBuilder::default()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    pub fn num_rows(&self) -> usize {
        self.rows
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }
}

/// Conversion into a text cell, so builders accept `&str`, `String` and
/// their `Option`s alike.
pub trait IntoTextCell {
    fn into_text_cell(self) -> Option<String>;
}

impl IntoTextCell for &str {
    fn into_text_cell(self) -> Option<String> {
        Some(self.to_string())
    }
}

impl IntoTextCell for String {
    fn into_text_cell(self) -> Option<String> {
        Some(self)
    }
}

impl IntoTextCell for &String {
    fn into_text_cell(self) -> Option<String> {
        Some(self.clone())
    }
}

impl<T: IntoTextCell> IntoTextCell for Option<T> {
    fn into_text_cell(self) -> Option<String> {
        self.and_then(IntoTextCell::into_text_cell)
    }
}

/// Chainable dataset construction. Errors are reported by [`build`].
///
/// [`build`]: DatasetBuilder::build
#[derive(Debug, Default)]
pub struct DatasetBuilder {
    columns: Vec<Column>,
    labels: Vec<(String, String)>,
    kinds: Vec<(String, VariableKind)>,
    error: Option<StatgridError>,
}

impl DatasetBuilder {
    pub fn column(mut self, column: Column) -> Self {
        self.columns.push(column);
        self
    }

    pub fn numeric<I, V>(self, name: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Option<f64>>,
    {
        let values = values.into_iter().map(Into::into).collect();
        self.column(Column::new(name, ColumnData::Numeric(values)))
    }

    pub fn text<I, V>(self, name: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: IntoTextCell,
    {
        let values = values.into_iter().map(IntoTextCell::into_text_cell).collect();
        self.column(Column::new(name, ColumnData::Text(values)))
    }

    pub fn boolean<I, V>(self, name: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Option<bool>>,
    {
        let values = values.into_iter().map(Into::into).collect();
        self.column(Column::new(name, ColumnData::Boolean(values)))
    }

    /// Adds a factor column. Every non-missing value must be one of `levels`.
    pub fn factor<L, S, I, V>(mut self, name: &str, levels: L, values: I) -> Self
    where
        L: IntoIterator<Item = S>,
        S: Into<String>,
        I: IntoIterator<Item = V>,
        V: IntoTextCell,
    {
        let levels: Vec<String> = levels.into_iter().map(Into::into).collect();
        let mut codes = Vec::new();
        for value in values.into_iter().map(IntoTextCell::into_text_cell) {
            match value {
                None => codes.push(None),
                Some(v) => match levels.iter().position(|l| *l == v) {
                    Some(code) => codes.push(Some(code)),
                    None => {
                        if self.error.is_none() {
                            self.error = Some(StatgridError::Config(format!(
                                "factor '{}': value '{}' is not a declared level",
                                name, v
                            )));
                        }
                        codes.push(None);
                    }
                },
            }
        }
        self.column(Column::new(name, ColumnData::Factor { levels, codes }))
    }

    /// Sets the display label of a column added to this builder.
    pub fn label(mut self, name: &str, label: &str) -> Self {
        self.labels.push((name.to_string(), label.to_string()));
        self
    }

    /// Declares the kind of a column added to this builder.
    pub fn kind(mut self, name: &str, kind: VariableKind) -> Self {
        self.kinds.push((name.to_string(), kind));
        self
    }

    pub fn build(self) -> Result<Dataset> {
        if let Some(err) = self.error {
            return Err(err);
        }
        let mut columns = self.columns;
        for (name, label) in self.labels {
            let column = columns
                .iter_mut()
                .find(|c| c.name == name)
                .ok_or_else(|| StatgridError::VariableNotFound(name.clone()))?;
            column.label = Some(label);
        }
        for (name, kind) in self.kinds {
            let column = columns
                .iter_mut()
                .find(|c| c.name == name)
                .ok_or_else(|| StatgridError::VariableNotFound(name.clone()))?;
            column.kind = Some(kind);
        }
        Dataset::new(columns)
    }
}
