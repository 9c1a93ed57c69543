//! Formatting calls: emphasis, headers, spanners, footnotes, caption.
//!
//! These only record render calls. Calls that address columns resolve them
//! now (by id, group level, or `overall`) and fail early on unknown names.

use statgrid_render::{Directive, Emphasis};

use crate::error::{Result, StatgridError};
use crate::pipeline::RenderCall;
use crate::table::{ColumnRole, RowType, TableBody, LABEL_COLUMN, P_VALUE_COLUMN};
use crate::template::{format_fixed, Template, NA};

use super::Summary;

pub(crate) const MISSING_SYMBOL: &str = "missing_symbol";

/// Placeholders allowed in header templates.
const HEADER_PLACEHOLDERS: &[&str] = &["level", "n", "N", "p"];

pub(crate) fn missing_symbol_call(body: &TableBody, text: String) -> RenderCall {
    RenderCall::new(
        MISSING_SYMBOL,
        Directive::ReplaceText {
            columns: body
                .columns()
                .iter()
                .filter(|c| !matches!(c.role, ColumnRole::Label | ColumnRole::StatLabel))
                .map(|c| c.id.clone())
                .collect(),
            from: NA.to_string(),
            to: text,
        },
    )
}

impl Summary {
    /// Resolves a column reference to a column id of the body.
    pub(crate) fn resolve_column(&self, column: &str) -> Result<String> {
        if let Some(found) = self.body.column(column) {
            return Ok(found.id.clone());
        }
        let by_level = self.body.columns().iter().find(|c| match c.role {
            ColumnRole::Group => c.level.as_deref() == Some(column),
            ColumnRole::Overall => column.eq_ignore_ascii_case("overall"),
            _ => false,
        });
        by_level
            .map(|c| c.id.clone())
            .ok_or_else(|| StatgridError::ColumnNotFound(column.to_string()))
    }

    fn emphasize(mut self, name: &str, row_types: &[RowType], emphasis: Emphasis) -> Self {
        let rows = self.body.row_indices(|r| row_types.contains(&r.row_type));
        self.pipeline.push(RenderCall::new(
            name,
            Directive::Emphasize {
                rows,
                columns: vec![LABEL_COLUMN.to_string()],
                emphasis,
            },
        ));
        self
    }

    /// Bolds variable labels.
    pub fn bold_labels(self) -> Self {
        self.emphasize("bold_labels", &[RowType::Label], Emphasis::Bold)
    }

    /// Italicizes variable labels.
    pub fn italicize_labels(self) -> Self {
        self.emphasize("italicize_labels", &[RowType::Label], Emphasis::Italic)
    }

    /// Bolds level labels, the missing-value row included.
    pub fn bold_levels(self) -> Self {
        self.emphasize(
            "bold_levels",
            &[RowType::Level, RowType::Missing],
            Emphasis::Bold,
        )
    }

    /// Italicizes level labels, the missing-value row included.
    pub fn italicize_levels(self) -> Self {
        self.emphasize(
            "italicize_levels",
            &[RowType::Level, RowType::Missing],
            Emphasis::Italic,
        )
    }

    /// Bolds p-values below `threshold`. Adjusted p-values are compared when
    /// the p-value column shows them.
    ///
    /// # Errors
    ///
    /// [`StatgridError::MissingComparison`] without a prior `add_comparison`.
    pub fn bold_p(mut self, threshold: f64) -> Result<Self> {
        let adjusted = match &self.comparison {
            Some(state) => state.adjust.is_some(),
            None => return Err(StatgridError::MissingComparison("bold_p")),
        };
        let rows: Vec<usize> = self
            .meta
            .variables()
            .iter()
            .filter(|m| {
                let p = if adjusted { m.p_adjusted } else { m.p_value };
                p.is_some_and(|p| p < threshold)
            })
            .map(|m| m.rows.start)
            .collect();
        self.pipeline.push(RenderCall::new(
            "bold_p",
            Directive::Emphasize {
                rows,
                columns: vec![P_VALUE_COLUMN.to_string()],
                emphasis: Emphasis::Bold,
            },
        ));
        Ok(self)
    }

    /// Sets a column header from a template.
    ///
    /// Placeholders: `{level}` (group level, or `Overall`), `{n}` (rows in
    /// the column), `{N}` (rows in the table), `{p}` (`n` as a percentage of
    /// `N`).
    ///
    /// # Errors
    ///
    /// [`StatgridError::ColumnNotFound`], [`StatgridError::InvalidTemplate`],
    /// or [`StatgridError::UnknownPlaceholder`].
    pub fn modify_header(mut self, column: &str, template: &str) -> Result<Self> {
        let id = self.resolve_column(column)?;
        let parsed = Template::parse(template)?;
        parsed.validate(&id, |name| HEADER_PLACEHOLDERS.contains(&name))?;

        let n_total = self.n_total;
        if let Some(target) = self.body.columns.iter_mut().find(|c| c.id == id) {
            let level = match (&target.level, target.role) {
                (Some(level), _) => level.clone(),
                (None, ColumnRole::Overall) => "Overall".to_string(),
                (None, _) => target.header.clone(),
            };
            let n = target.n;
            target.header = parsed.render_with(|name| match name {
                "level" => level.clone(),
                "n" => n.to_string(),
                "N" => n_total.to_string(),
                _ if n_total == 0 => NA.to_string(),
                _ => format_fixed(100.0 * n as f64 / n_total as f64, 0),
            });
        }
        self.refresh_columns();
        Ok(self)
    }

    /// Adds a header spanning `columns`.
    ///
    /// # Errors
    ///
    /// [`StatgridError::ColumnNotFound`] for an unknown column.
    pub fn modify_spanning_header(mut self, columns: &[&str], text: &str) -> Result<Self> {
        let ids = columns
            .iter()
            .map(|c| self.resolve_column(c))
            .collect::<Result<Vec<_>>>()?;
        self.pipeline.push(RenderCall::new(
            format!("spanning_header:{}", ids.join(",")),
            Directive::SpanningHeader {
                columns: ids,
                text: text.to_string(),
            },
        ));
        Ok(self)
    }

    /// Adds a footnote referenced from one column header.
    ///
    /// # Errors
    ///
    /// [`StatgridError::ColumnNotFound`] for an unknown column.
    pub fn modify_footnote(mut self, column: &str, text: &str) -> Result<Self> {
        let id = self.resolve_column(column)?;
        self.pipeline.push(RenderCall::new(
            format!("footnote:{}", id),
            Directive::Footnote {
                columns: vec![id],
                text: text.to_string(),
            },
        ));
        Ok(self)
    }

    /// Sets the table caption.
    pub fn modify_caption(mut self, text: &str) -> Self {
        self.pipeline.push(RenderCall::new(
            "caption",
            Directive::Caption {
                text: text.to_string(),
            },
        ));
        self
    }

    /// Prints `text` instead of `NA` for statistics that could not be
    /// computed.
    pub fn modify_missing_symbol(mut self, text: &str) -> Self {
        let call = missing_symbol_call(&self.body, text.to_string());
        self.pipeline.push(call);
        self
    }

    /// Hides columns from the rendered table. Their cells stay queryable.
    ///
    /// # Errors
    ///
    /// [`StatgridError::ColumnNotFound`] for an unknown column.
    pub fn modify_column_hide(mut self, columns: &[&str]) -> Result<Self> {
        let ids = columns
            .iter()
            .map(|c| self.resolve_column(c))
            .collect::<Result<Vec<_>>>()?;
        self.pipeline.push(RenderCall::new(
            format!("column_hide:{}", ids.join(",")),
            Directive::HideColumns { columns: ids },
        ));
        Ok(self)
    }
}
