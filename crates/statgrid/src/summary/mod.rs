//! Summary tables.
//!
//! [`build_summary`] classifies every variable, computes its statistics per
//! column, formats them through the variable's template, and returns a
//! [`Summary`]: the formatted [`TableBody`], per-variable [`MetaData`], and a
//! base [`RenderPipeline`]. Add-ons and formatting calls then take the
//! summary by value and return it, so they chain:
//!
//! ```rust
//! use statgrid::{build_summary, Dataset, RenderOptions, SummaryOptions};
//!
//! let data = Dataset::builder()
//!     .text("trt", ["A", "A", "A", "B", "B", "B"])
//!     .numeric("age", [41.5, 52.0, 47.5, 60.0, 58.5, 63.0])
//!     .build()
//!     .unwrap();
//!
//! let summary = build_summary(&data, &SummaryOptions::new().group_by("trt"))
//!     .unwrap()
//!     .add_n()
//!     .bold_labels();
//!
//! let text = summary.render_text(&RenderOptions::default()).unwrap();
//! assert!(text.contains("A, N = 3"));
//! ```

mod addons;
mod format;
mod inline;
mod render;

use std::collections::BTreeMap;

use statgrid_render::{Align, Directive};

use crate::classify::{classify, Classified, ClassifyOptions};
use crate::compare::{AdjustMethod, PvalueStyle};
use crate::dataset::Dataset;
use crate::error::{Result, StatgridError};
use crate::options::{MissingPolicy, OverallPosition, SummaryOptions};
use crate::partition::GroupPartition;
use crate::pipeline::{RenderCall, RenderPipeline};
use crate::stats::{
    continuous_bundle, is_allowed, is_allowed_missing, level_bundles, missing_bundle,
    percentile_name, StatisticBundle,
};
use crate::table::{
    group_column_id, ColumnRole, MetaData, RowType, TableBody, TableColumn, TableRow,
    VariableMeta, VariableSpec, LABEL_COLUMN, OVERALL_COLUMN,
};
use crate::template::{guess_digits, Rounding, Template};

pub use addons::StatLabelLocation;
pub use inline::inline_text;
pub use render::{render, RenderOptions};

/// Indent of level and missing rows under their variable label.
const LEVEL_INDENT: usize = 4;

/// State left by `add_comparison` for later add-ons.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct ComparisonState {
    pub template: Template,
    pub style: PvalueStyle,
    pub adjust: Option<AdjustMethod>,
}

/// A summary table: formatted body, metadata, and render pipeline.
///
/// A summary owns everything it shows. Changing or dropping the dataset it
/// was built from has no effect on it.
#[derive(Clone, Debug, PartialEq)]
pub struct Summary {
    pub(crate) body: TableBody,
    pub(crate) meta: MetaData,
    pub(crate) pipeline: RenderPipeline,
    pub(crate) variables: Vec<VariableSpec>,
    pub(crate) classified: Vec<Classified>,
    pub(crate) partition: Option<GroupPartition>,
    pub(crate) n_total: usize,
    pub(crate) missing_text: String,
    pub(crate) overall_position: OverallPosition,
    pub(crate) comparison: Option<ComparisonState>,
    pub(crate) q_method: Option<AdjustMethod>,
    pub(crate) stat_label: Option<StatLabelLocation>,
}

impl Summary {
    pub fn body(&self) -> &TableBody {
        &self.body
    }

    pub fn meta(&self) -> &MetaData {
        &self.meta
    }

    pub fn pipeline(&self) -> &RenderPipeline {
        &self.pipeline
    }

    pub fn variables(&self) -> &[VariableSpec] {
        &self.variables
    }

    pub fn variable(&self, name: &str) -> Option<&VariableSpec> {
        self.variables.iter().find(|v| v.name == name)
    }

    /// Group levels in column order; empty when ungrouped.
    pub fn group_levels(&self) -> &[String] {
        self.partition
            .as_ref()
            .map(GroupPartition::levels)
            .unwrap_or(&[])
    }

    pub fn is_grouped(&self) -> bool {
        self.partition.is_some()
    }

    /// Rows summarized.
    pub fn n_total(&self) -> usize {
        self.n_total
    }

    pub fn has_comparison(&self) -> bool {
        self.comparison.is_some()
    }

    /// Inserts a render call after `anchor`.
    ///
    /// # Errors
    ///
    /// [`StatgridError::UnknownAnchor`] when `anchor` is not in the pipeline,
    /// or any error of [`Summary::push_call`].
    pub fn insert_call_after(mut self, anchor: &str, call: RenderCall) -> Result<Self> {
        self.check_call(&call)?;
        self.pipeline.insert_after(anchor, call)?;
        Ok(self)
    }

    /// Inserts a render call before `anchor`.
    ///
    /// # Errors
    ///
    /// [`StatgridError::UnknownAnchor`] when `anchor` is not in the pipeline,
    /// or any error of [`Summary::push_call`].
    pub fn insert_call_before(mut self, anchor: &str, call: RenderCall) -> Result<Self> {
        self.check_call(&call)?;
        self.pipeline.insert_before(anchor, call)?;
        Ok(self)
    }

    /// Appends a render call, replacing one of the same name in place.
    ///
    /// # Errors
    ///
    /// [`StatgridError::ColumnNotFound`] or [`StatgridError::RowOutOfRange`]
    /// when the call addresses cells the table does not have.
    pub fn push_call(mut self, call: RenderCall) -> Result<Self> {
        self.check_call(&call)?;
        self.pipeline.push(call);
        Ok(self)
    }

    /// Checks that a caller-supplied call only addresses existing cells.
    /// Columns are never removed and rows never change, so a call that
    /// passes stays valid.
    fn check_call(&self, call: &RenderCall) -> Result<()> {
        let directive = call.directive();
        if let Some(column) = directive
            .columns()
            .into_iter()
            .find(|id| !self.body.has_column(id))
        {
            return Err(StatgridError::ColumnNotFound(column.to_string()));
        }
        let rows = self.body.rows.len();
        match directive.rows().iter().find(|&&row| row >= rows) {
            Some(&row) => Err(StatgridError::RowOutOfRange { row, rows }),
            None => Ok(()),
        }
    }

    /// Removes a render call by name. Unknown names are ignored.
    pub fn remove_call(mut self, name: &str) -> Self {
        if self.pipeline.remove(name).is_none() {
            tracing::debug!(call = name, "no render call to remove");
        }
        self
    }

    /// Re-issues the column-level calls after the column set changed.
    pub(crate) fn refresh_columns(&mut self) {
        self.pipeline.push(cols_label(&self.body));
        self.pipeline.push(cols_align(&self.body));
        if self.pipeline.contains(FOOTNOTE_STAT) {
            self.pipeline.push(footnote_stat(&self.body, &self.variables));
        }
        if let Some(Directive::ReplaceText { to, .. }) = self
            .pipeline
            .get(format::MISSING_SYMBOL)
            .map(RenderCall::directive)
        {
            let call = format::missing_symbol_call(&self.body, to.clone());
            self.pipeline.push(call);
        }
    }

    /// Index of the variable named `name`.
    pub(crate) fn variable_index(&self, name: &str) -> Result<usize> {
        self.variables
            .iter()
            .position(|v| v.name == name)
            .ok_or_else(|| StatgridError::VariableNotFound(name.to_string()))
    }

    /// Index of the label row of variable `index`.
    pub(crate) fn label_row(&self, index: usize) -> usize {
        self.meta.variables[index].rows.start
    }
}

const COLS_LABEL: &str = "cols_label";
const COLS_ALIGN: &str = "cols_align";
const INDENT_LEVELS: &str = "indent_levels";
pub(crate) const FOOTNOTE_STAT: &str = "footnote_stat";

fn cols_label(body: &TableBody) -> RenderCall {
    RenderCall::new(
        COLS_LABEL,
        Directive::LabelColumns {
            labels: body
                .columns()
                .iter()
                .map(|c| (c.id.clone(), c.header.clone()))
                .collect(),
        },
    )
}

fn cols_align(body: &TableBody) -> RenderCall {
    RenderCall::new(
        COLS_ALIGN,
        Directive::AlignColumns {
            columns: body
                .columns()
                .iter()
                .filter(|c| c.role != ColumnRole::Label)
                .map(|c| c.id.clone())
                .collect(),
            align: Align::Center,
        },
    )
}

fn indent_levels(body: &TableBody) -> RenderCall {
    RenderCall::new(
        INDENT_LEVELS,
        Directive::IndentRows {
            rows: body.row_indices(|r| r.row_type != RowType::Label),
            column: LABEL_COLUMN.to_string(),
            indent: LEVEL_INDENT,
        },
    )
}

/// Distinct template descriptions, in row order.
pub(crate) fn statistic_descriptions(variables: &[VariableSpec]) -> Vec<String> {
    let mut descriptions: Vec<String> = Vec::new();
    for variable in variables {
        let description = variable.template.describe();
        if !descriptions.contains(&description) {
            descriptions.push(description);
        }
    }
    descriptions
}

fn footnote_stat(body: &TableBody, variables: &[VariableSpec]) -> RenderCall {
    RenderCall::new(
        FOOTNOTE_STAT,
        Directive::Footnote {
            columns: body.stat_column_ids(),
            text: statistic_descriptions(variables).join("; "),
        },
    )
}

/// Default header of the overall column.
fn overall_header(grouped: bool, n: usize) -> String {
    if grouped {
        format!("Overall, N = {}", n)
    } else {
        format!("N = {}", n)
    }
}

pub(crate) fn overall_column(grouped: bool, n: usize) -> TableColumn {
    TableColumn {
        id: OVERALL_COLUMN.to_string(),
        role: ColumnRole::Overall,
        header: overall_header(grouped, n),
        level: None,
        n,
    }
}

/// One formatted cell per column key, plus the overall cell.
fn render_cells(
    groups: &[StatisticBundle],
    overall: &StatisticBundle,
    template: &Template,
    rounding: &Rounding,
) -> BTreeMap<String, String> {
    let mut cells: BTreeMap<String, String> = groups
        .iter()
        .enumerate()
        .map(|(g, bundle)| (group_column_id(g), template.render(bundle, rounding)))
        .collect();
    cells.insert(OVERALL_COLUMN.to_string(), template.render(overall, rounding));
    cells
}

/// Builds a summary table.
///
/// # Errors
///
/// - [`StatgridError::EmptyDataset`] for a dataset without rows or columns,
///   a grouping column without observed values, or nothing to summarize
/// - [`StatgridError::VariableNotFound`] when `group_by` or an option key
///   names no column
/// - [`StatgridError::InvalidKind`] when a kind override does not fit
/// - [`StatgridError::InvalidTemplate`] / [`StatgridError::UnknownPlaceholder`]
///   for a bad statistic template
#[tracing::instrument(
    skip_all,
    fields(columns = data.num_columns(), rows = data.num_rows(), group_by = ?options.group_by)
)]
pub fn build_summary(data: &Dataset, options: &SummaryOptions) -> Result<Summary> {
    if data.num_columns() == 0 {
        return Err(StatgridError::EmptyDataset("no columns".into()));
    }
    if data.num_rows() == 0 {
        return Err(StatgridError::EmptyDataset("no rows".into()));
    }
    if let Some(name) = options
        .referenced_variables()
        .find(|name| data.column(name).is_none())
    {
        return Err(StatgridError::VariableNotFound(name.to_string()));
    }

    let partition = match &options.group_by {
        Some(name) => {
            let column = data
                .column(name)
                .ok_or_else(|| StatgridError::VariableNotFound(name.clone()))?;
            let partition = GroupPartition::from_column(column);
            if partition.num_levels() == 0 {
                return Err(StatgridError::EmptyDataset(format!(
                    "grouping column '{}' has no observed values",
                    name
                )));
            }
            Some(partition)
        }
        None => None,
    };
    let kept: Vec<usize> = match &partition {
        Some(partition) => partition.kept_rows(),
        None => (0..data.num_rows()).collect(),
    };
    let n_total = kept.len();
    let level_rows = (n_total < data.num_rows()).then_some(kept.as_slice());

    let columns: Vec<_> = data
        .columns()
        .iter()
        .filter(|c| Some(c.name()) != options.group_by.as_deref())
        .filter(|c| {
            options
                .include
                .as_ref()
                .map_or(true, |include| include.iter().any(|name| name == c.name()))
        })
        .collect();
    if columns.is_empty() {
        return Err(StatgridError::EmptyDataset("no variables to summarize".into()));
    }

    let missing_template = Template::parse(&options.default_statistics.missing)?;
    let mut rows: Vec<TableRow> = Vec::new();
    let mut variables = Vec::with_capacity(columns.len());
    let mut classified_all = Vec::with_capacity(columns.len());
    let mut metas = Vec::with_capacity(columns.len());

    for column in columns {
        let name = column.name();
        let classified = classify(
            column,
            &ClassifyOptions {
                kind: options.kinds.get(name).copied(),
                continuous_threshold: options.continuous_threshold,
                value: options.values.get(name).map(String::as_str),
                rows: level_rows,
            },
        )?;
        let kind = classified.kind();

        let source = options
            .statistics
            .get(name)
            .map(String::as_str)
            .unwrap_or_else(|| options.default_statistics.for_kind(kind));
        let template = Template::parse(source)?;
        template.validate(name, |stat| is_allowed(kind, stat))?;
        missing_template.validate(name, is_allowed_missing)?;

        let group_rows: Vec<&[usize]> = match &partition {
            Some(partition) => (0..partition.num_levels()).map(|g| partition.rows(g)).collect(),
            None => Vec::new(),
        };
        let n_missing = kept.iter().filter(|&&row| classified.is_missing(row)).count();
        let label = options
            .labels
            .get(name)
            .cloned()
            .unwrap_or_else(|| column.display_label().to_string());
        let start = rows.len();

        let with_digits = |continuous: u32| {
            let rounding = Rounding::new(continuous);
            match options.digits.get(name) {
                Some(digits) => rounding.with_digits(digits),
                None => rounding,
            }
        };
        let label_row = |cells| TableRow {
            variable: name.to_string(),
            row_type: RowType::Label,
            label: label.clone(),
            level: None,
            cells,
        };

        let rounding = match &classified {
            Classified::Continuous { values } => {
                let percentiles: Vec<u32> =
                    template.placeholders().filter_map(percentile_name).collect();
                let overall = continuous_bundle(values, &kept, &percentiles);
                let rounding = with_digits(guess_digits(&overall));
                let groups: Vec<StatisticBundle> = group_rows
                    .iter()
                    .map(|r| continuous_bundle(values, r, &percentiles))
                    .collect();
                rows.push(label_row(render_cells(&groups, &overall, &template, &rounding)));
                rounding
            }
            Classified::Categorical { levels, codes } => {
                let rounding = with_digits(0);
                let overall = level_bundles(codes, &kept, levels.len());
                let groups: Vec<Vec<StatisticBundle>> = group_rows
                    .iter()
                    .map(|r| level_bundles(codes, r, levels.len()))
                    .collect();
                rows.push(label_row(BTreeMap::new()));
                for (idx, level) in levels.iter().enumerate() {
                    let level_groups: Vec<StatisticBundle> =
                        groups.iter().map(|g| g[idx].clone()).collect();
                    rows.push(TableRow {
                        variable: name.to_string(),
                        row_type: RowType::Level,
                        label: level.clone(),
                        level: Some(level.clone()),
                        cells: render_cells(&level_groups, &overall[idx], &template, &rounding),
                    });
                }
                rounding
            }
            Classified::Dichotomous {
                levels,
                codes,
                shown,
            } => {
                let rounding = with_digits(0);
                let overall = level_bundles(codes, &kept, levels.len());
                let groups: Vec<StatisticBundle> = group_rows
                    .iter()
                    .map(|r| level_bundles(codes, r, levels.len())[*shown].clone())
                    .collect();
                rows.push(label_row(render_cells(
                    &groups,
                    &overall[*shown],
                    &template,
                    &rounding,
                )));
                rounding
            }
        };

        let show_missing = match options.missing_policy {
            MissingPolicy::Show => true,
            MissingPolicy::Hide => false,
            MissingPolicy::OnlyIfPresent => n_missing > 0,
        };
        if show_missing {
            let is_missing = |row: usize| classified.is_missing(row);
            let overall = missing_bundle(&kept, is_missing);
            let groups: Vec<StatisticBundle> = group_rows
                .iter()
                .map(|r| missing_bundle(r, is_missing))
                .collect();
            rows.push(TableRow {
                variable: name.to_string(),
                row_type: RowType::Missing,
                label: options.missing_text.clone(),
                level: None,
                cells: render_cells(&groups, &overall, &missing_template, &rounding),
            });
        }

        metas.push(VariableMeta {
            name: name.to_string(),
            label: label.clone(),
            kind,
            n: n_total,
            n_missing,
            n_nonmissing: n_total - n_missing,
            test: None,
            p_value: None,
            p_adjusted: None,
            q_value: None,
            rows: start..rows.len(),
        });
        variables.push(VariableSpec {
            name: name.to_string(),
            label,
            kind,
            levels: classified.levels().to_vec(),
            shown_level: classified.shown_level().map(str::to_string),
            template,
            missing_template: missing_template.clone(),
            rounding,
            n_missing,
        });
        classified_all.push(classified);
    }

    let grouped = partition.is_some();
    let mut table_columns = vec![TableColumn {
        id: LABEL_COLUMN.to_string(),
        role: ColumnRole::Label,
        header: "Characteristic".to_string(),
        level: None,
        n: n_total,
    }];
    if let Some(partition) = &partition {
        for (g, level) in partition.levels().iter().enumerate() {
            let n = partition.level_size(g);
            table_columns.push(TableColumn {
                id: group_column_id(g),
                role: ColumnRole::Group,
                header: format!("{}, N = {}", level, n),
                level: Some(level.clone()),
                n,
            });
        }
    }
    if !grouped || options.include_overall {
        let overall = overall_column(grouped, n_total);
        match options.overall_position {
            OverallPosition::First => table_columns.insert(1, overall),
            OverallPosition::Last => table_columns.push(overall),
        }
    }

    let body = TableBody {
        columns: table_columns,
        rows,
    };
    let mut pipeline = RenderPipeline::new();
    pipeline.push(cols_label(&body));
    pipeline.push(cols_align(&body));
    pipeline.push(indent_levels(&body));
    pipeline.push(footnote_stat(&body, &variables));

    tracing::debug!(
        variables = variables.len(),
        body_rows = body.rows().len(),
        body_columns = body.columns().len(),
        "built summary"
    );

    Ok(Summary {
        body,
        meta: MetaData {
            variables: metas,
            group_by: options.group_by.clone(),
            dropped_rows: partition.as_ref().map_or(0, GroupPartition::dropped),
        },
        pipeline,
        variables,
        classified: classified_all,
        partition,
        n_total,
        missing_text: options.missing_text.clone(),
        overall_position: options.overall_position,
        comparison: None,
        q_method: None,
        stat_label: None,
    })
}
