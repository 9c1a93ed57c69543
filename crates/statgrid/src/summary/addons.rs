//! Add-ons: operations that add columns or rewrite labels.
//!
//! Each add-on takes the summary by value and returns it. None of them
//! recomputes an existing cell; new cells come from stored metadata or, for
//! comparisons, from the classified data kept in the summary.

use serde::{Deserialize, Serialize};
use statgrid_render::Directive;

use crate::compare::{adjust, compare, format_pvalue, AdjustMethod, ComparisonOptions};
use crate::error::{Result, StatgridError};
use crate::options::OverallPosition;
use crate::pipeline::RenderCall;
use crate::table::{
    ColumnRole, RowType, TableColumn, LABEL_COLUMN, N_COLUMN, OVERALL_COLUMN, P_VALUE_COLUMN,
    Q_VALUE_COLUMN, STAT_LABEL_COLUMN,
};

use super::{overall_column, ComparisonState, Summary, FOOTNOTE_STAT};

const FOOTNOTE_TEST: &str = "footnote_test";
const FOOTNOTE_ADJUST: &str = "footnote_adjust";
const FOOTNOTE_Q: &str = "footnote_q";

/// Where `add_stat_label` puts statistic descriptions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatLabelLocation {
    /// Appended to each variable label: `Age, Median (Q1, Q3)`.
    #[default]
    Row,
    /// In a separate `stat_label` column.
    Column,
}

impl Summary {
    /// Adds a p-value column comparing the groups.
    ///
    /// With `options.adjust`, the column shows adjusted p-values. Running it
    /// again replaces the previous comparison.
    ///
    /// # Errors
    ///
    /// - [`StatgridError::InsufficientGroups`] for fewer than two groups (an
    ///   ungrouped table counts as one)
    /// - [`StatgridError::VariableNotFound`] for a test override naming no
    ///   summarized variable
    /// - [`StatgridError::IncompatibleTest`] when an override does not fit
    /// - [`StatgridError::UnknownPlaceholder`] for a p-value template using
    ///   anything but `{p}`
    pub fn add_comparison(mut self, options: ComparisonOptions) -> Result<Self> {
        let partition = match &self.partition {
            Some(partition) if partition.num_levels() >= 2 => partition,
            other => {
                return Err(StatgridError::InsufficientGroups {
                    found: other.as_ref().map_or(1, |p| p.num_levels()),
                })
            }
        };
        let template = options.parsed_template()?;
        for (variable, test) in &options.tests {
            let index = self.variable_index(variable)?;
            crate::compare::check_compatible(
                *test,
                variable,
                self.variables[index].kind,
                partition.num_levels(),
            )?;
        }

        let outcomes = self
            .variables
            .iter()
            .zip(&self.classified)
            .map(|(spec, classified)| compare(&spec.name, classified, partition, &options))
            .collect::<Result<Vec<_>>>()?;

        let raw: Vec<Option<f64>> = outcomes.iter().map(|o| o.p_value).collect();
        let adjusted = options.adjust.map(|method| adjust(&raw, method));
        let shown = adjusted.clone().unwrap_or_else(|| raw.clone());

        if !self.body.has_column(P_VALUE_COLUMN) {
            let index = self
                .body
                .position(Q_VALUE_COLUMN)
                .unwrap_or(self.body.columns.len());
            self.body.insert_column(
                index,
                TableColumn {
                    id: P_VALUE_COLUMN.to_string(),
                    role: ColumnRole::PValue,
                    header: "p-value".to_string(),
                    level: None,
                    n: self.n_total,
                },
            );
        }

        let mut tests_used = Vec::new();
        for (index, outcome) in outcomes.iter().enumerate() {
            let meta = &mut self.meta.variables[index];
            meta.test = Some(outcome.test);
            meta.p_value = outcome.p_value;
            meta.p_adjusted = adjusted.as_ref().and_then(|a| a[index]);
            if !tests_used.contains(&outcome.test) {
                tests_used.push(outcome.test);
            }
            let row = self.label_row(index);
            self.body.rows[row].cells.insert(
                P_VALUE_COLUMN.to_string(),
                format_pvalue(shown[index], &template, &options.pvalue_style),
            );
        }

        self.pipeline.push(RenderCall::new(
            FOOTNOTE_TEST,
            Directive::Footnote {
                columns: vec![P_VALUE_COLUMN.to_string()],
                text: tests_used
                    .iter()
                    .map(|t| t.description())
                    .collect::<Vec<_>>()
                    .join("; "),
            },
        ));
        match options.adjust {
            Some(method) => self.pipeline.push(RenderCall::new(
                FOOTNOTE_ADJUST,
                Directive::Footnote {
                    columns: vec![P_VALUE_COLUMN.to_string()],
                    text: method.description().to_string(),
                },
            )),
            None => {
                self.pipeline.remove(FOOTNOTE_ADJUST);
            }
        }

        self.comparison = Some(ComparisonState {
            template,
            style: options.pvalue_style,
            adjust: options.adjust,
        });
        if let Some(method) = self.q_method {
            self.fill_q_values(method);
        }
        self.refresh_columns();
        Ok(self)
    }

    /// Adds a `q.value` column of p-values adjusted for multiple testing.
    ///
    /// # Errors
    ///
    /// [`StatgridError::MissingComparison`] without a prior `add_comparison`.
    pub fn add_multiplicity_adjustment(mut self, method: AdjustMethod) -> Result<Self> {
        if self.comparison.is_none() {
            return Err(StatgridError::MissingComparison(
                "add_multiplicity_adjustment",
            ));
        }
        if !self.body.has_column(Q_VALUE_COLUMN) {
            let index = self
                .body
                .position(P_VALUE_COLUMN)
                .map_or(self.body.columns.len(), |p| p + 1);
            self.body.insert_column(
                index,
                TableColumn {
                    id: Q_VALUE_COLUMN.to_string(),
                    role: ColumnRole::QValue,
                    header: "q-value".to_string(),
                    level: None,
                    n: self.n_total,
                },
            );
        }
        self.fill_q_values(method);
        self.pipeline.push(RenderCall::new(
            FOOTNOTE_Q,
            Directive::Footnote {
                columns: vec![Q_VALUE_COLUMN.to_string()],
                text: method.description().to_string(),
            },
        ));
        self.q_method = Some(method);
        self.refresh_columns();
        Ok(self)
    }

    fn fill_q_values(&mut self, method: AdjustMethod) {
        let Some(state) = &self.comparison else {
            return;
        };
        let raw: Vec<Option<f64>> = self.meta.variables.iter().map(|m| m.p_value).collect();
        let q = adjust(&raw, method);
        for (index, q_value) in q.into_iter().enumerate() {
            self.meta.variables[index].q_value = q_value;
            let row = self.meta.variables[index].rows.start;
            self.body.rows[row].cells.insert(
                Q_VALUE_COLUMN.to_string(),
                format_pvalue(q_value, &state.template, &state.style),
            );
        }
    }

    /// Shows the overall column in a grouped table.
    ///
    /// Does nothing when the column is already shown (always the case for
    /// ungrouped tables).
    pub fn add_overall(mut self) -> Self {
        if self.body.has_column(OVERALL_COLUMN) {
            tracing::debug!("overall column already present");
            return self;
        }
        let groups: Vec<usize> = self
            .body
            .columns
            .iter()
            .enumerate()
            .filter(|(_, c)| c.role == ColumnRole::Group)
            .map(|(i, _)| i)
            .collect();
        let index = match (self.overall_position, groups.first(), groups.last()) {
            (OverallPosition::First, Some(&first), _) => first,
            (OverallPosition::Last, _, Some(&last)) => last + 1,
            _ => 1,
        };
        self.body
            .insert_column(index, overall_column(self.is_grouped(), self.n_total));
        self.refresh_columns();
        self
    }

    /// Adds an `N` column with each variable's non-missing count.
    pub fn add_n(mut self) -> Self {
        if self.body.has_column(N_COLUMN) {
            tracing::debug!("n column already present");
            return self;
        }
        let index = self
            .body
            .position(STAT_LABEL_COLUMN)
            .or_else(|| self.body.position(LABEL_COLUMN))
            .map_or(0, |p| p + 1);
        self.body.insert_column(
            index,
            TableColumn {
                id: N_COLUMN.to_string(),
                role: ColumnRole::N,
                header: "N".to_string(),
                level: None,
                n: self.n_total,
            },
        );
        for index in 0..self.variables.len() {
            let row = self.label_row(index);
            let n = self.meta.variables[index].n_nonmissing;
            self.body.rows[row]
                .cells
                .insert(N_COLUMN.to_string(), n.to_string());
        }
        self.refresh_columns();
        self
    }

    /// Shows what each statistic is, in the labels or in a column, instead of
    /// in the statistics footnote.
    pub fn add_stat_label(mut self, location: StatLabelLocation) -> Self {
        if let Some(existing) = self.stat_label {
            tracing::debug!(?existing, "statistic labels already added");
            return self;
        }
        for (index, spec) in self.variables.iter().enumerate() {
            let description = spec.template.describe();
            let rows = self.meta.variables[index].rows.clone();
            for row in &mut self.body.rows[rows] {
                match (location, row.row_type) {
                    (StatLabelLocation::Row, RowType::Label) => {
                        row.label = format!("{}, {}", row.label, description);
                    }
                    (StatLabelLocation::Row, _) => {}
                    (StatLabelLocation::Column, RowType::Label) => {
                        if row.cells.is_empty() {
                            continue;
                        }
                        row.cells
                            .insert(STAT_LABEL_COLUMN.to_string(), description.clone());
                    }
                    (StatLabelLocation::Column, RowType::Level) => {
                        row.cells
                            .insert(STAT_LABEL_COLUMN.to_string(), description.clone());
                    }
                    (StatLabelLocation::Column, RowType::Missing) => {
                        row.cells
                            .insert(STAT_LABEL_COLUMN.to_string(), "n".to_string());
                    }
                }
            }
        }
        if location == StatLabelLocation::Column {
            let index = self.body.position(LABEL_COLUMN).map_or(0, |p| p + 1);
            self.body.insert_column(
                index,
                TableColumn {
                    id: STAT_LABEL_COLUMN.to_string(),
                    role: ColumnRole::StatLabel,
                    header: "Statistic".to_string(),
                    level: None,
                    n: self.n_total,
                },
            );
        }
        self.pipeline.remove(FOOTNOTE_STAT);
        self.stat_label = Some(location);
        self.refresh_columns();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::VariableKind;
    use crate::compare::TestKind;
    use crate::dataset::Dataset;
    use crate::options::SummaryOptions;
    use crate::summary::build_summary;

    fn trial() -> Dataset {
        Dataset::builder()
            .text("trt", ["A", "A", "A", "A", "B", "B", "B", "B"])
            .numeric("age", [31.5, 42.0, 38.5, 45.0, 52.5, 61.0, 49.5, 58.0])
            .text("grade", ["I", "II", "I", "I", "II", "II", "I", "II"])
            .numeric("marker", [Some(0.5), None, Some(1.25), Some(0.75), Some(2.5), Some(1.5), None, Some(3.25)])
            .build()
            .unwrap()
    }

    fn grouped() -> Summary {
        build_summary(&trial(), &SummaryOptions::new().group_by("trt")).unwrap()
    }

    #[test]
    fn comparison_adds_one_column() {
        let before = grouped();
        let after = before.clone().add_comparison(ComparisonOptions::default()).unwrap();
        assert_eq!(
            after.body().column_ids(),
            vec!["label", "stat_1", "stat_2", "p.value"]
        );
        // existing cells untouched
        for (old, new) in before.body().rows().iter().zip(after.body().rows()) {
            assert_eq!(old.cell("stat_1"), new.cell("stat_1"));
            assert_eq!(old.cell("stat_2"), new.cell("stat_2"));
        }
        let age = after.meta().variable("age").unwrap();
        assert_eq!(age.test, Some(TestKind::RankSum));
        // completely separated samples of 4: p = 2/70
        assert!((age.p_value.unwrap() - 2.0 / 70.0).abs() < 1e-12);
        assert_eq!(after.body().rows()[0].cell("p.value"), Some("0.029"));
        assert!(after.pipeline().contains("footnote_test"));
    }

    #[test]
    fn comparison_twice_keeps_one_column() {
        let summary = grouped()
            .add_comparison(ComparisonOptions::default())
            .unwrap()
            .add_comparison(ComparisonOptions::default().adjust(AdjustMethod::Bonferroni))
            .unwrap();
        let p_columns = summary
            .body()
            .columns()
            .iter()
            .filter(|c| c.id == "p.value")
            .count();
        assert_eq!(p_columns, 1);
        assert!(summary.pipeline().contains("footnote_adjust"));
        let age = summary.meta().variable("age").unwrap();
        assert!(age.p_adjusted.unwrap() >= age.p_value.unwrap());
    }

    #[test]
    fn comparison_needs_groups() {
        let ungrouped = build_summary(&trial(), &SummaryOptions::new()).unwrap();
        let err = ungrouped
            .add_comparison(ComparisonOptions::default())
            .unwrap_err();
        assert!(matches!(err, StatgridError::InsufficientGroups { found: 1 }));

        let one_group = Dataset::builder()
            .text("trt", ["A", "A"])
            .numeric("x", [1.5, 2.5])
            .build()
            .unwrap();
        let summary = build_summary(&one_group, &SummaryOptions::new().group_by("trt")).unwrap();
        assert!(matches!(
            summary.add_comparison(ComparisonOptions::default()).unwrap_err(),
            StatgridError::InsufficientGroups { found: 1 }
        ));
    }

    #[test]
    fn incompatible_override_fails_before_running() {
        let err = grouped()
            .add_comparison(ComparisonOptions::default().test("grade", TestKind::WelchT))
            .unwrap_err();
        assert!(matches!(err, StatgridError::IncompatibleTest { .. }));

        let err = grouped()
            .add_comparison(ComparisonOptions::default().test("weight", TestKind::Anova))
            .unwrap_err();
        assert!(matches!(err, StatgridError::VariableNotFound(_)));
    }

    #[test]
    fn multiplicity_adjustment_needs_comparison() {
        let err = grouped()
            .add_multiplicity_adjustment(AdjustMethod::Holm)
            .unwrap_err();
        assert!(matches!(
            err,
            StatgridError::MissingComparison("add_multiplicity_adjustment")
        ));
    }

    #[test]
    fn q_values_follow_p_values() {
        let summary = grouped()
            .add_comparison(ComparisonOptions::default())
            .unwrap()
            .add_multiplicity_adjustment(AdjustMethod::Bonferroni)
            .unwrap();
        assert_eq!(
            summary.body().column_ids(),
            vec!["label", "stat_1", "stat_2", "p.value", "q.value"]
        );
        let age = summary.meta().variable("age").unwrap();
        let expected = (age.p_value.unwrap() * 3.0).min(1.0);
        assert!((age.q_value.unwrap() - expected).abs() < 1e-12);
        assert!(summary.pipeline().contains("footnote_q"));
    }

    #[test]
    fn overall_after_groups() {
        let summary = grouped().add_comparison(ComparisonOptions::default()).unwrap().add_overall();
        assert_eq!(
            summary.body().column_ids(),
            vec!["label", "stat_1", "stat_2", "stat_0", "p.value"]
        );
        assert_eq!(summary.body().columns()[3].header, "Overall, N = 8");
        let again = summary.clone().add_overall();
        assert_eq!(again, summary);
    }

    #[test]
    fn n_column_counts_non_missing() {
        let summary = grouped().add_n();
        assert_eq!(summary.body().column_ids()[1], "n");
        let marker = summary.meta().variable("marker").unwrap();
        let row = &summary.body().rows()[marker.rows.start];
        assert_eq!(row.cell("n"), Some("6"));
        // level rows carry no count
        assert_eq!(summary.body().rows()[2].cell("n"), None);
    }

    #[test]
    fn stat_label_in_rows() {
        let summary = grouped().add_stat_label(StatLabelLocation::Row);
        assert_eq!(summary.body().rows()[0].label, "age, Median (Q1, Q3)");
        assert_eq!(summary.body().rows()[1].label, "grade, n (%)");
        assert!(!summary.pipeline().contains("footnote_stat"));
    }

    #[test]
    fn stat_label_in_column() {
        let summary = grouped().add_stat_label(StatLabelLocation::Column).add_n();
        assert_eq!(
            summary.body().column_ids(),
            vec!["label", "stat_label", "n", "stat_1", "stat_2"]
        );
        let rows = summary.body().rows();
        assert_eq!(rows[0].cell("stat_label"), Some("Median (Q1, Q3)"));
        assert_eq!(rows[1].cell("stat_label"), None);
        assert_eq!(rows[2].cell("stat_label"), Some("n (%)"));
        let missing = rows.iter().find(|r| r.row_type == RowType::Missing).unwrap();
        assert_eq!(missing.cell("stat_label"), Some("n"));
    }

    #[test]
    fn categorical_test_is_recorded() {
        let summary = grouped().add_comparison(ComparisonOptions::default()).unwrap();
        let grade = summary.meta().variable("grade").unwrap();
        assert_eq!(grade.kind, VariableKind::Categorical);
        assert_eq!(grade.test, Some(TestKind::FisherExact));
    }
}
