//! End-to-end tests: build, add-ons, render, and inline queries together.

use statgrid::{
    build_summary, inline_text, render, AdjustMethod, ColumnRole, ComparisonOptions, Dataset,
    GridBackend, OutputMode, RenderOptions, RowType, StatLabelLocation, StatgridError, Summary,
    SummaryOptions, TestKind, VariableKind,
};

// ============================================================================
// Helpers
// ============================================================================

fn two_group_data() -> Dataset {
    Dataset::builder()
        .text("group", ["A", "A", "A", "A", "A", "B", "B", "B", "B", "B"])
        .numeric("value", [10.0, 20.0, 30.0, 40.0, 50.0, 15.0, 25.0, 35.0, 45.0, 55.0])
        .build()
        .unwrap()
}

fn two_group_summary() -> Summary {
    let options = SummaryOptions::new()
        .group_by("group")
        .include_overall(true);
    build_summary(&two_group_data(), &options).unwrap()
}

fn trial() -> Dataset {
    Dataset::builder()
        .text(
            "trt",
            ["Drug A", "Drug A", "Drug A", "Drug A", "Drug B", "Drug B", "Drug B", "Drug B"],
        )
        .numeric(
            "age",
            [Some(23.5), Some(41.0), None, Some(35.5), Some(62.0), Some(55.5), Some(48.0), Some(70.5)],
        )
        .text("grade", ["II", "I", "I", "III", "III", "II", "I", "III"])
        .boolean("response", [true, false, true, true, false, false, true, false])
        .label("age", "Age")
        .label("grade", "Grade")
        .build()
        .unwrap()
}

// ============================================================================
// Two groups, one continuous variable
// ============================================================================

#[test]
fn two_group_scenario_has_one_row_and_three_stat_columns() {
    let summary = two_group_summary();
    let body = summary.body();

    assert_eq!(body.rows().len(), 1);
    assert_eq!(body.stat_column_ids(), vec!["stat_1", "stat_2", "stat_0"]);

    let row = &body.rows()[0];
    assert_eq!(row.row_type, RowType::Label);
    assert_eq!(row.cell("label"), Some("value"));
    assert_eq!(row.cell("stat_1"), Some("30 (20, 40)"));
    assert_eq!(row.cell("stat_2"), Some("35 (25, 45)"));
    assert_eq!(row.cell("stat_0"), Some("33 (20, 45)"));
}

#[test]
fn add_n_inserts_one_column_without_touching_statistics() {
    let before = two_group_summary();
    let after = before.clone().add_n();

    assert_eq!(after.body().columns().len(), before.body().columns().len() + 1);
    assert_eq!(after.body().column("n").unwrap().role, ColumnRole::N);
    for id in before.body().stat_column_ids() {
        assert_eq!(
            before.body().rows()[0].cell(&id),
            after.body().rows()[0].cell(&id),
            "column {}",
            id
        );
    }
    assert_eq!(after.body().rows()[0].cell("n"), Some("10"));
}

#[test]
fn comparison_adds_exactly_one_column() {
    let summary = two_group_summary()
        .add_comparison(ComparisonOptions::default())
        .unwrap();
    // two groups, overall, p-value
    assert_eq!(summary.body().stat_column_ids().len(), 4);
    assert_eq!(summary.meta().variable("value").unwrap().test, Some(TestKind::RankSum));
}

#[test]
fn rendered_text_shows_headers_and_cells() {
    let text = two_group_summary()
        .render_text(&RenderOptions::default())
        .unwrap();
    assert!(text.contains("Characteristic"));
    assert!(text.contains("A, N = 5"));
    assert!(text.contains("B, N = 5"));
    assert!(text.contains("Overall, N = 10"));
    assert!(text.contains("30 (20, 40)"));
    assert!(text.contains("Median (Q1, Q3)"));
}

// ============================================================================
// Test selection
// ============================================================================

#[test]
fn test_selection_follows_group_count() {
    let two = build_summary(&trial(), &SummaryOptions::new().group_by("trt"))
        .unwrap()
        .add_comparison(ComparisonOptions::default())
        .unwrap();
    assert_eq!(two.meta().variable("age").unwrap().test, Some(TestKind::RankSum));

    let three = build_summary(&trial(), &SummaryOptions::new().group_by("grade"))
        .unwrap()
        .add_comparison(ComparisonOptions::default())
        .unwrap();
    assert_eq!(three.meta().variable("age").unwrap().test, Some(TestKind::KruskalWallis));
}

#[test]
fn explicit_test_always_wins() {
    for group_by in ["trt", "grade"] {
        let summary = build_summary(&trial(), &SummaryOptions::new().group_by(group_by))
            .unwrap()
            .add_comparison(ComparisonOptions::new().test("age", TestKind::Anova))
            .unwrap();
        assert_eq!(summary.meta().variable("age").unwrap().test, Some(TestKind::Anova));
    }
}

#[test]
fn comparison_needs_two_groups() {
    let err = build_summary(&trial(), &SummaryOptions::new())
        .unwrap()
        .add_comparison(ComparisonOptions::default())
        .unwrap_err();
    assert!(matches!(err, StatgridError::InsufficientGroups { found: 1 }));
}

// ============================================================================
// Full chain
// ============================================================================

#[test]
fn full_chain_renders_every_addition() {
    let summary = build_summary(&trial(), &SummaryOptions::new().group_by("trt"))
        .unwrap()
        .add_overall()
        .add_n()
        .add_stat_label(StatLabelLocation::Row)
        .add_comparison(ComparisonOptions::default())
        .unwrap()
        .add_multiplicity_adjustment(AdjustMethod::BenjaminiHochberg)
        .unwrap()
        .bold_labels()
        .italicize_levels()
        .modify_caption("Patient characteristics");

    let ids = summary.body().column_ids();
    assert_eq!(
        ids,
        vec!["label", "n", "stat_1", "stat_2", "stat_0", "p.value", "q.value"]
    );
    assert!(summary.pipeline().contains("footnote_test"));
    assert!(summary.pipeline().contains("footnote_q"));
    assert!(!summary.pipeline().contains("footnote_stat"));

    let text = summary.render_text(&RenderOptions::default()).unwrap();
    assert!(text.starts_with("Patient characteristics"));
    assert!(text.contains("Age, Median (Q1, Q3)"));
    assert!(text.contains("Grade, n (%)"));
}

#[test]
fn inserting_relative_to_a_missing_call_fails() {
    let call = statgrid::RenderCall::new(
        "caption",
        statgrid::Directive::Caption {
            text: "x".to_string(),
        },
    );
    let err = two_group_summary()
        .insert_call_after("no_such_call", call)
        .unwrap_err();
    assert!(matches!(err, StatgridError::UnknownAnchor(name) if name == "no_such_call"));
}

// ============================================================================
// Render omit policy
// ============================================================================

#[test]
fn omitting_an_unknown_call_is_a_no_op() {
    let summary = two_group_summary();
    let plain = render(&summary, GridBackend::new(), &[]).unwrap();
    let omitted = render(&summary, GridBackend::new(), &["not_a_call"]).unwrap();
    assert_eq!(plain, omitted);
}

#[test]
fn rendering_twice_is_identical() {
    let summary = two_group_summary().add_n().bold_labels();
    let options = RenderOptions::new().mode(OutputMode::Json);
    assert_eq!(
        summary.render_text(&options).unwrap(),
        summary.render_text(&options).unwrap()
    );
}

// ============================================================================
// Inline queries
// ============================================================================

#[test]
fn inline_values_match_rendered_cells() {
    let summary = two_group_summary();
    let grid = summary.render(&RenderOptions::default()).unwrap();
    let inline = inline_text(&summary, "value", None, "B").unwrap();
    assert_eq!(grid.cell(0, "stat_2").unwrap().text, inline);
    assert_eq!(inline_text(&summary, "value", None, "overall").unwrap(), "33 (20, 45)");
}

#[test]
fn inline_text_ignores_later_dataset_changes() {
    let original = two_group_data();
    let summary = build_summary(&original, &SummaryOptions::new().group_by("group")).unwrap();
    let before = inline_text(&summary, "value", None, "A").unwrap();

    // A changed copy of the data, and the original dropped.
    let changed = Dataset::builder()
        .text("group", ["A", "A", "A", "A", "A", "B", "B", "B", "B", "B"])
        .numeric("value", [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0])
        .kind("value", VariableKind::Continuous)
        .build()
        .unwrap();
    drop(original);
    let rebuilt = build_summary(&changed, &SummaryOptions::new().group_by("group")).unwrap();

    assert_eq!(inline_text(&summary, "value", None, "A").unwrap(), before);
    assert_ne!(inline_text(&rebuilt, "value", None, "A").unwrap(), before);
}

// ============================================================================
// Eager validation
// ============================================================================

#[test]
fn bad_placeholder_fails_at_build_time() {
    let options = SummaryOptions::new().statistic("grade", "{mean}");
    let err = build_summary(&trial(), &options).unwrap_err();
    assert!(matches!(
        err,
        StatgridError::UnknownPlaceholder { placeholder, variable }
            if placeholder == "mean" && variable == "grade"
    ));
}

#[test]
fn forced_kind_that_does_not_fit_fails() {
    let options = SummaryOptions::new().kind("grade", VariableKind::Continuous);
    assert!(matches!(
        build_summary(&trial(), &options).unwrap_err(),
        StatgridError::InvalidKind { .. }
    ));
}

#[test]
fn empty_dataset_is_rejected() {
    let data = Dataset::new(Vec::new()).unwrap();
    assert!(matches!(
        build_summary(&data, &SummaryOptions::new()).unwrap_err(),
        StatgridError::EmptyDataset(_)
    ));
}
