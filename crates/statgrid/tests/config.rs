//! Loading options and themes from YAML files.

use std::io::Write;

use statgrid::{
    build_summary, AdjustMethod, ComparisonOptions, Dataset, Digits, MissingPolicy,
    OverallPosition, PvalueStyle, RenderOptions, StatgridError, SummaryOptions, TestKind, Theme,
    VariableKind,
};
use tempfile::NamedTempFile;

fn yaml_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn summary_options_from_file() {
    let file = yaml_file(
        r#"
group_by: trt
labels:
  age: Age
kinds:
  marker: continuous
statistics:
  age: "{mean} ({sd})"
digits:
  age: 2
  marker: { mean: 1 }
include_overall: true
overall_position: first
missing_policy: always
missing_text: Missing
"#,
    );
    let options = SummaryOptions::from_file(file.path()).unwrap();

    assert_eq!(options.group_by.as_deref(), Some("trt"));
    assert_eq!(options.labels["age"], "Age");
    assert_eq!(options.kinds["marker"], VariableKind::Continuous);
    assert_eq!(options.digits["age"], Digits::Uniform(2));
    assert!(matches!(options.digits["marker"], Digits::PerStatistic(_)));
    assert!(options.include_overall);
    assert_eq!(options.overall_position, OverallPosition::First);
    assert_eq!(options.missing_policy, MissingPolicy::Show);
    assert_eq!(options.missing_text, "Missing");
    assert_eq!(options.continuous_threshold, 9);
}

#[test]
fn loaded_options_drive_the_build() {
    let file = yaml_file("group_by: trt\nlabels:\n  age: Age\nstatistics:\n  age: \"{mean}\"\ndigits:\n  age: 1\n");
    let options = SummaryOptions::from_file(file.path()).unwrap();
    let data = Dataset::builder()
        .text("trt", ["A", "A", "B", "B"])
        .numeric("age", [30.5, 40.5, 50.0, 60.0])
        .build()
        .unwrap();

    let summary = build_summary(&data, &options).unwrap();
    let row = &summary.body().rows()[0];
    assert_eq!(row.label, "Age");
    assert_eq!(row.cell("stat_1"), Some("35.5"));
    assert_eq!(row.cell("stat_2"), Some("55.0"));
}

#[test]
fn unknown_summary_key_is_rejected() {
    let file = yaml_file("group_by: trt\ngroupby: arm\n");
    assert!(matches!(
        SummaryOptions::from_file(file.path()).unwrap_err(),
        StatgridError::Config(_)
    ));
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = SummaryOptions::from_file(dir.path().join("absent.yaml")).unwrap_err();
    assert!(matches!(err, StatgridError::Io(_)));
}

#[test]
fn comparison_options_from_file() {
    let file = yaml_file(
        r#"
tests:
  age: welch_t
min_expected: 1
pvalue_template: "p = {p}"
pvalue_style: { fixed: { digits: 2, floor: 0.01 } }
adjust: fdr
"#,
    );
    let options = ComparisonOptions::from_file(file.path()).unwrap();

    assert_eq!(options.tests["age"], TestKind::WelchT);
    assert_eq!(options.min_expected, 1.0);
    assert_eq!(options.pvalue_template, "p = {p}");
    assert_eq!(
        options.pvalue_style,
        PvalueStyle::Fixed {
            digits: 2,
            floor: 0.01
        }
    );
    assert_eq!(options.adjust, Some(AdjustMethod::BenjaminiHochberg));
    assert_eq!(options.exact_max_rows, 1000);
}

#[test]
fn theme_from_file_renders_styled_output() {
    let file = yaml_file("header: \"bold cyan\"\nfootnote:\n  dim: true\n");
    let theme = Theme::from_file(file.path()).unwrap();
    assert!(theme.style("header").is_some());
    assert!(theme.style("caption").is_none());

    let data = Dataset::builder()
        .text("trt", ["A", "B"])
        .text("grade", ["I", "II"])
        .build()
        .unwrap();
    let summary = build_summary(&data, &SummaryOptions::new().group_by("trt")).unwrap();
    let plain = summary
        .render_text(&RenderOptions::new().theme(theme))
        .unwrap();
    assert!(!plain.contains('\x1b'));
}
