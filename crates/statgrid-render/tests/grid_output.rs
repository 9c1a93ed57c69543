//! Integration tests for the grid backend and its output modes.

use proptest::prelude::*;
use statgrid_render::util::display_width;
use statgrid_render::{
    Align, Backend, BorderStyle, Directive, Emphasis, GridBackend, GridSource, OutputMode,
    OutputOptions,
};

// ============================================================================
// Helpers
// ============================================================================

fn trial_source() -> GridSource {
    GridSource {
        columns: vec![
            "label".into(),
            "stat_1".into(),
            "stat_2".into(),
            "stat_0".into(),
        ],
        rows: vec![
            vec![
                "Age".into(),
                "46 (37, 59)".into(),
                "48 (39, 56)".into(),
                "47 (38, 57)".into(),
            ],
            vec!["Unknown".into(), "7".into(), "4".into(), "11".into()],
            vec!["Grade".into(), String::new(), String::new(), String::new()],
            vec![
                "I".into(),
                "35 (36%)".into(),
                "33 (32%)".into(),
                "68 (34%)".into(),
            ],
        ],
    }
}

fn decorated() -> statgrid_render::Grid {
    let mut backend = GridBackend::new();
    backend.bootstrap(trial_source()).unwrap();
    let directives = vec![
        Directive::LabelColumns {
            labels: vec![
                ("label".into(), "**Characteristic**".into()),
                ("stat_1".into(), "Drug A, N = 98".into()),
                ("stat_2".into(), "Drug B, N = 102".into()),
                ("stat_0".into(), "Overall, N = 200".into()),
            ],
        },
        Directive::AlignColumns {
            columns: vec!["stat_1".into(), "stat_2".into(), "stat_0".into()],
            align: Align::Center,
        },
        Directive::IndentRows {
            rows: vec![1, 3],
            column: "label".into(),
            indent: 4,
        },
        Directive::Emphasize {
            rows: vec![0, 2],
            columns: vec!["label".into()],
            emphasis: Emphasis::Bold,
        },
        Directive::SpanningHeader {
            columns: vec!["stat_1".into(), "stat_2".into()],
            text: "Treatment".into(),
        },
        Directive::Footnote {
            columns: vec!["stat_1".into(), "stat_2".into(), "stat_0".into()],
            text: "Median (Q1, Q3); n (%)".into(),
        },
        Directive::Caption {
            text: "Patient characteristics".into(),
        },
    ];
    for directive in &directives {
        backend.apply(directive).unwrap();
    }
    backend.finish().unwrap()
}

// ============================================================================
// Text layouts
// ============================================================================

#[test]
fn text_layout_has_every_row_once() {
    let text = decorated()
        .render(&OutputOptions::text(BorderStyle::None))
        .unwrap();
    let lines: Vec<&str> = text.lines().collect();
    // caption, spanner, header, 4 body rows, footnote
    assert_eq!(lines.len(), 8);
    assert_eq!(lines[0], "Patient characteristics");
    assert!(lines[1].contains("Treatment"));
    assert!(lines[2].contains("Drug A, N = 98¹"));
    assert!(lines[4].starts_with("    Unknown"));
    assert_eq!(lines[7], "¹ Median (Q1, Q3); n (%)");
}

#[test]
fn bordered_rows_share_width() {
    for border in [
        BorderStyle::Ascii,
        BorderStyle::Light,
        BorderStyle::Heavy,
        BorderStyle::Double,
        BorderStyle::Rounded,
    ] {
        let text = decorated().render(&OutputOptions::text(border)).unwrap();
        let framed: Vec<&str> = text
            .lines()
            .skip(1)
            .take_while(|l| !l.starts_with('¹'))
            .collect();
        let width = display_width(framed[0]);
        assert!(
            framed.iter().all(|l| display_width(l) == width),
            "uneven rows for {:?}",
            border
        );
    }
}

#[test]
fn wide_spanner_widens_columns() {
    let mut backend = GridBackend::new();
    backend
        .bootstrap(GridSource {
            columns: vec!["a".into(), "b".into()],
            rows: vec![vec!["1".into(), "2".into()]],
        })
        .unwrap();
    backend
        .apply(&Directive::SpanningHeader {
            columns: vec!["a".into(), "b".into()],
            text: "A rather long spanning header".into(),
        })
        .unwrap();
    let text = backend
        .finish()
        .unwrap()
        .render(&OutputOptions::text(BorderStyle::Light))
        .unwrap();
    let widths: Vec<usize> = text.lines().map(display_width).collect();
    assert!(widths.iter().all(|&w| w == widths[0]));
    assert!(text.contains("A rather long spanning header"));
}

#[test]
fn debug_mode_shows_style_tags() {
    let text = decorated()
        .render(&OutputOptions::text(BorderStyle::None).mode(OutputMode::TermDebug))
        .unwrap();
    assert!(text.contains("[bold]Age"));
    assert!(text.contains("[caption]Patient characteristics[/caption]"));
    assert!(text.contains("[footnote]"));
}

// ============================================================================
// Document and structured formats
// ============================================================================

#[test]
fn markdown_table() {
    let md = decorated()
        .render(&OutputOptions::default().mode(OutputMode::Markdown))
        .unwrap();
    let lines: Vec<&str> = md.lines().collect();
    assert_eq!(lines[0], "**Patient characteristics**");
    assert_eq!(
        lines[2],
        "| **Characteristic** | Drug A, N = 98¹ | Drug B, N = 102¹ | Overall, N = 200¹ |"
    );
    assert_eq!(lines[3], "| :--- | :---: | :---: | :---: |");
    assert_eq!(lines[4], "| **Age** | 46 (37, 59) | 48 (39, 56) | 47 (38, 57) |");
    assert_eq!(lines[5], "| &nbsp;&nbsp;&nbsp;&nbsp;Unknown | 7 | 4 | 11 |");
    assert_eq!(lines.last(), Some(&"¹ Median (Q1, Q3); n (%)"));
}

#[test]
fn csv_skips_hidden_columns() {
    let mut grid = decorated();
    grid.apply(&Directive::HideColumns {
        columns: vec!["stat_0".into()],
    })
    .unwrap();
    let csv = grid
        .render(&OutputOptions::default().mode(OutputMode::Csv))
        .unwrap();
    let mut reader = csv::Reader::from_reader(csv.as_bytes());
    let headers = reader.headers().unwrap().clone();
    assert_eq!(headers.len(), 3);
    assert_eq!(&headers[1], "Drug A, N = 98");
    let records: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    assert_eq!(records.len(), 4);
    assert_eq!(&records[3][0], "I");
}

#[test]
fn json_document() {
    let json = decorated()
        .render(&OutputOptions::default().mode(OutputMode::Json))
        .unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["caption"], "Patient characteristics");
    assert_eq!(value["columns"].as_array().unwrap().len(), 4);
    assert_eq!(value["columns"][3]["header"], "Overall, N = 200");
    assert_eq!(value["columns"][3]["align"], "center");
    assert_eq!(value["spanners"][0]["text"], "Treatment");
    assert_eq!(value["footnotes"][0]["mark"], 1);
}

#[test]
fn directives_load_from_yaml() {
    let yaml = r#"
- directive: caption
  text: Table 1
- directive: hide_columns
  columns: [stat_0]
"#;
    let directives: Vec<Directive> = serde_yaml::from_str(yaml).unwrap();
    let mut backend = GridBackend::new();
    backend.bootstrap(trial_source()).unwrap();
    for directive in &directives {
        backend.apply(directive).unwrap();
    }
    let grid = backend.finish().unwrap();
    assert_eq!(grid.caption(), Some("Table 1"));
    assert_eq!(grid.visible_columns().len(), 3);
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    /// Bordered text output has four frame lines plus one line per row.
    #[test]
    fn text_line_count_matches_rows(
        rows in prop::collection::vec(prop::collection::vec("[a-z0-9 ]{0,8}", 3), 0..20),
    ) {
        let n = rows.len();
        let mut backend = GridBackend::new();
        backend.bootstrap(GridSource {
            columns: vec!["a".into(), "b".into(), "c".into()],
            rows,
        }).unwrap();
        let text = backend.finish().unwrap()
            .render(&OutputOptions::text(BorderStyle::Ascii))
            .unwrap();
        // top, header, separator, rows, bottom
        prop_assert_eq!(text.lines().count(), n + 4);
    }

    /// Every bordered line has the same display width.
    #[test]
    fn bordered_lines_align(
        rows in prop::collection::vec(prop::collection::vec("[a-zA-Z0-9 ]{0,12}", 2), 1..10),
        header in "[a-z]{1,20}",
    ) {
        let mut backend = GridBackend::new();
        backend.bootstrap(GridSource { columns: vec!["x".into(), "y".into()], rows }).unwrap();
        backend.apply(&Directive::LabelColumns { labels: vec![("x".into(), header)] }).unwrap();
        let text = backend.finish().unwrap()
            .render(&OutputOptions::text(BorderStyle::Double))
            .unwrap();
        let widths: Vec<usize> = text.lines().map(display_width).collect();
        prop_assert!(widths.iter().all(|&w| w == widths[0]));
    }
}
