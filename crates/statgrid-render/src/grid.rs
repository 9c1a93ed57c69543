//! The grid: a decorated table built by applying directives.
//!
//! A [`Grid`] starts as raw cell text (see [`GridSource`]) with column ids
//! as headers. Directives then relabel, align, hide, indent, emphasize, and
//! annotate it. Writing is separate from building: [`Grid::render`] turns the
//! same grid into any [`OutputMode`].
//!
//! # Example
//!
//! ```rust
//! use statgrid_render::{Align, BorderStyle, Directive, Grid, GridSource, OutputOptions};
//!
//! let mut grid = Grid::from_source(GridSource {
//!     columns: vec!["label".into(), "stat_1".into()],
//!     rows: vec![vec!["Age".into(), "47 (38, 57)".into()]],
//! });
//! grid.apply(&Directive::LabelColumns {
//!     labels: vec![("label".into(), "Characteristic".into()), ("stat_1".into(), "Drug A".into())],
//! }).unwrap();
//! grid.apply(&Directive::AlignColumns { columns: vec!["stat_1".into()], align: Align::Center }).unwrap();
//!
//! let text = grid.render(&OutputOptions::text(BorderStyle::None)).unwrap();
//! assert!(text.starts_with("Characteristic"));
//! ```

use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

use crate::backend::GridSource;
use crate::border::LineType;
use crate::directive::{Align, Directive, Emphasis};
use crate::error::{RenderError, Result};
use crate::output::{OutputMode, OutputOptions};
use crate::util::{display_width, pad_aligned, pad_center, superscript};

const SEPARATOR: &str = "  ";

/// A column of the grid.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GridColumn {
    pub id: String,
    pub header: String,
    pub align: Align,
    pub hidden: bool,
}

/// A body cell.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct GridCell {
    pub text: String,
    pub indent: usize,
    pub emphasis: BTreeSet<Emphasis>,
}

impl GridCell {
    fn display_text(&self) -> String {
        if self.text.is_empty() {
            String::new()
        } else {
            format!("{}{}", " ".repeat(self.indent), self.text)
        }
    }
}

/// A header spanning several columns.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Spanner {
    pub columns: Vec<String>,
    pub text: String,
}

/// A note printed below the table. Marked notes reference column headers.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Footnote {
    pub mark: Option<usize>,
    pub columns: Vec<String>,
    pub text: String,
}

/// A directive-built table, ready to be written in any output mode.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Grid {
    columns: Vec<GridColumn>,
    rows: Vec<Vec<GridCell>>,
    spanners: Vec<Spanner>,
    footnotes: Vec<Footnote>,
    caption: Option<String>,
}

impl Grid {
    /// Creates a grid whose headers are the column ids.
    ///
    /// Short rows are padded with empty cells; extra cells are dropped.
    pub fn from_source(source: GridSource) -> Self {
        let width = source.columns.len();
        let columns = source
            .columns
            .into_iter()
            .map(|id| GridColumn {
                header: id.clone(),
                id,
                align: Align::Left,
                hidden: false,
            })
            .collect();
        let rows = source
            .rows
            .into_iter()
            .map(|row| {
                let mut cells: Vec<GridCell> = row
                    .into_iter()
                    .take(width)
                    .map(|text| GridCell {
                        text,
                        ..GridCell::default()
                    })
                    .collect();
                cells.resize(width, GridCell::default());
                cells
            })
            .collect();
        Grid {
            columns,
            rows,
            ..Grid::default()
        }
    }

    /// Applies one directive. Nothing is changed when the directive fails.
    ///
    /// # Errors
    ///
    /// [`RenderError::UnknownColumn`] or [`RenderError::RowOutOfRange`] when
    /// the directive addresses cells the grid does not have.
    pub fn apply(&mut self, directive: &Directive) -> Result<()> {
        tracing::trace!(directive = directive.kind(), "applying directive");
        match directive {
            Directive::LabelColumns { labels } => {
                let ids: Vec<String> = labels.iter().map(|(id, _)| id.clone()).collect();
                let indices = self.column_indices(&ids)?;
                for (idx, (_, label)) in indices.into_iter().zip(labels) {
                    self.columns[idx].header = label.clone();
                }
            }
            Directive::AlignColumns { columns, align } => {
                for idx in self.column_indices(columns)? {
                    self.columns[idx].align = *align;
                }
            }
            Directive::HideColumns { columns } => {
                for idx in self.column_indices(columns)? {
                    self.columns[idx].hidden = true;
                }
            }
            Directive::IndentRows {
                rows,
                column,
                indent,
            } => {
                let idx = self.column_index(column)?;
                self.check_rows(rows)?;
                for &row in rows {
                    self.rows[row][idx].indent = *indent;
                }
            }
            Directive::Emphasize {
                rows,
                columns,
                emphasis,
            } => {
                let indices = self.column_indices(columns)?;
                self.check_rows(rows)?;
                for &row in rows {
                    for &idx in &indices {
                        self.rows[row][idx].emphasis.insert(*emphasis);
                    }
                }
            }
            Directive::SpanningHeader { columns, text } => {
                self.column_indices(columns)?;
                self.spanners.push(Spanner {
                    columns: columns.clone(),
                    text: text.clone(),
                });
            }
            Directive::Footnote { columns, text } => {
                self.column_indices(columns)?;
                let mark = if columns.is_empty() {
                    None
                } else {
                    Some(self.footnotes.iter().filter(|f| f.mark.is_some()).count() + 1)
                };
                self.footnotes.push(Footnote {
                    mark,
                    columns: columns.clone(),
                    text: text.clone(),
                });
            }
            Directive::Caption { text } => {
                self.caption = Some(text.clone());
            }
            Directive::ReplaceText { columns, from, to } => {
                for idx in self.column_indices(columns)? {
                    for row in &mut self.rows {
                        row[idx].text = replace_word(&row[idx].text, from, to);
                    }
                }
            }
        }
        Ok(())
    }

    fn column_index(&self, id: &str) -> Result<usize> {
        self.columns
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| RenderError::UnknownColumn(id.to_string()))
    }

    fn column_indices(&self, ids: &[String]) -> Result<Vec<usize>> {
        ids.iter().map(|id| self.column_index(id)).collect()
    }

    fn check_rows(&self, rows: &[usize]) -> Result<()> {
        match rows.iter().find(|&&row| row >= self.rows.len()) {
            Some(&row) => Err(RenderError::RowOutOfRange {
                row,
                rows: self.rows.len(),
            }),
            None => Ok(()),
        }
    }

    pub fn columns(&self) -> &[GridColumn] {
        &self.columns
    }

    pub fn column(&self, id: &str) -> Option<&GridColumn> {
        self.columns.iter().find(|c| c.id == id)
    }

    /// Columns that are not hidden, in order.
    pub fn visible_columns(&self) -> Vec<&GridColumn> {
        self.columns.iter().filter(|c| !c.hidden).collect()
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    /// The cell at a body row and column id.
    pub fn cell(&self, row: usize, column: &str) -> Option<&GridCell> {
        let idx = self.columns.iter().position(|c| c.id == column)?;
        self.rows.get(row).and_then(|cells| cells.get(idx))
    }

    pub fn caption(&self) -> Option<&str> {
        self.caption.as_deref()
    }

    pub fn footnotes(&self) -> &[Footnote] {
        &self.footnotes
    }

    pub fn spanners(&self) -> &[Spanner] {
        &self.spanners
    }

    /// Header text with footnote marks appended.
    fn header_text(&self, idx: usize) -> String {
        let column = &self.columns[idx];
        let marks: Vec<String> = self
            .footnotes
            .iter()
            .filter(|f| f.columns.contains(&column.id))
            .filter_map(|f| f.mark.map(superscript))
            .collect();
        if marks.is_empty() {
            column.header.clone()
        } else {
            format!("{}{}", column.header, marks.join(","))
        }
    }

    fn visible_indices(&self) -> Vec<usize> {
        (0..self.columns.len())
            .filter(|&i| !self.columns[i].hidden)
            .collect()
    }

    fn footnote_line(footnote: &Footnote) -> String {
        match footnote.mark {
            Some(mark) => format!("{} {}", superscript(mark), footnote.text),
            None => footnote.text.clone(),
        }
    }

    /// Writes the grid in the requested mode.
    ///
    /// # Errors
    ///
    /// Only the CSV and JSON modes can fail, on serialization errors.
    pub fn render(&self, options: &OutputOptions) -> Result<String> {
        match options.mode {
            OutputMode::Markdown => Ok(self.render_markdown()),
            OutputMode::Csv => self.render_csv(),
            OutputMode::Json => self.render_json(),
            OutputMode::Auto | OutputMode::Term | OutputMode::Text | OutputMode::TermDebug => {
                Ok(self.render_text(options))
            }
        }
    }

    /// Groups visible positions into runs covered by the same spanner.
    fn spanner_bands(&self, visible: &[usize]) -> Vec<(usize, usize, Option<usize>)> {
        let owner = |idx: usize| {
            self.spanners
                .iter()
                .position(|s| s.columns.contains(&self.columns[idx].id))
        };
        let mut bands: Vec<(usize, usize, Option<usize>)> = Vec::new();
        for (pos, &idx) in visible.iter().enumerate() {
            let spanner = owner(idx);
            match bands.last_mut() {
                Some(band) if band.2 == spanner && spanner.is_some() => band.1 = pos,
                _ => bands.push((pos, pos, spanner)),
            }
        }
        bands
    }

    fn render_text(&self, options: &OutputOptions) -> String {
        let visible = self.visible_indices();
        let headers: Vec<String> = visible.iter().map(|&i| self.header_text(i)).collect();
        let body: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|row| visible.iter().map(|&i| row[i].display_text()).collect())
            .collect();

        let mut widths: Vec<usize> = headers.iter().map(|h| display_width(h)).collect();
        for row in &body {
            for (width, text) in widths.iter_mut().zip(row) {
                *width = (*width).max(display_width(text));
            }
        }

        let sep_width = display_width(SEPARATOR);
        let bands = if self.spanners.is_empty() {
            Vec::new()
        } else {
            self.spanner_bands(&visible)
        };
        for &(start, end, spanner) in &bands {
            if let Some(s) = spanner {
                let combined: usize =
                    widths[start..=end].iter().sum::<usize>() + sep_width * (end - start);
                let needed = display_width(&self.spanners[s].text);
                if needed > combined {
                    widths[end] += needed - combined;
                }
            }
        }

        let inner_width =
            widths.iter().sum::<usize>() + sep_width * widths.len().saturating_sub(1);
        let chars = options.border.chars();
        let wrap_row = |content: String| match chars {
            Some(c) => format!("{} {} {}", c.vertical, content, c.vertical),
            None => content,
        };

        let mut lines = Vec::new();
        if let Some(caption) = &self.caption {
            lines.push(stylize(caption.clone(), &["caption"], options));
        }
        if let Some(c) = chars {
            lines.push(c.line(LineType::Top, inner_width + 2));
        }
        if !bands.is_empty() {
            let cells: Vec<String> = bands
                .iter()
                .map(|&(start, end, spanner)| {
                    let combined: usize =
                        widths[start..=end].iter().sum::<usize>() + sep_width * (end - start);
                    let text = spanner.map(|s| self.spanners[s].text.as_str()).unwrap_or("");
                    let padded = pad_center(text, combined);
                    if spanner.is_some() {
                        stylize(padded, &["header"], options)
                    } else {
                        padded
                    }
                })
                .collect();
            lines.push(wrap_row(cells.join(SEPARATOR)));
        }

        let header_cells: Vec<String> = visible
            .iter()
            .enumerate()
            .map(|(pos, &idx)| {
                let padded = pad_aligned(&headers[pos], widths[pos], self.columns[idx].align);
                stylize(padded, &["header"], options)
            })
            .collect();
        lines.push(wrap_row(header_cells.join(SEPARATOR)));
        if let Some(c) = chars {
            lines.push(c.line(LineType::Middle, inner_width + 2));
        }

        for (row_idx, row) in body.iter().enumerate() {
            let cells: Vec<String> = visible
                .iter()
                .enumerate()
                .map(|(pos, &idx)| {
                    let padded = pad_aligned(&row[pos], widths[pos], self.columns[idx].align);
                    let names: Vec<&str> = self.rows[row_idx][idx]
                        .emphasis
                        .iter()
                        .map(|e| e.style_name())
                        .collect();
                    stylize(padded, &names, options)
                })
                .collect();
            lines.push(wrap_row(cells.join(SEPARATOR)));
        }

        if let Some(c) = chars {
            lines.push(c.line(LineType::Bottom, inner_width + 2));
        }
        for footnote in &self.footnotes {
            lines.push(stylize(Self::footnote_line(footnote), &["footnote"], options));
        }

        // Trailing padding is noise in borderless output.
        if chars.is_none() {
            for line in &mut lines {
                let trimmed = line.trim_end().len();
                line.truncate(trimmed);
            }
        }
        lines.join("\n")
    }

    fn render_markdown(&self) -> String {
        let visible = self.visible_indices();
        let mut lines = Vec::new();
        if let Some(caption) = &self.caption {
            lines.push(format!("**{}**", escape_markdown(caption)));
            lines.push(String::new());
        }

        let headers: Vec<String> = visible
            .iter()
            .map(|&i| escape_markdown(&self.header_text(i)))
            .collect();
        lines.push(format!("| {} |", headers.join(" | ")));
        let rule: Vec<&str> = visible
            .iter()
            .map(|&i| match self.columns[i].align {
                Align::Left => ":---",
                Align::Center => ":---:",
                Align::Right => "---:",
            })
            .collect();
        lines.push(format!("| {} |", rule.join(" | ")));

        for row in &self.rows {
            let cells: Vec<String> = visible
                .iter()
                .map(|&i| {
                    let cell = &row[i];
                    if cell.text.is_empty() {
                        return String::new();
                    }
                    let mut text = escape_markdown(&cell.text);
                    if cell.emphasis.contains(&Emphasis::Italic) {
                        text = format!("*{}*", text);
                    }
                    if cell.emphasis.contains(&Emphasis::Bold) {
                        text = format!("**{}**", text);
                    }
                    format!("{}{}", "&nbsp;".repeat(cell.indent), text)
                })
                .collect();
            lines.push(format!("| {} |", cells.join(" | ")));
        }

        if !self.footnotes.is_empty() {
            lines.push(String::new());
            for footnote in &self.footnotes {
                lines.push(escape_markdown(&Self::footnote_line(footnote)));
            }
        }
        lines.join("\n")
    }

    fn render_csv(&self) -> Result<String> {
        let visible = self.visible_indices();
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(visible.iter().map(|&i| self.columns[i].header.as_str()))?;
        for row in &self.rows {
            writer.write_record(visible.iter().map(|&i| row[i].text.as_str()))?;
        }
        let bytes = writer.into_inner()?;
        Ok(String::from_utf8(bytes)?)
    }

    fn render_json(&self) -> Result<String> {
        #[derive(Serialize)]
        struct JsonColumn<'a> {
            id: &'a str,
            header: &'a str,
            align: Align,
        }

        #[derive(Serialize)]
        struct JsonGrid<'a> {
            caption: Option<&'a str>,
            columns: Vec<JsonColumn<'a>>,
            rows: Vec<Vec<&'a str>>,
            spanners: &'a [Spanner],
            footnotes: &'a [Footnote],
        }

        let visible = self.visible_indices();
        let view = JsonGrid {
            caption: self.caption.as_deref(),
            columns: visible
                .iter()
                .map(|&i| JsonColumn {
                    id: &self.columns[i].id,
                    header: &self.columns[i].header,
                    align: self.columns[i].align,
                })
                .collect(),
            rows: self
                .rows
                .iter()
                .map(|row| visible.iter().map(|&i| row[i].text.as_str()).collect())
                .collect(),
            spanners: &self.spanners,
            footnotes: &self.footnotes,
        };
        Ok(serde_json::to_string_pretty(&view)?)
    }
}

impl fmt::Display for Grid {
    /// Plain text with light borders.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render_text(&OutputOptions::default()))
    }
}

/// Applies named theme styles (outermost first) according to the mode.
fn stylize(text: String, names: &[&str], options: &OutputOptions) -> String {
    if names.is_empty() || text.trim().is_empty() {
        return text;
    }
    if options.mode.is_debug() {
        return names
            .iter()
            .rev()
            .fold(text, |acc, name| format!("[{}]{}[/{}]", name, acc, name));
    }
    if options.mode.should_use_color() {
        return names
            .iter()
            .rev()
            .fold(text, |acc, name| match options.theme.style(name) {
                Some(style) => style
                    .clone()
                    .force_styling(true)
                    .apply_to(acc)
                    .to_string(),
                None => acc,
            });
    }
    text
}

fn escape_markdown(text: &str) -> String {
    text.replace('|', "\\|")
}

/// Replaces occurrences of `from` that are not part of a longer word.
fn replace_word(text: &str, from: &str, to: &str) -> String {
    if from.is_empty() {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    let mut previous: Option<char> = None;
    while let Some(pos) = rest.find(from) {
        let before = rest[..pos].chars().next_back().or(previous);
        let after = rest[pos + from.len()..].chars().next();
        out.push_str(&rest[..pos]);
        let is_word = |c: Option<char>| c.is_some_and(char::is_alphanumeric);
        if is_word(before) || is_word(after) {
            out.push_str(from);
        } else {
            out.push_str(to);
        }
        previous = from.chars().next_back();
        rest = &rest[pos + from.len()..];
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::border::BorderStyle;

    fn sample() -> Grid {
        Grid::from_source(GridSource {
            columns: vec!["label".into(), "stat_1".into(), "stat_2".into()],
            rows: vec![
                vec!["Age".into(), "47 (38, 57)".into(), "46 (37, 59)".into()],
                vec!["Grade".into(), String::new(), String::new()],
                vec!["I".into(), "35 (36%)".into(), "33 (32%)".into()],
            ],
        })
    }

    fn plain() -> OutputOptions {
        OutputOptions::text(BorderStyle::None)
    }

    #[test]
    fn headers_default_to_ids() {
        let grid = sample();
        assert_eq!(grid.column("stat_1").unwrap().header, "stat_1");
        assert_eq!(grid.num_rows(), 3);
        assert_eq!(grid.num_columns(), 3);
    }

    #[test]
    fn short_rows_are_padded() {
        let grid = Grid::from_source(GridSource {
            columns: vec!["a".into(), "b".into()],
            rows: vec![vec!["x".into()]],
        });
        assert_eq!(grid.cell(0, "b").unwrap().text, "");
    }

    #[test]
    fn label_columns() {
        let mut grid = sample();
        grid.apply(&Directive::LabelColumns {
            labels: vec![("stat_1".into(), "Drug A".into())],
        })
        .unwrap();
        assert_eq!(grid.column("stat_1").unwrap().header, "Drug A");
    }

    #[test]
    fn unknown_column_leaves_grid_unchanged() {
        let mut grid = sample();
        let before = grid.clone();
        let err = grid
            .apply(&Directive::LabelColumns {
                labels: vec![
                    ("stat_1".into(), "Drug A".into()),
                    ("nope".into(), "X".into()),
                ],
            })
            .unwrap_err();
        assert!(matches!(err, RenderError::UnknownColumn(ref c) if c == "nope"));
        assert_eq!(grid, before);
    }

    #[test]
    fn row_out_of_range() {
        let mut grid = sample();
        let err = grid
            .apply(&Directive::Emphasize {
                rows: vec![7],
                columns: vec!["label".into()],
                emphasis: Emphasis::Bold,
            })
            .unwrap_err();
        assert!(matches!(err, RenderError::RowOutOfRange { row: 7, rows: 3 }));
    }

    #[test]
    fn indent_and_emphasis() {
        let mut grid = sample();
        grid.apply(&Directive::IndentRows {
            rows: vec![2],
            column: "label".into(),
            indent: 4,
        })
        .unwrap();
        grid.apply(&Directive::Emphasize {
            rows: vec![0, 1],
            columns: vec!["label".into()],
            emphasis: Emphasis::Bold,
        })
        .unwrap();
        assert_eq!(grid.cell(2, "label").unwrap().indent, 4);
        assert!(grid
            .cell(0, "label")
            .unwrap()
            .emphasis
            .contains(&Emphasis::Bold));

        let text = grid.render(&plain()).unwrap();
        assert!(text.lines().any(|l| l.starts_with("    I")));
    }

    #[test]
    fn hidden_columns_are_not_written() {
        let mut grid = sample();
        grid.apply(&Directive::HideColumns {
            columns: vec!["stat_2".into()],
        })
        .unwrap();
        let text = grid.render(&plain()).unwrap();
        assert!(!text.contains("stat_2"));
        assert!(!text.contains("46 (37, 59)"));
        assert_eq!(grid.visible_columns().len(), 2);
    }

    #[test]
    fn footnote_marks_headers() {
        let mut grid = sample();
        grid.apply(&Directive::Footnote {
            columns: vec!["stat_1".into(), "stat_2".into()],
            text: "Median (Q1, Q3)".into(),
        })
        .unwrap();
        grid.apply(&Directive::Footnote {
            columns: vec![],
            text: "Source: trial data".into(),
        })
        .unwrap();
        grid.apply(&Directive::Footnote {
            columns: vec!["stat_2".into()],
            text: "Second".into(),
        })
        .unwrap();

        let text = grid.render(&plain()).unwrap();
        assert!(text.contains("stat_1¹"));
        assert!(text.contains("stat_2¹,²"));
        assert!(text.contains("¹ Median (Q1, Q3)"));
        assert!(text.contains("² Second"));
        assert!(text.lines().any(|l| l == "Source: trial data"));
    }

    #[test]
    fn replace_text_in_columns() {
        let mut grid = Grid::from_source(GridSource {
            columns: vec!["label".into(), "stat_0".into()],
            rows: vec![vec!["NA".into(), "NA".into()]],
        });
        grid.apply(&Directive::ReplaceText {
            columns: vec!["stat_0".into()],
            from: "NA".into(),
            to: "n/a".into(),
        })
        .unwrap();
        assert_eq!(grid.cell(0, "stat_0").unwrap().text, "n/a");
        assert_eq!(grid.cell(0, "label").unwrap().text, "NA");
    }

    #[test]
    fn replace_text_inside_composite_cells() {
        let mut grid = Grid::from_source(GridSource {
            columns: vec!["stat_1".into(), "stat_2".into(), "stat_3".into()],
            rows: vec![vec!["NA (NA, NA)".into(), "0 (NA%)".into(), "NAB 3.0 (NA)".into()]],
        });
        grid.apply(&Directive::ReplaceText {
            columns: vec!["stat_1".into(), "stat_2".into(), "stat_3".into()],
            from: "NA".into(),
            to: "-".into(),
        })
        .unwrap();
        assert_eq!(grid.cell(0, "stat_1").unwrap().text, "- (-, -)");
        assert_eq!(grid.cell(0, "stat_2").unwrap().text, "0 (-%)");
        assert_eq!(grid.cell(0, "stat_3").unwrap().text, "NAB 3.0 (-)");
    }

    #[test]
    fn bordered_layout() {
        let grid = sample();
        let text = grid.render(&OutputOptions::text(BorderStyle::Light)).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        // top, header, separator, 3 rows, bottom
        assert_eq!(lines.len(), 7);
        assert!(lines[0].starts_with('┌'));
        assert!(lines[1].starts_with('│'));
        assert!(lines[2].starts_with('├'));
        assert!(lines[6].starts_with('└'));
        let widths: Vec<usize> = lines.iter().map(|l| display_width(l)).collect();
        assert!(widths.iter().all(|&w| w == widths[0]));
    }

    #[test]
    fn spanner_row_above_headers() {
        let mut grid = sample();
        grid.apply(&Directive::SpanningHeader {
            columns: vec!["stat_1".into(), "stat_2".into()],
            text: "Treatment".into(),
        })
        .unwrap();
        let text = grid.render(&plain()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[0].contains("Treatment"));
        assert!(lines[1].contains("stat_1"));
        assert_eq!(grid.spanners().len(), 1);
    }

    #[test]
    fn caption_first() {
        let mut grid = sample();
        grid.apply(&Directive::Caption {
            text: "Table 1. Baseline".into(),
        })
        .unwrap();
        let text = grid.render(&plain()).unwrap();
        assert_eq!(text.lines().next(), Some("Table 1. Baseline"));
    }

    #[test]
    fn debug_mode_tags() {
        let mut grid = sample();
        grid.apply(&Directive::Emphasize {
            rows: vec![0],
            columns: vec!["label".into()],
            emphasis: Emphasis::Bold,
        })
        .unwrap();
        let text = grid
            .render(&OutputOptions::text(BorderStyle::None).mode(OutputMode::TermDebug))
            .unwrap();
        assert!(text.contains("[bold]Age"));
        assert!(text.contains("[header]label"));
    }

    #[test]
    fn term_mode_emits_ansi() {
        let mut grid = sample();
        grid.apply(&Directive::Emphasize {
            rows: vec![0],
            columns: vec!["label".into()],
            emphasis: Emphasis::Italic,
        })
        .unwrap();
        let text = grid
            .render(&OutputOptions::default().mode(OutputMode::Term))
            .unwrap();
        assert!(text.contains("\x1b["));
    }

    #[test]
    fn markdown_output() {
        let mut grid = sample();
        grid.apply(&Directive::AlignColumns {
            columns: vec!["stat_1".into(), "stat_2".into()],
            align: Align::Center,
        })
        .unwrap();
        grid.apply(&Directive::Emphasize {
            rows: vec![1],
            columns: vec!["label".into()],
            emphasis: Emphasis::Bold,
        })
        .unwrap();
        grid.apply(&Directive::IndentRows {
            rows: vec![2],
            column: "label".into(),
            indent: 2,
        })
        .unwrap();
        let md = grid
            .render(&OutputOptions::default().mode(OutputMode::Markdown))
            .unwrap();
        let lines: Vec<&str> = md.lines().collect();
        assert_eq!(lines[0], "| label | stat_1 | stat_2 |");
        assert_eq!(lines[1], "| :--- | :---: | :---: |");
        assert_eq!(lines[3], "| **Grade** |  |  |");
        assert_eq!(lines[4], "| &nbsp;&nbsp;I | 35 (36%) | 33 (32%) |");
    }

    #[test]
    fn csv_output() {
        let grid = sample();
        let csv = grid
            .render(&OutputOptions::default().mode(OutputMode::Csv))
            .unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "label,stat_1,stat_2");
        assert_eq!(lines[1], "Age,\"47 (38, 57)\",\"46 (37, 59)\"");
    }

    #[test]
    fn json_output() {
        let mut grid = sample();
        grid.apply(&Directive::Caption {
            text: "Table 1".into(),
        })
        .unwrap();
        let json = grid
            .render(&OutputOptions::default().mode(OutputMode::Json))
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["caption"], "Table 1");
        assert_eq!(value["columns"][1]["id"], "stat_1");
        assert_eq!(value["rows"][0][0], "Age");
        assert_eq!(value["rows"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn display_uses_light_border() {
        let text = sample().to_string();
        assert!(text.starts_with('┌'));
    }
}
