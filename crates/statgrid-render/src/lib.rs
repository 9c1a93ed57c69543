//! # Statgrid Render - Directive-Driven Table Output
//!
//! `statgrid-render` turns raw cell text plus an ordered list of
//! presentational [`Directive`]s into a [`Grid`], and writes that grid as a
//! styled terminal table, plain text, Markdown, CSV, or JSON.
//!
//! This crate is the rendering backend for `statgrid`, but it knows nothing
//! about statistics: any producer that can describe its table as column ids,
//! rows of strings, and directives can use it.
//!
//! ## Core Concepts
//!
//! - [`GridSource`]: Column ids and raw cell text handed over at bootstrap
//! - [`Directive`]: One instruction (relabel, align, hide, indent, emphasize,
//!   spanning header, footnote, caption, text replacement)
//! - [`Backend`]: The bootstrap / apply / finish seam; [`GridBackend`] is the
//!   default implementation
//! - [`OutputMode`]: Auto/Term/Text/TermDebug/Markdown/Csv/Json
//! - [`Theme`]: Named [`console::Style`]s used for terminal output
//!
//! ## Quick Start
//!
//! ```rust
//! use statgrid_render::{Backend, BorderStyle, Directive, Emphasis, GridBackend, GridSource, OutputOptions};
//!
//! let mut backend = GridBackend::new();
//! backend.bootstrap(GridSource {
//!     columns: vec!["label".into(), "stat_0".into()],
//!     rows: vec![
//!         vec!["Grade".into(), String::new()],
//!         vec!["I".into(), "68 (34%)".into()],
//!     ],
//! }).unwrap();
//! backend.apply(&Directive::IndentRows { rows: vec![1], column: "label".into(), indent: 4 }).unwrap();
//! backend.apply(&Directive::Emphasize {
//!     rows: vec![0],
//!     columns: vec!["label".into()],
//!     emphasis: Emphasis::Bold,
//! }).unwrap();
//!
//! let grid = backend.finish().unwrap();
//! let text = grid.render(&OutputOptions::text(BorderStyle::None)).unwrap();
//! assert!(text.contains("    I"));
//! ```

mod backend;
mod border;
mod directive;
mod error;
mod grid;
pub mod output;
pub mod theme;
pub mod util;

pub use backend::{Backend, GridBackend, GridSource};
pub use border::BorderStyle;
pub use directive::{Align, Directive, Emphasis, Region};
pub use error::{RenderError, Result};
pub use grid::{Footnote, Grid, GridCell, GridColumn, Spanner};
pub use output::{OutputMode, OutputOptions};
pub use theme::Theme;
