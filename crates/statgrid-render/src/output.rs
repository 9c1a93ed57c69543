//! Output mode control for rendering.
//!
//! The [`OutputMode`] enum determines how a [`Grid`](crate::Grid) is
//! written: as a styled terminal table, plain text, debug tags, or one of the
//! document/structured formats.

use console::Term;
use serde::{Deserialize, Serialize};

use crate::border::BorderStyle;
use crate::theme::Theme;

/// Controls how output is rendered.
///
/// # Variants
///
/// - `Auto` - Styled terminal output when stdout supports colors, else plain text
/// - `Term` - Always include ANSI escape codes
/// - `Text` - Never include ANSI escape codes
/// - `TermDebug` - Render style names as bracket tags for debugging
/// - `Markdown` - Pipe table with `**bold**` / `*italic*` emphasis
/// - `Csv` - Visible headers and cell text only
/// - `Json` - Columns, rows, spanners, footnotes and caption as JSON
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputMode {
    #[default]
    Auto,
    Term,
    Text,
    TermDebug,
    Markdown,
    Csv,
    Json,
}

impl OutputMode {
    /// Resolves the output mode to a concrete decision about whether to use color.
    pub fn should_use_color(&self) -> bool {
        match self {
            OutputMode::Auto => Term::stdout().features().colors_supported(),
            OutputMode::Term => true,
            OutputMode::Text
            | OutputMode::TermDebug
            | OutputMode::Markdown
            | OutputMode::Csv
            | OutputMode::Json => false,
        }
    }

    /// Returns true if this is debug mode (bracket tags instead of ANSI).
    pub fn is_debug(&self) -> bool {
        matches!(self, OutputMode::TermDebug)
    }

    /// Returns true for the box-drawn text layouts (`Auto`, `Term`, `Text`,
    /// `TermDebug`).
    pub fn is_text_layout(&self) -> bool {
        matches!(
            self,
            OutputMode::Auto | OutputMode::Term | OutputMode::Text | OutputMode::TermDebug
        )
    }
}

/// Everything that shapes a written grid besides its content.
#[derive(Debug, Clone)]
pub struct OutputOptions {
    pub mode: OutputMode,
    pub border: BorderStyle,
    pub theme: Theme,
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            mode: OutputMode::Text,
            border: BorderStyle::Light,
            theme: Theme::default(),
        }
    }
}

impl OutputOptions {
    /// Plain text with the given border.
    pub fn text(border: BorderStyle) -> Self {
        Self {
            mode: OutputMode::Text,
            border,
            theme: Theme::default(),
        }
    }

    pub fn mode(mut self, mode: OutputMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn border(mut self, border: BorderStyle) -> Self {
        self.border = border;
        self
    }

    pub fn theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }
}
