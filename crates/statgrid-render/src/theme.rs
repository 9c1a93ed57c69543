//! Named style collections for terminal output.
//!
//! A [`Theme`] maps style names to [`console::Style`]s. The grid asks for
//! `header`, `caption`, `footnote`, and one name per [`Emphasis`]
//! (`bold`, `italic`); names the theme does not define render unstyled.
//!
//! [`Emphasis`]: crate::Emphasis
//!
//! # From YAML
//!
//! ```rust
//! use statgrid_render::Theme;
//!
//! let theme = Theme::from_yaml(r#"
//! header:
//!   fg: cyan
//!   bold: true
//! footnote: dim
//! bold: "bold yellow"
//! "#).unwrap();
//! assert!(theme.style("header").is_some());
//! ```

use std::collections::HashMap;
use std::path::Path;

use console::{Color, Style};
use serde::Deserialize;

use crate::error::{RenderError, Result};

/// A named collection of styles used when writing styled terminal output.
#[derive(Debug, Clone)]
pub struct Theme {
    styles: HashMap<String, Style>,
}

impl Default for Theme {
    /// Header and caption bold, footnotes dimmed, plus `bold` and `italic`.
    fn default() -> Self {
        Self::new()
            .add("header", Style::new().bold())
            .add("caption", Style::new().bold())
            .add("footnote", Style::new().dim())
            .add("bold", Style::new().bold())
            .add("italic", Style::new().italic())
    }
}

impl Theme {
    /// Creates an empty theme.
    pub fn new() -> Self {
        Self {
            styles: HashMap::new(),
        }
    }

    /// Adds a named style, returning the updated theme for chaining.
    pub fn add(mut self, name: &str, style: Style) -> Self {
        self.styles.insert(name.to_string(), style);
        self
    }

    /// Looks up a style by name.
    pub fn style(&self, name: &str) -> Option<&Style> {
        self.styles.get(name)
    }

    /// Number of defined styles.
    pub fn len(&self) -> usize {
        self.styles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }

    /// Creates a theme from YAML content.
    ///
    /// Each entry is either a shorthand string of space-separated attributes
    /// and colors (`"bold cyan"`) or a map with `fg`, `bg`, `bold`, `italic`,
    /// `dim`, `underline`.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Theme`] on malformed YAML, unknown attributes, or
    /// unknown colors.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let raw: HashMap<String, StyleSpec> = serde_yaml::from_str(yaml)?;
        let mut theme = Theme::new();
        for (name, spec) in raw {
            let style = spec.into_style().map_err(|message| {
                RenderError::Theme(format!("style '{}': {}", name, message))
            })?;
            theme.styles.insert(name, style);
        }
        Ok(theme)
    }

    /// Loads a theme from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Io`] if the file cannot be read, or a
    /// [`RenderError::Theme`] if it cannot be parsed.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&content)
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StyleSpec {
    Shorthand(String),
    Attributes(StyleAttributes),
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct StyleAttributes {
    fg: Option<String>,
    bg: Option<String>,
    bold: bool,
    italic: bool,
    dim: bool,
    underline: bool,
}

impl StyleSpec {
    fn into_style(self) -> std::result::Result<Style, String> {
        match self {
            StyleSpec::Shorthand(text) => {
                let mut style = Style::new();
                for token in text.split_whitespace() {
                    style = match token {
                        "bold" => style.bold(),
                        "italic" => style.italic(),
                        "dim" => style.dim(),
                        "underline" => style.underlined(),
                        color => style.fg(parse_color(color)?),
                    };
                }
                Ok(style)
            }
            StyleSpec::Attributes(attrs) => {
                let mut style = Style::new();
                if let Some(fg) = attrs.fg {
                    style = style.fg(parse_color(&fg)?);
                }
                if let Some(bg) = attrs.bg {
                    style = style.bg(parse_color(&bg)?);
                }
                if attrs.bold {
                    style = style.bold();
                }
                if attrs.italic {
                    style = style.italic();
                }
                if attrs.dim {
                    style = style.dim();
                }
                if attrs.underline {
                    style = style.underlined();
                }
                Ok(style)
            }
        }
    }
}

fn parse_color(name: &str) -> std::result::Result<Color, String> {
    let color = match name.to_ascii_lowercase().as_str() {
        "black" => Color::Black,
        "red" => Color::Red,
        "green" => Color::Green,
        "yellow" => Color::Yellow,
        "blue" => Color::Blue,
        "magenta" => Color::Magenta,
        "cyan" => Color::Cyan,
        "white" => Color::White,
        other => match other.parse::<u8>() {
            Ok(index) => Color::Color256(index),
            Err(_) => return Err(format!("unknown color '{}'", name)),
        },
    };
    Ok(color)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_theme_styles() {
        let theme = Theme::default();
        for name in ["header", "caption", "footnote", "bold", "italic"] {
            assert!(theme.style(name).is_some(), "missing {}", name);
        }
    }

    #[test]
    fn add_and_lookup() {
        let theme = Theme::new().add("accent", Style::new().cyan());
        assert_eq!(theme.len(), 1);
        assert!(theme.style("accent").is_some());
        assert!(theme.style("missing").is_none());
    }

    #[test]
    fn from_yaml_shorthand_and_map() {
        let theme = Theme::from_yaml(
            r#"
header:
  fg: cyan
  bold: true
footnote: dim
bold: "bold 208"
"#,
        )
        .unwrap();
        assert_eq!(theme.len(), 3);
        let styled = theme
            .style("bold")
            .unwrap()
            .clone()
            .force_styling(true)
            .apply_to("x")
            .to_string();
        assert!(styled.contains("\x1b["));
    }

    #[test]
    fn from_yaml_unknown_color() {
        let err = Theme::from_yaml("header: chartreuse").unwrap_err();
        assert!(matches!(err, RenderError::Theme(_)));
        assert!(err.to_string().contains("chartreuse"));
    }

    #[test]
    fn from_yaml_unknown_attribute() {
        let err = Theme::from_yaml("header:\n  blink: true").unwrap_err();
        assert!(matches!(err, RenderError::Theme(_)));
    }

    #[test]
    fn from_file_reads_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("theme.yaml");
        std::fs::write(&path, "caption: italic\n").unwrap();
        let theme = Theme::from_file(&path).unwrap();
        assert!(theme.style("caption").is_some());
    }

    #[test]
    fn from_file_missing() {
        let err = Theme::from_file("/definitely/not/here.yaml").unwrap_err();
        assert!(matches!(err, RenderError::Io(_)));
    }
}
