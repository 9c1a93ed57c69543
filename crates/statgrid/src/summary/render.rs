//! Executing the render pipeline.

use std::fmt;

use statgrid_render::{Backend, BorderStyle, Grid, GridBackend, OutputMode, OutputOptions, Theme};

use crate::error::Result;

use super::Summary;

/// What to render and how to write it.
#[derive(Clone, Debug)]
pub struct RenderOptions {
    /// Render calls to skip, by name. Unknown names are ignored.
    pub omit: Vec<String>,
    pub mode: OutputMode,
    pub border: BorderStyle,
    pub theme: Theme,
}

impl Default for RenderOptions {
    fn default() -> Self {
        let output = OutputOptions::default();
        RenderOptions {
            omit: Vec::new(),
            mode: output.mode,
            border: output.border,
            theme: output.theme,
        }
    }
}

impl RenderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Skips the render call named `name`.
    pub fn omit(mut self, name: &str) -> Self {
        self.omit.push(name.to_string());
        self
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

    pub fn output_options(&self) -> OutputOptions {
        OutputOptions {
            mode: self.mode,
            border: self.border,
            theme: self.theme.clone(),
        }
    }
}

impl Summary {
    /// Runs the pipeline against any backend, skipping calls named in
    /// `omit`.
    ///
    /// Rendering does not change the summary and can be repeated.
    ///
    /// # Errors
    ///
    /// Backend errors, as [`StatgridError::Render`](crate::StatgridError::Render).
    #[tracing::instrument(skip_all, fields(calls = self.pipeline.len(), omitted = omit.len()))]
    pub fn render_with<B: Backend>(&self, backend: B, omit: &[&str]) -> Result<B::Output> {
        self.pipeline
            .execute(backend, self.body.to_grid_source(), omit)
    }

    /// Renders to a [`Grid`].
    pub fn render(&self, options: &RenderOptions) -> Result<Grid> {
        let omit: Vec<&str> = options.omit.iter().map(String::as_str).collect();
        self.render_with(GridBackend::new(), &omit)
    }

    /// Renders and writes the table in the options' output mode.
    pub fn render_text(&self, options: &RenderOptions) -> Result<String> {
        let grid = self.render(options)?;
        Ok(grid.render(&options.output_options())?)
    }
}

/// Executes a summary's render pipeline against `backend`, skipping the
/// calls named in `omit`. Same as [`Summary::render_with`].
pub fn render<B: Backend>(summary: &Summary, backend: B, omit: &[&str]) -> Result<B::Output> {
    summary.render_with(backend, omit)
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = self
            .render_text(&RenderOptions::default())
            .map_err(|_| fmt::Error)?;
        f.write_str(&text)
    }
}
