//! The backend seam.
//!
//! A producer drives a [`Backend`] in three steps: one [`bootstrap`] with
//! the raw cell text, any number of [`apply`] calls in order, then
//! [`finish`]. [`GridBackend`] is the default implementation and yields a
//! [`Grid`].
//!
//! [`bootstrap`]: Backend::bootstrap
//! [`apply`]: Backend::apply
//! [`finish`]: Backend::finish

use serde::{Deserialize, Serialize};

use crate::directive::Directive;
use crate::error::{RenderError, Result};
use crate::grid::Grid;

/// Raw table content handed to a backend at bootstrap.
///
/// `columns` holds column ids; each row holds one string per column.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GridSource {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// A rendering service that turns directives into a backend-native object.
pub trait Backend {
    /// What [`finish`](Backend::finish) produces.
    type Output;

    /// Initializes the backend object from raw content.
    fn bootstrap(&mut self, source: GridSource) -> Result<()>;

    /// Applies one directive.
    fn apply(&mut self, directive: &Directive) -> Result<()>;

    /// Consumes the backend and returns the rendered object.
    fn finish(self) -> Result<Self::Output>;
}

/// Default backend producing a [`Grid`].
#[derive(Debug, Default)]
pub struct GridBackend {
    grid: Option<Grid>,
}

impl GridBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Backend for GridBackend {
    type Output = Grid;

    fn bootstrap(&mut self, source: GridSource) -> Result<()> {
        self.grid = Some(Grid::from_source(source));
        Ok(())
    }

    fn apply(&mut self, directive: &Directive) -> Result<()> {
        self.grid
            .as_mut()
            .ok_or(RenderError::NotBootstrapped)?
            .apply(directive)
    }

    fn finish(self) -> Result<Grid> {
        self.grid.ok_or(RenderError::NotBootstrapped)
    }
}
