//! Deferred, named render calls.
//!
//! Building a summary never draws anything. Presentation is recorded as an
//! ordered list of [`RenderCall`]s, each a [`Directive`] under a stable name.
//! Add-ons append calls or replace them by name; callers can insert their
//! own calls relative to an existing one, and leave calls out at render
//! time:
//!
//! ```text
//! TableBody ──bootstrap──▶ backend
//!   → cols_label
//!   → cols_align
//!   → indent_levels
//!   → footnote_stat
//!   → ... (add-on and formatting calls, in order)
//!   → finish ──▶ Grid
//! ```
//!
//! The pipeline is never reordered implicitly: replacing a call keeps its
//! position.

use std::collections::HashSet;

use statgrid_render::{Backend, Directive, GridSource, Region};

use crate::error::{Result, StatgridError};

/// One named render step.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderCall {
    name: String,
    target: Region,
    directive: Directive,
}

impl RenderCall {
    /// Creates a call; the target region follows from the directive.
    pub fn new(name: impl Into<String>, directive: Directive) -> Self {
        RenderCall {
            name: name.into(),
            target: directive.region(),
            directive,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn target(&self) -> Region {
        self.target
    }

    pub fn directive(&self) -> &Directive {
        &self.directive
    }
}

/// Ordered render calls with unique names.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RenderPipeline {
    calls: Vec<RenderCall>,
}

impl RenderPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a call, or replaces the call of the same name in place.
    pub fn push(&mut self, call: RenderCall) {
        match self.index_of(call.name()) {
            Some(idx) => {
                tracing::debug!(call = call.name(), position = idx, "replacing render call");
                self.calls[idx] = call;
            }
            None => {
                tracing::debug!(call = call.name(), "appending render call");
                self.calls.push(call);
            }
        }
    }

    /// Inserts a call right after `anchor`. A call of the same name is moved.
    ///
    /// # Errors
    ///
    /// [`StatgridError::UnknownAnchor`] when `anchor` is not in the pipeline.
    pub fn insert_after(&mut self, anchor: &str, call: RenderCall) -> Result<()> {
        self.insert_relative(anchor, call, 1)
    }

    /// Inserts a call right before `anchor`. A call of the same name is moved.
    ///
    /// # Errors
    ///
    /// [`StatgridError::UnknownAnchor`] when `anchor` is not in the pipeline.
    pub fn insert_before(&mut self, anchor: &str, call: RenderCall) -> Result<()> {
        self.insert_relative(anchor, call, 0)
    }

    fn insert_relative(&mut self, anchor: &str, call: RenderCall, offset: usize) -> Result<()> {
        if !self.contains(anchor) {
            return Err(StatgridError::UnknownAnchor(anchor.to_string()));
        }
        if call.name() == anchor {
            self.push(call);
            return Ok(());
        }
        self.remove(call.name());
        let idx = self
            .index_of(anchor)
            .ok_or_else(|| StatgridError::UnknownAnchor(anchor.to_string()))?
            + offset;
        tracing::debug!(call = call.name(), anchor, position = idx, "inserting render call");
        self.calls.insert(idx, call);
        Ok(())
    }

    /// Removes and returns the call named `name`.
    pub fn remove(&mut self, name: &str) -> Option<RenderCall> {
        self.index_of(name).map(|idx| self.calls.remove(idx))
    }

    pub fn get(&self, name: &str) -> Option<&RenderCall> {
        self.calls.iter().find(|c| c.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index_of(name).is_some()
    }

    fn index_of(&self, name: &str) -> Option<usize> {
        self.calls.iter().position(|c| c.name == name)
    }

    /// Call names in execution order.
    pub fn names(&self) -> Vec<&str> {
        self.calls.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RenderCall> {
        self.calls.iter()
    }

    pub fn len(&self) -> usize {
        self.calls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }

    /// Bootstraps `backend` with `source` and applies every call whose name
    /// is not in `omit`.
    ///
    /// Names in `omit` that match no call are ignored.
    ///
    /// # Errors
    ///
    /// Backend errors, unchanged.
    pub fn execute<B: Backend>(
        &self,
        mut backend: B,
        source: GridSource,
        omit: &[&str],
    ) -> Result<B::Output> {
        let omit: HashSet<&str> = omit.iter().copied().collect();
        for name in &omit {
            if !self.contains(name) {
                tracing::debug!(call = *name, "omitted render call is not in the pipeline");
            }
        }

        backend.bootstrap(source)?;
        for call in &self.calls {
            if omit.contains(call.name()) {
                tracing::trace!(call = call.name(), "skipping omitted render call");
                continue;
            }
            tracing::trace!(
                call = call.name(),
                directive = call.directive().kind(),
                "executing render call"
            );
            backend.apply(call.directive())?;
        }
        Ok(backend.finish()?)
    }
}

impl<'a> IntoIterator for &'a RenderPipeline {
    type Item = &'a RenderCall;
    type IntoIter = std::slice::Iter<'a, RenderCall>;

    fn into_iter(self) -> Self::IntoIter {
        self.calls.iter()
    }
}
