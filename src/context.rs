//! Evaluation context and the dimension stack
//!
//! The evaluator never touches a DOM. Everything environment-dependent
//! (fonts, viewport, element box, custom properties, URL policy) is asked of
//! an [`EvalContext`] supplied by the host.
//!
//! Percentages inside multi-argument functions need to know which axis they
//! belong to: `translate(50%, 50%)` resolves the first argument against the
//! element width and the second against its height. That is tracked by a
//! [`DimensionStack`], which lives in the per-call [`EvalScope`] rather than
//! on the context so the same context can serve independent resolutions.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::Result;
use crate::node::Node;

/// Axis tag scoping percentage resolution to one function argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    /// Element width (`w`)
    W,
    /// Element height (`h`)
    H,
    /// Depth (`z`); elements have no depth box, so percentages resolve to 0
    Z,
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            Dimension::W => "w",
            Dimension::H => "h",
            Dimension::Z => "z",
        };
        f.write_str(tag)
    }
}

/// Width/height pair in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Host-provided facts the evaluator depends on.
///
/// All methods are synchronous and assumed cheap; the evaluator may call
/// them any number of times during one resolution.
pub trait EvalContext {
    /// Resolve a raw `url()` value into one that is safe to use.
    ///
    /// The returned string is trusted and never resolved again. Hosts
    /// refuse a URL by returning [`crate::ExprError::UrlRejected`].
    fn resolve_url(&self, url: &str) -> Result<String>;

    /// Look up a custom property (`--name`).
    fn get_var(&self, name: &str) -> Option<Node>;

    /// Computed font size of the current element, in px.
    fn current_font_size(&self) -> f64;

    /// Font size of the root element, in px.
    fn root_font_size(&self) -> f64;

    fn viewport_size(&self) -> Size;

    fn current_element_size(&self) -> Size;

    /// Index of the current animation target among all targets.
    fn current_index(&self) -> usize {
        0
    }
}

/// Stack of axis tags for the function arguments currently being resolved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DimensionStack {
    dims: Vec<Dimension>,
}

impl DimensionStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Innermost axis, if any argument is being resolved.
    pub fn top(&self) -> Option<Dimension> {
        self.dims.last().copied()
    }

    pub fn len(&self) -> usize {
        self.dims.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dims.is_empty()
    }

    pub(crate) fn push(&mut self, dim: Dimension) {
        self.dims.push(dim);
    }

    pub(crate) fn pop(&mut self) -> Option<Dimension> {
        self.dims.pop()
    }
}

/// Mutable state owned by a single resolution pass.
#[derive(Debug, Clone, Default)]
pub struct EvalScope {
    /// Axis tags of the enclosing function arguments
    pub dims: DimensionStack,
    /// Current `var()` nesting depth
    pub(crate) var_depth: usize,
}

impl EvalScope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dimension(&self) -> Option<Dimension> {
        self.dims.top()
    }

    /// Run `f` with `dim` pushed, popping it afterwards on every path.
    ///
    /// `None` runs `f` without touching the stack, so untagged arguments
    /// inherit the enclosing axis.
    pub fn with_dimension<R>(
        &mut self,
        dim: Option<Dimension>,
        f: impl FnOnce(&mut Self) -> R,
    ) -> R {
        match dim {
            Some(dim) => {
                self.dims.push(dim);
                let out = f(self);
                self.dims.pop();
                out
            }
            None => f(self),
        }
    }
}
