//! In-memory evaluation context
//!
//! [`StaticContext`] answers every [`EvalContext`] query from fixed values:
//! a snapshot of the viewport, the element box, font sizes and a registry of
//! custom properties. Hosts that don't have a live document (offline
//! rendering, tests, tooling) can build one directly or from a
//! [`ContextConfig`](crate::config::ContextConfig).
//!
//! # Example
//!
//! ```
//! use cssexpr::node::Node;
//! use cssexpr::{EvalContext, StaticContext};
//!
//! let ctx = StaticContext::new()
//!     .define("--spin", Node::angle(1.0, "turn"))
//!     .define("gap", Node::length(4.0, "px"));
//!
//! assert!(ctx.get_var("--spin").is_some());
//! assert!(ctx.get_var("--gap").is_some()); // `--` is added when missing
//! ```

use std::collections::HashMap;

use tracing::debug;
use url::Url;

use crate::context::{EvalContext, Size};
use crate::error::{ExprError, Result};
use crate::node::Node;

/// Default font size (`medium`) in px
pub const DEFAULT_FONT_SIZE: f64 = 16.0;

/// Rules applied to `url()` values.
///
/// Absolute URLs are taken as-is, relative ones are joined onto `base`.
/// The result must be `https:` or `data:` unless `allow_insecure` is set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UrlPolicy {
    pub base: Option<Url>,
    pub allow_insecure: bool,
}

impl UrlPolicy {
    pub fn resolve(&self, raw: &str) -> Result<String> {
        let reject = |reason: &str| ExprError::UrlRejected {
            url: raw.to_string(),
            reason: reason.to_string(),
        };

        let url = match Url::parse(raw) {
            Ok(url) => url,
            Err(url::ParseError::RelativeUrlWithoutBase) => match &self.base {
                Some(base) => base.join(raw).map_err(|e| reject(&e.to_string()))?,
                None => return Err(reject("relative url without a base")),
            },
            Err(e) => return Err(reject(&e.to_string())),
        };

        match url.scheme() {
            "https" | "data" => Ok(url.into()),
            _ if self.allow_insecure => Ok(url.into()),
            scheme => {
                debug!(url = raw, scheme, "url rejected by policy");
                Err(reject(&format!("{} urls are not allowed", scheme)))
            }
        }
    }
}

/// Context with fixed environment values and a variable registry.
#[derive(Debug, Clone)]
pub struct StaticContext {
    viewport: Size,
    element: Size,
    font_size: f64,
    root_font_size: f64,
    index: usize,
    /// Normalized name (`--x`) -> value
    vars: HashMap<String, Node>,
    urls: UrlPolicy,
}

impl Default for StaticContext {
    fn default() -> Self {
        Self {
            viewport: Size::default(),
            element: Size::default(),
            font_size: DEFAULT_FONT_SIZE,
            root_font_size: DEFAULT_FONT_SIZE,
            index: 0,
            vars: HashMap::new(),
            urls: UrlPolicy::default(),
        }
    }
}

impl StaticContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_viewport(mut self, viewport: Size) -> Self {
        self.viewport = viewport;
        self
    }

    pub fn with_element_size(mut self, element: Size) -> Self {
        self.element = element;
        self
    }

    pub fn with_font_size(mut self, px: f64) -> Self {
        self.font_size = px;
        self
    }

    pub fn with_root_font_size(mut self, px: f64) -> Self {
        self.root_font_size = px;
        self
    }

    pub fn with_index(mut self, index: usize) -> Self {
        self.index = index;
        self
    }

    pub fn with_url_policy(mut self, urls: UrlPolicy) -> Self {
        self.urls = urls;
        self
    }

    /// Join relative `url()` values onto `base`.
    pub fn with_base_url(mut self, base: &str) -> Result<Self> {
        let url = Url::parse(base).map_err(|e| ExprError::UrlRejected {
            url: base.to_string(),
            reason: e.to_string(),
        })?;
        self.urls.base = Some(url);
        Ok(self)
    }

    /// Define a custom property, builder style.
    pub fn define(mut self, name: &str, value: Node) -> Self {
        self.set_var(name, value);
        self
    }

    /// Define or replace a custom property.
    ///
    /// Names are normalized to carry a leading `--`.
    pub fn set_var(&mut self, name: &str, value: Node) {
        self.vars.insert(normalize_name(name), value);
    }

    pub fn remove_var(&mut self, name: &str) -> Option<Node> {
        self.vars.remove(&normalize_name(name))
    }

    pub fn contains_var(&self, name: &str) -> bool {
        self.vars.contains_key(&normalize_name(name))
    }

    /// Iterate over all defined variables
    pub fn vars(&self) -> impl Iterator<Item = (&String, &Node)> {
        self.vars.iter()
    }

    pub fn url_policy(&self) -> &UrlPolicy {
        &self.urls
    }
}

/// Normalize a custom property name to always have the `--` prefix
fn normalize_name(name: &str) -> String {
    let trimmed = name.trim();
    if trimmed.starts_with("--") {
        trimmed.to_string()
    } else {
        format!("--{}", trimmed)
    }
}

impl EvalContext for StaticContext {
    fn resolve_url(&self, url: &str) -> Result<String> {
        self.urls.resolve(url)
    }

    fn get_var(&self, name: &str) -> Option<Node> {
        self.vars.get(&normalize_name(name)).cloned()
    }

    fn current_font_size(&self) -> f64 {
        self.font_size
    }

    fn root_font_size(&self) -> f64 {
        self.root_font_size
    }

    fn viewport_size(&self) -> Size {
        self.viewport
    }

    fn current_element_size(&self) -> Size {
        self.element
    }

    fn current_index(&self) -> usize {
        self.index
    }
}
