//! cssexpr - typed evaluation of animation CSS values
//!
//! This library provides functionality to:
//! - Model CSS values (`calc()`, `var()`, units, function calls) as a typed tree
//! - Resolve a tree against an environment (viewport, fonts, element box, variables)
//! - Serialize the resolved tree back to CSS text
//!
//! Parsing CSS text into a [`Node`] tree is left to the caller.

mod calc;
pub mod config;
pub mod context;
pub mod error;
pub mod node;
pub mod resolve;
pub mod scan;
pub mod static_context;
pub mod units;

pub use context::{Dimension, DimensionStack, EvalContext, EvalScope, Size};
pub use error::{ExprError, Result};
pub use node::Node;
pub use resolve::{resolve, resolve_in_scope, Resolved};
pub use static_context::{StaticContext, UrlPolicy};
