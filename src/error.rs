//! Error types for expression evaluation
//!
//! Evaluation has two failure channels. A subtree with no defined value
//! (a missing `var()` without fallback, a division by zero) resolves to
//! `None` and is not an error. [`ExprError`] is reserved for input that was
//! never well-formed: mismatched `calc()` operands, units with no conversion,
//! URLs the host refuses.

use thiserror::Error;

use crate::units::NumericKind;

/// Fatal evaluation error.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum ExprError {
    /// A `calc()` operand resolved to something that isn't a number
    #[error("calc operands must both be numeric: {left} {op} {right}")]
    NonNumericOperand {
        left: String,
        op: char,
        right: String,
    },
    /// Operands of `+`/`-` have different kinds and neither is a percentage
    #[error("calc operands must be the same type: {left} {op} {right}")]
    IncompatibleOperands {
        left: NumericKind,
        op: char,
        right: NumericKind,
    },
    /// Neither side of `*` is a plain number
    #[error("one side of a multiplication must be a number: {left} * {right}")]
    MissingMultiplier { left: String, right: String },
    /// Right side of `/` is not a plain number
    #[error("denominator must be a number: {0}")]
    NonNumericDivisor(String),
    /// Units the evaluator has no conversion for (e.g. `cm` without DPI)
    #[error("unknown {kind} units: {units}")]
    UnknownUnits { kind: NumericKind, units: String },
    /// Text that isn't a single numeric token (`10px`, `50%`, `1.5`)
    #[error("invalid numeric literal: {0}")]
    InvalidLiteral(String),
    /// Percentages only resolve against lengths
    #[error("cannot calculate percent for {0}")]
    PercentUnsupported(NumericKind),
    /// `translate` suffix outside of `""`, `x`, `y`, `z`, `3d`
    #[error("unknown translate function: translate{0}")]
    UnknownTranslateSuffix(String),
    /// The host's URL policy refused a `url()` value
    #[error("url rejected: {url}: {reason}")]
    UrlRejected { url: String, reason: String },
    /// A `var()` chain nested deeper than [`crate::resolve::MAX_RESOLUTION_DEPTH`]
    #[error("maximum var() resolution depth exceeded at {0}")]
    MaxDepthExceeded(String),
}

/// Result type alias for evaluation operations.
pub type Result<T> = std::result::Result<T, ExprError>;
