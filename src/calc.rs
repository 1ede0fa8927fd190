//! `calc()` arithmetic
//!
//! Implements the CSS typing rules for the four operators:
//!
//! - `+`/`-` need operands of the same kind. A percentage may stand in for a
//!   length; it is converted against the element side selected by the
//!   current dimension. Differing units are normalized before combining.
//! - `*` needs one unitless operand, `/` a unitless divisor. The other
//!   operand supplies the result's kind and units.
//!
//! A result that isn't finite (division by zero, overflow) has no value and
//! resolves to `None`, like an invalid `calc()` in a stylesheet.

use std::borrow::Cow;

use tracing::debug;

use crate::context::{EvalContext, EvalScope};
use crate::error::{ExprError, Result};
use crate::node::{CalcProduct, CalcSum, Node, ProductOp, SumOp};
use crate::resolve::resolve_in_scope;
use crate::units::Numeric;

/// Both operands as numerics, or an error naming the offending expression.
fn numeric_operands(left: &Node, op: char, right: &Node) -> Result<(Numeric, Numeric)> {
    match (left, right) {
        (Node::Numeric(l), Node::Numeric(r)) => Ok((l.clone(), r.clone())),
        _ => Err(ExprError::NonNumericOperand {
            left: left.to_string(),
            op,
            right: right.to_string(),
        }),
    }
}

/// Resolve both sides; `None` if either has no value.
fn resolve_operands<'a>(
    left: &'a Node,
    right: &'a Node,
    ctx: &dyn EvalContext,
    scope: &mut EvalScope,
) -> Result<Option<(Cow<'a, Node>, Cow<'a, Node>)>> {
    let left = resolve_in_scope(left, ctx, scope)?;
    let right = resolve_in_scope(right, ctx, scope)?;
    Ok(left.zip(right))
}

pub(crate) fn evaluate_sum(
    sum: &CalcSum,
    ctx: &dyn EvalContext,
    scope: &mut EvalScope,
) -> Result<Option<Node>> {
    let Some((left, right)) = resolve_operands(sum.left(), sum.right(), ctx, scope)? else {
        return Ok(None);
    };
    let op = sum.op();
    let (mut left, mut right) = numeric_operands(&left, op.as_char(), &right)?;

    if left.kind() != right.kind() {
        if left.is_percent() {
            left = right.calc_percent(left.value(), ctx, scope.dimension())?;
        } else if right.is_percent() {
            right = left.calc_percent(right.value(), ctx, scope.dimension())?;
        } else {
            return Err(ExprError::IncompatibleOperands {
                left: left.kind(),
                op: op.as_char(),
                right: right.kind(),
            });
        }
    }

    if left.units() != right.units() {
        left = left.norm(ctx)?;
        right = right.norm(ctx)?;
    }

    let sign = match op {
        SumOp::Add => 1.0,
        SumOp::Sub => -1.0,
    };
    let value = left.value() + sign * right.value();
    if !value.is_finite() {
        debug!(left = %left, right = %right, "calc() sum is not finite");
        return Ok(None);
    }
    Ok(Some(Node::Numeric(left.with_value(value))))
}

pub(crate) fn evaluate_product(
    product: &CalcProduct,
    ctx: &dyn EvalContext,
    scope: &mut EvalScope,
) -> Result<Option<Node>> {
    let Some((left, right)) = resolve_operands(product.left(), product.right(), ctx, scope)? else {
        return Ok(None);
    };
    let op = product.op();
    let (left, right) = numeric_operands(&left, op.as_char(), &right)?;

    let (base, factor) = match op {
        ProductOp::Mul if left.is_count() => (right, left.value()),
        ProductOp::Mul if right.is_count() => (left, right.value()),
        ProductOp::Mul => {
            return Err(ExprError::MissingMultiplier {
                left: left.to_string(),
                right: right.to_string(),
            })
        }
        ProductOp::Div if right.is_count() => (left, 1.0 / right.value()),
        ProductOp::Div => return Err(ExprError::NonNumericDivisor(right.to_string())),
    };

    let value = base.value() * factor;
    if !value.is_finite() {
        debug!(base = %base, factor, "calc() product is not finite");
        return Ok(None);
    }
    Ok(Some(Node::Numeric(base.with_value(value))))
}
