//! Resolution driver
//!
//! [`resolve`] is the single entry point shared by every node kind: a
//! constant node comes back unchanged (borrowed, the very same node), any
//! other node is evaluated against the context into a new tree.
//!
//! `Ok(None)` means the expression has no value right now, e.g. a `var()`
//! with neither a binding nor a fallback. It poisons every enclosing
//! concatenation, function call and `calc()`, so callers should skip the
//! declaration. Malformed input is an [`ExprError`](crate::ExprError).
//!
//! # Example
//!
//! ```
//! use cssexpr::node::Node;
//! use cssexpr::{resolve, StaticContext};
//!
//! let ctx = StaticContext::new().define("--dist", Node::length(2.0, "rem"));
//! let node = Node::translate("y", vec![Node::var("--dist", None)]).unwrap();
//!
//! let resolved = resolve(&node, &ctx).unwrap().unwrap();
//! assert_eq!(resolved.serialize(), "translatey(2rem)");
//! ```

use std::borrow::Cow;

use tracing::{debug, trace};

use crate::calc;
use crate::context::{EvalContext, EvalScope};
use crate::error::{ExprError, Result};
use crate::node::{FuncCall, Node, VarRef};

/// Maximum `var()` nesting before resolution gives up
pub const MAX_RESOLUTION_DEPTH: usize = 100;

/// Outcome of resolving a node: `None` when it has no value.
pub type Resolved<'a> = Option<Cow<'a, Node>>;

/// Resolve `node` against `ctx` with a fresh scope.
#[tracing::instrument(level = "debug", skip_all, fields(css = %node))]
pub fn resolve<'a>(node: &'a Node, ctx: &dyn EvalContext) -> Result<Resolved<'a>> {
    let mut scope = EvalScope::new();
    resolve_in_scope(node, ctx, &mut scope)
}

/// Resolve `node` inside an ongoing pass.
///
/// The scope's dimension stack is left exactly as it was found.
pub fn resolve_in_scope<'a>(
    node: &'a Node,
    ctx: &dyn EvalContext,
    scope: &mut EvalScope,
) -> Result<Resolved<'a>> {
    if node.is_constant() {
        trace!(css = %node, "constant");
        return Ok(Some(Cow::Borrowed(node)));
    }
    Ok(evaluate(node, ctx, scope)?.map(Cow::Owned))
}

/// Resolve and detach from the input's lifetime.
pub(crate) fn resolve_owned(
    node: &Node,
    ctx: &dyn EvalContext,
    scope: &mut EvalScope,
) -> Result<Option<Node>> {
    Ok(resolve_in_scope(node, ctx, scope)?.map(Cow::into_owned))
}

fn evaluate(node: &Node, ctx: &dyn EvalContext, scope: &mut EvalScope) -> Result<Option<Node>> {
    match node {
        Node::Passthrough(_) | Node::Numeric(_) => Ok(Some(node.clone())),
        Node::Concat(items) => evaluate_concat(items, ctx, scope),
        Node::Url(url) => evaluate_url(url, ctx),
        Node::Func(call) => evaluate_func(call, ctx, scope),
        Node::Var(var) => evaluate_var(var, ctx, scope),
        Node::Calc(inner) => resolve_owned(inner, ctx, scope),
        Node::CalcSum(sum) => calc::evaluate_sum(sum, ctx, scope),
        Node::CalcProduct(product) => calc::evaluate_product(product, ctx, scope),
        Node::Num(inner) => evaluate_num(inner, ctx, scope),
        Node::Index => Ok(Some(Node::count(ctx.current_index() as f64))),
    }
}

fn evaluate_concat(
    items: &[Node],
    ctx: &dyn EvalContext,
    scope: &mut EvalScope,
) -> Result<Option<Node>> {
    let mut resolved = Vec::with_capacity(items.len());
    for item in items {
        match resolve_owned(item, ctx, scope)? {
            Some(node) => resolved.push(node),
            None => return Ok(None),
        }
    }
    Ok(Some(Node::Concat(resolved)))
}

fn evaluate_url(url: &str, ctx: &dyn EvalContext) -> Result<Option<Node>> {
    let resolved = ctx.resolve_url(url)?;
    debug!(url, resolved = %resolved, "resolved url");
    // Passthrough so a second pass leaves it alone
    Ok(Some(Node::passthrough(format!("url(\"{}\")", resolved))))
}

fn evaluate_func(
    call: &FuncCall,
    ctx: &dyn EvalContext,
    scope: &mut EvalScope,
) -> Result<Option<Node>> {
    let mut args = Vec::with_capacity(call.args().len());
    for (i, arg) in call.args().iter().enumerate() {
        let resolved = scope.with_dimension(call.dimension_for(i), |scope| {
            resolve_owned(arg, ctx, scope)
        })?;
        match resolved {
            Some(node) => args.push(node),
            None => return Ok(None),
        }
    }
    Ok(Some(Node::Func(call.with_args(args))))
}

fn evaluate_var(
    var: &VarRef,
    ctx: &dyn EvalContext,
    scope: &mut EvalScope,
) -> Result<Option<Node>> {
    if scope.var_depth >= MAX_RESOLUTION_DEPTH {
        return Err(ExprError::MaxDepthExceeded(var.name().to_string()));
    }
    scope.var_depth += 1;
    let out = resolve_var_value(var, ctx, scope);
    scope.var_depth -= 1;
    out
}

fn resolve_var_value(
    var: &VarRef,
    ctx: &dyn EvalContext,
    scope: &mut EvalScope,
) -> Result<Option<Node>> {
    if let Some(value) = ctx.get_var(var.name()) {
        return resolve_owned(&value, ctx, scope);
    }
    match var.default() {
        Some(default) => resolve_owned(default, ctx, scope),
        None => {
            debug!(name = var.name(), "var() has no value and no fallback");
            Ok(None)
        }
    }
}

fn evaluate_num(
    inner: &Node,
    ctx: &dyn EvalContext,
    scope: &mut EvalScope,
) -> Result<Option<Node>> {
    let Some(value) = resolve_in_scope(inner, ctx, scope)? else {
        return Ok(None);
    };
    let Some(n) = value.as_numeric() else {
        debug!(css = %value, "num() of a non-numeric value");
        return Ok(None);
    };
    let value = n.norm(ctx)?.value();
    if !value.is_finite() {
        debug!(css = %n, "num() value is not finite");
        return Ok(None);
    }
    Ok(Some(Node::count(value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{Dimension, Size};
    use crate::node::{ProductOp, SumOp};
    use crate::static_context::StaticContext;

    fn ctx() -> StaticContext {
        StaticContext::new()
            .with_element_size(Size::new(200.0, 100.0))
            .with_viewport(Size::new(1000.0, 500.0))
            .with_font_size(12.0)
    }

    fn resolved_css(node: &Node, ctx: &StaticContext) -> Option<String> {
        resolve(node, ctx).unwrap().map(|n| n.serialize())
    }

    #[test]
    fn test_constant_returns_same_node() {
        let ctx = ctx();
        for node in [
            Node::length(3.0, "em"),
            Node::passthrough("none"),
            Node::url("https://example.com/x.png"),
            Node::func("rotate", vec![Node::angle(90.0, "deg")]),
        ] {
            match resolve(&node, &ctx).unwrap() {
                Some(Cow::Borrowed(out)) => assert!(std::ptr::eq(out, &node)),
                other => panic!("expected borrowed node, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_concat_null_propagation() {
        let ctx = ctx();
        let node = Node::length(1.0, "px").concat(Node::var("--missing", None));
        assert!(resolve(&node, &ctx).unwrap().is_none());
    }

    #[test]
    fn test_concat_resolves_children() {
        let ctx = ctx().define("--r", Node::angle(45.0, "deg"));
        let node = Node::translate("x", vec![Node::length(1.0, "px")])
            .unwrap()
            .concat(Node::func("rotate", vec![Node::var("--r", None)]));
        assert_eq!(
            resolved_css(&node, &ctx).unwrap(),
            "translatex(1px) rotate(45deg)"
        );
    }

    #[test]
    fn test_url_resolution_is_idempotent() {
        let ctx = ctx()
            .with_base_url("https://cdn.example.com/assets/")
            .unwrap();
        let node = Node::url("img/a.png");
        assert!(!node.is_constant());

        let once = resolve(&node, &ctx).unwrap().unwrap().into_owned();
        assert_eq!(
            once.serialize(),
            "url(\"https://cdn.example.com/assets/img/a.png\")"
        );
        assert!(once.is_constant());

        let twice = resolve(&once, &ctx).unwrap().unwrap();
        assert_eq!(twice.as_ref(), &once);
    }

    #[test]
    fn test_url_rejected_is_fatal() {
        let ctx = ctx();
        let err = resolve(&Node::url("http://example.com/a.png"), &ctx).unwrap_err();
        assert!(matches!(err, ExprError::UrlRejected { .. }));
    }

    #[test]
    fn test_var_lookup_and_default() {
        let ctx = ctx().define("--a", Node::length(5.0, "px"));
        assert_eq!(resolved_css(&Node::var("--a", None), &ctx).unwrap(), "5px");
        assert_eq!(
            resolved_css(&Node::var("--b", Some(Node::percent(10.0))), &ctx).unwrap(),
            "10%"
        );
        // Binding wins over the default
        assert_eq!(
            resolved_css(&Node::var("--a", Some(Node::percent(10.0))), &ctx).unwrap(),
            "5px"
        );
        assert!(resolve(&Node::var("--b", None), &ctx).unwrap().is_none());
    }

    #[test]
    fn test_var_value_is_resolved_recursively() {
        let double = Node::calc(Node::product(
            Node::var("--base", None),
            ProductOp::Mul,
            Node::count(2.0),
        ));
        let ctx = ctx()
            .define("--base", Node::length(4.0, "px"))
            .define("--double", double);
        let node = Node::var("--double", None);
        assert_eq!(resolved_css(&node, &ctx).unwrap(), "8px");
    }

    #[test]
    fn test_var_default_may_reference_vars() {
        let ctx = ctx().define("--fallback", Node::time(2.0, "s"));
        let node = Node::var("--missing", Some(Node::var("--fallback", None)));
        assert_eq!(resolved_css(&node, &ctx).unwrap(), "2s");
    }

    #[test]
    fn test_self_referencing_var_fails() {
        let ctx = ctx().define("--loop", Node::var("--loop", None));
        let err = resolve(&Node::var("--loop", None), &ctx).unwrap_err();
        assert_eq!(err, ExprError::MaxDepthExceeded("--loop".to_string()));
    }

    /// `calc(50% + 0px)`, so the percentage is converted
    fn half() -> Node {
        Node::calc(Node::sum(Node::percent(50.0), SumOp::Add, Node::length(0.0, "px")))
    }

    #[test]
    fn test_function_percent_scoped_by_argument() {
        let ctx = ctx();
        let node = Node::translate("", vec![half(), half()]).unwrap();
        assert_eq!(resolved_css(&node, &ctx).unwrap(), "translate(100px,50px)");

        let node = Node::translate("y", vec![half()]).unwrap();
        assert_eq!(resolved_css(&node, &ctx).unwrap(), "translatey(50px)");

        let node = Node::translate("z", vec![half()]).unwrap();
        assert_eq!(resolved_css(&node, &ctx).unwrap(), "translatez(0px)");
    }

    #[test]
    fn test_var_inside_tagged_argument_uses_axis() {
        let ctx = ctx().define(
            "--inner",
            Node::calc(Node::sum(Node::length(10.0, "px"), SumOp::Add, Node::percent(10.0))),
        );
        let node = Node::translate("y", vec![Node::var("--inner", None)]).unwrap();
        assert_eq!(resolved_css(&node, &ctx).unwrap(), "translatey(20px)");
    }

    #[test]
    fn test_dimension_stack_balanced() {
        let ctx = ctx();
        let nodes = [
            Node::translate("3d", vec![Node::var("--x", Some(Node::length(1.0, "px")))]).unwrap(),
            Node::translate("", vec![Node::length(1.0, "px"), Node::var("--gone", None)]).unwrap(),
            Node::translate("x", vec![Node::var("--missing", None)]).unwrap(),
        ];
        for node in &nodes {
            let mut scope = EvalScope::new();
            let _ = resolve_in_scope(node, &ctx, &mut scope).unwrap();
            assert!(scope.dims.is_empty());
            assert_eq!(scope.var_depth, 0);
        }
    }

    #[test]
    fn test_resolve_in_scope_keeps_outer_dimension() {
        let ctx = ctx();
        let mut scope = EvalScope::new();
        let node = Node::calc(Node::sum(Node::percent(10.0), SumOp::Add, Node::length(0.0, "px")));
        let out = scope.with_dimension(Some(Dimension::H), |scope| {
            resolve_owned(&node, &ctx, scope)
        });
        assert_eq!(out.unwrap().unwrap().serialize(), "10px");
        assert!(scope.dims.is_empty());
    }

    #[test]
    fn test_function_null_argument() {
        let ctx = ctx();
        let node = Node::func("scale", vec![Node::count(1.0), Node::var("--nope", None)]);
        assert!(resolve(&node, &ctx).unwrap().is_none());
    }

    #[test]
    fn test_function_keeps_dimensions_after_resolve() {
        let ctx = ctx().define("--x", Node::length(3.0, "px"));
        let node = Node::translate("x", vec![Node::var("--x", None)]).unwrap();
        let out = resolve(&node, &ctx).unwrap().unwrap();
        let Node::Func(call) = out.as_ref() else {
            panic!("expected function")
        };
        assert_eq!(call.dimension_for(0), Some(Dimension::W));
    }

    #[test]
    fn test_num_strips_units() {
        let ctx = ctx();
        let num = |inner: Node| resolved_css(&Node::num(inner), &ctx);
        assert_eq!(num(Node::time(1.0, "s")).unwrap(), "1000");
        assert_eq!(num(Node::length(2.0, "em")).unwrap(), "24");
        assert_eq!(num(Node::percent(30.0)).unwrap(), "30");
        assert_eq!(num(Node::passthrough("auto")), None);
        assert_eq!(num(Node::var("--none", None)), None);
    }

    #[test]
    fn test_num_overflow_is_null() {
        let ctx = ctx();
        assert_eq!(resolved_css(&Node::num(Node::time(1e306, "s")), &ctx), None);
    }

    #[test]
    fn test_index() {
        let ctx = ctx().with_index(3);
        let node = Node::calc(Node::product(
            Node::index(),
            ProductOp::Mul,
            Node::time(100.0, "ms"),
        ));
        assert_eq!(resolved_css(&node, &ctx).unwrap(), "300ms");
    }
}
