//! Expression tree for animation CSS values
//!
//! A [`Node`] is an immutable tree built by a parser (or by hand through the
//! constructors below). Resolution never mutates a node; it produces a new,
//! simpler tree (see [`crate::resolve`]).
//!
//! # Example
//!
//! ```
//! use cssexpr::node::{Node, SumOp};
//!
//! let node = Node::translate(
//!     "x",
//!     vec![Node::calc(Node::sum(Node::percent(50.0), SumOp::Add, Node::length(10.0, "px")))],
//! )
//! .unwrap();
//! assert_eq!(node.serialize(), "translatex(calc(50% + 10px))");
//! assert!(!node.is_constant());
//! ```

use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

use crate::context::Dimension;
use crate::error::{ExprError, Result};
use crate::units::Numeric;

/// URLs that are already final and need no host resolution.
static FINAL_URL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^(data|https):").unwrap());

/// One node of a CSS value expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Already-final CSS text, emitted verbatim
    Passthrough(String),
    /// Space-separated sequence, e.g. `translateX(10px) rotate(1deg)`
    Concat(Vec<Node>),
    /// `url("...")`; an empty string serializes to nothing
    Url(String),
    Numeric(Numeric),
    Func(FuncCall),
    Var(VarRef),
    /// `calc(<inner>)`
    Calc(Box<Node>),
    CalcSum(CalcSum),
    CalcProduct(CalcProduct),
    /// `num(<inner>)`: strips units after normalizing
    Num(Box<Node>),
    /// `index()`: position of the current target
    Index,
}

/// Function call with optional per-argument axis tags.
#[derive(Debug, Clone, PartialEq)]
pub struct FuncCall {
    name: String,
    args: Vec<Node>,
    dimensions: Option<Vec<Dimension>>,
}

impl FuncCall {
    pub fn new(name: &str, args: Vec<Node>) -> Self {
        Self {
            name: name.to_ascii_lowercase(),
            args,
            dimensions: None,
        }
    }

    /// Tag argument `i` with `dimensions[i]` while it resolves.
    pub fn with_dimensions(mut self, dimensions: Vec<Dimension>) -> Self {
        self.dimensions = Some(dimensions);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn args(&self) -> &[Node] {
        &self.args
    }

    pub fn dimensions(&self) -> Option<&[Dimension]> {
        self.dimensions.as_deref()
    }

    /// Axis tag for the argument at `index`, if any.
    pub fn dimension_for(&self, index: usize) -> Option<Dimension> {
        self.dimensions
            .as_ref()
            .and_then(|dims| dims.get(index).copied())
    }

    /// Same function and tags, new arguments.
    pub(crate) fn with_args(&self, args: Vec<Node>) -> Self {
        Self {
            name: self.name.clone(),
            args,
            dimensions: self.dimensions.clone(),
        }
    }
}

/// `var(--name[, default])`
#[derive(Debug, Clone, PartialEq)]
pub struct VarRef {
    name: String,
    default: Option<Box<Node>>,
}

impl VarRef {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn default(&self) -> Option<&Node> {
        self.default.as_deref()
    }
}

/// Additive `calc()` operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SumOp {
    Add,
    Sub,
}

impl SumOp {
    pub fn as_char(self) -> char {
        match self {
            SumOp::Add => '+',
            SumOp::Sub => '-',
        }
    }
}

/// Multiplicative `calc()` operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductOp {
    Mul,
    Div,
}

impl ProductOp {
    pub fn as_char(self) -> char {
        match self {
            ProductOp::Mul => '*',
            ProductOp::Div => '/',
        }
    }
}

/// `<left> + <right>` or `<left> - <right>`
#[derive(Debug, Clone, PartialEq)]
pub struct CalcSum {
    left: Box<Node>,
    op: SumOp,
    right: Box<Node>,
}

impl CalcSum {
    pub fn left(&self) -> &Node {
        &self.left
    }

    pub fn op(&self) -> SumOp {
        self.op
    }

    pub fn right(&self) -> &Node {
        &self.right
    }
}

/// `<left> * <right>` or `<left> / <right>`
#[derive(Debug, Clone, PartialEq)]
pub struct CalcProduct {
    left: Box<Node>,
    op: ProductOp,
    right: Box<Node>,
}

impl CalcProduct {
    pub fn left(&self) -> &Node {
        &self.left
    }

    pub fn op(&self) -> ProductOp {
        self.op
    }

    pub fn right(&self) -> &Node {
        &self.right
    }
}

impl Node {
    pub fn passthrough(css: impl Into<String>) -> Self {
        Node::Passthrough(css.into())
    }

    pub fn url(url: impl Into<String>) -> Self {
        Node::Url(url.into())
    }

    pub fn count(value: f64) -> Self {
        Node::Numeric(Numeric::count(value))
    }

    pub fn percent(value: f64) -> Self {
        Node::Numeric(Numeric::percent(value))
    }

    pub fn length(value: f64, units: &str) -> Self {
        Node::Numeric(Numeric::length(value, units))
    }

    pub fn angle(value: f64, units: &str) -> Self {
        Node::Numeric(Numeric::angle(value, units))
    }

    pub fn time(value: f64, units: &str) -> Self {
        Node::Numeric(Numeric::time(value, units))
    }

    pub fn func(name: &str, args: Vec<Node>) -> Self {
        Node::Func(FuncCall::new(name, args))
    }

    /// `translate`, `translateX`, `translateY`, `translateZ` or `translate3d`.
    ///
    /// `suffix` is matched case-insensitively; each argument is tagged with
    /// the axis it moves along so percentages resolve against the right side
    /// of the element box.
    pub fn translate(suffix: &str, args: Vec<Node>) -> Result<Self> {
        let suffix = suffix.to_ascii_lowercase();
        let dims = match suffix.as_str() {
            "" => vec![Dimension::W, Dimension::H],
            "x" => vec![Dimension::W],
            "y" => vec![Dimension::H],
            "z" => vec![Dimension::Z],
            "3d" => vec![Dimension::W, Dimension::H, Dimension::Z],
            _ => return Err(ExprError::UnknownTranslateSuffix(suffix)),
        };
        let name = format!("translate{}", suffix);
        Ok(Node::Func(FuncCall::new(&name, args).with_dimensions(dims)))
    }

    pub fn var(name: &str, default: Option<Node>) -> Self {
        Node::Var(VarRef {
            name: name.to_string(),
            default: default.map(Box::new),
        })
    }

    pub fn calc(inner: Node) -> Self {
        Node::Calc(Box::new(inner))
    }

    pub fn sum(left: Node, op: SumOp, right: Node) -> Self {
        Node::CalcSum(CalcSum {
            left: Box::new(left),
            op,
            right: Box::new(right),
        })
    }

    pub fn product(left: Node, op: ProductOp, right: Node) -> Self {
        Node::CalcProduct(CalcProduct {
            left: Box::new(left),
            op,
            right: Box::new(right),
        })
    }

    pub fn num(inner: Node) -> Self {
        Node::Num(Box::new(inner))
    }

    pub fn index() -> Self {
        Node::Index
    }

    /// Join two expressions with a space, flattening existing concatenations.
    ///
    /// `concat(a b, c)` yields `a b c`, never a nested list.
    pub fn concat(self, other: Node) -> Self {
        let mut items = match self {
            Node::Concat(items) => items,
            node => vec![node],
        };
        match other {
            Node::Concat(more) => items.extend(more),
            node => items.push(node),
        }
        Node::Concat(items)
    }

    /// Whether resolving this node can change it.
    ///
    /// Constant nodes resolve to themselves under every context.
    pub fn is_constant(&self) -> bool {
        match self {
            Node::Passthrough(_) | Node::Numeric(_) => true,
            Node::Concat(items) => items.iter().all(Node::is_constant),
            Node::Url(url) => url.is_empty() || FINAL_URL.is_match(url),
            Node::Func(call) => call.args.iter().all(Node::is_constant),
            Node::Var(_)
            | Node::Calc(_)
            | Node::CalcSum(_)
            | Node::CalcProduct(_)
            | Node::Num(_)
            | Node::Index => false,
        }
    }

    /// CSS text for this node.
    pub fn serialize(&self) -> String {
        self.to_string()
    }

    pub fn as_numeric(&self) -> Option<&Numeric> {
        match self {
            Node::Numeric(n) => Some(n),
            _ => None,
        }
    }
}

impl From<Numeric> for Node {
    fn from(n: Numeric) -> Self {
        Node::Numeric(n)
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, nodes: &[Node], sep: &str) -> fmt::Result {
    for (i, node) in nodes.iter().enumerate() {
        if i > 0 {
            f.write_str(sep)?;
        }
        write!(f, "{}", node)?;
    }
    Ok(())
}

fn write_grouped(f: &mut fmt::Formatter<'_>, node: &Node, grouped: bool) -> fmt::Result {
    if grouped {
        write!(f, "({})", node)
    } else {
        write!(f, "{}", node)
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Passthrough(css) => f.write_str(css),
            Node::Concat(items) => write_joined(f, items, " "),
            Node::Url(url) if url.is_empty() => Ok(()),
            Node::Url(url) => write!(f, "url(\"{}\")", url),
            Node::Numeric(n) => write!(f, "{}", n),
            Node::Func(call) => {
                write!(f, "{}(", call.name)?;
                write_joined(f, &call.args, ",")?;
                f.write_str(")")
            }
            Node::Var(var) => match &var.default {
                Some(default) => write!(f, "var({}, {})", var.name, default),
                None => write!(f, "var({})", var.name),
            },
            Node::Calc(inner) => write!(f, "calc({})", inner),
            Node::CalcSum(sum) => {
                write!(f, "{} {} ", sum.left, sum.op.as_char())?;
                // a - (b - c) and a - (b + c) keep their grouping
                let grouped = sum.op == SumOp::Sub && matches!(*sum.right, Node::CalcSum(_));
                write_grouped(f, &sum.right, grouped)
            }
            Node::CalcProduct(product) => {
                write_grouped(f, &product.left, matches!(*product.left, Node::CalcSum(_)))?;
                write!(f, " {} ", product.op.as_char())?;
                let grouped = match *product.right {
                    Node::CalcSum(_) => true,
                    Node::CalcProduct(_) => product.op == ProductOp::Div,
                    _ => false,
                };
                write_grouped(f, &product.right, grouped)
            }
            Node::Num(inner) => write!(f, "num({})", inner),
            Node::Index => f.write_str("index()"),
        }
    }
}
