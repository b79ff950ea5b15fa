//! The program tree consumed by the dataflow engine.
//!
//! The parser converts the ruff AST into this representation once; every node
//! carries a [`Span`] with its 1-based start and end line, which is all the
//! position information the analysis needs. Control-structure nodes
//! additionally carry a [`NodeId`] so scope stacks can record *which* `if` or
//! loop encloses a definition without holding references into the tree.

use std::hash::{Hash, Hasher};

use num_bigint::BigInt;

use crate::intern::StringId;

/// Source extent of a node: first and last 1-based line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Span {
    pub line: u32,
    pub end_line: u32,
}

impl Span {
    #[must_use]
    pub fn new(line: u32, end_line: u32) -> Self {
        Self { line, end_line }
    }
}

/// Identity of a control-structure node (`if`, `for`, `while`).
///
/// Assigned sequentially by the parser. Scope stacks store these ids; two
/// definitions are scope-comparable by prefix comparison over ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct NodeId(pub u32);

/// A name occurrence with its source line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Identifier {
    pub name: StringId,
    pub line: u32,
}

impl Identifier {
    #[must_use]
    pub fn new(name: StringId, line: u32) -> Self {
        Self { name, line }
    }
}

/// A literal constant.
///
/// In propagation mode these travel through the tables as dependency tokens,
/// so the type implements structural `Eq`/`Hash`: floats compare and hash by
/// bit pattern, which is exactly what the deduplication sets need.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub enum Literal {
    None,
    Bool(bool),
    Int(i64),
    /// Integer literal outside the `i64` range.
    LongInt(BigInt),
    Float(f64),
    /// An interned string literal.
    Str(StringId),
}

impl PartialEq for Literal {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::None, Self::None) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::LongInt(a), Self::LongInt(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a.to_bits() == b.to_bits(),
            (Self::Str(a), Self::Str(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Literal {}

impl Hash for Literal {
    fn hash<H: Hasher>(&self, state: &mut H) {
        core::mem::discriminant(self).hash(state);
        match self {
            Self::None => {}
            Self::Bool(b) => b.hash(state),
            Self::Int(i) => i.hash(state),
            Self::LongInt(i) => i.hash(state),
            Self::Float(f) => f.to_bits().hash(state),
            Self::Str(id) => id.hash(state),
        }
    }
}

/// Binary operators for arithmetic and bitwise operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, serde::Serialize, serde::Deserialize)]
pub enum Operator {
    #[strum(serialize = "+")]
    Add,
    #[strum(serialize = "-")]
    Sub,
    #[strum(serialize = "*")]
    Mult,
    #[strum(serialize = "/")]
    Div,
    #[strum(serialize = "%")]
    Mod,
    #[strum(serialize = "**")]
    Pow,
    #[strum(serialize = "<<")]
    LShift,
    #[strum(serialize = ">>")]
    RShift,
    #[strum(serialize = "|")]
    BitOr,
    #[strum(serialize = "^")]
    BitXor,
    #[strum(serialize = "&")]
    BitAnd,
    #[strum(serialize = "//")]
    FloorDiv,
    #[strum(serialize = "@")]
    MatMult,
}

/// Defined separately since these operators always produce a bool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, serde::Serialize, serde::Deserialize)]
pub enum CmpOperator {
    #[strum(serialize = "==")]
    Eq,
    #[strum(serialize = "!=")]
    NotEq,
    #[strum(serialize = "<")]
    Lt,
    #[strum(serialize = "<=")]
    LtE,
    #[strum(serialize = ">")]
    Gt,
    #[strum(serialize = ">=")]
    GtE,
    #[strum(serialize = "is")]
    Is,
    #[strum(serialize = "is not")]
    IsNot,
    #[strum(serialize = "in")]
    In,
    #[strum(serialize = "not in")]
    NotIn,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, serde::Serialize, serde::Deserialize)]
pub enum BoolOperator {
    #[strum(serialize = "and")]
    And,
    #[strum(serialize = "or")]
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, serde::Serialize, serde::Deserialize)]
pub enum UnaryOperator {
    #[strum(serialize = "-")]
    Minus,
    #[strum(serialize = "+")]
    Plus,
    #[strum(serialize = "~")]
    Invert,
    #[strum(serialize = "not")]
    Not,
}

/// An expression in the tree.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Expr {
    Literal(Literal),
    Name(Identifier),
    Unary {
        op: UnaryOperator,
        operand: Box<ExprLoc>,
    },
    Binary {
        left: Box<ExprLoc>,
        op: Operator,
        right: Box<ExprLoc>,
    },
    /// Chained boolean operation: `a and b and c`.
    BoolOp {
        op: BoolOperator,
        values: Vec<ExprLoc>,
    },
    /// Chain comparison: `a < b <= c` keeps one left operand and parallel
    /// operator/comparator lists, mirroring the shape the parser hands us.
    Compare {
        left: Box<ExprLoc>,
        ops: Vec<CmpOperator>,
        comparators: Vec<ExprLoc>,
    },
    /// Call expression. The callee is an arbitrary expression; the engine
    /// special-cases callees that are plain names of user-defined functions.
    Call {
        func: Box<ExprLoc>,
        args: Vec<ExprLoc>,
    },
    /// Conditional expression (ternary): `body if test else orelse`.
    IfElse {
        test: Box<ExprLoc>,
        body: Box<ExprLoc>,
        orelse: Box<ExprLoc>,
    },
    /// Attribute access: `object.attr`.
    Attribute {
        object: Box<ExprLoc>,
        attr: StringId,
    },
    Subscript {
        object: Box<ExprLoc>,
        index: Box<ExprLoc>,
    },
    /// Slice expression appearing as a subscript index: `a[lower:upper:step]`.
    Slice {
        lower: Option<Box<ExprLoc>>,
        upper: Option<Box<ExprLoc>>,
        step: Option<Box<ExprLoc>>,
    },
    List(Vec<ExprLoc>),
    Tuple(Vec<ExprLoc>),
    Set(Vec<ExprLoc>),
    /// Dict literal with parallel key/value lists.
    Dict {
        keys: Vec<ExprLoc>,
        values: Vec<ExprLoc>,
    },
}

/// An expression with its source extent.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ExprLoc {
    pub span: Span,
    pub expr: Expr,
}

impl ExprLoc {
    #[must_use]
    pub fn new(span: Span, expr: Expr) -> Self {
        Self { span, expr }
    }
}

/// Target of an assignment or a `for` loop.
///
/// Tuple targets nest (`(a, b), c = ...`); subscript targets keep the full
/// object and index expressions so their reads can be evaluated, while the
/// definition itself is attributed to the outermost base name.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum AssignTarget {
    Name(Identifier),
    Tuple { elts: Vec<AssignTarget>, span: Span },
    Subscript { object: Box<ExprLoc>, index: Box<ExprLoc>, span: Span },
}

/// A user-defined function: name, positional parameter names, and body.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FunctionDef {
    pub name: Identifier,
    pub params: Vec<StringId>,
    pub body: Vec<Node>,
    pub span: Span,
}

/// A statement in the tree.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Node {
    /// Expression statement.
    Expr(ExprLoc),
    /// Return statement; `value` is `None` for a bare `return`.
    Return { value: Option<ExprLoc>, span: Span },
    /// Assignment, possibly with several targets: `a = b = value`.
    Assign {
        targets: Vec<AssignTarget>,
        value: ExprLoc,
        span: Span,
    },
    /// Augmented assignment: `target op= value`.
    AugAssign {
        target: AssignTarget,
        op: Operator,
        value: ExprLoc,
        span: Span,
    },
    If {
        test: ExprLoc,
        body: Vec<Node>,
        orelse: Vec<Node>,
        span: Span,
        /// Scope identity of the `if` body.
        id: NodeId,
        /// Distinct scope identity for the else arm, stable across
        /// re-analysis of the same tree.
        else_id: NodeId,
    },
    For {
        target: AssignTarget,
        iter: ExprLoc,
        body: Vec<Node>,
        span: Span,
        id: NodeId,
    },
    While {
        test: ExprLoc,
        body: Vec<Node>,
        span: Span,
        id: NodeId,
    },
    Break(Span),
    Continue(Span),
    Pass(Span),
    FunctionDef(FunctionDef),
}

impl Node {
    /// The span of this statement.
    #[must_use]
    pub fn span(&self) -> Span {
        match self {
            Self::Expr(e) => e.span,
            Self::Return { span, .. }
            | Self::Assign { span, .. }
            | Self::AugAssign { span, .. }
            | Self::If { span, .. }
            | Self::For { span, .. }
            | Self::While { span, .. }
            | Self::Break(span)
            | Self::Continue(span)
            | Self::Pass(span) => *span,
            Self::FunctionDef(f) => f.span,
        }
    }
}
