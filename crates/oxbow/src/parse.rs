//! Conversion of the ruff AST into the oxbow tree.
//!
//! `ruff_python_parser` does the actual text-to-AST work; the [`Parser`] here
//! walks that AST once, interns every name, converts byte ranges into line
//! spans, and assigns scope ids to control-structure nodes. Constructs the
//! analysis cannot faithfully re-emit (classes, try/except, comprehensions,
//! keyword arguments, ...) are rejected with a [`ParseError`] instead of
//! being silently dropped from the output.

use std::{borrow::Cow, fmt, str::FromStr};

use num_bigint::BigInt;
use ruff_python_ast::{self as ast, Expr as AstExpr, Number, Stmt};
use ruff_python_parser::parse_module;
use ruff_text_size::{Ranged, TextRange};

use crate::{
    intern::{Interner, StringId},
    tree::{
        AssignTarget, BoolOperator, CmpOperator, Expr, ExprLoc, FunctionDef, Identifier, Literal, Node, NodeId,
        Operator, Span, UnaryOperator,
    },
};

/// Maximum nesting depth for AST structures during parsing.
/// This prevents stack overflow from deeply nested structures like `((((x,),),),)`.
#[cfg(not(debug_assertions))]
pub const MAX_NESTING_DEPTH: u16 = 200;
/// In debug builds, we use a lower limit because stack frames are much larger
/// (no inlining, debug info, etc.).
#[cfg(debug_assertions)]
pub const MAX_NESTING_DEPTH: u16 = 35;

/// Error produced by the parser front-end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Error in syntax, including nesting-depth violations.
    Syntax { msg: Cow<'static, str>, line: u32 },
    /// A construct outside the analyzed subset.
    /// Message gets prefixed with "oxbow does not support ".
    NotImplemented { msg: Cow<'static, str>, line: u32 },
}

impl ParseError {
    pub(crate) fn syntax(msg: impl Into<Cow<'static, str>>, line: u32) -> Self {
        Self::Syntax { msg: msg.into(), line }
    }

    pub(crate) fn not_implemented(msg: impl Into<Cow<'static, str>>, line: u32) -> Self {
        Self::NotImplemented { msg: msg.into(), line }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Syntax { msg, line } => write!(f, "syntax error on line {line}: {msg}"),
            Self::NotImplemented { msg, line } => {
                write!(f, "line {line}: oxbow does not support {msg}")
            }
        }
    }
}

impl std::error::Error for ParseError {}

/// Result of parsing: the tree and the interner with all interned names.
#[derive(Debug)]
pub struct ParseResult {
    pub module: Vec<Node>,
    pub interner: Interner,
}

/// Parses a module into the oxbow tree.
pub fn parse(code: &str) -> Result<ParseResult, ParseError> {
    let mut parser = Parser::new(code);
    let parsed = parse_module(code).map_err(|e| {
        let line = parser.line_of(e.range().start().into());
        ParseError::syntax(e.to_string(), line)
    })?;
    let module = parsed.into_syntax();
    let nodes = parser.parse_statements(module.body)?;
    Ok(ParseResult {
        module: nodes,
        interner: parser.interner,
    })
}

/// Converter from the ruff AST to the oxbow tree.
///
/// Owns the string interner and a `line_starts` index for turning byte
/// offsets into 1-based line numbers.
struct Parser {
    /// Byte offset of the first character of each line.
    line_starts: Vec<usize>,
    /// String interner for names (variables, functions, attributes).
    interner: Interner,
    /// Remaining nesting depth budget for recursive structures.
    depth_remaining: u16,
    /// Next scope id to hand out to a control-structure node.
    next_node_id: u32,
}

impl Parser {
    fn new(code: &str) -> Self {
        let mut line_starts = vec![0];
        for (i, b) in code.bytes().enumerate() {
            if b == b'\n' {
                line_starts.push(i + 1);
            }
        }
        Self {
            line_starts,
            interner: Interner::new(),
            depth_remaining: MAX_NESTING_DEPTH,
            next_node_id: 0,
        }
    }

    /// 1-based line containing the given byte offset.
    fn line_of(&self, offset: usize) -> u32 {
        let line = self.line_starts.partition_point(|&start| start <= offset);
        u32::try_from(line).expect("line number exceeds u32")
    }

    fn convert_range(&self, range: TextRange) -> Span {
        let start: usize = range.start().into();
        let end: usize = range.end().into();
        // The end offset is exclusive; step back one byte so a range ending
        // exactly at a newline is attributed to the line it closes.
        let last = end.saturating_sub(1).max(start);
        Span::new(self.line_of(start), self.line_of(last))
    }

    fn fresh_node_id(&mut self) -> NodeId {
        let id = NodeId(self.next_node_id);
        self.next_node_id += 1;
        id
    }

    fn identifier(&mut self, name: &str, range: TextRange) -> Identifier {
        let start: usize = range.start().into();
        Identifier::new(self.interner.intern(name), self.line_of(start))
    }

    fn enter_depth(&mut self, line: u32) -> Result<(), ParseError> {
        if self.depth_remaining == 0 {
            return Err(ParseError::syntax("too many nested expressions or statements", line));
        }
        self.depth_remaining -= 1;
        Ok(())
    }

    fn parse_statements(
        &mut self,
        statements: impl IntoIterator<Item = Stmt>,
    ) -> Result<Vec<Node>, ParseError> {
        statements.into_iter().map(|s| self.parse_statement(s)).collect()
    }

    fn parse_statement(&mut self, statement: Stmt) -> Result<Node, ParseError> {
        let line = self.line_of(statement.range().start().into());
        self.enter_depth(line)?;
        let result = self.parse_statement_impl(statement);
        self.depth_remaining += 1;
        result
    }

    fn parse_statement_impl(&mut self, statement: Stmt) -> Result<Node, ParseError> {
        match statement {
            Stmt::FunctionDef(function) => {
                let span = self.convert_range(function.range);
                if function.is_async {
                    return Err(ParseError::not_implemented("async functions", span.line));
                }
                if !function.decorator_list.is_empty() {
                    return Err(ParseError::not_implemented("decorators", span.line));
                }
                if function.returns.is_some() {
                    return Err(ParseError::not_implemented("return annotations", span.line));
                }
                let params = self.parse_parameters(&function.parameters, span.line)?;
                let name = self.identifier(&function.name.id, function.name.range);
                let body = self.parse_statements(function.body)?;
                Ok(Node::FunctionDef(FunctionDef {
                    name,
                    params,
                    body,
                    span,
                }))
            }
            Stmt::Return(ast::StmtReturn { value, range, .. }) => {
                let span = self.convert_range(range);
                let value = value.map(|v| self.parse_expression(*v)).transpose()?;
                Ok(Node::Return { value, span })
            }
            Stmt::Assign(ast::StmtAssign {
                targets, value, range, ..
            }) => {
                let span = self.convert_range(range);
                let targets = targets
                    .into_iter()
                    .map(|t| self.parse_target(t))
                    .collect::<Result<Vec<_>, _>>()?;
                let value = self.parse_expression(*value)?;
                Ok(Node::Assign { targets, value, span })
            }
            Stmt::AugAssign(ast::StmtAugAssign {
                target,
                op,
                value,
                range,
                ..
            }) => {
                let span = self.convert_range(range);
                let target = self.parse_target(*target)?;
                let value = self.parse_expression(*value)?;
                Ok(Node::AugAssign {
                    target,
                    op: convert_op(op),
                    value,
                    span,
                })
            }
            Stmt::If(ast::StmtIf {
                test,
                body,
                elif_else_clauses,
                range,
                ..
            }) => {
                let span = self.convert_range(range);
                let test = self.parse_expression(*test)?;
                let body = self.parse_statements(body)?;
                let orelse = self.parse_elif_else_clauses(elif_else_clauses)?;
                let id = self.fresh_node_id();
                let else_id = self.fresh_node_id();
                Ok(Node::If {
                    test,
                    body,
                    orelse,
                    span,
                    id,
                    else_id,
                })
            }
            Stmt::For(ast::StmtFor {
                is_async,
                target,
                iter,
                body,
                orelse,
                range,
                ..
            }) => {
                let span = self.convert_range(range);
                if is_async {
                    return Err(ParseError::not_implemented("async for loops", span.line));
                }
                if !orelse.is_empty() {
                    return Err(ParseError::not_implemented("else clauses on for loops", span.line));
                }
                let target = self.parse_target(*target)?;
                let iter = self.parse_expression(*iter)?;
                let body = self.parse_statements(body)?;
                let id = self.fresh_node_id();
                Ok(Node::For {
                    target,
                    iter,
                    body,
                    span,
                    id,
                })
            }
            Stmt::While(ast::StmtWhile {
                test, body, orelse, range, ..
            }) => {
                let span = self.convert_range(range);
                if !orelse.is_empty() {
                    return Err(ParseError::not_implemented("else clauses on while loops", span.line));
                }
                let test = self.parse_expression(*test)?;
                let body = self.parse_statements(body)?;
                let id = self.fresh_node_id();
                Ok(Node::While { test, body, span, id })
            }
            Stmt::Break(b) => Ok(Node::Break(self.convert_range(b.range))),
            Stmt::Continue(c) => Ok(Node::Continue(self.convert_range(c.range))),
            Stmt::Pass(p) => Ok(Node::Pass(self.convert_range(p.range))),
            Stmt::Expr(ast::StmtExpr { value, .. }) => Ok(Node::Expr(self.parse_expression(*value)?)),
            other => {
                let line = self.line_of(other.range().start().into());
                Err(ParseError::not_implemented(
                    format!("this statement kind ({})", statement_kind(&other)),
                    line,
                ))
            }
        }
    }

    /// Folds ruff's flat elif/else clause list into nested `If` nodes.
    ///
    /// Each `elif` becomes an `If` whose end line extends to the end of the
    /// remaining chain, matching the extent a nested `if` would have had, so
    /// merge locations for elif chains line up with the chain's real end.
    fn parse_elif_else_clauses(&mut self, clauses: Vec<ast::ElifElseClause>) -> Result<Vec<Node>, ParseError> {
        let mut tail: Vec<Node> = Vec::new();
        let mut tail_end: u32 = 0;
        for clause in clauses.into_iter().rev() {
            let clause_span = self.convert_range(clause.range);
            let end_line = clause_span.end_line.max(tail_end);
            match clause.test {
                Some(test) => {
                    let test = self.parse_expression(test)?;
                    let body = self.parse_statements(clause.body)?;
                    let id = self.fresh_node_id();
                    let else_id = self.fresh_node_id();
                    tail = vec![Node::If {
                        test,
                        body,
                        orelse: tail,
                        span: Span::new(clause_span.line, end_line),
                        id,
                        else_id,
                    }];
                }
                None => {
                    tail = self.parse_statements(clause.body)?;
                }
            }
            tail_end = end_line;
        }
        Ok(tail)
    }

    /// Positional parameter names; everything fancier is rejected.
    fn parse_parameters(&mut self, parameters: &ast::Parameters, line: u32) -> Result<Vec<StringId>, ParseError> {
        if parameters.vararg.is_some() || parameters.kwarg.is_some() || !parameters.kwonlyargs.is_empty() {
            return Err(ParseError::not_implemented("*args, **kwargs and keyword-only parameters", line));
        }
        let mut params = Vec::new();
        for param in parameters.posonlyargs.iter().chain(parameters.args.iter()) {
            if param.default.is_some() {
                return Err(ParseError::not_implemented("parameter default values", line));
            }
            if param.parameter.annotation.is_some() {
                return Err(ParseError::not_implemented("parameter annotations", line));
            }
            params.push(self.interner.intern(&param.parameter.name.id));
        }
        Ok(params)
    }

    fn parse_target(&mut self, target: AstExpr) -> Result<AssignTarget, ParseError> {
        match target {
            AstExpr::Name(ast::ExprName { id, range, .. }) => Ok(AssignTarget::Name(self.identifier(&id, range))),
            AstExpr::Tuple(ast::ExprTuple { elts, range, .. }) => {
                let span = self.convert_range(range);
                let elts = elts
                    .into_iter()
                    .map(|e| self.parse_target(e))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(AssignTarget::Tuple { elts, span })
            }
            AstExpr::Subscript(ast::ExprSubscript {
                value, slice, range, ..
            }) => {
                let span = self.convert_range(range);
                Ok(AssignTarget::Subscript {
                    object: Box::new(self.parse_expression(*value)?),
                    index: Box::new(self.parse_expression(*slice)?),
                    span,
                })
            }
            other => {
                let line = self.line_of(other.range().start().into());
                Err(ParseError::not_implemented("this kind of assignment target", line))
            }
        }
    }

    fn parse_expression(&mut self, expression: AstExpr) -> Result<ExprLoc, ParseError> {
        let line = self.line_of(expression.range().start().into());
        self.enter_depth(line)?;
        let result = self.parse_expression_impl(expression);
        self.depth_remaining += 1;
        result
    }

    fn parse_expression_impl(&mut self, expression: AstExpr) -> Result<ExprLoc, ParseError> {
        match expression {
            AstExpr::Name(ast::ExprName { id, range, .. }) => {
                let span = self.convert_range(range);
                Ok(ExprLoc::new(span, Expr::Name(self.identifier(&id, range))))
            }
            AstExpr::NumberLiteral(ast::ExprNumberLiteral { value, range, .. }) => {
                let span = self.convert_range(range);
                let literal = match value {
                    Number::Int(i) => {
                        if let Some(i) = i.as_i64() {
                            Literal::Int(i)
                        } else {
                            // Integer too large for i64; re-parse the source
                            // form (radix prefixes, underscores) as a BigInt.
                            let big = parse_long_int(&i.to_string())
                                .ok_or_else(|| ParseError::syntax(format!("invalid integer literal: {i}"), span.line))?;
                            Literal::LongInt(big)
                        }
                    }
                    Number::Float(f) => Literal::Float(f),
                    Number::Complex { .. } => {
                        return Err(ParseError::not_implemented("complex number literals", span.line));
                    }
                };
                Ok(ExprLoc::new(span, Expr::Literal(literal)))
            }
            AstExpr::BooleanLiteral(ast::ExprBooleanLiteral { value, range, .. }) => Ok(ExprLoc::new(
                self.convert_range(range),
                Expr::Literal(Literal::Bool(value)),
            )),
            AstExpr::NoneLiteral(n) => Ok(ExprLoc::new(self.convert_range(n.range), Expr::Literal(Literal::None))),
            AstExpr::StringLiteral(ast::ExprStringLiteral { value, range, .. }) => {
                let id = self.interner.intern(value.to_str());
                Ok(ExprLoc::new(self.convert_range(range), Expr::Literal(Literal::Str(id))))
            }
            AstExpr::UnaryOp(ast::ExprUnaryOp { op, operand, range, .. }) => {
                let span = self.convert_range(range);
                Ok(ExprLoc::new(
                    span,
                    Expr::Unary {
                        op: convert_unary_op(op),
                        operand: Box::new(self.parse_expression(*operand)?),
                    },
                ))
            }
            AstExpr::BinOp(ast::ExprBinOp {
                left, op, right, range, ..
            }) => {
                let span = self.convert_range(range);
                Ok(ExprLoc::new(
                    span,
                    Expr::Binary {
                        left: Box::new(self.parse_expression(*left)?),
                        op: convert_op(op),
                        right: Box::new(self.parse_expression(*right)?),
                    },
                ))
            }
            AstExpr::BoolOp(ast::ExprBoolOp { op, values, range, .. }) => {
                let span = self.convert_range(range);
                let values = values
                    .into_iter()
                    .map(|v| self.parse_expression(v))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(ExprLoc::new(
                    span,
                    Expr::BoolOp {
                        op: convert_bool_op(op),
                        values,
                    },
                ))
            }
            AstExpr::Compare(ast::ExprCompare {
                left,
                ops,
                comparators,
                range,
                ..
            }) => {
                let span = self.convert_range(range);
                let comparators = comparators
                    .into_vec()
                    .into_iter()
                    .map(|c| self.parse_expression(c))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(ExprLoc::new(
                    span,
                    Expr::Compare {
                        left: Box::new(self.parse_expression(*left)?),
                        ops: ops.iter().map(|op| convert_cmp_op(*op)).collect(),
                        comparators,
                    },
                ))
            }
            AstExpr::Call(ast::ExprCall {
                func, arguments, range, ..
            }) => {
                let span = self.convert_range(range);
                if !arguments.keywords.is_empty() {
                    return Err(ParseError::not_implemented("keyword arguments in calls", span.line));
                }
                let args = arguments
                    .args
                    .into_vec()
                    .into_iter()
                    .map(|a| self.parse_expression(a))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(ExprLoc::new(
                    span,
                    Expr::Call {
                        func: Box::new(self.parse_expression(*func)?),
                        args,
                    },
                ))
            }
            AstExpr::If(ast::ExprIf {
                test, body, orelse, range, ..
            }) => {
                let span = self.convert_range(range);
                Ok(ExprLoc::new(
                    span,
                    Expr::IfElse {
                        test: Box::new(self.parse_expression(*test)?),
                        body: Box::new(self.parse_expression(*body)?),
                        orelse: Box::new(self.parse_expression(*orelse)?),
                    },
                ))
            }
            AstExpr::Attribute(ast::ExprAttribute {
                value, attr, range, ..
            }) => {
                let span = self.convert_range(range);
                let attr = self.interner.intern(attr.id());
                Ok(ExprLoc::new(
                    span,
                    Expr::Attribute {
                        object: Box::new(self.parse_expression(*value)?),
                        attr,
                    },
                ))
            }
            AstExpr::Subscript(ast::ExprSubscript {
                value, slice, range, ..
            }) => {
                let span = self.convert_range(range);
                Ok(ExprLoc::new(
                    span,
                    Expr::Subscript {
                        object: Box::new(self.parse_expression(*value)?),
                        index: Box::new(self.parse_expression(*slice)?),
                    },
                ))
            }
            AstExpr::Slice(ast::ExprSlice {
                lower,
                upper,
                step,
                range,
                ..
            }) => {
                let span = self.convert_range(range);
                let lower = lower.map(|e| self.parse_expression(*e)).transpose()?.map(Box::new);
                let upper = upper.map(|e| self.parse_expression(*e)).transpose()?.map(Box::new);
                let step = step.map(|e| self.parse_expression(*e)).transpose()?.map(Box::new);
                Ok(ExprLoc::new(span, Expr::Slice { lower, upper, step }))
            }
            AstExpr::List(ast::ExprList { elts, range, .. }) => {
                let span = self.convert_range(range);
                Ok(ExprLoc::new(span, Expr::List(self.parse_expressions(elts)?)))
            }
            AstExpr::Tuple(ast::ExprTuple { elts, range, .. }) => {
                let span = self.convert_range(range);
                Ok(ExprLoc::new(span, Expr::Tuple(self.parse_expressions(elts)?)))
            }
            AstExpr::Set(ast::ExprSet { elts, range, .. }) => {
                let span = self.convert_range(range);
                Ok(ExprLoc::new(span, Expr::Set(self.parse_expressions(elts)?)))
            }
            AstExpr::Dict(ast::ExprDict { items, range, .. }) => {
                let span = self.convert_range(range);
                let mut keys = Vec::with_capacity(items.len());
                let mut values = Vec::with_capacity(items.len());
                for item in items {
                    let Some(key) = item.key else {
                        return Err(ParseError::not_implemented("** unpacking in dict literals", span.line));
                    };
                    keys.push(self.parse_expression(key)?);
                    values.push(self.parse_expression(item.value)?);
                }
                Ok(ExprLoc::new(span, Expr::Dict { keys, values }))
            }
            other => {
                let line = self.line_of(other.range().start().into());
                Err(ParseError::not_implemented(
                    format!("this expression kind ({})", expression_kind(&other)),
                    line,
                ))
            }
        }
    }

    fn parse_expressions(&mut self, exprs: Vec<AstExpr>) -> Result<Vec<ExprLoc>, ParseError> {
        exprs.into_iter().map(|e| self.parse_expression(e)).collect()
    }
}

/// Parses an integer literal that may carry a radix prefix and underscores.
fn parse_long_int(text: &str) -> Option<BigInt> {
    let cleaned: String = text.chars().filter(|c| *c != '_').collect();
    let (digits, radix) = match cleaned.get(..2) {
        Some("0x" | "0X") => (&cleaned[2..], 16),
        Some("0o" | "0O") => (&cleaned[2..], 8),
        Some("0b" | "0B") => (&cleaned[2..], 2),
        _ => (cleaned.as_str(), 10),
    };
    if radix == 10 {
        BigInt::from_str(digits).ok()
    } else {
        BigInt::parse_bytes(digits.as_bytes(), radix)
    }
}

fn convert_op(op: ast::Operator) -> Operator {
    match op {
        ast::Operator::Add => Operator::Add,
        ast::Operator::Sub => Operator::Sub,
        ast::Operator::Mult => Operator::Mult,
        ast::Operator::MatMult => Operator::MatMult,
        ast::Operator::Div => Operator::Div,
        ast::Operator::Mod => Operator::Mod,
        ast::Operator::Pow => Operator::Pow,
        ast::Operator::LShift => Operator::LShift,
        ast::Operator::RShift => Operator::RShift,
        ast::Operator::BitOr => Operator::BitOr,
        ast::Operator::BitXor => Operator::BitXor,
        ast::Operator::BitAnd => Operator::BitAnd,
        ast::Operator::FloorDiv => Operator::FloorDiv,
    }
}

fn convert_cmp_op(op: ast::CmpOp) -> CmpOperator {
    match op {
        ast::CmpOp::Eq => CmpOperator::Eq,
        ast::CmpOp::NotEq => CmpOperator::NotEq,
        ast::CmpOp::Lt => CmpOperator::Lt,
        ast::CmpOp::LtE => CmpOperator::LtE,
        ast::CmpOp::Gt => CmpOperator::Gt,
        ast::CmpOp::GtE => CmpOperator::GtE,
        ast::CmpOp::Is => CmpOperator::Is,
        ast::CmpOp::IsNot => CmpOperator::IsNot,
        ast::CmpOp::In => CmpOperator::In,
        ast::CmpOp::NotIn => CmpOperator::NotIn,
    }
}

fn convert_bool_op(op: ast::BoolOp) -> BoolOperator {
    match op {
        ast::BoolOp::And => BoolOperator::And,
        ast::BoolOp::Or => BoolOperator::Or,
    }
}

fn convert_unary_op(op: ast::UnaryOp) -> UnaryOperator {
    match op {
        ast::UnaryOp::Invert => UnaryOperator::Invert,
        ast::UnaryOp::Not => UnaryOperator::Not,
        ast::UnaryOp::UAdd => UnaryOperator::Plus,
        ast::UnaryOp::USub => UnaryOperator::Minus,
    }
}

fn statement_kind(statement: &Stmt) -> &'static str {
    match statement {
        Stmt::ClassDef(_) => "class definitions",
        Stmt::Try(_) => "try statements",
        Stmt::With(_) => "with statements",
        Stmt::Match(_) => "match statements",
        Stmt::Raise(_) => "raise statements",
        Stmt::Assert(_) => "assert statements",
        Stmt::Import(_) | Stmt::ImportFrom(_) => "imports",
        Stmt::Global(_) => "global declarations",
        Stmt::Nonlocal(_) => "nonlocal declarations",
        Stmt::Delete(_) => "del statements",
        Stmt::AnnAssign(_) => "annotated assignments",
        Stmt::TypeAlias(_) => "type aliases",
        _ => "an unsupported statement",
    }
}

fn expression_kind(expression: &AstExpr) -> &'static str {
    match expression {
        AstExpr::Lambda(_) => "lambda expressions",
        AstExpr::ListComp(_) | AstExpr::SetComp(_) | AstExpr::DictComp(_) | AstExpr::Generator(_) => "comprehensions",
        AstExpr::Await(_) | AstExpr::Yield(_) | AstExpr::YieldFrom(_) => "await and yield expressions",
        AstExpr::FString(_) => "f-strings",
        AstExpr::Starred(_) => "starred expressions",
        AstExpr::Named(_) => "walrus assignments",
        AstExpr::BytesLiteral(_) => "bytes literals",
        AstExpr::EllipsisLiteral(_) => "ellipsis literals",
        _ => "an unsupported expression",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_int_radixes() {
        assert_eq!(parse_long_int("123"), BigInt::from_str("123").ok());
        assert_eq!(parse_long_int("0x_ff"), Some(BigInt::from(255)));
        assert_eq!(parse_long_int("0b1010"), Some(BigInt::from(10)));
        assert_eq!(parse_long_int("0o777"), Some(BigInt::from(511)));
        assert_eq!(parse_long_int("nope"), None);
    }
}
