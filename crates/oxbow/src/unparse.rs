//! Re-emission of the tree as Python source.
//!
//! A plain precedence-aware pretty-printer: 4-space indents, canonical
//! operator spacing, minimal parentheses. Exists so the transform mode has
//! textual output; it is not part of the dataflow core.

use crate::{
    intern::Interner,
    tree::{AssignTarget, BoolOperator, Expr, ExprLoc, Literal, Node, UnaryOperator},
};

/// Operator precedence levels, higher binds tighter.
mod prec {
    pub const TERNARY: u8 = 1;
    pub const OR: u8 = 2;
    pub const AND: u8 = 3;
    pub const NOT: u8 = 4;
    pub const CMP: u8 = 5;
    pub const BIT_OR: u8 = 6;
    pub const BIT_XOR: u8 = 7;
    pub const BIT_AND: u8 = 8;
    pub const SHIFT: u8 = 9;
    pub const ARITH: u8 = 10;
    pub const TERM: u8 = 11;
    pub const UNARY: u8 = 12;
    pub const POWER: u8 = 13;
    pub const ATOM: u8 = 14;
}

/// Renders a module back to source text.
#[must_use]
pub fn unparse(module: &[Node], interner: &Interner) -> String {
    let mut out = String::new();
    write_stmts(module, 0, interner, &mut out);
    out
}

fn write_stmts(nodes: &[Node], indent: usize, interner: &Interner, out: &mut String) {
    if nodes.is_empty() {
        // A block can lose all statements to the transformers; keep the
        // emitted program syntactically valid.
        push_indent(indent, out);
        out.push_str("pass\n");
        return;
    }
    for node in nodes {
        write_stmt(node, indent, interner, out);
    }
}

fn write_stmt(node: &Node, indent: usize, interner: &Interner, out: &mut String) {
    push_indent(indent, out);
    match node {
        Node::Expr(expr) => {
            write_expr(expr, 0, interner, out);
            out.push('\n');
        }
        Node::Return { value, .. } => {
            out.push_str("return");
            if let Some(value) = value {
                out.push(' ');
                write_expr(value, 0, interner, out);
            }
            out.push('\n');
        }
        Node::Assign { targets, value, .. } => {
            for target in targets {
                write_target(target, true, interner, out);
                out.push_str(" = ");
            }
            write_expr(value, 0, interner, out);
            out.push('\n');
        }
        Node::AugAssign { target, op, value, .. } => {
            write_target(target, true, interner, out);
            out.push_str(&format!(" {op}= "));
            write_expr(value, 0, interner, out);
            out.push('\n');
        }
        Node::If {
            test, body, orelse, ..
        } => {
            out.push_str("if ");
            write_expr(test, 0, interner, out);
            out.push_str(":\n");
            write_stmts(body, indent + 1, interner, out);
            write_orelse(orelse, indent, interner, out);
        }
        Node::For {
            target, iter, body, ..
        } => {
            out.push_str("for ");
            write_target(target, true, interner, out);
            out.push_str(" in ");
            write_expr(iter, 0, interner, out);
            out.push_str(":\n");
            write_stmts(body, indent + 1, interner, out);
        }
        Node::While { test, body, .. } => {
            out.push_str("while ");
            write_expr(test, 0, interner, out);
            out.push_str(":\n");
            write_stmts(body, indent + 1, interner, out);
        }
        Node::Break(_) => out.push_str("break\n"),
        Node::Continue(_) => out.push_str("continue\n"),
        Node::Pass(_) => out.push_str("pass\n"),
        Node::FunctionDef(func) => {
            out.push_str("def ");
            out.push_str(interner.resolve(func.name.name));
            out.push('(');
            for (i, &param) in func.params.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                out.push_str(interner.resolve(param));
            }
            out.push_str("):\n");
            write_stmts(&func.body, indent + 1, interner, out);
        }
    }
}

/// An `else` holding a single `if` renders as `elif`.
fn write_orelse(orelse: &[Node], indent: usize, interner: &Interner, out: &mut String) {
    if orelse.is_empty() {
        return;
    }
    if let [
        Node::If {
            test, body, orelse, ..
        },
    ] = orelse
    {
        push_indent(indent, out);
        out.push_str("elif ");
        write_expr(test, 0, interner, out);
        out.push_str(":\n");
        write_stmts(body, indent + 1, interner, out);
        write_orelse(orelse, indent, interner, out);
        return;
    }
    push_indent(indent, out);
    out.push_str("else:\n");
    write_stmts(orelse, indent + 1, interner, out);
}

fn write_target(target: &AssignTarget, top_level: bool, interner: &Interner, out: &mut String) {
    match target {
        AssignTarget::Name(ident) => out.push_str(interner.resolve(ident.name)),
        AssignTarget::Tuple { elts, .. } => {
            if !top_level {
                out.push('(');
            }
            for (i, elt) in elts.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_target(elt, false, interner, out);
            }
            if elts.len() == 1 {
                out.push(',');
            }
            if !top_level {
                out.push(')');
            }
        }
        AssignTarget::Subscript { object, index, .. } => {
            write_expr(object, prec::ATOM, interner, out);
            out.push('[');
            write_index(index, interner, out);
            out.push(']');
        }
    }
}

fn write_expr(expr: &ExprLoc, ctx: u8, interner: &Interner, out: &mut String) {
    let own = expr_prec(&expr.expr);
    let parens = own < ctx;
    if parens {
        out.push('(');
    }
    match &expr.expr {
        Expr::Literal(literal) => out.push_str(&render_literal(literal, interner)),
        Expr::Name(ident) => out.push_str(interner.resolve(ident.name)),
        Expr::Unary { op, operand } => {
            match op {
                UnaryOperator::Not => out.push_str("not "),
                _ => out.push_str(&op.to_string()),
            }
            write_expr(operand, own, interner, out);
        }
        Expr::Binary { left, op, right } => {
            let right_ctx = if own == prec::POWER { own } else { own + 1 };
            let left_ctx = if own == prec::POWER { own + 1 } else { own };
            write_expr(left, left_ctx, interner, out);
            out.push_str(&format!(" {op} "));
            write_expr(right, right_ctx, interner, out);
        }
        Expr::BoolOp { op, values } => {
            for (i, value) in values.iter().enumerate() {
                if i > 0 {
                    out.push_str(&format!(" {op} "));
                }
                write_expr(value, own + 1, interner, out);
            }
        }
        Expr::Compare {
            left, ops, comparators, ..
        } => {
            write_expr(left, own + 1, interner, out);
            for (op, comparator) in ops.iter().zip(comparators) {
                out.push_str(&format!(" {op} "));
                write_expr(comparator, own + 1, interner, out);
            }
        }
        Expr::Call { func, args } => {
            write_expr(func, prec::ATOM, interner, out);
            out.push('(');
            for (i, arg) in args.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_expr(arg, 0, interner, out);
            }
            out.push(')');
        }
        Expr::IfElse { test, body, orelse } => {
            write_expr(body, own + 1, interner, out);
            out.push_str(" if ");
            write_expr(test, own + 1, interner, out);
            out.push_str(" else ");
            write_expr(orelse, own, interner, out);
        }
        Expr::Attribute { object, attr } => {
            write_expr(object, prec::ATOM, interner, out);
            out.push('.');
            out.push_str(interner.resolve(*attr));
        }
        Expr::Subscript { object, index } => {
            write_expr(object, prec::ATOM, interner, out);
            out.push('[');
            write_index(index, interner, out);
            out.push(']');
        }
        Expr::Slice { lower, upper, step } => {
            if let Some(lower) = lower {
                write_expr(lower, 0, interner, out);
            }
            out.push(':');
            if let Some(upper) = upper {
                write_expr(upper, 0, interner, out);
            }
            if let Some(step) = step {
                out.push(':');
                write_expr(step, 0, interner, out);
            }
        }
        Expr::List(elts) => {
            out.push('[');
            write_comma_separated(elts, interner, out);
            out.push(']');
        }
        Expr::Tuple(elts) => {
            out.push('(');
            write_comma_separated(elts, interner, out);
            if elts.len() == 1 {
                out.push(',');
            }
            out.push(')');
        }
        Expr::Set(elts) => {
            if elts.is_empty() {
                out.push_str("set()");
            } else {
                out.push('{');
                write_comma_separated(elts, interner, out);
                out.push('}');
            }
        }
        Expr::Dict { keys, values } => {
            out.push('{');
            for (i, (key, value)) in keys.iter().zip(values).enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_expr(key, 0, interner, out);
                out.push_str(": ");
                write_expr(value, 0, interner, out);
            }
            out.push('}');
        }
    }
    if parens {
        out.push(')');
    }
}

/// Subscript indexes print slices bare and tuples without parentheses.
fn write_index(index: &ExprLoc, interner: &Interner, out: &mut String) {
    match &index.expr {
        Expr::Slice { .. } => write_expr(index, 0, interner, out),
        Expr::Tuple(elts) if !elts.is_empty() => {
            write_comma_separated(elts, interner, out);
            if elts.len() == 1 {
                out.push(',');
            }
        }
        _ => write_expr(index, 0, interner, out),
    }
}

fn write_comma_separated(exprs: &[ExprLoc], interner: &Interner, out: &mut String) {
    for (i, expr) in exprs.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        write_expr(expr, 0, interner, out);
    }
}

fn expr_prec(expr: &Expr) -> u8 {
    match expr {
        Expr::IfElse { .. } => prec::TERNARY,
        Expr::BoolOp { op, .. } => match op {
            BoolOperator::Or => prec::OR,
            BoolOperator::And => prec::AND,
        },
        Expr::Unary { op, .. } => match op {
            UnaryOperator::Not => prec::NOT,
            _ => prec::UNARY,
        },
        Expr::Compare { .. } => prec::CMP,
        Expr::Binary { op, .. } => binary_prec(*op),
        Expr::Slice { .. } => 0,
        _ => prec::ATOM,
    }
}

fn binary_prec(op: crate::tree::Operator) -> u8 {
    use crate::tree::Operator;
    match op {
        Operator::BitOr => prec::BIT_OR,
        Operator::BitXor => prec::BIT_XOR,
        Operator::BitAnd => prec::BIT_AND,
        Operator::LShift | Operator::RShift => prec::SHIFT,
        Operator::Add | Operator::Sub => prec::ARITH,
        Operator::Mult | Operator::Div | Operator::FloorDiv | Operator::Mod | Operator::MatMult => prec::TERM,
        Operator::Pow => prec::POWER,
    }
}

/// Renders a literal the way Python spells it.
pub(crate) fn render_literal(literal: &Literal, interner: &Interner) -> String {
    match literal {
        Literal::None => "None".to_owned(),
        Literal::Bool(true) => "True".to_owned(),
        Literal::Bool(false) => "False".to_owned(),
        Literal::Int(i) => i.to_string(),
        Literal::LongInt(i) => i.to_string(),
        Literal::Float(f) => {
            let mut buffer = ryu::Buffer::new();
            buffer.format(*f).to_owned()
        }
        Literal::Str(id) => {
            let mut quoted = String::from("'");
            for c in interner.resolve(*id).chars() {
                match c {
                    '\\' => quoted.push_str("\\\\"),
                    '\'' => quoted.push_str("\\'"),
                    '\n' => quoted.push_str("\\n"),
                    '\r' => quoted.push_str("\\r"),
                    '\t' => quoted.push_str("\\t"),
                    _ => quoted.push(c),
                }
            }
            quoted.push('\'');
            quoted
        }
    }
}

fn push_indent(indent: usize, out: &mut String) {
    for _ in 0..indent {
        out.push_str("    ");
    }
}
