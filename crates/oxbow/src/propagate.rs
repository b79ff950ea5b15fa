//! Constant propagation.
//!
//! For a name read at some line, find the newest definition before that line
//! whose scope dominates the read's scope; when that definition's dependency
//! list is a single literal constant, the read is replaced by the literal.
//! Runs on the propagation-mode analysis so constants appear as tokens.

use indexmap::IndexMap;

use crate::{
    analysis::{Analysis, EvalMode},
    functions::FunctionTable,
    intern::StringId,
    tables::{FunctionFlow, Loc, Token, compare_scopes, scope_for_line},
    tree::{AssignTarget, Expr, ExprLoc, Literal, Node},
};

/// Constant propagator over a whole module.
///
/// Holds one propagation-mode flow per function, computed up front; applying
/// it rewrites qualifying name reads in place.
pub struct ConstantPropagation {
    flows: IndexMap<StringId, FunctionFlow>,
}

impl ConstantPropagation {
    #[must_use]
    pub fn new(functions: &FunctionTable, ret: StringId) -> Self {
        let mut flows = IndexMap::new();
        for (name, func) in functions.iter() {
            let mut analysis = Analysis::new(functions, EvalMode::Propagation, ret);
            if let Some(flow) = analysis.function_flow(func, Vec::new()) {
                flows.insert(name, flow);
            }
        }
        Self { flows }
    }

    /// Rewrites constant reads across every function body in the module.
    pub fn apply(&self, module: &mut [Node]) {
        for node in module {
            if let Node::FunctionDef(func) = node
                && let Some(flow) = self.flows.get(&func.name.name)
            {
                self.rewrite_body(&mut func.body, flow);
            }
        }
    }

    fn rewrite_body(&self, body: &mut [Node], flow: &FunctionFlow) {
        for node in body {
            match node {
                Node::Expr(expr) => self.rewrite_expr(expr, flow),
                Node::Return { value, .. } => {
                    if let Some(value) = value {
                        self.rewrite_expr(value, flow);
                    }
                }
                Node::Assign { targets, value, .. } => {
                    for target in targets {
                        self.rewrite_target(target, flow);
                    }
                    self.rewrite_expr(value, flow);
                }
                Node::AugAssign { target, value, .. } => {
                    self.rewrite_target(target, flow);
                    self.rewrite_expr(value, flow);
                }
                Node::If { test, body, orelse, .. } => {
                    self.rewrite_expr(test, flow);
                    self.rewrite_body(body, flow);
                    self.rewrite_body(orelse, flow);
                }
                Node::For { iter, body, .. } => {
                    // Loop targets are definitions; only the iterable reads.
                    self.rewrite_expr(iter, flow);
                    self.rewrite_body(body, flow);
                }
                Node::While { test, body, .. } => {
                    self.rewrite_expr(test, flow);
                    self.rewrite_body(body, flow);
                }
                Node::Break(_) | Node::Continue(_) | Node::Pass(_) => {}
                // Nested functions have flows of their own.
                Node::FunctionDef(func) => {
                    if let Some(nested) = self.flows.get(&func.name.name) {
                        self.rewrite_body(&mut func.body, nested);
                    }
                }
            }
        }
    }

    /// Subscript targets read their object and index; name and tuple targets
    /// are pure definitions and stay untouched.
    fn rewrite_target(&self, target: &mut AssignTarget, flow: &FunctionFlow) {
        match target {
            AssignTarget::Name(_) => {}
            AssignTarget::Tuple { elts, .. } => {
                for elt in elts {
                    self.rewrite_target(elt, flow);
                }
            }
            AssignTarget::Subscript { object, index, .. } => {
                self.rewrite_expr(object, flow);
                self.rewrite_expr(index, flow);
            }
        }
    }

    fn rewrite_expr(&self, expr: &mut ExprLoc, flow: &FunctionFlow) {
        if let Expr::Name(ident) = &expr.expr {
            if let Some(literal) = constant_for(flow, ident.name, ident.line) {
                expr.expr = Expr::Literal(literal);
            }
            return;
        }
        match &mut expr.expr {
            Expr::Unary { operand, .. } => self.rewrite_expr(operand, flow),
            Expr::Binary { left, right, .. } => {
                self.rewrite_expr(left, flow);
                self.rewrite_expr(right, flow);
            }
            Expr::BoolOp { values, .. } => {
                for value in values {
                    self.rewrite_expr(value, flow);
                }
            }
            Expr::Compare { left, comparators, .. } => {
                self.rewrite_expr(left, flow);
                for comparator in comparators {
                    self.rewrite_expr(comparator, flow);
                }
            }
            Expr::Call { func, args } => {
                self.rewrite_expr(func, flow);
                for arg in args {
                    self.rewrite_expr(arg, flow);
                }
            }
            Expr::IfElse { test, body, orelse } => {
                self.rewrite_expr(test, flow);
                self.rewrite_expr(body, flow);
                self.rewrite_expr(orelse, flow);
            }
            Expr::Attribute { object, .. } => self.rewrite_expr(object, flow),
            Expr::Subscript { object, index } => {
                self.rewrite_expr(object, flow);
                self.rewrite_expr(index, flow);
            }
            Expr::Slice { lower, upper, step } => {
                for part in [lower, upper, step].into_iter().flatten() {
                    self.rewrite_expr(part, flow);
                }
            }
            Expr::List(elts) | Expr::Tuple(elts) | Expr::Set(elts) => {
                for elt in elts {
                    self.rewrite_expr(elt, flow);
                }
            }
            Expr::Dict { keys, values } => {
                for key in keys {
                    self.rewrite_expr(key, flow);
                }
                for value in values {
                    self.rewrite_expr(value, flow);
                }
            }
            Expr::Literal(_) | Expr::Name(_) => {}
        }
    }
}

/// The literal to substitute for a read of `name` at `line`, if the
/// propagation rule fires.
fn constant_for(flow: &FunctionFlow, name: StringId, line: u32) -> Option<Literal> {
    let uses = flow.uses.get(&name)?;
    let defs = flow.refs.get(&name)?;
    let loc = Loc::Real(line);
    // The occurrence must be a recorded read, and not itself a definition
    // site of the same name (augmented assignments read and write at once).
    if !uses.contains(&loc) || defs.contains_key(&loc) {
        return None;
    }
    let scopes = flow.scopes.get(&name)?;
    let use_scope = scope_for_line(flow, line);
    let mut newest: Option<Loc> = None;
    for &def_loc in defs.keys() {
        if def_loc >= loc {
            continue;
        }
        let Some(def_scope) = scopes.get(&def_loc) else {
            continue;
        };
        if !compare_scopes(&use_scope, def_scope) {
            continue;
        }
        if newest.is_none_or(|best| def_loc > best) {
            newest = Some(def_loc);
        }
    }
    let deps = defs[&newest?].deps();
    match deps {
        [Token::Const(literal)] => Some(literal.clone()),
        _ => None,
    }
}
