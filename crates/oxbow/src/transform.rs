//! The dead-code elimination pipeline.
//!
//! One iteration removes dead assignments, repairs emptied blocks, renames
//! dead names that cannot be deleted syntactically to `_`, propagates
//! constants, and removes whatever the propagation just killed. Iterations
//! repeat until the tree stops changing; every pass recomputes its analysis
//! on the current tree, since earlier passes invalidate older tables.

use crate::{
    deadcode::{DeadCodeReport, find_dead_code},
    functions::FunctionTable,
    intern::StringId,
    propagate::ConstantPropagation,
    tree::{AssignTarget, Expr, ExprLoc, Node, Span},
};

/// Runs the transform pipeline to a structural fixpoint.
pub fn run_to_fixpoint(module: &mut Vec<Node>, ret: StringId, underscore: StringId) {
    loop {
        let before = module.clone();

        let functions = FunctionTable::collect(module);
        let report = find_dead_code(&functions, ret);
        remove_dead_assignments(module, &report, None);
        repair_blocks(module);

        let functions = FunctionTable::collect(module);
        let report = find_dead_code(&functions, ret);
        rename_dead_names(module, &report, underscore, None);

        let functions = FunctionTable::collect(module);
        ConstantPropagation::new(&functions, ret).apply(module);

        let functions = FunctionTable::collect(module);
        let report = find_dead_code(&functions, ret);
        remove_dead_assignments(module, &report, None);
        repair_blocks(module);

        if *module == before {
            break;
        }
    }
}

/// Deletes assignments whose targets are all dead.
///
/// Only plain-name targets are candidates; an assignment with several name
/// targets drops just the dead ones and survives while any live target
/// remains. Anything with a tuple or subscript target is left alone.
fn remove_dead_assignments(nodes: &mut Vec<Node>, report: &DeadCodeReport, func: Option<StringId>) {
    nodes.retain_mut(|node| match node {
        Node::FunctionDef(def) => {
            remove_dead_assignments(&mut def.body, report, Some(def.name.name));
            true
        }
        Node::If { body, orelse, .. } => {
            remove_dead_assignments(body, report, func);
            remove_dead_assignments(orelse, report, func);
            true
        }
        Node::For { body, .. } | Node::While { body, .. } => {
            remove_dead_assignments(body, report, func);
            true
        }
        Node::Assign { targets, span, .. } => {
            let Some(func) = func else { return true };
            if let [AssignTarget::Name(ident)] = targets.as_slice() {
                return !report.is_dead_definition(func, ident.name, span.line);
            }
            if targets.iter().all(|t| matches!(t, AssignTarget::Name(_))) {
                let line = span.line;
                targets.retain(|target| {
                    let AssignTarget::Name(ident) = target else { return true };
                    !report.is_dead_definition(func, ident.name, line)
                });
                return !targets.is_empty();
            }
            true
        }
        _ => true,
    });
}

/// Repairs blocks that lost their contents: an `if` with nothing left in
/// either branch disappears, an `if` with only an else keeps a `pass`, and
/// an emptied `for` loop vanishes with its iteration.
fn repair_blocks(nodes: &mut Vec<Node>) {
    for node in nodes.iter_mut() {
        match node {
            Node::FunctionDef(def) => repair_blocks(&mut def.body),
            Node::If { body, orelse, .. } => {
                repair_blocks(body);
                repair_blocks(orelse);
            }
            Node::For { body, .. } | Node::While { body, .. } => repair_blocks(body),
            _ => {}
        }
    }
    nodes.retain_mut(|node| match node {
        Node::If { body, orelse, span, .. } => {
            if body.is_empty() && orelse.is_empty() {
                return false;
            }
            if body.is_empty() {
                body.push(Node::Pass(Span::new(span.line, span.line)));
            }
            true
        }
        Node::For { body, .. } => !body.is_empty(),
        _ => true,
    });
}

/// Renames remaining occurrences of dead names to `_`.
///
/// This is how loop iterator targets surface as dead: the `for` statement
/// itself cannot be deleted, but its never-read target can be blanked.
fn rename_dead_names(nodes: &mut [Node], report: &DeadCodeReport, underscore: StringId, func: Option<StringId>) {
    for node in nodes {
        match node {
            Node::FunctionDef(def) => {
                rename_dead_names(&mut def.body, report, underscore, Some(def.name.name));
            }
            Node::Expr(expr) => rename_in_expr(expr, report, underscore, func),
            Node::Return { value, .. } => {
                if let Some(value) = value {
                    rename_in_expr(value, report, underscore, func);
                }
            }
            Node::Assign { targets, value, .. } => {
                for target in targets.iter_mut() {
                    rename_in_target(target, report, underscore, func);
                }
                rename_in_expr(value, report, underscore, func);
            }
            Node::AugAssign { target, value, .. } => {
                rename_in_target(target, report, underscore, func);
                rename_in_expr(value, report, underscore, func);
            }
            Node::If { test, body, orelse, .. } => {
                rename_in_expr(test, report, underscore, func);
                rename_dead_names(body, report, underscore, func);
                rename_dead_names(orelse, report, underscore, func);
            }
            Node::For { target, iter, body, .. } => {
                rename_in_target(target, report, underscore, func);
                rename_in_expr(iter, report, underscore, func);
                rename_dead_names(body, report, underscore, func);
            }
            Node::While { test, body, .. } => {
                rename_in_expr(test, report, underscore, func);
                rename_dead_names(body, report, underscore, func);
            }
            Node::Break(_) | Node::Continue(_) | Node::Pass(_) => {}
        }
    }
}

fn rename_in_target(target: &mut AssignTarget, report: &DeadCodeReport, underscore: StringId, func: Option<StringId>) {
    match target {
        AssignTarget::Name(ident) => {
            if let Some(func) = func
                && report.is_dead_definition(func, ident.name, ident.line)
            {
                ident.name = underscore;
            }
        }
        AssignTarget::Tuple { elts, .. } => {
            for elt in elts {
                rename_in_target(elt, report, underscore, func);
            }
        }
        AssignTarget::Subscript { object, index, .. } => {
            rename_in_expr(object, report, underscore, func);
            rename_in_expr(index, report, underscore, func);
        }
    }
}

fn rename_in_expr(expr: &mut ExprLoc, report: &DeadCodeReport, underscore: StringId, func: Option<StringId>) {
    match &mut expr.expr {
        Expr::Name(ident) => {
            if let Some(func) = func
                && report.is_dead_definition(func, ident.name, ident.line)
            {
                ident.name = underscore;
            }
        }
        Expr::Unary { operand, .. } => rename_in_expr(operand, report, underscore, func),
        Expr::Binary { left, right, .. } => {
            rename_in_expr(left, report, underscore, func);
            rename_in_expr(right, report, underscore, func);
        }
        Expr::BoolOp { values, .. } => {
            for value in values {
                rename_in_expr(value, report, underscore, func);
            }
        }
        Expr::Compare { left, comparators, .. } => {
            rename_in_expr(left, report, underscore, func);
            for comparator in comparators {
                rename_in_expr(comparator, report, underscore, func);
            }
        }
        Expr::Call { func: callee, args } => {
            rename_in_expr(callee, report, underscore, func);
            for arg in args {
                rename_in_expr(arg, report, underscore, func);
            }
        }
        Expr::IfElse { test, body, orelse } => {
            rename_in_expr(test, report, underscore, func);
            rename_in_expr(body, report, underscore, func);
            rename_in_expr(orelse, report, underscore, func);
        }
        Expr::Attribute { object, .. } => rename_in_expr(object, report, underscore, func),
        Expr::Subscript { object, index } => {
            rename_in_expr(object, report, underscore, func);
            rename_in_expr(index, report, underscore, func);
        }
        Expr::Slice { lower, upper, step } => {
            for part in [lower, upper, step].into_iter().flatten() {
                rename_in_expr(part, report, underscore, func);
            }
        }
        Expr::List(elts) | Expr::Tuple(elts) | Expr::Set(elts) => {
            for elt in elts {
                rename_in_expr(elt, report, underscore, func);
            }
        }
        Expr::Dict { keys, values } => {
            for key in keys {
                rename_in_expr(key, report, underscore, func);
            }
            for value in values {
                rename_in_expr(value, report, underscore, func);
            }
        }
        Expr::Literal(_) => {}
    }
}
