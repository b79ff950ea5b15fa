//! The reaching-definition dataflow engine.
//!
//! One [`Analysis`] walks a function's tree depth-first, maintaining the
//! reference, last-update, use, and scope tables. Expressions are evaluated
//! purely (returning the tokens they read); statements mutate the tables.
//! Conditionals fork the state and merge the branches at a synthetic
//! location, loops iterate their body to a fixpoint, and calls to
//! user-defined functions recurse into the callee with the argument reads
//! bound to its parameters.
//!
//! The engine runs in one of two modes. *Analysis* mode descends into user
//! functions and ignores literals; it backs the interactive dependency
//! queries. *Propagation* mode records literals as dependency tokens and
//! treats every call as opaque; it backs dead-code elimination and constant
//! propagation.

use indexmap::IndexMap;

use crate::{
    functions::FunctionTable,
    intern::StringId,
    tables::{
        FlowState, FunctionFlow, Loc, RefEntry, ScopeStack, ScopeTable, Token, UseTable, dedup_tokens, same_token_set,
    },
    tree::{AssignTarget, Expr, ExprLoc, FunctionDef, Node, NodeId, Span},
};

/// Which evaluator behavior a pass wants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvalMode {
    /// Descend into user-function calls; literals contribute nothing.
    Analysis,
    /// Record literals as constant tokens; never descend into callees.
    Propagation,
}

/// Dataflow walker over one function at a time.
///
/// The function table is shared read-only; everything else is owned per
/// invocation of [`Analysis::function_flow`] (a call join swaps in fresh
/// state for the callee and restores the caller's afterwards).
pub struct Analysis<'a> {
    functions: &'a FunctionTable,
    mode: EvalMode,
    /// Interned `"return"`, the reserved key for return-site entries.
    ret: StringId,
    /// Stack of enclosing control-structure ids.
    scope: ScopeStack,
    /// Scope snapshots for the invocation currently being processed.
    scopes: ScopeTable,
    /// Functions currently being joined, to cut self-referential calls.
    active_calls: Vec<StringId>,
}

impl<'a> Analysis<'a> {
    #[must_use]
    pub fn new(functions: &'a FunctionTable, mode: EvalMode, ret: StringId) -> Self {
        Self {
            functions,
            mode,
            ret,
            scope: ScopeStack::new(),
            scopes: ScopeTable::new(),
            active_calls: Vec::new(),
        }
    }

    /// Analyzes one function, binding `args` (the callers' argument reads)
    /// to its parameters. An empty `args` means top-level analysis: every
    /// parameter is bound to an empty dependency list.
    ///
    /// Returns `None` on arity mismatch or when the function is already on
    /// the evaluation stack; callers treat both as a black-box call.
    pub fn function_flow(&mut self, func: &FunctionDef, args: Vec<Vec<Token>>) -> Option<FunctionFlow> {
        if !args.is_empty() && args.len() != func.params.len() {
            return None;
        }
        if self.active_calls.contains(&func.name.name) {
            return None;
        }
        self.active_calls.push(func.name.name);
        let saved_stack = std::mem::take(&mut self.scope);
        let saved_scopes = std::mem::take(&mut self.scopes);

        let mut st = FlowState::default();
        let mut uses = UseTable::new();
        let def_loc = Loc::Real(func.span.line);
        let bound: Vec<(StringId, Vec<Token>)> = if args.is_empty() {
            func.params.iter().map(|&p| (p, Vec::new())).collect()
        } else {
            func.params.iter().copied().zip(args).collect()
        };
        for (param, deps) in bound {
            st.refs.entry(param).or_default().insert(def_loc, RefEntry::Deps(deps));
            st.last.insert(param, def_loc);
            self.set_scope(param, def_loc);
        }

        for node in &func.body {
            self.process_node(node, &mut st, &mut uses);
        }

        // Merge every return site into the join entry at "line 0".
        let mut collection = Vec::new();
        if let Some(returns) = st.refs.get(&self.ret) {
            for entry in returns.values() {
                collection.extend(entry.deps().iter().cloned());
            }
        }
        st.refs
            .entry(self.ret)
            .or_default()
            .insert(Loc::ReturnJoin, RefEntry::Deps(collection));
        self.scopes
            .entry(self.ret)
            .or_default()
            .insert(Loc::ReturnJoin, ScopeStack::new());

        let scopes = std::mem::replace(&mut self.scopes, saved_scopes);
        self.scope = saved_stack;
        self.active_calls.pop();
        Some(FunctionFlow {
            refs: st.refs,
            uses,
            scopes,
        })
    }

    fn set_scope(&mut self, var: StringId, loc: Loc) {
        self.scopes.entry(var).or_default().insert(loc, self.scope.clone());
    }

    // === statements ===

    fn process_node(&mut self, node: &Node, st: &mut FlowState, uses: &mut UseTable) {
        match node {
            Node::Expr(expr) => {
                let _ = self.eval_expr(expr, st, uses);
            }
            Node::Return { value, span } => {
                let res = match value {
                    Some(value) => self.eval_expr(value, st, uses),
                    None => Vec::new(),
                };
                let loc = Loc::Real(span.line);
                st.refs
                    .entry(self.ret)
                    .or_default()
                    .insert(loc, RefEntry::Deps(res.clone()));
                self.set_scope(self.ret, loc);
                for token in &res {
                    record_use(uses, token, loc);
                }
            }
            Node::Assign { targets, value, span } => {
                for target in targets {
                    self.assign(target, value, span.line, st, uses);
                }
            }
            Node::AugAssign { target, value, span, .. } => {
                let deps = self.eval_expr(value, st, uses);
                let res = match target {
                    // Subscript indexes do not change; the definition lands
                    // on the outermost base.
                    AssignTarget::Subscript { object, .. } => {
                        let base = peel_subscript(object);
                        names_of(&self.eval_expr(base, st, uses))
                    }
                    _ => self.eval_target(target, st, uses),
                };
                self.assign_forced(&res, &deps, span.line, true, st, uses);
            }
            Node::If {
                test,
                body,
                orelse,
                span,
                id,
                else_id,
            } => {
                self.scope.push(*id);
                self.process_if(test, body, orelse, *span, *else_id, st, uses);
            }
            Node::For {
                target,
                iter,
                body,
                span,
                id,
            } => {
                self.scope.push(*id);
                let targets = self.eval_target(target, st, uses);
                let deps = self.eval_expr(iter, st, uses);
                let loc = Loc::Real(span.line);
                for token in &deps {
                    record_use(uses, token, loc);
                }
                // Each loop target gets a fresh definition history seeded
                // from the iterable's reads.
                for &name in &targets {
                    let mut defs = IndexMap::new();
                    defs.insert(loc, RefEntry::Deps(deps.clone()));
                    st.refs.insert(name, defs);
                    st.last.insert(name, loc);
                    let mut scope_map = IndexMap::new();
                    scope_map.insert(loc, self.scope.clone());
                    self.scopes.insert(name, scope_map);
                }
                self.loop_fixpoint(span.line, span.end_line, body, st, uses);
            }
            Node::While { body, span, id, .. } => {
                // The loop test is not consulted; only the body feeds the tables.
                self.scope.push(*id);
                self.loop_fixpoint(span.line, span.end_line, body, st, uses);
            }
            Node::Break(_) | Node::Continue(_) | Node::Pass(_) | Node::FunctionDef(_) => {}
        }
    }

    /// Processes one assignment target.
    ///
    /// A tuple target with a matching tuple value desugars element-wise,
    /// all elements sharing the statement's line.
    fn assign(&mut self, target: &AssignTarget, value: &ExprLoc, line: u32, st: &mut FlowState, uses: &mut UseTable) {
        match target {
            AssignTarget::Tuple { elts, .. } => {
                if let Expr::Tuple(values) = &value.expr
                    && values.len() == elts.len()
                {
                    for (elt, val) in elts.iter().zip(values) {
                        self.assign(elt, val, line, st, uses);
                    }
                    return;
                }
                let deps = self.eval_expr(value, st, uses);
                let res = self.eval_target(target, st, uses);
                self.assign_checked(&res, &deps, line, st, uses);
            }
            AssignTarget::Subscript { object, .. } => {
                let deps = self.eval_expr(value, st, uses);
                let base = peel_subscript(object);
                let res = names_of(&self.eval_expr(base, st, uses));
                self.assign_forced(&res, &deps, line, false, st, uses);
            }
            AssignTarget::Name(ident) => {
                let deps = self.eval_expr(value, st, uses);
                self.assign_checked(&[ident.name], &deps, line, st, uses);
            }
        }
    }

    /// Plain assignment. The prior definition is unioned in only when the
    /// target itself appears among the value's reads (`a = a + 1`);
    /// otherwise the new dependency list replaces the old one. A previously
    /// unseen target gets a fresh entry with no union and no self-use.
    fn assign_checked(&mut self, targets: &[StringId], deps: &[Token], line: u32, st: &mut FlowState, uses: &mut UseTable) {
        let loc = Loc::Real(line);
        for token in deps {
            record_use(uses, token, loc);
        }
        for &name in targets {
            let self_read = deps.iter().any(|t| t.as_name() == Some(name));
            let entry = if st.refs.contains_key(&name) && self_read {
                let mut combined = st.head(name).to_vec();
                combined.extend(deps.iter().cloned());
                combined
            } else {
                deps.to_vec()
            };
            st.refs.entry(name).or_default().insert(loc, RefEntry::Deps(entry));
            st.last.insert(name, loc);
            self.set_scope(name, loc);
        }
    }

    /// Assignment that always unions with the prior definition: augmented
    /// assignment (`is_aug`, which also records a self-read and appends the
    /// target as its own dependency) and subscript-target assignment (the
    /// container keeps its previous contents).
    fn assign_forced(
        &mut self,
        targets: &[StringId],
        deps: &[Token],
        line: u32,
        is_aug: bool,
        st: &mut FlowState,
        uses: &mut UseTable,
    ) {
        let loc = Loc::Real(line);
        for token in deps {
            record_use(uses, token, loc);
        }
        for &name in targets {
            let mut augmented = deps.to_vec();
            if is_aug {
                augmented.push(Token::Name(name));
                record_use(uses, &Token::Name(name), loc);
            }
            let entry = if st.refs.contains_key(&name) {
                let mut combined = st.head(name).to_vec();
                combined.extend(augmented);
                combined
            } else {
                augmented
            };
            st.refs.entry(name).or_default().insert(loc, RefEntry::Deps(entry));
            st.last.insert(name, loc);
            self.set_scope(name, loc);
        }
    }

    /// Names defined by an assignment target. Subscript elements contribute
    /// the names read by their object and index expressions.
    fn eval_target(&mut self, target: &AssignTarget, st: &mut FlowState, uses: &mut UseTable) -> Vec<StringId> {
        match target {
            AssignTarget::Name(ident) => vec![ident.name],
            AssignTarget::Tuple { elts, .. } => {
                let mut names = Vec::new();
                for elt in elts {
                    names.extend(self.eval_target(elt, st, uses));
                }
                names
            }
            AssignTarget::Subscript { object, index, .. } => {
                let mut tokens = self.eval_expr(object, st, uses);
                tokens.extend(self.eval_expr(index, st, uses));
                names_of(&tokens)
            }
        }
    }

    // === control flow ===

    /// Conditional merge. The caller has already pushed the `if`'s scope id;
    /// it is popped here once the body is done, mirroring the state forks:
    /// the body runs on the live state, the else branch on a copy, and the
    /// two are unified at the construct's synthetic exit location.
    fn process_if(
        &mut self,
        test: &ExprLoc,
        body: &[Node],
        orelse: &[Node],
        span: Span,
        else_id: NodeId,
        st: &mut FlowState,
        uses: &mut UseTable,
    ) {
        let test_loc = Loc::Real(test.span.line);
        let test_reads = self.eval_expr(test, st, uses);
        for token in &test_reads {
            record_use(uses, token, test_loc);
        }

        let before = st.clone();
        let mut else_state = st.clone();

        for node in body {
            self.process_node(node, st, uses);
        }
        self.scope.pop();

        // Give a plain else branch its own scope identity; an elif chain is
        // just a nested `if` and brings its own.
        let pushed = !orelse.is_empty() && !matches!(orelse[0], Node::If { .. });
        if pushed {
            self.scope.push(else_id);
        }
        for node in orelse {
            self.process_node(node, &mut else_state, uses);
        }
        if pushed {
            self.scope.pop();
        }

        let merge_loc = Loc::Merge(span.end_line);
        let vars: Vec<StringId> = st.refs.keys().copied().collect();
        for var in vars {
            if var == self.ret || self.functions.contains(var) {
                continue;
            }
            let differs = match else_state.refs.get(&var) {
                Some(else_defs) => st.refs[&var] != *else_defs,
                None => false,
            };
            if differs {
                let mut merged = st.head(var).to_vec();
                merged.extend(else_state.head(var).iter().cloned());
                let else_defs = else_state.refs[&var].clone();
                let defs = st.refs.get_mut(&var).expect("var listed from refs");
                for (loc, entry) in else_defs {
                    defs.insert(loc, entry);
                }
                defs.insert(merge_loc, RefEntry::Deps(dedup_tokens(merged)));
                st.last.insert(var, merge_loc);
                self.set_scope(var, merge_loc);
            }
            // The heads diverged even though the sub-maps compare equal:
            // still advance to a synthetic entry so the last-update table
            // keeps pointing at a real key.
            if else_state.last.contains_key(&var) && st.last.get(&var) != else_state.last.get(&var) {
                if !st.refs[&var].contains_key(&merge_loc) {
                    let mut merged = st.head(var).to_vec();
                    merged.extend(else_state.head(var).iter().cloned());
                    st.refs
                        .get_mut(&var)
                        .expect("var listed from refs")
                        .insert(merge_loc, RefEntry::Deps(dedup_tokens(merged)));
                }
                st.last.insert(var, merge_loc);
                self.set_scope(var, merge_loc);
            }
        }

        // Without an effective else the construct may not execute at all, so
        // definitions from before it stay reachable.
        if !has_effective_else(orelse) {
            let before_vars: Vec<StringId> = before.refs.keys().copied().collect();
            for var in before_vars {
                if var == self.ret || self.functions.contains(var) {
                    continue;
                }
                let Some(&last_loc) = st.last.get(&var) else { continue };
                let mut combined = st.refs[&var][&last_loc].deps().to_vec();
                combined.extend(before.head(var).iter().cloned());
                st.refs
                    .get_mut(&var)
                    .expect("var listed from before state")
                    .insert(last_loc, RefEntry::Deps(dedup_tokens(combined)));
            }
        }
    }

    /// Interprets the loop body until one more pass produces no new
    /// `(variable, location)` pairs and leaves every existing entry's token
    /// set unchanged.
    ///
    /// Each round folds the definitions that appeared or changed since the
    /// previous snapshot into a combined entry at the loop's own line; once
    /// stable, the loop-line state is published at the synthetic exit
    /// location. Key presence alone is not a convergence test: a conditional
    /// nested in the body re-lands on its fixed statement and merge
    /// locations every pass, while self-referential augmented assignments
    /// keep enriching the sets stored there. Token sets grow monotonically
    /// within a finite universe, so comparing them structurally still
    /// terminates.
    fn loop_fixpoint(&mut self, line: u32, end_line: u32, body: &[Node], st: &mut FlowState, uses: &mut UseTable) {
        let loop_loc = Loc::Real(line);
        let mut before = st.refs.clone();
        for node in body {
            self.process_node(node, st, uses);
        }
        loop {
            let mut changed = false;
            let vars: Vec<StringId> = before.keys().copied().collect();
            for var in vars {
                if var == self.ret || self.functions.contains(var) {
                    continue;
                }
                let mut delta = Vec::new();
                if let Some(defs) = st.refs.get(&var) {
                    let seen = &before[&var];
                    for (loc, entry) in defs {
                        let fresh = match seen.get(loc) {
                            None => true,
                            Some(prior) => !same_token_set(prior.deps(), entry.deps()),
                        };
                        if fresh {
                            delta.extend(entry.deps().iter().cloned());
                        }
                    }
                }
                if delta.is_empty() {
                    continue;
                }
                let delta = dedup_tokens(delta);
                for token in &delta {
                    record_use(uses, token, loop_loc);
                }
                st.refs
                    .get_mut(&var)
                    .expect("delta implies var present")
                    .insert(loop_loc, RefEntry::Deps(delta));
                st.last.insert(var, loop_loc);
                self.set_scope(var, loop_loc);
                changed = true;
            }
            if !changed {
                break;
            }
            before = st.refs.clone();
            for node in body {
                self.process_node(node, st, uses);
            }
        }
        self.scope.pop();

        // Publish the data flowing out of the loop at a synthetic location.
        let exit_loc = Loc::Merge(end_line);
        let vars: Vec<StringId> = st.refs.keys().copied().collect();
        for var in vars {
            if let Some(entry) = st.refs[&var].get(&loop_loc).cloned() {
                st.refs
                    .get_mut(&var)
                    .expect("var listed from refs")
                    .insert(exit_loc, entry);
                st.last.insert(var, exit_loc);
                self.set_scope(var, exit_loc);
            }
        }
    }

    // === expressions ===

    /// Evaluates an expression to the ordered list of tokens it reads.
    /// Duplicates are kept; consumers deduplicate.
    fn eval_expr(&mut self, expr: &ExprLoc, st: &mut FlowState, uses: &mut UseTable) -> Vec<Token> {
        match &expr.expr {
            Expr::Literal(lit) => match self.mode {
                EvalMode::Analysis => Vec::new(),
                EvalMode::Propagation => vec![Token::Const(lit.clone())],
            },
            Expr::Name(ident) => vec![Token::Name(ident.name)],
            Expr::Unary { operand, .. } => self.eval_expr(operand, st, uses),
            Expr::Binary { left, right, .. } => {
                let mut tokens = self.eval_expr(left, st, uses);
                tokens.extend(self.eval_expr(right, st, uses));
                tokens
            }
            Expr::BoolOp { values, .. } => self.eval_all(values, st, uses),
            Expr::Compare { left, comparators, .. } => {
                let mut tokens = self.eval_expr(left, st, uses);
                tokens.extend(self.eval_all(comparators, st, uses));
                tokens
            }
            Expr::IfElse { test, body, orelse } => {
                // No path sensitivity at expression level: both arms count.
                let mut tokens = self.eval_expr(test, st, uses);
                tokens.extend(self.eval_expr(body, st, uses));
                tokens.extend(self.eval_expr(orelse, st, uses));
                tokens
            }
            Expr::Attribute { object, attr } => {
                let mut tokens = self.eval_expr(object, st, uses);
                tokens.push(Token::Name(*attr));
                tokens
            }
            Expr::Subscript { object, index } => {
                let mut tokens = self.eval_expr(object, st, uses);
                tokens.extend(self.eval_expr(index, st, uses));
                tokens
            }
            Expr::Slice { lower, upper, .. } => {
                let mut tokens = Vec::new();
                if let Some(lower) = lower {
                    tokens.extend(self.eval_expr(lower, st, uses));
                }
                if let Some(upper) = upper {
                    tokens.extend(self.eval_expr(upper, st, uses));
                }
                tokens
            }
            Expr::List(elts) | Expr::Tuple(elts) | Expr::Set(elts) => self.eval_all(elts, st, uses),
            Expr::Dict { keys, values } => {
                let mut tokens = self.eval_all(keys, st, uses);
                tokens.extend(self.eval_all(values, st, uses));
                tokens
            }
            Expr::Call { func, args } => self.eval_call(func, args, expr.span.line, st, uses),
        }
    }

    fn eval_all(&mut self, exprs: &[ExprLoc], st: &mut FlowState, uses: &mut UseTable) -> Vec<Token> {
        let mut tokens = Vec::new();
        for expr in exprs {
            tokens.extend(self.eval_expr(expr, st, uses));
        }
        tokens
    }

    /// Call expressions.
    ///
    /// In analysis mode a named callee present in the function table is
    /// joined: the callee is analyzed with the argument reads bound to its
    /// parameters and the resulting flow is recorded under the callee's name
    /// at the call line. Any other named callee contributes its own name
    /// plus the argument reads; an indirect callee (attribute access etc.)
    /// contributes the argument reads only. All reads register as uses at
    /// the call line.
    fn eval_call(
        &mut self,
        func: &ExprLoc,
        args: &[ExprLoc],
        line: u32,
        st: &mut FlowState,
        uses: &mut UseTable,
    ) -> Vec<Token> {
        let loc = Loc::Real(line);
        if let Expr::Name(callee) = &func.expr {
            let functions = self.functions;
            if self.mode == EvalMode::Analysis
                && let Some(def) = functions.get(callee.name)
            {
                let mut return_vars = Vec::new();
                let mut arg_lists = Vec::with_capacity(args.len());
                for arg in args {
                    let cur = self.eval_expr(arg, st, uses);
                    return_vars.extend(cur.iter().cloned());
                    arg_lists.push(cur);
                }
                for list in &arg_lists {
                    for token in list {
                        record_use(uses, token, loc);
                    }
                }
                return match self.function_flow(def, arg_lists) {
                    Some(flow) => {
                        st.refs
                            .entry(callee.name)
                            .or_default()
                            .insert(loc, RefEntry::Call(Box::new(flow)));
                        self.set_scope(callee.name, loc);
                        let mut tokens = vec![Token::Name(callee.name)];
                        tokens.extend(return_vars);
                        tokens
                    }
                    // Arity mismatch or a self-referential call: black box.
                    None => return_vars,
                };
            }
            let mut tokens = vec![Token::Name(callee.name)];
            for arg in args {
                tokens.extend(self.eval_expr(arg, st, uses));
            }
            for token in &tokens {
                record_use(uses, token, loc);
            }
            return tokens;
        }
        let mut tokens = Vec::new();
        for arg in args {
            tokens.extend(self.eval_expr(arg, st, uses));
        }
        for token in &tokens {
            record_use(uses, token, loc);
        }
        tokens
    }
}

/// Records a read of `token` at `loc`. Only names are recorded; no consumer
/// ever looks up a constant's uses.
fn record_use(uses: &mut UseTable, token: &Token, loc: Loc) {
    if let Token::Name(id) = token {
        uses.entry(*id).or_default().push(loc);
    }
}

/// Strips subscript layers off a target's object expression, yielding the
/// outermost base (`a[0][1]` -> `a`).
fn peel_subscript(mut expr: &ExprLoc) -> &ExprLoc {
    while let Expr::Subscript { object, .. } = &expr.expr {
        expr = object.as_ref();
    }
    expr
}

fn names_of(tokens: &[Token]) -> Vec<StringId> {
    tokens.iter().filter_map(Token::as_name).collect()
}

/// Whether the `if` owning `orelse` has an effective else once elif chains
/// are descended: `if/elif/elif` with no final `else` leaves prior
/// definitions reachable.
fn has_effective_else(mut orelse: &[Node]) -> bool {
    while let Some(Node::If { orelse: nested, .. }) = orelse.first() {
        orelse = nested.as_slice();
    }
    !orelse.is_empty()
}
