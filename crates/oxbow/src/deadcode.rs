//! Dead-code discovery on top of the dataflow tables.
//!
//! Three categories are reported per function:
//!
//! - *unused names*: variables with definitions but no recorded read;
//! - *overridden definitions*: definitions shadowed by a later, scope-
//!   dominating definition before any use can observe them;
//! - *return-irrelevant names*: variables that never feed a return value,
//!   found by reverse reachability from the return sites.
//!
//! The analysis runs in propagation mode (calls stay opaque, constants are
//! tokens), which is also what the transformers consume.

use std::collections::VecDeque;

use ahash::AHashSet;
use indexmap::IndexMap;

use crate::{
    analysis::{Analysis, EvalMode},
    functions::FunctionTable,
    intern::StringId,
    tables::{FunctionFlow, Loc, RefEntry, ScopeStack, Token, compare_scopes, resolve_location, scope_for_line},
};

/// Dead code found across all functions of a module.
#[derive(Debug, Clone, Default)]
pub struct DeadCodeReport {
    /// function -> variable -> lines of definitions overridden before use.
    pub overridden: IndexMap<StringId, IndexMap<StringId, Vec<u32>>>,
    /// function -> variables that are never read.
    pub unused: IndexMap<StringId, Vec<StringId>>,
    /// function -> variables that do not contribute to any return value.
    pub return_irrelevant: IndexMap<StringId, Vec<StringId>>,
}

impl DeadCodeReport {
    /// Whether the definition of `var` at `line` inside `func` is dead:
    /// either overridden at that line, or the name is never read at all.
    #[must_use]
    pub fn is_dead_definition(&self, func: StringId, var: StringId, line: u32) -> bool {
        self.overridden
            .get(&func)
            .and_then(|vars| vars.get(&var))
            .is_some_and(|lines| lines.contains(&line))
            || self.unused.get(&func).is_some_and(|vars| vars.contains(&var))
    }
}

/// Analyzes every function and classifies its dead code.
#[must_use]
pub fn find_dead_code(functions: &FunctionTable, ret: StringId) -> DeadCodeReport {
    let mut report = DeadCodeReport::default();
    for (name, func) in functions.iter() {
        let mut analysis = Analysis::new(functions, EvalMode::Propagation, ret);
        let Some(flow) = analysis.function_flow(func, Vec::new()) else {
            continue;
        };
        let overridden = report.overridden.entry(name).or_default();
        let unused = report.unused.entry(name).or_default();
        for (&var, defs) in &flow.refs {
            if var == ret {
                continue;
            }
            match flow.uses.get(&var) {
                Some(uses) => {
                    let mut uses: Vec<Loc> = uses.clone();
                    uses.sort_unstable();
                    uses.dedup();
                    find_overridden(&flow, var, defs, &uses, overridden);
                }
                None => unused.push(var),
            }
        }
        report
            .return_irrelevant
            .insert(name, find_return_irrelevant(&flow, functions, ret));
    }
    report
}

/// Collects definitions of `var` that some later definition overrides.
///
/// For each use, the candidate definitions are the real-line definitions
/// before it whose scope and the use's scope subsume one another in either
/// direction; within that bucket, a definition whose scope is subsumed by a
/// later definition's scope can never be the one observed.
fn find_overridden(
    flow: &FunctionFlow,
    var: StringId,
    defs: &IndexMap<Loc, RefEntry>,
    uses: &[Loc],
    out: &mut IndexMap<StringId, Vec<u32>>,
) {
    let Some(scopes) = flow.scopes.get(&var) else {
        return;
    };
    let mut visited: Vec<Loc> = Vec::new();
    for &use_loc in uses {
        let use_scope = scope_for_line(flow, use_loc.user_line());
        let mut bucket: Vec<(Loc, &ScopeStack)> = Vec::new();
        for &def_loc in defs.keys() {
            if !def_loc.is_real() || def_loc >= use_loc || visited.contains(&def_loc) {
                continue;
            }
            let Some(def_scope) = scopes.get(&def_loc) else {
                continue;
            };
            if compare_scopes(&use_scope, def_scope) || compare_scopes(def_scope, &use_scope) {
                bucket.push((def_loc, def_scope));
                visited.push(def_loc);
            }
        }
        bucket.sort_by_key(|(loc, _)| *loc);
        if bucket.len() < 2 {
            continue;
        }
        for cur in 0..bucket.len() - 1 {
            for next in cur + 1..bucket.len() {
                if compare_scopes(bucket[cur].1, bucket[next].1) {
                    let lines = out.entry(var).or_default();
                    let line = bucket[cur].0.user_line();
                    if !lines.contains(&line) {
                        lines.push(line);
                    }
                }
            }
        }
    }
}

/// Reverse reachability from the return sites: anything not reached does not
/// affect what the function returns.
fn find_return_irrelevant(flow: &FunctionFlow, functions: &FunctionTable, ret: StringId) -> Vec<StringId> {
    let mut reached: AHashSet<StringId> = AHashSet::new();
    let Some(return_defs) = flow.refs.get(&ret) else {
        return Vec::new();
    };
    for (&site, entry) in return_defs {
        if site == Loc::ReturnJoin {
            continue;
        }
        let mut queue: VecDeque<(Loc, Token)> = VecDeque::new();
        let mut visited: AHashSet<(Loc, Token)> = AHashSet::new();
        for token in entry.deps() {
            if visited.insert((site, token.clone())) {
                queue.push_back((site, token.clone()));
            }
        }
        while let Some((at, token)) = queue.pop_front() {
            let Token::Name(var) = token else {
                continue;
            };
            reached.insert(var);
            if functions.contains(var) {
                continue;
            }
            let Some(defs) = flow.refs.get(&var) else {
                continue;
            };
            let Some(next) = resolve_location(defs, at) else {
                continue;
            };
            for dep in defs[&next].deps() {
                if visited.insert((next, dep.clone())) {
                    queue.push_back((next, dep.clone()));
                }
            }
        }
    }
    flow.refs
        .keys()
        .copied()
        .filter(|var| *var != ret && !functions.contains(*var) && !reached.contains(var))
        .collect()
}

#[cfg(test)]
mod tests {
    use crate::tree::NodeId;

    use super::*;

    #[test]
    fn scope_subsumption() {
        let a = NodeId(1);
        let b = NodeId(2);
        // equal, empty, and prefix scopes subsume
        assert!(compare_scopes(&[a, b], &[a, b]));
        assert!(compare_scopes(&[a, b], &[]));
        assert!(compare_scopes(&[a, b], &[a]));
        // a longer or diverging scope does not
        assert!(!compare_scopes(&[a], &[a, b]));
        assert!(!compare_scopes(&[b], &[a]));
    }
}
