//! Dependency-closure queries over a finished analysis.
//!
//! Starting from a variable and a line, walk the dependency graph
//! breadth-first, at each step resolving the definition that governs the
//! current location. Entries recorded for user-function calls recurse into
//! the joined callee flow from its return join; names the callee could not
//! resolve bubble back into the caller's traversal. Names with no definition
//! at all are collected as escaping inputs.

use std::collections::VecDeque;
use std::io;

use ahash::AHashSet;

use crate::{
    functions::FunctionTable,
    intern::{Interner, StringId},
    report::ReportSink,
    tables::{Loc, ReferenceTable, Token, render_token, resolve_location},
};

/// Prints the dependency closure of `start` at `line` and returns the
/// out-of-scope set: names read but never defined in `refs` (function
/// parameters seen from inside a callee, builtins, globals).
pub fn report_closure(
    refs: &ReferenceTable,
    start: StringId,
    line: Loc,
    functions: &FunctionTable,
    ret: StringId,
    interner: &Interner,
    sink: &mut dyn ReportSink,
) -> io::Result<Vec<StringId>> {
    let mut queue: VecDeque<(StringId, Loc)> = VecDeque::new();
    let mut visited: AHashSet<StringId> = AHashSet::new();
    let mut outside = Vec::new();
    queue.push_back((start, line));
    visited.insert(start);

    while let Some((var, at)) = queue.pop_front() {
        let Some(defs) = refs.get(&var) else {
            outside.push(var);
            continue;
        };
        let Some(target) = resolve_location(defs, at) else {
            continue;
        };

        if functions.contains(var)
            && let Some(flow) = defs[&target].call()
        {
            sink.line(&format!("Dependencies from function: {}", interner.resolve(var)))?;
            let unresolved = report_closure(&flow.refs, ret, Loc::ReturnJoin, functions, ret, interner, sink)?;
            for name in unresolved {
                if visited.insert(name) {
                    queue.push_back((name, target));
                }
            }
            continue;
        }

        if var == ret {
            sink.line("Returned values from the function")?;
        } else {
            sink.line(&format!(
                "Variable {} depends on these variables at line: {}",
                interner.resolve(var),
                target
            ))?;
        }
        let deps = defs[&target].deps();
        let rendered: Vec<String> = deps.iter().map(|t| render_token(t, interner)).collect();
        sink.line(&format!("[{}]", rendered.join(", ")))?;

        for token in deps {
            if let Token::Name(name) = token
                && visited.insert(*name)
            {
                queue.push_back((*name, target));
            }
        }
    }
    Ok(outside)
}
