//! The dataflow tables produced by analyzing a function.
//!
//! Four tables are built per analysis invocation:
//!
//! - the *reference table* maps each variable to its definitions, one entry
//!   per location, each holding the tokens that may contribute to the value;
//! - the *last-update table* tracks the most recent definition location of
//!   each variable on the currently processed path;
//! - the *use table* records every location where a name is read (duplicates
//!   are kept, they record multiplicity);
//! - the *scope table* snapshots the stack of enclosing control structures
//!   at every definition.
//!
//! Locations are an explicit variant rather than fractional line numbers:
//! synthetic merge/exit points sort between their construct's last line and
//! the following one, and the merged return of a call join sorts before
//! everything.

use std::fmt;

use ahash::{AHashMap, AHashSet};
use indexmap::IndexMap;
use smallvec::SmallVec;

use crate::{
    intern::{Interner, StringId},
    tree::{Literal, NodeId},
};

/// A program location in analysis space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Loc {
    /// The merged return of a function, conventionally "line 0".
    ReturnJoin,
    /// A real statement line.
    Real(u32),
    /// The synthetic merge/exit point of a control construct ending at the
    /// given line; sorts just after it ("`end_line + 0.5`").
    Merge(u32),
}

impl Loc {
    /// Total-order key: `ReturnJoin` first, then each real line immediately
    /// followed by its merge point.
    fn key(self) -> u64 {
        match self {
            Self::ReturnJoin => 0,
            Self::Real(n) => 2 * u64::from(n),
            Self::Merge(n) => 2 * u64::from(n) + 1,
        }
    }

    /// Whether this is a real statement line.
    #[must_use]
    pub fn is_real(self) -> bool {
        matches!(self, Self::Real(_))
    }

    /// The line to show in user-facing output.
    ///
    /// Merge points render as their construct's closing line and the return
    /// join as 0; the synthetic encoding never escapes.
    #[must_use]
    pub fn user_line(self) -> u32 {
        match self {
            Self::ReturnJoin => 0,
            Self::Real(n) | Self::Merge(n) => n,
        }
    }
}

impl PartialOrd for Loc {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Loc {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.key().cmp(&other.key())
    }
}

impl fmt::Display for Loc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.user_line())
    }
}

/// A single dependency: either a variable name or, in propagation mode, a
/// literal constant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Token {
    Name(StringId),
    Const(Literal),
}

impl Token {
    /// The name id, if this token is a name.
    #[must_use]
    pub fn as_name(&self) -> Option<StringId> {
        match self {
            Self::Name(id) => Some(*id),
            Self::Const(_) => None,
        }
    }

    /// The literal, if this token is a constant.
    #[must_use]
    pub fn as_const(&self) -> Option<&Literal> {
        match self {
            Self::Name(_) => None,
            Self::Const(lit) => Some(lit),
        }
    }
}

/// One definition in the reference table.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum RefEntry {
    /// Tokens that may contribute to the variable's value here.
    Deps(Vec<Token>),
    /// The joined flow of a user-function call, recorded under the callee's
    /// name at the call line. Only produced in analysis mode.
    Call(Box<FunctionFlow>),
}

impl RefEntry {
    /// The dependency tokens of this entry; a call entry has none.
    #[must_use]
    pub fn deps(&self) -> &[Token] {
        match self {
            Self::Deps(deps) => deps,
            Self::Call(_) => &[],
        }
    }

    /// The joined callee flow, if this is a call entry.
    #[must_use]
    pub fn call(&self) -> Option<&FunctionFlow> {
        match self {
            Self::Deps(_) => None,
            Self::Call(flow) => Some(flow),
        }
    }
}

/// Stack of enclosing control-structure ids at a definition site.
pub type ScopeStack = SmallVec<[NodeId; 4]>;

/// variable -> location -> definition entry.
pub type ReferenceTable = IndexMap<StringId, IndexMap<Loc, RefEntry>>;

/// name -> locations where it is read.
pub type UseTable = IndexMap<StringId, Vec<Loc>>;

/// variable -> location -> scope snapshot.
pub type ScopeTable = IndexMap<StringId, IndexMap<Loc, ScopeStack>>;

/// The reference and last-update tables, snapshotted together.
///
/// Conditional processing clones this pair for the else branch and the
/// before-state; loop fixpoints clone the reference table alone.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FlowState {
    pub refs: ReferenceTable,
    pub last: AHashMap<StringId, Loc>,
}

impl FlowState {
    /// The dependency tokens of a variable's most recent definition, or an
    /// empty slice if it has none on the current path.
    #[must_use]
    pub fn head(&self, var: StringId) -> &[Token] {
        match self.last.get(&var) {
            Some(loc) => self
                .refs
                .get(&var)
                .and_then(|defs| defs.get(loc))
                .map_or(&[], RefEntry::deps),
            None => &[],
        }
    }
}

/// The complete result of analyzing one function.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FunctionFlow {
    pub refs: ReferenceTable,
    pub uses: UseTable,
    pub scopes: ScopeTable,
}

impl FunctionFlow {
    /// Renders the reference table with names resolved, one variable per
    /// line, for diagnostics and tests. Call entries are indented under the
    /// callee's name.
    #[must_use]
    pub fn render(&self, interner: &Interner) -> String {
        let mut out = String::new();
        render_refs(&self.refs, interner, "", &mut out);
        out
    }
}

fn render_refs(refs: &ReferenceTable, interner: &Interner, indent: &str, out: &mut String) {
    use std::fmt::Write as _;
    for (var, defs) in refs {
        let _ = write!(out, "{indent}{}", interner.resolve(*var));
        for (loc, entry) in defs {
            match entry {
                RefEntry::Deps(deps) => {
                    let rendered: Vec<String> = deps.iter().map(|t| render_token(t, interner)).collect();
                    let _ = write!(out, " {loc}:[{}]", rendered.join(", "));
                }
                RefEntry::Call(flow) => {
                    let _ = writeln!(out, " {loc}:");
                    render_refs(&flow.refs, interner, &format!("{indent}    "), out);
                }
            }
        }
        out.push('\n');
    }
}

pub(crate) fn render_token(token: &Token, interner: &Interner) -> String {
    match token {
        Token::Name(id) => interner.resolve(*id).to_owned(),
        Token::Const(lit) => crate::unparse::render_literal(lit, interner),
    }
}

/// Whether `scope2` subsumes `scope1`: the scopes are equal, `scope2` is the
/// empty (function-level) scope, or `scope2` is a prefix of `scope1`.
///
/// Mutual subsumption in either direction is what makes two definitions
/// comparable for dominance purposes.
#[must_use]
pub fn compare_scopes(scope1: &[NodeId], scope2: &[NodeId]) -> bool {
    if scope1 == scope2 || scope2.is_empty() {
        return true;
    }
    let mut idx = 0;
    while idx < scope1.len().min(scope2.len()) {
        if scope1[idx] != scope2[idx] {
            break;
        }
        idx += 1;
    }
    idx == scope2.len()
}

/// The scope in force at a source line: the scope recorded for any
/// definition on that line, walking backward to the nearest line that holds
/// one. Lines before the first definition get the function-level scope.
#[must_use]
pub fn scope_for_line(flow: &FunctionFlow, mut line: u32) -> ScopeStack {
    loop {
        let loc = Loc::Real(line);
        for (var, defs) in &flow.refs {
            if defs.contains_key(&loc)
                && let Some(scope) = flow.scopes.get(var).and_then(|scopes| scopes.get(&loc))
            {
                return scope.clone();
            }
        }
        if line == 0 {
            return ScopeStack::new();
        }
        line -= 1;
    }
}

/// Deduplicates tokens, keeping first-seen order.
#[must_use]
pub fn dedup_tokens(tokens: Vec<Token>) -> Vec<Token> {
    let mut seen = AHashSet::new();
    tokens.into_iter().filter(|t| seen.insert(t.clone())).collect()
}

/// Whether two dependency lists carry the same set of tokens.
///
/// Order and multiplicity are ignored: a definition's meaning is the flat
/// union of its tokens, and re-processing a loop body appends duplicates
/// without adding information.
#[must_use]
pub fn same_token_set(left: &[Token], right: &[Token]) -> bool {
    let left: AHashSet<&Token> = left.iter().collect();
    let right: AHashSet<&Token> = right.iter().collect();
    left == right
}

/// Resolves the definition that governs `line` in a per-variable map:
/// the greatest key not exceeding `line`, or the greatest key overall when
/// `line` is the return join or every key exceeds it.
///
/// Returns `None` only for an empty map.
#[must_use]
pub fn resolve_location<V>(defs: &IndexMap<Loc, V>, line: Loc) -> Option<Loc> {
    let mut keys: Vec<Loc> = defs.keys().copied().collect();
    keys.sort_unstable();
    let last = *keys.last()?;
    if line == Loc::ReturnJoin {
        return Some(last);
    }
    Some(keys.into_iter().rev().find(|k| *k <= line).unwrap_or(last))
}
