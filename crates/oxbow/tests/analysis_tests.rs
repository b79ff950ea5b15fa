//! Tests for the dataflow engine: reference/use/scope tables, conditional
//! merges, loop fixpoints, and call joins.

use oxbow::{AnalysisSession, FunctionFlow, Loc, StringId, Token};

fn session(code: &str) -> AnalysisSession {
    AnalysisSession::new(code).expect("code should parse")
}

fn id(session: &AnalysisSession, name: &str) -> StringId {
    session
        .interner()
        .lookup(name)
        .unwrap_or_else(|| panic!("name {name} should be interned"))
}

fn deps(flow: &FunctionFlow, var: StringId, loc: Loc) -> Vec<Token> {
    flow.refs[&var][&loc].deps().to_vec()
}

/// Every definition recorded in the reference table must have a matching
/// scope snapshot.
fn assert_scope_invariant(flow: &FunctionFlow) {
    for (var, defs) in &flow.refs {
        for loc in defs.keys() {
            assert!(
                flow.scopes.get(var).and_then(|scopes| scopes.get(loc)).is_some(),
                "definition ({var:?}, {loc:?}) has no scope snapshot"
            );
        }
    }
}

#[test]
fn straight_line_assignments() {
    let s = session("def f():\n    a = 1\n    b = 2\n    return a + b\n");
    let flow = s.analyze("f").unwrap();
    let (a, b, ret) = (id(&s, "a"), id(&s, "b"), id(&s, "return"));

    // literals contribute nothing in analysis mode
    assert_eq!(deps(&flow, a, Loc::Real(2)), vec![]);
    assert_eq!(deps(&flow, b, Loc::Real(3)), vec![]);
    // the return site and the return join both read a and b
    assert_eq!(deps(&flow, ret, Loc::Real(4)), vec![Token::Name(a), Token::Name(b)]);
    assert_eq!(deps(&flow, ret, Loc::ReturnJoin), vec![Token::Name(a), Token::Name(b)]);
    assert_eq!(flow.uses[&a], vec![Loc::Real(4)]);
    assert_eq!(flow.uses[&b], vec![Loc::Real(4)]);
    assert_scope_invariant(&flow);
}

#[test]
fn propagation_mode_records_constants() {
    let s = session("def f():\n    a = 1\n    b = 2\n    return a + b\n");
    let flow = s.analyze_propagation("f").unwrap();
    let a = id(&s, "a");
    assert_eq!(
        deps(&flow, a, Loc::Real(2)),
        vec![Token::Const(oxbow::Literal::Int(1))]
    );
}

#[test]
fn self_read_unions_previous_definition() {
    let s = session("def f():\n    a = 1\n    a = a + 2\n    return a\n");
    let flow = s.analyze_propagation("f").unwrap();
    let a = id(&s, "a");
    // `a = a + 2` keeps the old definition's tokens and appends the reads
    assert_eq!(
        deps(&flow, a, Loc::Real(3)),
        vec![
            Token::Const(oxbow::Literal::Int(1)),
            Token::Name(a),
            Token::Const(oxbow::Literal::Int(2)),
        ]
    );
    // the self-read registers as a use
    assert!(flow.uses[&a].contains(&Loc::Real(3)));
}

#[test]
fn plain_reassignment_replaces_definition() {
    let s = session("def p():\n    a = 1\n    a = 2\n    return a\n");
    let flow = s.analyze_propagation("p").unwrap();
    let a = id(&s, "a");
    // no self-read: the second definition does not union in the first
    assert_eq!(deps(&flow, a, Loc::Real(3)), vec![Token::Const(oxbow::Literal::Int(2))]);
    // the plain assignments register no uses of `a`; only the return does
    assert_eq!(flow.uses[&a], vec![Loc::Real(4)]);
}

#[test]
fn conditional_merge_creates_synthetic_entry() {
    let s = session(
        "def h():\n    x = 5\n    if x > 0:\n        y = 1\n    else:\n        y = 2\n    return y\n",
    );
    let flow = s.analyze_propagation("h").unwrap();
    let (x, y) = (id(&s, "x"), id(&s, "y"));

    assert_eq!(flow.uses[&x], vec![Loc::Real(3)]);
    // both branch definitions survive, plus the merge at the if's end
    assert!(flow.refs[&y].contains_key(&Loc::Real(4)));
    assert!(flow.refs[&y].contains_key(&Loc::Real(6)));
    assert_eq!(
        deps(&flow, y, Loc::Merge(6)),
        vec![
            Token::Const(oxbow::Literal::Int(1)),
            Token::Const(oxbow::Literal::Int(2)),
        ]
    );
    assert_scope_invariant(&flow);
}

#[test]
fn branch_scopes_do_not_dominate_each_other() {
    let s = session(
        "def h():\n    x = 5\n    if x > 0:\n        y = 1\n    else:\n        y = 2\n    return y\n",
    );
    let flow = s.analyze_propagation("h").unwrap();
    let y = id(&s, "y");
    let if_scope = &flow.scopes[&y][&Loc::Real(4)];
    let else_scope = &flow.scopes[&y][&Loc::Real(6)];
    assert_ne!(if_scope, else_scope);
    // the merge entry belongs to the enclosing (function) scope
    assert!(flow.scopes[&y][&Loc::Merge(6)].is_empty());
}

#[test]
fn if_without_else_keeps_prior_definitions() {
    let s = session("def t():\n    a = 1\n    if a > 0:\n        a = 2\n    return a\n");
    let flow = s.analyze_propagation("t").unwrap();
    let a = id(&s, "a");
    // the merge entry at the if's end still carries the pre-if constant
    let merged = deps(&flow, a, Loc::Merge(4));
    assert!(merged.contains(&Token::Const(oxbow::Literal::Int(1))));
    assert!(merged.contains(&Token::Const(oxbow::Literal::Int(2))));
    assert_scope_invariant(&flow);
}

#[test]
fn branch_only_variable_stays_conditional() {
    // y is only ever defined inside the if; no merge entry appears and the
    // no-else repair must not invent state for it
    let s = session("def r(x):\n    if x:\n        y = 1\n    return y\n");
    let flow = s.analyze("r").unwrap();
    let (x, y, ret) = (id(&s, "x"), id(&s, "y"), id(&s, "return"));

    let y_locs: Vec<Loc> = flow.refs[&y].keys().copied().collect();
    assert_eq!(y_locs, vec![Loc::Real(3)]);
    // the parameter is bound at the function's line
    assert!(flow.refs[&x].contains_key(&Loc::Real(1)));
    assert_eq!(deps(&flow, ret, Loc::ReturnJoin), vec![Token::Name(y)]);
    assert_scope_invariant(&flow);
}

#[test]
fn loop_fixpoint_publishes_exit_state() {
    let s = session("def q():\n    a = 1\n    for i in range(3):\n        a = i\n    return a\n");
    let flow = s.analyze("q").unwrap();
    let (a, i, range) = (id(&s, "a"), id(&s, "i"), id(&s, "range"));

    // the loop target is seeded from the iterable's reads
    assert_eq!(deps(&flow, i, Loc::Real(3)), vec![Token::Name(range)]);
    // the fixpoint folded the body definition back onto the loop line
    assert_eq!(deps(&flow, a, Loc::Real(3)), vec![Token::Name(i)]);
    // and published it at the synthetic exit location
    assert_eq!(deps(&flow, a, Loc::Merge(4)), vec![Token::Name(i)]);
    assert_eq!(deps(&flow, i, Loc::Merge(4)), vec![Token::Name(range)]);
    assert_scope_invariant(&flow);
}

#[test]
fn conditional_inside_loop_folds_both_branches() {
    let s = session(
        "def nested(b, e):\n    a = 1\n    for i in range(5):\n        if a:\n            a += b\n        else:\n            a += e\n    return a\n",
    );
    let flow = s.analyze_propagation("nested").unwrap();
    let (a, b, e) = (id(&s, "a"), id(&s, "b"), id(&s, "e"));
    let one = Token::Const(oxbow::Literal::Int(1));

    // the loop-line entry and the published exit state union both branches
    assert_eq!(
        deps(&flow, a, Loc::Real(3)),
        vec![one.clone(), Token::Name(b), Token::Name(a), Token::Name(e)]
    );
    assert_eq!(
        deps(&flow, a, Loc::Merge(7)),
        vec![one, Token::Name(b), Token::Name(a), Token::Name(e)]
    );
    // convergence is value-level: re-processing lands on the same statement
    // lines, but each branch entry must still absorb the other branch's
    // contribution through the loop head before the fixpoint is declared
    assert!(deps(&flow, a, Loc::Real(5)).contains(&Token::Name(e)));
    assert!(deps(&flow, a, Loc::Real(7)).contains(&Token::Name(b)));
    assert_scope_invariant(&flow);
}

#[test]
fn unchanging_loop_body_reaches_fixpoint_without_loop_entry() {
    let s = session("def u():\n    b = 1\n    for i in range(2):\n        c = b\n    return c\n");
    let flow = s.analyze("u").unwrap();
    let (b, c) = (id(&s, "b"), id(&s, "c"));

    // the body introduced nothing new for pre-loop variables, so b gets no
    // entry on the loop line and c keeps only its body definition
    assert!(!flow.refs[&b].contains_key(&Loc::Real(3)));
    let c_locs: Vec<Loc> = flow.refs[&c].keys().copied().collect();
    assert_eq!(c_locs, vec![Loc::Real(4)]);
}

#[test]
fn subscript_assignment_unions_without_self_read() {
    let s = session("def v():\n    xs = [1, 2]\n    xs[0] = 9\n    xs[1] += 3\n    return xs\n");
    let flow = s.analyze_propagation("v").unwrap();
    let xs = id(&s, "xs");

    // `xs[0] = 9` keeps the container's prior contents but records no self-read
    assert_eq!(
        deps(&flow, xs, Loc::Real(3)),
        vec![
            Token::Const(oxbow::Literal::Int(1)),
            Token::Const(oxbow::Literal::Int(2)),
            Token::Const(oxbow::Literal::Int(9)),
        ]
    );
    // the augmented form appends the self token and the self-read
    let aug = deps(&flow, xs, Loc::Real(4));
    assert!(aug.contains(&Token::Name(xs)));
    assert_eq!(flow.uses[&xs], vec![Loc::Real(4), Loc::Real(5)]);
}

#[test]
fn tuple_assignment_desugars_element_wise() {
    let s = session("def w():\n    a, b = 1, 2\n    c, d = b, a\n    return c + d\n");
    let flow = s.analyze("w").unwrap();
    let (a, b, c, d) = (id(&s, "a"), id(&s, "b"), id(&s, "c"), id(&s, "d"));

    assert_eq!(deps(&flow, c, Loc::Real(3)), vec![Token::Name(b)]);
    assert_eq!(deps(&flow, d, Loc::Real(3)), vec![Token::Name(a)]);
    assert_eq!(flow.uses[&a], vec![Loc::Real(3)]);
    assert_eq!(flow.uses[&b], vec![Loc::Real(3)]);
}

#[test]
fn tuple_target_with_opaque_value_shares_dependencies() {
    let s = session("def z(t):\n    a, b = t\n    return a + b\n");
    let flow = s.analyze("z").unwrap();
    let (a, b, t) = (id(&s, "a"), id(&s, "b"), id(&s, "t"));
    assert_eq!(deps(&flow, a, Loc::Real(2)), vec![Token::Name(t)]);
    assert_eq!(deps(&flow, b, Loc::Real(2)), vec![Token::Name(t)]);
}

#[test]
fn call_join_binds_arguments_to_parameters() {
    let code = "def callee(p):\n    return p + 1\n\ndef caller():\n    a = 2\n    return callee(a)\n";
    let s = session(code);
    let flow = s.analyze("caller").unwrap();
    let (a, p, callee, ret) = (id(&s, "a"), id(&s, "p"), id(&s, "callee"), id(&s, "return"));

    // the callee's flow is recorded under its name at the call line
    let call = flow.refs[&callee][&Loc::Real(6)].call().expect("call entry");
    assert_eq!(call.refs[&p][&Loc::Real(1)].deps(), &[Token::Name(a)]);
    assert_eq!(call.refs[&ret][&Loc::ReturnJoin].deps(), &[Token::Name(p)]);
    // the caller's return depends on the callee and the argument
    assert_eq!(
        deps(&flow, ret, Loc::ReturnJoin),
        vec![Token::Name(callee), Token::Name(a)]
    );
    assert_scope_invariant(&flow);
}

#[test]
fn self_referential_call_is_black_box() {
    let s = session("def rec(n):\n    return rec(n)\n");
    let flow = s.analyze("rec").unwrap();
    let (n, rec, ret) = (id(&s, "n"), id(&s, "rec"), id(&s, "return"));

    // no joined entry appears for the callee and no stack overflow occurs
    assert!(!flow.refs.contains_key(&rec));
    assert_eq!(deps(&flow, ret, Loc::ReturnJoin), vec![Token::Name(n)]);
}

#[test]
fn arity_mismatch_is_black_box() {
    let code = "def two(a, b):\n    return a\n\ndef caller():\n    x = 1\n    return two(x)\n";
    let s = session(code);
    let flow = s.analyze("caller").unwrap();
    let (x, two, ret) = (id(&s, "x"), id(&s, "two"), id(&s, "return"));

    assert!(!flow.refs.contains_key(&two));
    assert_eq!(deps(&flow, ret, Loc::ReturnJoin), vec![Token::Name(x)]);
}

#[test]
fn named_builtin_call_reads_callee_and_arguments() {
    let s = session("def f(n):\n    return range(n)\n");
    let flow = s.analyze("f").unwrap();
    let (n, range, ret) = (id(&s, "n"), id(&s, "range"), id(&s, "return"));
    assert_eq!(
        deps(&flow, ret, Loc::ReturnJoin),
        vec![Token::Name(range), Token::Name(n)]
    );
    assert_eq!(flow.uses[&n], vec![Loc::Real(2), Loc::Real(2)]);
}

#[test]
fn function_without_return_still_gets_return_join() {
    let s = session("def noop(x):\n    y = x\n");
    let flow = s.analyze("noop").unwrap();
    let ret = id(&s, "return");
    assert_eq!(deps(&flow, ret, Loc::ReturnJoin), vec![]);
    assert_scope_invariant(&flow);
}

#[test]
fn elif_chain_without_final_else_repairs_state() {
    let s = session(
        "def e(x):\n    a = 1\n    if x > 0:\n        a = 2\n    elif x < 0:\n        a = 3\n    return a\n",
    );
    let flow = s.analyze_propagation("e").unwrap();
    let a = id(&s, "a");
    // no final else: the pre-if constant must stay reachable at the end
    let last = flow.refs[&a]
        .keys()
        .copied()
        .max()
        .expect("a has definitions");
    let final_deps = deps(&flow, a, last);
    assert!(final_deps.contains(&Token::Const(oxbow::Literal::Int(1))));
    assert_scope_invariant(&flow);
}

#[test]
fn dead_code_classification() {
    let code = "def g():\n    a = 1\n    b = 2\n    c = 0\n    for i in range(5):\n        a += b\n    return a\n";
    let s = session(code);
    let report = s.dead_code();
    let g = id(&s, "g");
    let (c, i) = (id(&s, "c"), id(&s, "i"));

    let unused = &report.unused[&g];
    assert!(unused.contains(&c));
    assert!(unused.contains(&i));
    // unused names never intersect the use table
    let flow = s.analyze_propagation("g").unwrap();
    for var in unused {
        assert!(!flow.uses.contains_key(var));
    }
    // c and i do not feed the return value either
    let irrelevant = &report.return_irrelevant[&g];
    assert!(irrelevant.contains(&c));
    assert!(irrelevant.contains(&i));
}

#[test]
fn overridden_definition_detected() {
    let s = session("def p():\n    a = 1\n    a = 2\n    return a\n");
    let report = s.dead_code();
    let (p, a) = (id(&s, "p"), id(&s, "a"));
    assert_eq!(report.overridden[&p][&a], vec![2]);
}

#[test]
fn branch_definitions_do_not_override_each_other() {
    let s = session(
        "def h():\n    x = 5\n    if x > 0:\n        y = 1\n    else:\n        y = 2\n    return y\n",
    );
    let report = s.dead_code();
    let h = id(&s, "h");
    assert!(report.overridden[&h].is_empty());
    assert!(report.unused[&h].is_empty());
}
