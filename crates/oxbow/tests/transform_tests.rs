//! End-to-end tests for the transform pipeline: dead-code removal,
//! underscore renaming, constant propagation, and the emitted source.

use oxbow::{AnalysisSession, CollectStringReport, Literal, Token};
use pretty_assertions::assert_eq;

/// Runs the transform mode and returns everything it printed
/// (diagnostics followed by the re-emitted program).
fn transform(code: &str) -> String {
    let mut session = AnalysisSession::new(code).expect("code should parse");
    let mut sink = CollectStringReport::new();
    session.transform(&mut sink).expect("transform should succeed");
    sink.into_output()
}

#[test]
fn constants_propagate_into_return() {
    let output = transform("def f():\n    a = 1\n    b = 2\n    return a + b\n");
    assert_eq!(output, "def f():\n    return 1 + 2\n");
}

#[test]
fn overridden_definition_is_removed() {
    let output = transform("def p():\n    a = 1\n    a = 2\n    return a\n");
    assert_eq!(output, "def p():\n    return 2\n");
}

#[test]
fn loop_iterator_renamed_and_dead_locals_removed() {
    let code = "def g():\n    a = 1\n    b = 2\n    c = 0\n    for i in range(5):\n        a += b\n    return a\n";
    let expected = "\
These variables do not affect return in function: g
[_]
def g():
    a = 1
    for _ in range(5):
        a += 2
    return a
";
    assert_eq!(transform(code), expected);
}

#[test]
fn conditional_assignments_survive() {
    let code = "def h():\n    x = 5\n    if x > 0:\n        y = 1\n    else:\n        y = 2\n    return y\n";
    let expected = "\
def h():
    if 5 > 0:
        y = 1
    else:
        y = 2
    return y
";
    // the test read of x is propagated, x itself dies, y survives, and the
    // return-irrelevant set ends up empty
    assert_eq!(transform(code), expected);
}

#[test]
fn conditional_definition_blocks_propagation() {
    let code = "def r(x):\n    if x:\n        y = 1\n    return y\n";
    let expected = "\
These variables do not affect return in function: r
[x]
def r(x):
    if x:
        y = 1
    return y
";
    // y is only conditionally a constant, so the read must not be replaced
    assert_eq!(transform(code), expected);
}

#[test]
fn two_function_program() {
    let code = "\
def function_one():
    a = 3
    b = 7
    result_one = 10
    for i in range(a):
        result_one += function_two(a, b)
    if result_one > 20:
        result_one *= 2
    else:
        result_one += 5
    return result_one

def function_two(x, y):
    z = 5
    result_two = x + y + z
    for j in range(y):
        result_two *= 2
    if result_two > 15:
        result_two -= 5
    else:
        result_two += 10
    return result_two
";
    let expected = "\
These variables do not affect return in function: function_one
[_]
These variables do not affect return in function: function_two
[_]
def function_one():
    result_one = 10
    for _ in range(3):
        result_one += function_two(3, 7)
    if result_one > 20:
        result_one *= 2
    else:
        result_one += 5
    return result_one
def function_two(x, y):
    result_two = x + y + 5
    for _ in range(y):
        result_two *= 2
    if result_two > 15:
        result_two -= 5
    else:
        result_two += 10
    return result_two
";
    assert_eq!(transform(code), expected);
}

#[test]
fn conditional_nested_in_loop_body() {
    let code = "\
def complex_function():
    a = 1
    b = 2
    c = 0
    d = 3
    e = 5
    f = 6
    for i in range(5):
        if a:
            a += b
            b = (c + d) * 2
        else:
            a += e
            b = f * 2
    c = a + b
    d -= c
    return d
";
    let expected = "\
These variables do not affect return in function: complex_function
[_]
def complex_function():
    a = 1
    b = 2
    d = 3
    for _ in range(5):
        if a:
            a += b
            b = (0 + 3) * 2
        else:
            a += 5
            b = 6 * 2
    c = a + b
    d -= c
    return d
";
    // the branch inputs c, d, e, f propagate as constants into the loop
    // body, after which e and f are unused and the first c is overridden by
    // the post-loop one; a, b, d and the post-loop c all feed the return
    assert_eq!(transform(code), expected);
}

#[test]
fn transform_is_idempotent() {
    let code = "def g():\n    a = 1\n    b = 2\n    c = 0\n    for i in range(5):\n        a += b\n    return a\n";
    let mut session = AnalysisSession::new(code).unwrap();
    let mut sink = CollectStringReport::new();
    session.transform(&mut sink).unwrap();
    let first = session.source();

    let mut session = AnalysisSession::new(&first).unwrap();
    let mut sink = CollectStringReport::new();
    session.transform(&mut sink).unwrap();
    assert_eq!(session.source(), first);
}

#[test]
fn surviving_dependency_sets_are_stable() {
    let code = "def h():\n    x = 5\n    if x > 0:\n        y = 1\n    else:\n        y = 2\n    return y\n";
    let session = AnalysisSession::new(code).unwrap();
    let merged_before = merge_deps_of_y(&session);

    let mut transformed = AnalysisSession::new(code).unwrap();
    let mut sink = CollectStringReport::new();
    transformed.transform(&mut sink).unwrap();
    let reparsed = AnalysisSession::new(&transformed.source()).unwrap();
    let merged_after = merge_deps_of_y(&reparsed);

    // line numbers shift when dead statements disappear, but y's merged
    // dependency set is made of constants and must come through unchanged
    assert_eq!(merged_before, merged_after);
}

fn merge_deps_of_y(session: &AnalysisSession) -> Vec<Token> {
    let flow = session.analyze_propagation("h").unwrap();
    let y = session.interner().lookup("y").unwrap();
    let (_, entry) = flow.refs[&y]
        .iter()
        .max_by_key(|(loc, _)| **loc)
        .expect("y has definitions");
    entry.deps().to_vec()
}

#[test]
fn multi_target_assignment_keeps_live_targets() {
    let code = "def m():\n    a = b = 1\n    return b\n";
    // a is dead but b lives, so the statement must survive with b alone
    let output = transform(code);
    assert_eq!(output, "def m():\n    return 1\n");
}

#[test]
fn dead_branch_body_leaves_a_pass() {
    let code = "def k(x):\n    if x > 0:\n        y = 1\n    else:\n        x = 2\n    return x\n";
    let expected = "\
These variables do not affect return in function: k
[x]
def k(x):
    if x > 0:
        pass
    else:
        x = 2
    return 2
";
    // y is unused, so its branch empties and is repaired with a pass; the
    // else head is the single constant reaching the return, so it flows in
    assert_eq!(transform(code), expected);
}

#[test]
fn merged_constants_do_not_propagate() {
    let code = "def t():\n    a = 1\n    if a > 0:\n        a = 2\n    return a\n";
    let expected = "\
def t():
    a = 1
    if 1 > 0:
        a = 2
    return a
";
    // the test read sees only the first constant, but two constants reach
    // the return, so that read must keep the name
    assert_eq!(transform(code), expected);
}
