//! Tests for the parser front-end: rejected constructs and the depth guard.

use oxbow::{AnalysisSession, ParseError};

fn parse_error(code: &str) -> ParseError {
    match AnalysisSession::new(code) {
        Ok(_) => panic!("expected a parse error for:\n{code}"),
        Err(err) => err,
    }
}

#[test]
fn syntax_error_is_reported_with_line() {
    let err = parse_error("def f(:\n");
    assert!(matches!(err, ParseError::Syntax { .. }), "got {err:?}");
}

#[test]
fn classes_are_rejected() {
    let err = parse_error("class A:\n    pass\n");
    assert!(matches!(err, ParseError::NotImplemented { .. }), "got {err:?}");
    assert!(err.to_string().contains("does not support"));
}

#[test]
fn comprehensions_are_rejected() {
    let err = parse_error("def f():\n    return [i for i in range(3)]\n");
    assert!(matches!(err, ParseError::NotImplemented { .. }), "got {err:?}");
}

#[test]
fn loop_else_clauses_are_rejected() {
    let err = parse_error("def f():\n    for i in range(3):\n        pass\n    else:\n        pass\n");
    assert!(matches!(err, ParseError::NotImplemented { .. }), "got {err:?}");
}

#[test]
fn keyword_arguments_are_rejected() {
    let err = parse_error("def f():\n    return g(x=1)\n");
    assert!(matches!(err, ParseError::NotImplemented { .. }), "got {err:?}");
}

#[test]
fn parameter_defaults_are_rejected() {
    let err = parse_error("def f(a=1):\n    return a\n");
    assert!(matches!(err, ParseError::NotImplemented { .. }), "got {err:?}");
}

#[test]
fn deep_nesting_hits_the_guard_instead_of_the_stack() {
    let mut code = String::from("x = ");
    for _ in 0..250 {
        code.push('[');
    }
    code.push('1');
    for _ in 0..250 {
        code.push(']');
    }
    code.push('\n');
    let err = parse_error(&code);
    assert!(matches!(err, ParseError::Syntax { .. }), "got {err:?}");
    assert!(err.to_string().contains("nested"));
}

#[test]
fn supported_subset_parses() {
    let code = "\
def f(a, b):
    xs = [1, 2, 3]
    d = {'k': a}
    t = (a, b)
    s = {1, 2}
    xs[0] += 1
    y = a if b > 0 else -b
    while b > 0:
        b -= 1
        if b == 1:
            break
        else:
            continue
    return xs[1:2], d, t, s, y
";
    assert!(AnalysisSession::new(code).is_ok());
}
