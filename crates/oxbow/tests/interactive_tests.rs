//! Tests for the interactive query session: prompting, reprompting on bad
//! input, and the printed dependency closures.

use std::io::Cursor;

use oxbow::{AnalysisSession, CollectStringReport};
use pretty_assertions::assert_eq;

fn run_session(code: &str, input: &str) -> String {
    let session = AnalysisSession::new(code).expect("code should parse");
    let mut reader = Cursor::new(input.to_owned());
    let mut sink = CollectStringReport::new();
    session
        .interactive(&mut reader, &mut sink)
        .expect("session should not fail");
    sink.into_output()
}

const BRANCHY: &str = "def h():\n    x = 5\n    if x > 0:\n        y = 1\n    else:\n        y = 2\n    return y\n";

#[test]
fn query_reports_merged_definition() {
    let output = run_session(BRANCHY, "h\ny\n7\n");
    let expected = "\
Pick function to analyze: Pick variable name to analyze: Pick line number to analyze: \
Variable y depends on these variables at line: 6
[]
";
    assert_eq!(output, expected);
}

#[test]
fn invalid_choices_reprompt() {
    let output = run_session(BRANCHY, "nope\nh\nzzz\ny\n99\nabc\n7\n");
    let expected = "\
Pick function to analyze: Function does not exist
Pick function to analyze: Pick variable name to analyze: Variable does not exist
Pick variable name to analyze: Pick line number to analyze: Line is out of the function scope
Pick line number to analyze: Line is out of the function scope
Pick line number to analyze: Variable y depends on these variables at line: 6
[]
";
    assert_eq!(output, expected);
}

#[test]
fn end_of_input_ends_session_cleanly() {
    let output = run_session(BRANCHY, "");
    assert_eq!(output, "Pick function to analyze: ");
}

#[test]
fn query_descends_into_called_function() {
    let code = "def callee(p):\n    return p + 1\n\ndef caller():\n    a = 2\n    return callee(a)\n";
    let output = run_session(code, "caller\nreturn\n0\n");
    let expected = "\
Pick function to analyze: Pick variable name to analyze: Pick line number to analyze: \
Returned values from the function
[callee, a]
Dependencies from function: callee
Returned values from the function
[p]
Variable p depends on these variables at line: 1
[a]
Variable a depends on these variables at line: 5
[]
";
    assert_eq!(output, expected);
}

#[test]
fn loop_closure_reaches_the_iterator_and_its_source() {
    let code = "def q():\n    a = 1\n    for i in range(3):\n        a = i\n    return a\n";
    let output = run_session(code, "q\na\n5\n");
    // the merge location is reported as the loop's closing line, never as a
    // fractional number
    let expected = "\
Pick function to analyze: Pick variable name to analyze: Pick line number to analyze: \
Variable a depends on these variables at line: 4
[i]
Variable i depends on these variables at line: 4
[range]
";
    assert_eq!(output, expected);
}
