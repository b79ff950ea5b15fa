//! The public session API: parse once, then query or transform.

use std::fmt;
use std::io::{self, BufRead};

use crate::{
    analysis::{Analysis, EvalMode},
    deadcode::{DeadCodeReport, find_dead_code},
    functions::FunctionTable,
    intern::{Interner, StringId},
    parse::{ParseError, parse},
    query::report_closure,
    report::ReportSink,
    tables::{FunctionFlow, Loc},
    transform::run_to_fixpoint,
    tree::Node,
    unparse::unparse,
};

/// Error type for session execution, separating failures by pipeline stage.
#[derive(Debug)]
pub enum SessionError {
    /// Parsing failed before any analysis ran.
    Parse(ParseError),
    /// Reading input or writing output failed.
    Io(io::Error),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(error) => write!(f, "{error}"),
            Self::Io(error) => write!(f, "io error: {error}"),
        }
    }
}

impl std::error::Error for SessionError {}

impl From<ParseError> for SessionError {
    fn from(error: ParseError) -> Self {
        Self::Parse(error)
    }
}

impl From<io::Error> for SessionError {
    fn from(error: io::Error) -> Self {
        Self::Io(error)
    }
}

/// An analysis session over one parsed module.
///
/// Owns the tree and the interner. Interactive queries leave the tree
/// untouched; [`AnalysisSession::transform`] rewrites it in place.
pub struct AnalysisSession {
    module: Vec<Node>,
    interner: Interner,
    /// Interned `"return"`: reserved key for return-site entries.
    ret: StringId,
    /// Interned `"_"`: replacement name for dead, undeletable targets.
    underscore: StringId,
}

impl AnalysisSession {
    /// Parses `code` and prepares a session over it.
    pub fn new(code: &str) -> Result<Self, ParseError> {
        let result = parse(code)?;
        let mut interner = result.interner;
        let ret = interner.intern("return");
        let underscore = interner.intern("_");
        Ok(Self {
            module: result.module,
            interner,
            ret,
            underscore,
        })
    }

    #[must_use]
    pub fn interner(&self) -> &Interner {
        &self.interner
    }

    /// The current tree, re-emitted as source.
    #[must_use]
    pub fn source(&self) -> String {
        unparse(&self.module, &self.interner)
    }

    /// Analyzes one function in analysis mode (top-level invocation: every
    /// parameter bound to an empty dependency list).
    #[must_use]
    pub fn analyze(&self, function: &str) -> Option<FunctionFlow> {
        let functions = FunctionTable::collect(&self.module);
        let id = self.interner.lookup(function)?;
        let func = functions.get(id)?.clone();
        let mut analysis = Analysis::new(&functions, EvalMode::Analysis, self.ret);
        analysis.function_flow(&func, Vec::new())
    }

    /// Same as [`AnalysisSession::analyze`] but in propagation mode, where
    /// constants appear as dependency tokens and calls stay opaque.
    #[must_use]
    pub fn analyze_propagation(&self, function: &str) -> Option<FunctionFlow> {
        let functions = FunctionTable::collect(&self.module);
        let id = self.interner.lookup(function)?;
        let func = functions.get(id)?.clone();
        let mut analysis = Analysis::new(&functions, EvalMode::Propagation, self.ret);
        analysis.function_flow(&func, Vec::new())
    }

    /// Classifies the module's dead code without touching the tree.
    #[must_use]
    pub fn dead_code(&self) -> DeadCodeReport {
        let functions = FunctionTable::collect(&self.module);
        find_dead_code(&functions, self.ret)
    }

    /// Runs one interactive dependency query: prompts for a function, a
    /// variable, and a line, reprompting until each is valid, then prints
    /// the dependency closure. Returns cleanly when input ends.
    pub fn interactive(&self, input: &mut dyn BufRead, sink: &mut dyn ReportSink) -> Result<(), SessionError> {
        let functions = FunctionTable::collect(&self.module);

        let func = loop {
            let Some(reply) = prompt(input, sink, "Pick function to analyze: ")? else {
                return Ok(());
            };
            let found = self
                .interner
                .lookup(reply.trim())
                .and_then(|id| functions.get(id));
            match found {
                Some(func) => break func.clone(),
                None => sink.line("Function does not exist")?,
            }
        };

        let mut analysis = Analysis::new(&functions, EvalMode::Analysis, self.ret);
        let Some(flow) = analysis.function_flow(&func, Vec::new()) else {
            return Ok(());
        };

        let variable = loop {
            let Some(reply) = prompt(input, sink, "Pick variable name to analyze: ")? else {
                return Ok(());
            };
            let found = self
                .interner
                .lookup(reply.trim())
                .filter(|id| flow.refs.contains_key(id));
            match found {
                Some(id) => break id,
                None => sink.line("Variable does not exist")?,
            }
        };

        let line = loop {
            let Some(reply) = prompt(input, sink, "Pick line number to analyze: ")? else {
                return Ok(());
            };
            match reply.trim().parse::<i64>() {
                Ok(line) if (0..=i64::from(func.span.end_line)).contains(&line) => break line,
                _ => sink.line("Line is out of the function scope")?,
            }
        };
        let loc = match u32::try_from(line) {
            Ok(0) | Err(_) => Loc::ReturnJoin,
            Ok(line) => Loc::Real(line),
        };

        report_closure(&flow.refs, variable, loc, &functions, self.ret, &self.interner, sink)?;
        Ok(())
    }

    /// Transforms the module to its dead-code-free fixpoint, reports the
    /// return-irrelevant variables per function, and emits the result.
    pub fn transform(&mut self, sink: &mut dyn ReportSink) -> Result<(), SessionError> {
        run_to_fixpoint(&mut self.module, self.ret, self.underscore);

        let functions = FunctionTable::collect(&self.module);
        let report = find_dead_code(&functions, self.ret);
        for (func, vars) in &report.return_irrelevant {
            if vars.is_empty() {
                continue;
            }
            sink.line(&format!(
                "These variables do not affect return in function: {}",
                self.interner.resolve(*func)
            ))?;
            let names: Vec<&str> = vars.iter().map(|v| self.interner.resolve(*v)).collect();
            sink.line(&format!("[{}]", names.join(", ")))?;
        }

        sink.emit(&unparse(&self.module, &self.interner))?;
        Ok(())
    }
}

/// Writes a prompt and reads one reply; `None` on end of input.
fn prompt(input: &mut dyn BufRead, sink: &mut dyn ReportSink, text: &str) -> Result<Option<String>, SessionError> {
    sink.emit(text)?;
    sink.flush()?;
    let mut reply = String::new();
    if input.read_line(&mut reply)? == 0 {
        return Ok(None);
    }
    Ok(Some(reply))
}
