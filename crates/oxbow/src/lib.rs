#![doc = include_str!("../../../README.md")]

mod analysis;
mod deadcode;
mod functions;
mod intern;
mod parse;
mod propagate;
mod query;
mod report;
mod session;
mod tables;
mod transform;
mod tree;
mod unparse;

pub use crate::{
    analysis::{Analysis, EvalMode},
    deadcode::{DeadCodeReport, find_dead_code},
    functions::FunctionTable,
    intern::{Interner, StringId},
    parse::ParseError,
    query::report_closure,
    report::{CollectStringReport, ReportSink, StdReport},
    session::{AnalysisSession, SessionError},
    tables::{FlowState, FunctionFlow, Loc, RefEntry, ReferenceTable, ScopeStack, ScopeTable, Token, UseTable},
    tree::{
        AssignTarget, BoolOperator, CmpOperator, Expr, ExprLoc, FunctionDef, Identifier, Literal, Node, NodeId,
        Operator, Span, UnaryOperator,
    },
};
