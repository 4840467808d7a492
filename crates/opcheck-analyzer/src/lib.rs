//! Rule registration engine and driver for the opcheck analyzer.
//!
//! Rules register interest in two levels:
//!
//! 1. [`AnalysisContext::register_body_start`] with a cheap predicate over the
//!    method symbol. The handler runs once per matching method body.
//! 2. Inside that handler, [`BodyStartContext::register_operation`] for the
//!    operation kinds the rule wants to inspect in *that* body only.
//!
//! The [`Analyzer`] initializes each enabled rule once, then walks every
//! method body exactly once, dispatching operations to the handlers that
//! registered for their kind. Bodies can be processed in parallel; a panic in
//! one handler is contained to that invocation.

pub mod cancellation;
pub use cancellation::CancellationToken;

pub mod context;
pub use context::{
    AnalysisContext, BodyStartContext, GeneratedCodeAnalysis, OperationContext,
};

pub mod driver;
pub use driver::{AnalysisOutcome, Analyzer, ExecutionMode, in_isolated_callback};

pub mod options;
pub use options::{AnalyzerOptions, OptionsError, RuleSetting};

pub mod rules;
pub use rules::{Rule, builtin_rules};

pub mod sink;
pub use sink::{BodyKey, DiagnosticSink};
