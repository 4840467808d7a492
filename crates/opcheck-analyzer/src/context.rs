//! Registration contexts handed to rules.
//!
//! [`AnalysisContext`] lives for the whole run and collects body-start
//! actions. [`BodyStartContext`] lives for one method body and collects the
//! operation handlers registered for that body. [`OperationContext`] is
//! passed to each operation handler invocation.

use opcheck_common::Diagnostic;
use opcheck_ir::{
    CompilationUnit, MethodBody, MethodSymbol, OperationArena, OperationIndex, OperationKind,
};
use serde::{Deserialize, Serialize};

/// How a rule treats compilation units produced by a code generator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GeneratedCodeAnalysis {
    /// Generated bodies are never visited.
    Skip,
    /// Generated bodies are visited, their diagnostics are dropped.
    Analyze,
    #[default]
    AnalyzeAndReport,
}

impl GeneratedCodeAnalysis {
    #[inline]
    pub const fn analyzes(self) -> bool {
        !matches!(self, GeneratedCodeAnalysis::Skip)
    }

    #[inline]
    pub const fn reports(self) -> bool {
        matches!(self, GeneratedCodeAnalysis::AnalyzeAndReport)
    }
}

pub(crate) type BodyPredicate = Box<dyn Fn(&MethodSymbol) -> bool + Send + Sync>;
pub(crate) type BodyStartHandler = Box<dyn for<'a> Fn(&mut BodyStartContext<'a>) + Send + Sync>;
pub(crate) type OperationHandler<'a> = Box<dyn Fn(&mut OperationContext<'a, '_>) + 'a>;

pub(crate) struct BodyStartAction {
    pub(crate) predicate: BodyPredicate,
    pub(crate) handler: BodyStartHandler,
}

/// Run-wide registration surface passed to [`Rule::initialize`](crate::Rule::initialize).
pub struct AnalysisContext {
    pub(crate) body_start_actions: Vec<BodyStartAction>,
    pub(crate) concurrent: bool,
    pub(crate) generated_code: GeneratedCodeAnalysis,
}

impl Default for AnalysisContext {
    fn default() -> Self {
        AnalysisContext::new()
    }
}

impl AnalysisContext {
    pub fn new() -> Self {
        AnalysisContext {
            body_start_actions: Vec::new(),
            concurrent: false,
            generated_code: GeneratedCodeAnalysis::default(),
        }
    }

    /// Declare that this rule's handlers may run on several bodies at once.
    pub fn enable_concurrent_execution(&mut self) {
        self.concurrent = true;
    }

    pub fn configure_generated_code_analysis(&mut self, mode: GeneratedCodeAnalysis) {
        self.generated_code = mode;
    }

    /// Register `handler` to run at the start of every method body whose
    /// symbol satisfies `predicate`.
    ///
    /// The handler typically calls [`BodyStartContext::register_operation`];
    /// those registrations apply to that one body only.
    pub fn register_body_start<P, H>(&mut self, predicate: P, handler: H)
    where
        P: Fn(&MethodSymbol) -> bool + Send + Sync + 'static,
        H: for<'a> Fn(&mut BodyStartContext<'a>) + Send + Sync + 'static,
    {
        self.body_start_actions.push(BodyStartAction {
            predicate: Box::new(predicate),
            handler: Box::new(handler),
        });
    }

    pub fn body_start_action_count(&self) -> usize {
        self.body_start_actions.len()
    }

    pub fn is_concurrent(&self) -> bool {
        self.concurrent
    }

    pub fn generated_code(&self) -> GeneratedCodeAnalysis {
        self.generated_code
    }
}

/// Registration surface for one method body.
pub struct BodyStartContext<'a> {
    unit: &'a CompilationUnit,
    body: &'a MethodBody,
    method: &'a MethodSymbol,
    pub(crate) operation_actions: Vec<(OperationKind, OperationHandler<'a>)>,
}

impl<'a> BodyStartContext<'a> {
    pub(crate) fn new(
        unit: &'a CompilationUnit,
        body: &'a MethodBody,
        method: &'a MethodSymbol,
    ) -> Self {
        BodyStartContext {
            unit,
            body,
            method,
            operation_actions: Vec::new(),
        }
    }

    #[inline]
    pub fn unit(&self) -> &'a CompilationUnit {
        self.unit
    }

    #[inline]
    pub fn body(&self) -> &'a MethodBody {
        self.body
    }

    /// The method whose body is starting.
    #[inline]
    pub fn method(&self) -> &'a MethodSymbol {
        self.method
    }

    #[inline]
    pub fn operations(&self) -> &'a OperationArena {
        &self.unit.operations
    }

    /// Run `handler` for every operation of `kind` in this body.
    ///
    /// The handler may borrow anything that outlives the body, such as the
    /// method symbol returned by [`method`](Self::method).
    pub fn register_operation<F>(&mut self, kind: OperationKind, handler: F)
    where
        F: Fn(&mut OperationContext<'a, '_>) + 'a,
    {
        self.operation_actions.push((kind, Box::new(handler)));
    }
}

/// Context for one operation handler invocation.
pub struct OperationContext<'a, 'd> {
    unit: &'a CompilationUnit,
    method: &'a MethodSymbol,
    operation: OperationIndex,
    diagnostics: &'d mut Vec<Diagnostic>,
}

impl<'a, 'd> OperationContext<'a, 'd> {
    pub(crate) fn new(
        unit: &'a CompilationUnit,
        method: &'a MethodSymbol,
        operation: OperationIndex,
        diagnostics: &'d mut Vec<Diagnostic>,
    ) -> Self {
        OperationContext {
            unit,
            method,
            operation,
            diagnostics,
        }
    }

    /// Index of the operation being visited.
    #[inline]
    pub fn operation(&self) -> OperationIndex {
        self.operation
    }

    #[inline]
    pub fn operations(&self) -> &'a OperationArena {
        &self.unit.operations
    }

    #[inline]
    pub fn unit(&self) -> &'a CompilationUnit {
        self.unit
    }

    #[inline]
    pub fn method(&self) -> &'a MethodSymbol {
        self.method
    }

    #[inline]
    pub fn file(&self) -> &'a str {
        &self.unit.file
    }

    pub fn report_diagnostic(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }
}
