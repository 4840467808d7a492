//! CA2011: avoid infinite recursion.
//!
//! A property setter that assigns its own property on the same instance calls
//! itself. When the assignment runs unconditionally the recursion is certain;
//! when it sits inside a conditional, a lambda or a local function it only
//! might happen, and the rule reports it with the softer message.
//!
//! The rule registers a body-start action for property setters only, and
//! within each setter body an operation handler for simple assignments.

use opcheck_common::{Diagnostic, DiagnosticDescriptor, RuleCategory, Severity, Span};
use opcheck_ir::{
    CompilationUnit, InstanceReferenceKind, MethodSymbol, OperationArena, OperationIndex,
    OperationKind,
};

use crate::context::{AnalysisContext, GeneratedCodeAnalysis};
use crate::rules::Rule;

pub const RULE_ID: &str = "CA2011";

const TITLE: &str = "Avoid infinite recursion";
const HELP_LINK: &str =
    "https://learn.microsoft.com/dotnet/fundamentals/code-analysis/quality-rules/ca2011";
const CUSTOM_TAGS: &[&str] = &["Telemetry"];

/// Reported when the self-assignment always executes.
pub const RULE: DiagnosticDescriptor = DiagnosticDescriptor {
    id: RULE_ID,
    title: TITLE,
    message_format: "Do not assign the property '{0}' within its setter. This call will result in an infinite recursion.",
    category: RuleCategory::Reliability,
    default_severity: Severity::Warning,
    is_enabled_by_default: true,
    help_link: Some(HELP_LINK),
    custom_tags: CUSTOM_TAGS,
};

/// Reported when the self-assignment is guarded or deferred.
pub const MAYBE_RULE: DiagnosticDescriptor = DiagnosticDescriptor {
    id: RULE_ID,
    title: TITLE,
    message_format: "Do not assign the property '{0}' within its setter. This call might result in an infinite recursion.",
    category: RuleCategory::Reliability,
    default_severity: Severity::Warning,
    is_enabled_by_default: true,
    help_link: Some(HELP_LINK),
    custom_tags: CUSTOM_TAGS,
};

const DESCRIPTORS: &[DiagnosticDescriptor] = &[RULE, MAYBE_RULE];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Confidence {
    /// Every execution of the setter reaches the assignment.
    Definite,
    /// The assignment is behind a conditional or inside a lambda or local function.
    Possible,
}

/// A simple assignment whose target is the setter's own property on `this`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AssignmentMatch<'a> {
    pub assignment: OperationIndex,
    pub property_name: &'a str,
    /// Declaration of the property, `Span::EMPTY` when unknown.
    pub declaration: Span,
    pub span: Span,
}

/// A classified self-assignment, ready to be reported.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Finding {
    pub confidence: Confidence,
    pub property_name: String,
    pub declaration: Span,
    pub span: Span,
}

impl Finding {
    pub fn new(found: &AssignmentMatch<'_>, confidence: Confidence) -> Self {
        Finding {
            confidence,
            property_name: found.property_name.to_string(),
            declaration: found.declaration,
            span: found.span,
        }
    }

    pub fn descriptor(&self) -> &'static DiagnosticDescriptor {
        match self.confidence {
            Confidence::Definite => &RULE,
            Confidence::Possible => &MAYBE_RULE,
        }
    }

    pub fn into_diagnostic(self, file: &str) -> Diagnostic {
        let diagnostic = self
            .descriptor()
            .create(file, self.span, &[self.property_name.as_str()]);
        if self.declaration.is_empty() {
            return diagnostic;
        }
        diagnostic.with_related(
            file.to_string(),
            self.declaration,
            format!("Property '{}' is declared here.", self.property_name),
        )
    }
}

/// Check whether the simple assignment at `assignment` targets the property
/// that `setter` belongs to, through the containing instance.
///
/// Anything that does not line up (wrong node kinds, a missing child, a
/// different property, an explicit receiver other than `this`) is `None`.
pub fn match_self_assignment<'a>(
    unit: &'a CompilationUnit,
    setter: &MethodSymbol,
    assignment: OperationIndex,
) -> Option<AssignmentMatch<'a>> {
    if !setter.is_property_setter() {
        return None;
    }
    let own_property = setter.associated_property?;
    let arena = &unit.operations;

    let data = arena.get_simple_assignment(assignment)?;
    let target = arena.get_property_reference(data.target)?;
    if target.property != own_property {
        return None;
    }
    let instance = arena.get_instance_reference(target.instance)?;
    if instance.reference_kind != InstanceReferenceKind::ContainingTypeInstance {
        return None;
    }

    let property = unit.symbols.property(target.property)?;
    Some(AssignmentMatch {
        assignment,
        property_name: &property.name,
        declaration: property.span,
        span: arena.span(assignment)?,
    })
}

/// Classify how surely the operation at `index` executes when its body runs.
///
/// The nearest conditional, lambda or local function above it makes the
/// execution uncertain; reaching the body root without one makes it certain.
pub fn classify(arena: &OperationArena, index: OperationIndex) -> Confidence {
    let guarded = arena
        .ancestors(index)
        .any(|(_, node)| node.kind().is_deferred_or_conditional());
    if guarded {
        Confidence::Possible
    } else {
        Confidence::Definite
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct AvoidInfiniteRecursion;

impl Rule for AvoidInfiniteRecursion {
    fn descriptors(&self) -> &'static [DiagnosticDescriptor] {
        DESCRIPTORS
    }

    fn initialize(&self, context: &mut AnalysisContext) {
        context.enable_concurrent_execution();
        context.configure_generated_code_analysis(GeneratedCodeAnalysis::Skip);

        context.register_body_start(MethodSymbol::is_property_setter, |body| {
            let setter = body.method();
            body.register_operation(OperationKind::SimpleAssignment, move |op| {
                let unit = op.unit();
                let Some(found) = match_self_assignment(unit, setter, op.operation()) else {
                    return;
                };
                let confidence = classify(&unit.operations, found.assignment);
                tracing::trace!(
                    property = found.property_name,
                    ?confidence,
                    "self-assignment in setter"
                );
                let diagnostic = Finding::new(&found, confidence).into_diagnostic(op.file());
                op.report_diagnostic(diagnostic);
            });
        });
    }
}

#[cfg(test)]
#[path = "../../tests/avoid_infinite_recursion_tests.rs"]
mod tests;
