//! Rule interface and the built-in rule set.

use std::sync::Arc;

use opcheck_common::DiagnosticDescriptor;

use crate::context::AnalysisContext;

pub mod avoid_infinite_recursion;
pub use avoid_infinite_recursion::AvoidInfiniteRecursion;

/// An analysis rule.
///
/// `initialize` runs once per [`Analyzer`](crate::Analyzer) and registers the
/// rule's callbacks. Rules hold no per-body state; anything a body needs is
/// captured by the closures registered for it.
pub trait Rule: Send + Sync {
    /// Every descriptor the rule may report with. The first one's id names
    /// the rule in options and logs.
    fn descriptors(&self) -> &'static [DiagnosticDescriptor];

    fn initialize(&self, context: &mut AnalysisContext);
}

pub fn builtin_rules() -> Vec<Arc<dyn Rule>> {
    vec![Arc::new(AvoidInfiniteRecursion)]
}
