//! Analysis driver: rule initialization, per-body dispatch and run outcome.
//!
//! Each method body goes through two phases:
//!
//! - **Filtering**: every body-start action whose predicate accepts the
//!   method runs and registers operation handlers for this body. A body with
//!   no registered handlers ends here.
//! - **Scanning**: the body's operation tree is walked once in pre-order and
//!   each node is handed to the handlers registered for its kind. Rules
//!   classify what they find inside those handlers.
//!
//! Diagnostics are buffered per body and committed to the
//! [`DiagnosticSink`] when the body completes.

use std::any::Any;
use std::cell::Cell;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use opcheck_common::Diagnostic;
use opcheck_common::limits::BODY_DIAGNOSTICS_CAPACITY;
use opcheck_ir::{CompilationUnit, MethodBody, MethodSymbol, OperationKind};
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::cancellation::CancellationToken;
use crate::context::{AnalysisContext, BodyStartContext, OperationContext, OperationHandler};
use crate::options::AnalyzerOptions;
use crate::rules::{Rule, builtin_rules};
use crate::sink::{BodyKey, DiagnosticSink};

/// Whether bodies may be analyzed in parallel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ExecutionMode {
    /// Bodies are distributed over the current rayon pool, provided every
    /// rule enabled concurrent execution.
    #[default]
    Concurrent,
    Sequential,
}

/// Result of one [`Analyzer::analyze`] call.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AnalysisOutcome {
    /// Ordered by unit, then body, then emission order within the body.
    pub diagnostics: Vec<Diagnostic>,
    /// Bodies that ran to completion, including those no rule was interested in.
    pub bodies_analyzed: usize,
    /// Bodies skipped because of cancellation or generated-code policy.
    pub bodies_skipped: usize,
    /// Rule callbacks that panicked. Their diagnostics were discarded.
    pub handler_faults: usize,
    /// True when at least one body was abandoned because of cancellation.
    pub cancelled: bool,
}

thread_local! {
    static ISOLATING: Cell<bool> = const { Cell::new(false) };
}

/// Whether the current thread is inside a rule callback whose panics the
/// analyzer catches and reports as faults.
///
/// Panic hooks use this to stay quiet for panics that never escape.
pub fn in_isolated_callback() -> bool {
    ISOLATING.with(Cell::get)
}

/// `catch_unwind` around a rule callback, flagging the thread while it runs.
fn isolate<R>(callback: impl FnOnce() -> R) -> std::thread::Result<R> {
    let previous = ISOLATING.replace(true);
    let result = catch_unwind(AssertUnwindSafe(callback));
    ISOLATING.set(previous);
    result
}

struct RegisteredRule {
    id: &'static str,
    context: AnalysisContext,
}

#[derive(Default)]
struct RunCounters {
    analyzed: AtomicUsize,
    skipped: AtomicUsize,
    faults: AtomicUsize,
    cancelled: AtomicBool,
}

/// Handler registered for one body, tagged with the rule that owns it.
struct BodyAction<'a> {
    rule: usize,
    kind: OperationKind,
    handler: OperationHandler<'a>,
}

/// Runs a fixed set of initialized rules over compilation units.
pub struct Analyzer {
    rules: Vec<RegisteredRule>,
    options: AnalyzerOptions,
    initialization_faults: usize,
}

impl Analyzer {
    /// Initialize every enabled rule in `rules`.
    ///
    /// A rule is enabled when any of its descriptors is enabled after
    /// applying `options`. A rule whose `initialize` panics is left out.
    pub fn new(rules: &[Arc<dyn Rule>], options: AnalyzerOptions) -> Self {
        let mut registered = Vec::with_capacity(rules.len());
        let mut initialization_faults = 0;

        for rule in rules {
            let descriptors = rule.descriptors();
            let Some(first) = descriptors.first() else {
                tracing::warn!("rule without descriptors ignored");
                continue;
            };
            if !descriptors.iter().any(|descriptor| options.is_enabled(descriptor)) {
                tracing::debug!(rule = first.id, "rule disabled");
                continue;
            }

            let mut context = AnalysisContext::new();
            let initialized = isolate(|| rule.initialize(&mut context));
            if let Err(payload) = initialized {
                initialization_faults += 1;
                tracing::error!(
                    rule = first.id,
                    panic = panic_message(&*payload),
                    "rule initialization panicked; rule skipped"
                );
                continue;
            }
            if let Some(policy) = options.generated_code {
                context.configure_generated_code_analysis(policy);
            }

            tracing::debug!(
                rule = first.id,
                body_start_actions = context.body_start_action_count(),
                concurrent = context.is_concurrent(),
                "rule initialized"
            );
            registered.push(RegisteredRule {
                id: first.id,
                context,
            });
        }

        Analyzer {
            rules: registered,
            options,
            initialization_faults,
        }
    }

    pub fn with_builtin_rules(options: AnalyzerOptions) -> Self {
        Analyzer::new(&builtin_rules(), options)
    }

    /// Ids of the rules that were initialized, in registration order.
    pub fn rule_ids(&self) -> Vec<&'static str> {
        self.rules.iter().map(|rule| rule.id).collect()
    }

    pub fn options(&self) -> &AnalyzerOptions {
        &self.options
    }

    /// Whether a run in `mode` would process bodies in parallel.
    pub fn runs_concurrently(&self, mode: ExecutionMode) -> bool {
        mode == ExecutionMode::Concurrent && self.rules.iter().all(|rule| rule.context.concurrent)
    }

    /// Analyze every method body of `units`.
    ///
    /// `cancellation` is checked before each body starts.
    pub fn analyze(
        &self,
        units: &[CompilationUnit],
        mode: ExecutionMode,
        cancellation: &CancellationToken,
    ) -> AnalysisOutcome {
        let work: Vec<(BodyKey, &CompilationUnit, &MethodBody)> = units
            .iter()
            .enumerate()
            .flat_map(|(unit_index, unit)| {
                unit.iter_bodies().map(move |(body_id, body)| {
                    (BodyKey::new(unit_index as u32, body_id), unit, body)
                })
            })
            .collect();

        let concurrent = self.runs_concurrently(mode);
        let run_span = tracing::info_span!(
            "analyze",
            units = units.len(),
            bodies = work.len(),
            rules = self.rules.len(),
            concurrent
        );
        let _entered = run_span.enter();

        let sink = DiagnosticSink::new();
        let counters = RunCounters::default();
        let visit = |&(key, unit, body): &(BodyKey, &CompilationUnit, &MethodBody)| {
            self.visit_body(key, unit, body, cancellation, &sink, &counters, &run_span);
        };
        if concurrent {
            work.par_iter().for_each(visit);
        } else {
            work.iter().for_each(visit);
        }

        let outcome = AnalysisOutcome {
            diagnostics: sink.into_sorted(),
            bodies_analyzed: counters.analyzed.into_inner(),
            bodies_skipped: counters.skipped.into_inner(),
            handler_faults: counters.faults.into_inner() + self.initialization_faults,
            cancelled: counters.cancelled.into_inner(),
        };
        if outcome.cancelled {
            tracing::info!(
                analyzed = outcome.bodies_analyzed,
                skipped = outcome.bodies_skipped,
                "analysis cancelled"
            );
        }
        tracing::debug!(
            diagnostics = outcome.diagnostics.len(),
            faults = outcome.handler_faults,
            "analysis finished"
        );
        outcome
    }

    fn visit_body(
        &self,
        key: BodyKey,
        unit: &CompilationUnit,
        body: &MethodBody,
        cancellation: &CancellationToken,
        sink: &DiagnosticSink,
        counters: &RunCounters,
        run_span: &tracing::Span,
    ) {
        if cancellation.is_cancelled() {
            counters.cancelled.store(true, Ordering::Relaxed);
            counters.skipped.fetch_add(1, Ordering::Relaxed);
            return;
        }
        let Some(method) = unit.symbols.method(body.method) else {
            counters.skipped.fetch_add(1, Ordering::Relaxed);
            return;
        };
        // Worker threads do not inherit the caller's current span.
        let _span = tracing::debug_span!(parent: run_span, "body", file = %unit.file, method = %method.name)
            .entered();

        if unit.generated
            && !self
                .rules
                .iter()
                .any(|rule| rule.context.generated_code.analyzes())
        {
            tracing::debug!("generated code skipped");
            counters.skipped.fetch_add(1, Ordering::Relaxed);
            return;
        }

        let actions = self.filter_body(unit, body, method, counters);
        if actions.is_empty() {
            counters.analyzed.fetch_add(1, Ordering::Relaxed);
            return;
        }

        let mut diagnostics = self.scan_body(unit, body, method, &actions, counters);
        for diagnostic in &mut diagnostics {
            if let Some(severity) = self.options.severity_override(diagnostic.code) {
                diagnostic.severity = severity;
            }
        }
        sink.commit(key, diagnostics);
        counters.analyzed.fetch_add(1, Ordering::Relaxed);
    }

    /// Run body-start actions and collect the operation handlers they register.
    fn filter_body<'a>(
        &self,
        unit: &'a CompilationUnit,
        body: &'a MethodBody,
        method: &'a MethodSymbol,
        counters: &RunCounters,
    ) -> Vec<BodyAction<'a>> {
        let mut actions = Vec::new();

        for (rule_index, rule) in self.rules.iter().enumerate() {
            if unit.generated && !rule.context.generated_code.analyzes() {
                continue;
            }
            for action in &rule.context.body_start_actions {
                match isolate(|| (action.predicate)(method)) {
                    Ok(true) => {}
                    Ok(false) => continue,
                    Err(payload) => {
                        counters.faults.fetch_add(1, Ordering::Relaxed);
                        tracing::error!(
                            rule = rule.id,
                            panic = panic_message(&*payload),
                            "body-start predicate panicked"
                        );
                        continue;
                    }
                }

                let mut start = BodyStartContext::new(unit, body, method);
                match isolate(|| (action.handler)(&mut start)) {
                    Ok(()) => {
                        actions.extend(start.operation_actions.into_iter().map(
                            |(kind, handler)| BodyAction {
                                rule: rule_index,
                                kind,
                                handler,
                            },
                        ));
                    }
                    Err(payload) => {
                        counters.faults.fetch_add(1, Ordering::Relaxed);
                        tracing::error!(
                            rule = rule.id,
                            panic = panic_message(&*payload),
                            "body-start handler panicked; its registrations for this body are dropped"
                        );
                    }
                }
            }
        }

        actions
    }

    /// Walk the body once, dispatching each node to the handlers for its kind.
    fn scan_body<'a>(
        &self,
        unit: &'a CompilationUnit,
        body: &'a MethodBody,
        method: &'a MethodSymbol,
        actions: &[BodyAction<'a>],
        counters: &RunCounters,
    ) -> Vec<Diagnostic> {
        let mut dispatch: FxHashMap<OperationKind, SmallVec<[usize; 2]>> = FxHashMap::default();
        for (index, action) in actions.iter().enumerate() {
            dispatch.entry(action.kind).or_default().push(index);
        }

        let mut diagnostics = Vec::with_capacity(BODY_DIAGNOSTICS_CAPACITY);
        for (operation, node) in unit.operations.descendants(body.root) {
            let Some(handlers) = dispatch.get(&node.kind()) else {
                continue;
            };
            for &action_index in handlers {
                let action = &actions[action_index];
                let rule = &self.rules[action.rule];
                let mark = diagnostics.len();

                let result = isolate(|| {
                    let mut context = OperationContext::new(unit, method, operation, &mut diagnostics);
                    (action.handler)(&mut context);
                });
                match result {
                    Ok(()) => {
                        if unit.generated && !rule.context.generated_code.reports() {
                            diagnostics.truncate(mark);
                        }
                    }
                    Err(payload) => {
                        diagnostics.truncate(mark);
                        counters.faults.fetch_add(1, Ordering::Relaxed);
                        tracing::error!(
                            rule = rule.id,
                            operation = %operation,
                            panic = panic_message(&*payload),
                            "operation handler panicked"
                        );
                    }
                }
            }
        }

        diagnostics
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("<non-string panic payload>")
}
