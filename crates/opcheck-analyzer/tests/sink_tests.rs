use super::*;
use opcheck_common::{DiagnosticDescriptor, RuleCategory, Severity, Span};

const TEST_RULE: DiagnosticDescriptor = DiagnosticDescriptor {
    id: "T0001",
    title: "test",
    message_format: "finding {0}",
    category: RuleCategory::Usage,
    default_severity: Severity::Info,
    is_enabled_by_default: true,
    help_link: None,
    custom_tags: &[],
};

fn diag(label: &str) -> Diagnostic {
    TEST_RULE.create("a.cs", Span::at(0, 1), &[label])
}

#[test]
fn empty_commits_are_dropped() {
    let sink = DiagnosticSink::new();
    sink.commit(BodyKey::new(0, BodyId(0)), Vec::new());
    assert!(sink.is_empty());
    assert!(sink.into_sorted().is_empty());
}

#[test]
fn into_sorted_orders_by_unit_then_body() {
    let sink = DiagnosticSink::new();
    sink.commit(BodyKey::new(1, BodyId(0)), vec![diag("u1b0")]);
    sink.commit(BodyKey::new(0, BodyId(2)), vec![diag("u0b2-first"), diag("u0b2-second")]);
    sink.commit(BodyKey::new(0, BodyId(1)), vec![diag("u0b1")]);
    assert_eq!(sink.len(), 4);

    let messages: Vec<String> = sink
        .into_sorted()
        .into_iter()
        .map(|d| d.message_text)
        .collect();
    assert_eq!(
        messages,
        [
            "finding u0b1",
            "finding u0b2-first",
            "finding u0b2-second",
            "finding u1b0"
        ]
    );
}

#[test]
fn commits_from_many_threads() {
    let sink = DiagnosticSink::new();
    std::thread::scope(|scope| {
        for unit in 0..4u32 {
            let sink = &sink;
            scope.spawn(move || {
                for body in 0..25u32 {
                    sink.commit(BodyKey::new(unit, BodyId(body)), vec![diag("x")]);
                }
            });
        }
    });
    assert_eq!(sink.len(), 100);
}
