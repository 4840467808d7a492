//! End-to-end scenarios for the avoid-infinite-recursion rule.


use fixtures::*;
use opcheck_analyzer::ExecutionMode;
use opcheck_common::Severity;
use opcheck_ir::{InstanceReferenceKind, MethodKind, MethodSymbol, OperationIndex};

#[test]
fn assigning_other_members_is_fine() {
    let unit = person_setter(|b, _| {
        let age = b.property("Age", "Person");
        vec![b.assign_self(age), b.assign_field("name")]
    });

    let outcome = run(&[unit]);
    assert!(outcome.diagnostics.is_empty());
    assert_eq!(outcome.bodies_analyzed, 1);
}

#[test]
fn explicit_this_assignment_is_definite() {
    let unit = person_setter(|b, name| vec![b.assign_self(name)]);

    let outcome = run(&[unit]);
    assert_eq!(messages(&outcome), [definite("Name")]);
    let diagnostic = &outcome.diagnostics[0];
    assert_eq!(diagnostic.code, "CA2011");
    assert_eq!(diagnostic.severity, Severity::Warning);
    assert_eq!(diagnostic.file, "Person.cs");
}

#[test]
fn implicit_this_assignment_is_definite() {
    let unit = person_setter(|b, name| vec![b.assign_self_implicit(name)]);
    assert_eq!(messages(&run(&[unit])), [definite("Name")]);
}

#[test]
fn assignment_under_if_is_possible() {
    let unit = person_setter(|b, name| {
        let statement = b.assign_self(name);
        vec![b.if_then(vec![statement])]
    });
    assert_eq!(messages(&run(&[unit])), [possible("Name")]);
}

#[test]
fn nested_ifs_report_once() {
    let unit = person_setter(|b, name| {
        let statement = b.assign_self(name);
        let inner = b.if_then(vec![statement]);
        vec![b.if_then(vec![inner])]
    });
    assert_eq!(messages(&run(&[unit])), [possible("Name")]);
}

#[test]
fn assignment_inside_lambda_is_possible() {
    let unit = person_setter(|b, name| {
        let statement = b.assign_self_implicit(name);
        b.lambda_invoked(vec![statement])
    });
    assert_eq!(messages(&run(&[unit])), [possible("Name")]);
}

#[test]
fn assignment_inside_local_function_is_possible() {
    let unit = person_setter(|b, name| {
        let statement = b.assign_self(name);
        b.local_function_invoked(vec![statement])
    });
    assert_eq!(messages(&run(&[unit])), [possible("Name")]);
}

#[test]
fn assigning_through_another_instance_is_fine() {
    let unit = person_setter(|b, name| {
        let span = b.span(5);
        let other = b.unit.operations.add_parameter_reference(span, "other");
        vec![b.assign_property(name, other)]
    });
    assert!(run(&[unit]).diagnostics.is_empty());
}

#[test]
fn non_containing_instance_kinds_are_fine() {
    let unit = person_setter(|b, name| {
        let span = b.span(0);
        let receiver = b.unit.operations.add_instance_reference(
            span,
            InstanceReferenceKind::PatternInput,
            true,
        );
        vec![b.assign_property(name, receiver)]
    });
    assert!(run(&[unit]).diagnostics.is_empty());
}

#[test]
fn same_name_on_another_type_is_fine() {
    let unit = person_setter(|b, _| {
        let shadow = b.property("Name", "Employee");
        vec![b.assign_self(shadow)]
    });
    assert!(run(&[unit]).diagnostics.is_empty());
}

#[test]
fn static_self_assignment_is_not_reported() {
    let mut b = UnitBuilder::new("Counter.cs");
    let total = b.unit.symbols.add_static_property("Total", "Counter");
    let setter = b.setter(total);
    let statement = b.assign_property(total, OperationIndex::NONE);
    b.body(setter, vec![statement]);

    assert!(run(&[b.finish()]).diagnostics.is_empty());
}

#[test]
fn only_setters_are_inspected() {
    let mut b = UnitBuilder::new("Person.cs");
    let name = b.property("Name", "Person");
    let getter = b.unit.symbols.add_getter(name).unwrap();
    let method = b.unit.symbols.add_method(MethodSymbol {
        name: "Reset".to_string(),
        containing_type: "Person".to_string(),
        kind: MethodKind::Ordinary,
        associated_property: None,
    });
    let in_getter = b.assign_self(name);
    b.body(getter, vec![in_getter]);
    let in_method = b.assign_self(name);
    b.body(method, vec![in_method]);

    let outcome = run(&[b.finish()]);
    assert!(outcome.diagnostics.is_empty());
    assert_eq!(outcome.bodies_analyzed, 2);
}

#[test]
fn every_self_assignment_is_reported() {
    let unit = person_setter(|b, name| {
        let first = b.assign_self(name);
        let guarded = b.assign_self_implicit(name);
        let branch = b.if_then(vec![guarded]);
        vec![first, branch]
    });

    let outcome = run(&[unit]);
    assert_eq!(messages(&outcome), [definite("Name"), possible("Name")]);
    assert!(outcome.diagnostics[0].start < outcome.diagnostics[1].start);
}

#[test]
fn each_setter_is_checked_against_its_own_property() {
    let mut b = UnitBuilder::new("Person.cs");
    let name = b.property("Name", "Person");
    let age = b.property("Age", "Person");
    let name_setter = b.setter(name);
    let age_setter = b.setter(age);
    let assigns_age = b.assign_self(age);
    b.body(name_setter, vec![assigns_age]);
    let assigns_age_again = b.assign_self(age);
    b.body(age_setter, vec![assigns_age_again]);

    assert_eq!(messages(&run(&[b.finish()])), [definite("Age")]);
}

#[test]
fn a_statement_listed_twice_is_reported_once() {
    let mut b = UnitBuilder::new("Person.cs");
    let name = b.property("Name", "Person");
    let setter = b.setter(name);
    let statement = b.assign_self(name);
    let inner = b.block(vec![statement]);
    b.body(setter, vec![statement, inner]);

    assert!(b.unit.validate().is_err());
    assert_eq!(messages(&run(&[b.unit])), [definite("Name")]);
}

#[test]
fn a_body_listing_itself_terminates() {
    let mut b = UnitBuilder::new("Person.cs");
    let name = b.property("Name", "Person");
    let setter = b.setter(name);
    let own_index = OperationIndex(b.unit.operations.len() as u32);
    let span = b.span(2);
    let root = b.unit.operations.add_block(span, vec![own_index]);
    b.unit.add_body(setter, root);

    assert!(b.unit.validate().is_err());
    let outcome = run(&[b.unit]);
    assert!(outcome.diagnostics.is_empty());
    assert_eq!(outcome.bodies_analyzed, 1);
}

#[test]
fn repeated_runs_are_identical() {
    let units = vec![
        person_setter(|b, name| vec![b.assign_self(name)]),
        person_setter(|b, name| {
            let statement = b.assign_self(name);
            vec![b.if_then(vec![statement])]
        }),
    ];

    let first = run(&units);
    let second = run(&units);
    assert_eq!(first, second);
    assert_eq!(first.diagnostics.len(), 2);
}

#[test]
fn concurrent_and_sequential_runs_agree() {
    let units: Vec<_> = (0..32)
        .map(|i| {
            person_setter(|b, name| {
                let statement = b.assign_self(name);
                if i % 3 == 0 {
                    vec![b.if_then(vec![statement])]
                } else {
                    vec![statement]
                }
            })
        })
        .collect();

    let sequential = run_with(&units, Default::default(), ExecutionMode::Sequential);
    let concurrent = run_with(&units, Default::default(), ExecutionMode::Concurrent);
    assert_eq!(sequential, concurrent);
    assert_eq!(concurrent.diagnostics.len(), 32);
    assert_eq!(concurrent.bodies_analyzed, 32);
}
