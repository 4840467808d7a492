use super::*;
use opcheck_ir::{BinaryOperator, MethodId, MethodKind, PropertyId};

fn sp(start: u32, len: u32) -> Span {
    Span::at(start, len)
}

/// Unit with a `Name` property on `Person` and its setter.
fn person() -> (CompilationUnit, PropertyId, MethodId) {
    let mut unit = CompilationUnit::new("Person.cs");
    let name = unit.symbols.add_property("Name", "Person");
    let setter = unit.symbols.add_setter(name).unwrap();
    (unit, name, setter)
}

/// `<instance>.property = value`, returning the assignment index.
fn assign(unit: &mut CompilationUnit, property: PropertyId, instance: OperationIndex) -> OperationIndex {
    let arena = &mut unit.operations;
    let target = arena.add_property_reference(sp(10, 4), property, instance);
    let value = arena.add_parameter_reference(sp(17, 5), "value");
    arena.add_simple_assignment(sp(10, 12), target, value)
}

fn setter_symbol(unit: &CompilationUnit, id: MethodId) -> MethodSymbol {
    unit.symbols.method(id).unwrap().clone()
}

#[test]
fn descriptors_share_the_rule_id() {
    let descriptors = AvoidInfiniteRecursion.descriptors();
    assert_eq!(descriptors.len(), 2);
    assert!(descriptors.iter().all(|d| d.id == "CA2011"));
    assert_ne!(descriptors[0].message_format, descriptors[1].message_format);
    assert_eq!(RULE.category, RuleCategory::Reliability);
    assert_eq!(RULE.default_severity, Severity::Warning);
    assert!(RULE.is_enabled_by_default && MAYBE_RULE.is_enabled_by_default);
    assert_eq!(RULE.custom_tags, &["Telemetry"]);
}

#[test]
fn matches_explicit_this() {
    let (mut unit, name, setter) = person();
    let this = unit.operations.add_this(sp(10, 4), false);
    let assignment = assign(&mut unit, name, this);
    let method = setter_symbol(&unit, setter);

    let found = match_self_assignment(&unit, &method, assignment).unwrap();
    assert_eq!(found.property_name, "Name");
    assert_eq!(found.assignment, assignment);
    assert_eq!(found.span, sp(10, 12));
}

#[test]
fn matches_implicit_this() {
    let (mut unit, name, setter) = person();
    let this = unit.operations.add_this(sp(10, 0), true);
    let assignment = assign(&mut unit, name, this);
    let method = setter_symbol(&unit, setter);

    assert!(match_self_assignment(&unit, &method, assignment).is_some());
}

#[test]
fn ignores_other_properties_and_receivers() {
    let (mut unit, name, setter) = person();
    let age = unit.symbols.add_property("Age", "Person");
    let method = setter_symbol(&unit, setter);

    let this = unit.operations.add_this(sp(0, 0), true);
    let other_property = assign(&mut unit, age, this);
    assert_eq!(match_self_assignment(&unit, &method, other_property), None);

    let other = unit.operations.add_parameter_reference(sp(0, 5), "other");
    let other_instance = assign(&mut unit, name, other);
    assert_eq!(match_self_assignment(&unit, &method, other_instance), None);

    let receiver = unit
        .operations
        .add_instance_reference(sp(0, 0), InstanceReferenceKind::ImplicitReceiver, true);
    let object_initializer = assign(&mut unit, name, receiver);
    assert_eq!(match_self_assignment(&unit, &method, object_initializer), None);
}

#[test]
fn ignores_static_properties() {
    let mut unit = CompilationUnit::new("Counter.cs");
    let total = unit.symbols.add_static_property("Total", "Counter");
    let setter = unit.symbols.add_setter(total).unwrap();
    let assignment = assign(&mut unit, total, OperationIndex::NONE);
    let method = setter_symbol(&unit, setter);

    assert_eq!(match_self_assignment(&unit, &method, assignment), None);
}

#[test]
fn ignores_same_name_on_another_type() {
    let (mut unit, _, setter) = person();
    let shadow = unit.symbols.add_property("Name", "Employee");
    let this = unit.operations.add_this(sp(0, 0), true);
    let assignment = assign(&mut unit, shadow, this);
    let method = setter_symbol(&unit, setter);

    assert_eq!(match_self_assignment(&unit, &method, assignment), None);
}

#[test]
fn requires_a_setter_and_an_assignment() {
    let (mut unit, name, _) = person();
    let getter = unit.symbols.add_getter(name).unwrap();
    let this = unit.operations.add_this(sp(0, 0), true);
    let assignment = assign(&mut unit, name, this);

    let get = setter_symbol(&unit, getter);
    assert_eq!(get.kind, MethodKind::PropertyGet);
    assert_eq!(match_self_assignment(&unit, &get, assignment), None);

    let set = setter_symbol(&unit, MethodId(0));
    let target = unit.operations.get_simple_assignment(assignment).unwrap().target;
    assert_eq!(match_self_assignment(&unit, &set, target), None);
    assert_eq!(match_self_assignment(&unit, &set, OperationIndex::NONE), None);
}

#[test]
fn malformed_assignment_is_not_a_match() {
    let (mut unit, _, setter) = person();
    let value = unit.operations.add_parameter_reference(sp(0, 5), "value");
    let assignment = unit
        .operations
        .add_simple_assignment(sp(0, 9), OperationIndex::NONE, value);
    let method = setter_symbol(&unit, setter);

    assert_eq!(match_self_assignment(&unit, &method, assignment), None);
}

#[test]
fn unguarded_assignment_is_definite() {
    let (mut unit, name, _) = person();
    let this = unit.operations.add_this(sp(0, 0), true);
    let assignment = assign(&mut unit, name, this);
    let statement = unit.operations.add_expression_statement(sp(10, 13), assignment);
    unit.operations.add_block(sp(0, 30), vec![statement]);

    assert_eq!(classify(&unit.operations, assignment), Confidence::Definite);
}

#[test]
fn assignment_under_if_is_possible() {
    let (mut unit, name, _) = person();
    let condition = unit.operations.add_field_reference(sp(4, 5), "dirty", OperationIndex::NONE);
    let this = unit.operations.add_this(sp(0, 0), true);
    let assignment = assign(&mut unit, name, this);
    let statement = unit.operations.add_expression_statement(sp(10, 13), assignment);
    let then_block = unit.operations.add_block(sp(9, 16), vec![statement]);
    let branch = unit
        .operations
        .add_conditional(sp(0, 25), condition, then_block, OperationIndex::NONE);
    unit.operations.add_block(sp(0, 30), vec![branch]);

    assert_eq!(classify(&unit.operations, assignment), Confidence::Possible);
}

#[test]
fn assignment_in_an_if_condition_is_possible() {
    // `if ((Name = value) != null) { }`
    let (mut unit, name, setter) = person();
    let this = unit.operations.add_this(sp(4, 0), true);
    let assignment = assign(&mut unit, name, this);
    let null = unit.operations.add_literal(sp(26, 4), "null");
    let condition = unit
        .operations
        .add_binary(sp(4, 26), BinaryOperator::NotEquals, assignment, null);
    let then_block = unit.operations.add_block(sp(32, 3), vec![]);
    let branch = unit
        .operations
        .add_conditional(sp(0, 35), condition, then_block, OperationIndex::NONE);
    unit.operations.add_block(sp(0, 40), vec![branch]);

    let setter = setter_symbol(&unit, setter);
    assert!(match_self_assignment(&unit, &setter, assignment).is_some());
    assert_eq!(classify(&unit.operations, assignment), Confidence::Possible);
}

#[test]
fn nested_guards_are_still_possible() {
    let (mut unit, name, _) = person();
    let this = unit.operations.add_this(sp(0, 0), true);
    let assignment = assign(&mut unit, name, this);
    let statement = unit.operations.add_expression_statement(sp(10, 13), assignment);
    let lambda_body = unit.operations.add_block(sp(9, 16), vec![statement]);
    let lambda = unit.operations.add_anonymous_function(sp(5, 22), lambda_body);
    let a = unit.operations.add_literal(sp(0, 1), "true");
    let b = unit.operations.add_literal(sp(0, 1), "false");
    let inner = unit.operations.add_conditional(sp(0, 30), a, lambda, OperationIndex::NONE);
    let outer = unit.operations.add_conditional(sp(0, 40), b, inner, OperationIndex::NONE);
    unit.operations.add_block(sp(0, 50), vec![outer]);

    assert_eq!(classify(&unit.operations, assignment), Confidence::Possible);
}

#[test]
fn local_function_is_possible() {
    let (mut unit, name, _) = person();
    let this = unit.operations.add_this(sp(0, 0), true);
    let assignment = assign(&mut unit, name, this);
    let statement = unit.operations.add_expression_statement(sp(10, 13), assignment);
    let body = unit.operations.add_block(sp(9, 16), vec![statement]);
    let local = unit.operations.add_local_function(sp(0, 30), "Apply", body);
    let call = unit
        .operations
        .add_invocation(sp(31, 7), "Apply", OperationIndex::NONE, vec![]);
    let call_statement = unit.operations.add_expression_statement(sp(31, 8), call);
    unit.operations.add_block(sp(0, 50), vec![local, call_statement]);

    assert_eq!(classify(&unit.operations, assignment), Confidence::Possible);
}

#[test]
fn loops_do_not_make_an_assignment_uncertain() {
    let (mut unit, name, _) = person();
    let i = unit.operations.add_local_reference(sp(0, 1), "i");
    let limit = unit.operations.add_literal(sp(4, 2), "10");
    let condition = unit.operations.add_binary(sp(0, 6), BinaryOperator::LessThan, i, limit);
    let this = unit.operations.add_this(sp(0, 0), true);
    let assignment = assign(&mut unit, name, this);
    let statement = unit.operations.add_expression_statement(sp(10, 13), assignment);
    let looped = unit.operations.add_loop(sp(0, 30), condition, statement);
    unit.operations.add_block(sp(0, 40), vec![looped]);

    assert_eq!(classify(&unit.operations, assignment), Confidence::Definite);
}

#[test]
fn finding_selects_message_by_confidence() {
    let found = AssignmentMatch {
        assignment: OperationIndex(3),
        property_name: "Name",
        declaration: Span::EMPTY,
        span: sp(10, 12),
    };

    let definite = Finding::new(&found, Confidence::Definite).into_diagnostic("Person.cs");
    assert_eq!(
        definite.message_text,
        "Do not assign the property 'Name' within its setter. This call will result in an infinite recursion."
    );
    assert_eq!(definite.code, "CA2011");
    assert_eq!((definite.start, definite.length), (10, 12));
    assert!(definite.related_information.is_empty());

    let possible = Finding::new(&found, Confidence::Possible).into_diagnostic("Person.cs");
    assert!(possible.message_text.contains("might result in an infinite recursion"));
    assert_eq!(possible.code, definite.code);
}

#[test]
fn finding_points_at_the_property_declaration() {
    let found = AssignmentMatch {
        assignment: OperationIndex(3),
        property_name: "Name",
        declaration: sp(40, 4),
        span: sp(10, 12),
    };

    let diagnostic = Finding::new(&found, Confidence::Definite).into_diagnostic("Person.cs");
    assert_eq!(diagnostic.related_information.len(), 1);
    let related = &diagnostic.related_information[0];
    assert_eq!((related.start, related.length), (40, 4));
    assert_eq!(related.message_text, "Property 'Name' is declared here.");
}
