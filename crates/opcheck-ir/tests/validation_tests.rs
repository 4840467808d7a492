//! Rejection of malformed compilation units.

use opcheck_ir::{CompilationUnit, IrError};

fn load(operations: &str, bodies: &str) -> Result<CompilationUnit, IrError> {
    let text = format!(
        r#"{{
          "file": "Bad.cs",
          "properties": [ {{ "name": "P", "containingType": "C" }} ],
          "methods": [
            {{ "name": "set_P", "containingType": "C", "kind": "propertySet", "associatedProperty": 0 }}
          ],
          "bodies": {bodies},
          "operations": {operations}
        }}"#
    );
    CompilationUnit::from_json(&text)
}

fn message(result: Result<CompilationUnit, IrError>) -> String {
    match result {
        Ok(_) => panic!("expected the unit to be rejected"),
        Err(err) => err.to_string(),
    }
}

#[test]
fn accepts_a_well_formed_unit() {
    let unit = load(
        r#"[ { "operation": { "kind": "Block" } } ]"#,
        r#"[ { "method": 0, "root": 0 } ]"#,
    );
    assert!(unit.is_ok());
}

#[test]
fn rejects_out_of_range_children() {
    let err = message(load(
        r#"[ { "operation": { "kind": "Block", "operations": [7] } } ]"#,
        "[]",
    ));
    assert!(err.contains("operation index 7 is out of range"), "{err}");
}

#[test]
fn rejects_children_created_after_their_parent() {
    let err = message(load(
        r#"[
          { "operation": { "kind": "Block", "operations": [1] } },
          { "operation": { "kind": "Return" } }
        ]"#,
        "[]",
    ));
    assert!(err.contains("must be created before its parent"), "{err}");
}

#[test]
fn rejects_self_referencing_operations() {
    let err = message(load(
        r#"[ { "operation": { "kind": "Block", "operations": [0] } } ]"#,
        "[]",
    ));
    assert!(err.contains("must be created before its parent"), "{err}");
}

#[test]
fn rejects_shared_children() {
    let err = message(load(
        r#"[
          { "operation": { "kind": "Return" } },
          { "operation": { "kind": "Block", "operations": [0] } },
          { "operation": { "kind": "Block", "operations": [0] } }
        ]"#,
        "[]",
    ));
    assert!(err.contains("claimed by both 1 and 2"), "{err}");
}

#[test]
fn rejects_unknown_property_references() {
    let err = message(load(
        r#"[ { "operation": { "kind": "PropertyReference", "property": 4 } } ]"#,
        "[]",
    ));
    assert!(err.contains("unknown property id 4"), "{err}");
}

#[test]
fn rejects_bodies_of_unknown_methods() {
    let err = message(load(
        r#"[ { "operation": { "kind": "Block" } } ]"#,
        r#"[ { "method": 9, "root": 0 } ]"#,
    ));
    assert!(err.contains("unknown method id 9"), "{err}");
}

#[test]
fn rejects_nested_body_roots() {
    let err = message(load(
        r#"[
          { "operation": { "kind": "Return" } },
          { "operation": { "kind": "Block", "operations": [0] } }
        ]"#,
        r#"[ { "method": 0, "root": 0 } ]"#,
    ));
    assert!(err.contains("is nested inside another operation"), "{err}");
}

#[test]
fn rejects_bodies_sharing_a_root() {
    let err = message(load(
        r#"[ { "operation": { "kind": "Block" } } ]"#,
        r#"[ { "method": 0, "root": 0 }, { "method": 0, "root": 0 } ]"#,
    ));
    assert!(err.contains("root of more than one body"), "{err}");
}

#[test]
fn rejects_setters_without_a_property() {
    let text = r#"{
      "file": "Bad.cs",
      "methods": [ { "name": "set_P", "containingType": "C", "kind": "propertySet" } ],
      "bodies": [],
      "operations": []
    }"#;
    let err = message(CompilationUnit::from_json(text));
    assert!(err.contains("property setter 'set_P' has no associated property"), "{err}");
}

#[test]
fn rejects_unknown_operation_kinds() {
    let result = load(r#"[ { "operation": { "kind": "Goto" } } ]"#, "[]");
    assert!(matches!(result, Err(IrError::Json(_))));
}
