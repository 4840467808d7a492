//! Operation kinds and their payloads.
//!
//! `OperationData` is a closed set of resolved operation shapes. Each variant
//! wraps a `*Data` payload struct that stores its children as
//! [`OperationIndex`] values into the owning arena. Optional children use
//! `OperationIndex::NONE`.

use opcheck_common::Span;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::base::OperationIndex;
use crate::symbols::PropertyId;

/// Fieldless discriminant of [`OperationData`], used for dispatch tables.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum OperationKind {
    Block,
    ExpressionStatement,
    VariableDeclaration,
    SimpleAssignment,
    CompoundAssignment,
    Binary,
    Conditional,
    Loop,
    Return,
    Throw,
    Invocation,
    DelegateCreation,
    AnonymousFunction,
    LocalFunction,
    PropertyReference,
    FieldReference,
    LocalReference,
    ParameterReference,
    InstanceReference,
    Literal,
    Invalid,
}

impl OperationKind {
    /// Kinds whose subtree may run zero times, or later than the enclosing
    /// operation: a branch, a lambda body, or a local function body.
    pub const fn is_deferred_or_conditional(self) -> bool {
        matches!(
            self,
            OperationKind::AnonymousFunction
                | OperationKind::LocalFunction
                | OperationKind::Conditional
        )
    }
}

/// How an `InstanceReference` refers to an object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InstanceReferenceKind {
    /// `this`, explicit or implied, inside the containing type.
    ContainingTypeInstance,
    /// The receiver of an object or collection initializer.
    ImplicitReceiver,
    /// The input of a pattern being matched.
    PatternInput,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BinaryOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Remainder,
    And,
    Or,
    ConditionalAnd,
    ConditionalOr,
    Equals,
    NotEquals,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
}

// =============================================================================
// Payloads
// =============================================================================

/// `skip_serializing_if` predicate for optional children.
#[inline]
fn is_none(index: &OperationIndex) -> bool {
    index.is_none()
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockData {
    #[serde(default)]
    pub operations: Vec<OperationIndex>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpressionStatementData {
    pub operation: OperationIndex,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableDeclarationData {
    pub name: String,
    #[serde(default, skip_serializing_if = "is_none")]
    pub initializer: OperationIndex,
}

/// Payload of a simple `target = value` assignment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentData {
    pub target: OperationIndex,
    pub value: OperationIndex,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompoundAssignmentData {
    pub operator: BinaryOperator,
    pub target: OperationIndex,
    pub value: OperationIndex,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BinaryData {
    pub operator: BinaryOperator,
    pub left: OperationIndex,
    pub right: OperationIndex,
}

/// `if`/`else` statements and `?:` expressions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionalData {
    pub condition: OperationIndex,
    pub when_true: OperationIndex,
    #[serde(default, skip_serializing_if = "is_none")]
    pub when_false: OperationIndex,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoopData {
    #[serde(default, skip_serializing_if = "is_none")]
    pub condition: OperationIndex,
    pub body: OperationIndex,
}

/// Shared by `Return` and `Throw`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturnData {
    #[serde(default, skip_serializing_if = "is_none")]
    pub value: OperationIndex,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvocationData {
    pub target_method: String,
    #[serde(default, skip_serializing_if = "is_none")]
    pub instance: OperationIndex,
    #[serde(default)]
    pub arguments: Vec<OperationIndex>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DelegateCreationData {
    pub target: OperationIndex,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnonymousFunctionData {
    pub body: OperationIndex,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalFunctionData {
    pub name: String,
    pub body: OperationIndex,
}

/// A resolved property access; `instance` is `NONE` for static properties.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyReferenceData {
    pub property: PropertyId,
    #[serde(default, skip_serializing_if = "is_none")]
    pub instance: OperationIndex,
    /// Indexer arguments.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub arguments: Vec<OperationIndex>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldReferenceData {
    pub field: String,
    #[serde(default, skip_serializing_if = "is_none")]
    pub instance: OperationIndex,
}

/// Shared by `LocalReference` and `ParameterReference`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceData {
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceReferenceData {
    pub reference_kind: InstanceReferenceKind,
    /// `true` when the receiver was not written in source (`P = v` vs `this.P = v`).
    #[serde(default)]
    pub implicit: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiteralData {
    pub value: String,
}

/// An operation the upstream model could not resolve.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvalidData {
    #[serde(default)]
    pub children: Vec<OperationIndex>,
}

// =============================================================================
// OperationData
// =============================================================================

/// A resolved operation together with its kind-specific payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum OperationData {
    Block(BlockData),
    ExpressionStatement(ExpressionStatementData),
    VariableDeclaration(VariableDeclarationData),
    SimpleAssignment(AssignmentData),
    CompoundAssignment(CompoundAssignmentData),
    Binary(BinaryData),
    Conditional(ConditionalData),
    Loop(LoopData),
    Return(ReturnData),
    Throw(ReturnData),
    Invocation(InvocationData),
    DelegateCreation(DelegateCreationData),
    AnonymousFunction(AnonymousFunctionData),
    LocalFunction(LocalFunctionData),
    PropertyReference(PropertyReferenceData),
    FieldReference(FieldReferenceData),
    LocalReference(ReferenceData),
    ParameterReference(ReferenceData),
    InstanceReference(InstanceReferenceData),
    Literal(LiteralData),
    Invalid(InvalidData),
}

impl OperationData {
    pub const fn kind(&self) -> OperationKind {
        match self {
            OperationData::Block(_) => OperationKind::Block,
            OperationData::ExpressionStatement(_) => OperationKind::ExpressionStatement,
            OperationData::VariableDeclaration(_) => OperationKind::VariableDeclaration,
            OperationData::SimpleAssignment(_) => OperationKind::SimpleAssignment,
            OperationData::CompoundAssignment(_) => OperationKind::CompoundAssignment,
            OperationData::Binary(_) => OperationKind::Binary,
            OperationData::Conditional(_) => OperationKind::Conditional,
            OperationData::Loop(_) => OperationKind::Loop,
            OperationData::Return(_) => OperationKind::Return,
            OperationData::Throw(_) => OperationKind::Throw,
            OperationData::Invocation(_) => OperationKind::Invocation,
            OperationData::DelegateCreation(_) => OperationKind::DelegateCreation,
            OperationData::AnonymousFunction(_) => OperationKind::AnonymousFunction,
            OperationData::LocalFunction(_) => OperationKind::LocalFunction,
            OperationData::PropertyReference(_) => OperationKind::PropertyReference,
            OperationData::FieldReference(_) => OperationKind::FieldReference,
            OperationData::LocalReference(_) => OperationKind::LocalReference,
            OperationData::ParameterReference(_) => OperationKind::ParameterReference,
            OperationData::InstanceReference(_) => OperationKind::InstanceReference,
            OperationData::Literal(_) => OperationKind::Literal,
            OperationData::Invalid(_) => OperationKind::Invalid,
        }
    }

    /// Child operations in evaluation order, skipping absent children.
    pub fn children(&self) -> SmallVec<[OperationIndex; 4]> {
        let mut out: SmallVec<[OperationIndex; 4]> = SmallVec::new();
        let mut push = |idx: OperationIndex| {
            if idx.is_some() {
                out.push(idx);
            }
        };

        match self {
            OperationData::Block(data) => data.operations.iter().copied().for_each(&mut push),
            OperationData::ExpressionStatement(data) => push(data.operation),
            OperationData::VariableDeclaration(data) => push(data.initializer),
            OperationData::SimpleAssignment(data) => {
                push(data.target);
                push(data.value);
            }
            OperationData::CompoundAssignment(data) => {
                push(data.target);
                push(data.value);
            }
            OperationData::Binary(data) => {
                push(data.left);
                push(data.right);
            }
            OperationData::Conditional(data) => {
                push(data.condition);
                push(data.when_true);
                push(data.when_false);
            }
            OperationData::Loop(data) => {
                push(data.condition);
                push(data.body);
            }
            OperationData::Return(data) | OperationData::Throw(data) => push(data.value),
            OperationData::Invocation(data) => {
                push(data.instance);
                data.arguments.iter().copied().for_each(&mut push);
            }
            OperationData::DelegateCreation(data) => push(data.target),
            OperationData::AnonymousFunction(data) => push(data.body),
            OperationData::LocalFunction(data) => push(data.body),
            OperationData::PropertyReference(data) => {
                push(data.instance);
                data.arguments.iter().copied().for_each(&mut push);
            }
            OperationData::FieldReference(data) => push(data.instance),
            OperationData::Invalid(data) => data.children.iter().copied().for_each(&mut push),
            OperationData::LocalReference(_)
            | OperationData::ParameterReference(_)
            | OperationData::InstanceReference(_)
            | OperationData::Literal(_) => {}
        }

        out
    }
}

/// One node of an operation arena.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OperationNode {
    pub data: OperationData,
    pub span: Span,
    /// Index of the enclosing operation, `NONE` for body roots.
    pub parent: OperationIndex,
}

impl OperationNode {
    #[inline]
    pub const fn kind(&self) -> OperationKind {
        self.data.kind()
    }
}
