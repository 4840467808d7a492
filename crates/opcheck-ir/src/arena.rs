//! `OperationArena` storage and node creation (`add_*` methods).
//!
//! Nodes are created bottom-up: children first, then the parent that lists
//! them. Creating the parent sets each child's parent link, so every child
//! index is strictly smaller than its parent's. Arenas loaded from JSON are
//! checked for the same property in [`OperationArena::from_operations`];
//! builder-made arenas are checked by [`OperationArena::validate`].

use opcheck_common::Span;
use opcheck_common::limits::MAX_OPERATION_PREALLOC;
use serde::{Deserialize, Serialize};

use crate::base::OperationIndex;
use crate::error::IrError;
use crate::operation::*;
use crate::symbols::PropertyId;

/// Flat storage for the operations of one compilation unit.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<RawOperation>", into = "Vec<RawOperation>")]
pub struct OperationArena {
    pub(crate) nodes: Vec<OperationNode>,
}

/// Serialized form of a node; parents are derived on load.
#[doc(hidden)]
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RawOperation {
    #[serde(default)]
    span: Span,
    operation: OperationData,
}

impl TryFrom<Vec<RawOperation>> for OperationArena {
    type Error = IrError;

    fn try_from(raw: Vec<RawOperation>) -> Result<Self, Self::Error> {
        OperationArena::from_operations(raw.into_iter().map(|op| (op.operation, op.span)))
    }
}

impl From<OperationArena> for Vec<RawOperation> {
    fn from(arena: OperationArena) -> Self {
        arena
            .nodes
            .into_iter()
            .map(|node| RawOperation {
                span: node.span,
                operation: node.data,
            })
            .collect()
    }
}

impl OperationArena {
    pub fn new() -> OperationArena {
        OperationArena::default()
    }

    pub fn with_capacity(capacity: usize) -> OperationArena {
        OperationArena {
            nodes: Vec::with_capacity(capacity.min(MAX_OPERATION_PREALLOC)),
        }
    }

    /// Build an arena from nodes in creation order, deriving parent links.
    ///
    /// Every child index must be in range, must be smaller than its parent's
    /// index, and must be claimed by exactly one parent.
    pub fn from_operations(
        operations: impl IntoIterator<Item = (OperationData, Span)>,
    ) -> Result<OperationArena, IrError> {
        let operations = operations.into_iter();
        let mut arena = OperationArena::with_capacity(operations.size_hint().0);

        for (data, span) in operations {
            arena.nodes.push(OperationNode {
                data,
                span,
                parent: OperationIndex::NONE,
            });
        }

        let len = arena.nodes.len();
        for parent in 0..len {
            for child in arena.nodes[parent].data.children() {
                arena.check_child(OperationIndex(parent as u32), child)?;
                let child_slot = child.0 as usize;
                let existing = arena.nodes[child_slot].parent;
                if existing.is_some() {
                    return Err(IrError::MultipleParents {
                        child: child.0,
                        first: existing.0,
                        second: parent as u32,
                    });
                }
                arena.nodes[child_slot].parent = OperationIndex(parent as u32);
            }
        }

        tracing::trace!(operations = len, "operation arena validated");
        Ok(arena)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    // ============================================================================
    // Parent Mapping Helpers
    // ============================================================================

    /// Set the parent for a single child node.
    ///
    /// The first parent to claim a child keeps it; [`OperationArena::validate`]
    /// reports later claims.
    #[inline]
    fn set_parent(&mut self, child: OperationIndex, parent: OperationIndex) {
        if let Some(node) = self.nodes.get_mut(child.0 as usize) {
            if node.parent.is_none() {
                node.parent = parent;
            }
        }
    }

    /// Check that `child` exists and was created before `parent`.
    fn check_child(&self, parent: OperationIndex, child: OperationIndex) -> Result<(), IrError> {
        let len = self.nodes.len();
        if child.0 as usize >= len {
            return Err(IrError::IndexOutOfRange {
                index: child.0,
                len,
            });
        }
        if child.0 >= parent.0 {
            return Err(IrError::ChildNotBeforeParent {
                parent: parent.0,
                child: child.0,
            });
        }
        Ok(())
    }

    /// Re-check the tree structure of an arena assembled with the `add_*`
    /// builders.
    ///
    /// The builders accept any child index, including ones that do not exist
    /// yet or that another parent already claimed. Such arenas are rejected
    /// here with the same errors [`OperationArena::from_operations`] raises.
    pub fn validate(&self) -> Result<(), IrError> {
        for (parent, node) in self.iter() {
            for child in node.data.children() {
                self.check_child(parent, child)?;
                let claimed_by = self.nodes[child.0 as usize].parent;
                if claimed_by != parent {
                    return Err(IrError::MultipleParents {
                        child: child.0,
                        first: claimed_by.0,
                        second: parent.0,
                    });
                }
            }
        }
        Ok(())
    }

    // ============================================================================
    // Node Creation Methods
    // ============================================================================

    /// Add an operation, linking its existing children to it.
    pub fn add(&mut self, data: OperationData, span: Span) -> OperationIndex {
        let index = OperationIndex(self.nodes.len() as u32);
        for child in data.children() {
            self.set_parent(child, index);
        }
        self.nodes.push(OperationNode {
            data,
            span,
            parent: OperationIndex::NONE,
        });
        index
    }

    pub fn add_block(&mut self, span: Span, operations: Vec<OperationIndex>) -> OperationIndex {
        self.add(OperationData::Block(BlockData { operations }), span)
    }

    pub fn add_expression_statement(
        &mut self,
        span: Span,
        operation: OperationIndex,
    ) -> OperationIndex {
        self.add(
            OperationData::ExpressionStatement(ExpressionStatementData { operation }),
            span,
        )
    }

    pub fn add_variable_declaration(
        &mut self,
        span: Span,
        name: impl Into<String>,
        initializer: OperationIndex,
    ) -> OperationIndex {
        self.add(
            OperationData::VariableDeclaration(VariableDeclarationData {
                name: name.into(),
                initializer,
            }),
            span,
        )
    }

    pub fn add_simple_assignment(
        &mut self,
        span: Span,
        target: OperationIndex,
        value: OperationIndex,
    ) -> OperationIndex {
        self.add(
            OperationData::SimpleAssignment(AssignmentData { target, value }),
            span,
        )
    }

    pub fn add_compound_assignment(
        &mut self,
        span: Span,
        operator: BinaryOperator,
        target: OperationIndex,
        value: OperationIndex,
    ) -> OperationIndex {
        self.add(
            OperationData::CompoundAssignment(CompoundAssignmentData {
                operator,
                target,
                value,
            }),
            span,
        )
    }

    pub fn add_binary(
        &mut self,
        span: Span,
        operator: BinaryOperator,
        left: OperationIndex,
        right: OperationIndex,
    ) -> OperationIndex {
        self.add(
            OperationData::Binary(BinaryData {
                operator,
                left,
                right,
            }),
            span,
        )
    }

    /// Add an `if`/`else` or `?:`; pass `OperationIndex::NONE` for no else branch.
    pub fn add_conditional(
        &mut self,
        span: Span,
        condition: OperationIndex,
        when_true: OperationIndex,
        when_false: OperationIndex,
    ) -> OperationIndex {
        self.add(
            OperationData::Conditional(ConditionalData {
                condition,
                when_true,
                when_false,
            }),
            span,
        )
    }

    pub fn add_loop(
        &mut self,
        span: Span,
        condition: OperationIndex,
        body: OperationIndex,
    ) -> OperationIndex {
        self.add(OperationData::Loop(LoopData { condition, body }), span)
    }

    pub fn add_return(&mut self, span: Span, value: OperationIndex) -> OperationIndex {
        self.add(OperationData::Return(ReturnData { value }), span)
    }

    pub fn add_throw(&mut self, span: Span, value: OperationIndex) -> OperationIndex {
        self.add(OperationData::Throw(ReturnData { value }), span)
    }

    pub fn add_invocation(
        &mut self,
        span: Span,
        target_method: impl Into<String>,
        instance: OperationIndex,
        arguments: Vec<OperationIndex>,
    ) -> OperationIndex {
        self.add(
            OperationData::Invocation(InvocationData {
                target_method: target_method.into(),
                instance,
                arguments,
            }),
            span,
        )
    }

    pub fn add_delegate_creation(
        &mut self,
        span: Span,
        target: OperationIndex,
    ) -> OperationIndex {
        self.add(
            OperationData::DelegateCreation(DelegateCreationData { target }),
            span,
        )
    }

    pub fn add_anonymous_function(&mut self, span: Span, body: OperationIndex) -> OperationIndex {
        self.add(
            OperationData::AnonymousFunction(AnonymousFunctionData { body }),
            span,
        )
    }

    pub fn add_local_function(
        &mut self,
        span: Span,
        name: impl Into<String>,
        body: OperationIndex,
    ) -> OperationIndex {
        self.add(
            OperationData::LocalFunction(LocalFunctionData {
                name: name.into(),
                body,
            }),
            span,
        )
    }

    /// Add a property access; pass `OperationIndex::NONE` as `instance` for a static property.
    pub fn add_property_reference(
        &mut self,
        span: Span,
        property: PropertyId,
        instance: OperationIndex,
    ) -> OperationIndex {
        self.add(
            OperationData::PropertyReference(PropertyReferenceData {
                property,
                instance,
                arguments: Vec::new(),
            }),
            span,
        )
    }

    pub fn add_field_reference(
        &mut self,
        span: Span,
        field: impl Into<String>,
        instance: OperationIndex,
    ) -> OperationIndex {
        self.add(
            OperationData::FieldReference(FieldReferenceData {
                field: field.into(),
                instance,
            }),
            span,
        )
    }

    pub fn add_local_reference(&mut self, span: Span, name: impl Into<String>) -> OperationIndex {
        self.add(
            OperationData::LocalReference(ReferenceData { name: name.into() }),
            span,
        )
    }

    pub fn add_parameter_reference(
        &mut self,
        span: Span,
        name: impl Into<String>,
    ) -> OperationIndex {
        self.add(
            OperationData::ParameterReference(ReferenceData { name: name.into() }),
            span,
        )
    }

    pub fn add_instance_reference(
        &mut self,
        span: Span,
        reference_kind: InstanceReferenceKind,
        implicit: bool,
    ) -> OperationIndex {
        self.add(
            OperationData::InstanceReference(InstanceReferenceData {
                reference_kind,
                implicit,
            }),
            span,
        )
    }

    /// Shorthand for a `this` reference inside the containing type.
    pub fn add_this(&mut self, span: Span, implicit: bool) -> OperationIndex {
        self.add_instance_reference(span, InstanceReferenceKind::ContainingTypeInstance, implicit)
    }

    pub fn add_literal(&mut self, span: Span, value: impl Into<String>) -> OperationIndex {
        self.add(
            OperationData::Literal(LiteralData {
                value: value.into(),
            }),
            span,
        )
    }

    pub fn add_invalid(&mut self, span: Span, children: Vec<OperationIndex>) -> OperationIndex {
        self.add(OperationData::Invalid(InvalidData { children }), span)
    }
}

#[cfg(test)]
#[path = "../tests/arena_tests.rs"]
mod tests;
