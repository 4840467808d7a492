//! `OperationArena` access methods and tree iterators.

use opcheck_common::Span;
use opcheck_common::limits::TRAVERSAL_STACK_CAPACITY;

use crate::arena::OperationArena;
use crate::base::OperationIndex;
use crate::operation::*;

impl OperationArena {
    /// Get a node by index
    #[inline]
    pub fn get(&self, index: OperationIndex) -> Option<&OperationNode> {
        if index.is_none() {
            None
        } else {
            self.nodes.get(index.0 as usize)
        }
    }

    #[inline]
    pub fn kind(&self, index: OperationIndex) -> Option<OperationKind> {
        self.get(index).map(OperationNode::kind)
    }

    #[inline]
    pub fn span(&self, index: OperationIndex) -> Option<Span> {
        self.get(index).map(|node| node.span)
    }

    /// Parent of `index`, or `NONE` for roots and invalid indices.
    #[inline]
    pub fn parent(&self, index: OperationIndex) -> OperationIndex {
        self.get(index).map_or(OperationIndex::NONE, |node| node.parent)
    }

    /// Iterate over all nodes with their indices, in creation order.
    pub fn iter(&self) -> impl Iterator<Item = (OperationIndex, &OperationNode)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (OperationIndex(i as u32), node))
    }

    /// Walk parent links upward from `index`, excluding `index` itself.
    pub fn ancestors(&self, index: OperationIndex) -> Ancestors<'_> {
        Ancestors {
            arena: self,
            current: index,
        }
    }

    /// Pre-order traversal of the subtree rooted at `root`, including `root`.
    pub fn descendants(&self, root: OperationIndex) -> Descendants<'_> {
        let mut stack = Vec::with_capacity(TRAVERSAL_STACK_CAPACITY);
        if self.get(root).is_some() {
            stack.push(root);
        }
        Descendants { arena: self, stack }
    }

    // ============================================================================
    // Typed payload accessors
    // ============================================================================

    /// Get simple assignment data.
    /// Returns None if node is not a simple assignment.
    #[inline]
    pub fn get_simple_assignment(&self, index: OperationIndex) -> Option<&AssignmentData> {
        match &self.get(index)?.data {
            OperationData::SimpleAssignment(data) => Some(data),
            _ => None,
        }
    }

    /// Get property reference data for the node at `index`.
    #[inline]
    pub fn get_property_reference(&self, index: OperationIndex) -> Option<&PropertyReferenceData> {
        match &self.get(index)?.data {
            OperationData::PropertyReference(data) => Some(data),
            _ => None,
        }
    }

    /// Get instance reference data for the node at `index`.
    #[inline]
    pub fn get_instance_reference(&self, index: OperationIndex) -> Option<&InstanceReferenceData> {
        match &self.get(index)?.data {
            OperationData::InstanceReference(data) => Some(data),
            _ => None,
        }
    }

    #[inline]
    pub fn get_conditional(&self, index: OperationIndex) -> Option<&ConditionalData> {
        match &self.get(index)?.data {
            OperationData::Conditional(data) => Some(data),
            _ => None,
        }
    }

    #[inline]
    pub fn get_block(&self, index: OperationIndex) -> Option<&BlockData> {
        match &self.get(index)?.data {
            OperationData::Block(data) => Some(data),
            _ => None,
        }
    }
}

/// Iterator over the parent chain of an operation.
pub struct Ancestors<'a> {
    arena: &'a OperationArena,
    current: OperationIndex,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = (OperationIndex, &'a OperationNode);

    fn next(&mut self) -> Option<Self::Item> {
        let parent = self.arena.parent(self.current);
        let node = self.arena.get(parent)?;
        self.current = parent;
        Some((parent, node))
    }
}

/// Pre-order iterator over a subtree.
pub struct Descendants<'a> {
    arena: &'a OperationArena,
    stack: Vec<OperationIndex>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = (OperationIndex, &'a OperationNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(index) = self.stack.pop() {
            let Some(node) = self.arena.get(index) else {
                continue;
            };
            // Reverse so the first child is visited next. Only children that
            // precede `index` and link back to it are followed, so every node
            // is visited once even in an arena that skipped validation.
            let arena = self.arena;
            self.stack.extend(
                node.data
                    .children()
                    .into_iter()
                    .rev()
                    .filter(|&child| child.0 < index.0 && arena.parent(child) == index),
            );
            return Some((index, node));
        }
        None
    }
}
