//! Errors raised while loading or validating operation trees.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IrError {
    #[error("operation index {index} is out of range (arena has {len} operations)")]
    IndexOutOfRange { index: u32, len: usize },

    #[error("operation {child} must be created before its parent {parent}")]
    ChildNotBeforeParent { parent: u32, child: u32 },

    #[error("operation {child} is claimed by both {first} and {second}")]
    MultipleParents { child: u32, first: u32, second: u32 },

    #[error("unknown property id {0}")]
    UnknownProperty(u32),

    #[error("unknown method id {0}")]
    UnknownMethod(u32),

    #[error("body root {root} of method '{method}' is nested inside another operation")]
    BodyRootHasParent { method: String, root: u32 },

    #[error("operation {root} is the root of more than one body")]
    DuplicateBodyRoot { root: u32 },

    #[error("property setter '{0}' has no associated property")]
    SetterWithoutProperty(String),

    #[error("invalid compilation unit: {0}")]
    Json(#[from] serde_json::Error),
}
