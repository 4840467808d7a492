//! Semantic operation trees for the opcheck analyzer.
//!
//! A [`CompilationUnit`] owns an [`OperationArena`] holding the resolved
//! operations of every method body in one source file, plus the
//! [`SymbolTable`] those operations refer to. Nodes are addressed by
//! [`OperationIndex`]; each node stores its parent as an index, so parent
//! links never own anything and cycles are impossible once a unit has been
//! validated.
//!
//! Trees are built bottom-up with the `add_*` methods on [`OperationArena`],
//! or loaded from JSON via [`CompilationUnit::from_json`].

pub mod base;
pub use base::OperationIndex;

pub mod operation;
pub use operation::{
    AnonymousFunctionData, AssignmentData, BinaryData, BinaryOperator, BlockData,
    CompoundAssignmentData, ConditionalData, DelegateCreationData, ExpressionStatementData,
    FieldReferenceData, InstanceReferenceData, InstanceReferenceKind, InvalidData,
    InvocationData, LiteralData, LocalFunctionData, LoopData, OperationData, OperationKind,
    OperationNode, PropertyReferenceData, ReferenceData, ReturnData, VariableDeclarationData,
};

pub mod arena;
pub use arena::OperationArena;

mod access;
pub use access::{Ancestors, Descendants};

pub mod symbols;
pub use symbols::{MethodId, MethodKind, MethodSymbol, PropertyId, PropertySymbol, SymbolTable};

pub mod unit;
pub use unit::{BodyId, CompilationUnit, MethodBody};

pub mod error;
pub use error::IrError;
