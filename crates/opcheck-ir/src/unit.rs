//! Compilation units: one source file's symbols, operations and method bodies.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::arena::OperationArena;
use crate::base::OperationIndex;
use crate::error::IrError;
use crate::operation::OperationData;
use crate::symbols::{MethodId, MethodKind, MethodSymbol, SymbolTable};

/// Index of a body within its unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BodyId(pub u32);

/// The operation tree of one method's body.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodBody {
    pub method: MethodId,
    pub root: OperationIndex,
}

/// One analyzed source file.
///
/// Deserializing a unit validates it: see [`CompilationUnit::validate`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "UnitRepr")]
pub struct CompilationUnit {
    pub file: String,
    /// Whether the file was produced by a code generator.
    #[serde(default)]
    pub generated: bool,
    /// Source text, used only to render line/column positions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(flatten)]
    pub symbols: SymbolTable,
    pub bodies: Vec<MethodBody>,
    pub operations: OperationArena,
}

/// Unvalidated wire form of [`CompilationUnit`].
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UnitRepr {
    file: String,
    #[serde(default)]
    generated: bool,
    #[serde(default)]
    source: Option<String>,
    #[serde(default)]
    properties: Vec<crate::symbols::PropertySymbol>,
    #[serde(default)]
    methods: Vec<MethodSymbol>,
    #[serde(default)]
    bodies: Vec<MethodBody>,
    #[serde(default)]
    operations: OperationArena,
}

impl TryFrom<UnitRepr> for CompilationUnit {
    type Error = IrError;

    fn try_from(repr: UnitRepr) -> Result<Self, Self::Error> {
        let unit = CompilationUnit {
            file: repr.file,
            generated: repr.generated,
            source: repr.source,
            symbols: SymbolTable {
                properties: repr.properties,
                methods: repr.methods,
            },
            bodies: repr.bodies,
            operations: repr.operations,
        };
        unit.validate()?;
        Ok(unit)
    }
}

impl CompilationUnit {
    pub fn new(file: impl Into<String>) -> Self {
        CompilationUnit {
            file: file.into(),
            ..CompilationUnit::default()
        }
    }

    /// Parse and validate a unit from its JSON form.
    pub fn from_json(text: &str) -> Result<Self, IrError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json(&self) -> Result<String, IrError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Register `root` as the body of `method`.
    pub fn add_body(&mut self, method: MethodId, root: OperationIndex) -> BodyId {
        let id = BodyId(self.bodies.len() as u32);
        self.bodies.push(MethodBody { method, root });
        id
    }

    #[inline]
    pub fn body(&self, id: BodyId) -> Option<&MethodBody> {
        self.bodies.get(id.0 as usize)
    }

    pub fn iter_bodies(&self) -> impl Iterator<Item = (BodyId, &MethodBody)> {
        self.bodies
            .iter()
            .enumerate()
            .map(|(i, body)| (BodyId(i as u32), body))
    }

    /// Check arena structure, symbol references and body roots.
    pub fn validate(&self) -> Result<(), IrError> {
        self.operations.validate()?;

        let property_count = self.symbols.properties.len();

        for method in &self.symbols.methods {
            match method.associated_property {
                Some(property) if property.0 as usize >= property_count => {
                    return Err(IrError::UnknownProperty(property.0));
                }
                None if method.kind == MethodKind::PropertySet => {
                    return Err(IrError::SetterWithoutProperty(method.name.clone()));
                }
                _ => {}
            }
        }

        for (_, node) in self.operations.iter() {
            if let OperationData::PropertyReference(data) = &node.data {
                if data.property.0 as usize >= property_count {
                    return Err(IrError::UnknownProperty(data.property.0));
                }
            }
        }

        let mut roots = FxHashSet::default();
        for body in &self.bodies {
            let method = self
                .symbols
                .method(body.method)
                .ok_or(IrError::UnknownMethod(body.method.0))?;
            let root = self
                .operations
                .get(body.root)
                .ok_or(IrError::IndexOutOfRange {
                    index: body.root.0,
                    len: self.operations.len(),
                })?;
            if root.parent.is_some() {
                return Err(IrError::BodyRootHasParent {
                    method: method.name.clone(),
                    root: body.root.0,
                });
            }
            if !roots.insert(body.root) {
                return Err(IrError::DuplicateBodyRoot { root: body.root.0 });
            }
        }

        Ok(())
    }
}
