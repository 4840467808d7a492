//! Property and method symbols referenced by operations.
//!
//! Symbols are identified by their index in the unit's [`SymbolTable`].
//! Two properties with the same name (on different types, or shadowing each
//! other) always have distinct ids, so comparing ids compares declarations,
//! not names.

use opcheck_common::Span;
use serde::{Deserialize, Serialize};

/// Identity of a property declaration within one compilation unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertyId(pub u32);

/// Identity of a method declaration within one compilation unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MethodId(pub u32);

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertySymbol {
    pub name: String,
    pub containing_type: String,
    #[serde(default)]
    pub is_static: bool,
    /// Location of the declaration.
    #[serde(default)]
    pub span: Span,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MethodKind {
    Ordinary,
    Constructor,
    StaticConstructor,
    Destructor,
    PropertyGet,
    PropertySet,
    EventAdd,
    EventRemove,
    UserDefinedOperator,
    Conversion,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodSymbol {
    pub name: String,
    pub containing_type: String,
    pub kind: MethodKind,
    /// The property an accessor belongs to. Set for `PropertyGet`/`PropertySet`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub associated_property: Option<PropertyId>,
}

impl MethodSymbol {
    #[inline]
    pub fn is_property_setter(&self) -> bool {
        self.kind == MethodKind::PropertySet
    }
}

/// Symbols declared or referenced in one compilation unit.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolTable {
    #[serde(default)]
    pub properties: Vec<PropertySymbol>,
    #[serde(default)]
    pub methods: Vec<MethodSymbol>,
}

impl SymbolTable {
    pub fn new() -> Self {
        SymbolTable::default()
    }

    pub fn add_property(
        &mut self,
        name: impl Into<String>,
        containing_type: impl Into<String>,
    ) -> PropertyId {
        self.push_property(PropertySymbol {
            name: name.into(),
            containing_type: containing_type.into(),
            is_static: false,
            span: Span::EMPTY,
        })
    }

    pub fn add_static_property(
        &mut self,
        name: impl Into<String>,
        containing_type: impl Into<String>,
    ) -> PropertyId {
        self.push_property(PropertySymbol {
            name: name.into(),
            containing_type: containing_type.into(),
            is_static: true,
            span: Span::EMPTY,
        })
    }

    pub fn push_property(&mut self, symbol: PropertySymbol) -> PropertyId {
        let id = PropertyId(self.properties.len() as u32);
        self.properties.push(symbol);
        id
    }

    pub fn add_method(&mut self, symbol: MethodSymbol) -> MethodId {
        let id = MethodId(self.methods.len() as u32);
        self.methods.push(symbol);
        id
    }

    /// Add the `set` accessor of `property`.
    pub fn add_setter(&mut self, property: PropertyId) -> Option<MethodId> {
        let prop = self.property(property)?;
        let symbol = MethodSymbol {
            name: format!("set_{}", prop.name),
            containing_type: prop.containing_type.clone(),
            kind: MethodKind::PropertySet,
            associated_property: Some(property),
        };
        Some(self.add_method(symbol))
    }

    /// Add the `get` accessor of `property`.
    pub fn add_getter(&mut self, property: PropertyId) -> Option<MethodId> {
        let prop = self.property(property)?;
        let symbol = MethodSymbol {
            name: format!("get_{}", prop.name),
            containing_type: prop.containing_type.clone(),
            kind: MethodKind::PropertyGet,
            associated_property: Some(property),
        };
        Some(self.add_method(symbol))
    }

    #[inline]
    pub fn property(&self, id: PropertyId) -> Option<&PropertySymbol> {
        self.properties.get(id.0 as usize)
    }

    #[inline]
    pub fn method(&self, id: MethodId) -> Option<&MethodSymbol> {
        self.methods.get(id.0 as usize)
    }
}
