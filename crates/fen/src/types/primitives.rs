use std::sync::Arc;

use super::{PrimitiveType, Ty, Type};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PrimitiveKind {
    Int,
    Fixed,
    Bool,
    String,
    Char,
    ResourceName,
    TypeId,
    Blob,
    List,
    Array,
}

impl PrimitiveKind {
    pub const ALL: [PrimitiveKind; 10] = [
        PrimitiveKind::Int,
        PrimitiveKind::Fixed,
        PrimitiveKind::Bool,
        PrimitiveKind::String,
        PrimitiveKind::Char,
        PrimitiveKind::ResourceName,
        PrimitiveKind::TypeId,
        PrimitiveKind::Blob,
        PrimitiveKind::List,
        PrimitiveKind::Array,
    ];

    pub fn name(self) -> &'static str {
        match self {
            PrimitiveKind::Int => "Int",
            PrimitiveKind::Fixed => "Fixed",
            PrimitiveKind::Bool => "Bool",
            PrimitiveKind::String => "String",
            PrimitiveKind::Char => "Char",
            PrimitiveKind::ResourceName => "ResourceName",
            PrimitiveKind::TypeId => "TypeId",
            PrimitiveKind::Blob => "Blob",
            PrimitiveKind::List => "List",
            PrimitiveKind::Array => "Array",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    /// Number of type arguments the primitive expects.
    pub fn arity(self) -> usize {
        match self {
            PrimitiveKind::List | PrimitiveKind::Array | PrimitiveKind::TypeId => 1,
            _ => 0,
        }
    }

    /// `List` and `Array` are the built-in containers.
    pub fn is_container(self) -> bool {
        matches!(self, PrimitiveKind::List | PrimitiveKind::Array)
    }
}

/// One shared instance per primitive so literals do not allocate.
#[derive(Debug, Clone)]
pub struct PrimitiveTable {
    types: Vec<Ty>,
}

impl PrimitiveTable {
    pub fn new() -> Self {
        let types = PrimitiveKind::ALL
            .into_iter()
            .map(|kind| Arc::new(Type::Primitive(PrimitiveType { kind })))
            .collect();
        Self { types }
    }

    pub fn get(&self, kind: PrimitiveKind) -> Ty {
        let index = PrimitiveKind::ALL
            .iter()
            .position(|candidate| *candidate == kind)
            .unwrap_or(0);
        self.types[index].clone()
    }

    pub fn find(&self, name: &str) -> Option<Ty> {
        PrimitiveKind::from_name(name).map(|kind| self.get(kind))
    }

    pub fn int(&self) -> Ty {
        self.get(PrimitiveKind::Int)
    }

    pub fn bool(&self) -> Ty {
        self.get(PrimitiveKind::Bool)
    }

    pub fn list_of(&self, element: Ty) -> Ty {
        Type::invoker(self.get(PrimitiveKind::List), vec![element])
    }

    pub fn array_of(&self, element: Ty) -> Ty {
        Type::invoker(self.get(PrimitiveKind::Array), vec![element])
    }
}

impl Default for PrimitiveTable {
    fn default() -> Self {
        Self::new()
    }
}
