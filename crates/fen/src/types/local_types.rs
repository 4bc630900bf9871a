use std::fmt;
use std::sync::Arc;

use crate::source::Range;

use super::{LocalType, LocalTypeDefinition, Ty, Type, TypeError};

/// Identifies one generic-parameter binding site: a custom type, an alias or
/// an annotation. Ids are allocated per module in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LocalContextId {
    pub module: Arc<str>,
    pub index: usize,
}

impl LocalContextId {
    pub fn new(module: &str, index: usize) -> Self {
        Self {
            module: Arc::from(module),
            index,
        }
    }
}

impl fmt::Display for LocalContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.module, self.index)
    }
}

/// Names visible while building one type expression.
///
/// A static scope has its names fixed by a declaration (`type Maybe a`); a
/// dynamic scope adds unseen names on first use, which is how annotations
/// introduce generics without a parameter list.
#[derive(Debug, Clone)]
pub struct LocalTypeScope {
    id: LocalContextId,
    definitions: Vec<LocalTypeDefinition>,
    dynamic: bool,
}

impl LocalTypeScope {
    pub fn new_static(id: LocalContextId, definitions: Vec<LocalTypeDefinition>) -> Self {
        Self {
            id,
            definitions,
            dynamic: false,
        }
    }

    pub fn new_dynamic(id: LocalContextId) -> Self {
        Self {
            id,
            definitions: Vec::new(),
            dynamic: true,
        }
    }

    pub fn id(&self) -> &LocalContextId {
        &self.id
    }

    pub fn is_dynamic(&self) -> bool {
        self.dynamic
    }

    pub fn all_names(&self) -> Vec<String> {
        self.definitions
            .iter()
            .map(|definition| definition.name.clone())
            .collect()
    }

    pub fn definitions(&self) -> &[LocalTypeDefinition] {
        &self.definitions
    }

    pub fn into_definitions(self) -> Vec<LocalTypeDefinition> {
        self.definitions
    }

    pub fn contains(&self, name: &str) -> bool {
        self.definitions.iter().any(|definition| definition.name == name)
    }

    /// Reference to a declared name; a dynamic scope declares it on the spot.
    pub fn lookup(&mut self, name: &str, range: Option<Range>) -> Result<Ty, TypeError> {
        if !self.contains(name) {
            if !self.dynamic {
                return Err(TypeError::UnknownTypeParameter(name.to_string()));
            }
            self.definitions.push(LocalTypeDefinition {
                name: name.to_string(),
                range,
            });
        }
        Ok(self.make_reference(name, range))
    }

    /// Like [`lookup`](Self::lookup) but never fails.
    pub fn fetch_or_create_reference(&mut self, name: &str, range: Option<Range>) -> Ty {
        if !self.contains(name) {
            self.definitions.push(LocalTypeDefinition {
                name: name.to_string(),
                range,
            });
        }
        self.make_reference(name, range)
    }

    fn make_reference(&self, name: &str, range: Option<Range>) -> Ty {
        Arc::new(Type::LocalType(LocalType {
            name: name.to_string(),
            range,
            context: self.id.clone(),
        }))
    }
}
