//! Per-run mapping from expression node to inferred type

use crate::ast::NodeId;
use crate::types::Type;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeMap {
    types: BTreeMap<NodeId, Type>,
}

impl TypeMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the type of a node. A node visited again (for example once per
    /// value of a restricted type variable) keeps its latest type.
    pub fn insert(&mut self, node: NodeId, ty: Type) {
        self.types.insert(node, ty);
    }

    pub fn get(&self, node: NodeId) -> Option<&Type> {
        self.types.get(&node)
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.types.contains_key(&node)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Entries in node-id order
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Type)> {
        self.types.iter().map(|(id, ty)| (*id, ty))
    }
}
