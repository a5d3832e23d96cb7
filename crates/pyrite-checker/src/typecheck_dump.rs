//! Stable JSON representation of a type map
//!
//! Lets tooling inspect what the checker inferred without linking against
//! the type algebra.

use crate::type_map::TypeMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Type map dump schema version
pub const TYPEMAP_VERSION: u32 = 1;

/// Inferred type of one expression node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeEntry {
    pub node: u32,
    #[serde(rename = "type")]
    pub ty: String,
    /// Variant tag of the type (instance, callable, tuple, ...)
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeMapDump {
    pub typemap_version: u32,
    pub module: String,
    /// One entry per visited node, in node-id order
    pub entries: Vec<TypeEntry>,
    /// Distinct rendered types, sorted
    pub types: Vec<String>,
}

impl TypeMapDump {
    pub fn from_type_map(module: impl Into<String>, type_map: &TypeMap) -> Self {
        let entries: Vec<TypeEntry> = type_map
            .iter()
            .map(|(node, ty)| TypeEntry {
                node: node.0,
                ty: ty.to_string(),
                kind: ty.kind_name().to_string(),
            })
            .collect();

        let types: BTreeSet<String> = entries.iter().map(|e| e.ty.clone()).collect();

        Self {
            typemap_version: TYPEMAP_VERSION,
            module: module.into(),
            entries,
            types: types.into_iter().collect(),
        }
    }

    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn to_json_compact(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::NodeId;
    use crate::types::{CallableType, Type};

    #[test]
    fn test_dump_is_sorted_and_deduplicated() {
        let mut map = TypeMap::new();
        map.insert(NodeId(3), Type::Any);
        map.insert(NodeId(1), Type::NoneTyp);
        map.insert(NodeId(2), Type::Any);

        let dump = TypeMapDump::from_type_map("m", &map);
        let nodes: Vec<u32> = dump.entries.iter().map(|e| e.node).collect();
        assert_eq!(nodes, vec![1, 2, 3]);
        assert_eq!(dump.types, vec!["Any".to_string(), "None".to_string()]);
        assert_eq!(dump.entries[0].kind, "none");
    }

    #[test]
    fn test_dump_json_shape() {
        let mut map = TypeMap::new();
        map.insert(NodeId(0), Type::Callable(CallableType::simple(vec![], Type::Any)));
        let json = TypeMapDump::from_type_map("m", &map).to_json_compact().unwrap();
        assert!(json.starts_with("{\"typemap_version\":1,\"module\":\"m\""));
        assert!(json.contains("\"type\":\"def () -> Any\""));
        assert!(json.contains("\"kind\":\"callable\""));
    }
}
