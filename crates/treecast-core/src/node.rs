//! UI tree node — the unit the server renders and ships to the client.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// One node in a rendered UI tree.
///
/// Nodes are immutable once constructed: a re-render builds fresh `Node`
/// values rather than mutating an earlier tree. Identities are unique within
/// a single tree and carry no meaning across renders.
///
/// `props` is deliberately a weakly-typed JSON map: the widget builders are
/// the only producers and the serde boundary is the schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub props: Map<String, Value>,
    #[serde(default)]
    pub children: Vec<Node>,
}

impl Node {
    /// Construct a node with a freshly generated identity.
    pub fn new(kind: impl Into<String>, props: Map<String, Value>, children: Vec<Node>) -> Self {
        Self {
            id: Uuid::new_v4().simple().to_string(),
            kind: kind.into(),
            props,
            children,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_fresh_identity_per_node() {
        let a = Node::new("Text", Map::new(), vec![]);
        let b = Node::new("Text", Map::new(), vec![]);
        assert_ne!(a.id, b.id);
        assert_eq!(a.id.len(), 32); // simple uuid, no hyphens
    }

    #[test]
    fn test_wire_shape() {
        let mut props = Map::new();
        props.insert("text".into(), json!("hello"));
        let node = Node::new("Text", props, vec![]);

        let wire: serde_json::Value = serde_json::to_value(&node).unwrap();
        assert_eq!(wire["type"], "Text");
        assert_eq!(wire["props"]["text"], "hello");
        assert!(wire["children"].as_array().unwrap().is_empty());
        assert_eq!(wire["id"], node.id);
    }

    #[test]
    fn test_roundtrip_with_children() {
        let child = Node::new("Text", Map::new(), vec![]);
        let parent = Node::new("VStack", Map::new(), vec![child]);

        let raw = serde_json::to_string(&parent).unwrap();
        let back: Node = serde_json::from_str(&raw).unwrap();
        assert_eq!(back, parent);
        assert_eq!(back.children.len(), 1);
    }
}
