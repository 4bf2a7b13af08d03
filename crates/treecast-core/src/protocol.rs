//! Treecast wire protocol.
//!
//! JSON-over-WebSocket with exactly two message shapes: server -> client is
//! the serialized [`Node`](crate::node::Node) tree, client -> server is a
//! [`ClientEvent`]. Anything else inbound is dropped by the connection loop.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A user interaction reported by the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientEvent {
    pub event: String,
    #[serde(rename = "nodeId")]
    pub node_id: String,
    #[serde(default)]
    pub value: Value,
}

/// Parse an inbound text frame into a [`ClientEvent`].
///
/// Returns `None` for anything that is not a JSON object with string `event`
/// and `nodeId` fields. Malformed input never terminates a connection, so
/// callers drop `None` and keep reading.
pub fn parse_client_event(text: &str) -> Option<ClientEvent> {
    serde_json::from_str(text).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_well_formed() {
        let ev = parse_client_event(r#"{"event":"click","nodeId":"n1","value":null}"#).unwrap();
        assert_eq!(ev.event, "click");
        assert_eq!(ev.node_id, "n1");
        assert!(ev.value.is_null());
    }

    #[test]
    fn test_value_defaults_to_null() {
        let ev = parse_client_event(r#"{"event":"click","nodeId":"n1"}"#).unwrap();
        assert!(ev.value.is_null());
    }

    #[test]
    fn test_extra_fields_tolerated() {
        let ev =
            parse_client_event(r#"{"event":"change","nodeId":"n2","value":"hi","seq":7}"#).unwrap();
        assert_eq!(ev.value, json!("hi"));
    }

    #[test]
    fn test_malformed_dropped() {
        assert!(parse_client_event("not-json").is_none());
        assert!(parse_client_event("[1,2,3]").is_none());
        assert!(parse_client_event(r#""just a string""#).is_none());
        // event must be a string
        assert!(parse_client_event(r#"{"event":1,"nodeId":"n1"}"#).is_none());
        // nodeId is required
        assert!(parse_client_event(r#"{"event":"click"}"#).is_none());
    }
}
