//! Widget-construction helpers.
//!
//! Each helper is a pure producer of [`Node`] values. Interactive widgets
//! take the session as an explicit parameter and register their handler
//! against the freshly generated node identity, so registration is always a
//! side effect of building the node that owns the event.

use serde_json::{json, Map, Value};

use treecast_core::node::Node;
use treecast_core::session::Session;

fn obj(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

/// A plain text node.
pub fn text(content: impl Into<String>) -> Node {
    Node::new("Text", obj(json!({ "text": content.into() })), vec![])
}

/// Vertical stack container.
pub fn vstack(gap: i64, children: Vec<Node>) -> Node {
    Node::new(
        "VStack",
        obj(json!({ "gap": gap, "align": "start", "justify": "start" })),
        children,
    )
}

/// Horizontal stack container.
pub fn hstack(gap: i64, children: Vec<Node>) -> Node {
    Node::new(
        "HStack",
        obj(json!({ "gap": gap, "align": "center", "justify": "start" })),
        children,
    )
}

/// A clickable button. `on_click` runs when the client reports a `click`
/// event against this node's identity.
pub fn button(
    session: &mut Session,
    label: impl Into<String>,
    mut on_click: impl FnMut(&mut Session) + Send + 'static,
) -> Node {
    let node = Node::new(
        "Button",
        obj(json!({ "label": label.into(), "events": { "click": true } })),
        vec![],
    );
    session.register_handler(node.id.clone(), "click", move |s, _value| on_click(s));
    node
}

/// A single-line text input. `on_change` receives the new value as a string.
pub fn input_text(
    session: &mut Session,
    value: impl Into<String>,
    placeholder: impl Into<String>,
    mut on_change: impl FnMut(&mut Session, String) + Send + 'static,
) -> Node {
    let node = Node::new(
        "InputText",
        obj(json!({
            "value": value.into(),
            "placeholder": placeholder.into(),
            "events": { "change": true },
        })),
        vec![],
    );
    session.register_handler(node.id.clone(), "change", move |s, value| {
        let text = match value {
            Value::String(s) => s,
            other => other.to_string(),
        };
        on_change(s, text);
    });
    node
}

/// A numeric stepper input. `on_change` receives the new value; events whose
/// payload is not numeric are ignored.
pub fn number_input(
    session: &mut Session,
    value: f64,
    step: f64,
    mut on_change: impl FnMut(&mut Session, f64) + Send + 'static,
) -> Node {
    let node = Node::new(
        "NumberInput",
        obj(json!({ "value": value, "step": step, "events": { "change": true } })),
        vec![],
    );
    session.register_handler(node.id.clone(), "change", move |s, value| {
        let parsed = value
            .as_f64()
            .or_else(|| value.as_str().and_then(|raw| raw.parse().ok()));
        if let Some(n) = parsed {
            on_change(s, n);
        }
    });
    node
}

/// A chat panel rendering `messages` (arbitrary JSON message objects).
/// `on_send` receives the text the user submitted.
pub fn chat(
    session: &mut Session,
    messages: Vec<Value>,
    mut on_send: impl FnMut(&mut Session, String) + Send + 'static,
) -> Node {
    let node = Node::new(
        "Chat",
        obj(json!({ "messages": messages, "events": { "send": true } })),
        vec![],
    );
    session.register_handler(node.id.clone(), "send", move |s, value| {
        let text = match value {
            Value::String(s) => s,
            other => other.to_string(),
        };
        on_send(s, text);
    });
    node
}
