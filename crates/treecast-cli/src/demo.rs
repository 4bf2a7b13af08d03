//! Bundled demo applications: a greeter with a counter, and an echo chat.
//!
//! They show the full builder contract — reading `session.vars`, registering
//! handlers through the widget helpers, and memoizing derived values through
//! an injected cache.

use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};

use treecast_core::cache::{MemoCache, Scope};
use treecast_core::node::Node;
use treecast_core::session::{Builder, Session};
use treecast_ui::{button, chat, hstack, input_text, number_input, text, vstack};

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum DemoApp {
    Counter,
    Chat,
}

/// Construct the chosen demo builder. The counter gets its own process-wide
/// memo cache, injected into the builder closure.
pub fn builder(app: DemoApp) -> Builder {
    match app {
        DemoApp::Counter => {
            let cache = Arc::new(MemoCache::new());
            Arc::new(move |session: &mut Session| build_ui(session, &cache))
        }
        DemoApp::Chat => Arc::new(build_chat),
    }
}

fn build_ui(session: &mut Session, cache: &MemoCache) -> Node {
    let name = session
        .var("name")
        .and_then(Value::as_str)
        .unwrap_or("World")
        .to_string();
    let count = session.var("count").and_then(Value::as_f64).unwrap_or(0.0);

    let greeting = {
        let key = cache.key("demo::greeting", &name);
        cache.get_or_compute(Scope::Data, &key, Some(Duration::from_secs(60)), || {
            format!("Hello, {name}!")
        })
    };

    vstack(
        12,
        vec![
            text(greeting),
            input_text(session, &name, "Enter your name", |s, value| {
                s.set_var("name", json!(value));
            }),
            hstack(
                12,
                vec![
                    button(session, "-", |s| step_count(s, -1.0)),
                    text(format!("Count: {}", count as i64)),
                    button(session, "+", |s| step_count(s, 1.0)),
                ],
            ),
            number_input(session, count, 1.0, |s, value| {
                s.set_var("count", json!(value));
            }),
        ],
    )
}

fn step_count(session: &mut Session, delta: f64) {
    let count = session.var("count").and_then(Value::as_f64).unwrap_or(0.0);
    session.set_var("count", json!(count + delta));
}

fn build_chat(session: &mut Session) -> Node {
    let messages = session
        .var("messages")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_else(|| {
            vec![json!({"role": "assistant", "content": "Hi! I'm Echo. Type something."})]
        });

    let history = messages.clone();
    vstack(
        12,
        vec![chat(session, messages, move |s, text| {
            let mut next = history.clone();
            next.push(json!({"role": "user", "content": text}));
            next.push(json!({"role": "assistant", "content": text}));
            s.set_var("messages", Value::Array(next));
        })],
    )
}
