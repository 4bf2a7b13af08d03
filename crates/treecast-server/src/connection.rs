//! WebSocket connection lifecycle — the render/dispatch loop.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use tracing::{debug, info, warn};

use treecast_core::kv::KvStore;
use treecast_core::protocol::parse_client_event;
use treecast_core::secrets;
use treecast_core::session::Session;

use crate::state::ServerState;

/// Handle one WebSocket connection end to end.
///
/// The loop is strictly sequential: within a session, render and dispatch
/// never overlap. A full tree is sent immediately on connect and again after
/// every well-formed event — even when the dispatch was a no-op — so the
/// client's view converges on server state under races. Malformed frames are
/// dropped without reply; only transport faults end the loop.
pub async fn handle_connection(state: Arc<ServerState>, ws: WebSocket) {
    state.open_connections.fetch_add(1, Ordering::SeqCst);

    let env_file = state.config.env_file();
    let mut session = Session::new(
        Arc::clone(&state.builder),
        secrets::load(Some(&env_file)),
        KvStore::new(state.config.store_path()),
    );
    info!(session = %session.id, "New UI session");

    let (mut ws_tx, mut ws_rx) = ws.split();

    if send_tree(&mut ws_tx, &mut session).await.is_ok() {
        while let Some(msg_result) = ws_rx.next().await {
            match msg_result {
                Ok(Message::Text(text)) => {
                    let Some(event) = parse_client_event(text.as_str()) else {
                        debug!(session = %session.id, "Dropping malformed client frame");
                        continue;
                    };
                    session.dispatch(&event.node_id, &event.event, event.value);
                    // Re-render unconditionally, no-op dispatch included.
                    if send_tree(&mut ws_tx, &mut session).await.is_err() {
                        break;
                    }
                }
                Ok(Message::Close(_)) => {
                    debug!(session = %session.id, "Client requested close");
                    break;
                }
                Ok(Message::Ping(_) | Message::Pong(_)) => {
                    // Axum answers pings automatically.
                }
                Ok(Message::Binary(_)) => {
                    debug!(session = %session.id, "Dropping binary frame");
                }
                Err(e) => {
                    warn!(session = %session.id, %e, "WebSocket error");
                    break;
                }
            }
        }
    }

    state.open_connections.fetch_sub(1, Ordering::SeqCst);
    info!(session = %session.id, "UI session closed");
}

/// Render the session and push the serialized tree as one text frame.
async fn send_tree(
    ws_tx: &mut SplitSink<WebSocket, Message>,
    session: &mut Session,
) -> Result<(), axum::Error> {
    let tree = session.render();
    let msg = serde_json::to_string(&tree).map_err(axum::Error::new)?;
    ws_tx.send(Message::Text(msg.into())).await
}
