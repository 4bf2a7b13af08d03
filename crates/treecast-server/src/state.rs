//! Server shared state.

use std::sync::atomic::AtomicUsize;
use std::sync::Arc;

use treecast_core::config::Config;
use treecast_core::session::Builder;

/// State shared by all connections: the immutable config, the application's
/// UI builder, and a live-connection counter for `/health`.
///
/// Per-session state never lives here — every connection constructs its own
/// [`Session`](treecast_core::session::Session).
pub struct ServerState {
    pub config: Arc<Config>,
    pub builder: Builder,
    pub open_connections: AtomicUsize,
}

impl ServerState {
    pub fn new(config: Arc<Config>, builder: Builder) -> Self {
        Self {
            config,
            builder,
            open_connections: AtomicUsize::new(0),
        }
    }
}
