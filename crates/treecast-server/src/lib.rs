//! Axum-based WebSocket server for Treecast.
//!
//! Each accepted connection gets its own session and a strictly sequential
//! control loop: render and send the full tree, wait for a client event,
//! dispatch it, render and send again, until the transport closes.

pub mod connection;
pub mod server;
pub mod state;

pub use server::start_server;
pub use state::ServerState;
