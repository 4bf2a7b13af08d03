//! Core types, config, errors, and the session runtime for Treecast.

pub mod cache;
pub mod config;
pub mod error;
pub mod kv;
pub mod node;
pub mod protocol;
pub mod secrets;
pub mod session;
