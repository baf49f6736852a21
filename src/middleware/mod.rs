//! Middleware layer.
//!
//! Cross-cutting concerns that wrap every dispatched request. The server
//! applies them in order around [`Router::dispatch`](crate::Router::dispatch).
//!
//! - [`trace`]: per-request span with method, path, status and latency

pub mod trace;
