//! FinSense client library.
//!
//! Everything the `finsense` binary needs to talk to the FinSense backend:
//! the endpoint registry, the HTTP client, the durable session store, the
//! session manager, the chat transcript, and configuration loading.

pub mod api;
pub mod chat;
pub mod config;
pub mod logging;
pub mod session;
