//! Adapters (Hexagonal Architecture)
//!
//! Concrete implementations of the domain ports plus the inbound surfaces
//! (keep-alive HTTP server, Telegram poller).

pub mod clock;
pub mod console;
pub mod file;
pub mod http;
pub mod memory;
pub mod sqlite;
pub mod telegram;
