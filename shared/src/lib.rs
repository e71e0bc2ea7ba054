//! Types shared between the asteroids server and its clients.
//!
//! The protocol and config types export TypeScript definitions via ts-rs so
//! the browser client stays in sync with the server.

pub mod config;
pub mod protocol;
pub mod vec2;
