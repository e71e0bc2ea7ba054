//! Asteroids server library.
//!
//! This module exposes the server components for use in tests and binaries.

pub mod asteroid;
pub mod collision;
pub mod config;
pub mod game_loop;
pub mod physics;
pub mod protocol;
pub mod session;
pub mod ship;
pub mod state;
pub mod ws;
