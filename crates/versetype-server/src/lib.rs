//! Versetype server library - WebSocket server for typing practice.
//!
//! Separated from main.rs to enable integration testing.

pub mod config;
pub mod logging;
pub mod routes;
pub mod state;
pub mod websocket;
