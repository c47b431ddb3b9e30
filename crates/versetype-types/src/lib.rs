//! Shared types for the Versetype typing-practice server.

mod passage;
mod progress;
mod ws;

pub use passage::*;
pub use progress::*;
pub use ws::*;
