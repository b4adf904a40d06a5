//! Error handling
//!
//! Defines error types and handling for the chat server.

pub mod types;

pub use types::*;
