//! Server core functionality
//!
//! This module contains the main server implementation, configuration,
//! and accept-loop infrastructure for the chat server.

pub mod config;
pub mod core;

pub use config::ServerConfig;
pub use core::Server;
