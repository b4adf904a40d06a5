pub mod broadcast;
pub mod client;
pub mod error;
pub mod server;

pub use server::Server;
