// roundtable-api: Async Rust client for the GD assessment platform REST API

mod admin;
mod client;
pub mod envelope;
pub mod error;
mod student;
pub mod transport;
pub mod types;

pub use client::GdClient;
pub use error::Error;
pub use transport::Transport;
