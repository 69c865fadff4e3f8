//! Request handler module
//!
//! A single catch-all handler: no routing, every request is relayed.

pub mod relay;

// Re-export main entry point
pub use relay::handle_request;
