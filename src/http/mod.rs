//! HTTP protocol layer module
//!
//! Response construction, kept apart from the relay logic.

pub mod response;

pub use response::build_text_response;
