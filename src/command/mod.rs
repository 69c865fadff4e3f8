//! External command module
//!
//! Launches the configured executable and collects what it wrote.

mod error;
mod runner;

pub use error::ExecError;
pub use runner::{CommandOutput, CommandSpec};
