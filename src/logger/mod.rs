//! Logger module
//!
//! Provides logging utilities for the relay server including:
//! - Server lifecycle logging
//! - Captured command output
//! - Access logging with multiple formats
//! - File-based logging support

mod format;
pub mod writer;

pub use format::AccessLogEntry;
pub use writer::{LogLevel, LogWriter};

use crate::command::{CommandOutput, ExecError};
use crate::config::Config;
use chrono::Local;
use std::net::SocketAddr;

/// Initialize the logger with configuration
///
/// Should be called once at application startup.
pub fn init(config: &Config) -> std::io::Result<()> {
    let level = config
        .logging
        .level
        .parse::<LogLevel>()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;
    writer::init(
        level,
        config.logging.access_log_file.as_deref(),
        config.logging.error_log_file.as_deref(),
    )
}

/// Write to info/access log
fn write_info(level: LogLevel, message: &str) {
    match writer::get() {
        Some(w) => w.write_info(level, message),
        None => println!("{message}"),
    }
}

/// Write to error log
fn write_error(level: LogLevel, message: &str) {
    match writer::get() {
        Some(w) => w.write_error(level, message),
        None => eprintln!("{message}"),
    }
}

/// Write to access log specifically
fn write_access(message: &str) {
    match writer::get() {
        Some(w) => w.write_access(message),
        None => println!("{message}"),
    }
}

fn timestamp() -> String {
    Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

pub fn log_server_start(addr: &SocketAddr, config: &Config) {
    write_info(LogLevel::Info, "Server has started.");
    write_info(LogLevel::Info, &format!("Listening on: http://{addr}"));
    if let Some(w) = writer::get() {
        write_info(LogLevel::Info, &format!("Log level: {}", w.level()));
    }
    write_info(
        LogLevel::Info,
        &format!(
            "Command: {} {}",
            config.command.program,
            config.command.args.join(" ")
        ),
    );
    if let Some(ref dir) = config.command.working_dir {
        write_info(LogLevel::Info, &format!("Working directory: {dir}"));
    }
    if let Some(workers) = config.server.workers {
        write_info(LogLevel::Info, &format!("Worker threads: {workers}"));
    }
    if let Some(ref path) = config.logging.access_log_file {
        write_info(LogLevel::Info, &format!("Access log: {path}"));
    }
    if let Some(ref path) = config.logging.error_log_file {
        write_info(LogLevel::Info, &format!("Error log: {path}"));
    }
}

pub fn log_request_received() {
    write_info(LogLevel::Info, "Request received.");
}

/// Echo whatever the command wrote, stdout to the info log and stderr to the error log
pub fn log_command_output(output: &CommandOutput) {
    match writer::get() {
        Some(w) => write_command_output(w, output),
        None => {
            if !output.stdout.is_empty() {
                println!("{}", String::from_utf8_lossy(&output.stdout));
            }
            if !output.stderr.is_empty() {
                eprintln!("{}", String::from_utf8_lossy(&output.stderr));
            }
        }
    }
}

/// Empty streams are skipped
pub fn write_command_output(w: &LogWriter, output: &CommandOutput) {
    if !output.stdout.is_empty() {
        w.write_info(LogLevel::Info, &String::from_utf8_lossy(&output.stdout));
    }
    if !output.stderr.is_empty() {
        w.write_error(LogLevel::Info, &String::from_utf8_lossy(&output.stderr));
    }
}

pub fn log_command_exit(output: &CommandOutput) {
    let reason = output.exit_code().map_or_else(
        || "terminated by signal".to_string(),
        |code| format!("exited with status {code}"),
    );
    log_warning(&format!("Command {reason}"));
}

pub fn log_command_failed(err: &ExecError) {
    log_error(&format!("[Command] {err}"));
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    write_info(
        LogLevel::Debug,
        &format!("[Connection] Accepted from: {peer_addr}"),
    );
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    log_error(&format!("Failed to serve connection: {err:?}"));
}

pub fn log_error(message: &str) {
    write_error(
        LogLevel::Error,
        &format!("{} [ERROR] {message}", timestamp()),
    );
}

pub fn log_warning(message: &str) {
    write_error(LogLevel::Warn, &format!("{} [WARN] {message}", timestamp()));
}

pub fn log_bind_failed(addr: &SocketAddr, err: &std::io::Error) {
    log_error(&format!("Failed to bind {addr}: {err}"));
}

pub fn log_shutdown(active_connections: usize) {
    write_info(LogLevel::Info, "Server shutting down");
    if active_connections > 0 {
        write_info(
            LogLevel::Info,
            &format!("{active_connections} connection(s) still in flight"),
        );
    }
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    write_access(&entry.format(format));
}
