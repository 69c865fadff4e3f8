//! Request relay module
//!
//! Every request, whatever its method, path or body, runs the configured
//! command once and answers with the command's stdout.

use crate::command::{CommandOutput, ExecError};
use crate::config::AppState;
use crate::http;
use crate::logger::{self, AccessLogEntry};
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::USER_AGENT;
use hyper::{Request, Response, Version};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Instant;

/// Main entry point for HTTP request handling
///
/// Always answers 200 `text/plain`. Command failures only show up in the
/// server log: a non-zero exit still relays what was written to stdout,
/// and a command that never started yields an empty body.
pub async fn handle_request<B>(
    req: Request<B>,
    peer_addr: SocketAddr,
    state: Arc<AppState>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let started = Instant::now();
    logger::log_request_received();

    let result = state.command.run().await;
    let body = relay_body(&result);
    let exit_code = result.as_ref().ok().and_then(CommandOutput::exit_code);

    if state.cached_access_log.load(Ordering::Relaxed) {
        let mut entry = AccessLogEntry::new(
            peer_addr.to_string(),
            req.method().to_string(),
            req.uri().path().to_string(),
        );
        entry.query = req.uri().query().map(ToString::to_string);
        entry.http_version = version_label(req.version()).to_string();
        entry.user_agent = req
            .headers()
            .get(USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string);
        entry.body_bytes = body.len();
        entry.exit_code = exit_code;
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(http::build_text_response(body))
}

/// Log the command result and pick the bytes to send back
fn relay_body(result: &Result<CommandOutput, ExecError>) -> Bytes {
    match result {
        Ok(output) => {
            logger::log_command_output(output);
            if !output.success() {
                logger::log_command_exit(output);
            }
            output.stdout.clone()
        }
        Err(err) => {
            logger::log_command_failed(err);
            Bytes::new()
        }
    }
}

const fn version_label(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "0.9",
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2",
        Version::HTTP_3 => "3",
        _ => "1.1",
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::command::CommandSpec;
    use crate::config::Config;
    use http_body_util::BodyExt;
    use hyper::header::CONTENT_TYPE;
    use hyper::{Method, StatusCode};

    fn state_running(spec: CommandSpec) -> Arc<AppState> {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(dir.path().join("none").to_str().unwrap()).unwrap();
        let mut state = AppState::new(&config);
        state.command = spec;
        state.cached_access_log.store(false, Ordering::Relaxed);
        Arc::new(state)
    }

    fn peer() -> SocketAddr {
        "127.0.0.1:40000".parse().unwrap()
    }

    async fn body_of(resp: Response<Full<Bytes>>) -> Bytes {
        resp.into_body().collect().await.unwrap().to_bytes()
    }

    #[tokio::test]
    async fn test_relays_stdout() {
        let state = state_running(CommandSpec::new("sh").args(["-c", "printf ready"]));
        let req = Request::get("/").body(()).unwrap();

        let resp = handle_request(req, peer(), state).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[CONTENT_TYPE], "text/plain");
        assert_eq!(&body_of(resp).await[..], b"ready");
    }

    #[tokio::test]
    async fn test_post_body_is_ignored() {
        let state = state_running(CommandSpec::new("sh").args(["-c", "printf ready"]));
        let req = Request::builder()
            .method(Method::POST)
            .uri("/anything")
            .body(Full::new(Bytes::from_static(b"payload")))
            .unwrap();

        let resp = handle_request(req, peer(), state).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(&body_of(resp).await[..], b"ready");
    }

    #[tokio::test]
    async fn test_failed_command_still_relays_stdout() {
        let state = state_running(
            CommandSpec::new("sh").args(["-c", "printf half; printf broken >&2; exit 1"]),
        );
        let req = Request::get("/").body(()).unwrap();

        let resp = handle_request(req, peer(), state).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(&body_of(resp).await[..], b"half");
    }

    #[tokio::test]
    async fn test_missing_command_gives_empty_ok() {
        let state = state_running(CommandSpec::new("/nonexistent/bin/server"));
        let req = Request::get("/").body(()).unwrap();

        let resp = handle_request(req, peer(), state).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[CONTENT_TYPE], "text/plain");
        assert!(body_of(resp).await.is_empty());
    }

    // The only test in the crate that installs the global writer; other
    // tests running afterwards log into these files too, hence `contains`
    #[tokio::test]
    async fn test_command_output_reaches_operator_log() {
        let dir = std::env::temp_dir().join(format!("exec_relay-{}", std::process::id()));
        let access = dir.join("access.log");
        let error = dir.join("error.log");
        logger::writer::init(
            logger::LogLevel::Info,
            Some(access.to_str().unwrap()),
            Some(error.to_str().unwrap()),
        )
        .unwrap();

        let state = state_running(
            CommandSpec::new("sh").args(["-c", "printf relayed-stdout; printf relayed-stderr >&2"]),
        );
        let req = Request::get("/").body(()).unwrap();
        let resp = handle_request(req, peer(), state).await.unwrap();
        assert_eq!(&body_of(resp).await[..], b"relayed-stdout");

        let access_text = std::fs::read_to_string(&access).unwrap();
        let error_text = std::fs::read_to_string(&error).unwrap();
        assert!(access_text.contains("Request received."));
        assert!(access_text.contains("relayed-stdout"));
        assert!(!access_text.contains("relayed-stderr"));
        assert!(error_text.contains("relayed-stderr"));
        assert!(!error_text.contains("relayed-stdout"));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_version_label() {
        assert_eq!(version_label(Version::HTTP_10), "1.0");
        assert_eq!(version_label(Version::HTTP_11), "1.1");
    }
}
