//! HTTP response building module

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{CONTENT_LENGTH, CONTENT_TYPE};
use hyper::{Response, StatusCode};

pub const TEXT_PLAIN: &str = "text/plain";

/// Build the 200 `text/plain` response carrying relayed output
pub fn build_text_response(body: Bytes) -> Response<Full<Bytes>> {
    let content_length = body.len();
    Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, TEXT_PLAIN)
        .header(CONTENT_LENGTH, content_length)
        .body(Full::new(body.clone()))
        .unwrap_or_else(|e| {
            log_build_error(&e);
            Response::new(Full::new(body))
        })
}

/// Log response build error
fn log_build_error(error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build text response: {error}"));
}
