// Dashboard pages, embedded at build time and served with explicit headers.

use std::convert::Infallible;

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Method, Request, Response, StatusCode};

use crate::logger;

/// Page route handler for everything outside `/api/`.
pub async fn handle_page_request(
    req: Request<hyper::body::Incoming>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    if req.method() != Method::GET && req.method() != Method::HEAD {
        return Ok(build_405_response());
    }
    let is_head = req.method() == Method::HEAD;

    let page = match req.uri().path() {
        "/" => include_str!("login.html"),
        "/driver-dashboard" => include_str!("driver_dashboard.html"),
        "/admin-dashboard" => include_str!("admin_dashboard.html"),
        _ => return Ok(build_404_response()),
    };

    Ok(build_html_response(page, is_head))
}

fn build_html_response(content: &str, is_head: bool) -> Response<Full<Bytes>> {
    let content_length = content.len();
    let body = if is_head {
        Bytes::new()
    } else {
        Bytes::from(content.to_string())
    };

    Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", "text/html; charset=utf-8")
        .header("Content-Length", content_length)
        .header("Cache-Control", "no-cache")
        .body(Full::new(body))
        .unwrap_or_else(|e| {
            logger::log_error(&format!("Failed to build page response: {e}"));
            Response::new(Full::new(Bytes::new()))
        })
}

fn build_404_response() -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::NOT_FOUND)
        .header("Content-Type", "text/plain")
        .body(Full::new(Bytes::from("404 Not Found")))
        .unwrap_or_else(|_| Response::new(Full::new(Bytes::from("404 Not Found"))))
}

fn build_405_response() -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::METHOD_NOT_ALLOWED)
        .header("Content-Type", "text/plain")
        .header("Allow", "GET, HEAD")
        .body(Full::new(Bytes::from("405 Method Not Allowed")))
        .unwrap_or_else(|_| Response::new(Full::new(Bytes::from("405 Method Not Allowed"))))
}
