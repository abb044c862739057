// API response utility functions module
// Every JSON body carries a "status" of success, fail or error.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use serde::Serialize;

use crate::error::ServiceError;
use crate::logger;

/// Build a JSON response with the given status code.
pub fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response<Full<Bytes>> {
    let json = match serde_json::to_string(body) {
        Ok(j) => j,
        Err(e) => {
            logger::log_error(&format!("Failed to serialize response: {e}"));
            return build(
                StatusCode::INTERNAL_SERVER_ERROR,
                r#"{"status":"error","message":"serialization failure"}"#.to_string(),
            );
        }
    };
    build(status, json)
}

/// `{"status":"success"}` with no extra payload.
pub fn success() -> Response<Full<Bytes>> {
    build(StatusCode::OK, r#"{"status":"success"}"#.to_string())
}

/// `{"status":"success", <key>: <value>}`.
pub fn success_with<T: Serialize>(key: &str, value: &T) -> Response<Full<Bytes>> {
    json_response(
        StatusCode::OK,
        &serde_json::json!({ "status": "success", key: value }),
    )
}

/// `{"status":"fail"}`: authentication rejection, distinguished from errors.
pub fn fail() -> Response<Full<Bytes>> {
    build(StatusCode::UNAUTHORIZED, r#"{"status":"fail"}"#.to_string())
}

/// `{"status":"error","message":...}` with an explicit status code.
pub fn error(status: StatusCode, message: &str) -> Response<Full<Bytes>> {
    json_response(
        status,
        &serde_json::json!({ "status": "error", "message": message }),
    )
}

/// Map a service failure onto the envelope.
pub fn service_error(e: &ServiceError) -> Response<Full<Bytes>> {
    match e {
        ServiceError::Unauthorized => fail(),
        other => {
            let status = StatusCode::from_u16(other.http_status())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            error(status, &other.to_string())
        }
    }
}

/// The workbook connector returned no handle. The cause is already logged;
/// callers get a generic message.
pub fn connector_error() -> Response<Full<Bytes>> {
    error(StatusCode::INTERNAL_SERVER_ERROR, "datastore unavailable")
}

/// 404 for unknown API paths.
pub fn not_found() -> Response<Full<Bytes>> {
    error(StatusCode::NOT_FOUND, "no such endpoint")
}

/// 405 for a known path hit with the wrong method.
pub fn method_not_allowed() -> Response<Full<Bytes>> {
    error(StatusCode::METHOD_NOT_ALLOWED, "method not allowed")
}

/// 400 for bodies that fail to decode.
pub fn bad_request(message: &str) -> Response<Full<Bytes>> {
    error(StatusCode::BAD_REQUEST, message)
}

/// 413 when the declared body size exceeds the configured limit.
pub fn payload_too_large() -> Response<Full<Bytes>> {
    error(StatusCode::PAYLOAD_TOO_LARGE, "request body too large")
}

/// 204 for preflight requests; CORS headers only when enabled.
pub fn options_response(enable_cors: bool) -> Response<Full<Bytes>> {
    let mut builder = Response::builder()
        .status(StatusCode::NO_CONTENT)
        .header("Allow", "GET, POST, OPTIONS");

    if enable_cors {
        builder = builder
            .header("Access-Control-Allow-Origin", "*")
            .header("Access-Control-Allow-Methods", "GET, POST, OPTIONS")
            .header("Access-Control-Allow-Headers", "Content-Type")
            .header("Access-Control-Max-Age", "86400");
    }

    builder.body(Full::new(Bytes::new())).unwrap_or_else(|e| {
        logger::log_error(&format!("Failed to build OPTIONS response: {e}"));
        Response::new(Full::new(Bytes::new()))
    })
}

fn build(status: StatusCode, json: String) -> Response<Full<Bytes>> {
    Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .body(Full::new(Bytes::from(json)))
        .unwrap_or_else(|e| {
            logger::log_error(&format!("Failed to build response: {e}"));
            Response::new(Full::new(Bytes::from("Error")))
        })
}
