// API module entry
// Route table for the dispatch JSON API

mod handlers;
mod response;
mod types;

use std::convert::Infallible;
use std::sync::Arc;

use http_body_util::Full;
use hyper::body::{Bytes, Incoming};
use hyper::header::HeaderValue;
use hyper::{Method, Request, Response};

use crate::config::Config;
use crate::logger;

/// API route handler
///
/// Dispatches to handler functions based on request path and method.
pub async fn handle_api_request(
    req: Request<Incoming>,
    config: Arc<Config>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let query = req.uri().query().map(ToString::to_string);

    if method == Method::OPTIONS {
        return Ok(response::options_response(config.http.enable_cors));
    }

    // Reject oversized bodies up front, before collecting anything.
    if let Some(resp) = check_body_size(&req, config.http.max_body_size) {
        return Ok(finish(resp, &config, &method, &path));
    }

    let resp = match (method.clone(), path.as_str()) {
        (Method::POST, "/api/login") => handlers::login(req, &config).await,
        (Method::GET, "/api/admin/jobs") => handlers::admin_jobs(&config).await,
        (Method::GET, "/api/driver/jobs") => {
            handlers::driver_jobs(query.as_deref(), &config).await
        }
        (Method::POST, "/api/admin/create-job") => handlers::create_job(req, &config).await,
        (Method::POST, "/api/admin/delete-job") => handlers::delete_job(req, &config).await,
        (Method::POST, "/api/admin/edit-job") => handlers::edit_job(req, &config).await,
        (Method::POST, "/api/job/accept") => handlers::accept_job(req, &config).await,
        (Method::POST, "/api/job/update") => handlers::update_job(req, &config).await,
        (Method::GET, "/api/admin/drivers") => handlers::admin_drivers(&config).await,
        (Method::POST, "/api/admin/add-driver") => handlers::add_driver(req, &config).await,
        (Method::POST, "/api/admin/edit-driver") => handlers::edit_driver(req, &config).await,
        (Method::POST, "/api/admin/delete-driver") => handlers::delete_driver(req, &config).await,
        // Known path, wrong method
        (
            _,
            "/api/login" | "/api/admin/jobs" | "/api/driver/jobs" | "/api/admin/create-job"
            | "/api/admin/delete-job" | "/api/admin/edit-job" | "/api/job/accept"
            | "/api/job/update" | "/api/admin/drivers" | "/api/admin/add-driver"
            | "/api/admin/edit-driver" | "/api/admin/delete-driver",
        ) => response::method_not_allowed(),
        _ => response::not_found(),
    };

    Ok(finish(resp, &config, &method, &path))
}

/// Apply cross-cutting response concerns: CORS header and access logging.
fn finish(
    mut resp: Response<Full<Bytes>>,
    config: &Config,
    method: &Method,
    path: &str,
) -> Response<Full<Bytes>> {
    if config.http.enable_cors {
        resp.headers_mut()
            .insert("Access-Control-Allow-Origin", HeaderValue::from_static("*"));
    }
    if config.logging.access_log {
        logger::log_api_request(method.as_str(), path, resp.status().as_u16());
    }
    resp
}

/// Validate the Content-Length header against the configured limit.
fn check_body_size(req: &Request<Incoming>, max_body_size: u64) -> Option<Response<Full<Bytes>>> {
    let content_length = req.headers().get("content-length")?;
    let size = content_length.to_str().ok()?.parse::<u64>().ok()?;
    if size > max_body_size {
        logger::log_warning(&format!(
            "Request body too large: {size} bytes (max: {max_body_size})"
        ));
        return Some(response::payload_too_large());
    }
    None
}
