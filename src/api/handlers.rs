// API handlers module
// One handler per route: decode the body, reacquire the workbook handle,
// run the service operation, wrap the outcome in the JSON envelope.

use std::sync::Arc;

use http_body_util::{BodyExt, Full};
use hyper::body::{Bytes, Incoming};
use hyper::{Request, Response};
use serde::de::DeserializeOwned;

use crate::config::Config;
use crate::logger;
use crate::service::drivers::DriverFields;
use crate::service::{auth, drivers, jobs};
use crate::store::{self, Worksheet};

use super::response;
use super::types::{
    CreateJobRequest, DriverIdRequest, EditDriverRequest, EditJobRequest, JobIdRequest,
    LoginRequest, ProgressRequest,
};

/// Read and decode a JSON body, or produce the 400 response describing why
/// it failed.
async fn read_json<T: DeserializeOwned>(
    req: Request<Incoming>,
) -> Result<T, Response<Full<Bytes>>> {
    let bytes = match req.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) => {
            logger::log_warning(&format!("Failed to read request body: {e}"));
            return Err(response::bad_request("failed to read request body"));
        }
    };

    serde_json::from_slice(&bytes).map_err(|e| response::bad_request(&format!("invalid JSON: {e}")))
}

/// Reacquire the workbook and open one worksheet. Connection failures are
/// logged by the connector; worksheet failures are logged here. Either way
/// the caller answers with the generic connector error.
async fn open_sheet(config: &Config, name: &str) -> Option<Arc<dyn Worksheet>> {
    let workbook = store::connect(&config.store)?;
    match workbook.worksheet(name).await {
        Ok(sheet) => Some(sheet),
        Err(e) => {
            logger::log_store_error(&format!("cannot open worksheet '{name}': {e}"));
            None
        }
    }
}

async fn jobs_sheet(config: &Config) -> Option<Arc<dyn Worksheet>> {
    open_sheet(config, &config.store.jobs_sheet).await
}

async fn drivers_sheet(config: &Config) -> Option<Arc<dyn Worksheet>> {
    open_sheet(config, &config.store.drivers_sheet).await
}

// --- Auth ---

pub async fn login(req: Request<Incoming>, config: &Config) -> Response<Full<Bytes>> {
    let payload: LoginRequest = match read_json(req).await {
        Ok(p) => p,
        Err(resp) => return resp,
    };
    let Some(sheet) = drivers_sheet(config).await else {
        return response::connector_error();
    };

    match auth::login(sheet.as_ref(), &payload.username, &payload.password).await {
        Ok(identity) => response::success_with("driver", &identity),
        Err(e) => response::service_error(&e),
    }
}

// --- Job queries ---

pub async fn admin_jobs(config: &Config) -> Response<Full<Bytes>> {
    let Some(sheet) = jobs_sheet(config).await else {
        return response::connector_error();
    };

    match jobs::list(sheet.as_ref()).await {
        Ok(list) => response::success_with("jobs", &list),
        Err(e) => response::service_error(&e),
    }
}

pub async fn driver_jobs(query: Option<&str>, config: &Config) -> Response<Full<Bytes>> {
    let Some(driver_id) = query.and_then(|q| query_param(q, "driver_id")) else {
        return response::bad_request("missing driver_id");
    };
    let Some(sheet) = jobs_sheet(config).await else {
        return response::connector_error();
    };

    match jobs::list_for_driver(sheet.as_ref(), &driver_id).await {
        Ok(list) => response::success_with("jobs", &list),
        Err(e) => response::service_error(&e),
    }
}

// --- Job mutations ---

pub async fn create_job(req: Request<Incoming>, config: &Config) -> Response<Full<Bytes>> {
    let payload: CreateJobRequest = match read_json(req).await {
        Ok(p) => p,
        Err(resp) => return resp,
    };
    let Some(sheet) = jobs_sheet(config).await else {
        return response::connector_error();
    };

    match jobs::create(sheet.as_ref(), payload.fields, payload.waypoints).await {
        Ok(job_id) => response::success_with("job_id", &job_id),
        Err(e) => response::service_error(&e),
    }
}

pub async fn delete_job(req: Request<Incoming>, config: &Config) -> Response<Full<Bytes>> {
    let payload: JobIdRequest = match read_json(req).await {
        Ok(p) => p,
        Err(resp) => return resp,
    };
    let Some(sheet) = jobs_sheet(config).await else {
        return response::connector_error();
    };

    match jobs::delete(sheet.as_ref(), &payload.job_id).await {
        Ok(()) => response::success(),
        Err(e) => response::service_error(&e),
    }
}

pub async fn edit_job(req: Request<Incoming>, config: &Config) -> Response<Full<Bytes>> {
    let payload: EditJobRequest = match read_json(req).await {
        Ok(p) => p,
        Err(resp) => return resp,
    };
    let Some(sheet) = jobs_sheet(config).await else {
        return response::connector_error();
    };

    match jobs::edit(sheet.as_ref(), &payload.job_id, payload.fields).await {
        Ok(()) => response::success(),
        Err(e) => response::service_error(&e),
    }
}

pub async fn accept_job(req: Request<Incoming>, config: &Config) -> Response<Full<Bytes>> {
    let payload: JobIdRequest = match read_json(req).await {
        Ok(p) => p,
        Err(resp) => return resp,
    };
    let Some(sheet) = jobs_sheet(config).await else {
        return response::connector_error();
    };

    match jobs::accept(sheet.as_ref(), &payload.job_id).await {
        Ok(()) => response::success(),
        Err(e) => response::service_error(&e),
    }
}

pub async fn update_job(req: Request<Incoming>, config: &Config) -> Response<Full<Bytes>> {
    let payload: ProgressRequest = match read_json(req).await {
        Ok(p) => p,
        Err(resp) => return resp,
    };
    let Some(step_index) = payload.step_index.as_step_index() else {
        return response::bad_request("step_index must be a non-negative integer");
    };
    let Some(sheet) = jobs_sheet(config).await else {
        return response::connector_error();
    };

    match jobs::update_progress(
        sheet.as_ref(),
        &payload.job_id,
        step_index,
        &payload.lat.as_plain(),
        &payload.long.as_plain(),
    )
    .await
    {
        Ok(status) => response::success_with("job_status", &status),
        Err(e) => response::service_error(&e),
    }
}

// --- Driver management ---

pub async fn admin_drivers(config: &Config) -> Response<Full<Bytes>> {
    let Some(sheet) = drivers_sheet(config).await else {
        return response::connector_error();
    };

    match drivers::list(sheet.as_ref()).await {
        Ok(list) => response::success_with("drivers", &list),
        Err(e) => response::service_error(&e),
    }
}

pub async fn add_driver(req: Request<Incoming>, config: &Config) -> Response<Full<Bytes>> {
    let payload: DriverFields = match read_json(req).await {
        Ok(p) => p,
        Err(resp) => return resp,
    };
    let Some(sheet) = drivers_sheet(config).await else {
        return response::connector_error();
    };

    match drivers::add(sheet.as_ref(), payload).await {
        Ok(driver_id) => response::success_with("driver_id", &driver_id),
        Err(e) => response::service_error(&e),
    }
}

pub async fn edit_driver(req: Request<Incoming>, config: &Config) -> Response<Full<Bytes>> {
    let payload: EditDriverRequest = match read_json(req).await {
        Ok(p) => p,
        Err(resp) => return resp,
    };
    let Some(sheet) = drivers_sheet(config).await else {
        return response::connector_error();
    };

    match drivers::edit(sheet.as_ref(), &payload.driver_id, payload.fields).await {
        Ok(()) => response::success(),
        Err(e) => response::service_error(&e),
    }
}

pub async fn delete_driver(req: Request<Incoming>, config: &Config) -> Response<Full<Bytes>> {
    let payload: DriverIdRequest = match read_json(req).await {
        Ok(p) => p,
        Err(resp) => return resp,
    };
    let Some(sheet) = drivers_sheet(config).await else {
        return response::connector_error();
    };

    match drivers::delete(sheet.as_ref(), &payload.driver_id).await {
        Ok(()) => response::success(),
        Err(e) => response::service_error(&e),
    }
}

/// Extract one key from a query string. No percent-decoding; identifiers
/// are plain ASCII.
pub fn query_param(query: &str, key: &str) -> Option<String> {
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(k, _)| *k == key)
        .map(|(_, v)| v.to_string())
}
