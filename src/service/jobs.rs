//! Job queries and mutations.

use serde::Deserialize;

use crate::error::{Result, ServiceError};
use crate::logger;
use crate::model::job::{
    self, decode_waypoints, update_timestamp, COL_DRIVER_ID, COL_DRIVER_NAME, COL_JOB_NAME,
    COL_LAST_UPDATE, COL_LOCATION, COL_PICKUP_TIME, COL_STATUS, COL_STEP_INDEX, COL_WAYPOINTS,
};
use crate::model::{id_suffix, Job, JobStatus};
use crate::store::Worksheet;

use super::{locate, verify_row_key};

/// Columns an admin edit may overwrite. Waypoints, status and progress are
/// deliberately untouchable through the edit operation.
#[derive(Debug, Clone, Deserialize)]
pub struct JobFields {
    pub job_name: String,
    pub driver_id: String,
    pub driver_name: String,
    #[serde(default)]
    pub pickup_time: String,
}

/// All jobs, newest first. Rows that no longer parse are skipped with a
/// warning rather than failing the whole listing.
pub async fn list(ws: &dyn Worksheet) -> Result<Vec<Job>> {
    let rows = ws.all_rows().await?;

    let mut jobs = Vec::with_capacity(rows.len().saturating_sub(1));
    for row in rows.iter().skip(1) {
        match Job::from_row(row) {
            Ok(parsed) => jobs.push(parsed),
            Err(e) => logger::log_warning(&format!("skipping malformed job row: {e}")),
        }
    }
    jobs.reverse();
    Ok(jobs)
}

/// Jobs assigned to one driver, newest first, same relative order as the
/// full listing.
pub async fn list_for_driver(ws: &dyn Worksheet, driver_id: &str) -> Result<Vec<Job>> {
    let mut jobs = list(ws).await?;
    jobs.retain(|job| job.driver_id == driver_id);
    Ok(jobs)
}

/// Next free job id: one past the highest numeric suffix currently in the
/// sheet. Monotonic across deletions, so ids are never reused.
async fn next_job_id(ws: &dyn Worksheet) -> Result<String> {
    let rows = ws.all_rows().await?;
    let max = rows
        .iter()
        .skip(1)
        .filter_map(|row| row.first())
        .filter_map(|id| id_suffix(id, job::ID_PREFIX))
        .max()
        .unwrap_or(0);
    Ok(format!("{}{}", job::ID_PREFIX, max + 1))
}

/// Create a job: `Pending`, step 0, created today. Returns the new id.
pub async fn create(
    ws: &dyn Worksheet,
    fields: JobFields,
    waypoints: Vec<serde_json::Value>,
) -> Result<String> {
    let job_id = next_job_id(ws).await?;
    let record = Job::new(
        job_id.clone(),
        fields.job_name,
        fields.driver_id,
        fields.driver_name,
        fields.pickup_time,
        waypoints,
    );
    ws.append_row(record.to_row()).await?;
    Ok(job_id)
}

pub async fn delete(ws: &dyn Worksheet, job_id: &str) -> Result<()> {
    let row = locate(ws, job_id, "job").await?;
    verify_row_key(ws, row, job_id).await?;
    ws.delete_row(row).await?;
    Ok(())
}

/// Overwrite the editable columns only.
pub async fn edit(ws: &dyn Worksheet, job_id: &str, fields: JobFields) -> Result<()> {
    let row = locate(ws, job_id, "job").await?;
    verify_row_key(ws, row, job_id).await?;

    ws.update_cell(row, COL_JOB_NAME, &fields.job_name).await?;
    ws.update_cell(row, COL_DRIVER_ID, &fields.driver_id).await?;
    ws.update_cell(row, COL_DRIVER_NAME, &fields.driver_name)
        .await?;
    ws.update_cell(row, COL_PICKUP_TIME, &fields.pickup_time)
        .await?;
    Ok(())
}

/// Driver claims a job. Only `Pending -> Active` is a legal transition;
/// accepting an already active or completed job is rejected.
pub async fn accept(ws: &dyn Worksheet, job_id: &str) -> Result<()> {
    let row = locate(ws, job_id, "job").await?;

    let status: JobStatus = ws.read_cell(row, COL_STATUS).await?.parse()?;
    if !status.can_transition_to(JobStatus::Active) {
        return Err(ServiceError::InvalidTransition(format!(
            "cannot accept a {status} job"
        )));
    }

    verify_row_key(ws, row, job_id).await?;
    ws.update_cell(row, COL_STATUS, JobStatus::Active.as_str())
        .await?;
    Ok(())
}

/// Record step progress and the reporting position. When the step index
/// reaches the end of the route the job completes.
///
/// The write sequence is not atomic; a failure midway leaves the row
/// partially updated.
pub async fn update_progress(
    ws: &dyn Worksheet,
    job_id: &str,
    step_index: u32,
    lat: &str,
    long: &str,
) -> Result<JobStatus> {
    let row = locate(ws, job_id, "job").await?;

    let status: JobStatus = ws.read_cell(row, COL_STATUS).await?.parse()?;
    if status != JobStatus::Active {
        return Err(ServiceError::InvalidTransition(format!(
            "progress reported on a {status} job"
        )));
    }

    let waypoints = decode_waypoints(&ws.read_cell(row, COL_WAYPOINTS).await?)?;
    let total = waypoints.len();
    if step_index as usize > total {
        return Err(ServiceError::InvalidInput(format!(
            "step_index {step_index} exceeds route of {total} waypoints"
        )));
    }

    verify_row_key(ws, row, job_id).await?;
    ws.update_cell(row, COL_STEP_INDEX, &step_index.to_string())
        .await?;
    ws.update_cell(row, COL_LAST_UPDATE, &update_timestamp())
        .await?;
    ws.update_cell(row, COL_LOCATION, &format!("{lat},{long}"))
        .await?;

    if step_index as usize == total {
        ws.update_cell(row, COL_STATUS, JobStatus::Completed.as_str())
            .await?;
        return Ok(JobStatus::Completed);
    }
    Ok(JobStatus::Active)
}
