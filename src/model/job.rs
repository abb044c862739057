//! Job records and the job status state machine.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::ServiceError;

use super::cell;

// 1-based column positions in the Jobs worksheet. Columns 8, 9 and 11 are
// reserved and always written empty.
pub const COL_JOB_ID: usize = 1;
pub const COL_CREATED_DATE: usize = 2;
pub const COL_JOB_NAME: usize = 3;
pub const COL_STATUS: usize = 4;
pub const COL_DRIVER_ID: usize = 5;
pub const COL_DRIVER_NAME: usize = 6;
pub const COL_PICKUP_TIME: usize = 7;
pub const COL_WAYPOINTS: usize = 10;
pub const COL_STEP_INDEX: usize = 12;
pub const COL_LAST_UPDATE: usize = 13;
pub const COL_LOCATION: usize = 14;

/// Fixed row width of the Jobs worksheet.
pub const ROW_WIDTH: usize = 14;

pub const ID_PREFIX: &str = "JOB-";

/// Lifecycle of a job.
///
/// The status column is a closed set; the only legal transitions are
/// `Pending -> Active` (driver accepts) and `Active -> Completed` (progress
/// reaches the last waypoint). There is no way out of `Completed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobStatus {
    Pending,
    Active,
    Completed,
}

impl JobStatus {
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Active) | (Self::Active, Self::Completed)
        )
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Active => "Active",
            Self::Completed => "Completed",
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for JobStatus {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(Self::Pending),
            "Active" => Ok(Self::Active),
            "Completed" => Ok(Self::Completed),
            other => Err(ServiceError::MalformedRecord(format!(
                "unknown job status '{other}'"
            ))),
        }
    }
}

/// A delivery job with an ordered waypoint route.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub job_id: String,
    pub created_date: String,
    pub job_name: String,
    pub status: JobStatus,
    pub driver_id: String,
    pub driver_name: String,
    pub pickup_time: String,
    /// Ordered stops; stop payloads are opaque to the backend.
    pub waypoints: Vec<serde_json::Value>,
    pub current_step_index: u32,
    pub last_update_timestamp: String,
    pub last_known_location: String,
}

impl Job {
    /// Build a fresh job record: status `Pending`, progress at step 0,
    /// created today.
    pub fn new(
        job_id: String,
        job_name: String,
        driver_id: String,
        driver_name: String,
        pickup_time: String,
        waypoints: Vec<serde_json::Value>,
    ) -> Self {
        Self {
            job_id,
            created_date: Utc::now().format("%Y-%m-%d").to_string(),
            job_name,
            status: JobStatus::Pending,
            driver_id,
            driver_name,
            pickup_time,
            waypoints,
            current_step_index: 0,
            last_update_timestamp: String::new(),
            last_known_location: String::new(),
        }
    }

    /// Decode a worksheet row. Rows may be ragged; missing cells read as
    /// empty. An unparseable status or waypoint column is an error, the rest
    /// of the record is free text.
    pub fn from_row(row: &[String]) -> Result<Self, ServiceError> {
        let status = cell(row, COL_STATUS).parse()?;
        let waypoints = decode_waypoints(cell(row, COL_WAYPOINTS))?;

        let step_raw = cell(row, COL_STEP_INDEX);
        let current_step_index = if step_raw.is_empty() {
            0
        } else {
            step_raw.parse().map_err(|_| {
                ServiceError::MalformedRecord(format!("bad step index '{step_raw}'"))
            })?
        };

        Ok(Self {
            job_id: cell(row, COL_JOB_ID).to_string(),
            created_date: cell(row, COL_CREATED_DATE).to_string(),
            job_name: cell(row, COL_JOB_NAME).to_string(),
            status,
            driver_id: cell(row, COL_DRIVER_ID).to_string(),
            driver_name: cell(row, COL_DRIVER_NAME).to_string(),
            pickup_time: cell(row, COL_PICKUP_TIME).to_string(),
            waypoints,
            current_step_index,
            last_update_timestamp: cell(row, COL_LAST_UPDATE).to_string(),
            last_known_location: cell(row, COL_LOCATION).to_string(),
        })
    }

    /// Encode as a fixed-width worksheet row.
    pub fn to_row(&self) -> Vec<String> {
        let mut row = vec![String::new(); ROW_WIDTH];
        row[COL_JOB_ID - 1] = self.job_id.clone();
        row[COL_CREATED_DATE - 1] = self.created_date.clone();
        row[COL_JOB_NAME - 1] = self.job_name.clone();
        row[COL_STATUS - 1] = self.status.to_string();
        row[COL_DRIVER_ID - 1] = self.driver_id.clone();
        row[COL_DRIVER_NAME - 1] = self.driver_name.clone();
        row[COL_PICKUP_TIME - 1] = self.pickup_time.clone();
        row[COL_WAYPOINTS - 1] = encode_waypoints(&self.waypoints);
        row[COL_STEP_INDEX - 1] = self.current_step_index.to_string();
        row[COL_LAST_UPDATE - 1] = self.last_update_timestamp.clone();
        row[COL_LOCATION - 1] = self.last_known_location.clone();
        row
    }
}

/// Encode the waypoint list for its worksheet cell.
pub fn encode_waypoints(waypoints: &[serde_json::Value]) -> String {
    serde_json::to_string(waypoints).unwrap_or_else(|_| "[]".to_string())
}

/// Decode the waypoint cell. An empty cell is an empty route.
pub fn decode_waypoints(raw: &str) -> Result<Vec<serde_json::Value>, ServiceError> {
    if raw.is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(raw)
        .map_err(|e| ServiceError::MalformedRecord(format!("bad waypoints column: {e}")))
}

/// Timestamp format written to the last-update column.
pub fn update_timestamp() -> String {
    Utc::now().format("%Y-%m-%d %H:%M:%S").to_string()
}
