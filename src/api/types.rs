// API request payload types
// All bodies are flat JSON objects; field-level types re-use the service
// layer's editable-field structs via serde flatten.

use serde::Deserialize;

use crate::service::drivers::DriverFields;
use crate::service::jobs::JobFields;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateJobRequest {
    #[serde(flatten)]
    pub fields: JobFields,
    pub waypoints: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct EditJobRequest {
    pub job_id: String,
    #[serde(flatten)]
    pub fields: JobFields,
}

#[derive(Debug, Deserialize)]
pub struct JobIdRequest {
    pub job_id: String,
}

#[derive(Debug, Deserialize)]
pub struct ProgressRequest {
    pub job_id: String,
    pub step_index: Scalar,
    pub lat: Scalar,
    pub long: Scalar,
}

#[derive(Debug, Deserialize)]
pub struct DriverIdRequest {
    pub driver_id: String,
}

#[derive(Debug, Deserialize)]
pub struct EditDriverRequest {
    pub driver_id: String,
    #[serde(flatten)]
    pub fields: DriverFields,
}

/// A JSON value that dashboards send either as a number or as a string,
/// depending on whether it came straight from a form field.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Number(serde_json::Number),
    Text(String),
}

impl Scalar {
    /// Render as the plain text stored in the sheet.
    pub fn as_plain(&self) -> String {
        match self {
            Self::Number(n) => n.to_string(),
            Self::Text(s) => s.clone(),
        }
    }

    /// Interpret as a step index, if it is a non-negative integer.
    pub fn as_step_index(&self) -> Option<u32> {
        match self {
            Self::Number(n) => n.as_u64().and_then(|v| u32::try_from(v).ok()),
            Self::Text(s) => s.trim().parse().ok(),
        }
    }
}
