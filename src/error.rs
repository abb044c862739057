use thiserror::Error;

/// Failures raised by the row-store backends.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("credentials unavailable: {0}")]
    Credentials(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("workbook service answered {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("failed to decode store response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("worksheet not found: {0}")]
    MissingSheet(String),

    #[error("row or column out of range: row {row}, col {col}")]
    OutOfRange { row: usize, col: usize },
}

/// Failures raised by the service layer, mapped to HTTP statuses by the API.
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("invalid credentials")]
    Unauthorized,

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid status transition: {0}")]
    InvalidTransition(String),

    #[error("row changed underneath the update, aborting")]
    Conflict,

    #[error("malformed record: {0}")]
    MalformedRecord(String),
}

impl ServiceError {
    /// HTTP status the API layer reports for this error.
    pub const fn http_status(&self) -> u16 {
        match self {
            Self::Store(_) | Self::MalformedRecord(_) => 500,
            Self::NotFound(_) => 404,
            Self::Unauthorized => 401,
            Self::InvalidInput(_) => 400,
            Self::InvalidTransition(_) | Self::Conflict => 409,
        }
    }
}

pub type Result<T> = std::result::Result<T, ServiceError>;
