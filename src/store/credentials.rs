//! Workbook credentials
//!
//! Sourced from the `WORKBOOK_CREDENTIALS` environment variable (a JSON
//! blob) or, when the variable is unset, from a local credentials file.
//! Environment wins; the two sources are never merged.

use serde::Deserialize;

use crate::error::StoreError;

pub const CREDENTIALS_ENV: &str = "WORKBOOK_CREDENTIALS";

#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    /// Base URL of the workbook service.
    pub endpoint: String,
    /// Bearer token presented on every store call.
    pub token: String,
    /// Optional workbook name override; falls back to the configured name.
    #[serde(default)]
    pub workbook: Option<String>,
}

/// Load credentials, preferring the environment blob over `credentials_file`.
pub fn load(credentials_file: &str) -> Result<Credentials, StoreError> {
    let raw = match std::env::var(CREDENTIALS_ENV) {
        Ok(blob) => blob,
        Err(_) => std::fs::read_to_string(credentials_file).map_err(|e| {
            StoreError::Credentials(format!("cannot read '{credentials_file}': {e}"))
        })?,
    };

    parse(&raw)
}

fn parse(raw: &str) -> Result<Credentials, StoreError> {
    let creds: Credentials = serde_json::from_str(raw)
        .map_err(|e| StoreError::Credentials(format!("malformed credential blob: {e}")))?;
    if creds.endpoint.is_empty() {
        return Err(StoreError::Credentials("empty endpoint".to_string()));
    }
    Ok(creds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_blob() {
        let creds = parse(
            r#"{"endpoint": "http://sheets.local", "token": "t0ken", "workbook": "Dispatch"}"#,
        )
        .unwrap();
        assert_eq!(creds.endpoint, "http://sheets.local");
        assert_eq!(creds.token, "t0ken");
        assert_eq!(creds.workbook.as_deref(), Some("Dispatch"));
    }

    #[test]
    fn test_parse_without_workbook() {
        let creds = parse(r#"{"endpoint": "http://sheets.local", "token": "t"}"#).unwrap();
        assert!(creds.workbook.is_none());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse("not json").is_err());
        assert!(parse(r#"{"token": "t"}"#).is_err());
        assert!(parse(r#"{"endpoint": "", "token": "t"}"#).is_err());
    }

    #[test]
    fn test_missing_file() {
        // Only runs the file branch when the env var is absent in the test
        // environment; either way load must not panic.
        let result = load("definitely-missing-credentials.json");
        if std::env::var(CREDENTIALS_ENV).is_err() {
            assert!(result.is_err());
        }
    }
}
