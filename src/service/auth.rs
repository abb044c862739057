//! Driver authentication.

use crate::error::{Result, ServiceError};
use crate::model::{Driver, DriverIdentity};
use crate::store::Worksheet;

/// Linear scan of the Drivers sheet for an exact username/password match.
///
/// Plaintext comparison against the stored columns; no hashing, no rate
/// limiting, no session issuance. The caller keeps the returned identity.
pub async fn login(ws: &dyn Worksheet, username: &str, password: &str) -> Result<DriverIdentity> {
    let rows = ws.all_rows().await?;

    for row in rows.iter().skip(1) {
        let driver = Driver::from_row(row);
        if driver.username == username && driver.password == password {
            return Ok(driver.identity());
        }
    }

    Err(ServiceError::Unauthorized)
}
