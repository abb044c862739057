//! Business operations over the row store
//!
//! One function per API operation. Every function takes a worksheet handle
//! acquired for the current request; nothing here caches or pools. The
//! find-then-update sequences guard themselves with an optimistic key
//! recheck right before the first write, which narrows (but cannot close)
//! the window against concurrent row deletion or reordering.

pub mod auth;
pub mod drivers;
pub mod jobs;

use crate::error::{Result, ServiceError};
use crate::store::Worksheet;

/// Locate a row by its key column, or report the entity as missing.
async fn locate(ws: &dyn Worksheet, key: &str, entity: &'static str) -> Result<usize> {
    ws.find_row(key)
        .await?
        .ok_or(ServiceError::NotFound(entity))
}

/// Optimistic guard: confirm the located row still carries the expected key.
/// A mismatch means the row moved (concurrent delete or insert) and the
/// mutation must not proceed.
async fn verify_row_key(ws: &dyn Worksheet, row: usize, key: &str) -> Result<()> {
    if ws.read_cell(row, 1).await? == key {
        Ok(())
    } else {
        Err(ServiceError::Conflict)
    }
}
