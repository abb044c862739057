//! Row-store access layer
//!
//! The backing datastore is a remote workbook with two worksheets. Everything
//! the service needs from it fits a narrow interface: read all rows, find a
//! row by its key column, read/write single cells, append a row, delete a
//! row. Both the remote backend and the in-process test backend implement it;
//! nothing above this layer may assume in-process consistency.

pub mod credentials;
pub mod memory;
pub mod remote;

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::{StoreBackend, StoreConfig};
use crate::error::StoreError;
use crate::logger;

/// One worksheet of the workbook. Rows and columns are 1-based; row 1 is the
/// header row. Rows returned by `all_rows` may be ragged (trailing empty
/// cells omitted).
#[async_trait]
pub trait Worksheet: Send + Sync {
    /// Every row of the sheet, header included.
    async fn all_rows(&self) -> Result<Vec<Vec<String>>, StoreError>;

    /// Row index of the first row whose key column equals `key`, if any.
    ///
    /// This is a full linear scan on every call, exactly as expensive as it
    /// looks.
    async fn find_row(&self, key: &str) -> Result<Option<usize>, StoreError> {
        let rows = self.all_rows().await?;
        Ok(rows
            .iter()
            .position(|row| row.first().is_some_and(|c| c == key))
            .map(|i| i + 1))
    }

    /// Read one cell; absent cells read as empty.
    async fn read_cell(&self, row: usize, col: usize) -> Result<String, StoreError> {
        let rows = self.all_rows().await?;
        Ok(rows
            .get(row - 1)
            .and_then(|r| r.get(col - 1))
            .cloned()
            .unwrap_or_default())
    }

    async fn update_cell(&self, row: usize, col: usize, value: &str) -> Result<(), StoreError>;

    async fn append_row(&self, row: Vec<String>) -> Result<(), StoreError>;

    async fn delete_row(&self, row: usize) -> Result<(), StoreError>;
}

/// A workbook handle, acquired per request and never pooled.
#[async_trait]
pub trait Workbook: Send + Sync {
    async fn worksheet(&self, name: &str) -> Result<Arc<dyn Worksheet>, StoreError>;
}

/// Acquire a handle to the configured workbook.
///
/// Failure (unreadable or malformed credentials) is logged and reported as
/// `None`; the API layer turns that into the connector-error envelope.
pub fn connect(cfg: &StoreConfig) -> Option<Arc<dyn Workbook>> {
    match cfg.backend {
        StoreBackend::Memory => Some(memory::global(cfg)),
        StoreBackend::Remote => match remote::RemoteWorkbook::open(cfg) {
            Ok(workbook) => Some(Arc::new(workbook)),
            Err(e) => {
                logger::log_store_error(&format!("workbook connection failed: {e}"));
                None
            }
        },
    }
}
