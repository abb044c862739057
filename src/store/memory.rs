//! In-process workbook backend
//!
//! Used by the test suite and by `store.backend = "memory"` for running the
//! service without a remote store. Implements the same ragged-row semantics
//! the remote store exhibits: appends keep their given width, cell updates
//! pad the row as needed, deletes shift later rows up.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock};

use async_trait::async_trait;

use crate::config::StoreConfig;
use crate::error::StoreError;

use super::{Workbook, Worksheet};

pub struct MemoryWorkbook {
    sheets: HashMap<String, Arc<MemorySheet>>,
}

impl MemoryWorkbook {
    pub fn new() -> Self {
        Self {
            sheets: HashMap::new(),
        }
    }

    /// Add a worksheet seeded with a header row.
    #[must_use]
    pub fn with_sheet(mut self, name: &str, header: &[&str]) -> Self {
        let header_row = header.iter().map(ToString::to_string).collect();
        self.sheets.insert(
            name.to_string(),
            Arc::new(MemorySheet {
                rows: Mutex::new(vec![header_row]),
            }),
        );
        self
    }
}

impl Default for MemoryWorkbook {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Workbook for MemoryWorkbook {
    async fn worksheet(&self, name: &str) -> Result<Arc<dyn Worksheet>, StoreError> {
        self.sheets
            .get(name)
            .cloned()
            .map(|sheet| sheet as Arc<dyn Worksheet>)
            .ok_or_else(|| StoreError::MissingSheet(name.to_string()))
    }
}

pub struct MemorySheet {
    rows: Mutex<Vec<Vec<String>>>,
}

#[async_trait]
impl Worksheet for MemorySheet {
    async fn all_rows(&self) -> Result<Vec<Vec<String>>, StoreError> {
        Ok(self.rows.lock().unwrap().clone())
    }

    async fn update_cell(&self, row: usize, col: usize, value: &str) -> Result<(), StoreError> {
        let mut rows = self.rows.lock().unwrap();
        if row == 0 || col == 0 || row > rows.len() {
            return Err(StoreError::OutOfRange { row, col });
        }
        let cells = &mut rows[row - 1];
        if cells.len() < col {
            cells.resize(col, String::new());
        }
        cells[col - 1] = value.to_string();
        Ok(())
    }

    async fn append_row(&self, row: Vec<String>) -> Result<(), StoreError> {
        self.rows.lock().unwrap().push(row);
        Ok(())
    }

    async fn delete_row(&self, row: usize) -> Result<(), StoreError> {
        let mut rows = self.rows.lock().unwrap();
        if row == 0 || row > rows.len() {
            return Err(StoreError::OutOfRange { row, col: 0 });
        }
        rows.remove(row - 1);
        Ok(())
    }
}

/// Worksheet headers, matching the documented column layout.
pub const JOBS_HEADER: [&str; 14] = [
    "job_id",
    "created_date",
    "job_name",
    "status",
    "driver_id",
    "driver_name",
    "pickup_time",
    "reserved_1",
    "reserved_2",
    "waypoints",
    "reserved_3",
    "current_step_index",
    "last_update_timestamp",
    "last_known_location",
];

pub const DRIVERS_HEADER: [&str; 8] = [
    "driver_id",
    "username",
    "password",
    "full_name",
    "id_card",
    "license_plate",
    "phone",
    "role",
];

/// Build a workbook with empty Jobs and Drivers sheets.
pub fn seeded(jobs_sheet: &str, drivers_sheet: &str) -> Arc<MemoryWorkbook> {
    Arc::new(
        MemoryWorkbook::new()
            .with_sheet(jobs_sheet, &JOBS_HEADER)
            .with_sheet(drivers_sheet, &DRIVERS_HEADER),
    )
}

/// Process-global workbook for the memory backend, so data survives across
/// requests within one process.
pub fn global(cfg: &StoreConfig) -> Arc<dyn Workbook> {
    static GLOBAL: OnceLock<Arc<MemoryWorkbook>> = OnceLock::new();
    GLOBAL
        .get_or_init(|| seeded(&cfg.jobs_sheet, &cfg.drivers_sheet))
        .clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet() -> Arc<MemorySheet> {
        Arc::new(MemorySheet {
            rows: Mutex::new(vec![vec!["key".to_string(), "value".to_string()]]),
        })
    }

    #[tokio::test]
    async fn test_append_and_find() {
        let sheet = sheet();
        sheet
            .append_row(vec!["JOB-1".to_string(), "a".to_string()])
            .await
            .unwrap();
        sheet
            .append_row(vec!["JOB-2".to_string(), "b".to_string()])
            .await
            .unwrap();

        assert_eq!(sheet.find_row("JOB-2").await.unwrap(), Some(3));
        assert_eq!(sheet.find_row("JOB-9").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_delete_shifts_rows() {
        let sheet = sheet();
        sheet.append_row(vec!["JOB-1".to_string()]).await.unwrap();
        sheet.append_row(vec!["JOB-2".to_string()]).await.unwrap();

        sheet.delete_row(2).await.unwrap();
        assert_eq!(sheet.find_row("JOB-2").await.unwrap(), Some(2));
        assert_eq!(sheet.all_rows().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_update_pads_ragged_row() {
        let sheet = sheet();
        sheet.append_row(vec!["JOB-1".to_string()]).await.unwrap();

        sheet.update_cell(2, 4, "Active").await.unwrap();
        assert_eq!(sheet.read_cell(2, 4).await.unwrap(), "Active");
        assert_eq!(sheet.read_cell(2, 3).await.unwrap(), "");
        assert_eq!(sheet.read_cell(2, 9).await.unwrap(), "");
    }

    #[tokio::test]
    async fn test_out_of_range() {
        let sheet = sheet();
        assert!(sheet.update_cell(5, 1, "x").await.is_err());
        assert!(sheet.delete_row(5).await.is_err());
        assert!(sheet.delete_row(0).await.is_err());
    }

    #[tokio::test]
    async fn test_missing_sheet() {
        let workbook = MemoryWorkbook::new().with_sheet("Jobs", &JOBS_HEADER);
        assert!(workbook.worksheet("Jobs").await.is_ok());
        assert!(workbook.worksheet("Drivers").await.is_err());
    }
}
