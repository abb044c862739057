//! Driver account management.

use serde::Deserialize;

use crate::error::Result;
use crate::model::driver::{
    self, Driver, COL_FULL_NAME, COL_ID_CARD, COL_LICENSE_PLATE, COL_PASSWORD, COL_PHONE,
    COL_USERNAME, ROLE_DRIVER,
};
use crate::model::id_suffix;
use crate::store::Worksheet;

use super::{locate, verify_row_key};

/// Editable driver columns; the id and role are never overwritten.
#[derive(Debug, Clone, Deserialize)]
pub struct DriverFields {
    pub username: String,
    pub password: String,
    pub full_name: String,
    pub id_card: String,
    pub license_plate: String,
    pub phone: String,
}

/// All drivers in sheet order.
pub async fn list(ws: &dyn Worksheet) -> Result<Vec<Driver>> {
    let rows = ws.all_rows().await?;
    Ok(rows.iter().skip(1).map(|row| Driver::from_row(row)).collect())
}

/// Next free driver id, zero-padded to three digits. Monotonic across
/// deletions.
async fn next_driver_id(ws: &dyn Worksheet) -> Result<String> {
    let rows = ws.all_rows().await?;
    let max = rows
        .iter()
        .skip(1)
        .filter_map(|row| row.first())
        .filter_map(|id| id_suffix(id, driver::ID_PREFIX))
        .max()
        .unwrap_or(0);
    Ok(format!("{}{:03}", driver::ID_PREFIX, max + 1))
}

/// Create a driver account. Returns the new id.
pub async fn add(ws: &dyn Worksheet, fields: DriverFields) -> Result<String> {
    let driver_id = next_driver_id(ws).await?;
    let record = Driver {
        driver_id: driver_id.clone(),
        username: fields.username,
        password: fields.password,
        full_name: fields.full_name,
        id_card: fields.id_card,
        license_plate: fields.license_plate,
        phone: fields.phone,
        role: ROLE_DRIVER.to_string(),
    };
    ws.append_row(record.to_row()).await?;
    Ok(driver_id)
}

/// Overwrite every editable column of an existing account.
pub async fn edit(ws: &dyn Worksheet, driver_id: &str, fields: DriverFields) -> Result<()> {
    let row = locate(ws, driver_id, "driver").await?;
    verify_row_key(ws, row, driver_id).await?;

    ws.update_cell(row, COL_USERNAME, &fields.username).await?;
    ws.update_cell(row, COL_PASSWORD, &fields.password).await?;
    ws.update_cell(row, COL_FULL_NAME, &fields.full_name).await?;
    ws.update_cell(row, COL_ID_CARD, &fields.id_card).await?;
    ws.update_cell(row, COL_LICENSE_PLATE, &fields.license_plate)
        .await?;
    ws.update_cell(row, COL_PHONE, &fields.phone).await?;
    Ok(())
}

pub async fn delete(ws: &dyn Worksheet, driver_id: &str) -> Result<()> {
    let row = locate(ws, driver_id, "driver").await?;
    verify_row_key(ws, row, driver_id).await?;
    ws.delete_row(row).await?;
    Ok(())
}
