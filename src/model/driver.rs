//! Driver records.

use serde::{Deserialize, Serialize};

use super::cell;

// 1-based column positions in the Drivers worksheet.
pub const COL_DRIVER_ID: usize = 1;
pub const COL_USERNAME: usize = 2;
pub const COL_PASSWORD: usize = 3;
pub const COL_FULL_NAME: usize = 4;
pub const COL_ID_CARD: usize = 5;
pub const COL_LICENSE_PLATE: usize = 6;
pub const COL_PHONE: usize = 7;
pub const COL_ROLE: usize = 8;

/// Fixed row width of the Drivers worksheet.
pub const ROW_WIDTH: usize = 8;

pub const ID_PREFIX: &str = "DRV-";

/// Role stored for every account created through the admin dashboard.
pub const ROLE_DRIVER: &str = "driver";

/// A driver account. Every column, password included, is visible to the
/// admin listing; credentials are stored in plaintext by design of the
/// backing workbook.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Driver {
    pub driver_id: String,
    pub username: String,
    pub password: String,
    pub full_name: String,
    pub id_card: String,
    pub license_plate: String,
    pub phone: String,
    pub role: String,
}

/// Identity object returned by a successful login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriverIdentity {
    pub id: String,
    pub full_name: String,
    pub role: String,
}

impl Driver {
    /// Decode a worksheet row; driver rows are free text throughout, so this
    /// cannot fail, it only tolerates ragged rows.
    pub fn from_row(row: &[String]) -> Self {
        Self {
            driver_id: cell(row, COL_DRIVER_ID).to_string(),
            username: cell(row, COL_USERNAME).to_string(),
            password: cell(row, COL_PASSWORD).to_string(),
            full_name: cell(row, COL_FULL_NAME).to_string(),
            id_card: cell(row, COL_ID_CARD).to_string(),
            license_plate: cell(row, COL_LICENSE_PLATE).to_string(),
            phone: cell(row, COL_PHONE).to_string(),
            role: cell(row, COL_ROLE).to_string(),
        }
    }

    /// Encode as a fixed-width worksheet row.
    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.driver_id.clone(),
            self.username.clone(),
            self.password.clone(),
            self.full_name.clone(),
            self.id_card.clone(),
            self.license_plate.clone(),
            self.phone.clone(),
            self.role.clone(),
        ]
    }

    pub fn identity(&self) -> DriverIdentity {
        DriverIdentity {
            id: self.driver_id.clone(),
            full_name: self.full_name.clone(),
            role: self.role.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_round_trip() {
        let driver = Driver {
            driver_id: "DRV-001".to_string(),
            username: "alice".to_string(),
            password: "secret".to_string(),
            full_name: "Alice Smith".to_string(),
            id_card: "1234567890123".to_string(),
            license_plate: "1AB-234".to_string(),
            phone: "555-0101".to_string(),
            role: ROLE_DRIVER.to_string(),
        };
        let row = driver.to_row();
        assert_eq!(row.len(), ROW_WIDTH);

        let decoded = Driver::from_row(&row);
        assert_eq!(decoded.driver_id, "DRV-001");
        assert_eq!(decoded.username, "alice");
        assert_eq!(decoded.role, ROLE_DRIVER);
    }

    #[test]
    fn test_from_ragged_row() {
        let driver = Driver::from_row(&["DRV-002".to_string()]);
        assert_eq!(driver.driver_id, "DRV-002");
        assert_eq!(driver.username, "");
        assert_eq!(driver.role, "");
    }

    #[test]
    fn test_identity_projection() {
        let mut driver = Driver::from_row(&[]);
        driver.driver_id = "DRV-003".to_string();
        driver.full_name = "Bob".to_string();
        driver.role = ROLE_DRIVER.to_string();

        let identity = driver.identity();
        assert_eq!(identity.id, "DRV-003");
        assert_eq!(identity.full_name, "Bob");
        assert_eq!(identity.role, "driver");
    }
}
