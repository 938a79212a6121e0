pub mod attendance;
pub mod company;
pub mod employee;
pub mod leave_request;
pub mod payroll;
pub mod role;
pub mod user;

use std::str::FromStr;

use serde::Deserialize;
use sqlx::{Row, mysql::MySqlRow};
use utoipa::IntoParams;

/// Reads a text column into one of the closed enums (role, statuses, leave type).
pub(crate) fn decode_text<T>(row: &MySqlRow, column: &str) -> Result<T, sqlx::Error>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw: String = row.try_get(column)?;
    raw.parse().map_err(|e| sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(e),
    })
}

/// Page selection shared by every list query.
#[derive(Debug, Clone, Copy, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct Paging {
    /// Page number, starting at 1
    pub page: Option<u32>,
    /// Items per page (1..=100)
    pub per_page: Option<u32>,
}

impl Paging {
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn per_page(&self) -> u32 {
        self.per_page.unwrap_or(20).clamp(1, 100)
    }

    pub fn offset(&self) -> u64 {
        (self.page() as u64 - 1) * self.per_page() as u64
    }
}
