use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Row, mysql::MySqlRow};
use strum_macros::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

use crate::model::{Paging, decode_text};

#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display, EnumString, AsRefStr, ToSchema,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum AttendanceStatus {
    Present,
    Absent,
    HalfDay,
    Leave,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Attendance {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = 3)]
    pub employee_id: u64,
    #[schema(example = "2026-01-05", format = "date", value_type = String)]
    pub date: NaiveDate,
    #[schema(example = "09:01:12", value_type = String)]
    pub check_in_time: NaiveTime,
    #[schema(example = "17:30:00", value_type = String, nullable = true)]
    pub check_out_time: Option<NaiveTime>,
    pub status: AttendanceStatus,
}

impl Attendance {
    pub fn is_closed(&self) -> bool {
        self.check_out_time.is_some()
    }
}

impl<'r> FromRow<'r, MySqlRow> for Attendance {
    fn from_row(row: &'r MySqlRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            employee_id: row.try_get("employee_id")?,
            date: row.try_get("date")?,
            check_in_time: row.try_get("check_in_time")?,
            check_out_time: row.try_get("check_out_time")?,
            status: decode_text(row, "status")?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct NewAttendance {
    pub employee_id: u64,
    pub date: NaiveDate,
    pub check_in_time: NaiveTime,
    pub status: AttendanceStatus,
}

#[derive(Debug, Clone, Default)]
pub struct AttendanceFilter {
    pub employee_id: Option<u64>,
    pub date: Option<NaiveDate>,
    pub paging: Option<Paging>,
}
