use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::model::Paging;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Payroll {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = 3)]
    pub employee_id: u64,
    #[schema(example = 50000)]
    pub basic_salary: i64,
    #[schema(example = 2000)]
    pub deductions: i64,
    #[schema(example = 48000)]
    pub net_salary: i64,
    #[schema(example = "2026-01")]
    pub month: String,
}

impl Payroll {
    /// Net pay is always derived, never supplied. Negative results are kept.
    pub fn net(basic_salary: i64, deductions: i64) -> i64 {
        basic_salary - deductions
    }
}

#[derive(Debug, Clone)]
pub struct NewPayroll {
    pub employee_id: u64,
    pub basic_salary: i64,
    pub deductions: i64,
    pub month: String,
}

#[derive(Debug, Clone, Default)]
pub struct PayrollFilter {
    pub employee_id: Option<u64>,
    pub month: Option<String>,
    pub paging: Option<Paging>,
}
