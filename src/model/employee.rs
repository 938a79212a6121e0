use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::model::{Paging, user::NewAccount};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "user_id": 7,
        "company_id": 1,
        "employee_code": "ENG0042",
        "full_name": "Jane Doe",
        "department": "Engineering",
        "job_title": "Backend Engineer",
        "salary": 5000,
        "year_of_joining": 2026
    })
)]
pub struct EmployeeProfile {
    pub id: u64,
    pub user_id: u64,
    pub company_id: u64,
    pub employee_code: String,
    pub full_name: String,
    pub department: String,
    pub job_title: String,
    pub salary: i64,
    pub year_of_joining: i32,
}

/// A profile plus the login it owns; both are created together.
#[derive(Debug, Clone)]
pub struct NewEmployee {
    pub company_id: u64,
    pub account: NewAccount,
    pub employee_code: String,
    pub department: String,
    pub job_title: String,
    pub salary: i64,
    pub year_of_joining: i32,
}

#[derive(Debug, Clone, Default)]
pub struct EmployeeFilter {
    pub department: Option<String>,
    /// Substring match on full name or employee code
    pub search: Option<String>,
    pub paging: Option<Paging>,
}
