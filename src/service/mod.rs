//! Workflow handlers. Each operation resolves its role requirement first,
//! then touches the store only through the caller's `company_id`.

pub mod account;
pub mod attendance;
pub mod employee;
pub mod leave;
pub mod payroll;
pub mod report;

use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    auth::policy::require_role,
    error::AppError,
    model::{
        Paging, attendance::Attendance, employee::EmployeeProfile, leave_request::LeaveRequest,
        payroll::Payroll, role::Role, user::User,
    },
    repository::Store,
};

/// One page of a tenant-scoped list.
#[derive(Debug, Serialize, ToSchema)]
#[aliases(
    EmployeeListResponse = Listing<EmployeeProfile>,
    AttendanceListResponse = Listing<Attendance>,
    LeaveListResponse = Listing<LeaveRequest>,
    PayrollListResponse = Listing<Payroll>
)]
pub struct Listing<T> {
    pub data: Vec<T>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 20)]
    pub per_page: u32,
    #[schema(example = 1)]
    pub total: i64,
}

impl<T> Listing<T> {
    pub fn new(data: Vec<T>, total: i64, paging: &Paging) -> Self {
        Self {
            data,
            page: paging.page(),
            per_page: paging.per_page(),
            total,
        }
    }
}

/// The caller's own employee profile; employees only.
pub(crate) async fn own_profile(store: &dyn Store, user: &User) -> Result<EmployeeProfile, AppError> {
    require_role(user, Role::Employee)?;

    store
        .employees()
        .find_by_user(user.company_id, user.id)
        .await?
        .ok_or_else(|| AppError::not_found("Employee profile not found"))
}
