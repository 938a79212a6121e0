use chrono::NaiveDate;
use serde::Serialize;
use tracing::instrument;
use utoipa::ToSchema;

use crate::{
    auth::policy::require_role,
    error::AppError,
    model::{
        attendance::AttendanceFilter, employee::EmployeeFilter, leave_request::LeaveFilter,
        leave_request::LeaveStatus, payroll::PayrollFilter, role::Role, user::User,
    },
    repository::Store,
};

/// Headline counts for the admin dashboard, all within the admin's company.
#[derive(Debug, Serialize, ToSchema, PartialEq)]
pub struct DashboardReport {
    #[schema(example = 42)]
    pub total_employees: i64,
    #[schema(example = 37)]
    pub today_attendance: i64,
    #[schema(example = 3)]
    pub pending_leaves: i64,
    #[schema(example = 120)]
    pub total_payrolls: i64,
}

#[instrument(name = "dashboard", skip(store, admin), fields(company_id = admin.company_id))]
pub async fn dashboard(
    store: &dyn Store,
    admin: &User,
    today: NaiveDate,
) -> Result<DashboardReport, AppError> {
    require_role(admin, Role::Admin)?;
    let company_id = admin.company_id;

    let total_employees = store
        .employees()
        .count_own(company_id, &EmployeeFilter::default())
        .await?;
    let today_attendance = store
        .attendance()
        .count_own(
            company_id,
            &AttendanceFilter {
                date: Some(today),
                ..Default::default()
            },
        )
        .await?;
    let pending_leaves = store
        .leaves()
        .count_own(
            company_id,
            &LeaveFilter {
                status: Some(LeaveStatus::Pending),
                ..Default::default()
            },
        )
        .await?;
    let total_payrolls = store
        .payrolls()
        .count_own(company_id, &PayrollFilter::default())
        .await?;

    Ok(DashboardReport {
        total_employees,
        today_attendance,
        pending_leaves,
        total_payrolls,
    })
}
