use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::{IntoParams, ToSchema};

use crate::{
    auth::policy::require_role,
    error::AppError,
    model::{
        Paging,
        leave_request::{LeaveFilter, LeaveRequest, LeaveStatus, LeaveType, NewLeave},
        role::Role,
        user::User,
    },
    repository::{Store, StoreError},
    service::{Listing, own_profile},
};

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct ApplyLeave {
    pub leave_type: LeaveType,
    #[schema(example = "2026-01-01", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2026-01-03", format = "date", value_type = String)]
    pub end_date: NaiveDate,
}

#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct DecideLeave {
    #[schema(example = "Enjoy your time off")]
    pub admin_comment: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LeaveQuery {
    #[param(value_type = Option<String>, example = "pending")]
    pub status: Option<LeaveStatus>,
    pub employee_id: Option<u64>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

#[instrument(name = "apply_leave", skip(store, user, req), fields(user_id = user.id))]
pub async fn apply(
    store: &dyn Store,
    user: &User,
    req: ApplyLeave,
) -> Result<LeaveRequest, AppError> {
    let employee = own_profile(store, user).await?;

    if req.start_date > req.end_date {
        return Err(AppError::validation("start_date must not be after end_date"));
    }

    let leave = store
        .leaves()
        .create(NewLeave {
            employee_id: employee.id,
            leave_type: req.leave_type,
            start_date: req.start_date,
            end_date: req.end_date,
        })
        .await?;

    info!(leave_id = leave.id, employee_id = employee.id, "Leave requested");
    Ok(leave)
}

pub async fn my_leaves(
    store: &dyn Store,
    user: &User,
    paging: Paging,
) -> Result<Listing<LeaveRequest>, AppError> {
    let employee = own_profile(store, user).await?;

    let filter = LeaveFilter {
        employee_id: Some(employee.id),
        status: None,
        paging: Some(paging),
    };
    list(store, user.company_id, filter, paging).await
}

pub async fn company_leaves(
    store: &dyn Store,
    admin: &User,
    query: LeaveQuery,
) -> Result<Listing<LeaveRequest>, AppError> {
    require_role(admin, Role::Admin)?;

    let paging = Paging {
        page: query.page,
        per_page: query.per_page,
    };
    let filter = LeaveFilter {
        employee_id: query.employee_id,
        status: query.status,
        paging: Some(paging),
    };
    list(store, admin.company_id, filter, paging).await
}

async fn list(
    store: &dyn Store,
    company_id: u64,
    filter: LeaveFilter,
    paging: Paging,
) -> Result<Listing<LeaveRequest>, AppError> {
    let repo = store.leaves();
    let data = repo.find_own(company_id, &filter).await?;
    let total = repo.count_own(company_id, &filter).await?;
    Ok(Listing::new(data, total, &paging))
}

fn not_found() -> AppError {
    AppError::not_found("Leave request not found")
}

async fn find_in_company(
    store: &dyn Store,
    company_id: u64,
    id: u64,
) -> Result<LeaveRequest, AppError> {
    store
        .leaves()
        .find_by_id_scoped(company_id, id)
        .await
        .map_err(|e| match e {
            StoreError::NotFound => not_found(),
            e => e.into(),
        })
}

/// Admins see any request of their company, employees only their own.
pub async fn get_leave(store: &dyn Store, user: &User, id: u64) -> Result<LeaveRequest, AppError> {
    match user.role {
        Role::Admin => find_in_company(store, user.company_id, id).await,
        Role::Employee => {
            let employee = own_profile(store, user).await?;
            let leave = find_in_company(store, user.company_id, id).await?;
            if leave.employee_id != employee.id {
                return Err(not_found());
            }
            Ok(leave)
        }
    }
}

pub async fn approve(
    store: &dyn Store,
    admin: &User,
    id: u64,
    req: DecideLeave,
) -> Result<LeaveRequest, AppError> {
    decide(store, admin, id, LeaveStatus::Approved, req.admin_comment).await
}

pub async fn reject(
    store: &dyn Store,
    admin: &User,
    id: u64,
    req: DecideLeave,
) -> Result<LeaveRequest, AppError> {
    decide(store, admin, id, LeaveStatus::Rejected, req.admin_comment).await
}

#[instrument(name = "decide_leave", skip(store, admin, comment), fields(company_id = admin.company_id))]
async fn decide(
    store: &dyn Store,
    admin: &User,
    id: u64,
    status: LeaveStatus,
    comment: Option<String>,
) -> Result<LeaveRequest, AppError> {
    require_role(admin, Role::Admin)?;

    let mut leave = find_in_company(store, admin.company_id, id).await?;
    let already = || AppError::invalid_state(format!("Leave request already {}", leave.status));
    if leave.status.is_terminal() {
        return Err(already());
    }

    let previous = leave.status;
    leave.status = status;
    leave.admin_comment = comment;
    store
        .leaves()
        .update(admin.company_id, &leave)
        .await
        .map_err(|e| match e {
            StoreError::Stale => AppError::invalid_state("Leave request already decided"),
            e => e.into(),
        })?;

    info!(leave_id = leave.id, from = %previous, to = %leave.status, "Leave decided");
    Ok(leave)
}
