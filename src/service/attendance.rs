use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;
use tracing::{info, instrument};
use utoipa::IntoParams;

use crate::{
    auth::policy::require_role,
    error::AppError,
    model::{
        Paging,
        attendance::{Attendance, AttendanceFilter, AttendanceStatus, NewAttendance},
        role::Role,
        user::User,
    },
    repository::{StoreError, Store},
    service::{Listing, own_profile},
};

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AttendanceQuery {
    /// Only records of this day
    #[param(value_type = Option<String>, format = Date)]
    pub date: Option<NaiveDate>,
    pub employee_id: Option<u64>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

/// Opens today's record. A second check-in on the same day hits the
/// `(employee_id, date)` unique key and is reported as a conflict.
#[instrument(name = "check_in", skip(store, user), fields(user_id = user.id))]
pub async fn check_in(
    store: &dyn Store,
    user: &User,
    now: NaiveDateTime,
) -> Result<Attendance, AppError> {
    let employee = own_profile(store, user).await?;

    let record = store
        .attendance()
        .create(NewAttendance {
            employee_id: employee.id,
            date: now.date(),
            check_in_time: now.time(),
            status: AttendanceStatus::Present,
        })
        .await?;

    info!(employee_id = employee.id, date = %record.date, "Checked in");
    Ok(record)
}

#[instrument(name = "check_out", skip(store, user), fields(user_id = user.id))]
pub async fn check_out(
    store: &dyn Store,
    user: &User,
    now: NaiveDateTime,
) -> Result<Attendance, AppError> {
    let employee = own_profile(store, user).await?;

    let filter = AttendanceFilter {
        employee_id: Some(employee.id),
        date: Some(now.date()),
        paging: None,
    };
    let mut record = store
        .attendance()
        .find_own(user.company_id, &filter)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| AppError::invalid_state("You have not checked in today"))?;

    if record.is_closed() {
        return Err(AppError::invalid_state("Already checked out today"));
    }

    record.check_out_time = Some(now.time());
    store
        .attendance()
        .update(user.company_id, &record)
        .await
        .map_err(|e| match e {
            StoreError::Stale => AppError::invalid_state("Already checked out today"),
            e => e.into(),
        })?;

    info!(employee_id = employee.id, date = %record.date, "Checked out");
    Ok(record)
}

pub async fn my_attendance(
    store: &dyn Store,
    user: &User,
    paging: Paging,
) -> Result<Listing<Attendance>, AppError> {
    let employee = own_profile(store, user).await?;

    let filter = AttendanceFilter {
        employee_id: Some(employee.id),
        date: None,
        paging: Some(paging),
    };
    list(store, user.company_id, filter, paging).await
}

pub async fn company_attendance(
    store: &dyn Store,
    admin: &User,
    query: AttendanceQuery,
) -> Result<Listing<Attendance>, AppError> {
    require_role(admin, Role::Admin)?;

    let paging = Paging {
        page: query.page,
        per_page: query.per_page,
    };
    let filter = AttendanceFilter {
        employee_id: query.employee_id,
        date: query.date,
        paging: Some(paging),
    };
    list(store, admin.company_id, filter, paging).await
}

async fn list(
    store: &dyn Store,
    company_id: u64,
    filter: AttendanceFilter,
    paging: Paging,
) -> Result<Listing<Attendance>, AppError> {
    let repo = store.attendance();
    let data = repo.find_own(company_id, &filter).await?;
    let total = repo.count_own(company_id, &filter).await?;
    Ok(Listing::new(data, total, &paging))
}
