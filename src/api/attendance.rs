use actix_web::{HttpResponse, web};
use chrono::Local;

use crate::{
    auth::auth::AuthUser,
    error::AppError,
    model::Paging,
    repository::Store,
    service::attendance::{self, AttendanceQuery},
};

/// Check-in endpoint
#[utoipa::path(
    post,
    path = "/api/attendance/check-in",
    responses(
        (status = 201, description = "Checked in successfully", body = crate::model::attendance::Attendance),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Employees only"),
        (status = 409, description = "Already checked in today", body = Object, example = json!({
            "error": "conflict",
            "message": "Already checked in today"
        }))
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn check_in(
    auth: AuthUser,
    store: web::Data<dyn Store>,
) -> Result<HttpResponse, AppError> {
    let now = Local::now().naive_local();
    let record = attendance::check_in(store.get_ref(), &auth.user, now).await?;
    Ok(HttpResponse::Created().json(record))
}

/// Check-out endpoint
#[utoipa::path(
    post,
    path = "/api/attendance/check-out",
    responses(
        (status = 200, description = "Checked out successfully", body = crate::model::attendance::Attendance),
        (status = 400, description = "No open check-in for today", body = Object, example = json!({
            "error": "invalid_state",
            "message": "You have not checked in today"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Employees only")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn check_out(
    auth: AuthUser,
    store: web::Data<dyn Store>,
) -> Result<HttpResponse, AppError> {
    let now = Local::now().naive_local();
    let record = attendance::check_out(store.get_ref(), &auth.user, now).await?;
    Ok(HttpResponse::Ok().json(record))
}

#[utoipa::path(
    get,
    path = "/api/attendance/me",
    params(Paging),
    responses(
        (status = 200, description = "Caller's attendance, newest first", body = crate::service::AttendanceListResponse),
        (status = 403, description = "Employees only")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn my_attendance(
    auth: AuthUser,
    store: web::Data<dyn Store>,
    paging: web::Query<Paging>,
) -> Result<HttpResponse, AppError> {
    let listing = attendance::my_attendance(store.get_ref(), &auth.user, paging.into_inner()).await?;
    Ok(HttpResponse::Ok().json(listing))
}

#[utoipa::path(
    get,
    path = "/api/attendance",
    params(AttendanceQuery),
    responses(
        (status = 200, description = "Company attendance", body = crate::service::AttendanceListResponse),
        (status = 403, description = "Admin only")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn company_attendance(
    auth: AuthUser,
    store: web::Data<dyn Store>,
    query: web::Query<AttendanceQuery>,
) -> Result<HttpResponse, AppError> {
    let listing =
        attendance::company_attendance(store.get_ref(), &auth.user, query.into_inner()).await?;
    Ok(HttpResponse::Ok().json(listing))
}
