use actix_web::{HttpResponse, web};

use crate::{
    auth::auth::AuthUser,
    error::AppError,
    model::Paging,
    repository::Store,
    service::leave::{self, ApplyLeave, DecideLeave, LeaveQuery},
};

/// An empty body carries no comment; anything else must be a valid `DecideLeave`.
fn decision_from_body(body: &[u8]) -> Result<DecideLeave, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(DecideLeave::default());
    }
    serde_json::from_slice(body)
        .map_err(|e| AppError::validation(format!("Invalid request body: {}", e)))
}

/// Apply for leave
#[utoipa::path(
    post,
    path = "/api/leave",
    request_body = ApplyLeave,
    responses(
        (status = 201, description = "Leave request created", body = crate::model::leave_request::LeaveRequest),
        (status = 400, description = "start_date is after end_date"),
        (status = 403, description = "Employees only")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn create_leave(
    auth: AuthUser,
    store: web::Data<dyn Store>,
    payload: web::Json<ApplyLeave>,
) -> Result<HttpResponse, AppError> {
    let leave = leave::apply(store.get_ref(), &auth.user, payload.into_inner()).await?;
    Ok(HttpResponse::Created().json(leave))
}

#[utoipa::path(
    get,
    path = "/api/leave",
    params(LeaveQuery),
    responses(
        (status = 200, description = "Company leave requests", body = crate::service::LeaveListResponse),
        (status = 403, description = "Admin only")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn leave_list(
    auth: AuthUser,
    store: web::Data<dyn Store>,
    query: web::Query<LeaveQuery>,
) -> Result<HttpResponse, AppError> {
    let listing = leave::company_leaves(store.get_ref(), &auth.user, query.into_inner()).await?;
    Ok(HttpResponse::Ok().json(listing))
}

#[utoipa::path(
    get,
    path = "/api/leave/me",
    params(Paging),
    responses(
        (status = 200, description = "Caller's leave requests", body = crate::service::LeaveListResponse),
        (status = 403, description = "Employees only")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn my_leaves(
    auth: AuthUser,
    store: web::Data<dyn Store>,
    paging: web::Query<Paging>,
) -> Result<HttpResponse, AppError> {
    let listing = leave::my_leaves(store.get_ref(), &auth.user, paging.into_inner()).await?;
    Ok(HttpResponse::Ok().json(listing))
}

/// Admins may read any request of their company, employees only their own
#[utoipa::path(
    get,
    path = "/api/leave/{id}",
    params(
        ("id" = u64, Path, description = "Leave request ID")
    ),
    responses(
        (status = 200, description = "Leave request", body = crate::model::leave_request::LeaveRequest),
        (status = 404, description = "Leave request not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn get_leave(
    auth: AuthUser,
    store: web::Data<dyn Store>,
    path: web::Path<u64>,
) -> Result<HttpResponse, AppError> {
    let leave = leave::get_leave(store.get_ref(), &auth.user, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(leave))
}

#[utoipa::path(
    put,
    path = "/api/leave/{id}/approve",
    params(
        ("id" = u64, Path, description = "Leave request ID")
    ),
    request_body(content = DecideLeave, description = "Optional; an empty body means no comment"),
    responses(
        (status = 200, description = "Leave approved", body = crate::model::leave_request::LeaveRequest),
        (status = 400, description = "Malformed body or leave request already decided"),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Leave request not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn approve_leave(
    auth: AuthUser,
    store: web::Data<dyn Store>,
    path: web::Path<u64>,
    body: web::Bytes,
) -> Result<HttpResponse, AppError> {
    let decision = decision_from_body(&body)?;
    let leave = leave::approve(store.get_ref(), &auth.user, path.into_inner(), decision).await?;
    Ok(HttpResponse::Ok().json(leave))
}

#[utoipa::path(
    put,
    path = "/api/leave/{id}/reject",
    params(
        ("id" = u64, Path, description = "Leave request ID")
    ),
    request_body(content = DecideLeave, description = "Optional; an empty body means no comment"),
    responses(
        (status = 200, description = "Leave rejected", body = crate::model::leave_request::LeaveRequest),
        (status = 400, description = "Malformed body or leave request already decided"),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Leave request not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn reject_leave(
    auth: AuthUser,
    store: web::Data<dyn Store>,
    path: web::Path<u64>,
    body: web::Bytes,
) -> Result<HttpResponse, AppError> {
    let decision = decision_from_body(&body)?;
    let leave = leave::reject(store.get_ref(), &auth.user, path.into_inner(), decision).await?;
    Ok(HttpResponse::Ok().json(leave))
}
