use actix_web::{HttpResponse, web};

use crate::{
    auth::auth::AuthUser,
    error::AppError,
    model::Paging,
    repository::Store,
    service::payroll::{self, CreatePayroll, PayrollQuery, UpdatePayroll},
};

/// Create a payroll entry; net_salary is derived from the inputs
#[utoipa::path(
    post,
    path = "/api/payroll",
    request_body = CreatePayroll,
    responses(
        (status = 201, description = "Payroll created", body = crate::model::payroll::Payroll),
        (status = 400, description = "Invalid month or amounts"),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Employee not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Payroll"
)]
pub async fn create_payroll(
    auth: AuthUser,
    store: web::Data<dyn Store>,
    payload: web::Json<CreatePayroll>,
) -> Result<HttpResponse, AppError> {
    let created = payroll::create(store.get_ref(), &auth.user, payload.into_inner()).await?;
    Ok(HttpResponse::Created().json(created))
}

#[utoipa::path(
    put,
    path = "/api/payroll/{id}",
    params(
        ("id" = u64, Path, description = "Payroll ID")
    ),
    request_body = UpdatePayroll,
    responses(
        (status = 200, description = "Payroll updated, net_salary recomputed", body = crate::model::payroll::Payroll),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Payroll not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Payroll"
)]
pub async fn update_payroll(
    auth: AuthUser,
    store: web::Data<dyn Store>,
    path: web::Path<u64>,
    payload: web::Json<UpdatePayroll>,
) -> Result<HttpResponse, AppError> {
    let updated = payroll::update(
        store.get_ref(),
        &auth.user,
        path.into_inner(),
        payload.into_inner(),
    )
    .await?;
    Ok(HttpResponse::Ok().json(updated))
}

#[utoipa::path(
    get,
    path = "/api/payroll/{id}",
    params(
        ("id" = u64, Path, description = "Payroll ID")
    ),
    responses(
        (status = 200, description = "Payroll", body = crate::model::payroll::Payroll),
        (status = 404, description = "Payroll not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Payroll"
)]
pub async fn get_payroll(
    auth: AuthUser,
    store: web::Data<dyn Store>,
    path: web::Path<u64>,
) -> Result<HttpResponse, AppError> {
    let found = payroll::get(store.get_ref(), &auth.user, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(found))
}

#[utoipa::path(
    get,
    path = "/api/payroll",
    params(PayrollQuery),
    responses(
        (status = 200, description = "Company payroll", body = crate::service::PayrollListResponse),
        (status = 403, description = "Admin only")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Payroll"
)]
pub async fn list_payrolls(
    auth: AuthUser,
    store: web::Data<dyn Store>,
    query: web::Query<PayrollQuery>,
) -> Result<HttpResponse, AppError> {
    let listing = payroll::company_payroll(store.get_ref(), &auth.user, query.into_inner()).await?;
    Ok(HttpResponse::Ok().json(listing))
}

#[utoipa::path(
    get,
    path = "/api/payroll/me",
    params(Paging),
    responses(
        (status = 200, description = "Caller's payroll", body = crate::service::PayrollListResponse),
        (status = 403, description = "Employees only")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Payroll"
)]
pub async fn my_payroll(
    auth: AuthUser,
    store: web::Data<dyn Store>,
    paging: web::Query<Paging>,
) -> Result<HttpResponse, AppError> {
    let listing = payroll::my_payroll(store.get_ref(), &auth.user, paging.into_inner()).await?;
    Ok(HttpResponse::Ok().json(listing))
}
