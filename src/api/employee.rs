use actix_web::{HttpResponse, web};
use chrono::Local;
use serde_json::json;

use crate::{
    auth::auth::AuthUser,
    error::AppError,
    repository::Store,
    service::employee::{self, CreateEmployee, EmployeeQuery, UpdateEmployee},
};

/// Create Employee
#[utoipa::path(
    post,
    path = "/api/employees",
    request_body = CreateEmployee,
    responses(
        (status = 201, description = "Employee created; temporary_password is only present when generated", body = crate::service::employee::CreatedEmployee),
        (status = 400, description = "Validation failed"),
        (status = 403, description = "Admin only"),
        (status = 409, description = "Email or employee code already in use")
    ),
    tag = "Employee",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_employee(
    auth: AuthUser,
    store: web::Data<dyn Store>,
    payload: web::Json<CreateEmployee>,
) -> Result<HttpResponse, AppError> {
    let today = Local::now().date_naive();
    let created =
        employee::create_employee(store.get_ref(), &auth.user, payload.into_inner(), today).await?;
    Ok(HttpResponse::Created().json(created))
}

#[utoipa::path(
    get,
    path = "/api/employees",
    params(EmployeeQuery),
    responses(
        (status = 200, description = "Paginated employee list", body = crate::service::EmployeeListResponse),
        (status = 403, description = "Admin only")
    ),
    tag = "Employee",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_employees(
    auth: AuthUser,
    store: web::Data<dyn Store>,
    query: web::Query<EmployeeQuery>,
) -> Result<HttpResponse, AppError> {
    let listing = employee::list_employees(store.get_ref(), &auth.user, query.into_inner()).await?;
    Ok(HttpResponse::Ok().json(listing))
}

#[utoipa::path(
    get,
    path = "/api/employees/me",
    responses(
        (status = 200, description = "Caller's employee profile", body = crate::model::employee::EmployeeProfile),
        (status = 403, description = "Employees only"),
        (status = 404, description = "Employee profile not found")
    ),
    tag = "Employee",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn my_profile(
    auth: AuthUser,
    store: web::Data<dyn Store>,
) -> Result<HttpResponse, AppError> {
    let profile = employee::my_profile(store.get_ref(), &auth.user).await?;
    Ok(HttpResponse::Ok().json(profile))
}

#[utoipa::path(
    get,
    path = "/api/employees/{id}",
    params(
        ("id" = u64, Path, description = "Employee ID")
    ),
    responses(
        (status = 200, description = "Employee found", body = crate::model::employee::EmployeeProfile),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Employee not found")
    ),
    tag = "Employee",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_employee(
    auth: AuthUser,
    store: web::Data<dyn Store>,
    path: web::Path<u64>,
) -> Result<HttpResponse, AppError> {
    let profile = employee::get_employee(store.get_ref(), &auth.user, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(profile))
}

#[utoipa::path(
    put,
    path = "/api/employees/{id}",
    params(
        ("id" = u64, Path, description = "Employee ID")
    ),
    request_body = UpdateEmployee,
    responses(
        (status = 200, description = "Employee updated", body = crate::model::employee::EmployeeProfile),
        (status = 400, description = "Validation failed"),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Employee not found")
    ),
    tag = "Employee",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_employee(
    auth: AuthUser,
    store: web::Data<dyn Store>,
    path: web::Path<u64>,
    payload: web::Json<UpdateEmployee>,
) -> Result<HttpResponse, AppError> {
    let profile = employee::update_employee(
        store.get_ref(),
        &auth.user,
        path.into_inner(),
        payload.into_inner(),
    )
    .await?;
    Ok(HttpResponse::Ok().json(profile))
}

/// Deactivates the employee's login; the profile is kept.
#[utoipa::path(
    delete,
    path = "/api/employees/{id}",
    params(
        ("id" = u64, Path, description = "Employee ID")
    ),
    responses(
        (status = 200, description = "Employee deactivated", body = Object, example = json!({
            "message": "Employee deactivated"
        })),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Employee not found")
    ),
    tag = "Employee",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn deactivate_employee(
    auth: AuthUser,
    store: web::Data<dyn Store>,
    path: web::Path<u64>,
) -> Result<HttpResponse, AppError> {
    employee::deactivate_employee(store.get_ref(), &auth.user, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Employee deactivated" })))
}

/// Reset Employee Password
#[utoipa::path(
    post,
    path = "/api/employees/{id}/reset-password",
    params(
        ("id" = u64, Path, description = "Employee ID")
    ),
    responses(
        (status = 200, description = "New temporary password, shown once", body = crate::service::employee::PasswordReset),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Employee not found")
    ),
    tag = "Employee",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn reset_password(
    auth: AuthUser,
    store: web::Data<dyn Store>,
    path: web::Path<u64>,
) -> Result<HttpResponse, AppError> {
    let reset = employee::reset_password(store.get_ref(), &auth.user, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(reset))
}
