use actix_web::{HttpResponse, web};
use serde_json::json;

use crate::{
    auth::auth::AuthUser,
    config::Config,
    error::AppError,
    models::{ChangePasswordRequest, LoginRequest, SignupRequest, SignupResponse},
    repository::Store,
    service::account,
};

/// Register a company together with its first admin
#[utoipa::path(
    post,
    path = "/auth/company-signup",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "Company and admin created", body = SignupResponse),
        (status = 400, description = "Validation failed"),
        (status = 409, description = "Company or email already registered", body = Object, example = json!({
            "error": "conflict",
            "message": "Company already exists"
        }))
    ),
    tag = "Auth"
)]
pub async fn company_signup(
    store: web::Data<dyn Store>,
    payload: web::Json<SignupRequest>,
) -> Result<HttpResponse, AppError> {
    let (company, admin) = account::company_signup(store.get_ref(), &payload).await?;
    Ok(HttpResponse::Created().json(SignupResponse { company, admin }))
}

#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Bearer token issued", body = crate::models::TokenResponse),
        (status = 401, description = "Invalid email or password")
    ),
    tag = "Auth"
)]
pub async fn login(
    store: web::Data<dyn Store>,
    config: web::Data<Config>,
    payload: web::Json<LoginRequest>,
) -> Result<HttpResponse, AppError> {
    let token = account::login(store.get_ref(), &config, &payload).await?;
    Ok(HttpResponse::Ok().json(token))
}

/// The authenticated user
#[utoipa::path(
    get,
    path = "/api/me",
    responses(
        (status = 200, description = "Current user", body = crate::model::user::User),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Auth"
)]
pub async fn me(auth: AuthUser) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(auth.user))
}

#[utoipa::path(
    put,
    path = "/api/me/password",
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed", body = Object, example = json!({
            "message": "Password updated"
        })),
        (status = 400, description = "New password too short"),
        (status = 401, description = "Current password is incorrect")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Auth"
)]
pub async fn change_password(
    auth: AuthUser,
    store: web::Data<dyn Store>,
    payload: web::Json<ChangePasswordRequest>,
) -> Result<HttpResponse, AppError> {
    account::change_password(store.get_ref(), &auth.user, &payload).await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Password updated" })))
}
