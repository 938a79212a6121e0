use crate::auth::jwt::validate_token;
use crate::config::Config;
use crate::error::AppError;
use actix_web::middleware::Next;
use actix_web::{
    Error, HttpMessage, ResponseError,
    body::BoxBody,
    dev::{ServiceRequest, ServiceResponse},
    web::Data,
};

/// Rejects requests without a valid bearer token and stores the verified
/// `Claims` in request extensions.
pub async fn auth_middleware(
    req: ServiceRequest,
    next: Next<BoxBody>,
) -> Result<ServiceResponse<BoxBody>, Error> {
    let config = req
        .app_data::<Data<Config>>()
        .ok_or_else(|| AppError::internal("App config missing"))?
        .clone();

    let header_value = match req.headers().get("Authorization") {
        Some(h) => match h.to_str() {
            Ok(v) => v.to_string(),
            Err(_) => {
                let resp =
                    AppError::unauthenticated("Invalid Authorization header encoding").error_response();
                return Ok(req.into_response(resp));
            }
        },
        None => {
            let resp = AppError::unauthenticated("Missing Authorization header").error_response();
            return Ok(req.into_response(resp));
        }
    };

    let token = match header_value.strip_prefix("Bearer ") {
        Some(t) => t,
        None => {
            let resp = AppError::unauthenticated("Authorization header must start with Bearer")
                .error_response();
            return Ok(req.into_response(resp));
        }
    };

    let claims = match validate_token(token, &config.jwt_secret) {
        Ok(c) => c,
        Err(e) => return Ok(req.into_response(e.error_response())),
    };

    req.extensions_mut().insert(claims);

    next.call(req).await
}
