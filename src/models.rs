use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::model::{company::Company, role::Role, user::User};

/// Session token payload. Identity is only ever taken from here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    pub user_id: u64,
    pub company_id: u64,
    pub role: Role,
    pub exp: usize,
    pub iat: usize,
    pub jti: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SignupRequest {
    #[schema(example = "Acme")]
    pub company_name: String,
    #[schema(example = "Ada Admin")]
    pub admin_name: String,
    #[validate(email(message = "email must be a valid address"))]
    #[schema(example = "ada@acme.io", format = "email")]
    pub email: String,
    #[schema(example = "correct-horse", format = "password")]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(email(message = "email must be a valid address"))]
    #[schema(example = "ada@acme.io", format = "email")]
    pub email: String,
    #[schema(example = "correct-horse", format = "password")]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    pub access_token: String,
    #[schema(example = "bearer")]
    pub token_type: String,
    pub role: Role,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ChangePasswordRequest {
    #[schema(format = "password")]
    pub current_password: String,
    #[schema(format = "password")]
    pub new_password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SignupResponse {
    pub company: Company,
    pub admin: User,
}
