use tracing::{info, instrument};
use validator::Validate;

use crate::{
    auth::{
        jwt::issue_token,
        password::{hash_password, verify_password},
    },
    config::Config,
    error::AppError,
    model::{
        company::Company,
        user::{NewAccount, User},
    },
    models::{ChangePasswordRequest, LoginRequest, SignupRequest, TokenResponse},
    repository::Store,
};

pub const MIN_PASSWORD_LEN: usize = 8;

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub(crate) fn validate_password(password: &str) -> Result<(), AppError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}

pub(crate) fn required_text<'a>(value: &'a str, field: &str) -> Result<&'a str, AppError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::validation(format!("{} must not be empty", field)));
    }
    Ok(value)
}

/// Creates a company together with its first admin.
#[instrument(name = "company_signup", skip(store, req), fields(company = %req.company_name))]
pub async fn company_signup(
    store: &dyn Store,
    req: &SignupRequest,
) -> Result<(Company, User), AppError> {
    req.validate()?;
    let company_name = required_text(&req.company_name, "company_name")?;
    let admin_name = required_text(&req.admin_name, "admin_name")?;
    let email = normalize_email(required_text(&req.email, "email")?);
    validate_password(&req.password)?;

    let account = NewAccount {
        email,
        password_hash: hash_password(&req.password)?,
        full_name: admin_name.to_string(),
    };

    let (company, admin) = store
        .companies()
        .create_with_admin(company_name, account)
        .await?;

    info!(company_id = company.id, admin_id = admin.id, "Company registered");
    Ok((company, admin))
}

#[instrument(name = "auth_login", skip(store, config, req))]
pub async fn login(
    store: &dyn Store,
    config: &Config,
    req: &LoginRequest,
) -> Result<TokenResponse, AppError> {
    req.validate()?;
    let invalid = || AppError::unauthenticated("Invalid email or password");

    let user = store
        .users()
        .find_by_email(&normalize_email(&req.email))
        .await?
        .ok_or_else(invalid)?;

    if !verify_password(&req.password, &user.password_hash) {
        info!(user_id = user.id, "Invalid credentials: password mismatch");
        return Err(invalid());
    }

    if !user.is_active {
        info!(user_id = user.id, "Login refused: account deactivated");
        return Err(invalid());
    }

    let access_token = issue_token(&user, &config.jwt_secret, config.token_ttl)?;
    info!(user_id = user.id, company_id = user.company_id, "Login successful");

    Ok(TokenResponse {
        access_token,
        token_type: "bearer".to_string(),
        role: user.role,
    })
}

#[instrument(name = "change_password", skip(store, user, req), fields(user_id = user.id))]
pub async fn change_password(
    store: &dyn Store,
    user: &User,
    req: &ChangePasswordRequest,
) -> Result<(), AppError> {
    if !verify_password(&req.current_password, &user.password_hash) {
        return Err(AppError::unauthenticated("Current password is incorrect"));
    }
    validate_password(&req.new_password)?;

    let mut updated = user.clone();
    updated.password_hash = hash_password(&req.new_password)?;
    store.users().update(&updated).await?;

    info!("Password changed");
    Ok(())
}
