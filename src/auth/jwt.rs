use std::time::{SystemTime, UNIX_EPOCH};

use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use uuid::Uuid;

use crate::{error::AppError, model::user::User, models::Claims};

fn now() -> usize {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as usize)
        .unwrap_or_default()
}

/// Signs an HS256 token carrying the user's id, company and role.
pub fn issue_token(user: &User, secret: &str, ttl: usize) -> Result<String, AppError> {
    let iat = now();
    let claims = Claims {
        user_id: user.id,
        company_id: user.company_id,
        role: user.role,
        exp: iat + ttl,
        iat,
        jti: Uuid::new_v4().to_string(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(AppError::internal)
}

/// Checks signature and expiry. Any failure is `Unauthenticated`.
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, AppError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| {
        tracing::debug!(error = %e, "Token rejected");
        AppError::unauthenticated("Invalid or expired token")
    })
}
