use crate::{error::AppError, model::user::User, models::Claims, repository::Store};

/// Maps verified token claims to the stored user acting on this request.
///
/// A token outlives changes to the account, so the stored rows win: a deleted
/// or deactivated user, a user whose company or role no longer matches the
/// token, or a company that no longer exists is treated as unauthenticated.
pub async fn resolve(store: &dyn Store, claims: &Claims) -> Result<User, AppError> {
    let user = store
        .users()
        .find_by_id(claims.user_id)
        .await?
        .ok_or_else(|| AppError::unauthenticated("Invalid user"))?;

    if !user.is_active {
        return Err(AppError::unauthenticated("Account is deactivated"));
    }

    if user.company_id != claims.company_id || user.role != claims.role {
        return Err(AppError::unauthenticated("Token no longer matches account"));
    }

    if store.companies().find_by_id(user.company_id).await?.is_none() {
        return Err(AppError::unauthenticated("Company no longer exists"));
    }

    Ok(user)
}
