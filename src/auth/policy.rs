use crate::{error::AppError, model::role::Role, model::user::User};

/// Fails with `Forbidden` unless `user` holds exactly `role`.
pub fn require_role(user: &User, role: Role) -> Result<(), AppError> {
    match (role, user.role) {
        (Role::Admin, Role::Admin) | (Role::Employee, Role::Employee) => Ok(()),
        (Role::Admin, Role::Employee) => Err(AppError::forbidden("Admin only")),
        (Role::Employee, Role::Admin) => Err(AppError::forbidden("Employees only")),
    }
}
