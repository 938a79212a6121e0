use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Row, mysql::MySqlRow};
use utoipa::ToSchema;

use crate::model::{decode_text, role::Role};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct User {
    #[schema(example = 7)]
    pub id: u64,
    #[schema(example = 1)]
    pub company_id: u64,
    #[schema(example = "jane@acme.io")]
    pub email: String,
    #[serde(skip_serializing, default)]
    #[schema(read_only)]
    pub password_hash: String,
    #[schema(example = "Jane Doe")]
    pub full_name: String,
    pub role: Role,
    pub is_active: bool,
}

impl<'r> FromRow<'r, MySqlRow> for User {
    fn from_row(row: &'r MySqlRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            company_id: row.try_get("company_id")?,
            email: row.try_get("email")?,
            password_hash: row.try_get("password_hash")?,
            full_name: row.try_get("full_name")?,
            role: decode_text(row, "role")?,
            is_active: row.try_get("is_active")?,
        })
    }
}

/// Credentials and name for a user that does not exist yet.
/// Company and role are decided by the operation that creates it.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub email: String,
    pub password_hash: String,
    pub full_name: String,
}
