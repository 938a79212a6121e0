use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Root tenant boundary. Immutable after signup.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Company {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = "Acme")]
    pub name: String,
}
