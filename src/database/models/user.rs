use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Local mirror of an identity verified by the external auth service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "PascalCase")]
pub struct User {
    pub user_id: i32,
    pub email: String,
}
