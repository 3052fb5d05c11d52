use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct CleaningStaff {
    pub id: Uuid,
    pub name: String,
    pub pincode: String,
    pub contact: String,
}
