use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A post office, keyed by pincode. Division head offices are post offices
/// that other post offices point at through `division_pincode`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct PostOffice {
    pub pincode: String,
    pub name: String,
    #[serde(rename = "contactNo")]
    pub contact_no: String,
    pub address: String,
    pub division_pincode: Option<String>,
}
