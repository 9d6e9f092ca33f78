//! Admin Model

use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

use super::{AuthType, serde_helpers};

/// Admin ID type
pub type AdminId = RecordId;

/// Dashboard operator account
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Admin {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<AdminId>,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing)]
    pub hash_pass: Option<String>,
    #[serde(default)]
    pub google_id: Option<String>,
    #[serde(default)]
    pub auth_type: AuthType,
    #[serde(default)]
    pub created_at: i64,
}

/// `POST /register` payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminRegister {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// `POST /login` payload
///
/// `name` may hold either the admin name or the email address.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub name: String,
    pub password: String,
    #[serde(default)]
    pub captcha_token: Option<String>,
}

/// Admin as returned by the API
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminInfo {
    pub id: String,
    pub name: String,
    pub email: String,
}

impl From<&Admin> for AdminInfo {
    fn from(admin: &Admin) -> Self {
        Self {
            id: admin.id.as_ref().map(|id| id.to_string()).unwrap_or_default(),
            name: admin.name.clone(),
            email: admin.email.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub expires_in: i64,
    pub admin: AdminInfo,
}
