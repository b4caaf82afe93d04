use serde::{Deserialize, Serialize};

/// Role ids as seeded by the schema bootstrap.
pub const ROLE_ADMIN: i64 = 1;
pub const ROLE_DOCTOR: i64 = 2;
pub const ROLE_PATIENT: i64 = 3;

/// Account states on the users table.
pub const USER_ENABLED: i16 = 1;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub real_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserOut {
    pub user_id: i64,
    pub username: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub real_name: Option<String>,
    pub role_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginData {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub user: UserOut,
}
