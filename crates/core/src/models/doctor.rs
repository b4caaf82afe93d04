use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoctorCreate {
    pub user_id: i64,
    pub doctor_name: String,
    pub dept_id: i64,
    pub title: Option<String>,
    pub specialty: Option<String>,
    pub introduction: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoctorUpdate {
    pub doctor_name: Option<String>,
    pub dept_id: Option<i64>,
    pub title: Option<String>,
    pub specialty: Option<String>,
    pub introduction: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoctorOut {
    pub doctor_id: i64,
    pub doctor_name: String,
    pub dept_id: i64,
    pub dept_name: Option<String>,
    pub title: Option<String>,
    pub specialty: Option<String>,
    pub introduction: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoctorDeleteOut {
    pub doctor_id: i64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoctorListQuery {
    pub dept_id: Option<i64>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}
