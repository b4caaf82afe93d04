use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentCreate {
    pub dept_name: String,
    pub dept_desc: Option<String>,
    pub parent_id: Option<i64>,
    #[serde(default)]
    pub sort_order: i32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentUpdate {
    pub dept_name: Option<String>,
    pub dept_desc: Option<String>,
    pub parent_id: Option<i64>,
    pub sort_order: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentOut {
    pub dept_id: i64,
    pub dept_name: String,
    pub dept_desc: Option<String>,
    pub parent_id: Option<i64>,
    pub sort_order: i32,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentDeleteOut {
    pub dept_id: i64,
}
