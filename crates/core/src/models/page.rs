use serde::{Deserialize, Serialize};

/// Common `page`/`pageSize` query parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageQuery {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

impl PageQuery {
    /// Clamps to `page >= 1`, `1 <= pageSize <= max` and returns
    /// `(page, page_size, offset)`.
    pub fn normalize(&self, default_size: i64, max_size: i64) -> (i64, i64, i64) {
        let page = self.page.unwrap_or(1).max(1);
        let page_size = self.page_size.unwrap_or(default_size).clamp(1, max_size);
        (page, page_size, (page - 1) * page_size)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub list: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub page_size: i64,
}
