use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::Local;
use std::sync::Arc;

use omms_core::{
    errors::OmmsError,
    models::department::{
        DepartmentCreate, DepartmentDeleteOut, DepartmentOut, DepartmentUpdate,
    },
    models::page::{Page, PageQuery},
    response::Envelope,
    time_fmt,
};
use omms_db::models::DbDepartment;
use omms_db::repositories::department;

use crate::{
    middleware::{
        auth::{require_role_in, AuthUser},
        error_handling::AppError,
    },
    ApiState,
};

fn dept_out(dept: DbDepartment) -> DepartmentOut {
    DepartmentOut {
        dept_id: dept.dept_id,
        dept_name: dept.dept_name,
        dept_desc: dept.description,
        parent_id: dept.parent_id,
        sort_order: dept.sort_order,
        created_at: dept.created_at.map(time_fmt::fmt_datetime),
        updated_at: dept.updated_at.map(time_fmt::fmt_datetime),
    }
}

#[axum::debug_handler]
pub async fn list_departments(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Envelope<Page<DepartmentOut>>>, AppError> {
    let (page, page_size, offset) = query.normalize(20, 100);

    let total = department::count_departments(&state.db_pool)
        .await
        .map_err(OmmsError::Database)?;

    let rows = department::list_departments(&state.db_pool, offset, page_size)
        .await
        .map_err(OmmsError::Database)?;

    let response = Page {
        list: rows.into_iter().map(dept_out).collect(),
        total,
        page,
        page_size,
    };

    Ok(Json(Envelope::ok(response)))
}

#[axum::debug_handler]
pub async fn create_department(
    State(state): State<Arc<ApiState>>,
    Json(payload): Json<DepartmentCreate>,
) -> Result<Json<Envelope<DepartmentOut>>, AppError> {
    if department::name_exists(&state.db_pool, &payload.dept_name, None)
        .await
        .map_err(OmmsError::Database)?
    {
        return Err(AppError(OmmsError::Validation("科室名称已存在".to_string())));
    }

    let now = Local::now().naive_local();
    let created = department::create_department(
        &state.db_pool,
        &payload.dept_name,
        payload.dept_desc.as_deref(),
        payload.parent_id,
        payload.sort_order,
        now,
    )
    .await
    .map_err(OmmsError::Database)?;

    Ok(Json(Envelope::ok_with(dept_out(created), "科室创建成功")))
}

#[axum::debug_handler]
pub async fn get_department(
    State(state): State<Arc<ApiState>>,
    Path(dept_id): Path<i64>,
) -> Result<Json<Envelope<DepartmentOut>>, AppError> {
    let dept = department::get_department_by_id(&state.db_pool, dept_id)
        .await
        .map_err(OmmsError::Database)?
        .ok_or_else(|| OmmsError::NotFound("科室不存在".to_string()))?;

    Ok(Json(Envelope::ok(dept_out(dept))))
}

#[axum::debug_handler]
pub async fn update_department(
    State(state): State<Arc<ApiState>>,
    Path(dept_id): Path<i64>,
    Json(payload): Json<DepartmentUpdate>,
) -> Result<Json<Envelope<DepartmentOut>>, AppError> {
    let existing = department::get_department_by_id(&state.db_pool, dept_id)
        .await
        .map_err(OmmsError::Database)?
        .ok_or_else(|| OmmsError::NotFound("科室不存在".to_string()))?;

    // Renames must not collide with another department
    if let Some(new_name) = &payload.dept_name {
        if *new_name != existing.dept_name
            && department::name_exists(&state.db_pool, new_name, Some(dept_id))
                .await
                .map_err(OmmsError::Database)?
        {
            return Err(AppError(OmmsError::Validation("科室名称已存在".to_string())));
        }
    }

    let now = Local::now().naive_local();
    let updated = department::update_department(
        &state.db_pool,
        dept_id,
        payload.dept_name.as_deref(),
        payload.dept_desc.as_deref(),
        payload.parent_id,
        payload.sort_order,
        now,
    )
    .await
    .map_err(OmmsError::Database)?;

    Ok(Json(Envelope::ok_with(dept_out(updated), "科室更新成功")))
}

#[axum::debug_handler]
pub async fn delete_department(
    State(state): State<Arc<ApiState>>,
    current: AuthUser,
    Path(dept_id): Path<i64>,
) -> Result<Json<Envelope<DepartmentDeleteOut>>, AppError> {
    require_role_in(&state, &current.user, &["ADMIN"]).await?;

    department::get_department_by_id(&state.db_pool, dept_id)
        .await
        .map_err(OmmsError::Database)?
        .ok_or_else(|| OmmsError::NotFound("科室不存在".to_string()))?;

    if department::has_children(&state.db_pool, dept_id)
        .await
        .map_err(OmmsError::Database)?
    {
        return Err(AppError(OmmsError::Validation(
            "该科室下有子科室，无法删除".to_string(),
        )));
    }

    if department::has_doctors(&state.db_pool, dept_id)
        .await
        .map_err(OmmsError::Database)?
    {
        return Err(AppError(OmmsError::Validation(
            "该科室下有医生，无法删除".to_string(),
        )));
    }

    department::delete_department(&state.db_pool, dept_id)
        .await
        .map_err(OmmsError::Database)?;

    Ok(Json(Envelope::ok_with(
        DepartmentDeleteOut { dept_id },
        "科室删除成功",
    )))
}
