use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::Local;
use std::sync::Arc;

use omms_core::{
    errors::OmmsError,
    models::doctor::{DoctorCreate, DoctorDeleteOut, DoctorListQuery, DoctorOut, DoctorUpdate},
    models::page::{Page, PageQuery},
    response::Envelope,
    time_fmt,
};
use omms_db::models::DbDoctorDetail;
use omms_db::repositories::{department, doctor, user};

use crate::{
    middleware::{
        auth::{require_role_in, AuthUser},
        error_handling::AppError,
    },
    ApiState,
};

fn detail_out(row: DbDoctorDetail) -> DoctorOut {
    DoctorOut {
        doctor_id: row.doctor_id,
        doctor_name: row.doctor_name,
        dept_id: row.dept_id,
        dept_name: Some(row.dept_name),
        title: row.title,
        specialty: row.specialty,
        introduction: row.introduction,
        created_at: row.created_at.map(time_fmt::fmt_datetime),
        updated_at: row.updated_at.map(time_fmt::fmt_datetime),
    }
}

#[axum::debug_handler]
pub async fn list_doctors(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<DoctorListQuery>,
) -> Result<Json<Envelope<Page<DoctorOut>>>, AppError> {
    let (page, page_size, offset) = PageQuery {
        page: query.page,
        page_size: query.page_size,
    }
    .normalize(20, 100);

    let total = doctor::count_doctors(&state.db_pool, query.dept_id)
        .await
        .map_err(OmmsError::Database)?;

    let rows = doctor::list_doctors(&state.db_pool, query.dept_id, offset, page_size)
        .await
        .map_err(OmmsError::Database)?;

    let response = Page {
        list: rows.into_iter().map(detail_out).collect(),
        total,
        page,
        page_size,
    };

    Ok(Json(Envelope::ok(response)))
}

#[axum::debug_handler]
pub async fn create_doctor(
    State(state): State<Arc<ApiState>>,
    Json(payload): Json<DoctorCreate>,
) -> Result<Json<Envelope<DoctorOut>>, AppError> {
    let dept = department::get_department_by_id(&state.db_pool, payload.dept_id)
        .await
        .map_err(OmmsError::Database)?
        .ok_or_else(|| OmmsError::Validation("科室不存在".to_string()))?;

    user::get_user_by_id(&state.db_pool, payload.user_id)
        .await
        .map_err(OmmsError::Database)?
        .ok_or_else(|| OmmsError::Validation("用户不存在".to_string()))?;

    let now = Local::now().naive_local();
    let created = doctor::create_doctor(
        &state.db_pool,
        payload.user_id,
        &payload.doctor_name,
        payload.dept_id,
        payload.title.as_deref(),
        payload.specialty.as_deref(),
        payload.introduction.as_deref(),
        now,
    )
    .await
    .map_err(OmmsError::Database)?;

    let response = DoctorOut {
        doctor_id: created.doctor_id,
        doctor_name: created.doctor_name,
        dept_id: created.dept_id,
        dept_name: Some(dept.dept_name),
        title: created.title,
        specialty: created.specialty,
        introduction: created.introduction,
        created_at: created.created_at.map(time_fmt::fmt_datetime),
        updated_at: created.updated_at.map(time_fmt::fmt_datetime),
    };

    Ok(Json(Envelope::ok_with(response, "医生创建成功")))
}

/// Doctor detail. Database failures on this endpoint are caught and
/// surfaced as an enveloped 500 rather than propagating.
#[axum::debug_handler]
pub async fn get_doctor(
    State(state): State<Arc<ApiState>>,
    Path(doctor_id): Path<i64>,
) -> Result<Json<Envelope<DoctorOut>>, AppError> {
    match doctor::get_doctor_detail_by_id(&state.db_pool, doctor_id).await {
        Ok(Some(row)) => Ok(Json(Envelope::ok(detail_out(row)))),
        Ok(None) => Err(AppError(OmmsError::NotFound("医生不存在".to_string()))),
        Err(e) => {
            tracing::error!("Error in get_doctor: {e:?}");
            Err(AppError(OmmsError::Database(e)))
        }
    }
}

#[axum::debug_handler]
pub async fn update_doctor(
    State(state): State<Arc<ApiState>>,
    Path(doctor_id): Path<i64>,
    Json(payload): Json<DoctorUpdate>,
) -> Result<Json<Envelope<DoctorOut>>, AppError> {
    doctor::get_doctor_by_id(&state.db_pool, doctor_id)
        .await
        .map_err(OmmsError::Database)?
        .ok_or_else(|| OmmsError::NotFound("医生不存在".to_string()))?;

    if let Some(dept_id) = payload.dept_id {
        department::get_department_by_id(&state.db_pool, dept_id)
            .await
            .map_err(OmmsError::Database)?
            .ok_or_else(|| OmmsError::Validation("科室不存在".to_string()))?;
    }

    let now = Local::now().naive_local();
    let updated = doctor::update_doctor(
        &state.db_pool,
        doctor_id,
        payload.doctor_name.as_deref(),
        payload.dept_id,
        payload.title.as_deref(),
        payload.specialty.as_deref(),
        payload.introduction.as_deref(),
        now,
    )
    .await
    .map_err(OmmsError::Database)?;

    let dept_name = department::get_department_by_id(&state.db_pool, updated.dept_id)
        .await
        .map_err(OmmsError::Database)?
        .map(|d| d.dept_name);

    let response = DoctorOut {
        doctor_id: updated.doctor_id,
        doctor_name: updated.doctor_name,
        dept_id: updated.dept_id,
        dept_name,
        title: updated.title,
        specialty: updated.specialty,
        introduction: updated.introduction,
        created_at: updated.created_at.map(time_fmt::fmt_datetime),
        updated_at: updated.updated_at.map(time_fmt::fmt_datetime),
    };

    Ok(Json(Envelope::ok_with(response, "医生更新成功")))
}

#[axum::debug_handler]
pub async fn delete_doctor(
    State(state): State<Arc<ApiState>>,
    current: AuthUser,
    Path(doctor_id): Path<i64>,
) -> Result<Json<Envelope<DoctorDeleteOut>>, AppError> {
    require_role_in(&state, &current.user, &["ADMIN"]).await?;

    doctor::get_doctor_by_id(&state.db_pool, doctor_id)
        .await
        .map_err(OmmsError::Database)?
        .ok_or_else(|| OmmsError::NotFound("医生不存在".to_string()))?;

    if doctor::has_schedules(&state.db_pool, doctor_id)
        .await
        .map_err(OmmsError::Database)?
    {
        return Err(AppError(OmmsError::Validation(
            "该医生有排班记录，无法删除".to_string(),
        )));
    }

    if doctor::has_appointments(&state.db_pool, doctor_id)
        .await
        .map_err(OmmsError::Database)?
    {
        return Err(AppError(OmmsError::Validation(
            "该医生有预约记录，无法删除".to_string(),
        )));
    }

    doctor::delete_doctor(&state.db_pool, doctor_id)
        .await
        .map_err(OmmsError::Database)?;

    Ok(Json(Envelope::ok_with(
        DoctorDeleteOut { doctor_id },
        "医生删除成功",
    )))
}
