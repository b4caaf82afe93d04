//! Medical record and record template handlers.
//!
//! Every status change, including the DELETE (void) endpoint, goes
//! through the same guarded transition: no regression out of
//! `finalized`/`cancelled`, and finalizing requires content.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::Local;
use rand::Rng;
use std::sync::Arc;

use omms_core::{
    errors::OmmsError,
    models::page::Page,
    models::record::{
        self, default_template_defaults, gen_record_id, parse_string_list, to_json_string,
        validate_transition, RecordCreate, RecordListQuery, RecordOut, RecordStatusOut,
        RecordStatusPayload, RecordUpdate, TemplateCreate, TemplateDeleteOut, TemplateOut,
        TemplateUpdate,
    },
    response::Envelope,
    time_fmt,
};
use omms_db::models::{DbRecord, DbRecordTemplate};
use omms_db::repositories::{record as record_repo, template as template_repo};

use crate::{middleware::error_handling::AppError, ApiState};

fn record_out(rec: DbRecord) -> RecordOut {
    let prescriptions = parse_string_list(rec.prescriptions_json.as_deref());
    let labs = parse_string_list(rec.labs_json.as_deref());
    let imaging = parse_string_list(rec.imaging_json.as_deref());

    RecordOut {
        id: rec.id,
        patient: rec.patient_name.unwrap_or_default(),
        department: rec.dept_id.to_string(),
        doctor: rec.doctor_id.to_string(),
        created_at: time_fmt::fmt_datetime_minute(rec.created_at),
        status: rec.status,
        has_lab: !labs.is_empty(),
        has_imaging: !imaging.is_empty(),
        chief_complaint: rec.chief_complaint.unwrap_or_default(),
        diagnosis: rec.diagnosis.unwrap_or_default(),
        prescriptions,
        labs,
        imaging,
    }
}

fn template_out(tpl: DbRecordTemplate) -> TemplateOut {
    let defaults = tpl
        .defaults_json
        .as_deref()
        .and_then(|raw| serde_json::from_str(raw).ok())
        .unwrap_or_else(|| serde_json::json!({}));

    TemplateOut {
        id: tpl.id,
        name: tpl.name,
        scope: tpl.scope,
        fields: parse_string_list(tpl.fields_json.as_deref()),
        defaults,
    }
}

fn has_content(rec: &DbRecord) -> bool {
    rec.chief_complaint.as_deref().is_some_and(|s| !s.is_empty())
        || rec.diagnosis.as_deref().is_some_and(|s| !s.is_empty())
}

#[axum::debug_handler]
pub async fn list_records(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<RecordListQuery>,
) -> Result<Json<Envelope<Page<RecordOut>>>, AppError> {
    let date = match &query.date {
        Some(raw) => Some(time_fmt::parse_date(raw)?),
        None => None,
    };

    let rows = record_repo::list_records(
        &state.db_pool,
        query.status.as_deref(),
        date,
        query.dept_id,
        query.doctor_id,
    )
    .await
    .map_err(OmmsError::Database)?;

    // The lab/imaging presence filters depend on the decoded JSON
    // columns, so they and the pagination run after the query.
    let mut items: Vec<RecordOut> = rows.into_iter().map(record_out).collect();
    if let Some(has_lab) = query.has_lab {
        items.retain(|r| r.has_lab == has_lab);
    }
    if let Some(has_imaging) = query.has_imaging {
        items.retain(|r| r.has_imaging == has_imaging);
    }

    let total = items.len() as i64;
    let page = query.page.unwrap_or(1).max(1);
    let page_size = query.page_size.unwrap_or(20).max(1);
    let start = ((page - 1) * page_size) as usize;
    let list: Vec<RecordOut> = items
        .into_iter()
        .skip(start)
        .take(page_size as usize)
        .collect();

    Ok(Json(Envelope::ok(Page {
        list,
        total,
        page,
        page_size,
    })))
}

#[axum::debug_handler]
pub async fn get_record(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<String>,
) -> Result<Json<Envelope<RecordOut>>, AppError> {
    let rec = record_repo::get_record_by_id(&state.db_pool, &id)
        .await
        .map_err(OmmsError::Database)?
        .ok_or_else(|| OmmsError::NotFound("Record not found".to_string()))?;

    Ok(Json(Envelope::ok(record_out(rec))))
}

#[axum::debug_handler]
pub async fn create_record(
    State(state): State<Arc<ApiState>>,
    Json(payload): Json<RecordCreate>,
) -> Result<Json<Envelope<RecordOut>>, AppError> {
    let (Some(dept_id), Some(doctor_id)) = (payload.dept_id, payload.doctor_id) else {
        return Err(AppError(OmmsError::Validation(
            "缺少deptId或doctorId".to_string(),
        )));
    };

    let now = Local::now().naive_local();
    let today = now.date();
    let id = gen_record_id(today, rand::thread_rng().gen_range(0..10000));

    let time_part = payload.time.as_deref().unwrap_or("10:00");
    let created_at = time_fmt::parse_datetime_minute(&format!(
        "{} {}",
        time_fmt::fmt_date(today),
        time_part
    ))?;
    if created_at > now {
        return Err(AppError(OmmsError::Validation(
            "createdAt不可晚于当前时间".to_string(),
        )));
    }

    let rec = record_repo::insert_record(
        &state.db_pool,
        &id,
        dept_id,
        doctor_id,
        payload.patient_id,
        payload
            .patient_name
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty()),
        created_at,
        payload.template_id,
        payload.chief_complaint.as_deref().unwrap_or(""),
        payload.diagnosis.as_deref().unwrap_or(""),
        to_json_string(payload.prescriptions.as_deref()).as_deref(),
        to_json_string(payload.labs.as_deref()).as_deref(),
        to_json_string(payload.imaging.as_deref()).as_deref(),
    )
    .await
    .map_err(OmmsError::Database)?;

    Ok(Json(Envelope::ok_with(record_out(rec), "病历创建成功")))
}

#[axum::debug_handler]
pub async fn update_record(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<String>,
    Json(payload): Json<RecordUpdate>,
) -> Result<Json<Envelope<RecordOut>>, AppError> {
    record_repo::get_record_by_id(&state.db_pool, &id)
        .await
        .map_err(OmmsError::Database)?
        .ok_or_else(|| OmmsError::NotFound("Record not found".to_string()))?;

    let created_at = match &payload.created_at {
        Some(raw) => {
            let parsed = time_fmt::parse_datetime_minute(raw)?;
            if parsed > Local::now().naive_local() {
                return Err(AppError(OmmsError::Validation(
                    "createdAt不可晚于当前时间".to_string(),
                )));
            }
            Some(parsed)
        }
        None => None,
    };

    let prescriptions_json = payload
        .prescriptions
        .as_deref()
        .map(|v| to_json_string(Some(v)));
    let labs_json = payload.labs.as_deref().map(|v| to_json_string(Some(v)));
    let imaging_json = payload.imaging.as_deref().map(|v| to_json_string(Some(v)));

    let rec = record_repo::update_record(
        &state.db_pool,
        &id,
        record_repo::RecordChanges {
            patient_id: payload.patient_id,
            patient_name: payload
                .patient_name
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty()),
            chief_complaint: payload.chief_complaint.as_deref(),
            diagnosis: payload.diagnosis.as_deref(),
            prescriptions_json: prescriptions_json.as_ref().map(|o| o.as_deref()),
            labs_json: labs_json.as_ref().map(|o| o.as_deref()),
            imaging_json: imaging_json.as_ref().map(|o| o.as_deref()),
            created_at,
            dept_id: payload.dept_id,
            doctor_id: payload.doctor_id,
        },
    )
    .await
    .map_err(OmmsError::Database)?;

    Ok(Json(Envelope::ok(record_out(rec))))
}

#[axum::debug_handler]
pub async fn update_record_status(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<String>,
    Json(payload): Json<RecordStatusPayload>,
) -> Result<Json<Envelope<RecordStatusOut>>, AppError> {
    let target = payload.status.trim();

    let rec = record_repo::get_record_by_id(&state.db_pool, &id)
        .await
        .map_err(OmmsError::Database)?
        .ok_or_else(|| OmmsError::NotFound("Record not found".to_string()))?;

    validate_transition(&rec.status, target, has_content(&rec))?;

    let updated = record_repo::set_status(&state.db_pool, &id, target)
        .await
        .map_err(OmmsError::Database)?;

    Ok(Json(Envelope::ok(RecordStatusOut {
        id: updated.id,
        status: updated.status,
    })))
}

/// Voids a record: the same guarded transition as the PATCH endpoint
/// with `cancelled` as the target.
#[axum::debug_handler]
pub async fn delete_record(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<String>,
) -> Result<Json<Envelope<RecordStatusOut>>, AppError> {
    let rec = record_repo::get_record_by_id(&state.db_pool, &id)
        .await
        .map_err(OmmsError::Database)?
        .ok_or_else(|| OmmsError::NotFound("Record not found".to_string()))?;

    validate_transition(&rec.status, record::STATUS_CANCELLED, has_content(&rec))?;

    let updated = record_repo::set_status(&state.db_pool, &id, record::STATUS_CANCELLED)
        .await
        .map_err(OmmsError::Database)?;

    Ok(Json(Envelope::ok(RecordStatusOut {
        id: updated.id,
        status: updated.status,
    })))
}

#[axum::debug_handler]
pub async fn list_templates(
    State(state): State<Arc<ApiState>>,
) -> Result<Json<Envelope<Vec<TemplateOut>>>, AppError> {
    let templates = template_repo::list_templates(&state.db_pool)
        .await
        .map_err(OmmsError::Database)?;

    Ok(Json(Envelope::ok(
        templates.into_iter().map(template_out).collect(),
    )))
}

#[axum::debug_handler]
pub async fn get_template(
    State(state): State<Arc<ApiState>>,
    Path(tpl_id): Path<i64>,
) -> Result<Json<Envelope<TemplateOut>>, AppError> {
    let tpl = template_repo::get_template_by_id(&state.db_pool, tpl_id)
        .await
        .map_err(OmmsError::Database)?
        .ok_or_else(|| OmmsError::NotFound("Template not found".to_string()))?;

    Ok(Json(Envelope::ok(template_out(tpl))))
}

#[axum::debug_handler]
pub async fn create_template(
    State(state): State<Arc<ApiState>>,
    Json(payload): Json<TemplateCreate>,
) -> Result<Json<Envelope<TemplateOut>>, AppError> {
    let name = payload
        .name
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or("未命名模板");
    let scope = payload
        .scope
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or("通用");

    let defaults = payload.defaults.unwrap_or_else(default_template_defaults);
    let defaults_json = serde_json::to_string(&defaults)
        .map_err(|e| OmmsError::Internal(Box::new(e)))?;

    let tpl = template_repo::create_template(
        &state.db_pool,
        name,
        scope,
        to_json_string(payload.fields.as_deref()).as_deref(),
        &defaults_json,
    )
    .await
    .map_err(OmmsError::Database)?;

    Ok(Json(Envelope::ok_with(template_out(tpl), "模板创建成功")))
}

#[axum::debug_handler]
pub async fn update_template(
    State(state): State<Arc<ApiState>>,
    Path(tpl_id): Path<i64>,
    Json(payload): Json<TemplateUpdate>,
) -> Result<Json<Envelope<TemplateOut>>, AppError> {
    template_repo::get_template_by_id(&state.db_pool, tpl_id)
        .await
        .map_err(OmmsError::Database)?
        .ok_or_else(|| OmmsError::NotFound("Template not found".to_string()))?;

    let fields_json = payload.fields.as_deref().map(|v| to_json_string(Some(v)));
    let defaults_json = match &payload.defaults {
        Some(defaults) => Some(
            serde_json::to_string(defaults).map_err(|e| OmmsError::Internal(Box::new(e)))?,
        ),
        None => None,
    };

    let tpl = template_repo::update_template(
        &state.db_pool,
        tpl_id,
        payload
            .name
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty()),
        payload
            .scope
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty()),
        fields_json.as_ref().map(|o| o.as_deref()),
        defaults_json.as_deref(),
    )
    .await
    .map_err(OmmsError::Database)?;

    Ok(Json(Envelope::ok_with(template_out(tpl), "模板更新成功")))
}

#[axum::debug_handler]
pub async fn delete_template(
    State(state): State<Arc<ApiState>>,
    Path(tpl_id): Path<i64>,
) -> Result<Json<Envelope<TemplateDeleteOut>>, AppError> {
    let in_use = record_repo::count_by_template(&state.db_pool, tpl_id)
        .await
        .map_err(OmmsError::Database)?;
    if in_use > 0 {
        return Err(AppError(OmmsError::Conflict(
            "模板被引用，无法删除".to_string(),
        )));
    }

    template_repo::get_template_by_id(&state.db_pool, tpl_id)
        .await
        .map_err(OmmsError::Database)?
        .ok_or_else(|| OmmsError::NotFound("Template not found".to_string()))?;

    template_repo::delete_template(&state.db_pool, tpl_id)
        .await
        .map_err(OmmsError::Database)?;

    Ok(Json(Envelope::ok_with(
        TemplateDeleteOut { id: tpl_id },
        "模板删除成功",
    )))
}
