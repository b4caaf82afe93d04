use axum::{
    extract::{Query, State},
    Json,
};
use std::sync::Arc;

use omms_core::{
    errors::OmmsError,
    models::page::{Page, PageQuery},
    models::schedule::{ScheduleListQuery, ScheduleOut},
    response::Envelope,
    time_fmt,
};
use omms_db::repositories::{appointment, schedule};

use crate::{middleware::error_handling::AppError, ApiState};

#[axum::debug_handler]
pub async fn list_schedules(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<ScheduleListQuery>,
) -> Result<Json<Envelope<Page<ScheduleOut>>>, AppError> {
    let (page, page_size, offset) = PageQuery {
        page: query.page,
        page_size: query.page_size,
    }
    .normalize(20, 100);

    let work_date = match &query.work_date {
        Some(raw) => Some(
            time_fmt::parse_date(raw)
                .map_err(|_| OmmsError::Validation("workDate 格式错误，应为 YYYY-MM-DD".to_string()))?,
        ),
        None => None,
    };

    let total = schedule::count_schedules(&state.db_pool, query.dept_id, query.doctor_id, work_date)
        .await
        .map_err(OmmsError::Database)?;

    let rows = schedule::list_schedules(
        &state.db_pool,
        query.dept_id,
        query.doctor_id,
        work_date,
        offset,
        page_size,
    )
    .await
    .map_err(OmmsError::Database)?;

    let mut list = Vec::with_capacity(rows.len());
    for row in rows {
        // Booked counts are derived per schedule, never read from a
        // persisted counter.
        let booked_count =
            appointment::count_active_for_schedule(&state.db_pool, row.schedule_id)
                .await
                .map_err(OmmsError::Database)?;

        let start_time = time_fmt::fmt_time(row.start_time);
        let end_time = time_fmt::fmt_time(row.end_time);

        list.push(ScheduleOut {
            schedule_id: row.schedule_id,
            doctor_id: row.doctor_id,
            doctor_name: row.doctor_name,
            dept_id: row.dept_id,
            dept_name: row.dept_name,
            work_date: time_fmt::fmt_date(row.work_date),
            work_period: format!("{start_time} - {end_time}"),
            start_time,
            end_time,
            total_quota: row.max_appointments,
            booked_count,
            available_quota: i64::from(row.max_appointments) - booked_count,
            status: row.status,
        });
    }

    let response = Page {
        list,
        total,
        page,
        page_size,
    };

    Ok(Json(Envelope::ok(response)))
}
