//! Reporting handlers: daily/monthly visit and drug usage summaries plus
//! the custom filtered report.

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::NaiveDateTime;
use std::collections::HashMap;
use std::sync::Arc;

use omms_core::{
    errors::OmmsError,
    models::report::{
        report_row_id, status_str, CustomReportQuery, CustomReportRow, DailyDrugRow, DailyVisitRow,
        DaysOut, MonthlyDrugRow, MonthlyVisitRow, RowsOut,
    },
    response::Envelope,
    time_fmt,
};
use omms_db::repositories::{prescription, report};

use crate::{middleware::error_handling::AppError, ApiState};

#[derive(Debug, serde::Deserialize)]
pub struct DateQuery {
    pub date: String,
}

#[derive(Debug, serde::Deserialize)]
pub struct MonthQuery {
    pub month: String,
}

fn day_bounds(date: &str) -> Result<(NaiveDateTime, NaiveDateTime), OmmsError> {
    let day = time_fmt::parse_date(date)?;
    let start = day.and_hms_opt(0, 0, 0).expect("valid time");
    Ok((start, start + chrono::Duration::days(1)))
}

fn month_bounds(month: &str) -> Result<(NaiveDateTime, NaiveDateTime), OmmsError> {
    let month_start = time_fmt::parse_month(month)?;
    let start = month_start.and_hms_opt(0, 0, 0).expect("valid time");
    let end = time_fmt::next_month(month_start)
        .and_hms_opt(0, 0, 0)
        .expect("valid time");
    Ok((start, end))
}

#[axum::debug_handler]
pub async fn daily_visits(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<DateQuery>,
) -> Result<Json<Envelope<RowsOut<DailyVisitRow>>>, AppError> {
    let (start, end) = day_bounds(&query.date)?;

    let rows = report::visits_between(&state.db_pool, Some(start), Some(end), None, None)
        .await
        .map_err(OmmsError::Database)?;

    let list: Vec<DailyVisitRow> = rows
        .into_iter()
        .map(|r| DailyVisitRow {
            id: report_row_id(r.appt_id, r.appt_time.date()),
            patient: r.patient_name,
            department: r.dept_name,
            doctor: r.doctor_name,
            time: Some(time_fmt::fmt_datetime(r.appt_time)),
            status: status_str(r.status).to_string(),
        })
        .collect();

    let total = list.len() as i64;
    Ok(Json(Envelope::ok(RowsOut { list, total })))
}

#[axum::debug_handler]
pub async fn daily_drugs(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<DateQuery>,
) -> Result<Json<Envelope<RowsOut<DailyDrugRow>>>, AppError> {
    let (start, end) = day_bounds(&query.date)?;

    let prescriptions = report::prescriptions_between(&state.db_pool, Some(start), Some(end))
        .await
        .map_err(OmmsError::Database)?;

    let pids: Vec<String> = prescriptions.iter().map(|p| p.id.clone()).collect();
    let items = if pids.is_empty() {
        Vec::new()
    } else {
        prescription::get_items_for_prescriptions(&state.db_pool, &pids)
            .await
            .map_err(OmmsError::Database)?
    };

    let mids: Vec<i64> = items.iter().map(|i| i.medicine_id).collect();
    let medicines = if mids.is_empty() {
        Vec::new()
    } else {
        omms_db::repositories::medicine::get_medicines_by_ids(&state.db_pool, &mids)
            .await
            .map_err(OmmsError::Database)?
    };
    let med_map: HashMap<i64, _> = medicines.into_iter().map(|m| (m.medicine_id, m)).collect();
    let p_map: HashMap<String, _> = prescriptions.into_iter().map(|p| (p.id.clone(), p)).collect();

    let list: Vec<DailyDrugRow> = items
        .into_iter()
        .filter_map(|i| {
            // skip orphan items
            let p = p_map.get(&i.prescription_id)?;
            let med = med_map.get(&i.medicine_id);
            let date_str = p
                .created_at
                .map(|t| time_fmt::fmt_date(t.date()))
                .unwrap_or_default();
            Some(DailyDrugRow {
                id: format!("{}-{}", p.id, i.id),
                medicine: med
                    .map(|m| m.medicine_name.clone())
                    .unwrap_or_else(|| i.name.clone().unwrap_or_default()),
                specification: med.map(|m| m.specification.clone()),
                quantity: i.qty,
                unit: i.unit,
                patient: p.patient.clone(),
                department: p.department.clone(),
                doctor: p.doctor.clone(),
                date: date_str,
            })
        })
        .collect();

    let total = list.len() as i64;
    Ok(Json(Envelope::ok(RowsOut { list, total })))
}

#[axum::debug_handler]
pub async fn monthly_visits(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<MonthQuery>,
) -> Result<Json<Envelope<DaysOut<MonthlyVisitRow>>>, AppError> {
    let (start, end) = month_bounds(&query.month)?;

    let rows = report::visit_counts_by_day(&state.db_pool, start, end)
        .await
        .map_err(OmmsError::Database)?;

    let list: Vec<MonthlyVisitRow> = rows
        .into_iter()
        .map(|r| MonthlyVisitRow {
            date: r.day,
            count: r.count,
        })
        .collect();

    let total_days = list.len() as i64;
    Ok(Json(Envelope::ok(DaysOut { list, total_days })))
}

#[axum::debug_handler]
pub async fn monthly_drugs(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<MonthQuery>,
) -> Result<Json<Envelope<DaysOut<MonthlyDrugRow>>>, AppError> {
    let (start, end) = month_bounds(&query.month)?;

    let prescriptions = report::prescriptions_between(&state.db_pool, Some(start), Some(end))
        .await
        .map_err(OmmsError::Database)?;

    let pids: Vec<String> = prescriptions.iter().map(|p| p.id.clone()).collect();
    let counts = if pids.is_empty() {
        Vec::new()
    } else {
        report::item_counts_by_prescription(&state.db_pool, &pids)
            .await
            .map_err(OmmsError::Database)?
    };
    let counts_by_pid: HashMap<String, i64> = counts
        .into_iter()
        .map(|c| (c.prescription_id, c.count))
        .collect();

    let mut items_by_day: HashMap<String, i64> = HashMap::new();
    for p in &prescriptions {
        let Some(created_at) = p.created_at else {
            continue;
        };
        let day = time_fmt::fmt_date(created_at.date());
        *items_by_day.entry(day).or_insert(0) += counts_by_pid.get(&p.id).copied().unwrap_or(0);
    }

    let mut days: Vec<String> = items_by_day.keys().cloned().collect();
    days.sort();
    let list: Vec<MonthlyDrugRow> = days
        .into_iter()
        .map(|date| {
            let items = items_by_day[&date];
            MonthlyDrugRow { date, items }
        })
        .collect();

    let total_days = list.len() as i64;
    Ok(Json(Envelope::ok(DaysOut { list, total_days })))
}

#[axum::debug_handler]
pub async fn custom_report(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<CustomReportQuery>,
) -> Result<Json<Envelope<RowsOut<CustomReportRow>>>, AppError> {
    let start = match &query.date_start {
        Some(raw) => Some(
            time_fmt::parse_date(raw)?
                .and_hms_opt(0, 0, 0)
                .expect("valid time"),
        ),
        None => None,
    };
    let end = match &query.date_end {
        Some(raw) => Some(
            (time_fmt::parse_date(raw)? + chrono::Duration::days(1))
                .and_hms_opt(0, 0, 0)
                .expect("valid time"),
        ),
        None => None,
    };

    let rows = report::visits_between(
        &state.db_pool,
        start,
        end,
        query.dept_name.as_deref(),
        query.doctor_name.as_deref(),
    )
    .await
    .map_err(OmmsError::Database)?;

    // Prescription item totals aggregated per day|doctor|department, so
    // a doctor's prescriptions for several patients on one day all count.
    let items_by_dday: HashMap<String, i64> = if rows.is_empty() {
        HashMap::new()
    } else {
        let prescriptions = report::prescriptions_between(&state.db_pool, start, end)
            .await
            .map_err(OmmsError::Database)?;
        let pids: Vec<String> = prescriptions.iter().map(|p| p.id.clone()).collect();
        let counts = if pids.is_empty() {
            Vec::new()
        } else {
            report::item_counts_by_prescription(&state.db_pool, &pids)
                .await
                .map_err(OmmsError::Database)?
        };
        let counts_by_pid: HashMap<String, i64> = counts
            .into_iter()
            .map(|c| (c.prescription_id, c.count))
            .collect();

        let mut totals = HashMap::new();
        for p in &prescriptions {
            let Some(created_at) = p.created_at else {
                continue;
            };
            let key = format!(
                "{}|{}|{}",
                time_fmt::fmt_date(created_at.date()),
                p.doctor,
                p.department
            );
            *totals.entry(key).or_insert(0) += counts_by_pid.get(&p.id).copied().unwrap_or(0);
        }
        totals
    };

    let list: Vec<CustomReportRow> = rows
        .into_iter()
        .map(|r| {
            let day = time_fmt::fmt_date(r.appt_time.date());
            let key = format!("{day}|{}|{}", r.doctor_name, r.dept_name);
            CustomReportRow {
                id: report_row_id(r.appt_id, r.appt_time.date()),
                patient: r.patient_name,
                department: r.dept_name,
                doctor: r.doctor_name,
                time: Some(time_fmt::fmt_datetime(r.appt_time)),
                status: status_str(r.status).to_string(),
                drug_items: items_by_dday.get(&key).copied().unwrap_or(0),
            }
        })
        .collect();

    let total = list.len() as i64;
    Ok(Json(Envelope::ok(RowsOut { list, total })))
}
