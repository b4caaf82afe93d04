use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbUser {
    pub user_id: i64,
    pub username: String,
    pub password: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub real_name: Option<String>,
    pub status: i16,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
    pub last_login_at: Option<NaiveDateTime>,
    pub role_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbPatient {
    pub patient_id: i64,
    pub user_id: i64,
    pub name: String,
    pub gender: Option<i16>,
    pub birthday: Option<NaiveDate>,
    pub id_card: Option<String>,
    pub address: Option<String>,
    pub emergency_contact: Option<String>,
    pub emergency_phone: Option<String>,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbDepartment {
    pub dept_id: i64,
    pub dept_name: String,
    pub description: Option<String>,
    pub parent_id: Option<i64>,
    pub sort_order: i32,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbDoctor {
    pub doctor_id: i64,
    pub user_id: i64,
    pub doctor_name: String,
    pub dept_id: i64,
    pub title: Option<String>,
    pub specialty: Option<String>,
    pub introduction: Option<String>,
    pub available_status: i16,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}

/// Doctor joined with its department name.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbDoctorDetail {
    pub doctor_id: i64,
    pub user_id: i64,
    pub doctor_name: String,
    pub dept_id: i64,
    pub dept_name: String,
    pub title: Option<String>,
    pub specialty: Option<String>,
    pub introduction: Option<String>,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbSchedule {
    pub schedule_id: i64,
    pub doctor_id: i64,
    pub work_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub max_appointments: i32,
    pub status: i16,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}

/// Schedule joined with doctor and department names for the listing view.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbScheduleDetail {
    pub schedule_id: i64,
    pub doctor_id: i64,
    pub doctor_name: String,
    pub dept_id: i64,
    pub dept_name: String,
    pub work_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub max_appointments: i32,
    pub status: i16,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbAppointment {
    pub appt_id: i64,
    pub patient_id: i64,
    pub doctor_id: i64,
    pub schedule_id: i64,
    pub appt_time: NaiveDateTime,
    pub status: i16,
    pub symptom_desc: Option<String>,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}

/// Appointment joined with patient, doctor and department names.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbAppointmentDetail {
    pub appt_id: i64,
    pub patient_id: i64,
    pub patient_name: String,
    pub doctor_id: i64,
    pub doctor_name: String,
    pub dept_id: i64,
    pub dept_name: String,
    pub schedule_id: i64,
    pub appt_time: NaiveDateTime,
    pub status: i16,
    pub symptom_desc: Option<String>,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbRecord {
    pub id: String,
    pub dept_id: i64,
    pub doctor_id: i64,
    pub patient_id: Option<i64>,
    pub patient_name: Option<String>,
    pub created_at: NaiveDateTime,
    pub status: String,
    pub template_id: Option<i64>,
    pub chief_complaint: Option<String>,
    pub diagnosis: Option<String>,
    pub prescriptions_json: Option<String>,
    pub labs_json: Option<String>,
    pub imaging_json: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbRecordTemplate {
    pub id: i64,
    pub name: String,
    pub scope: String,
    pub fields_json: Option<String>,
    pub defaults_json: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbMedicine {
    pub medicine_id: i64,
    pub medicine_name: String,
    pub specification: String,
    pub dosage_form: String,
    pub manufacturer: String,
    pub unit: String,
    pub price: f64,
    pub warning_stock: i32,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbMedicineStock {
    pub stock_id: i64,
    pub medicine_id: i64,
    pub current_stock: i32,
    pub last_stock_in_time: Option<NaiveDateTime>,
    pub last_stock_out_time: Option<NaiveDateTime>,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbInventoryBatch {
    pub id: i64,
    pub medicine_id: i64,
    pub batch_no: String,
    pub quantity: i32,
    pub received_at: NaiveDate,
    pub expiry_date: Option<NaiveDate>,
    pub created_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbInventoryLog {
    pub id: i64,
    #[sqlx(rename = "type")]
    pub log_type: String,
    pub medicine_id: i64,
    pub quantity: i32,
    pub time: Option<NaiveDateTime>,
    pub note: Option<String>,
    pub batch_no: Option<String>,
    pub created_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbPrescription {
    pub id: String,
    pub patient: String,
    pub department: String,
    pub doctor: String,
    pub created_at: Option<NaiveDateTime>,
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbPrescriptionItem {
    pub id: i64,
    pub prescription_id: String,
    pub medicine_id: i64,
    pub name: Option<String>,
    pub qty: i32,
    pub unit: Option<String>,
    pub price: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbSupplier {
    pub id: i64,
    pub name: String,
    pub contact: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbSupplierOrder {
    pub id: String,
    pub supplier_id: i64,
    pub created_at: NaiveDateTime,
    pub status: String,
    pub amount: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbSupplierOrderItem {
    pub id: i64,
    pub order_id: String,
    pub medicine_id: i64,
    pub name: Option<String>,
    pub qty: i32,
    pub unit: Option<String>,
    pub price: f64,
}

/// Joined appointment row used by the reporting queries.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbVisitRow {
    pub appt_id: i64,
    pub appt_time: NaiveDateTime,
    pub status: i16,
    pub patient_name: String,
    pub doctor_name: String,
    pub dept_name: String,
}
