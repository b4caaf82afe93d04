use crate::models::DbPatient;
use eyre::Result;
use sqlx::{Pool, Postgres};

const PATIENT_COLUMNS: &str = "patient_id, user_id, name, gender, birthday, id_card, address, \
     emergency_contact, emergency_phone, created_at, updated_at";

pub async fn get_patient_by_id(pool: &Pool<Postgres>, patient_id: i64) -> Result<Option<DbPatient>> {
    let patient = sqlx::query_as::<_, DbPatient>(&format!(
        r#"
        SELECT {PATIENT_COLUMNS}
        FROM patients
        WHERE patient_id = $1
        "#,
    ))
    .bind(patient_id)
    .fetch_optional(pool)
    .await?;

    Ok(patient)
}

pub async fn get_patient_by_user_id(pool: &Pool<Postgres>, user_id: i64) -> Result<Option<DbPatient>> {
    let patient = sqlx::query_as::<_, DbPatient>(&format!(
        r#"
        SELECT {PATIENT_COLUMNS}
        FROM patients
        WHERE user_id = $1
        "#,
    ))
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(patient)
}
