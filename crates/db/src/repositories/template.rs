use crate::models::DbRecordTemplate;
use eyre::Result;
use sqlx::{Pool, Postgres};

const TEMPLATE_COLUMNS: &str = "id, name, scope, fields_json, defaults_json";

pub async fn list_templates(pool: &Pool<Postgres>) -> Result<Vec<DbRecordTemplate>> {
    let templates = sqlx::query_as::<_, DbRecordTemplate>(&format!(
        r#"
        SELECT {TEMPLATE_COLUMNS}
        FROM record_templates
        ORDER BY id DESC
        "#,
    ))
    .fetch_all(pool)
    .await?;

    Ok(templates)
}

pub async fn get_template_by_id(
    pool: &Pool<Postgres>,
    id: i64,
) -> Result<Option<DbRecordTemplate>> {
    let template = sqlx::query_as::<_, DbRecordTemplate>(&format!(
        r#"
        SELECT {TEMPLATE_COLUMNS}
        FROM record_templates
        WHERE id = $1
        "#,
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(template)
}

pub async fn create_template(
    pool: &Pool<Postgres>,
    name: &str,
    scope: &str,
    fields_json: Option<&str>,
    defaults_json: &str,
) -> Result<DbRecordTemplate> {
    let template = sqlx::query_as::<_, DbRecordTemplate>(&format!(
        r#"
        INSERT INTO record_templates (name, scope, fields_json, defaults_json)
        VALUES ($1, $2, $3, $4)
        RETURNING {TEMPLATE_COLUMNS}
        "#,
    ))
    .bind(name)
    .bind(scope)
    .bind(fields_json)
    .bind(defaults_json)
    .fetch_one(pool)
    .await?;

    Ok(template)
}

pub async fn update_template(
    pool: &Pool<Postgres>,
    id: i64,
    name: Option<&str>,
    scope: Option<&str>,
    fields_json: Option<Option<&str>>,
    defaults_json: Option<&str>,
) -> Result<DbRecordTemplate> {
    let template = sqlx::query_as::<_, DbRecordTemplate>(&format!(
        r#"
        UPDATE record_templates
        SET name = COALESCE($2, name),
            scope = COALESCE($3, scope),
            fields_json = CASE WHEN $4 THEN $5 ELSE fields_json END,
            defaults_json = COALESCE($6, defaults_json)
        WHERE id = $1
        RETURNING {TEMPLATE_COLUMNS}
        "#,
    ))
    .bind(id)
    .bind(name)
    .bind(scope)
    .bind(fields_json.is_some())
    .bind(fields_json.flatten())
    .bind(defaults_json)
    .fetch_one(pool)
    .await?;

    Ok(template)
}

pub async fn delete_template(pool: &Pool<Postgres>, id: i64) -> Result<()> {
    sqlx::query("DELETE FROM record_templates WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(())
}
