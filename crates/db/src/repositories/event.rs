use chrono::{NaiveDate, Utc};
use eyre::Result;
use rand::distributions::Alphanumeric;
use rand::Rng;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::models::DbEvent;

/// Length of the human-shareable event lookup code.
const CODE_LENGTH: usize = 6;

fn generate_code() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(CODE_LENGTH)
        .map(|c| (c as char).to_ascii_uppercase())
        .collect()
}

pub async fn create_event(
    pool: &Pool<Postgres>,
    name: &str,
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> Result<DbEvent> {
    let id = Uuid::new_v4();
    let code = generate_code();
    let now = Utc::now();

    tracing::debug!("Creating event: id={}, name={}, code={}", id, name, code);

    let event = sqlx::query_as::<_, DbEvent>(
        r#"
        INSERT INTO events (id, name, code, start_date, end_date, created_at)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id, name, code, start_date, end_date, created_at
        "#,
    )
    .bind(id)
    .bind(name)
    .bind(&code)
    .bind(start_date)
    .bind(end_date)
    .bind(now)
    .fetch_one(pool)
    .await?;

    tracing::debug!("Event created successfully: id={}", id);
    Ok(event)
}

pub async fn get_event_by_id(pool: &Pool<Postgres>, id: Uuid) -> Result<Option<DbEvent>> {
    let event = sqlx::query_as::<_, DbEvent>(
        r#"
        SELECT id, name, code, start_date, end_date, created_at
        FROM events
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(event)
}

pub async fn get_event_by_code(pool: &Pool<Postgres>, code: &str) -> Result<Option<DbEvent>> {
    let event = sqlx::query_as::<_, DbEvent>(
        r#"
        SELECT id, name, code, start_date, end_date, created_at
        FROM events
        WHERE code = $1
        "#,
    )
    .bind(code)
    .fetch_optional(pool)
    .await?;

    Ok(event)
}

/// Updates mutable event fields. The date range is immutable by policy once
/// participants have submitted availability, so only the name is updatable.
pub async fn update_event(pool: &Pool<Postgres>, id: Uuid, name: &str) -> Result<DbEvent> {
    let event = sqlx::query_as::<_, DbEvent>(
        r#"
        UPDATE events
        SET name = $2
        WHERE id = $1
        RETURNING id, name, code, start_date, end_date, created_at
        "#,
    )
    .bind(id)
    .bind(name)
    .fetch_one(pool)
    .await?;

    Ok(event)
}

pub async fn delete_event(pool: &Pool<Postgres>, id: Uuid) -> Result<()> {
    sqlx::query("DELETE FROM events WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(())
}
