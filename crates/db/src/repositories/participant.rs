use chrono::Utc;
use eyre::Result;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::models::DbEventParticipant;

pub async fn create_participant(
    pool: &Pool<Postgres>,
    event_id: Uuid,
    email: &str,
    availability: &str,
) -> Result<DbEventParticipant> {
    let id = Uuid::new_v4();
    let now = Utc::now();

    tracing::debug!("Creating participant: event_id={}, email={}", event_id, email);

    let participant = sqlx::query_as::<_, DbEventParticipant>(
        r#"
        INSERT INTO event_participants (id, event_id, email, availability, created_at)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, event_id, email, availability, created_at
        "#,
    )
    .bind(id)
    .bind(event_id)
    .bind(email)
    .bind(availability)
    .bind(now)
    .fetch_one(pool)
    .await?;

    Ok(participant)
}

pub async fn get_participant(
    pool: &Pool<Postgres>,
    event_id: Uuid,
    email: &str,
) -> Result<Option<DbEventParticipant>> {
    let participant = sqlx::query_as::<_, DbEventParticipant>(
        r#"
        SELECT id, event_id, email, availability, created_at
        FROM event_participants
        WHERE event_id = $1 AND email = $2
        "#,
    )
    .bind(event_id)
    .bind(email)
    .fetch_optional(pool)
    .await?;

    Ok(participant)
}

pub async fn list_participants_by_event(
    pool: &Pool<Postgres>,
    event_id: Uuid,
) -> Result<Vec<DbEventParticipant>> {
    let participants = sqlx::query_as::<_, DbEventParticipant>(
        r#"
        SELECT id, event_id, email, availability, created_at
        FROM event_participants
        WHERE event_id = $1
        ORDER BY email
        "#,
    )
    .bind(event_id)
    .fetch_all(pool)
    .await?;

    Ok(participants)
}

/// Unconditional replacement of a participant's own availability (the owner
/// editing their grid). Claim commits never go through here; they use
/// [`update_availability_if_unchanged`].
pub async fn update_availability(
    pool: &Pool<Postgres>,
    event_id: Uuid,
    email: &str,
    availability: &str,
) -> Result<DbEventParticipant> {
    let participant = sqlx::query_as::<_, DbEventParticipant>(
        r#"
        UPDATE event_participants
        SET availability = $3
        WHERE event_id = $1 AND email = $2
        RETURNING id, event_id, email, availability, created_at
        "#,
    )
    .bind(event_id)
    .bind(email)
    .bind(availability)
    .fetch_one(pool)
    .await?;

    Ok(participant)
}

/// Conditional write: replaces the availability blob only while it still
/// equals `expected_prior`. Returns whether a row was updated; `false` means
/// a concurrent writer got there first.
pub async fn update_availability_if_unchanged(
    pool: &Pool<Postgres>,
    event_id: Uuid,
    email: &str,
    availability: &str,
    expected_prior: &str,
) -> Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE event_participants
        SET availability = $3
        WHERE event_id = $1 AND email = $2 AND availability = $4
        "#,
    )
    .bind(event_id)
    .bind(email)
    .bind(availability)
    .bind(expected_prior)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() == 1)
}
