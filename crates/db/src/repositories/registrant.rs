use eyre::Result;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::models::DbEventRegistrant;

/// Inserts a booking row. Returns `None` when the slot's uniqueness key
/// `(event_id, day_idx, timeslot_idx, interviewer_email)` is already taken,
/// leaving the existing booking untouched.
pub async fn create_registrant(
    pool: &Pool<Postgres>,
    registrant: &DbEventRegistrant,
) -> Result<Option<DbEventRegistrant>> {
    tracing::debug!(
        "Creating registrant: event_id={}, day_idx={}, timeslot_idx={}, interviewer={}",
        registrant.event_id,
        registrant.day_idx,
        registrant.timeslot_idx,
        registrant.interviewer_email
    );

    let created = sqlx::query_as::<_, DbEventRegistrant>(
        r#"
        INSERT INTO event_registrants
            (id, event_id, day_idx, timeslot_idx, participant_name,
             participant_email, interviewer_email, meeting_link, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        ON CONFLICT ON CONSTRAINT one_booking_per_slot DO NOTHING
        RETURNING id, event_id, day_idx, timeslot_idx, participant_name,
                  participant_email, interviewer_email, meeting_link, created_at
        "#,
    )
    .bind(registrant.id)
    .bind(registrant.event_id)
    .bind(registrant.day_idx)
    .bind(registrant.timeslot_idx)
    .bind(&registrant.participant_name)
    .bind(&registrant.participant_email)
    .bind(&registrant.interviewer_email)
    .bind(&registrant.meeting_link)
    .bind(registrant.created_at)
    .fetch_optional(pool)
    .await?;

    Ok(created)
}

pub async fn get_registrant_by_id(
    pool: &Pool<Postgres>,
    id: Uuid,
) -> Result<Option<DbEventRegistrant>> {
    let registrant = sqlx::query_as::<_, DbEventRegistrant>(
        r#"
        SELECT id, event_id, day_idx, timeslot_idx, participant_name,
               participant_email, interviewer_email, meeting_link, created_at
        FROM event_registrants
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(registrant)
}

pub async fn booking_exists(
    pool: &Pool<Postgres>,
    event_id: Uuid,
    day_idx: i32,
    timeslot_idx: i32,
    interviewer_email: &str,
) -> Result<bool> {
    let exists = sqlx::query_scalar::<_, bool>(
        r#"
        SELECT EXISTS (
            SELECT 1
            FROM event_registrants
            WHERE event_id = $1 AND day_idx = $2 AND timeslot_idx = $3
              AND interviewer_email = $4
        );
        "#,
    )
    .bind(event_id)
    .bind(day_idx)
    .bind(timeslot_idx)
    .bind(interviewer_email)
    .fetch_one(pool)
    .await?;

    Ok(exists)
}

pub async fn list_registrants_by_event(
    pool: &Pool<Postgres>,
    event_id: Uuid,
) -> Result<Vec<DbEventRegistrant>> {
    let registrants = sqlx::query_as::<_, DbEventRegistrant>(
        r#"
        SELECT id, event_id, day_idx, timeslot_idx, participant_name,
               participant_email, interviewer_email, meeting_link, created_at
        FROM event_registrants
        WHERE event_id = $1
        ORDER BY day_idx, timeslot_idx
        "#,
    )
    .bind(event_id)
    .fetch_all(pool)
    .await?;

    Ok(registrants)
}

pub async fn delete_registrant(pool: &Pool<Postgres>, id: Uuid) -> Result<()> {
    sqlx::query("DELETE FROM event_registrants WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(())
}
