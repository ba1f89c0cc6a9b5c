use eyre::Result;
use sqlx::{Pool, Postgres};
use tracing::info;

pub async fn initialize_database(pool: &Pool<Postgres>) -> Result<()> {
    info!("Initializing database schema...");

    // Create events table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS events (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            name VARCHAR(255) NOT NULL,
            code VARCHAR(16) NOT NULL UNIQUE,
            start_date DATE NOT NULL,
            end_date DATE NOT NULL,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            CONSTRAINT valid_date_range CHECK (end_date >= start_date)
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create event_participants table; availability holds the serialized grid
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS event_participants (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            event_id UUID NOT NULL REFERENCES events(id) ON DELETE CASCADE,
            email VARCHAR(255) NOT NULL,
            availability TEXT NOT NULL,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            CONSTRAINT one_grid_per_participant UNIQUE (event_id, email)
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create event_registrants table; the uniqueness constraint is the
    // no-double-booking guarantee of last resort
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS event_registrants (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            event_id UUID NOT NULL REFERENCES events(id) ON DELETE CASCADE,
            day_idx INTEGER NOT NULL CHECK (day_idx >= 0),
            timeslot_idx INTEGER NOT NULL CHECK (timeslot_idx >= 0 AND timeslot_idx < 96),
            participant_name VARCHAR(255) NOT NULL,
            participant_email VARCHAR(255) NOT NULL,
            interviewer_email VARCHAR(255) NOT NULL,
            meeting_link TEXT NOT NULL,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            CONSTRAINT one_booking_per_slot UNIQUE (event_id, day_idx, timeslot_idx, interviewer_email)
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create indexes
    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_events_code ON events(code);
        CREATE INDEX IF NOT EXISTS idx_event_participants_event_id ON event_participants(event_id);
        CREATE INDEX IF NOT EXISTS idx_event_registrants_event_id ON event_registrants(event_id);
        CREATE INDEX IF NOT EXISTS idx_event_registrants_interviewer ON event_registrants(interviewer_email);
        "#,
    )
    .execute(pool)
    .await?;

    info!("Database schema initialized successfully.");
    Ok(())
}
