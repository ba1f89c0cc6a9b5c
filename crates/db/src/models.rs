use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbEvent {
    pub id: Uuid,
    pub name: String,
    pub code: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbEventParticipant {
    pub id: Uuid,
    pub event_id: Uuid,
    pub email: String,
    /// Day-major serialized availability grid (see meetgrid-core `grid`).
    pub availability: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbEventRegistrant {
    pub id: Uuid,
    pub event_id: Uuid,
    pub day_idx: i32,
    pub timeslot_idx: i32,
    pub participant_name: String,
    pub participant_email: String,
    pub interviewer_email: String,
    pub meeting_link: String,
    pub created_at: DateTime<Utc>,
}
