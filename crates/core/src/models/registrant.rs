use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The permanent record of a confirmed slot claim. Immutable once created;
/// cancellation deletes the record rather than mutating it. At most one live
/// record may exist per `(event_id, day_idx, timeslot_idx, interviewer_email)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingRecord {
    pub id: Uuid,
    pub event_id: Uuid,
    pub day_idx: usize,
    pub timeslot_idx: usize,
    pub participant_name: String,
    pub participant_email: String,
    pub interviewer_email: String,
    pub meeting_link: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimSlotRequest {
    pub day_idx: usize,
    pub timeslot_idx: usize,
    pub participant_name: String,
    pub participant_email: String,
    /// When absent the first free participant at the cell is targeted,
    /// lowest identity first.
    pub interviewer_email: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingResponse {
    pub id: Uuid,
    pub event_id: Uuid,
    pub day_idx: usize,
    pub timeslot_idx: usize,
    pub participant_name: String,
    pub participant_email: String,
    pub interviewer_email: String,
    pub meeting_link: String,
    pub created_at: DateTime<Utc>,
}

impl From<BookingRecord> for BookingResponse {
    fn from(record: BookingRecord) -> Self {
        Self {
            id: record.id,
            event_id: record.event_id,
            day_idx: record.day_idx,
            timeslot_idx: record.timeslot_idx,
            participant_name: record.participant_name,
            participant_email: record.participant_email,
            interviewer_email: record.interviewer_email,
            meeting_link: record.meeting_link,
            created_at: record.created_at,
        }
    }
}
