//! Assembly of the booking record produced by a successful claim.

use chrono::Utc;
use uuid::Uuid;

use crate::errors::{MeetgridError, MeetgridResult};
use crate::models::registrant::BookingRecord;

/// Everything a claim has established by the time the meeting link arrives.
#[derive(Debug, Clone)]
pub struct ClaimContext {
    pub event_id: Uuid,
    pub day_idx: usize,
    pub timeslot_idx: usize,
    pub claimant_name: String,
    pub claimant_email: String,
    pub interviewer_email: String,
}

impl ClaimContext {
    /// Builds the immutable record handed to the registrant store. Every
    /// field of the record must be populated; persistence and the
    /// uniqueness key are the store's concern.
    pub fn assemble(&self, meeting_link: String) -> MeetgridResult<BookingRecord> {
        for (field, value) in [
            ("participant name", &self.claimant_name),
            ("participant email", &self.claimant_email),
            ("interviewer email", &self.interviewer_email),
            ("meeting link", &meeting_link),
        ] {
            if value.trim().is_empty() {
                return Err(MeetgridError::IncompleteClaim(field.to_string()));
            }
        }

        Ok(BookingRecord {
            id: Uuid::new_v4(),
            event_id: self.event_id,
            day_idx: self.day_idx,
            timeslot_idx: self.timeslot_idx,
            participant_name: self.claimant_name.clone(),
            participant_email: self.claimant_email.clone(),
            interviewer_email: self.interviewer_email.clone(),
            meeting_link,
            created_at: Utc::now(),
        })
    }
}
