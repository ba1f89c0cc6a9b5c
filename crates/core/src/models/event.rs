use chrono::{DateTime, Days, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{MeetgridError, MeetgridResult};
use crate::grid::{self, INTERVAL_MINUTES};

/// An organizer-defined event spanning an inclusive day range. The date
/// range defines the shape of every participant grid for the event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: Uuid,
    pub name: String,
    /// Human-shareable lookup key.
    pub code: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

impl Event {
    /// Inclusive day count of the event range.
    pub fn days(&self) -> MeetgridResult<usize> {
        grid::day_span(self.start_date, self.end_date)
    }

    /// Absolute start of a slot: `start_date + day_idx` at midnight UTC plus
    /// `timeslot_idx` 15-minute intervals.
    pub fn slot_start(&self, day_idx: usize, timeslot_idx: usize) -> MeetgridResult<DateTime<Utc>> {
        let days = self.days()?;
        if day_idx >= days || timeslot_idx >= grid::INTERVALS_PER_DAY {
            return Err(MeetgridError::OutOfBounds {
                day_idx,
                timeslot_idx,
                days,
                intervals: grid::INTERVALS_PER_DAY,
            });
        }
        let date = self
            .start_date
            .checked_add_days(Days::new(day_idx as u64))
            .ok_or_else(|| MeetgridError::Validation("slot date out of range".to_string()))?;
        let seconds = timeslot_idx as u32 * INTERVAL_MINUTES * 60;
        let time = NaiveTime::from_num_seconds_from_midnight_opt(seconds, 0)
            .ok_or_else(|| MeetgridError::Validation("slot time out of range".to_string()))?;
        Ok(Utc.from_utc_datetime(&date.and_time(time)))
    }
}

/// A participant who has joined an event and owns one availability grid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Participant {
    pub id: Uuid,
    pub event_id: Uuid,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateEventRequest {
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateEventResponse {
    pub id: Uuid,
    pub name: String,
    pub code: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetEventResponse {
    pub id: Uuid,
    pub name: String,
    pub code: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub days: usize,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateEventRequest {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinEventRequest {
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticipantResponse {
    pub id: Uuid,
    pub event_id: Uuid,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateAvailabilityRequest {
    /// Day-major serialized grid, same representation the merge endpoint
    /// returns. Shape-validated against the event range before storing.
    pub availability: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergedAvailabilityResponse {
    pub event_id: Uuid,
    pub days: usize,
    pub intervals_per_day: usize,
    /// `cells[day][interval]` lists the participants free at that slot.
    pub cells: Vec<Vec<Vec<String>>>,
}
