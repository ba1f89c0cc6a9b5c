use thiserror::Error;

#[derive(Error, Debug)]
pub enum MeetgridError {
    #[error("Invalid date range: end date {end} is before start date {start}")]
    InvalidRange {
        start: chrono::NaiveDate,
        end: chrono::NaiveDate,
    },

    #[error("Cell ({day_idx}, {timeslot_idx}) is outside a {days}x{intervals} grid")]
    OutOfBounds {
        day_idx: usize,
        timeslot_idx: usize,
        days: usize,
        intervals: usize,
    },

    #[error("Corrupt availability grid: {0}")]
    CorruptGrid(String),

    #[error("Grid shape mismatch: expected {expected_days} days, got {actual_days}")]
    ShapeMismatch {
        expected_days: usize,
        actual_days: usize,
    },

    #[error("Event not found: {0}")]
    EventNotFound(String),

    #[error("Participant not found: {0}")]
    ParticipantNotFound(String),

    #[error("Cannot register against your own availability: {0}")]
    SelfBooking(String),

    #[error("Slot (day {day_idx}, interval {timeslot_idx}) is no longer free")]
    SlotNotFree { day_idx: usize, timeslot_idx: usize },

    #[error("Meeting provisioning failed: {0}")]
    Provisioning(String),

    #[error("Booking commit failed after meeting was provisioned; orphaned link: {meeting_link}")]
    PartialCommit { meeting_link: String },

    #[error("Incomplete claim: missing {0}")]
    IncompleteClaim(String),

    #[error("Booking not found: {0}")]
    BookingNotFound(String),

    #[error("Conflicting concurrent update: {0}")]
    Conflict(String),

    #[error("Duplicate booking key: {0}")]
    DuplicateKey(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] eyre::Report),

    #[error("Internal server error: {0}")]
    Internal(#[from] Box<dyn std::error::Error + Send + Sync>),
}

pub type MeetgridResult<T> = Result<T, MeetgridError>;
