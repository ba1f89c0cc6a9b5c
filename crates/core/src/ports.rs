//! Collaborator interfaces consumed by the claim engine.
//!
//! The engine never touches a database or external provider directly; it is
//! handed these ports at construction so tests can substitute deterministic
//! fakes (see the `memory` module).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::errors::MeetgridResult;
use crate::grid::AvailabilityGrid;
use crate::models::event::{Event, Participant};
use crate::models::registrant::BookingRecord;

/// A grid read paired with its stored representation. The blob is the
/// optimistic-concurrency token for `GridStore::save_grid`: a save succeeds
/// only while the stored blob still equals the one read here.
#[derive(Debug, Clone)]
pub struct StoredGrid {
    pub grid: AvailabilityGrid,
    pub blob: String,
}

#[async_trait]
pub trait EventStore: Send + Sync {
    async fn find_event(&self, id: Uuid) -> MeetgridResult<Option<Event>>;

    async fn find_event_by_code(&self, code: &str) -> MeetgridResult<Option<Event>>;
}

#[async_trait]
pub trait GridStore: Send + Sync {
    async fn load_grid(
        &self,
        event_id: Uuid,
        participant_email: &str,
    ) -> MeetgridResult<Option<StoredGrid>>;

    /// Conditional write: replaces the stored grid only if its current
    /// serialized form still equals `expected_prior`. A lost race is
    /// `MeetgridError::Conflict`.
    async fn save_grid(
        &self,
        event_id: Uuid,
        participant_email: &str,
        grid: &AvailabilityGrid,
        expected_prior: &str,
    ) -> MeetgridResult<()>;
}

#[async_trait]
pub trait RegistrantStore: Send + Sync {
    /// Inserts the record. The store enforces uniqueness of
    /// `(event_id, day_idx, timeslot_idx, interviewer_email)`; a violation
    /// is `MeetgridError::DuplicateKey`.
    async fn create(&self, record: &BookingRecord) -> MeetgridResult<BookingRecord>;

    async fn find(&self, id: Uuid) -> MeetgridResult<Option<BookingRecord>>;

    async fn exists(
        &self,
        event_id: Uuid,
        day_idx: usize,
        timeslot_idx: usize,
        interviewer_email: &str,
    ) -> MeetgridResult<bool>;

    async fn list_by_event(&self, event_id: Uuid) -> MeetgridResult<Vec<BookingRecord>>;

    async fn delete(&self, id: Uuid) -> MeetgridResult<()>;
}

#[async_trait]
pub trait IdentityResolver: Send + Sync {
    /// Resolves an email to the event participant it belongs to, or
    /// `MeetgridError::ParticipantNotFound`.
    async fn resolve(&self, event_id: Uuid, email: &str) -> MeetgridResult<Participant>;
}

#[async_trait]
pub trait MeetingProvisioner: Send + Sync {
    /// Obtains an externally hosted meeting link for a confirmed slot.
    /// Failures are `MeetgridError::Provisioning` and leave no state behind.
    async fn provision(
        &self,
        topic: &str,
        start: DateTime<Utc>,
        duration_minutes: u32,
    ) -> MeetgridResult<String>;
}
