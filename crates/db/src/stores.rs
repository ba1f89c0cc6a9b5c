//! Postgres-backed implementations of the meetgrid-core ports.
//!
//! Thin adapters over the repository functions: SQL rows are converted to
//! domain types and sqlx/eyre errors into the core error taxonomy. The grid
//! save maps a zero-row conditional UPDATE to `Conflict` and a skipped
//! registrant INSERT to `DuplicateKey`, which is what the claim engine's
//! optimistic commit relies on.

use async_trait::async_trait;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use meetgrid_core::errors::{MeetgridError, MeetgridResult};
use meetgrid_core::grid::AvailabilityGrid;
use meetgrid_core::models::event::{Event, Participant};
use meetgrid_core::models::registrant::BookingRecord;
use meetgrid_core::ports::{
    EventStore, GridStore, IdentityResolver, RegistrantStore, StoredGrid,
};

use crate::models::{DbEvent, DbEventRegistrant};
use crate::repositories;

fn to_event(db: DbEvent) -> Event {
    Event {
        id: db.id,
        name: db.name,
        code: db.code,
        start_date: db.start_date,
        end_date: db.end_date,
        created_at: db.created_at,
    }
}

fn to_record(db: DbEventRegistrant) -> BookingRecord {
    BookingRecord {
        id: db.id,
        event_id: db.event_id,
        day_idx: db.day_idx as usize,
        timeslot_idx: db.timeslot_idx as usize,
        participant_name: db.participant_name,
        participant_email: db.participant_email,
        interviewer_email: db.interviewer_email,
        meeting_link: db.meeting_link,
        created_at: db.created_at,
    }
}

fn to_row(record: &BookingRecord) -> DbEventRegistrant {
    DbEventRegistrant {
        id: record.id,
        event_id: record.event_id,
        day_idx: record.day_idx as i32,
        timeslot_idx: record.timeslot_idx as i32,
        participant_name: record.participant_name.clone(),
        participant_email: record.participant_email.clone(),
        interviewer_email: record.interviewer_email.clone(),
        meeting_link: record.meeting_link.clone(),
        created_at: record.created_at,
    }
}

#[derive(Clone)]
pub struct PgEventStore {
    pool: Pool<Postgres>,
}

impl PgEventStore {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EventStore for PgEventStore {
    async fn find_event(&self, id: Uuid) -> MeetgridResult<Option<Event>> {
        let event = repositories::event::get_event_by_id(&self.pool, id)
            .await
            .map_err(MeetgridError::Database)?;
        Ok(event.map(to_event))
    }

    async fn find_event_by_code(&self, code: &str) -> MeetgridResult<Option<Event>> {
        let event = repositories::event::get_event_by_code(&self.pool, code)
            .await
            .map_err(MeetgridError::Database)?;
        Ok(event.map(to_event))
    }
}

#[derive(Clone)]
pub struct PgGridStore {
    pool: Pool<Postgres>,
}

impl PgGridStore {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GridStore for PgGridStore {
    async fn load_grid(
        &self,
        event_id: Uuid,
        participant_email: &str,
    ) -> MeetgridResult<Option<StoredGrid>> {
        let Some(event) = repositories::event::get_event_by_id(&self.pool, event_id)
            .await
            .map_err(MeetgridError::Database)?
        else {
            return Ok(None);
        };
        let days = to_event(event).days()?;

        let participant =
            repositories::participant::get_participant(&self.pool, event_id, participant_email)
                .await
                .map_err(MeetgridError::Database)?;

        match participant {
            Some(row) => Ok(Some(StoredGrid {
                grid: AvailabilityGrid::deserialize(&row.availability, days)?,
                blob: row.availability,
            })),
            None => Ok(None),
        }
    }

    async fn save_grid(
        &self,
        event_id: Uuid,
        participant_email: &str,
        grid: &AvailabilityGrid,
        expected_prior: &str,
    ) -> MeetgridResult<()> {
        let updated = repositories::participant::update_availability_if_unchanged(
            &self.pool,
            event_id,
            participant_email,
            &grid.serialize(),
            expected_prior,
        )
        .await
        .map_err(MeetgridError::Database)?;

        if !updated {
            return Err(MeetgridError::Conflict(format!(
                "availability of {participant_email} changed since read"
            )));
        }
        Ok(())
    }
}

#[derive(Clone)]
pub struct PgRegistrantStore {
    pool: Pool<Postgres>,
}

impl PgRegistrantStore {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RegistrantStore for PgRegistrantStore {
    async fn create(&self, record: &BookingRecord) -> MeetgridResult<BookingRecord> {
        let created = repositories::registrant::create_registrant(&self.pool, &to_row(record))
            .await
            .map_err(MeetgridError::Database)?;

        match created {
            Some(row) => Ok(to_record(row)),
            None => Err(MeetgridError::DuplicateKey(format!(
                "({}, {}, {}, {})",
                record.event_id, record.day_idx, record.timeslot_idx, record.interviewer_email
            ))),
        }
    }

    async fn find(&self, id: Uuid) -> MeetgridResult<Option<BookingRecord>> {
        let registrant = repositories::registrant::get_registrant_by_id(&self.pool, id)
            .await
            .map_err(MeetgridError::Database)?;
        Ok(registrant.map(to_record))
    }

    async fn exists(
        &self,
        event_id: Uuid,
        day_idx: usize,
        timeslot_idx: usize,
        interviewer_email: &str,
    ) -> MeetgridResult<bool> {
        repositories::registrant::booking_exists(
            &self.pool,
            event_id,
            day_idx as i32,
            timeslot_idx as i32,
            interviewer_email,
        )
        .await
        .map_err(MeetgridError::Database)
    }

    async fn list_by_event(&self, event_id: Uuid) -> MeetgridResult<Vec<BookingRecord>> {
        let registrants =
            repositories::registrant::list_registrants_by_event(&self.pool, event_id)
                .await
                .map_err(MeetgridError::Database)?;
        Ok(registrants.into_iter().map(to_record).collect())
    }

    async fn delete(&self, id: Uuid) -> MeetgridResult<()> {
        repositories::registrant::delete_registrant(&self.pool, id)
            .await
            .map_err(MeetgridError::Database)
    }
}

#[derive(Clone)]
pub struct PgIdentityResolver {
    pool: Pool<Postgres>,
}

impl PgIdentityResolver {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IdentityResolver for PgIdentityResolver {
    async fn resolve(&self, event_id: Uuid, email: &str) -> MeetgridResult<Participant> {
        let participant = repositories::participant::get_participant(&self.pool, event_id, email)
            .await
            .map_err(MeetgridError::Database)?
            .ok_or_else(|| MeetgridError::ParticipantNotFound(email.to_string()))?;

        Ok(Participant {
            id: participant.id,
            event_id: participant.event_id,
            email: participant.email,
            created_at: participant.created_at,
        })
    }
}
