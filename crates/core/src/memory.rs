//! In-memory implementations of the engine's ports.
//!
//! Used by the engine tests instead of Postgres. The grid save is genuinely
//! conditional under one mutex, so concurrent-claim tests exercise the same
//! lost-race semantics the SQL stores provide.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::errors::{MeetgridError, MeetgridResult};
use crate::grid::AvailabilityGrid;
use crate::models::event::{Event, Participant};
use crate::models::registrant::BookingRecord;
use crate::ports::{
    EventStore, GridStore, IdentityResolver, MeetingProvisioner, RegistrantStore, StoredGrid,
};

#[derive(Default)]
struct Inner {
    events: HashMap<Uuid, Event>,
    participants: HashMap<(Uuid, String), Participant>,
    grids: HashMap<(Uuid, String), String>,
    registrants: HashMap<Uuid, BookingRecord>,
}

/// One shared store implementing every persistence port.
#[derive(Default, Clone)]
pub struct InMemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().expect("in-memory store lock poisoned")
    }

    /// Seeds an event and returns it.
    pub fn add_event(&self, name: &str, start_date: NaiveDate, end_date: NaiveDate) -> Event {
        let event = Event {
            id: Uuid::new_v4(),
            name: name.to_string(),
            code: "TEST01".to_string(),
            start_date,
            end_date,
            created_at: Utc::now(),
        };
        self.lock().events.insert(event.id, event.clone());
        event
    }

    /// Seeds a participant with an all-free grid for the event.
    pub fn add_participant(&self, event: &Event, email: &str) -> MeetgridResult<Participant> {
        let grid = AvailabilityGrid::create(event.start_date, event.end_date)?;
        let participant = Participant {
            id: Uuid::new_v4(),
            event_id: event.id,
            email: email.to_string(),
            created_at: Utc::now(),
        };
        let mut inner = self.lock();
        inner
            .participants
            .insert((event.id, email.to_string()), participant.clone());
        inner
            .grids
            .insert((event.id, email.to_string()), grid.serialize());
        Ok(participant)
    }

    /// Direct read of a stored grid, for test assertions.
    pub fn grid_blob(&self, event_id: Uuid, email: &str) -> Option<String> {
        self.lock().grids.get(&(event_id, email.to_string())).cloned()
    }
}

#[async_trait]
impl EventStore for InMemoryStore {
    async fn find_event(&self, id: Uuid) -> MeetgridResult<Option<Event>> {
        Ok(self.lock().events.get(&id).cloned())
    }

    async fn find_event_by_code(&self, code: &str) -> MeetgridResult<Option<Event>> {
        Ok(self.lock().events.values().find(|e| e.code == code).cloned())
    }
}

#[async_trait]
impl GridStore for InMemoryStore {
    async fn load_grid(
        &self,
        event_id: Uuid,
        participant_email: &str,
    ) -> MeetgridResult<Option<StoredGrid>> {
        let inner = self.lock();
        let Some(event) = inner.events.get(&event_id) else {
            return Ok(None);
        };
        let days = event.days()?;
        match inner.grids.get(&(event_id, participant_email.to_string())) {
            Some(blob) => Ok(Some(StoredGrid {
                grid: AvailabilityGrid::deserialize(blob, days)?,
                blob: blob.clone(),
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
        let mut inner = self.lock();
        let key = (event_id, participant_email.to_string());
        let current = inner.grids.get(&key).cloned();
        match current {
            Some(current) if current == expected_prior => {
                inner.grids.insert(key, grid.serialize());
                Ok(())
            }
            Some(_) => Err(MeetgridError::Conflict(format!(
                "grid for {participant_email} changed since read"
            ))),
            None => Err(MeetgridError::ParticipantNotFound(
                participant_email.to_string(),
            )),
        }
    }
}

#[async_trait]
impl RegistrantStore for InMemoryStore {
    async fn create(&self, record: &BookingRecord) -> MeetgridResult<BookingRecord> {
        let mut inner = self.lock();
        let duplicate = inner.registrants.values().any(|r| {
            r.event_id == record.event_id
                && r.day_idx == record.day_idx
                && r.timeslot_idx == record.timeslot_idx
                && r.interviewer_email == record.interviewer_email
        });
        if duplicate {
            return Err(MeetgridError::DuplicateKey(format!(
                "({}, {}, {}, {})",
                record.event_id, record.day_idx, record.timeslot_idx, record.interviewer_email
            )));
        }
        inner.registrants.insert(record.id, record.clone());
        Ok(record.clone())
    }

    async fn find(&self, id: Uuid) -> MeetgridResult<Option<BookingRecord>> {
        Ok(self.lock().registrants.get(&id).cloned())
    }

    async fn exists(
        &self,
        event_id: Uuid,
        day_idx: usize,
        timeslot_idx: usize,
        interviewer_email: &str,
    ) -> MeetgridResult<bool> {
        Ok(self.lock().registrants.values().any(|r| {
            r.event_id == event_id
                && r.day_idx == day_idx
                && r.timeslot_idx == timeslot_idx
                && r.interviewer_email == interviewer_email
        }))
    }

    async fn list_by_event(&self, event_id: Uuid) -> MeetgridResult<Vec<BookingRecord>> {
        let mut records: Vec<BookingRecord> = self
            .lock()
            .registrants
            .values()
            .filter(|r| r.event_id == event_id)
            .cloned()
            .collect();
        records.sort_by_key(|r| (r.day_idx, r.timeslot_idx));
        Ok(records)
    }

    async fn delete(&self, id: Uuid) -> MeetgridResult<()> {
        self.lock().registrants.remove(&id);
        Ok(())
    }
}

#[async_trait]
impl IdentityResolver for InMemoryStore {
    async fn resolve(&self, event_id: Uuid, email: &str) -> MeetgridResult<Participant> {
        self.lock()
            .participants
            .get(&(event_id, email.to_string()))
            .cloned()
            .ok_or_else(|| MeetgridError::ParticipantNotFound(email.to_string()))
    }
}

/// Provisioner returning a fixed link, with optional scripted failure.
pub struct StaticProvisioner {
    link: String,
    fail: bool,
}

impl StaticProvisioner {
    pub fn new(link: &str) -> Self {
        Self {
            link: link.to_string(),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            link: String::new(),
            fail: true,
        }
    }
}

#[async_trait]
impl MeetingProvisioner for StaticProvisioner {
    async fn provision(
        &self,
        _topic: &str,
        _start: DateTime<Utc>,
        _duration_minutes: u32,
    ) -> MeetgridResult<String> {
        if self.fail {
            return Err(MeetgridError::Provisioning(
                "provider unavailable".to_string(),
            ));
        }
        Ok(self.link.clone())
    }
}
