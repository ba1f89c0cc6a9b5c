//! # Slot Claim Engine
//!
//! Converts a free cell of an event's merged availability into a confirmed
//! booking. A claim attempt moves through
//! `REQUESTED -> VALIDATING -> PROVISIONING -> COMMITTING -> CONFIRMED`,
//! exiting to `REJECTED` from any state before committing and to
//! `PARTIAL_FAILURE` when the commit fails after a meeting link was already
//! provisioned.
//!
//! ## Concurrency contract
//!
//! Claims against the same cell may race. The grid write is a conditional
//! update evaluated against the stored grid (not the copy read during
//! validation): the engine re-reads the grid immediately before committing
//! and the store rejects the save if the stored blob changed in between.
//! Exactly one racer wins; the loser observes `SlotNotFree`. The registrant
//! store's uniqueness key on `(event, day, slot, interviewer)` backstops the
//! same guarantee. Provisioning is awaited while holding nothing, so a slow
//! provider never blocks claims against other cells.

use std::sync::Arc;

use uuid::Uuid;

use crate::booking::ClaimContext;
use crate::errors::{MeetgridError, MeetgridResult};
use crate::models::event::Event;
use crate::models::registrant::BookingRecord;
use crate::ports::{EventStore, GridStore, IdentityResolver, MeetingProvisioner, RegistrantStore};

/// Claim duration bounds, minutes. The original system booked 30-minute
/// meetings into 15-minute cells; anything in between is allowed by policy.
pub const MIN_DURATION_MINUTES: u32 = 15;
pub const MAX_DURATION_MINUTES: u32 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimState {
    Requested,
    Validating,
    Provisioning,
    Committing,
    Confirmed,
    Rejected,
    PartialFailure,
}

#[derive(Debug, Clone)]
pub struct ClaimRequest {
    pub event_id: Uuid,
    pub day_idx: usize,
    pub timeslot_idx: usize,
    pub claimant_name: String,
    pub claimant_email: String,
    pub interviewer_email: String,
}

pub struct SlotClaimEngine {
    events: Arc<dyn EventStore>,
    grids: Arc<dyn GridStore>,
    registrants: Arc<dyn RegistrantStore>,
    identities: Arc<dyn IdentityResolver>,
    provisioner: Arc<dyn MeetingProvisioner>,
    duration_minutes: u32,
}

impl SlotClaimEngine {
    pub fn new(
        events: Arc<dyn EventStore>,
        grids: Arc<dyn GridStore>,
        registrants: Arc<dyn RegistrantStore>,
        identities: Arc<dyn IdentityResolver>,
        provisioner: Arc<dyn MeetingProvisioner>,
    ) -> Self {
        Self {
            events,
            grids,
            registrants,
            identities,
            provisioner,
            duration_minutes: MAX_DURATION_MINUTES,
        }
    }

    /// Sets the provisioned meeting duration, clamped to policy bounds.
    pub fn with_duration(mut self, duration_minutes: u32) -> Self {
        self.duration_minutes = duration_minutes.clamp(MIN_DURATION_MINUTES, MAX_DURATION_MINUTES);
        self
    }

    /// Runs one claim attempt to a terminal state. Emails are normalized to
    /// the stored lowercase identity form before any lookup.
    pub async fn claim(&self, request: ClaimRequest) -> MeetgridResult<BookingRecord> {
        let request = ClaimRequest {
            claimant_email: request.claimant_email.trim().to_lowercase(),
            interviewer_email: request.interviewer_email.trim().to_lowercase(),
            ..request
        };
        tracing::debug!(
            event_id = %request.event_id,
            day_idx = request.day_idx,
            timeslot_idx = request.timeslot_idx,
            claimant = %request.claimant_email,
            interviewer = %request.interviewer_email,
            state = ?ClaimState::Requested,
            "claim attempt started"
        );

        let (event, context) = self.validate(&request).await?;

        tracing::debug!(state = ?ClaimState::Provisioning, topic = %event.name, "provisioning meeting link");
        let start = event.slot_start(request.day_idx, request.timeslot_idx)?;
        let meeting_link = self
            .provisioner
            .provision(&event.name, start, self.duration_minutes)
            .await?;

        let record = context.assemble(meeting_link)?;
        self.commit(&context, record).await
    }

    /// VALIDATING: existence, self-booking and freshness checks. No side
    /// effects; any failure here is a clean rejection.
    async fn validate(&self, request: &ClaimRequest) -> MeetgridResult<(Event, ClaimContext)> {
        tracing::debug!(state = ?ClaimState::Validating, "validating claim");

        let event = self
            .events
            .find_event(request.event_id)
            .await?
            .ok_or_else(|| MeetgridError::EventNotFound(request.event_id.to_string()))?;

        let interviewer = self
            .identities
            .resolve(event.id, &request.interviewer_email)
            .await?;

        if request.claimant_email == interviewer.email {
            return Err(MeetgridError::SelfBooking(request.claimant_email.clone()));
        }

        let stored = self
            .grids
            .load_grid(event.id, &interviewer.email)
            .await?
            .ok_or_else(|| MeetgridError::ParticipantNotFound(interviewer.email.clone()))?;

        if !stored
            .grid
            .is_free(request.day_idx, request.timeslot_idx)?
        {
            return Err(MeetgridError::SlotNotFree {
                day_idx: request.day_idx,
                timeslot_idx: request.timeslot_idx,
            });
        }

        if self
            .registrants
            .exists(
                event.id,
                request.day_idx,
                request.timeslot_idx,
                &interviewer.email,
            )
            .await?
        {
            return Err(MeetgridError::SlotNotFree {
                day_idx: request.day_idx,
                timeslot_idx: request.timeslot_idx,
            });
        }

        let context = ClaimContext {
            event_id: event.id,
            day_idx: request.day_idx,
            timeslot_idx: request.timeslot_idx,
            claimant_name: request.claimant_name.clone(),
            claimant_email: request.claimant_email.clone(),
            interviewer_email: interviewer.email,
        };
        Ok((event, context))
    }

    /// COMMITTING: conditional grid write, then registrant creation. A lost
    /// race surfaces as `SlotNotFree`; any other failure past this point
    /// leaves an orphaned meeting link and is reported as `PartialCommit`
    /// for reconciliation, never retried here.
    async fn commit(
        &self,
        context: &ClaimContext,
        record: BookingRecord,
    ) -> MeetgridResult<BookingRecord> {
        tracing::debug!(state = ?ClaimState::Committing, booking_id = %record.id, "committing claim");

        // Re-read: the cell must still be free in the *stored* grid, not the
        // copy taken during validation.
        let stored = match self
            .grids
            .load_grid(context.event_id, &context.interviewer_email)
            .await
        {
            Ok(Some(stored)) => stored,
            Ok(None) => {
                return Err(self.partial_failure(&record, "grid disappeared before commit"));
            }
            Err(err) => return Err(self.partial_failure(&record, &err.to_string())),
        };

        let mut grid = stored.grid;
        if !grid.is_free(context.day_idx, context.timeslot_idx)? {
            tracing::warn!(
                booking_id = %record.id,
                meeting_link = %record.meeting_link,
                "claim lost the race before the grid write; meeting link is orphaned"
            );
            return Err(MeetgridError::SlotNotFree {
                day_idx: context.day_idx,
                timeslot_idx: context.timeslot_idx,
            });
        }
        grid.mark_occupied(context.day_idx, context.timeslot_idx, &context.claimant_email)?;

        match self
            .grids
            .save_grid(
                context.event_id,
                &context.interviewer_email,
                &grid,
                &stored.blob,
            )
            .await
        {
            Ok(()) => {}
            Err(MeetgridError::Conflict(_)) => {
                tracing::warn!(
                    booking_id = %record.id,
                    meeting_link = %record.meeting_link,
                    "conditional grid write lost the race; meeting link is orphaned"
                );
                return Err(MeetgridError::SlotNotFree {
                    day_idx: context.day_idx,
                    timeslot_idx: context.timeslot_idx,
                });
            }
            Err(err) => return Err(self.partial_failure(&record, &err.to_string())),
        }

        match self.registrants.create(&record).await {
            Ok(persisted) => {
                tracing::info!(
                    state = ?ClaimState::Confirmed,
                    booking_id = %persisted.id,
                    event_id = %persisted.event_id,
                    day_idx = persisted.day_idx,
                    timeslot_idx = persisted.timeslot_idx,
                    "claim confirmed"
                );
                Ok(persisted)
            }
            Err(MeetgridError::DuplicateKey(key)) => {
                // The conditional grid write should have serialized racers;
                // reaching here means the grid cell and the registrant table
                // disagree and need reconciliation.
                tracing::warn!(
                    booking_id = %record.id,
                    key = %key,
                    "duplicate booking key after successful grid write; grid cell needs reconciliation"
                );
                Err(MeetgridError::SlotNotFree {
                    day_idx: context.day_idx,
                    timeslot_idx: context.timeslot_idx,
                })
            }
            Err(err) => Err(self.partial_failure(&record, &err.to_string())),
        }
    }

    fn partial_failure(&self, record: &BookingRecord, cause: &str) -> MeetgridError {
        tracing::error!(
            state = ?ClaimState::PartialFailure,
            booking_id = %record.id,
            event_id = %record.event_id,
            meeting_link = %record.meeting_link,
            cause,
            "claim commit failed after provisioning; orphaned meeting link requires reconciliation"
        );
        MeetgridError::PartialCommit {
            meeting_link: record.meeting_link.clone(),
        }
    }

    /// Cancels a confirmed booking: frees the interviewer's grid cell with
    /// the same conditional-write discipline, then deletes the record. The
    /// cell is cleared first so any failure leaves the booking in place and
    /// cancellation retryable; `clear` is a no-op once the cell is free.
    pub async fn cancel(&self, booking_id: Uuid) -> MeetgridResult<()> {
        let record = self
            .registrants
            .find(booking_id)
            .await?
            .ok_or_else(|| MeetgridError::BookingNotFound(booking_id.to_string()))?;

        let stored = self
            .grids
            .load_grid(record.event_id, &record.interviewer_email)
            .await?
            .ok_or_else(|| MeetgridError::ParticipantNotFound(record.interviewer_email.clone()))?;

        let mut grid = stored.grid;
        if grid.clear(record.day_idx, record.timeslot_idx, &record.participant_email)? {
            self.grids
                .save_grid(
                    record.event_id,
                    &record.interviewer_email,
                    &grid,
                    &stored.blob,
                )
                .await?;
        }

        self.registrants.delete(record.id).await?;

        tracing::info!(booking_id = %booking_id, "booking cancelled");
        Ok(())
    }
}
