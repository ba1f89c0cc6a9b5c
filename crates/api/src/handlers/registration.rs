//! # Registration Handlers
//!
//! The claim endpoint: converts a free cell of the merged availability into
//! a confirmed booking through the slot-claim engine. When the request does
//! not name an interviewer, the first free participant at the cell is
//! targeted: lowest identity first, the same deterministic order for every
//! caller.

use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use meetgrid_core::claim::ClaimRequest;
use meetgrid_core::errors::MeetgridError;
use meetgrid_core::grid::{self, AvailabilityGrid};
use meetgrid_core::merge::AvailabilityAggregator;
use meetgrid_core::models::registrant::{BookingResponse, ClaimSlotRequest};

use crate::{middleware::error_handling::AppError, ApiState};

#[axum::debug_handler]
pub async fn claim_slot(
    State(state): State<Arc<ApiState>>,
    Path(event_id): Path<Uuid>,
    Json(payload): Json<ClaimSlotRequest>,
) -> Result<Json<BookingResponse>, AppError> {
    let interviewer_email = match payload.interviewer_email {
        Some(email) => email,
        None => pick_interviewer(&state, event_id, payload.day_idx, payload.timeslot_idx).await?,
    };

    let record = state
        .engine
        .claim(ClaimRequest {
            event_id,
            day_idx: payload.day_idx,
            timeslot_idx: payload.timeslot_idx,
            claimant_name: payload.participant_name,
            claimant_email: payload.participant_email,
            interviewer_email,
        })
        .await?;

    Ok(Json(record.into()))
}

/// Tie-break policy for an unnamed target: the lowest-ordered participant
/// still free at the cell.
async fn pick_interviewer(
    state: &ApiState,
    event_id: Uuid,
    day_idx: usize,
    timeslot_idx: usize,
) -> Result<String, AppError> {
    let db_event = meetgrid_db::repositories::event::get_event_by_id(&state.db_pool, event_id)
        .await
        .map_err(MeetgridError::Database)?
        .ok_or_else(|| MeetgridError::EventNotFound(event_id.to_string()))?;
    let days = grid::day_span(db_event.start_date, db_event.end_date)?;

    let participants = meetgrid_db::repositories::participant::list_participants_by_event(
        &state.db_pool,
        event_id,
    )
    .await
    .map_err(MeetgridError::Database)?;

    let mut grids = Vec::with_capacity(participants.len());
    for participant in &participants {
        grids.push((
            participant.email.as_str(),
            AvailabilityGrid::deserialize(&participant.availability, days)?,
        ));
    }
    let entries: Vec<(&str, &AvailabilityGrid)> =
        grids.iter().map(|(email, grid)| (*email, grid)).collect();

    if entries.is_empty() {
        return Err(AppError(MeetgridError::SlotNotFree {
            day_idx,
            timeslot_idx,
        }));
    }

    let merged = AvailabilityAggregator::merge(&entries)?;
    merged
        .first_free(day_idx, timeslot_idx)?
        .map(str::to_string)
        .ok_or_else(|| {
            AppError(MeetgridError::SlotNotFree {
                day_idx,
                timeslot_idx,
            })
        })
}

#[axum::debug_handler]
pub async fn list_registrations(
    State(state): State<Arc<ApiState>>,
    Path(event_id): Path<Uuid>,
) -> Result<Json<Vec<BookingResponse>>, AppError> {
    meetgrid_db::repositories::event::get_event_by_id(&state.db_pool, event_id)
        .await
        .map_err(MeetgridError::Database)?
        .ok_or_else(|| MeetgridError::EventNotFound(event_id.to_string()))?;

    let registrants =
        meetgrid_db::repositories::registrant::list_registrants_by_event(&state.db_pool, event_id)
            .await
            .map_err(MeetgridError::Database)?;

    Ok(Json(
        registrants
            .into_iter()
            .map(|r| BookingResponse {
                id: r.id,
                event_id: r.event_id,
                day_idx: r.day_idx as usize,
                timeslot_idx: r.timeslot_idx as usize,
                participant_name: r.participant_name,
                participant_email: r.participant_email,
                interviewer_email: r.interviewer_email,
                meeting_link: r.meeting_link,
                created_at: r.created_at,
            })
            .collect(),
    ))
}

/// Cancellation deletes the booking record and frees the grid cell; the
/// record itself is never mutated.
#[axum::debug_handler]
pub async fn cancel_registration(
    State(state): State<Arc<ApiState>>,
    Path((_event_id, booking_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<serde_json::Value>, AppError> {
    state.engine.cancel(booking_id).await?;

    Ok(Json(serde_json::json!({ "cancelled": booking_id })))
}
