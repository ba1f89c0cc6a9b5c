use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use meetgrid_core::errors::MeetgridError;
use meetgrid_core::grid::{self, AvailabilityGrid};
use meetgrid_core::models::event::{
    JoinEventRequest, ParticipantResponse, UpdateAvailabilityRequest,
};

use crate::{middleware::error_handling::AppError, ApiState};

/// Joins an event: creates the participant row with a blank full-shape grid
/// derived from the event's date range.
#[axum::debug_handler]
pub async fn join_event(
    State(state): State<Arc<ApiState>>,
    Path(event_id): Path<Uuid>,
    Json(payload): Json<JoinEventRequest>,
) -> Result<Json<ParticipantResponse>, AppError> {
    let email = payload.email.trim().to_lowercase();
    if email.is_empty() {
        return Err(AppError(MeetgridError::Validation(
            "Email is required".to_string(),
        )));
    }

    let db_event = meetgrid_db::repositories::event::get_event_by_id(&state.db_pool, event_id)
        .await
        .map_err(MeetgridError::Database)?
        .ok_or_else(|| MeetgridError::EventNotFound(event_id.to_string()))?;

    if meetgrid_db::repositories::participant::get_participant(&state.db_pool, event_id, &email)
        .await
        .map_err(MeetgridError::Database)?
        .is_some()
    {
        return Err(AppError(MeetgridError::Validation(format!(
            "{email} has already joined this event"
        ))));
    }

    let grid = AvailabilityGrid::create(db_event.start_date, db_event.end_date)?;
    let participant = meetgrid_db::repositories::participant::create_participant(
        &state.db_pool,
        event_id,
        &email,
        &grid.serialize(),
    )
    .await
    .map_err(MeetgridError::Database)?;

    Ok(Json(ParticipantResponse {
        id: participant.id,
        event_id: participant.event_id,
        email: participant.email,
        created_at: participant.created_at,
    }))
}

#[axum::debug_handler]
pub async fn list_participants(
    State(state): State<Arc<ApiState>>,
    Path(event_id): Path<Uuid>,
) -> Result<Json<Vec<ParticipantResponse>>, AppError> {
    meetgrid_db::repositories::event::get_event_by_id(&state.db_pool, event_id)
        .await
        .map_err(MeetgridError::Database)?
        .ok_or_else(|| MeetgridError::EventNotFound(event_id.to_string()))?;

    let participants = meetgrid_db::repositories::participant::list_participants_by_event(
        &state.db_pool,
        event_id,
    )
    .await
    .map_err(MeetgridError::Database)?;

    Ok(Json(
        participants
            .into_iter()
            .map(|p| ParticipantResponse {
                id: p.id,
                event_id: p.event_id,
                email: p.email,
                created_at: p.created_at,
            })
            .collect(),
    ))
}

#[axum::debug_handler]
pub async fn get_availability(
    State(state): State<Arc<ApiState>>,
    Path((event_id, email)): Path<(Uuid, String)>,
) -> Result<Json<serde_json::Value>, AppError> {
    let participant =
        meetgrid_db::repositories::participant::get_participant(&state.db_pool, event_id, &email)
            .await
            .map_err(MeetgridError::Database)?
            .ok_or_else(|| MeetgridError::ParticipantNotFound(email.clone()))?;

    Ok(Json(serde_json::json!({
        "event_id": event_id,
        "email": participant.email,
        "availability": participant.availability,
    })))
}

/// Replaces a participant's own availability. The incoming blob is parsed
/// and shape-checked against the event range before anything is stored, so
/// a grid of the wrong dimensions can never reach the database.
#[axum::debug_handler]
pub async fn update_availability(
    State(state): State<Arc<ApiState>>,
    Path((event_id, email)): Path<(Uuid, String)>,
    Json(payload): Json<UpdateAvailabilityRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    let db_event = meetgrid_db::repositories::event::get_event_by_id(&state.db_pool, event_id)
        .await
        .map_err(MeetgridError::Database)?
        .ok_or_else(|| MeetgridError::EventNotFound(event_id.to_string()))?;

    meetgrid_db::repositories::participant::get_participant(&state.db_pool, event_id, &email)
        .await
        .map_err(MeetgridError::Database)?
        .ok_or_else(|| MeetgridError::ParticipantNotFound(email.clone()))?;

    let expected_days = grid::day_span(db_event.start_date, db_event.end_date)?;
    let grid = AvailabilityGrid::deserialize(&payload.availability, expected_days)?;

    meetgrid_db::repositories::participant::update_availability(
        &state.db_pool,
        event_id,
        &email,
        &grid.serialize(),
    )
    .await
    .map_err(MeetgridError::Database)?;

    Ok(Json(serde_json::json!({
        "event_id": event_id,
        "email": email,
        "updated": true,
    })))
}
