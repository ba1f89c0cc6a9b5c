//! # Merged Availability Handler
//!
//! Computes the event-wide merged availability view: for every `(day,
//! interval)` cell, the set of participants whose own grid is free there.
//!
//! The merge is a pure function of the stored grids, so it is recomputed on
//! every read instead of cached; a cell claimed by a confirmed booking drops
//! out of the merged view on the next read with no invalidation step.

use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use meetgrid_core::errors::MeetgridError;
use meetgrid_core::grid::{self, AvailabilityGrid, INTERVALS_PER_DAY};
use meetgrid_core::merge::{AvailabilityAggregator, MergedAvailability};
use meetgrid_core::models::event::MergedAvailabilityResponse;

use crate::{middleware::error_handling::AppError, ApiState};

#[axum::debug_handler]
pub async fn get_merged_availability(
    State(state): State<Arc<ApiState>>,
    Path(event_id): Path<Uuid>,
) -> Result<Json<MergedAvailabilityResponse>, AppError> {
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

    // A stored grid that no longer matches the event range is corruption,
    // surfaced rather than padded into shape.
    let mut grids = Vec::with_capacity(participants.len());
    for participant in &participants {
        grids.push((
            participant.email.as_str(),
            AvailabilityGrid::deserialize(&participant.availability, days)?,
        ));
    }
    let entries: Vec<(&str, &AvailabilityGrid)> =
        grids.iter().map(|(email, grid)| (*email, grid)).collect();

    let merged = if entries.is_empty() {
        MergedAvailability::empty(days)
    } else {
        AvailabilityAggregator::merge(&entries)?
    };

    Ok(Json(MergedAvailabilityResponse {
        event_id,
        days,
        intervals_per_day: INTERVALS_PER_DAY,
        cells: merged.to_rows(),
    }))
}
