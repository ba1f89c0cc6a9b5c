use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use meetgrid_core::errors::MeetgridError;
use meetgrid_core::grid;
use meetgrid_core::models::event::{
    CreateEventRequest, CreateEventResponse, GetEventResponse, UpdateEventRequest,
};

use crate::{middleware::error_handling::AppError, ApiState};

#[axum::debug_handler]
pub async fn create_event(
    State(state): State<Arc<ApiState>>,
    Json(payload): Json<CreateEventRequest>,
) -> Result<Json<CreateEventResponse>, AppError> {
    if payload.name.trim().is_empty() {
        return Err(AppError(MeetgridError::Validation(
            "Event name is required".to_string(),
        )));
    }
    // Rejects inverted ranges before anything is stored.
    grid::day_span(payload.start_date, payload.end_date)?;

    let db_event = meetgrid_db::repositories::event::create_event(
        &state.db_pool,
        &payload.name,
        payload.start_date,
        payload.end_date,
    )
    .await
    .map_err(MeetgridError::Database)?;

    Ok(Json(CreateEventResponse {
        id: db_event.id,
        name: db_event.name,
        code: db_event.code,
        start_date: db_event.start_date,
        end_date: db_event.end_date,
        created_at: db_event.created_at,
    }))
}

#[axum::debug_handler]
pub async fn get_event(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<GetEventResponse>, AppError> {
    let db_event = meetgrid_db::repositories::event::get_event_by_id(&state.db_pool, id)
        .await
        .map_err(MeetgridError::Database)?
        .ok_or_else(|| MeetgridError::EventNotFound(id.to_string()))?;

    let days = grid::day_span(db_event.start_date, db_event.end_date)?;
    Ok(Json(GetEventResponse {
        id: db_event.id,
        name: db_event.name,
        code: db_event.code,
        start_date: db_event.start_date,
        end_date: db_event.end_date,
        days,
        created_at: db_event.created_at,
    }))
}

#[derive(Debug, Deserialize)]
pub struct LookupQuery {
    pub code: String,
}

#[axum::debug_handler]
pub async fn get_event_by_code(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<LookupQuery>,
) -> Result<Json<GetEventResponse>, AppError> {
    let db_event = meetgrid_db::repositories::event::get_event_by_code(&state.db_pool, &query.code)
        .await
        .map_err(MeetgridError::Database)?
        .ok_or_else(|| MeetgridError::EventNotFound(query.code.clone()))?;

    let days = grid::day_span(db_event.start_date, db_event.end_date)?;
    Ok(Json(GetEventResponse {
        id: db_event.id,
        name: db_event.name,
        code: db_event.code,
        start_date: db_event.start_date,
        end_date: db_event.end_date,
        days,
        created_at: db_event.created_at,
    }))
}

#[axum::debug_handler]
pub async fn update_event(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateEventRequest>,
) -> Result<Json<GetEventResponse>, AppError> {
    let db_event = meetgrid_db::repositories::event::get_event_by_id(&state.db_pool, id)
        .await
        .map_err(MeetgridError::Database)?
        .ok_or_else(|| MeetgridError::EventNotFound(id.to_string()))?;

    let name = payload.name.as_deref().unwrap_or(&db_event.name);
    let updated = meetgrid_db::repositories::event::update_event(&state.db_pool, id, name)
        .await
        .map_err(MeetgridError::Database)?;

    let days = grid::day_span(updated.start_date, updated.end_date)?;
    Ok(Json(GetEventResponse {
        id: updated.id,
        name: updated.name,
        code: updated.code,
        start_date: updated.start_date,
        end_date: updated.end_date,
        days,
        created_at: updated.created_at,
    }))
}

#[axum::debug_handler]
pub async fn delete_event(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    meetgrid_db::repositories::event::get_event_by_id(&state.db_pool, id)
        .await
        .map_err(MeetgridError::Database)?
        .ok_or_else(|| MeetgridError::EventNotFound(id.to_string()))?;

    meetgrid_db::repositories::event::delete_event(&state.db_pool, id)
        .await
        .map_err(MeetgridError::Database)?;

    Ok(Json(serde_json::json!({ "deleted": id })))
}
