use axum::{
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;

use crate::{handlers, ApiState};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route(
            "/api/events/:id/participants",
            post(handlers::participant::join_event),
        )
        .route(
            "/api/events/:id/participants",
            get(handlers::participant::list_participants),
        )
        .route(
            "/api/events/:id/participants/:email/availability",
            get(handlers::participant::get_availability),
        )
        .route(
            "/api/events/:id/participants/:email/availability",
            put(handlers::participant::update_availability),
        )
}
