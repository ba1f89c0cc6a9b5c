use axum::{
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;

use crate::{handlers, ApiState};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/api/events", post(handlers::event::create_event))
        .route("/api/events/lookup", get(handlers::event::get_event_by_code))
        .route("/api/events/:id", get(handlers::event::get_event))
        .route("/api/events/:id", put(handlers::event::update_event))
        .route("/api/events/:id", delete(handlers::event::delete_event))
}
