use axum::{
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;

use crate::{handlers, ApiState};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route(
            "/api/events/:id/registrations",
            post(handlers::registration::claim_slot),
        )
        .route(
            "/api/events/:id/registrations",
            get(handlers::registration::list_registrations),
        )
        .route(
            "/api/events/:id/registrations/:booking_id",
            delete(handlers::registration::cancel_registration),
        )
}
