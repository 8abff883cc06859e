use axum::{Router, routing::post};

use crate::state::AppState;

use super::controller::{create_class, list_classes};

pub fn init_classes_router() -> Router<AppState> {
    Router::new()
        .route("/create", post(create_class))
        .route("/list", post(list_classes))
}
