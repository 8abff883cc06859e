use axum::{Router, routing::post};

use crate::state::AppState;

use super::controller::{create_teacher, delete_users, list_users};

pub fn init_teachers_router() -> Router<AppState> {
    Router::new().route("/create", post(create_teacher))
}

pub fn init_users_router() -> Router<AppState> {
    Router::new()
        .route("/list", post(list_users))
        .route("/delete", post(delete_users))
}
