use axum::{Router, routing::post};

use crate::state::AppState;

use super::controller::{create_admin, get_info, issue_captcha, list_admins, login};

pub fn init_admins_router() -> Router<AppState> {
    Router::new()
        .route("/captcha", post(issue_captcha))
        .route("/login", post(login))
        .route("/info", post(get_info))
        .route("/list", post(list_admins))
        .route("/create", post(create_admin))
}
