use crate::handlers;
use crate::state::AppState;
use axum::{
    Router, middleware,
    routing::{get, post},
};

pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/today", get(handlers::get_today))
        .route("/stats/days", get(handlers::get_days))
        .route("/log", post(handlers::log))
        .route("/reset", post(handlers::reset))
        .route("/goal", post(handlers::update_goal))
        .layer(middleware::from_fn(handlers::require_identity));

    Router::new()
        .nest("/api/webapp", api.clone())
        .merge(api)
        .with_state(state)
}
