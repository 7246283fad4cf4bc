use crate::config::IDENTITY_HEADER;
use crate::errors::AppError;
use crate::goal::validate_goal;
use crate::models::{Ack, DaysQuery, DaysResponse, GoalRequest, LogRequest, TodaySnapshot};
use crate::series::{build_days, clamp_window};
use crate::state::AppState;
use axum::{
    Json,
    extract::{Query, Request, State},
    middleware::Next,
    response::Response,
};
use chrono::{Local, NaiveDate};
use tracing::{debug, info};

/// Rejects requests that carry no identity token. The token itself is opaque.
pub async fn require_identity(request: Request, next: Next) -> Result<Response, AppError> {
    if !request.headers().contains_key(IDENTITY_HEADER) {
        return Err(AppError::unauthorized("init data required"));
    }

    Ok(next.run(request).await)
}

pub async fn get_today(State(state): State<AppState>) -> Result<Json<TodaySnapshot>, AppError> {
    let data = state.data.lock().await;
    let consumed_ml = data.days.get(&today()).copied().unwrap_or_default();

    Ok(Json(TodaySnapshot {
        consumed_ml,
        goal_ml: data.goal_ml,
        default_glass_ml: data.default_glass_ml,
    }))
}

pub async fn get_days(
    State(state): State<AppState>,
    Query(query): Query<DaysQuery>,
) -> Result<Json<DaysResponse>, AppError> {
    let window = clamp_window(query.days);
    let data = state.data.lock().await;
    Ok(Json(build_days(&data, window)))
}

pub async fn log(
    State(state): State<AppState>,
    Json(payload): Json<LogRequest>,
) -> Result<Json<Ack>, AppError> {
    if payload.amount_ml == 0 {
        return Err(AppError::bad_request("amount_ml != 0 required"));
    }

    let date = today();
    let total = state
        .mutate(|data| {
            let entry = data.days.entry(date).or_default();
            *entry = entry.saturating_add(payload.amount_ml);
            *entry
        })
        .await?;

    debug!(amount_ml = payload.amount_ml, total, "logged intake");
    Ok(Json(Ack { ok: true }))
}

pub async fn reset(State(state): State<AppState>) -> Result<Json<Ack>, AppError> {
    let date = today();
    state
        .mutate(|data| {
            data.days.remove(&date);
        })
        .await?;

    info!("reset today's intake");
    Ok(Json(Ack { ok: true }))
}

pub async fn update_goal(
    State(state): State<AppState>,
    Json(payload): Json<GoalRequest>,
) -> Result<Json<Ack>, AppError> {
    let goal_ml = validate_goal(payload.goal_ml)?;

    state.mutate(|data| data.goal_ml = goal_ml).await?;

    info!(goal_ml, "updated daily goal");
    Ok(Json(Ack { ok: true }))
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}
