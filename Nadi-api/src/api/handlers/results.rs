use axum::{
    extract::{Json, State},
    response::IntoResponse,
};
use tracing::{debug, info, instrument};

use nadi_data::models::counter::CounterKind;
use nadi_domain::entities::StoredAnalysis;

use crate::api::state::AppState;
use crate::entities::{ErrorResponse, ResetResponse, StatsResponse};

/// Get the last analysis result
#[utoipa::path(
    get,
    path = "/api/v1/analysis/latest",
    responses(
        (status = 200, description = "Last analysis result", body = StoredAnalysis),
        (status = 404, description = "No analysis has been run yet", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "results"
)]
#[instrument(skip(state))]
pub async fn get_latest(State(state): State<AppState>) -> Result<impl IntoResponse, ErrorResponse> {
    let stored = state.results.latest().await?;
    debug!("Returning last analysis {}", stored.id);
    Ok(Json(stored))
}

/// Forget the last analysis result
#[utoipa::path(
    delete,
    path = "/api/v1/analysis/latest",
    responses(
        (status = 200, description = "Last result cleared", body = ResetResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "results"
)]
#[instrument(skip(state))]
pub async fn reset_latest(State(state): State<AppState>) -> Result<impl IntoResponse, ErrorResponse> {
    let cleared = state.results.reset().await?;
    info!("Last analysis reset (cleared: {})", cleared);
    Ok(Json(ResetResponse { cleared }))
}

/// Get the usage counters
#[utoipa::path(
    get,
    path = "/api/v1/stats",
    responses(
        (status = 200, description = "Usage counters", body = StatsResponse),
    ),
    tag = "stats"
)]
pub async fn get_stats(State(state): State<AppState>) -> impl IntoResponse {
    Json(StatsResponse::from(state.counters.snapshot()))
}

/// Count a visit
#[utoipa::path(
    post,
    path = "/api/v1/stats/visits",
    responses(
        (status = 200, description = "Visit counted", body = StatsResponse),
    ),
    tag = "stats"
)]
#[instrument(skip(state))]
pub async fn record_visit(State(state): State<AppState>) -> impl IntoResponse {
    let visits = state.counters.increment(CounterKind::Visits);
    debug!("Visit recorded ({} total)", visits);
    Json(StatsResponse::from(state.counters.snapshot()))
}
