use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::{Local, NaiveDate};
use tracing::{info, instrument, warn};

use nadi_data::models::counter::CounterKind;
use nadi_domain::entities::template::sample_rows;
use nadi_domain::entities::{AnalysisReport, PersonalAnalysisRequest};

use crate::api::state::AppState;
use crate::entities::{AnalysisResponse, BatchAnalysisRequest, ErrorResponse, TemplateResponse};

/// Date that synthesized timestamps are anchored to
fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Store a finished report as the last result and count it
async fn finish_analysis(
    state: &AppState,
    report: AnalysisReport,
    context_label: Option<String>,
) -> Result<AnalysisResponse, ErrorResponse> {
    let stored = state.results.record(&report, context_label).await?;
    let total = state.counters.increment(CounterKind::Analyses);
    info!("Analysis {} complete ({} analyses so far)", stored.id, total);
    Ok(AnalysisResponse::new(stored.id, report))
}

/// Analyse a table of readings from one or more subjects
#[utoipa::path(
    post,
    path = "/api/v1/analysis/batch",
    request_body = BatchAnalysisRequest,
    responses(
        (status = 200, description = "Table analysed", body = AnalysisResponse),
        (status = 400, description = "Empty table", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "analysis"
)]
#[instrument(skip(state, request))]
pub async fn analyze_batch(
    State(state): State<AppState>,
    Json(request): Json<BatchAnalysisRequest>,
) -> Result<impl IntoResponse, ErrorResponse> {
    info!("Batch analysis requested for {} rows", request.rows.len());

    if request.rows.is_empty() {
        warn!("Rejected batch analysis without rows");
        return Err(ErrorResponse::bad_request("The table must contain at least one row"));
    }

    let report = state.analysis.analyze_batch(request.rows, today());
    let response = finish_analysis(&state, report, request.source).await?;
    Ok((StatusCode::OK, Json(response)))
}

/// Analyse one person's hand-entered readings
#[utoipa::path(
    post,
    path = "/api/v1/analysis/personal",
    request_body = PersonalAnalysisRequest,
    responses(
        (status = 200, description = "Readings analysed", body = AnalysisResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "analysis"
)]
#[instrument(skip(state, request))]
pub async fn analyze_personal(
    State(state): State<AppState>,
    Json(request): Json<PersonalAnalysisRequest>,
) -> Result<impl IntoResponse, ErrorResponse> {
    info!("Personal analysis requested with {} readings", request.readings.len());

    let report = state.analysis.analyze_personal(request, today()).map_err(|e| {
        warn!("Invalid personal analysis request: {}", e);
        ErrorResponse::from(e)
    })?;
    let name = report.rows.first().map(|row| row.subject_id.clone());
    let response = finish_analysis(&state, report, name).await?;
    Ok((StatusCode::OK, Json(response)))
}

/// Example table showing the expected columns
#[utoipa::path(
    get,
    path = "/api/v1/template",
    responses(
        (status = 200, description = "Example input table", body = TemplateResponse),
    ),
    tag = "analysis"
)]
pub async fn get_template() -> impl IntoResponse {
    Json(TemplateResponse::new(sample_rows(today())))
}
