
use std::sync::Arc;

use axum::{body::to_bytes, response::Response};
use serde::de::DeserializeOwned;

use nadi_data::repository::InMemoryUsageCounter;
use nadi_domain::services::AnalysisService;
use nadi_domain::testing::{create_mock_health_service, create_mock_result_service};

use crate::api::state::AppState;

/// State over mock storage and a fresh counter
pub(crate) fn test_state() -> AppState {
    AppState::new(
        Arc::new(AnalysisService::default()),
        Arc::new(create_mock_result_service()),
        Arc::new(InMemoryUsageCounter::new()),
        Arc::new(create_mock_health_service()),
    )
}

/// Read a JSON response body
pub(crate) async fn body_json<T: DeserializeOwned>(response: Response) -> T {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
