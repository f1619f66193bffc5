use axum::{
    routing::{get, post},
    Extension, Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::debug;

use nadi_domain::config::{AnalysisConfig, ConfigError};

use crate::api::handlers::{analysis, health, results};
use crate::api::state::AppState;
use crate::openapi::configure_swagger_routes;

/// Create the application router around the given services
pub fn create_app(state: AppState) -> Router {
    debug!("Creating application router");

    let api_routes = Router::new()
        .route("/template", get(analysis::get_template))
        .route("/analysis/batch", post(analysis::analyze_batch))
        .route("/analysis/personal", post(analysis::analyze_personal))
        .route(
            "/analysis/latest",
            get(results::get_latest).delete(results::reset_latest),
        )
        .route("/stats", get(results::get_stats))
        .route("/stats/visits", post(results::record_visit));

    debug!("API routes configured");

    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .layer(Extension(state.health.clone()));

    let app = Router::new()
        .merge(public_routes)
        .nest("/api/v1", api_routes)
        .with_state(state);

    debug!("API routes nested");

    let app = add_swagger_ui(app)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    health::initialize_server_start_time();
    debug!("Health check service initialized");

    app
}

/// Create the application router with default services configured from the environment
pub fn create_application() -> Result<Router, ConfigError> {
    let config = AnalysisConfig::from_env()?;
    Ok(create_app(AppState::from_config(config)))
}

/// Add Swagger UI to the router
pub fn add_swagger_ui(app: Router) -> Router {
    app.merge(configure_swagger_routes())
}
