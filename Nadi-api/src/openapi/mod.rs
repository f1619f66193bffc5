use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Configure Swagger UI endpoints
pub fn configure_swagger_routes() -> SwaggerUi {
    SwaggerUi::new("/api-docs")
        .url("/api-docs/openapi.json", ApiDoc::openapi())
}

// API Documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        // Health endpoints
        crate::api::handlers::health::health_check,

        // Analysis endpoints
        crate::api::handlers::analysis::get_template,
        crate::api::handlers::analysis::analyze_batch,
        crate::api::handlers::analysis::analyze_personal,

        // Last result and counters
        crate::api::handlers::results::get_latest,
        crate::api::handlers::results::reset_latest,
        crate::api::handlers::results::get_stats,
        crate::api::handlers::results::record_visit
    ),
    components(
        schemas(
            // Entities
            crate::entities::analysis::BatchAnalysisRequest,
            crate::entities::analysis::AnalysisResponse,
            crate::entities::analysis::TemplateResponse,
            crate::entities::analysis::StatsResponse,
            crate::entities::analysis::ResetResponse,
            crate::entities::common::ErrorResponse,

            // Domain entities
            nadi_domain::entities::ReadingRow,
            nadi_domain::entities::PersonalAnalysisRequest,
            nadi_domain::entities::PersonalReading,
            nadi_domain::entities::AnalysisReport,
            nadi_domain::entities::AnalyzedReading,
            nadi_domain::entities::Classification,
            nadi_domain::entities::SecondaryFlags,
            nadi_domain::entities::ReadingLabel,
            nadi_domain::entities::SubjectSummary,
            nadi_domain::entities::AnalysisMode,
            nadi_domain::entities::AlertLevel,
            nadi_domain::entities::StoredAnalysis,

            // Health handlers
            crate::api::handlers::health::HealthResponse,
            crate::api::handlers::health::ComponentStatus,
            crate::api::handlers::health::ComponentHealthStatus
        )
    ),
    tags(
        (name = "health", description = "Health check endpoint"),
        (name = "analysis", description = "Blood pressure anomaly detection and RK4 forecasting"),
        (name = "results", description = "Last analysis result"),
        (name = "stats", description = "Usage counters")
    ),
    info(
        title = "NADI API",
        version = "0.1.0",
        description = "Flags hypertensive and hypotensive readings and forecasts the next reading per subject",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        ),
    ),
    servers(
        (url = "/", description = "Local development server")
    )
)]
pub struct ApiDoc;
