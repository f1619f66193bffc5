// Public entities for the NADI API
// This module contains data structures that are shared across the application boundary

// Request and response bodies for the analysis endpoints
pub mod analysis;

// Common entities for error handling
pub mod common;

pub use analysis::{AnalysisResponse, BatchAnalysisRequest, ResetResponse, StatsResponse, TemplateResponse};
pub use common::ErrorResponse;
