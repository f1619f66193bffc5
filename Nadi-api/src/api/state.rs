use std::sync::Arc;

use nadi_data::repository::{InMemoryUsageCounter, UsageCounterTrait};
use nadi_domain::config::AnalysisConfig;
use nadi_domain::health::{create_health_service, HealthServiceTrait};
use nadi_domain::services::{
    create_default_result_service, AnalysisService, AnalysisServiceTrait, ResultServiceTrait,
};

/// Services shared by every handler
#[derive(Clone)]
pub struct AppState {
    pub analysis: Arc<dyn AnalysisServiceTrait>,
    pub results: Arc<dyn ResultServiceTrait>,
    pub counters: Arc<dyn UsageCounterTrait>,
    pub health: Arc<dyn HealthServiceTrait>,
}

impl AppState {
    /// Assemble state from explicit services
    pub fn new(
        analysis: Arc<dyn AnalysisServiceTrait>,
        results: Arc<dyn ResultServiceTrait>,
        counters: Arc<dyn UsageCounterTrait>,
        health: Arc<dyn HealthServiceTrait>,
    ) -> Self {
        Self {
            analysis,
            results,
            counters,
            health,
        }
    }

    /// Default in-memory services around the given analysis configuration
    pub fn from_config(config: AnalysisConfig) -> Self {
        let results: Arc<dyn ResultServiceTrait> = Arc::new(create_default_result_service());
        let health = create_health_service(results.clone());
        Self::new(
            Arc::new(AnalysisService::new(config)),
            results,
            Arc::new(InMemoryUsageCounter::new()),
            health,
        )
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("counters", &self.counters)
            .field("health", &self.health)
            .finish_non_exhaustive()
    }
}
