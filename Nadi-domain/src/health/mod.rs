//! Domain layer health check functionality
//! This module provides health check services for the application

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use crate::services::classifier::{classify_values, Thresholds};
use crate::services::extrapolation::extrapolate;
use crate::services::results::ResultServiceTrait;

/// System health status
#[derive(Debug, Clone, PartialEq)]
pub enum SystemStatus {
    /// All components are healthy
    Healthy,
    /// Some components are degraded but the system is functional
    Degraded,
    /// System is not functioning properly
    Unhealthy,
}

/// Component health status
#[derive(Debug, Clone, PartialEq)]
pub enum ComponentStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

/// Represents a health component with status and optional details
#[derive(Debug, Clone)]
pub struct HealthComponent {
    pub status: ComponentStatus,
    pub details: Option<String>,
}

/// Represents the overall health of the system
#[derive(Debug, Clone)]
pub struct SystemHealth {
    pub status: SystemStatus,
    /// Map of component names to their health status
    pub components: HashMap<String, HealthComponent>,
}

impl SystemHealth {
    /// Build a system health from its components; the worst component wins
    pub fn from_components(components: HashMap<String, HealthComponent>) -> Self {
        let status = if components.values().any(|c| c.status == ComponentStatus::Unhealthy) {
            SystemStatus::Unhealthy
        } else if components.values().any(|c| c.status == ComponentStatus::Degraded) {
            SystemStatus::Degraded
        } else {
            SystemStatus::Healthy
        };
        Self { status, components }
    }
}

/// Trait for health services
#[async_trait]
pub trait HealthServiceTrait: Send + Sync + std::fmt::Debug {
    /// Get the overall system health
    async fn get_system_health(&self) -> SystemHealth;

    /// Run the numeric core against known answers
    /// Returns Err with the first mismatch
    fn check_engine_status(&self) -> Result<(), String>;

    /// Whether the last-result store is reachable
    fn check_result_store_status(&self) -> bool;
}

/// Check that the extrapolator and classifier still give the reference answers
pub fn check_engine() -> Result<(), String> {
    let forecasts = [
        (vec![10.0, 20.0], 30.0),
        (vec![120.0, 145.0], 170.0),
        (vec![80.0, 80.0], 80.0),
    ];
    for (series, expected) in forecasts {
        let got = extrapolate(&series);
        if got != Some(expected) {
            return Err(format!("extrapolate({:?}) gave {:?}, expected {}", series, got, expected));
        }
    }

    let thresholds = Thresholds::default();
    let checks = [
        ((150.0, 85.0), true, false),
        ((85.0, 55.0), false, true),
        ((120.0, 80.0), false, false),
        ((140.0, 90.0), false, false),
    ];
    for ((sys, dia), hyper, hypo) in checks {
        let c = classify_values(Some(sys), Some(dia), &thresholds);
        if c.is_hypertensive != hyper || c.is_hypotensive != hypo {
            return Err(format!("classify({}, {}) gave {:?}", sys, dia, c));
        }
    }

    Ok(())
}

/// Health service covering the analysis engine and the result store
pub struct HealthService {
    results: Arc<dyn ResultServiceTrait>,
}

impl std::fmt::Debug for HealthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HealthService")
            .field("result_store_available", &self.results.is_available())
            .finish()
    }
}

impl HealthService {
    /// Create a new health service
    pub fn new(results: Arc<dyn ResultServiceTrait>) -> Self {
        Self { results }
    }
}

#[async_trait]
impl HealthServiceTrait for HealthService {
    async fn get_system_health(&self) -> SystemHealth {
        let mut components = HashMap::new();

        let engine = match self.check_engine_status() {
            Ok(()) => HealthComponent {
                status: ComponentStatus::Healthy,
                details: None,
            },
            Err(e) => {
                warn!("Engine self-check failed: {}", e);
                HealthComponent {
                    status: ComponentStatus::Unhealthy,
                    details: Some(e),
                }
            }
        };
        components.insert("engine".to_string(), engine);

        // Analyses still work without the store; only redisplay is lost.
        let store = if self.check_result_store_status() {
            HealthComponent {
                status: ComponentStatus::Healthy,
                details: None,
            }
        } else {
            HealthComponent {
                status: ComponentStatus::Degraded,
                details: Some("Result store is unavailable".to_string()),
            }
        };
        components.insert("result_store".to_string(), store);

        SystemHealth::from_components(components)
    }

    fn check_engine_status(&self) -> Result<(), String> {
        check_engine()
    }

    fn check_result_store_status(&self) -> bool {
        self.results.is_available()
    }
}

/// Factory function to create a health service
pub fn create_health_service(results: Arc<dyn ResultServiceTrait>) -> Arc<dyn HealthServiceTrait> {
    Arc::new(HealthService::new(results))
}
