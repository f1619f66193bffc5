// Testing utilities and mock implementations for the domain layer
// This module is only available when the "mock" feature is enabled

// Re-export useful test mocks from the data layer
pub use nadi_data::repository::tests::MockResultRepository;

use std::collections::HashMap;

use async_trait::async_trait;

use crate::entities::reading::{PersonalAnalysisRequest, PersonalReading, ReadingRow};
use crate::health::{ComponentStatus, HealthComponent, HealthServiceTrait, SystemHealth};
use crate::services::results::ResultService;

/// Two subjects, A flagged on its second reading, B clean
pub fn mixed_subject_rows() -> Vec<ReadingRow> {
    vec![
        ReadingRow::new("A", 120.0, 80.0),
        ReadingRow::new("A", 145.0, 95.0),
        ReadingRow::new("B", 118.0, 78.0),
        ReadingRow::new("B", 122.0, 80.0),
    ]
}

/// A personal request whose latest reading is hypertensive
pub fn worsening_personal_request(name: &str) -> PersonalAnalysisRequest {
    PersonalAnalysisRequest {
        name: name.to_string(),
        readings: vec![
            PersonalReading { systolic: 120.0, diastolic: 80.0 },
            PersonalReading { systolic: 135.0, diastolic: 88.0 },
            PersonalReading { systolic: 150.0, diastolic: 95.0 },
        ],
    }
}

/// Mock implementation of health services for testing system health
#[derive(Debug)]
pub struct MockHealthService {
    engine_status: Result<(), String>,
    store_available: bool,
}

impl Default for MockHealthService {
    fn default() -> Self {
        Self::new()
    }
}

impl MockHealthService {
    /// Create a new mock health service with all components healthy
    pub fn new() -> Self {
        Self {
            engine_status: Ok(()),
            store_available: true,
        }
    }

    /// Configure the mock with a failing engine self-check
    pub fn with_broken_engine(mut self, reason: &str) -> Self {
        self.engine_status = Err(reason.to_string());
        self
    }

    /// Configure the mock with an unreachable result store
    pub fn with_unavailable_store(mut self) -> Self {
        self.store_available = false;
        self
    }
}

#[async_trait]
impl HealthServiceTrait for MockHealthService {
    async fn get_system_health(&self) -> SystemHealth {
        let mut components = HashMap::new();

        components.insert(
            "engine".to_string(),
            match &self.engine_status {
                Ok(()) => HealthComponent {
                    status: ComponentStatus::Healthy,
                    details: None,
                },
                Err(reason) => HealthComponent {
                    status: ComponentStatus::Unhealthy,
                    details: Some(reason.clone()),
                },
            },
        );
        components.insert(
            "result_store".to_string(),
            HealthComponent {
                status: if self.store_available {
                    ComponentStatus::Healthy
                } else {
                    ComponentStatus::Degraded
                },
                details: None,
            },
        );

        SystemHealth::from_components(components)
    }

    fn check_engine_status(&self) -> Result<(), String> {
        self.engine_status.clone()
    }

    fn check_result_store_status(&self) -> bool {
        self.store_available
    }
}

/// Factory function to create a result service over the mock repository
pub fn create_mock_result_service() -> ResultService<MockResultRepository> {
    ResultService::new(MockResultRepository::new())
}

/// Factory function to create a mock health service
pub fn create_mock_health_service() -> MockHealthService {
    MockHealthService::new()
}
