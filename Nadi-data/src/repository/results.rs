use chrono::Utc;
use tracing::debug;
use uuid::Uuid;
use async_trait::async_trait;

use crate::models::analysis::{AnalysisRecord, CreateAnalysisRecord};
use super::errors::RepositoryError;
use super::in_memory::InMemoryStorage;

/// Repository trait for the last computed analysis result
#[async_trait]
pub trait ResultRepositoryTrait {
    /// Store a new result, replacing any previous one
    async fn save(&self, request: CreateAnalysisRecord) -> Result<AnalysisRecord, RepositoryError>;

    /// Get the most recent result
    async fn get_latest(&self) -> Result<Option<AnalysisRecord>, RepositoryError>;

    /// Forget the stored result. Returns true when something was removed.
    async fn clear(&self) -> Result<bool, RepositoryError>;

    /// Whether the backing storage is usable
    fn is_available(&self) -> bool;
}

/// Repository for analysis results.
///
/// Clones share the same underlying storage.
#[derive(Debug, Clone, Default)]
pub struct ResultRepository {
    storage: InMemoryStorage,
}

impl ResultRepository {
    /// Create a new repository
    pub fn new() -> Self {
        Self {
            storage: InMemoryStorage::new(),
        }
    }
}

#[async_trait]
impl ResultRepositoryTrait for ResultRepository {
    async fn save(&self, request: CreateAnalysisRecord) -> Result<AnalysisRecord, RepositoryError> {
        let record = AnalysisRecord {
            id: Uuid::new_v4().to_string(),
            mode: request.mode,
            context_label: request.context_label,
            rows: request.rows,
            flagged_subjects: request.flagged_subjects,
            total_anomalies: request.total_anomalies,
            created_at: Utc::now(),
        };

        debug!("Storing analysis result {} ({} rows)", record.id, record.rows.len());
        self.storage.store(&record).await
    }

    async fn get_latest(&self) -> Result<Option<AnalysisRecord>, RepositoryError> {
        self.storage.get_latest().await
    }

    async fn clear(&self) -> Result<bool, RepositoryError> {
        let removed = self.storage.clear().await?;
        debug!("Cleared stored analysis result (removed: {})", removed);
        Ok(removed)
    }

    fn is_available(&self) -> bool {
        self.storage.is_available()
    }
}

#[cfg(any(test, feature = "mock"))]
pub mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Mock implementation of the result repository for testing
    pub struct MockResultRepository {
        latest: Mutex<Option<AnalysisRecord>>,
        fail_writes: bool,
        unavailable: bool,
    }

    impl Default for MockResultRepository {
        fn default() -> Self {
            Self::new()
        }
    }

    impl MockResultRepository {
        /// Create a new empty mock repository
        pub fn new() -> Self {
            Self {
                latest: Mutex::new(None),
                fail_writes: false,
                unavailable: false,
            }
        }

        /// Create a mock repository that already holds a result
        pub fn with_record(record: AnalysisRecord) -> Self {
            Self {
                latest: Mutex::new(Some(record)),
                ..Self::new()
            }
        }

        /// Configure the mock to fail every write
        pub fn with_write_failure(mut self) -> Self {
            self.fail_writes = true;
            self
        }

        /// Configure the mock to report itself unavailable
        pub fn unavailable(mut self) -> Self {
            self.unavailable = true;
            self
        }
    }

    #[async_trait]
    impl ResultRepositoryTrait for MockResultRepository {
        async fn save(&self, request: CreateAnalysisRecord) -> Result<AnalysisRecord, RepositoryError> {
            if self.fail_writes {
                return Err(RepositoryError::Storage("mock is configured to fail writes".to_string()));
            }

            let record = AnalysisRecord {
                id: Uuid::new_v4().to_string(),
                mode: request.mode,
                context_label: request.context_label,
                rows: request.rows,
                flagged_subjects: request.flagged_subjects,
                total_anomalies: request.total_anomalies,
                created_at: Utc::now(),
            };
            *self.latest.lock()? = Some(record.clone());
            Ok(record)
        }

        async fn get_latest(&self) -> Result<Option<AnalysisRecord>, RepositoryError> {
            Ok(self.latest.lock()?.clone())
        }

        async fn clear(&self) -> Result<bool, RepositoryError> {
            if self.fail_writes {
                return Err(RepositoryError::Storage("mock is configured to fail writes".to_string()));
            }
            Ok(self.latest.lock()?.take().is_some())
        }

        fn is_available(&self) -> bool {
            !self.unavailable
        }
    }
}
