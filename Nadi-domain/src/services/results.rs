use async_trait::async_trait;
use tracing::{error, info};

use crate::entities::analysis::{AnalysisReport, StoredAnalysis};
use crate::entities::conversions;
use crate::services::analysis::AnalysisError;
use nadi_data::repository::{RepositoryError, ResultRepositoryTrait};

/// Trait for keeping the last analysis result around for redisplay
#[async_trait]
pub trait ResultServiceTrait: Send + Sync {
    /// Store a report as the last result, replacing the previous one
    async fn record(
        &self,
        report: &AnalysisReport,
        context_label: Option<String>,
    ) -> Result<StoredAnalysis, AnalysisError>;

    /// The last stored result
    async fn latest(&self) -> Result<StoredAnalysis, AnalysisError>;

    /// Forget the last result. Returns true when something was removed.
    async fn reset(&self) -> Result<bool, AnalysisError>;

    /// Whether the result store can be used
    fn is_available(&self) -> bool;
}

/// Result service backed by a result repository
pub struct ResultService<R: ResultRepositoryTrait> {
    repository: R,
}

impl<R: ResultRepositoryTrait> ResultService<R> {
    /// Create a new result service
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    /// Map repository errors to service errors
    fn map_repo_error(&self, err: RepositoryError) -> AnalysisError {
        error!("Result repository failure: {}", err);
        AnalysisError::RepositoryError(err.to_string())
    }
}

#[async_trait]
impl<R: ResultRepositoryTrait + Send + Sync> ResultServiceTrait for ResultService<R> {
    async fn record(
        &self,
        report: &AnalysisReport,
        context_label: Option<String>,
    ) -> Result<StoredAnalysis, AnalysisError> {
        let request = conversions::convert_to_data_create_record(report, context_label);

        let record = self
            .repository
            .save(request)
            .await
            .map_err(|e| self.map_repo_error(e))?;
        info!("Stored {} analysis {} as the last result", record.mode, record.id);

        conversions::convert_to_domain_stored(record).map_err(AnalysisError::RepositoryError)
    }

    async fn latest(&self) -> Result<StoredAnalysis, AnalysisError> {
        let record = self
            .repository
            .get_latest()
            .await
            .map_err(|e| self.map_repo_error(e))?
            .ok_or_else(|| AnalysisError::NotFound("No analysis has been run yet".to_string()))?;

        conversions::convert_to_domain_stored(record).map_err(AnalysisError::RepositoryError)
    }

    async fn reset(&self) -> Result<bool, AnalysisError> {
        self.repository.clear().await.map_err(|e| self.map_repo_error(e))
    }

    fn is_available(&self) -> bool {
        self.repository.is_available()
    }
}

/// Create a default result service using the in-memory repository from the data layer
pub fn create_default_result_service() -> impl ResultServiceTrait {
    let repository = nadi_data::repository::ResultRepository::new();
    ResultService::new(repository)
}
