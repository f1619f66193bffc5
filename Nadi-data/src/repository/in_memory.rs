use std::sync::{Arc, Mutex};

use crate::models::analysis::AnalysisRecord;
use super::errors::RepositoryError;

/// In-memory storage for the most recent analysis result.
///
/// Only one result is ever held: storing a new one replaces the previous.
#[derive(Debug, Clone)]
pub struct InMemoryStorage {
    latest: Arc<Mutex<Option<AnalysisRecord>>>,
}

impl Default for InMemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStorage {
    /// Create a new, empty storage
    pub fn new() -> Self {
        Self {
            latest: Arc::new(Mutex::new(None)),
        }
    }

    /// Replace the stored result
    pub async fn store(&self, record: &AnalysisRecord) -> Result<AnalysisRecord, RepositoryError> {
        let mut slot = self.latest.lock()?;
        *slot = Some(record.clone());
        Ok(record.clone())
    }

    /// Get the stored result, if any
    pub async fn get_latest(&self) -> Result<Option<AnalysisRecord>, RepositoryError> {
        let slot = self.latest.lock()?;
        Ok(slot.clone())
    }

    /// Drop the stored result, returning whether anything was there
    pub async fn clear(&self) -> Result<bool, RepositoryError> {
        let mut slot = self.latest.lock()?;
        Ok(slot.take().is_some())
    }

    /// Whether the storage lock can still be taken
    pub fn is_available(&self) -> bool {
        self.latest.lock().is_ok()
    }
}
