use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

/// Storage model for one analysed row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordRow {
    /// Subject the reading belongs to
    pub subject_id: String,

    /// Resolved timestamp as an ISO 8601 string (absent when it could not be resolved)
    pub timestamp: Option<String>,

    /// Systolic value, absent when the cell was missing or unparsable
    pub systolic: Option<f64>,

    /// Diastolic value, absent when the cell was missing or unparsable
    pub diastolic: Option<f64>,

    pub is_hypertensive: bool,
    pub is_hypotensive: bool,
    pub is_anomalous: bool,

    /// Label as a string (e.g. "Hypertensive")
    pub label: String,

    /// Predicted next systolic value, only on the last row of a subject
    pub predicted_systolic: Option<f64>,

    /// Predicted next diastolic value, only on the last row of a subject
    pub predicted_diastolic: Option<f64>,

    /// Pass-through columns from the input row
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Storage model for a complete analysis result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRecord {
    /// Unique identifier for the stored result
    pub id: String,

    /// Analysis mode as a string ("batch" or "personal")
    pub mode: String,

    /// Free-form context label: an upload source name or the person's name
    pub context_label: Option<String>,

    /// Analysed rows in presentation order
    pub rows: Vec<RecordRow>,

    /// Subjects that raised an alert
    pub flagged_subjects: Vec<String>,

    /// Number of anomalous rows
    pub total_anomalies: usize,

    /// When the result was stored
    pub created_at: DateTime<Utc>,
}

/// Input data for storing a new analysis result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAnalysisRecord {
    pub mode: String,
    pub context_label: Option<String>,
    pub rows: Vec<RecordRow>,
    pub flagged_subjects: Vec<String>,
    pub total_anomalies: usize,
}
