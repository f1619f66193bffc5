use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

/// Flags raised by the statistical detectors of the extended policy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct SecondaryFlags {
    /// Either vital sits more than the z-score threshold away from the subject's mean
    pub z_score_outlier: bool,

    /// Either vital jumped more than the allowed delta since the previous reading
    pub sudden_jump: bool,
}

/// Anomaly flags for a single reading
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct Classification {
    /// Systolic or diastolic above the high thresholds
    pub is_hypertensive: bool,

    /// Systolic or diastolic below the low thresholds
    pub is_hypotensive: bool,

    /// Any detector fired
    pub is_anomalous: bool,

    /// Present only when the extended policy produced the classification
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary: Option<SecondaryFlags>,
}

/// Human-facing label for a reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub enum ReadingLabel {
    /// Inside every range
    Normal,
    /// Above a high threshold
    Hypertensive,
    /// Below a low threshold
    Hypotensive,
    /// One vital above and the other below range
    Mixed,
    /// A value was missing, nothing can be said
    Unclassifiable,
}

impl ReadingLabel {
    /// Derive the label from a classification and whether both values were present
    pub fn from_classification(classification: &Classification, classifiable: bool) -> Self {
        if !classifiable {
            return ReadingLabel::Unclassifiable;
        }
        match (classification.is_hypertensive, classification.is_hypotensive) {
            (true, true) => ReadingLabel::Mixed,
            (true, false) => ReadingLabel::Hypertensive,
            (false, true) => ReadingLabel::Hypotensive,
            (false, false) => ReadingLabel::Normal,
        }
    }

    /// Parse a label back from its display form
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Normal" => Some(ReadingLabel::Normal),
            "Hypertensive" => Some(ReadingLabel::Hypertensive),
            "Hypotensive" => Some(ReadingLabel::Hypotensive),
            "Mixed" => Some(ReadingLabel::Mixed),
            "Unclassifiable" => Some(ReadingLabel::Unclassifiable),
            _ => None,
        }
    }
}

impl std::fmt::Display for ReadingLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ReadingLabel::Normal => "Normal",
            ReadingLabel::Hypertensive => "Hypertensive",
            ReadingLabel::Hypotensive => "Hypotensive",
            ReadingLabel::Mixed => "Mixed",
            ReadingLabel::Unclassifiable => "Unclassifiable",
        };
        write!(f, "{}", label)
    }
}

/// One row of the output table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct AnalyzedReading {
    /// Subject the reading belongs to
    pub subject_id: String,

    /// Parsed or synthesized timestamp; absent when the input could not be resolved
    pub timestamp: Option<NaiveDateTime>,

    /// Systolic value after coercion
    pub systolic: Option<f64>,

    /// Diastolic value after coercion
    pub diastolic: Option<f64>,

    /// Anomaly flags
    #[serde(flatten)]
    pub classification: Classification,

    /// Summary label
    pub label: ReadingLabel,

    /// Next systolic value, only on the chronologically last row of the subject
    pub predicted_systolic: Option<f64>,

    /// Next diastolic value, only on the chronologically last row of the subject
    pub predicted_diastolic: Option<f64>,

    /// Pass-through columns from the input row
    #[serde(flatten)]
    #[cfg_attr(feature = "with-api", schema(value_type = Object))]
    pub extra: Map<String, Value>,
}

impl AnalyzedReading {
    /// Column names this row writes itself. Input columns with these names
    /// cannot be passed through.
    pub const OUTPUT_COLUMNS: [&'static str; 11] = [
        "subject_id",
        "timestamp",
        "systolic",
        "diastolic",
        "is_hypertensive",
        "is_hypotensive",
        "is_anomalous",
        "secondary",
        "label",
        "predicted_systolic",
        "predicted_diastolic",
    ];
}

/// Per-subject roll-up of an analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct SubjectSummary {
    pub subject_id: String,

    /// Number of rows for this subject
    pub reading_count: usize,

    /// Number of anomalous rows for this subject
    pub anomalous_count: usize,

    /// At least one reading in the subject's history is anomalous
    pub has_alert: bool,

    /// The chronologically last reading is anomalous
    pub latest_is_anomalous: bool,

    pub predicted_systolic: Option<f64>,
    pub predicted_diastolic: Option<f64>,

    /// When the forecast applies: one day after the latest reading
    pub forecast_timestamp: Option<NaiveDateTime>,
}

/// Which entry point produced a report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum AnalysisMode {
    /// Table of many subjects
    Batch,
    /// A single person's hand-entered readings
    Personal,
}

impl AnalysisMode {
    pub fn as_str(self) -> &'static str {
        match self {
            AnalysisMode::Batch => "batch",
            AnalysisMode::Personal => "personal",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "batch" => Some(AnalysisMode::Batch),
            "personal" => Some(AnalysisMode::Personal),
            _ => None,
        }
    }
}

/// State the presentation layer should show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum AlertLevel {
    /// Something was flagged, surface a warning
    Warning,
    /// Nothing was flagged
    Normal,
}

impl From<bool> for AlertLevel {
    fn from(alert: bool) -> Self {
        if alert {
            AlertLevel::Warning
        } else {
            AlertLevel::Normal
        }
    }
}

/// Complete result of one analysis invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct AnalysisReport {
    pub mode: AnalysisMode,

    /// Output rows, grouped by subject in first-appearance order
    pub rows: Vec<AnalyzedReading>,

    /// One summary per subject, same order as `rows`
    pub subjects: Vec<SubjectSummary>,

    /// Subjects that raised an alert, in first-appearance order
    pub flagged_subjects: Vec<String>,

    /// Whether any subject raised an alert
    pub alert: bool,

    pub alert_level: AlertLevel,

    /// Number of anomalous rows across all subjects
    pub total_anomalies: usize,

    /// Input rows discarded during cleaning (missing subject id)
    pub dropped_rows: usize,

    /// When the report was produced
    pub generated_at: DateTime<Utc>,
}

/// The last stored analysis, as shown on the results page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct StoredAnalysis {
    pub id: String,
    pub mode: AnalysisMode,

    /// Upload source name or the person's name
    pub context_label: Option<String>,

    pub rows: Vec<AnalyzedReading>,
    pub flagged_subjects: Vec<String>,

    /// Total hypertension/hypotension detections
    pub total_anomalies: usize,

    pub created_at: DateTime<Utc>,
}
