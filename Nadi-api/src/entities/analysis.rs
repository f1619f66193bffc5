use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use nadi_data::models::counter::CounterSnapshot;
use nadi_domain::entities::{AnalysisMode, AnalysisReport, ReadingRow};

/// Columns every uploaded table must provide
pub const TEMPLATE_COLUMNS: [&str; 4] = ["subject_id", "timestamp", "systolic", "diastolic"];

/// Request payload for analysing a table of readings
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BatchAnalysisRequest {
    /// Where the table came from, e.g. the uploaded file name
    #[serde(default)]
    pub source: Option<String>,

    /// Table rows; extra columns are passed through to the result
    pub rows: Vec<ReadingRow>,
}

/// Result of an analysis request
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AnalysisResponse {
    /// Id under which the result was stored as the last result
    pub id: String,

    /// Text the client shows next to the alert indicator
    pub message: String,

    pub report: AnalysisReport,
}

impl AnalysisResponse {
    pub fn new(id: String, report: AnalysisReport) -> Self {
        let message = alert_message(&report);
        Self { id, message, report }
    }
}

/// Build the text shown alongside the warning or normal state
fn alert_message(report: &AnalysisReport) -> String {
    match (report.mode, report.alert) {
        (AnalysisMode::Batch, true) => format!(
            "Hypertension/hypotension detected for: {}",
            report.flagged_subjects.join(", ")
        ),
        (AnalysisMode::Batch, false) => "No hypertension/hypotension detected".to_string(),
        (AnalysisMode::Personal, true) => {
            "Hypertension/hypotension detected in the latest reading".to_string()
        }
        (AnalysisMode::Personal, false) => "Your latest reading is within the normal range".to_string(),
    }
}

/// Example input table
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TemplateResponse {
    /// Required column names, in order
    pub columns: Vec<String>,

    pub rows: Vec<ReadingRow>,

    /// The same table as CSV text
    pub csv: String,
}

impl TemplateResponse {
    /// Builds the CSV text without quoting or escaping. Only meant for the
    /// fixed sample rows; cells holding commas, quotes or newlines would
    /// corrupt the output.
    pub fn new(rows: Vec<ReadingRow>) -> Self {
        let mut csv = TEMPLATE_COLUMNS.join(",");
        csv.push('\n');
        for row in &rows {
            let cell = |v: Option<f64>| v.map(|v| v.to_string()).unwrap_or_default();
            csv.push_str(&format!(
                "{},{},{},{}\n",
                row.subject_id.as_deref().unwrap_or_default(),
                row.timestamp.as_deref().unwrap_or_default(),
                cell(row.systolic),
                cell(row.diastolic),
            ));
        }

        Self {
            columns: TEMPLATE_COLUMNS.iter().map(|c| c.to_string()).collect(),
            rows,
            csv,
        }
    }
}

/// Usage counters
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema)]
pub struct StatsResponse {
    /// Number of recorded visits
    pub visits: u64,

    /// Number of completed analyses
    pub analyses: u64,
}

impl From<CounterSnapshot> for StatsResponse {
    fn from(snapshot: CounterSnapshot) -> Self {
        Self {
            visits: snapshot.visits,
            analyses: snapshot.analyses,
        }
    }
}

/// Outcome of clearing the last result
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema)]
pub struct ResetResponse {
    /// Whether a stored result was removed
    pub cleared: bool,
}
