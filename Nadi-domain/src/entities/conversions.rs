use chrono::NaiveDateTime;
use nadi_data::models::analysis::{AnalysisRecord, CreateAnalysisRecord, RecordRow};

use crate::entities::analysis::{
    AnalysisMode, AnalysisReport, AnalyzedReading, Classification, ReadingLabel, StoredAnalysis,
};

// Conversion functions between domain entities and data models.
// Named convert_to_[target_layer]_[model_name].

const STORED_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Convert an analysed row into its storage form
pub fn convert_to_data_row(row: &AnalyzedReading) -> RecordRow {
    RecordRow {
        subject_id: row.subject_id.clone(),
        timestamp: row.timestamp.map(|ts| ts.format(STORED_TIMESTAMP_FORMAT).to_string()),
        systolic: row.systolic,
        diastolic: row.diastolic,
        is_hypertensive: row.classification.is_hypertensive,
        is_hypotensive: row.classification.is_hypotensive,
        is_anomalous: row.classification.is_anomalous,
        label: row.label.to_string(),
        predicted_systolic: row.predicted_systolic,
        predicted_diastolic: row.predicted_diastolic,
        extra: row.extra.clone(),
    }
}

/// Convert a report into a storage request
pub fn convert_to_data_create_record(
    report: &AnalysisReport,
    context_label: Option<String>,
) -> CreateAnalysisRecord {
    CreateAnalysisRecord {
        mode: report.mode.as_str().to_string(),
        context_label,
        rows: report.rows.iter().map(convert_to_data_row).collect(),
        flagged_subjects: report.flagged_subjects.clone(),
        total_anomalies: report.total_anomalies,
    }
}

/// Convert a stored row back into a domain row.
///
/// Secondary detector flags are not stored, so they come back as `None`.
pub fn convert_to_domain_row(row: RecordRow) -> Result<AnalyzedReading, String> {
    let timestamp = match row.timestamp {
        Some(ref s) => Some(
            NaiveDateTime::parse_from_str(s, STORED_TIMESTAMP_FORMAT)
                .map_err(|_| format!("Invalid stored timestamp: {}", s))?,
        ),
        None => None,
    };
    let label = ReadingLabel::parse(&row.label)
        .ok_or_else(|| format!("Invalid stored label: {}", row.label))?;

    Ok(AnalyzedReading {
        subject_id: row.subject_id,
        timestamp,
        systolic: row.systolic,
        diastolic: row.diastolic,
        classification: Classification {
            is_hypertensive: row.is_hypertensive,
            is_hypotensive: row.is_hypotensive,
            is_anomalous: row.is_anomalous,
            secondary: None,
        },
        label,
        predicted_systolic: row.predicted_systolic,
        predicted_diastolic: row.predicted_diastolic,
        extra: row.extra,
    })
}

/// Convert a stored record into the domain view of the last result
pub fn convert_to_domain_stored(record: AnalysisRecord) -> Result<StoredAnalysis, String> {
    let mode = AnalysisMode::from_str(&record.mode)
        .ok_or_else(|| format!("Invalid stored analysis mode: {}", record.mode))?;
    let rows = record
        .rows
        .into_iter()
        .map(convert_to_domain_row)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(StoredAnalysis {
        id: record.id,
        mode,
        context_label: record.context_label,
        rows,
        flagged_subjects: record.flagged_subjects,
        total_anomalies: record.total_anomalies,
        created_at: record.created_at,
    })
}
