use std::collections::HashMap;

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use indexmap::IndexMap;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, info};
use validator::{Validate, ValidationErrors};

use crate::config::AnalysisConfig;
use crate::entities::analysis::{
    AlertLevel, AnalysisMode, AnalysisReport, AnalyzedReading, ReadingLabel, SubjectSummary,
};
use crate::entities::reading::{PersonalAnalysisRequest, ReadingRow};
use crate::services::classifier::AnomalyClassifier;
use crate::services::extrapolation::extrapolate_cells;

/// Analysis service errors
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Not found error
    #[error("Not found: {0}")]
    NotFound(String),

    /// Repository error
    #[error("Repository error: {0}")]
    RepositoryError(String),
}

/// Date-time layouts accepted for input timestamps, tried in order after RFC 3339
const DATE_TIME_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%d %H:%M"];

/// Date-only layouts accepted for input timestamps
const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y"];

/// Trait for analysis operations
pub trait AnalysisServiceTrait: Send + Sync {
    /// Analyse a table of readings from any number of subjects.
    ///
    /// Malformed rows degrade per row; this never fails. `today` anchors
    /// synthesized timestamps.
    fn analyze_batch(&self, rows: Vec<ReadingRow>, today: NaiveDate) -> AnalysisReport;

    /// Analyse one person's hand-entered readings
    fn analyze_personal(
        &self,
        request: PersonalAnalysisRequest,
        today: NaiveDate,
    ) -> Result<AnalysisReport, AnalysisError>;
}

/// A row that survived cleaning
#[derive(Debug, Clone)]
struct CleanRow {
    subject_id: String,
    raw_timestamp: Option<String>,
    systolic: Option<f64>,
    diastolic: Option<f64>,
    extra: Map<String, Value>,
}

/// A cleaned row with its resolved timestamp
#[derive(Debug, Clone)]
struct TimedRow {
    timestamp: Option<NaiveDateTime>,
    systolic: Option<f64>,
    diastolic: Option<f64>,
    extra: Map<String, Value>,
}

/// Analysis pipeline: cleaning, per-subject grouping, classification and forecasting
#[derive(Debug, Clone, Default)]
pub struct AnalysisService {
    classifier: AnomalyClassifier,
}

impl AnalysisService {
    /// Create a new analysis service
    pub fn new(config: AnalysisConfig) -> Self {
        Self {
            classifier: AnomalyClassifier::new(config.thresholds, config.policy),
        }
    }

    pub fn classifier(&self) -> &AnomalyClassifier {
        &self.classifier
    }

    fn run(&self, mode: AnalysisMode, rows: Vec<ReadingRow>, today: NaiveDate) -> AnalysisReport {
        let input_count = rows.len();
        let cleaned = clean_rows(rows);
        let dropped_rows = input_count - cleaned.len();
        if dropped_rows > 0 {
            debug!("Dropped {} rows without a subject id", dropped_rows);
        }

        let timestamps = resolve_timestamps(&cleaned, today);

        let mut groups: IndexMap<String, Vec<TimedRow>> = IndexMap::new();
        for (row, timestamp) in cleaned.into_iter().zip(timestamps) {
            groups.entry(row.subject_id).or_default().push(TimedRow {
                timestamp,
                systolic: row.systolic,
                diastolic: row.diastolic,
                extra: row.extra,
            });
        }

        let mut rows = Vec::with_capacity(input_count - dropped_rows);
        let mut subjects = Vec::with_capacity(groups.len());
        for (subject_id, group) in groups {
            let (analysed, summary) = self.analyze_subject(subject_id, group);
            rows.extend(analysed);
            subjects.push(summary);
        }

        let flagged_subjects: Vec<String> = subjects
            .iter()
            .filter(|s| s.has_alert)
            .map(|s| s.subject_id.clone())
            .collect();
        let total_anomalies = rows.iter().filter(|r| r.classification.is_anomalous).count();
        let alert = !flagged_subjects.is_empty();

        info!(
            "Analysed {} rows across {} subjects: {} anomalous, {} subjects flagged",
            rows.len(),
            subjects.len(),
            total_anomalies,
            flagged_subjects.len()
        );

        AnalysisReport {
            mode,
            rows,
            subjects,
            flagged_subjects,
            alert,
            alert_level: AlertLevel::from(alert),
            total_anomalies,
            dropped_rows,
            generated_at: Utc::now(),
        }
    }

    fn analyze_subject(
        &self,
        subject_id: String,
        mut group: Vec<TimedRow>,
    ) -> (Vec<AnalyzedReading>, SubjectSummary) {
        // Stable: equal timestamps keep input order, unresolved ones go last.
        group.sort_by_key(|row| (row.timestamp.is_none(), row.timestamp));

        let series: Vec<(Option<f64>, Option<f64>)> =
            group.iter().map(|row| (row.systolic, row.diastolic)).collect();
        let classifications = self.classifier.classify_series(&series);

        let systolic: Vec<Option<f64>> = series.iter().map(|&(s, _)| s).collect();
        let diastolic: Vec<Option<f64>> = series.iter().map(|&(_, d)| d).collect();
        let predicted_systolic = extrapolate_cells(&systolic);
        let predicted_diastolic = extrapolate_cells(&diastolic);
        if predicted_systolic.is_none() && predicted_diastolic.is_none() {
            debug!("No forecast for subject {}: fewer than two valid readings", subject_id);
        }

        let last_index = group.len().saturating_sub(1);
        let last_timestamp = group.last().and_then(|row| row.timestamp);

        let analysed: Vec<AnalyzedReading> = group
            .into_iter()
            .zip(classifications)
            .enumerate()
            .map(|(index, (row, classification))| {
                let is_last = index == last_index;
                let classifiable = row.systolic.is_some() && row.diastolic.is_some();
                AnalyzedReading {
                    subject_id: subject_id.clone(),
                    timestamp: row.timestamp,
                    systolic: row.systolic,
                    diastolic: row.diastolic,
                    classification,
                    label: ReadingLabel::from_classification(&classification, classifiable),
                    predicted_systolic: predicted_systolic.filter(|_| is_last),
                    predicted_diastolic: predicted_diastolic.filter(|_| is_last),
                    extra: row.extra,
                }
            })
            .collect();

        let anomalous_count = analysed.iter().filter(|r| r.classification.is_anomalous).count();
        let has_forecast = predicted_systolic.is_some() || predicted_diastolic.is_some();
        let summary = SubjectSummary {
            subject_id,
            reading_count: analysed.len(),
            anomalous_count,
            has_alert: anomalous_count > 0,
            latest_is_anomalous: analysed.last().map_or(false, |r| r.classification.is_anomalous),
            predicted_systolic,
            predicted_diastolic,
            forecast_timestamp: last_timestamp
                .filter(|_| has_forecast)
                .and_then(|ts| ts.checked_add_signed(Duration::days(1))),
        };

        (analysed, summary)
    }

    fn validate_personal_request(&self, request: &PersonalAnalysisRequest) -> Result<(), AnalysisError> {
        if let Err(errors) = request.validate() {
            return Err(AnalysisError::ValidationError(format_validation_errors(&errors, None)));
        }

        if request.name.trim().is_empty() {
            return Err(AnalysisError::ValidationError("name: Name is required".to_string()));
        }

        let reading_errors: Vec<String> = request
            .readings
            .iter()
            .enumerate()
            .filter_map(|(index, reading)| {
                reading
                    .validate()
                    .err()
                    .map(|errors| format_validation_errors(&errors, Some(index)))
            })
            .collect();
        if !reading_errors.is_empty() {
            return Err(AnalysisError::ValidationError(reading_errors.join("; ")));
        }

        Ok(())
    }
}

impl AnalysisServiceTrait for AnalysisService {
    fn analyze_batch(&self, rows: Vec<ReadingRow>, today: NaiveDate) -> AnalysisReport {
        self.run(AnalysisMode::Batch, rows, today)
    }

    fn analyze_personal(
        &self,
        request: PersonalAnalysisRequest,
        today: NaiveDate,
    ) -> Result<AnalysisReport, AnalysisError> {
        self.validate_personal_request(&request)?;

        let name = request.name.trim().to_string();
        let rows = request
            .readings
            .iter()
            .map(|reading| ReadingRow::new(name.clone(), reading.systolic, reading.diastolic))
            .collect();
        let mut report = self.run(AnalysisMode::Personal, rows, today);

        // A personal check warns about the current state, not the history.
        let alert = report.subjects.first().map_or(false, |s| s.latest_is_anomalous);
        report.alert = alert;
        report.alert_level = AlertLevel::from(alert);
        report.flagged_subjects = if alert { vec![name] } else { Vec::new() };

        Ok(report)
    }
}

/// Create a default analysis service with the canonical strict policy
pub fn create_default_analysis_service() -> impl AnalysisServiceTrait {
    AnalysisService::new(AnalysisConfig::default())
}

fn clean_rows(rows: Vec<ReadingRow>) -> Vec<CleanRow> {
    rows.into_iter()
        .filter_map(|row| {
            let subject_id = row
                .subject_id
                .map(|id| id.trim().to_string())
                .filter(|id| !id.is_empty())?;

            // Computed columns win over stale copies from a re-uploaded result table.
            let mut extra = row.extra;
            extra.retain(|column, _| {
                let reserved = AnalyzedReading::OUTPUT_COLUMNS.contains(&column.as_str());
                if reserved {
                    debug!("Ignoring input column {} for subject {}", column, subject_id);
                }
                !reserved
            });

            Some(CleanRow {
                subject_id,
                raw_timestamp: row.timestamp,
                systolic: row.systolic,
                diastolic: row.diastolic,
                extra,
            })
        })
        .collect()
}

/// Resolve one timestamp per cleaned row.
///
/// When any row carries a timestamp, every row is parsed and gaps are
/// forward-filled in input order. Otherwise dates are synthesized per
/// subject so that its last row lands on `today`.
fn resolve_timestamps(rows: &[CleanRow], today: NaiveDate) -> Vec<Option<NaiveDateTime>> {
    let has_timestamps = rows
        .iter()
        .any(|row| row.raw_timestamp.as_deref().map_or(false, |ts| !ts.trim().is_empty()));

    if !has_timestamps {
        let subject_ids: Vec<&str> = rows.iter().map(|row| row.subject_id.as_str()).collect();
        return synthesize_timestamps(&subject_ids, today);
    }

    let mut last_seen: Option<NaiveDateTime> = None;
    rows.iter()
        .map(|row| {
            match row.raw_timestamp.as_deref().and_then(parse_timestamp) {
                Some(ts) => last_seen = Some(ts),
                None => debug!(
                    "Unresolved timestamp {:?} for subject {}, filling forward",
                    row.raw_timestamp, row.subject_id
                ),
            }
            last_seen
        })
        .collect()
}

/// Midnight dates stepping back one day per earlier row of the same subject.
/// A date before the earliest representable one is `None`.
fn synthesize_timestamps(subject_ids: &[&str], today: NaiveDate) -> Vec<Option<NaiveDateTime>> {
    let mut totals: HashMap<&str, i64> = HashMap::new();
    for &id in subject_ids {
        *totals.entry(id).or_insert(0) += 1;
    }

    let midnight = today.and_time(NaiveTime::default());
    let mut seen: HashMap<&str, i64> = HashMap::new();
    subject_ids
        .iter()
        .map(|&id| {
            let position = seen.entry(id).or_insert(0);
            let total = totals.get(id).copied().unwrap_or(1);
            let days_back = total - 1 - *position;
            *position += 1;
            midnight.checked_sub_signed(Duration::days(days_back))
        })
        .collect()
}

/// Parse a timestamp cell. Date-only values land on midnight.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }

    DATE_TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
                .map(|date| date.and_time(NaiveTime::default()))
        })
}

fn format_validation_errors(errors: &ValidationErrors, index: Option<usize>) -> String {
    let mut messages: Vec<String> = errors
        .field_errors()
        .iter()
        .map(|(field, errors)| {
            let error_msgs: Vec<String> = errors
                .iter()
                .map(|err| match &err.message {
                    Some(msg) => msg.to_string(),
                    None => format!("Invalid {}", field),
                })
                .collect();
            match index {
                Some(i) => format!("readings[{}].{}: {}", i, field, error_msgs.join(", ")),
                None => format!("{}: {}", field, error_msgs.join(", ")),
            }
        })
        .collect();
    messages.sort();
    messages.join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::reading::PersonalReading;
    use crate::services::classifier::{ClassifierPolicy, ExtendedPolicy, Thresholds};
    use serde_json::json;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 10).unwrap()
    }

    fn midnight(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(0, 0, 0).unwrap()
    }

    fn service() -> AnalysisService {
        AnalysisService::default()
    }

    fn scenario_rows() -> Vec<ReadingRow> {
        vec![
            ReadingRow::new("A", 120.0, 80.0),
            ReadingRow::new("A", 145.0, 95.0),
            ReadingRow::new("B", 130.0, 85.0),
            ReadingRow::new("B", 170.0, 105.0),
        ]
    }

    #[test]
    fn test_end_to_end_scenario() {
        let report = service().analyze_batch(scenario_rows(), today());

        assert_eq!(report.mode, AnalysisMode::Batch);
        assert_eq!(report.rows.len(), 4);

        let flags: Vec<bool> = report.rows.iter().map(|r| r.classification.is_hypertensive).collect();
        assert_eq!(flags, vec![false, true, false, true]);

        assert_eq!(report.rows[0].predicted_systolic, None);
        assert_eq!(report.rows[1].predicted_systolic, Some(170.0));
        assert_eq!(report.rows[1].predicted_diastolic, Some(110.0));
        assert_eq!(report.rows[2].predicted_systolic, None);
        assert_eq!(report.rows[3].predicted_systolic, Some(210.0));
        assert_eq!(report.rows[3].predicted_diastolic, Some(125.0));

        assert_eq!(report.flagged_subjects, vec!["A".to_string(), "B".to_string()]);
        assert!(report.alert);
        assert_eq!(report.alert_level, AlertLevel::Warning);
        assert_eq!(report.total_anomalies, 2);
        assert_eq!(report.dropped_rows, 0);
    }

    #[test]
    fn test_only_subjects_with_anomalies_are_flagged() {
        let rows = vec![
            ReadingRow::new("A", 120.0, 80.0),
            ReadingRow::new("A", 145.0, 95.0),
            ReadingRow::new("B", 120.0, 80.0),
            ReadingRow::new("B", 125.0, 82.0),
        ];
        let report = service().analyze_batch(rows, today());

        assert_eq!(report.flagged_subjects, vec!["A".to_string()]);
        assert!(report.subjects[0].has_alert);
        assert!(!report.subjects[1].has_alert);
    }

    #[test]
    fn test_groups_follow_first_appearance_not_alphabet() {
        let rows = vec![
            ReadingRow::new("Zed", 120.0, 80.0),
            ReadingRow::new("Adi", 120.0, 80.0),
            ReadingRow::new("Zed", 150.0, 80.0),
            ReadingRow::new("Adi", 121.0, 81.0),
        ];
        let report = service().analyze_batch(rows, today());

        let order: Vec<&str> = report.rows.iter().map(|r| r.subject_id.as_str()).collect();
        assert_eq!(order, vec!["Zed", "Zed", "Adi", "Adi"]);
        assert_eq!(report.subjects[0].subject_id, "Zed");
        assert_eq!(report.flagged_subjects, vec!["Zed".to_string()]);
    }

    #[test]
    fn test_synthesized_dates_are_per_subject() {
        let rows = vec![
            ReadingRow::new("A", 120.0, 80.0),
            ReadingRow::new("B", 120.0, 80.0),
            ReadingRow::new("A", 125.0, 80.0),
            ReadingRow::new("A", 130.0, 80.0),
        ];
        let report = service().analyze_batch(rows, today());

        let a: Vec<_> = report.rows.iter().filter(|r| r.subject_id == "A").map(|r| r.timestamp).collect();
        assert_eq!(
            a,
            vec![Some(midnight(2024, 3, 8)), Some(midnight(2024, 3, 9)), Some(midnight(2024, 3, 10))]
        );
        let b = report.rows.iter().find(|r| r.subject_id == "B").unwrap();
        assert_eq!(b.timestamp, Some(midnight(2024, 3, 10)));
        assert_eq!(report.subjects[0].forecast_timestamp, Some(midnight(2024, 3, 11)));
        assert_eq!(report.subjects[1].forecast_timestamp, None);
    }

    #[test]
    fn test_rows_are_sorted_chronologically_within_subject() {
        let rows = vec![
            ReadingRow::new("A", 170.0, 100.0).with_timestamp("2024-03-05"),
            ReadingRow::new("A", 120.0, 80.0).with_timestamp("2024-03-01"),
            ReadingRow::new("A", 145.0, 95.0).with_timestamp("2024-03-03 08:30:00"),
        ];
        let report = service().analyze_batch(rows, today());

        let systolic: Vec<_> = report.rows.iter().map(|r| r.systolic).collect();
        assert_eq!(systolic, vec![Some(120.0), Some(145.0), Some(170.0)]);
        assert_eq!(report.rows[2].predicted_systolic, Some(195.0));
        assert_eq!(report.rows[2].timestamp, Some(midnight(2024, 3, 5)));
    }

    #[test]
    fn test_equal_timestamps_keep_input_order() {
        let rows = vec![
            ReadingRow::new("A", 110.0, 70.0).with_timestamp("2024-03-01"),
            ReadingRow::new("A", 130.0, 80.0).with_timestamp("2024-03-01"),
        ];
        let report = service().analyze_batch(rows, today());
        assert_eq!(report.rows[0].systolic, Some(110.0));
        assert_eq!(report.rows[1].predicted_systolic, Some(150.0));
    }

    #[test]
    fn test_unparsable_timestamps_fill_forward() {
        let rows = vec![
            ReadingRow::new("A", 100.0, 70.0).with_timestamp("not a date"),
            ReadingRow::new("A", 110.0, 70.0).with_timestamp("2024-03-02"),
            ReadingRow::new("A", 120.0, 70.0).with_timestamp("2024-13-45"),
            ReadingRow::new("A", 130.0, 70.0).with_timestamp("2024-03-01"),
        ];
        let report = service().analyze_batch(rows, today());

        let order: Vec<_> = report.rows.iter().map(|r| (r.systolic, r.timestamp)).collect();
        assert_eq!(
            order,
            vec![
                (Some(130.0), Some(midnight(2024, 3, 1))),
                (Some(110.0), Some(midnight(2024, 3, 2))),
                (Some(120.0), Some(midnight(2024, 3, 2))),
                (Some(100.0), None),
            ]
        );
    }

    #[test]
    fn test_rows_without_subject_are_dropped() {
        let blank = ReadingRow::new("   ", 150.0, 95.0);
        let missing = ReadingRow {
            subject_id: None,
            ..ReadingRow::new("x", 150.0, 95.0)
        };
        let rows = vec![blank, ReadingRow::new(" A ", 120.0, 80.0), missing];
        let report = service().analyze_batch(rows, today());

        assert_eq!(report.dropped_rows, 2);
        assert_eq!(report.rows.len(), 1);
        assert_eq!(report.rows[0].subject_id, "A");
        assert!(!report.alert);
        assert_eq!(report.alert_level, AlertLevel::Normal);
    }

    #[test]
    fn test_missing_values_degrade_per_row() {
        let rows: Vec<ReadingRow> = vec![
            serde_json::from_value(json!({"subject_id": "A", "systolic": 120, "diastolic": 80})).unwrap(),
            serde_json::from_value(json!({"subject_id": "A", "systolic": "abc", "diastolic": 200})).unwrap(),
            serde_json::from_value(json!({"subject_id": "A", "systolic": 140, "diastolic": null})).unwrap(),
        ];
        let report = service().analyze_batch(rows, today());

        assert!(!report.rows[1].classification.is_anomalous);
        assert_eq!(report.rows[1].label, ReadingLabel::Unclassifiable);
        assert_eq!(report.rows[2].label, ReadingLabel::Unclassifiable);
        // valid tails: systolic [120, 140], diastolic [80, 200]
        assert_eq!(report.rows[2].predicted_systolic, Some(160.0));
        assert_eq!(report.rows[2].predicted_diastolic, Some(320.0));
        assert_eq!(report.total_anomalies, 0);
    }

    #[test]
    fn test_single_reading_has_no_forecast() {
        let report = service().analyze_batch(vec![ReadingRow::new("A", 150.0, 85.0)], today());
        assert_eq!(report.rows[0].predicted_systolic, None);
        assert_eq!(report.rows[0].predicted_diastolic, None);
        assert_eq!(report.rows[0].label, ReadingLabel::Hypertensive);
        assert!(report.alert);
    }

    #[test]
    fn test_extra_columns_pass_through() {
        let row: ReadingRow = serde_json::from_value(json!({
            "subject_id": "A",
            "systolic": 120,
            "diastolic": 80,
            "clinic": "Sukamaju"
        }))
        .unwrap();
        let report = service().analyze_batch(vec![row], today());
        assert_eq!(report.rows[0].extra.get("clinic"), Some(&json!("Sukamaju")));
    }

    #[test]
    fn test_stale_output_columns_do_not_override_computed_values() {
        let row: ReadingRow = serde_json::from_value(json!({
            "subject_id": "A",
            "systolic": 170,
            "diastolic": 105,
            "is_hypertensive": false,
            "is_anomalous": false,
            "label": "normal",
            "predicted_systolic": 1,
            "ward": "3B"
        }))
        .unwrap();
        let report = service().analyze_batch(vec![row], today());
        let analysed = &report.rows[0];

        assert!(analysed.classification.is_hypertensive);
        assert!(!analysed.extra.contains_key("is_hypertensive"));
        assert!(!analysed.extra.contains_key("predicted_systolic"));
        assert_eq!(analysed.extra.get("ward"), Some(&json!("3B")));

        let wire = serde_json::to_string(analysed).unwrap();
        assert_eq!(wire.matches("\"is_hypertensive\"").count(), 1);
        assert_eq!(wire.matches("\"label\"").count(), 1);

        let value = serde_json::to_value(analysed).unwrap();
        assert_eq!(value["is_hypertensive"], true);
        assert_eq!(value["is_anomalous"], true);
        assert!(value["predicted_systolic"].is_null());
    }

    #[test]
    fn test_latest_representable_date_does_not_panic() {
        let rows = vec![
            ReadingRow::new("A", 120.0, 80.0).with_timestamp("2024-03-01"),
            ReadingRow::new("A", 145.0, 95.0).with_timestamp("+262142-12-31"),
        ];
        let report = service().analyze_batch(rows, today());

        let max = NaiveDate::MAX.and_time(NaiveTime::default());
        assert_eq!(report.rows[1].timestamp, Some(max));
        assert_eq!(report.rows[1].predicted_systolic, Some(170.0));
        assert_eq!(report.subjects[0].predicted_systolic, Some(170.0));
        assert_eq!(report.subjects[0].forecast_timestamp, None);
    }

    #[test]
    fn test_synthesis_before_earliest_date_does_not_panic() {
        let timestamps = synthesize_timestamps(&["A", "A"], NaiveDate::MIN);

        assert_eq!(timestamps[0], None);
        assert_eq!(timestamps[1], Some(NaiveDate::MIN.and_time(NaiveTime::default())));
    }

    #[test]
    fn test_empty_batch_gives_empty_report() {
        let report = service().analyze_batch(Vec::new(), today());
        assert!(report.rows.is_empty());
        assert!(report.subjects.is_empty());
        assert!(!report.alert);
    }

    #[test]
    fn test_batch_is_repeatable() {
        let svc = service();
        let first = svc.analyze_batch(scenario_rows(), today());
        let second = svc.analyze_batch(scenario_rows(), today());
        assert_eq!(first.rows, second.rows);
        assert_eq!(first.subjects, second.subjects);
    }

    #[test]
    fn test_extended_policy_flows_through() {
        let svc = AnalysisService::new(AnalysisConfig {
            thresholds: Thresholds::default(),
            policy: ClassifierPolicy::Extended(ExtendedPolicy::default()),
        });
        let rows = vec![
            ReadingRow::new("A", 100.0, 70.0),
            ReadingRow::new("A", 130.0, 75.0),
            ReadingRow::new("A", 140.0, 80.0),
        ];
        let report = svc.analyze_batch(rows, today());

        assert!(report.rows[1].classification.secondary.unwrap().sudden_jump);
        assert!(report.rows[1].classification.is_anomalous);
        assert_eq!(report.rows[1].label, ReadingLabel::Normal);
        assert!(report.rows[2].classification.is_hypertensive);
        assert_eq!(report.total_anomalies, 2);
    }

    fn personal(name: &str, readings: &[(f64, f64)]) -> PersonalAnalysisRequest {
        PersonalAnalysisRequest {
            name: name.to_string(),
            readings: readings
                .iter()
                .map(|&(systolic, diastolic)| PersonalReading { systolic, diastolic })
                .collect(),
        }
    }

    #[test]
    fn test_personal_alert_follows_latest_reading() {
        let svc = service();

        let recovered = svc
            .analyze_personal(personal("Budi", &[(150.0, 95.0), (120.0, 80.0)]), today())
            .unwrap();
        assert_eq!(recovered.mode, AnalysisMode::Personal);
        assert_eq!(recovered.total_anomalies, 1);
        assert!(recovered.subjects[0].has_alert);
        assert!(!recovered.alert);
        assert!(recovered.flagged_subjects.is_empty());

        let worsening = svc
            .analyze_personal(personal(" Budi ", &[(120.0, 80.0), (150.0, 95.0)]), today())
            .unwrap();
        assert!(worsening.alert);
        assert_eq!(worsening.alert_level, AlertLevel::Warning);
        assert_eq!(worsening.flagged_subjects, vec!["Budi".to_string()]);
        assert_eq!(worsening.rows[1].predicted_systolic, Some(180.0));
        assert_eq!(worsening.rows[1].timestamp, Some(midnight(2024, 3, 10)));
        assert_eq!(worsening.rows[0].timestamp, Some(midnight(2024, 3, 9)));
    }

    #[test]
    fn test_personal_validation() {
        let svc = service();

        let blank = svc.analyze_personal(personal("   ", &[(120.0, 80.0)]), today());
        assert!(matches!(blank, Err(AnalysisError::ValidationError(_))));

        let none = svc.analyze_personal(personal("Budi", &[]), today());
        assert!(matches!(none, Err(AnalysisError::ValidationError(_))));

        let too_many = svc.analyze_personal(personal("Budi", &[(120.0, 80.0); 11]), today());
        assert!(matches!(too_many, Err(AnalysisError::ValidationError(_))));

        let out_of_range = svc
            .analyze_personal(personal("Budi", &[(120.0, 80.0), (260.0, 80.0)]), today())
            .unwrap_err();
        let message = out_of_range.to_string();
        assert!(message.contains("readings[1].systolic"), "{}", message);
        assert!(message.contains("Systolic must be between 40 and 250"));
    }

    #[test]
    fn test_parse_timestamp_formats() {
        assert_eq!(parse_timestamp("2024-03-01"), Some(midnight(2024, 3, 1)));
        assert_eq!(parse_timestamp(" 2024/03/01 "), Some(midnight(2024, 3, 1)));
        assert_eq!(parse_timestamp("01/03/2024"), Some(midnight(2024, 3, 1)));
        assert_eq!(
            parse_timestamp("2024-03-01T07:15:00"),
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap().and_hms_opt(7, 15, 0)
        );
        assert_eq!(
            parse_timestamp("2024-03-01T07:15:00+07:00"),
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap().and_hms_opt(0, 15, 0)
        );
        assert_eq!(
            parse_timestamp("2024-03-01 07:15"),
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap().and_hms_opt(7, 15, 0)
        );
        assert_eq!(parse_timestamp(""), None);
        assert_eq!(parse_timestamp("yesterday"), None);
    }
}
