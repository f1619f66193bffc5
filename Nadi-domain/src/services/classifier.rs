use serde::{Deserialize, Serialize};

use crate::entities::analysis::{Classification, SecondaryFlags};

/// Clinical range limits in mmHg
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    pub sys_high: f64,
    pub dia_high: f64,
    pub sys_low: f64,
    pub dia_low: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            sys_high: 140.0,
            dia_high: 90.0,
            sys_low: 90.0,
            dia_low: 60.0,
        }
    }
}

/// Parameters of the statistical detectors used by [`ClassifierPolicy::Extended`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExtendedPolicy {
    /// Absolute z-score above which a value is an outlier
    pub z_threshold: f64,

    /// Largest systolic change between consecutive readings that is not a jump
    pub systolic_jump: f64,

    /// Largest diastolic change between consecutive readings that is not a jump
    pub diastolic_jump: f64,
}

impl Default for ExtendedPolicy {
    fn default() -> Self {
        Self {
            z_threshold: 2.5,
            systolic_jump: 20.0,
            diastolic_jump: 15.0,
        }
    }
}

/// How readings are classified.
///
/// `Strict` is the canonical policy: exclusive threshold comparisons and
/// nothing else. `Extended` compares inclusively and adds z-score and
/// jump-delta detectors over the subject's series.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ClassifierPolicy {
    #[default]
    Strict,
    Extended(ExtendedPolicy),
}

/// Classify one reading with the strict policy.
///
/// A missing value makes the reading unclassifiable: every flag is false.
pub fn classify_values(systolic: Option<f64>, diastolic: Option<f64>, thresholds: &Thresholds) -> Classification {
    let (Some(sys), Some(dia)) = (systolic, diastolic) else {
        return Classification::default();
    };

    let is_hypertensive = sys > thresholds.sys_high || dia > thresholds.dia_high;
    let is_hypotensive = sys < thresholds.sys_low || dia < thresholds.dia_low;

    Classification {
        is_hypertensive,
        is_hypotensive,
        is_anomalous: is_hypertensive || is_hypotensive,
        secondary: None,
    }
}

fn classify_values_inclusive(sys: f64, dia: f64, thresholds: &Thresholds) -> (bool, bool) {
    let is_hypertensive = sys >= thresholds.sys_high || dia >= thresholds.dia_high;
    let is_hypotensive = sys <= thresholds.sys_low || dia <= thresholds.dia_low;
    (is_hypertensive, is_hypotensive)
}

/// Classifier for a subject's series of readings
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AnomalyClassifier {
    thresholds: Thresholds,
    policy: ClassifierPolicy,
}

impl AnomalyClassifier {
    pub fn new(thresholds: Thresholds, policy: ClassifierPolicy) -> Self {
        Self { thresholds, policy }
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    pub fn policy(&self) -> &ClassifierPolicy {
        &self.policy
    }

    /// Classify every reading of a chronologically ordered series.
    ///
    /// Each element is a `(systolic, diastolic)` pair. The output has one
    /// classification per input element, in the same order.
    pub fn classify_series(&self, series: &[(Option<f64>, Option<f64>)]) -> Vec<Classification> {
        match self.policy {
            ClassifierPolicy::Strict => series
                .iter()
                .map(|&(sys, dia)| classify_values(sys, dia, &self.thresholds))
                .collect(),
            ClassifierPolicy::Extended(extended) => self.classify_extended(series, &extended),
        }
    }

    fn classify_extended(
        &self,
        series: &[(Option<f64>, Option<f64>)],
        extended: &ExtendedPolicy,
    ) -> Vec<Classification> {
        let systolic: Vec<Option<f64>> = series.iter().map(|&(s, _)| s).collect();
        let diastolic: Vec<Option<f64>> = series.iter().map(|&(_, d)| d).collect();

        let sys_z = z_scores(&systolic);
        let dia_z = z_scores(&diastolic);
        let sys_jump = jumps(&systolic, extended.systolic_jump);
        let dia_jump = jumps(&diastolic, extended.diastolic_jump);

        series
            .iter()
            .enumerate()
            .map(|(i, &(sys, dia))| {
                let (Some(sys), Some(dia)) = (sys, dia) else {
                    return Classification::default();
                };

                let (is_hypertensive, is_hypotensive) =
                    classify_values_inclusive(sys, dia, &self.thresholds);
                let outlier = |z: Option<f64>| z.map_or(false, |z| z.abs() > extended.z_threshold);
                let secondary = SecondaryFlags {
                    z_score_outlier: outlier(sys_z[i]) || outlier(dia_z[i]),
                    sudden_jump: sys_jump[i] || dia_jump[i],
                };

                Classification {
                    is_hypertensive,
                    is_hypotensive,
                    is_anomalous: is_hypertensive
                        || is_hypotensive
                        || secondary.z_score_outlier
                        || secondary.sudden_jump,
                    secondary: Some(secondary),
                }
            })
            .collect()
    }
}

/// Z-score of each present value against the mean and sample standard
/// deviation of all present values. `None` where the value is missing or
/// the deviation is undefined or zero.
fn z_scores(values: &[Option<f64>]) -> Vec<Option<f64>> {
    let present: Vec<f64> = values.iter().flatten().copied().collect();
    if present.len() < 2 {
        return vec![None; values.len()];
    }

    let n = present.len() as f64;
    let mean = present.iter().sum::<f64>() / n;
    let variance = present.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    let std_dev = variance.sqrt();
    if std_dev <= 0.0 || !std_dev.is_finite() {
        return vec![None; values.len()];
    }

    values.iter().map(|v| v.map(|v| (v - mean) / std_dev)).collect()
}

/// Whether each value moved more than `limit` from the previous present value
fn jumps(values: &[Option<f64>], limit: f64) -> Vec<bool> {
    let mut previous: Option<f64> = None;
    values
        .iter()
        .map(|value| match *value {
            Some(v) => {
                let jumped = previous.map_or(false, |p| (v - p).abs() > limit);
                previous = Some(v);
                jumped
            }
            None => false,
        })
        .collect()
}
