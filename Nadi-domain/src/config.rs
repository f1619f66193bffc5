use std::env;

use thiserror::Error;
use tracing::info;

use crate::services::classifier::{ClassifierPolicy, ExtendedPolicy, Thresholds};

/// Configuration errors
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    /// A variable was set but could not be parsed
    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: String, value: String },

    /// The classifier policy name is unknown
    #[error("Unsupported classifier policy: {0}")]
    UnsupportedPolicy(String),

    /// A low threshold is not below its high threshold
    #[error("Invalid thresholds: {0}")]
    InvalidThresholds(String),
}

/// Settings for the analysis pipeline
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AnalysisConfig {
    pub thresholds: Thresholds,
    pub policy: ClassifierPolicy,
}

impl AnalysisConfig {
    /// Create the analysis configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Create the analysis configuration from any variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Thresholds::default();
        let thresholds = Thresholds {
            sys_high: parse_f64(&lookup, "NADI_SYS_HIGH", defaults.sys_high)?,
            dia_high: parse_f64(&lookup, "NADI_DIA_HIGH", defaults.dia_high)?,
            sys_low: parse_f64(&lookup, "NADI_SYS_LOW", defaults.sys_low)?,
            dia_low: parse_f64(&lookup, "NADI_DIA_LOW", defaults.dia_low)?,
        };

        if thresholds.sys_low >= thresholds.sys_high {
            return Err(ConfigError::InvalidThresholds(format!(
                "systolic low {} must be below systolic high {}",
                thresholds.sys_low, thresholds.sys_high
            )));
        }
        if thresholds.dia_low >= thresholds.dia_high {
            return Err(ConfigError::InvalidThresholds(format!(
                "diastolic low {} must be below diastolic high {}",
                thresholds.dia_low, thresholds.dia_high
            )));
        }

        let policy_name = lookup("NADI_CLASSIFIER_POLICY").unwrap_or_else(|| "strict".to_string());
        let policy = match policy_name.trim().to_lowercase().as_str() {
            "strict" => ClassifierPolicy::Strict,
            "extended" => {
                let defaults = ExtendedPolicy::default();
                ClassifierPolicy::Extended(ExtendedPolicy {
                    z_threshold: parse_f64(&lookup, "NADI_Z_THRESHOLD", defaults.z_threshold)?,
                    systolic_jump: parse_f64(&lookup, "NADI_SYSTOLIC_JUMP", defaults.systolic_jump)?,
                    diastolic_jump: parse_f64(&lookup, "NADI_DIASTOLIC_JUMP", defaults.diastolic_jump)?,
                })
            }
            _ => return Err(ConfigError::UnsupportedPolicy(policy_name)),
        };

        info!(
            "Analysis configuration: sys_high={}, dia_high={}, sys_low={}, dia_low={}, policy={:?}",
            thresholds.sys_high, thresholds.dia_high, thresholds.sys_low, thresholds.dia_low, policy
        );

        Ok(Self { thresholds, policy })
    }
}

fn parse_f64<F>(lookup: &F, name: &str, default: f64) -> Result<f64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or(ConfigError::InvalidValue {
                name: name.to_string(),
                value: raw,
            }),
    }
}
