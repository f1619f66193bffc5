use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use validator::Validate;

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

/// One raw input row, as delivered by an ingestion collaborator.
///
/// Only `subject_id`, `timestamp`, `systolic` and `diastolic` are interpreted.
/// Every other column is kept in `extra` and passed through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct ReadingRow {
    /// Identifier of the individual (non-unique across rows). Numeric ids
    /// are accepted as their decimal text.
    #[serde(default, deserialize_with = "deserialize_text_cell")]
    #[cfg_attr(feature = "with-api", schema(value_type = Option<String>))]
    pub subject_id: Option<String>,

    /// Optional date or date-time of the reading, coerced like `subject_id`
    #[serde(default, deserialize_with = "deserialize_text_cell")]
    #[cfg_attr(feature = "with-api", schema(value_type = Option<String>))]
    pub timestamp: Option<String>,

    /// Systolic pressure in mmHg. Numbers and numeric strings are accepted;
    /// anything else is treated as missing.
    #[serde(default, deserialize_with = "deserialize_numeric_cell")]
    #[cfg_attr(feature = "with-api", schema(value_type = Option<f64>))]
    pub systolic: Option<f64>,

    /// Diastolic pressure in mmHg, coerced like `systolic`
    #[serde(default, deserialize_with = "deserialize_numeric_cell")]
    #[cfg_attr(feature = "with-api", schema(value_type = Option<f64>))]
    pub diastolic: Option<f64>,

    /// Extra columns, passed through untouched
    #[serde(flatten)]
    #[cfg_attr(feature = "with-api", schema(value_type = Object))]
    pub extra: Map<String, Value>,
}

impl ReadingRow {
    /// Convenience constructor for a row without timestamp or extra columns
    pub fn new(subject_id: impl Into<String>, systolic: f64, diastolic: f64) -> Self {
        Self {
            subject_id: Some(subject_id.into()),
            timestamp: None,
            systolic: finite(systolic),
            diastolic: finite(diastolic),
            extra: Map::new(),
        }
    }

    /// Attach a timestamp string
    pub fn with_timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = Some(timestamp.into());
        self
    }
}

/// Coerce a loosely-typed cell into a number.
///
/// Numbers pass through, strings are trimmed and parsed, everything else
/// (null, booleans, arrays, unparsable text) becomes `None`. Non-finite
/// results are also `None`.
pub fn coerce_numeric(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.and_then(finite)
}

/// Coerce a loosely-typed cell into text.
///
/// Strings pass through and numbers become their decimal text. Everything
/// else is `None`.
pub fn coerce_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn finite(value: f64) -> Option<f64> {
    if value.is_finite() {
        Some(value)
    } else {
        None
    }
}

fn deserialize_numeric_cell<'de, D>(d: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(d)?;
    Ok(coerce_numeric(&value))
}

fn deserialize_text_cell<'de, D>(d: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(d)?;
    Ok(coerce_text(&value))
}

/// One reading entered by hand for a personal check
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct PersonalReading {
    /// Systolic blood pressure (the higher number)
    #[validate(range(min = 40.0, max = 250.0, message = "Systolic must be between 40 and 250"))]
    pub systolic: f64,

    /// Diastolic blood pressure (the lower number)
    #[validate(range(min = 20.0, max = 180.0, message = "Diastolic must be between 20 and 180"))]
    pub diastolic: f64,
}

/// Request for a personal analysis: one person, 1 to 10 readings, oldest first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct PersonalAnalysisRequest {
    /// Name of the person
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    pub name: String,

    /// Readings in chronological order (earliest first)
    #[validate(length(min = 1, max = 10, message = "Between 1 and 10 readings are required"))]
    pub readings: Vec<PersonalReading>,
}
