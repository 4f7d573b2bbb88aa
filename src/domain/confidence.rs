use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

/// A score as emitted by a model capability, before it is narrowed to `f32`.
///
/// Capabilities report scores in whatever numeric shape their runtime produces
/// (single or double precision, integers, or numbers rendered as text). Only
/// plain `f32` values leave the entity and classification components.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RawScore {
    F32(f32),
    F64(f64),
    Int(i64),
    Text(String),
    Missing,
}

/// Reasons a raw score could not be narrowed to a confidence.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfidenceError {
    #[error("confidence value is missing")]
    Missing,

    #[error("confidence value is not numeric: {0:?}")]
    NotNumeric(String),

    #[error("confidence value is not finite")]
    NotFinite,
}

impl RawScore {
    /// Narrow to a plain confidence in `[0, 1]`.
    ///
    /// Finite values outside the unit interval are clamped.
    pub fn coerce(&self) -> Result<f32, ConfidenceError> {
        let value = match self {
            RawScore::F32(v) => f64::from(*v),
            RawScore::F64(v) => *v,
            RawScore::Int(v) => *v as f64,
            RawScore::Text(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| ConfidenceError::NotNumeric(s.clone()))?,
            RawScore::Missing => return Err(ConfidenceError::Missing),
        };

        if !value.is_finite() {
            return Err(ConfidenceError::NotFinite);
        }

        Ok(value.clamp(0.0, 1.0) as f32)
    }

    /// Narrow to a confidence, substituting `0.0` when the value is unusable.
    pub fn coerce_or_zero(&self) -> f32 {
        match self.coerce() {
            Ok(value) => value,
            Err(e) => {
                warn!(error = %e, "Confidence coercion failed, using 0.0");
                0.0
            }
        }
    }

    /// Read a score out of an arbitrary JSON value.
    pub fn from_json(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Number(n) => n
                .as_i64()
                .map(RawScore::Int)
                .or_else(|| n.as_f64().map(RawScore::F64))
                .unwrap_or(RawScore::Missing),
            serde_json::Value::String(s) => RawScore::Text(s.clone()),
            serde_json::Value::Null => RawScore::Missing,
            other => RawScore::Text(other.to_string()),
        }
    }
}

impl From<f32> for RawScore {
    fn from(value: f32) -> Self {
        RawScore::F32(value)
    }
}

impl From<f64> for RawScore {
    fn from(value: f64) -> Self {
        RawScore::F64(value)
    }
}

impl From<Option<f64>> for RawScore {
    fn from(value: Option<f64>) -> Self {
        value.map(RawScore::F64).unwrap_or(RawScore::Missing)
    }
}
