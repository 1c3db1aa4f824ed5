use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::value::clean_numeric_value;

/// One laboratory result as handed over by the fetch collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawObservation {
    pub parameter_code: String,
    pub numeric_value: Option<f64>,
    pub text_value: Option<String>,
    pub sample_date: DateTime<Utc>,
    pub quality_limit: Option<String>,
    pub compliance_flag: Option<String>,
}

impl RawObservation {
    /// Numeric reading of this observation, if any.
    ///
    /// The numeric field wins; otherwise the text field goes through
    /// [`clean_numeric_value`].
    pub fn value(&self) -> Option<f64> {
        match self.numeric_value {
            Some(v) if v.is_finite() => Some(v),
            _ => self.text_value.as_deref().and_then(clean_numeric_value),
        }
    }
}
