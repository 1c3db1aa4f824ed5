use super::types::RawObservation;
use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Where a set of observations comes from. Carried through scoring untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Provenance {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    /// Distance to the supply actually sampled, when data was borrowed from a
    /// neighbouring network.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
}

impl Provenance {
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }

    pub fn is_nearby_fallback(&self) -> bool {
        self.distance_km.is_some_and(|d| d > 0.0)
    }
}

/// One measurement record as found in an observation file.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ObservationRecord {
    #[serde(default)]
    pub numeric_value: Option<f64>,
    #[serde(default)]
    pub text_value: Option<String>,
    #[serde(deserialize_with = "deserialize_sample_date")]
    pub sample_date: DateTime<Utc>,
    #[serde(default)]
    pub quality_limit: Option<String>,
    #[serde(default)]
    pub compliance_flag: Option<String>,
}

/// An observation file: optional source and clock, records keyed by code.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ObservationInput {
    #[serde(default)]
    pub source: Option<Provenance>,
    #[serde(default)]
    pub now: Option<DateTime<Utc>>,
    #[serde(default)]
    pub parameters: BTreeMap<String, Vec<ObservationRecord>>,
}

impl ObservationInput {
    /// Flatten the per-code records into raw observations.
    pub fn observations(&self) -> Vec<RawObservation> {
        self.parameters
            .iter()
            .flat_map(|(code, records)| {
                records.iter().map(move |r| RawObservation {
                    parameter_code: code.clone(),
                    numeric_value: r.numeric_value,
                    text_value: r.text_value.clone().filter(|t| !t.trim().is_empty()),
                    sample_date: r.sample_date,
                    quality_limit: r.quality_limit.clone(),
                    compliance_flag: r.compliance_flag.clone(),
                })
            })
            .collect()
    }

    /// Clock to score against: an explicit override, else the file's own
    /// `now`, else `fallback`.
    pub fn reference_time(
        &self,
        override_now: Option<DateTime<Utc>>,
        fallback: DateTime<Utc>,
    ) -> DateTime<Utc> {
        override_now.or(self.now).unwrap_or(fallback)
    }

    /// Human-readable label for reports; falls back to the given default.
    pub fn label<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.source.as_ref().map(Provenance::label).unwrap_or(fallback)
    }
}

/// Accept either an RFC 3339 timestamp or a bare `YYYY-MM-DD` date (midnight UTC).
fn deserialize_sample_date<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_sample_date(&raw).map_err(serde::de::Error::custom)
}

pub fn parse_sample_date(raw: &str) -> Result<DateTime<Utc>, String> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .ok_or_else(|| format!("invalid sample date '{}': expected RFC 3339 or YYYY-MM-DD", raw))
}

/// Load an observation file (JSON).
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a valid observation
/// document.
pub fn load_observations(path: &Path) -> Result<ObservationInput> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read observations from {}", path.display()))?;
    let input: ObservationInput = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse observations in {}", path.display()))?;
    log::debug!(
        "Loaded {} parameter codes from {}",
        input.parameters.len(),
        path.display()
    );
    Ok(input)
}
