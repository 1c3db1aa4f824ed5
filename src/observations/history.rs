//! Per-parameter observation histories.
//!
//! # Clock injection
//! Ages are computed against a `now` supplied once per scoring run, never
//! `Utc::now()`, so a run is a pure function of its inputs.

use super::types::RawObservation;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// Age bucket boundaries and decay constant, in days.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemporalWindows {
    pub recent_days: f64,
    pub medium_days: f64,
    pub decay_days: f64,
}

impl Default for TemporalWindows {
    fn default() -> Self {
        Self {
            recent_days: 180.0,
            medium_days: 540.0,
            decay_days: 120.0,
        }
    }
}

impl TemporalWindows {
    pub fn bucket(&self, age_days: f64) -> AgeBucket {
        if age_days <= self.recent_days {
            AgeBucket::Recent
        } else if age_days <= self.medium_days {
            AgeBucket::Medium
        } else {
            AgeBucket::Old
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AgeBucket {
    Recent,
    Medium,
    Old,
}

/// A numeric reading with its derived age.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub value: f64,
    pub sample_date: DateTime<Utc>,
    pub age_days: f64,
    pub bucket: AgeBucket,
}

/// Observations of one parameter code, most recent first.
#[derive(Debug, Clone)]
pub struct ParameterHistory {
    pub code: String,
    /// Every observation, parseable or not.
    pub observations: Vec<RawObservation>,
    /// Numeric-parseable observations only.
    pub samples: Vec<Sample>,
}

/// Display-only statistics over a history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistorySummary {
    pub total_count: usize,
    pub valid_count: usize,
    pub recent_count: usize,
    pub medium_count: usize,
    pub old_count: usize,
    pub min: f64,
    pub max: f64,
    /// Population standard deviation of the valid values.
    pub std_dev: f64,
    pub most_recent_value: f64,
    pub most_recent_date: DateTime<Utc>,
}

fn age_in_days(now: DateTime<Utc>, date: DateTime<Utc>) -> f64 {
    ((now - date).num_seconds() as f64 / 86_400.0).max(0.0)
}

impl ParameterHistory {
    pub fn new(
        code: String,
        mut observations: Vec<RawObservation>,
        now: DateTime<Utc>,
        windows: &TemporalWindows,
    ) -> Self {
        observations.sort_by(|a, b| b.sample_date.cmp(&a.sample_date));
        let samples = observations
            .iter()
            .filter_map(|o| {
                o.value().map(|value| {
                    let age_days = age_in_days(now, o.sample_date);
                    Sample {
                        value,
                        sample_date: o.sample_date,
                        age_days,
                        bucket: windows.bucket(age_days),
                    }
                })
            })
            .collect();
        Self {
            code,
            observations,
            samples,
        }
    }

    pub fn total_count(&self) -> usize {
        self.observations.len()
    }

    pub fn has_values(&self) -> bool {
        !self.samples.is_empty()
    }

    pub fn in_bucket(&self, bucket: AgeBucket) -> impl Iterator<Item = &Sample> {
        self.samples.iter().filter(move |s| s.bucket == bucket)
    }

    pub fn summary(&self) -> Option<HistorySummary> {
        let latest = self.samples.first()?;
        let n = self.samples.len() as f64;
        let values = self.samples.iter().map(|s| s.value);
        let min = values.clone().fold(f64::INFINITY, f64::min);
        let max = values.clone().fold(f64::NEG_INFINITY, f64::max);
        let mean = values.clone().sum::<f64>() / n;
        let variance = values.map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        let count = |b| self.in_bucket(b).count();

        Some(HistorySummary {
            total_count: self.total_count(),
            valid_count: self.samples.len(),
            recent_count: count(AgeBucket::Recent),
            medium_count: count(AgeBucket::Medium),
            old_count: count(AgeBucket::Old),
            min,
            max,
            std_dev: variance.sqrt(),
            most_recent_value: latest.value,
            most_recent_date: latest.sample_date,
        })
    }
}

/// Group raw observations by parameter code.
pub fn build_histories(
    observations: &[RawObservation],
    now: DateTime<Utc>,
    windows: &TemporalWindows,
) -> BTreeMap<String, ParameterHistory> {
    let mut grouped: BTreeMap<String, Vec<RawObservation>> = BTreeMap::new();
    for obs in observations {
        grouped
            .entry(obs.parameter_code.clone())
            .or_default()
            .push(obs.clone());
    }
    grouped
        .into_iter()
        .map(|(code, obs)| {
            let history = ParameterHistory::new(code.clone(), obs, now, windows);
            (code, history)
        })
        .collect()
}
