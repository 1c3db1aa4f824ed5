//! Picks one representative value out of a dated history.
//!
//! Each parameter class maps to a selection strategy; strategies are plain
//! functions looked up by [`StrategyKind`].

use crate::catalog::ParameterClass;
use crate::observations::{AgeBucket, HistorySummary, ParameterHistory, Sample, TemporalWindows};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    WorstCaseRecent,
    StrictRecent,
    TrendAware,
    WeightedRecent,
}

type StrategyFn = fn(&[Sample], &TemporalWindows) -> f64;

impl StrategyKind {
    pub fn name(self) -> &'static str {
        match self {
            StrategyKind::WorstCaseRecent => "worst_case_recent",
            StrategyKind::StrictRecent => "strict_recent",
            StrategyKind::TrendAware => "trend_aware",
            StrategyKind::WeightedRecent => "weighted_recent",
        }
    }

    fn function(self) -> StrategyFn {
        match self {
            StrategyKind::WorstCaseRecent => worst_case_recent,
            StrategyKind::StrictRecent => strict_recent,
            StrategyKind::TrendAware => trend_aware,
            StrategyKind::WeightedRecent => weighted_recent,
        }
    }

    /// Strategies that lean on fresh data get a bonus when ranking duplicates.
    pub fn favours_recent(self) -> bool {
        let name = self.name();
        name.contains("recent") || name.contains("weighted")
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Strategy used for each parameter class.
pub fn strategy_for(class: ParameterClass) -> StrategyKind {
    match class {
        ParameterClass::Microbiological => StrategyKind::WorstCaseRecent,
        ParameterClass::DisinfectantResidual => StrategyKind::StrictRecent,
        ParameterClass::HeavyMetal => StrategyKind::TrendAware,
        ParameterClass::SeasonalContaminant => StrategyKind::WorstCaseRecent,
        ParameterClass::StablePhysicoChemical => StrategyKind::WeightedRecent,
        ParameterClass::Unclassified => StrategyKind::WeightedRecent,
    }
}

/// One value per parameter, with the strategy that produced it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedValue {
    pub value: f64,
    pub method: StrategyKind,
    pub summary: HistorySummary,
}

/// Resolve a history to a single value.
///
/// Returns `None` when no observation is numeric. A single numeric
/// observation is returned as is.
pub fn resolve(
    history: &ParameterHistory,
    class: ParameterClass,
    windows: &TemporalWindows,
) -> Option<ResolvedValue> {
    let summary = history.summary()?;
    let method = strategy_for(class);
    let value = match history.samples.as_slice() {
        [only] => only.value,
        samples => (method.function())(samples, windows),
    };
    log::debug!(
        "{}: {} samples -> {} via {}",
        history.code,
        history.samples.len(),
        value,
        method
    );
    Some(ResolvedValue {
        value,
        method,
        summary,
    })
}

fn bucket_values(samples: &[Sample], bucket: AgeBucket) -> impl Iterator<Item = f64> + '_ {
    samples
        .iter()
        .filter(move |s| s.bucket == bucket)
        .map(|s| s.value)
}

fn max_of(values: impl Iterator<Item = f64>) -> Option<f64> {
    values.fold(None, |acc, v| Some(acc.map_or(v, |m: f64| m.max(v))))
}

fn mean_of(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, n) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    (n > 0).then(|| sum / n as f64)
}

/// Least favourable recent value, else medium, else overall.
fn worst_case_recent(samples: &[Sample], _windows: &TemporalWindows) -> f64 {
    max_of(bucket_values(samples, AgeBucket::Recent))
        .or_else(|| max_of(bucket_values(samples, AgeBucket::Medium)))
        .or_else(|| max_of(samples.iter().map(|s| s.value)))
        .unwrap_or_default()
}

/// Mean of the three freshest recent values, else the freshest value.
fn strict_recent(samples: &[Sample], _windows: &TemporalWindows) -> f64 {
    mean_of(bucket_values(samples, AgeBucket::Recent).take(3))
        .or_else(|| samples.first().map(|s| s.value))
        .unwrap_or_default()
}

/// Favour an improving trend; otherwise blend recent and old.
fn trend_aware(samples: &[Sample], windows: &TemporalWindows) -> f64 {
    if samples.len() >= 4 {
        let recent = mean_of(bucket_values(samples, AgeBucket::Recent));
        let old = mean_of(bucket_values(samples, AgeBucket::Old));
        if let (Some(recent), Some(old)) = (recent, old) {
            return if recent < old {
                recent
            } else {
                0.7 * recent + 0.3 * old
            };
        }
    }
    weighted_recent(samples, windows)
}

/// Mean weighted by `exp(-age / decay)`.
///
/// Ages are taken relative to the youngest sample; the common factor cancels
/// and the weights stay finite for arbitrarily old histories.
fn weighted_recent(samples: &[Sample], windows: &TemporalWindows) -> f64 {
    let youngest = samples
        .iter()
        .map(|s| s.age_days)
        .fold(f64::INFINITY, f64::min);
    let decay = windows.decay_days.max(f64::EPSILON);
    let (weighted, total) = samples.iter().fold((0.0, 0.0), |(acc, total), s| {
        let w = (-(s.age_days - youngest) / decay).exp();
        (acc + s.value * w, total + w)
    });
    if total > 0.0 {
        weighted / total
    } else {
        samples.first().map(|s| s.value).unwrap_or_default()
    }
}
