use crate::observations::TemporalWindows;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Default cap of the recency bonus added to the final score.
pub const DEFAULT_TEMPORAL_BONUS: f64 = 5.0;
/// Highest accepted recency bonus.
pub const MAX_TEMPORAL_BONUS: f64 = 5.0;

/// Scoring configuration.
///
/// Controls how observation age is read. Every field is optional; an unset
/// field takes its default.
///
/// Example YAML:
/// ```yaml
/// scoring:
///   recent_window: "180days"
///   medium_window: "540days"
///   decay: "120days"
///   temporal_bonus: 5
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ScoringConfig {
    /// Observations at most this old are "recent" (humantime, default 180days)
    #[serde(default)]
    pub recent_window: Option<String>,

    /// Observations at most this old are "medium"; older ones are "old"
    /// (humantime, default 540days)
    #[serde(default)]
    pub medium_window: Option<String>,

    /// Decay constant of the weighted-recent mean (humantime, default 120days)
    #[serde(default)]
    pub decay: Option<String>,

    /// Maximum points added for fresh data; 0 disables the bonus
    #[serde(default)]
    pub temporal_bonus: Option<f64>,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            recent_window: Some("180days".to_string()),
            medium_window: Some("540days".to_string()),
            decay: Some("120days".to_string()),
            temporal_bonus: Some(DEFAULT_TEMPORAL_BONUS),
        }
    }
}

pub(crate) fn parse_days(s: &str) -> Result<f64> {
    let duration = humantime::parse_duration(s.trim())
        .with_context(|| format!("invalid duration '{}'", s))?;
    Ok(duration.as_secs_f64() / 86_400.0)
}

impl ScoringConfig {
    /// Resolve the age windows, falling back to defaults for unset fields.
    ///
    /// # Errors
    ///
    /// Returns an error if a set field is not a valid humantime duration.
    pub fn windows(&self) -> Result<TemporalWindows> {
        let defaults = TemporalWindows::default();
        let resolve = |field: &Option<String>, default: f64| -> Result<f64> {
            field.as_deref().map(parse_days).unwrap_or(Ok(default))
        };
        Ok(TemporalWindows {
            recent_days: resolve(&self.recent_window, defaults.recent_days)
                .context("scoring.recent_window")?,
            medium_days: resolve(&self.medium_window, defaults.medium_days)
                .context("scoring.medium_window")?,
            decay_days: resolve(&self.decay, defaults.decay_days).context("scoring.decay")?,
        })
    }

    /// Cap of the recency bonus.
    pub fn temporal_bonus_cap(&self) -> f64 {
        self.temporal_bonus
            .unwrap_or(DEFAULT_TEMPORAL_BONUS)
            .clamp(0.0, MAX_TEMPORAL_BONUS)
    }

    /// Parse every field once, for use across many scoring runs.
    pub fn resolve(&self) -> Result<ScoringOptions> {
        Ok(ScoringOptions {
            windows: self.windows()?,
            temporal_bonus: self.temporal_bonus_cap(),
        })
    }
}

/// Scoring settings in their parsed form.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringOptions {
    pub windows: TemporalWindows,
    pub temporal_bonus: f64,
}

impl Default for ScoringOptions {
    fn default() -> Self {
        Self {
            windows: TemporalWindows::default(),
            temporal_bonus: DEFAULT_TEMPORAL_BONUS,
        }
    }
}
