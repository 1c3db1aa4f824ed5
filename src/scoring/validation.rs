use super::config::{parse_days, ScoringConfig, MAX_TEMPORAL_BONUS};

/// Validate scoring configuration at startup.
/// Returns all validation errors at once (not just the first).
pub fn validate_scoring(config: &ScoringConfig) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    let mut parse_window = |name: &str, value: &Option<String>| -> Option<f64> {
        let raw = value.as_deref()?;
        match parse_days(raw) {
            Ok(days) => Some(days),
            Err(e) => {
                errors.push(format!("scoring.{}: invalid format '{}' - {:#}", name, raw, e));
                None
            }
        }
    };

    let recent = parse_window("recent_window", &config.recent_window);
    let medium = parse_window("medium_window", &config.medium_window);
    let decay = parse_window("decay", &config.decay);

    // Window order, checked against defaults when only one side is set
    let defaults = crate::observations::TemporalWindows::default();
    let recent_days = recent.unwrap_or(defaults.recent_days);
    let medium_days = medium.unwrap_or(defaults.medium_days);
    if (recent.is_some() || medium.is_some()) && recent_days >= medium_days {
        errors.push(format!(
            "scoring.recent_window: {} days must be shorter than medium_window ({} days)",
            recent_days, medium_days
        ));
    }

    if let Some(days) = decay {
        if days <= 0.0 {
            errors.push("scoring.decay: must be positive".to_string());
        }
    }

    if let Some(bonus) = config.temporal_bonus {
        if !(0.0..=MAX_TEMPORAL_BONUS).contains(&bonus) {
            errors.push(format!(
                "scoring.temporal_bonus: {} is outside [0, {}]",
                bonus, MAX_TEMPORAL_BONUS
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
