use super::temporal::strategy_for;
use crate::catalog::{EquivalenceGroup, ReferenceCatalog};
use crate::observations::{ParameterHistory, TemporalWindows};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Points per step of priority order.
const PRIORITY_STEP: f64 = 10.0;
const RECENT_BONUS: f64 = 20.0;
const MEDIUM_BONUS: f64 = 10.0;
const OLD_BONUS: f64 = 5.0;
const MAX_VOLUME_BONUS: f64 = 10.0;
const METHOD_BONUS: f64 = 5.0;

/// One equivalence group collapsed onto a single code.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Substitution {
    pub group: String,
    pub kept: String,
    pub dropped: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct Deduplicated {
    pub histories: BTreeMap<String, ParameterHistory>,
    pub substitutions: Vec<Substitution>,
}

impl Deduplicated {
    /// Codes removed in favour of an equivalent one.
    pub fn dropped_codes(&self) -> BTreeSet<&str> {
        self.substitutions
            .iter()
            .flat_map(|s| s.dropped.iter().map(String::as_str))
            .collect()
    }

    pub fn dropped_count(&self) -> usize {
        self.substitutions.iter().map(|s| s.dropped.len()).sum()
    }
}

/// Rank of a present code within its group; higher wins.
fn rank(
    group: &EquivalenceGroup,
    history: &ParameterHistory,
    catalog: &ReferenceCatalog,
    windows: &TemporalWindows,
) -> f64 {
    let priority = PRIORITY_STEP * group.priority_rank(&history.code) as f64;

    let recency = match history.samples.first().map(|s| s.age_days) {
        Some(age) if age <= windows.recent_days => RECENT_BONUS,
        Some(age) if age <= windows.medium_days => MEDIUM_BONUS,
        _ => OLD_BONUS,
    };

    let volume = (history.total_count() as f64).min(MAX_VOLUME_BONUS);

    let method = if strategy_for(catalog.class_of(&history.code)).favours_recent() {
        METHOD_BONUS
    } else {
        0.0
    };

    priority + recency + volume + method
}

/// Keep one code per equivalence group among those with usable values.
///
/// Running this on its own output changes nothing.
pub fn deduplicate(
    mut histories: BTreeMap<String, ParameterHistory>,
    catalog: &ReferenceCatalog,
    windows: &TemporalWindows,
) -> Deduplicated {
    let mut substitutions = Vec::new();

    for group in catalog.equivalence_groups() {
        let mut present: Vec<(&str, f64, usize)> = group
            .codes
            .iter()
            .filter_map(|code| histories.get(code).filter(|h| h.has_values()))
            .map(|h| {
                let order = group
                    .priority_order
                    .iter()
                    .position(|c| *c == h.code)
                    .unwrap_or(usize::MAX);
                (h.code.as_str(), rank(group, h, catalog, windows), order)
            })
            .collect();

        if present.len() < 2 {
            continue;
        }

        present.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.2.cmp(&b.2)));
        let kept = present[0].0.to_string();
        let dropped: Vec<String> = present[1..].iter().map(|p| p.0.to_string()).collect();

        log::debug!(
            "{}: keeping {} (rank {:.1}), dropping {:?}",
            group.logical_name,
            kept,
            present[0].1,
            dropped
        );

        substitutions.push(Substitution {
            group: group.logical_name.clone(),
            kept,
            dropped,
        });
    }

    for sub in &substitutions {
        for code in &sub.dropped {
            histories.remove(code);
        }
    }

    Deduplicated {
        histories,
        substitutions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observations::{build_histories, RawObservation};
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn obs(code: &str, value: &str, days_ago: i64) -> RawObservation {
        RawObservation {
            parameter_code: code.to_string(),
            numeric_value: None,
            text_value: Some(value.to_string()),
            sample_date: fixed_now() - Duration::days(days_ago),
            quality_limit: None,
            compliance_flag: None,
        }
    }

    fn run(observations: &[RawObservation]) -> Deduplicated {
        let catalog = ReferenceCatalog::builtin().unwrap();
        let windows = TemporalWindows::default();
        let histories = build_histories(observations, fixed_now(), &windows);
        deduplicate(histories, &catalog, &windows)
    }

    #[test]
    fn test_priority_wins_on_equal_footing() {
        let result = run(&[obs("1506", "0", 10), obs("1449", "0", 10)]);
        assert_eq!(result.substitutions.len(), 1);
        let sub = &result.substitutions[0];
        assert_eq!(sub.group, "E. coli");
        assert_eq!(sub.kept, "1506");
        assert_eq!(sub.dropped, vec!["1449".to_string()]);
        assert!(result.histories.contains_key("1506"));
        assert!(!result.histories.contains_key("1449"));
    }

    #[test]
    fn test_fresh_data_beats_priority() {
        // 1449 ranks lower by priority (10 vs 20) but is recent (+20 vs +5)
        // and has more observations.
        let result = run(&[
            obs("1506", "0", 900),
            obs("1449", "0", 5),
            obs("1449", "0", 30),
            obs("1449", "0", 60),
        ]);
        assert_eq!(result.substitutions[0].kept, "1449");
        assert_eq!(result.dropped_codes().into_iter().collect::<Vec<_>>(), vec!["1506"]);
    }

    #[test]
    fn test_single_present_code_untouched() {
        let result = run(&[obs("1506", "0", 10), obs("1340", "12", 10)]);
        assert!(result.substitutions.is_empty());
        assert_eq!(result.histories.len(), 2);
    }

    #[test]
    fn test_unparsable_sibling_is_not_present() {
        let result = run(&[obs("1304", "0.2", 10), obs("1295", "trouble", 10)]);
        assert!(result.substitutions.is_empty());
        assert!(result.histories.contains_key("1295"));
    }

    #[test]
    fn test_deduplication_is_idempotent() {
        let catalog = ReferenceCatalog::builtin().unwrap();
        let windows = TemporalWindows::default();
        let observations = [
            obs("1506", "0", 10),
            obs("1449", "0", 10),
            obs("1398", "0.2", 3),
            obs("1959", "0.3", 400),
            obs("6276", "0.05", 50),
            obs("PEST", "0.04", 50),
        ];
        let first = deduplicate(
            build_histories(&observations, fixed_now(), &windows),
            &catalog,
            &windows,
        );
        assert_eq!(first.dropped_count(), 3);

        let kept: Vec<String> = first.histories.keys().cloned().collect();
        let second = deduplicate(first.histories, &catalog, &windows);
        assert!(second.substitutions.is_empty());
        assert_eq!(second.histories.keys().cloned().collect::<Vec<_>>(), kept);
    }
}
