use super::category::{score_category, CategoryScore};
use super::config::ScoringOptions;
use super::dedup::{deduplicate, Substitution};
use super::temporal::{resolve, ResolvedValue};
use super::tier::{QualityTier, ReliabilityLevel};
use crate::catalog::ReferenceCatalog;
use crate::observations::{build_histories, Provenance, RawObservation};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;

const NO_DATA_ALERTS: [&str; 2] = [
    "No water quality analysis found",
    "Extended search in neighbouring areas unsuccessful",
];
const NO_DATA_RECOMMENDATIONS: [&str; 2] = [
    "Contact your town hall for recent analyses",
    "Have a complete analysis done by an accredited laboratory",
];

const FILTRATION: &str = "Consider a suitable filtration system";
const COMPLEMENTARY: &str = "Complementary analyses recommended for more precision";
const CONSULT: &str = "Consult a professional about the parameters in alert";
const REASSURANCE: &str = "Water quality is reassuring on the tested parameters";
const LOCAL_AUTHORITY: &str = "Contact your local water authority about the results";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultMetadata {
    pub catalog_version: Option<String>,
    pub tested_parameters: usize,
    pub total_parameters: usize,
    /// Tested share of all parameters, ignoring criticality.
    pub simple_reliability: u8,
    pub reliability_level: ReliabilityLevel,
    pub temporal_bonus: f64,
    pub untested_categories: Vec<String>,
    pub scored_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinalResult {
    pub score: u8,
    pub reliability: u8,
    pub tier: QualityTier,
    pub alerts: Vec<String>,
    pub recommendations: Vec<String>,
    pub categories: Vec<CategoryScore>,
    pub substitutions: Vec<Substitution>,
    pub provenance: Option<Provenance>,
    pub metadata: ResultMetadata,
}

impl FinalResult {
    pub fn is_missing_data(&self) -> bool {
        self.tier == QualityTier::MissingData
    }

    /// Label of the data source, if any.
    pub fn source_label(&self) -> &str {
        self.provenance.as_ref().map(Provenance::label).unwrap_or("")
    }
}

fn to_percent(value: f64) -> u8 {
    value.round().clamp(0.0, 100.0) as u8
}

/// Score one supply.
///
/// Pure: the same catalog, observations, `now` and options always give the
/// same result. Never fails; poor or missing data lowers reliability instead.
pub fn score_supply(
    catalog: &ReferenceCatalog,
    observations: &[RawObservation],
    now: DateTime<Utc>,
    provenance: Option<&Provenance>,
    options: &ScoringOptions,
) -> FinalResult {
    let windows = &options.windows;

    let mut histories = build_histories(observations, now, windows);
    histories.retain(|code, _| {
        let known = catalog.parameter(code).is_some();
        if !known {
            log::debug!("Ignoring unknown parameter code {}", code);
        }
        known
    });

    if histories.is_empty() {
        log::debug!("No observation for any catalog parameter");
        return missing_data(catalog, now, provenance);
    }

    let deduplicated = deduplicate(histories, catalog, windows);
    let dropped = deduplicated.dropped_codes();

    let resolved: HashMap<String, ResolvedValue> = deduplicated
        .histories
        .values()
        .filter_map(|h| {
            resolve(h, catalog.class_of(&h.code), windows).map(|r| (h.code.clone(), r))
        })
        .collect();

    let categories: Vec<CategoryScore> = catalog
        .categories()
        .iter()
        .map(|c| score_category(c, catalog, &resolved, &dropped))
        .collect();

    let weighted_score: f64 = categories.iter().map(|c| c.weight * c.score).sum();
    let weighted_reliability: f64 = categories.iter().map(|c| c.weight * c.reliability).sum();

    let tested: Vec<_> = categories
        .iter()
        .flat_map(|c| c.parameters.iter())
        .filter(|p| p.tested)
        .collect();
    let with_recent = tested
        .iter()
        .filter(|p| p.summary.as_ref().is_some_and(|s| s.recent_count > 0))
        .count();
    let temporal_bonus = if tested.is_empty() {
        0.0
    } else {
        options.temporal_bonus * with_recent as f64 / tested.len() as f64
    };

    let score = to_percent(weighted_score + temporal_bonus);
    let reliability = to_percent(weighted_reliability);
    let tier = QualityTier::from_score(score as f64);

    let substitutions = deduplicated.substitutions.clone();
    let alerts = build_alerts(deduplicated.dropped_count(), provenance, &categories);
    let has_breaches = categories.iter().any(|c| !c.critical_breaches.is_empty());
    let recommendations = build_recommendations(score, reliability, has_breaches);

    let tested_parameters = tested.len();
    let total_parameters: usize = categories.iter().map(|c| c.total_count).sum();
    let simple_reliability = if total_parameters > 0 {
        to_percent(tested_parameters as f64 / total_parameters as f64 * 100.0)
    } else {
        0
    };
    let untested_categories = categories
        .iter()
        .filter(|c| c.tested_count == 0)
        .map(|c| c.key.clone())
        .collect();

    log::debug!(
        "Final: {}/100 {} (reliability {}%, bonus {:.2}, {}/{} tested)",
        score,
        tier,
        reliability,
        temporal_bonus,
        tested_parameters,
        total_parameters
    );

    FinalResult {
        score,
        reliability,
        tier,
        alerts,
        recommendations,
        categories,
        substitutions,
        provenance: provenance.cloned(),
        metadata: ResultMetadata {
            catalog_version: catalog.version().map(str::to_string),
            tested_parameters,
            total_parameters,
            simple_reliability,
            reliability_level: ReliabilityLevel::from_reliability(reliability as f64),
            temporal_bonus,
            untested_categories,
            scored_at: now,
        },
    }
}

fn build_alerts(
    dropped: usize,
    provenance: Option<&Provenance>,
    categories: &[CategoryScore],
) -> Vec<String> {
    let mut alerts = Vec::new();

    if dropped > 0 {
        alerts.push(format!(
            "Deduplication: {} equivalent measurement code{} merged",
            dropped,
            if dropped == 1 { "" } else { "s" }
        ));
    }

    if let Some(p) = provenance.filter(|p| p.is_nearby_fallback()) {
        alerts.push(format!(
            "Data from {}, {:.1} km away (nearest supply with analyses)",
            p.label(),
            p.distance_km.unwrap_or_default()
        ));
    }

    for c in categories {
        alerts.push(format!(
            "{}: {:.0}/100 ({}/{} parameters tested)",
            c.name, c.score, c.tested_count, c.total_count
        ));
    }

    alerts.extend(
        categories
            .iter()
            .flat_map(|c| c.critical_breaches.iter().cloned()),
    );
    alerts
}

fn build_recommendations(score: u8, reliability: u8, has_breaches: bool) -> Vec<String> {
    let rules = [
        (score < 60, FILTRATION),
        (reliability < 80, COMPLEMENTARY),
        (has_breaches, CONSULT),
        (reliability >= 80 && score >= 75, REASSURANCE),
        (score < 60, LOCAL_AUTHORITY),
    ];

    let mut recommendations: Vec<String> = Vec::new();
    for (_, text) in rules.iter().filter(|(applies, _)| *applies) {
        if !recommendations.iter().any(|r| r == text) {
            recommendations.push(text.to_string());
        }
    }
    recommendations
}

/// Fixed result when not a single catalog parameter was observed.
fn missing_data(
    catalog: &ReferenceCatalog,
    now: DateTime<Utc>,
    provenance: Option<&Provenance>,
) -> FinalResult {
    FinalResult {
        score: 0,
        reliability: 0,
        tier: QualityTier::MissingData,
        alerts: NO_DATA_ALERTS.iter().map(|s| s.to_string()).collect(),
        recommendations: NO_DATA_RECOMMENDATIONS.iter().map(|s| s.to_string()).collect(),
        categories: Vec::new(),
        substitutions: Vec::new(),
        provenance: provenance.cloned(),
        metadata: ResultMetadata {
            catalog_version: catalog.version().map(str::to_string),
            tested_parameters: 0,
            total_parameters: catalog.parameter_count(),
            simple_reliability: 0,
            reliability_level: ReliabilityLevel::Insufficient,
            temporal_bonus: 0.0,
            untested_categories: catalog.categories().iter().map(|c| c.key.clone()).collect(),
            scored_at: now,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn obs(code: &str, value: f64, days_ago: i64) -> RawObservation {
        RawObservation {
            parameter_code: code.to_string(),
            numeric_value: Some(value),
            text_value: None,
            sample_date: fixed_now() - Duration::days(days_ago),
            quality_limit: None,
            compliance_flag: None,
        }
    }

    fn score(observations: &[RawObservation]) -> FinalResult {
        let catalog = ReferenceCatalog::builtin().unwrap();
        score_supply(
            &catalog,
            observations,
            fixed_now(),
            None,
            &ScoringOptions::default(),
        )
    }

    /// Every catalog parameter at its ideal value, sampled recently.
    fn ideal_supply(catalog: &ReferenceCatalog) -> Vec<RawObservation> {
        catalog
            .categories()
            .iter()
            .flat_map(|c| c.all_codes())
            .filter_map(|(code, _)| catalog.parameter(code))
            .map(|p| obs(&p.code, p.scoring.ideal(), 15))
            .collect()
    }

    #[test]
    fn test_total_absence() {
        let result = score(&[]);
        assert_eq!(result.score, 0);
        assert_eq!(result.reliability, 0);
        assert_eq!(result.tier, QualityTier::MissingData);
        assert!(result.is_missing_data());
        assert_eq!(result.alerts, NO_DATA_ALERTS.to_vec());
        assert_eq!(result.recommendations, NO_DATA_RECOMMENDATIONS.to_vec());
        assert!(result.categories.is_empty());
    }

    #[test]
    fn test_unknown_codes_only_is_total_absence() {
        let result = score(&[obs("9999", 1.0, 3)]);
        assert_eq!(result.tier, QualityTier::MissingData);
    }

    #[test]
    fn test_unparsable_observations_are_not_absence() {
        let unusable = RawObservation {
            text_value: Some("see report".to_string()),
            numeric_value: None,
            ..obs("1340", 0.0, 3)
        };
        let result = score(&[unusable]);
        assert_eq!(result.tier, QualityTier::Improvable);
        assert_eq!(result.score, 50);
        assert_eq!(result.reliability, 0);
        assert_eq!(result.metadata.tested_parameters, 0);
        assert_eq!(result.metadata.temporal_bonus, 0.0);
    }

    #[test]
    fn test_single_parameter_supply() {
        let result = score(&[obs("1340", 0.0, 10)]);
        // nitrates: (100*3 + 50*3 + 50*3) / 9, others at 50, plus full bonus
        assert_eq!(result.score, 57);
        assert_eq!(result.reliability, 3);
        assert_eq!(result.tier, QualityTier::Correct);
        assert_eq!(result.metadata.temporal_bonus, 5.0);
        assert_eq!(
            result.recommendations,
            vec![FILTRATION.to_string(), COMPLEMENTARY.to_string(), LOCAL_AUTHORITY.to_string()]
        );
        assert_eq!(result.alerts.len(), 10);
        assert!(result.alerts.contains(&"Nitrates: 67/100 (1/3 parameters tested)".to_string()));
    }

    #[test]
    fn test_temporal_bonus_disabled() {
        let catalog = ReferenceCatalog::builtin().unwrap();
        let options = ScoringOptions {
            temporal_bonus: 0.0,
            ..ScoringOptions::default()
        };
        let result = score_supply(&catalog, &[obs("1340", 0.0, 10)], fixed_now(), None, &options);
        assert_eq!(result.score, 52);
    }

    #[test]
    fn test_stale_data_gets_no_bonus() {
        let result = score(&[obs("1340", 0.0, 700)]);
        assert_eq!(result.metadata.temporal_bonus, 0.0);
        assert_eq!(result.score, 52);
    }

    #[test]
    fn test_ideal_supply_keeps_merged_codes_untested() {
        let catalog = ReferenceCatalog::builtin().unwrap();
        let result = score_supply(
            &catalog,
            &ideal_supply(&catalog),
            fixed_now(),
            None,
            &ScoringOptions::default(),
        );
        // the 7 merged codes stay in their categories at 50, untested
        assert_eq!(result.substitutions.len(), 7);
        assert!(result.alerts[0].starts_with("Deduplication: 7 equivalent"));
        assert_eq!(result.metadata.total_parameters, 47);
        assert_eq!(result.metadata.tested_parameters, 40);
        assert_eq!(result.metadata.temporal_bonus, 5.0);
        assert_eq!(result.score, 97);
        assert_eq!(result.reliability, 88);
        assert_eq!(result.tier, QualityTier::Excellent);
        assert_eq!(result.recommendations, vec![REASSURANCE.to_string()]);
        assert_eq!(result.metadata.reliability_level, ReliabilityLevel::Reliable);
        assert!(result.metadata.untested_categories.is_empty());

        let chlorine = result.categories.iter().find(|c| c.key == "chlorine").unwrap();
        assert_eq!((chlorine.tested_count, chlorine.total_count), (2, 4));
        assert!((chlorine.score - 75.0).abs() < 1e-9);
        assert!((chlorine.reliability - 50.0).abs() < 1e-9);

        let heavy = result.categories.iter().find(|c| c.key == "heavy_metals").unwrap();
        assert_eq!(heavy.reliability, 100.0);
        assert_eq!(heavy.score, 100.0);
    }

    #[test]
    fn test_merged_equivalent_code_counts_in_category() {
        let result = score(&[obs("1506", 0.0, 10), obs("1449", 0.0, 10)]);
        let micro = result
            .categories
            .iter()
            .find(|c| c.key == "microbiological")
            .unwrap();
        assert_eq!(micro.total_count, 7);
        assert_eq!(micro.tested_count, 1);
        assert!(micro.parameters.iter().any(|p| p.code == "1449" && !p.tested));
        // (100*3 + 50*3*3 + 50*2*2 + 50) / 17
        assert!((micro.score - 1000.0 / 17.0).abs() < 1e-9);
        assert_eq!(result.metadata.total_parameters, 47);
    }

    #[test]
    fn test_critical_breach_alert_and_recommendation() {
        let result = score(&[obs("1506", 3.0, 5)]);
        assert!(result
            .alerts
            .contains(&"CRITICAL: E. coli - Critical exceedance - unfit".to_string()));
        assert!(result.recommendations.contains(&CONSULT.to_string()));
        assert_eq!(result.alerts.last().map(String::as_str), Some("CRITICAL: E. coli - Critical exceedance - unfit"));
    }

    #[test]
    fn test_nearby_provenance_alert() {
        let catalog = ReferenceCatalog::builtin().unwrap();
        let source = Provenance {
            id: "075000456".to_string(),
            name: Some("Ivry".to_string()),
            distance_km: Some(3.24),
        };
        let result = score_supply(
            &catalog,
            &[obs("1340", 5.0, 10)],
            fixed_now(),
            Some(&source),
            &ScoringOptions::default(),
        );
        assert_eq!(result.alerts[0], "Data from Ivry, 3.2 km away (nearest supply with analyses)");
        assert_eq!(result.source_label(), "Ivry");
    }

    #[test]
    fn test_scoring_is_deterministic() {
        let observations = [
            obs("1340", 12.0, 10),
            obs("1340", 30.0, 200),
            obs("1302", 7.6, 40),
            obs("1506", 0.0, 20),
            obs("1449", 0.0, 25),
            obs("1382", 2.0, 100),
        ];
        assert_eq!(score(&observations), score(&observations));
    }

    #[test]
    fn test_recommendations_deduplicated() {
        let recs = build_recommendations(40, 40, true);
        assert_eq!(recs.len(), 4);
        let unique: std::collections::HashSet<_> = recs.iter().collect();
        assert_eq!(unique.len(), recs.len());
    }
}
