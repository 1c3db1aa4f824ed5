use super::formulas::{evaluate, UNTESTED};
use super::temporal::{ResolvedValue, StrategyKind};
use crate::catalog::{CategoryDefinition, Criticality, ParameterDefinition, ReferenceCatalog};
use crate::observations::HistorySummary;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};

/// Score given to anything without evidence.
pub const BENEFIT_OF_DOUBT: f64 = 50.0;
/// Reliability points added when every critical parameter is tested.
pub const CRITICAL_COVERAGE_BONUS: f64 = 10.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterScore {
    pub code: String,
    pub name: String,
    pub score: f64,
    pub tested: bool,
    pub interpretation: String,
    pub criticality: Criticality,
    /// Tier weight inside the category.
    pub weight: f64,
    pub value: Option<f64>,
    pub unit: String,
    pub method: Option<StrategyKind>,
    pub summary: Option<HistorySummary>,
    pub impact: String,
    pub norm: String,
}

impl ParameterScore {
    pub fn score(def: &ParameterDefinition, resolved: Option<&ResolvedValue>) -> Self {
        let (score, tested, interpretation) = match resolved {
            Some(r) => {
                let eval = evaluate(&def.scoring, r.value);
                (eval.score, true, eval.interpretation)
            }
            None => (BENEFIT_OF_DOUBT, false, UNTESTED),
        };
        Self {
            code: def.code.clone(),
            name: def.name.clone(),
            score,
            tested,
            interpretation: interpretation.to_string(),
            criticality: def.criticality,
            weight: def.criticality.weight(),
            value: resolved.map(|r| r.value),
            unit: def.unit.clone(),
            method: resolved.map(|r| r.method),
            summary: resolved.map(|r| r.summary.clone()),
            impact: def.impact.clone(),
            norm: def.norm.clone(),
        }
    }

    pub fn is_critical_breach(&self) -> bool {
        self.tested && self.criticality == Criticality::Critical && self.score == 0.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryScore {
    pub key: String,
    pub name: String,
    pub weight: f64,
    pub score: f64,
    pub reliability: f64,
    pub tested_count: usize,
    pub total_count: usize,
    pub parameters: Vec<ParameterScore>,
    pub critical_breaches: Vec<String>,
}

/// Combine parameter scores into a category score.
///
/// Tier weights are 3/2/1. Reliability is 100 when every parameter is tested,
/// otherwise the tested share plus a bonus when all critical ones are tested.
pub fn aggregate(category: &CategoryDefinition, parameters: Vec<ParameterScore>) -> CategoryScore {
    let total_count = parameters.len();
    let tested_count = parameters.iter().filter(|p| p.tested).count();

    let (weighted, weights) = parameters
        .iter()
        .fold((0.0, 0.0), |(sum, w), p| (sum + p.score * p.weight, w + p.weight));
    let score = if weights > 0.0 {
        weighted / weights
    } else {
        BENEFIT_OF_DOUBT
    };

    let reliability = if total_count == 0 {
        0.0
    } else if tested_count == total_count {
        100.0
    } else {
        let mut critical = parameters
            .iter()
            .filter(|p| p.criticality == Criticality::Critical)
            .peekable();
        let bonus = if critical.peek().is_some() && critical.all(|p| p.tested) {
            CRITICAL_COVERAGE_BONUS
        } else {
            0.0
        };
        (tested_count as f64 / total_count as f64 * 100.0 + bonus).min(100.0)
    };

    let critical_breaches = parameters
        .iter()
        .filter(|p| p.is_critical_breach())
        .map(|p| format!("CRITICAL: {} - {}", p.name, p.interpretation))
        .collect();

    CategoryScore {
        key: category.key.clone(),
        name: category.name.clone(),
        weight: category.weight,
        score,
        reliability,
        tested_count,
        total_count,
        parameters,
        critical_breaches,
    }
}

/// Score every parameter of a category.
///
/// Codes merged away by deduplication stay in the list as untested entries,
/// so they weigh in at the benefit of the doubt and count toward the total.
pub fn score_category(
    category: &CategoryDefinition,
    catalog: &ReferenceCatalog,
    resolved: &HashMap<String, ResolvedValue>,
    dropped: &BTreeSet<&str>,
) -> CategoryScore {
    if category.parameter_count() == 0 {
        log::warn!("Category '{}' has no parameters", category.key);
    }

    let parameters = category
        .all_codes()
        .filter_map(|(code, _)| catalog.parameter(code))
        .map(|def| {
            let value = if dropped.contains(def.code.as_str()) {
                None
            } else {
                resolved.get(&def.code)
            };
            ParameterScore::score(def, value)
        })
        .collect();

    let result = aggregate(category, parameters);
    log::debug!(
        "{}: {:.1}/100, reliability {:.0}% ({}/{} tested)",
        result.key,
        result.score,
        result.reliability,
        result.tested_count,
        result.total_count
    );
    result
}
