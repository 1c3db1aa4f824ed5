use serde::{Deserialize, Serialize};
use std::fmt;

/// Criticality tier of a parameter inside its category.
///
/// Controls the parameter's weight in the category aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Criticality {
    Critical,
    Moderate,
    Minor,
}

impl Criticality {
    /// Weight used by the category aggregator (3 / 2 / 1).
    pub fn weight(self) -> f64 {
        match self {
            Criticality::Critical => 3.0,
            Criticality::Moderate => 2.0,
            Criticality::Minor => 1.0,
        }
    }
}

impl fmt::Display for Criticality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Criticality::Critical => write!(f, "critical"),
            Criticality::Moderate => write!(f, "moderate"),
            Criticality::Minor => write!(f, "minor"),
        }
    }
}

/// Temporal behaviour class of a parameter.
///
/// Decides which strategy the temporal selector uses to pick a
/// representative value out of a measurement history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterClass {
    /// Pathogen indicators: one bad sample matters.
    Microbiological,
    /// Free / total chlorine: decays within hours, only fresh samples count.
    DisinfectantResidual,
    /// Slow-accumulating metals: trend matters more than one sample.
    HeavyMetal,
    /// Nitrates, pesticides, PFAS: seasonal peaks.
    SeasonalContaminant,
    /// pH, conductivity, hardness, major ions.
    StablePhysicoChemical,
    #[default]
    Unclassified,
}

/// Closed-form scoring formula with its coefficients.
///
/// YAML form:
/// ```yaml
/// scoring: { kind: threshold_max, ideal: 0, max: 10, alpha: 1.5 }
/// scoring: { kind: optimal_central, ideal: 7.2, beta: 25, gamma: 1.6, min_acceptable: 6.5, max_acceptable: 9.0 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScoringKind {
    /// Lower is better, with a legal or health limit at `max`.
    ThresholdMax { ideal: f64, max: f64, alpha: f64 },
    /// Best at `ideal`, degrading both ways.
    OptimalCentral {
        ideal: f64,
        beta: f64,
        gamma: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min_acceptable: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max_acceptable: Option<f64>,
    },
}

impl ScoringKind {
    pub fn ideal(&self) -> f64 {
        match self {
            ScoringKind::ThresholdMax { ideal, .. } | ScoringKind::OptimalCentral { ideal, .. } => {
                *ideal
            }
        }
    }
}

/// A parameter row as written in a catalog file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParameterSpec {
    pub code: String,
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub unit: String,
    pub scoring: ScoringKind,
    #[serde(default)]
    pub impact: String,
    #[serde(default)]
    pub norm: String,
}

/// Immutable, resolved parameter definition owned by the catalog.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterDefinition {
    pub code: String,
    pub name: String,
    pub category: String,
    pub unit: String,
    pub scoring: ScoringKind,
    pub criticality: Criticality,
    pub class: ParameterClass,
    pub impact: String,
    pub norm: String,
}

/// Scoring category with its weight and tiered parameter lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CategoryDefinition {
    pub key: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub weight: f64,
    #[serde(default)]
    pub class: ParameterClass,
    #[serde(default)]
    pub critical: Vec<String>,
    #[serde(default)]
    pub moderate: Vec<String>,
    #[serde(default)]
    pub minor: Vec<String>,
}

impl CategoryDefinition {
    /// All codes in tier order: critical, moderate, minor.
    pub fn all_codes(&self) -> impl Iterator<Item = (&str, Criticality)> {
        self.critical
            .iter()
            .map(|c| (c.as_str(), Criticality::Critical))
            .chain(self.moderate.iter().map(|c| (c.as_str(), Criticality::Moderate)))
            .chain(self.minor.iter().map(|c| (c.as_str(), Criticality::Minor)))
    }

    pub fn parameter_count(&self) -> usize {
        self.critical.len() + self.moderate.len() + self.minor.len()
    }
}

/// Codes of a category partitioned by criticality.
#[derive(Debug, Clone, PartialEq)]
pub struct TieredCodes<'a> {
    pub critical: &'a [String],
    pub moderate: &'a [String],
    pub minor: &'a [String],
}

/// Codes measuring the same physical quantity by different methods.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EquivalenceGroup {
    pub logical_name: String,
    pub codes: Vec<String>,
    /// Preferred code first.
    pub priority_order: Vec<String>,
}

impl EquivalenceGroup {
    /// Position from the end of the priority order (first code scores highest).
    pub fn priority_rank(&self, code: &str) -> usize {
        self.priority_order
            .iter()
            .position(|c| c == code)
            .map(|idx| self.priority_order.len() - idx)
            .unwrap_or(0)
    }
}

/// Raw catalog tables, as loaded from YAML or built in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogSpec {
    #[serde(default)]
    pub version: Option<String>,
    pub categories: Vec<CategoryDefinition>,
    pub parameters: Vec<ParameterSpec>,
    #[serde(default)]
    pub equivalence_groups: Vec<EquivalenceGroup>,
}
