pub mod builtin;
pub mod types;
pub mod validation;

pub use builtin::{builtin_spec, BUILTIN_VERSION};
pub use types::{
    CatalogSpec, CategoryDefinition, Criticality, EquivalenceGroup, ParameterClass,
    ParameterDefinition, ParameterSpec, ScoringKind, TieredCodes,
};
pub use validation::validate_catalog;

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Read-only reference data: parameters, categories and equivalence groups.
///
/// Built once at startup and passed by reference into every scoring run.
/// Construction validates the tables; an invalid catalog never exists.
#[derive(Debug, Clone)]
pub struct ReferenceCatalog {
    version: Option<String>,
    categories: Vec<CategoryDefinition>,
    parameters: HashMap<String, ParameterDefinition>,
    groups: Vec<EquivalenceGroup>,
    group_index: HashMap<String, usize>,
}

impl ReferenceCatalog {
    /// Validate and resolve catalog tables.
    ///
    /// Criticality and temporal class of each parameter are taken from the
    /// category listing it.
    ///
    /// # Errors
    ///
    /// Returns every validation problem in one error if the tables are
    /// inconsistent.
    pub fn new(spec: CatalogSpec) -> Result<Self> {
        if let Err(errors) = validate_catalog(&spec) {
            anyhow::bail!("Invalid catalog:\n  - {}", errors.join("\n  - "));
        }

        for cat in &spec.categories {
            if cat.parameter_count() == 0 {
                log::warn!(
                    "Category '{}' has no parameters; it will score 50 by default",
                    cat.key
                );
            }
        }

        let mut tiers = HashMap::new();
        for cat in &spec.categories {
            for (code, tier) in cat.all_codes() {
                tiers.insert(code.to_string(), (tier, cat.class));
            }
        }

        let mut parameters = HashMap::with_capacity(spec.parameters.len());
        for p in spec.parameters {
            let (criticality, class) = tiers
                .get(&p.code)
                .copied()
                .with_context(|| format!("Parameter '{}' is not listed by any category", p.code))?;
            parameters.insert(
                p.code.clone(),
                ParameterDefinition {
                    code: p.code,
                    name: p.name,
                    category: p.category,
                    unit: p.unit,
                    scoring: p.scoring,
                    criticality,
                    class,
                    impact: p.impact,
                    norm: p.norm,
                },
            );
        }

        let group_index = spec
            .equivalence_groups
            .iter()
            .enumerate()
            .flat_map(|(i, g)| g.codes.iter().map(move |c| (c.clone(), i)))
            .collect();

        Ok(Self {
            version: spec.version,
            categories: spec.categories,
            parameters,
            groups: spec.equivalence_groups,
            group_index,
        })
    }

    /// The built-in reference tables.
    pub fn builtin() -> Result<Self> {
        Self::new(builtin_spec())
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn parameter(&self, code: &str) -> Option<&ParameterDefinition> {
        self.parameters.get(code)
    }

    pub fn category(&self, key: &str) -> Option<&CategoryDefinition> {
        self.categories.iter().find(|c| c.key == key)
    }

    /// Codes of a category partitioned by criticality.
    pub fn codes_by_tier(&self, key: &str) -> Option<TieredCodes<'_>> {
        self.category(key).map(|c| TieredCodes {
            critical: &c.critical,
            moderate: &c.moderate,
            minor: &c.minor,
        })
    }

    /// Categories in catalog order.
    pub fn categories(&self) -> &[CategoryDefinition] {
        &self.categories
    }

    pub fn parameter_count(&self) -> usize {
        self.parameters.len()
    }

    pub fn equivalence_groups(&self) -> &[EquivalenceGroup] {
        &self.groups
    }

    /// The equivalence group a code belongs to, if any.
    pub fn group_for(&self, code: &str) -> Option<&EquivalenceGroup> {
        self.group_index.get(code).and_then(|&i| self.groups.get(i))
    }

    /// Temporal class of a code; unknown codes are unclassified.
    pub fn class_of(&self, code: &str) -> ParameterClass {
        self.parameter(code)
            .map(|p| p.class)
            .unwrap_or(ParameterClass::Unclassified)
    }
}

/// Load a catalog from a YAML file.
///
/// # Errors
///
/// Returns an error if the file cannot be read, is not valid YAML, or fails
/// catalog validation.
pub fn load_catalog(path: &Path) -> Result<ReferenceCatalog> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read catalog file at {}", path.display()))?;

    let spec: CatalogSpec = serde_saphyr::from_str(&content)
        .with_context(|| format!("Failed to parse catalog: invalid YAML in {}", path.display()))?;

    let catalog = ReferenceCatalog::new(spec)
        .with_context(|| format!("Catalog at {} rejected", path.display()))?;
    log::debug!(
        "Loaded catalog {} ({} parameters) from {}",
        catalog.version().unwrap_or("(unversioned)"),
        catalog.parameter_count(),
        path.display()
    );
    Ok(catalog)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn test_builtin_loads() {
        let catalog = ReferenceCatalog::builtin().unwrap();
        assert_eq!(catalog.categories().len(), 10);
        assert_eq!(catalog.parameter_count(), 47);
        assert_eq!(catalog.version(), Some(BUILTIN_VERSION));
    }

    #[test]
    fn test_weights_sum_to_one() {
        let catalog = ReferenceCatalog::builtin().unwrap();
        let total: f64 = catalog.categories().iter().map(|c| c.weight).sum();
        assert!((total - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_parameter_lookup_resolves_tier_and_class() {
        let catalog = ReferenceCatalog::builtin().unwrap();
        let ph = catalog.parameter("1302").unwrap();
        assert_eq!(ph.category, "organoleptic");
        assert_eq!(ph.criticality, Criticality::Critical);
        assert_eq!(ph.class, ParameterClass::StablePhysicoChemical);

        let chlorine = catalog.parameter("1398").unwrap();
        assert_eq!(chlorine.criticality, Criticality::Moderate);
        assert_eq!(chlorine.class, ParameterClass::DisinfectantResidual);

        assert!(catalog.parameter("0000").is_none());
        assert_eq!(catalog.class_of("0000"), ParameterClass::Unclassified);
    }

    #[test]
    fn test_codes_by_tier() {
        let catalog = ReferenceCatalog::builtin().unwrap();
        let tiers = catalog.codes_by_tier("heavy_metals").unwrap();
        assert_eq!(tiers.critical, ["1369", "1382", "1388", "1392"]);
        assert_eq!(tiers.moderate, ["1375", "1394"]);
        assert_eq!(tiers.minor, ["1393"]);
        assert!(catalog.codes_by_tier("radioactivity").is_none());
    }

    #[test]
    fn test_group_for() {
        let catalog = ReferenceCatalog::builtin().unwrap();
        assert_eq!(catalog.group_for("1449").unwrap().logical_name, "E. coli");
        assert!(catalog.group_for("1340").is_none());
    }

    #[test]
    fn test_invalid_catalog_refused() {
        let mut spec = builtin_spec();
        spec.categories[0].weight = 0.9;
        let err = ReferenceCatalog::new(spec).unwrap_err();
        assert!(err.to_string().contains("weights sum to"));
    }

    #[test]
    fn test_load_catalog_from_yaml() {
        let yaml = r#"
version: "test-1"
categories:
  - key: microbiological
    name: Microbiology
    weight: 0.6
    class: microbiological
    critical: ["1506"]
  - key: nitrates
    name: Nitrates
    weight: 0.4
    class: seasonal_contaminant
    critical: ["1340"]
parameters:
  - code: "1506"
    name: E. coli
    category: microbiological
    unit: n/100mL
    scoring: { kind: threshold_max, ideal: 0, max: 0, alpha: 1 }
  - code: "1340"
    name: Nitrates
    category: nitrates
    unit: mg/L
    scoring: { kind: threshold_max, ideal: 0, max: 50, alpha: 1.2 }
"#;
        let path = env::temp_dir().join("water_score_test_catalog.yaml");
        std::fs::write(&path, yaml).unwrap();

        let catalog = load_catalog(&path).unwrap();
        assert_eq!(catalog.version(), Some("test-1"));
        assert_eq!(catalog.parameter_count(), 2);
        assert_eq!(
            catalog.parameter("1340").unwrap().class,
            ParameterClass::SeasonalContaminant
        );
        assert!(catalog.equivalence_groups().is_empty());

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_load_catalog_missing_file() {
        let path = env::temp_dir().join("water_score_no_such_catalog.yaml");
        let _ = std::fs::remove_file(&path);
        let err = load_catalog(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to read catalog file"));
    }
}
