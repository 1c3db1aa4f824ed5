use super::types::{CatalogSpec, ScoringKind};
use std::collections::{HashMap, HashSet};

/// Category weights must sum to 1.0 within this tolerance.
pub const WEIGHT_EPSILON: f64 = 0.001;

/// Validate catalog tables at load time.
/// Returns all validation errors at once (not just the first).
pub fn validate_catalog(spec: &CatalogSpec) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    // Category weights
    let total: f64 = spec.categories.iter().map(|c| c.weight).sum();
    if (total - 1.0).abs() > WEIGHT_EPSILON {
        errors.push(format!(
            "categories: weights sum to {:.4}, expected 1.0 (±{})",
            total, WEIGHT_EPSILON
        ));
    }

    let mut category_keys = HashSet::new();
    for (i, cat) in spec.categories.iter().enumerate() {
        if !(0.0..=1.0).contains(&cat.weight) {
            errors.push(format!(
                "categories[{}].weight: {} is outside [0, 1]",
                i, cat.weight
            ));
        }
        if !category_keys.insert(cat.key.as_str()) {
            errors.push(format!("categories[{}].key: duplicate '{}'", i, cat.key));
        }
    }

    // Parameter definitions
    let mut defined: HashMap<&str, &str> = HashMap::new();
    for (i, param) in spec.parameters.iter().enumerate() {
        if defined
            .insert(param.code.as_str(), param.category.as_str())
            .is_some()
        {
            errors.push(format!(
                "parameters[{}].code: '{}' defined twice",
                i, param.code
            ));
        }
        if !category_keys.contains(param.category.as_str()) {
            errors.push(format!(
                "parameters[{}].category: unknown category '{}' for '{}'",
                i, param.category, param.code
            ));
        }
        match param.scoring {
            ScoringKind::ThresholdMax { ideal, max, alpha } => {
                if max < ideal {
                    errors.push(format!(
                        "parameters[{}].scoring: max {} below ideal {} for '{}'",
                        i, max, ideal, param.code
                    ));
                }
                if alpha <= 0.0 {
                    errors.push(format!(
                        "parameters[{}].scoring.alpha: must be positive for '{}'",
                        i, param.code
                    ));
                }
            }
            ScoringKind::OptimalCentral {
                beta,
                gamma,
                min_acceptable,
                max_acceptable,
                ..
            } => {
                if beta < 0.0 {
                    errors.push(format!(
                        "parameters[{}].scoring.beta: must be non-negative for '{}'",
                        i, param.code
                    ));
                }
                if gamma <= 0.0 {
                    errors.push(format!(
                        "parameters[{}].scoring.gamma: must be positive for '{}'",
                        i, param.code
                    ));
                }
                if let (Some(lo), Some(hi)) = (min_acceptable, max_acceptable) {
                    if lo > hi {
                        errors.push(format!(
                            "parameters[{}].scoring: min_acceptable {} above max_acceptable {} for '{}'",
                            i, lo, hi, param.code
                        ));
                    }
                }
            }
        }
    }

    // Category tier lists
    let mut listed: HashSet<&str> = HashSet::new();
    for cat in &spec.categories {
        for (code, tier) in cat.all_codes() {
            if !listed.insert(code) {
                errors.push(format!(
                    "categories.{}.{}: '{}' listed more than once",
                    cat.key, tier, code
                ));
            }
            match defined.get(code) {
                None => errors.push(format!(
                    "categories.{}.{}: '{}' has no parameter definition",
                    cat.key, tier, code
                )),
                Some(owner) if *owner != cat.key => errors.push(format!(
                    "categories.{}.{}: '{}' is defined in category '{}'",
                    cat.key, tier, code, owner
                )),
                Some(_) => {}
            }
        }
    }
    for param in &spec.parameters {
        if !listed.contains(param.code.as_str()) {
            errors.push(format!(
                "parameters: '{}' is not listed in any category tier",
                param.code
            ));
        }
    }

    // Equivalence groups
    let mut grouped: HashMap<&str, &str> = HashMap::new();
    for (i, group) in spec.equivalence_groups.iter().enumerate() {
        for code in &group.codes {
            if let Some(other) = grouped.insert(code.as_str(), group.logical_name.as_str()) {
                errors.push(format!(
                    "equivalence_groups[{}]: '{}' already belongs to group '{}'",
                    i, code, other
                ));
            }
            if !defined.contains_key(code.as_str()) {
                errors.push(format!(
                    "equivalence_groups[{}]: '{}' has no parameter definition",
                    i, code
                ));
            }
        }
        let codes: HashSet<&str> = group.codes.iter().map(String::as_str).collect();
        let order: HashSet<&str> = group.priority_order.iter().map(String::as_str).collect();
        if codes != order || order.len() != group.priority_order.len() {
            errors.push(format!(
                "equivalence_groups[{}].priority_order: must list each of {:?} exactly once",
                i, group.codes
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::builtin::builtin_spec;
    use crate::catalog::types::EquivalenceGroup;

    #[test]
    fn test_builtin_is_valid() {
        assert!(validate_catalog(&builtin_spec()).is_ok());
    }

    #[test]
    fn test_weights_not_summing_to_one() {
        let mut spec = builtin_spec();
        spec.categories[2].weight = 0.14; // older PFAS weight
        let errors = validate_catalog(&spec).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("weights sum to 1.0100"));
    }

    #[test]
    fn test_weight_within_epsilon_accepted() {
        let mut spec = builtin_spec();
        spec.categories[0].weight += 0.0005;
        assert!(validate_catalog(&spec).is_ok());
    }

    #[test]
    fn test_missing_definition() {
        let mut spec = builtin_spec();
        spec.categories[0].minor.push("9999".to_string());
        let errors = validate_catalog(&spec).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.contains("'9999' has no parameter definition")));
    }

    #[test]
    fn test_code_in_two_groups() {
        let mut spec = builtin_spec();
        spec.equivalence_groups.push(EquivalenceGroup {
            logical_name: "Coliforms".to_string(),
            codes: vec!["1506".to_string(), "1447".to_string()],
            priority_order: vec!["1506".to_string(), "1447".to_string()],
        });
        let errors = validate_catalog(&spec).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.contains("'1506' already belongs to group 'E. coli'")));
    }

    #[test]
    fn test_priority_order_must_match_codes() {
        let mut spec = builtin_spec();
        spec.equivalence_groups[0].priority_order = vec!["1506".to_string()];
        let errors = validate_catalog(&spec).unwrap_err();
        assert!(errors[0].contains("priority_order"));
    }

    #[test]
    fn test_collects_all_errors() {
        let mut spec = builtin_spec();
        spec.categories[0].weight = 0.5; // Error 1 (sum)
        spec.categories[1].minor.push("XXX".to_string()); // Error 2
        let errors = validate_catalog(&spec).unwrap_err();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_empty_category_is_not_an_error() {
        let mut spec = builtin_spec();
        let emptied = spec.categories.iter().position(|c| c.key == "microplastics").unwrap();
        spec.categories[emptied].moderate.clear();
        spec.parameters.retain(|p| p.code != "MICROPL");
        assert!(validate_catalog(&spec).is_ok());
    }
}
