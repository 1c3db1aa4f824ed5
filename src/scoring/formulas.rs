use crate::catalog::ScoringKind;

/// Score of a single resolved value, with a short reading of it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
    pub score: f64,
    pub interpretation: &'static str,
}

impl Evaluation {
    fn new(score: f64, interpretation: &'static str) -> Self {
        Self {
            score,
            interpretation,
        }
    }
}

/// Interpretation of a parameter with no usable observation.
pub const UNTESTED: &str = "Not tested - benefit of the doubt";

/// Score a value against its scoring kind. Always in [0, 100].
pub fn evaluate(kind: &ScoringKind, value: f64) -> Evaluation {
    match *kind {
        ScoringKind::ThresholdMax { ideal, max, alpha } => threshold_max(value, ideal, max, alpha),
        ScoringKind::OptimalCentral {
            ideal,
            beta,
            gamma,
            min_acceptable,
            max_acceptable,
        } => optimal_central(value, ideal, beta, gamma, min_acceptable, max_acceptable),
    }
}

/// `100 - 100 * ((value - ideal) / (max - ideal))^alpha` between the bounds.
fn threshold_max(value: f64, ideal: f64, max: f64, alpha: f64) -> Evaluation {
    // Zero-tolerance parameters (E. coli and friends)
    if ideal == max {
        return if value <= ideal {
            let reading = if value == 0.0 {
                "Not detected - excellent"
            } else {
                "Compliant - excellent"
            };
            Evaluation::new(100.0, reading)
        } else {
            Evaluation::new(0.0, "Critical exceedance - unfit")
        };
    }

    if value <= ideal {
        return Evaluation::new(100.0, "Ideal value - excellent");
    }
    if value >= max {
        return Evaluation::new(0.0, "Threshold exceeded - critical");
    }

    let ratio = (value - ideal) / (max - ideal);
    let score = (100.0 - 100.0 * ratio.powf(alpha)).max(0.0);
    let reading = match score {
        s if s >= 80.0 => "Very good level",
        s if s >= 60.0 => "Acceptable level",
        s if s >= 40.0 => "Concerning level",
        _ => "Critical level",
    };
    Evaluation::new(score, reading)
}

/// `100 - beta * |value - ideal|^gamma` inside the acceptable range, 0 outside.
fn optimal_central(
    value: f64,
    ideal: f64,
    beta: f64,
    gamma: f64,
    min_acceptable: Option<f64>,
    max_acceptable: Option<f64>,
) -> Evaluation {
    if min_acceptable.is_some_and(|lo| value < lo) {
        return Evaluation::new(0.0, "Value too low - critical");
    }
    if max_acceptable.is_some_and(|hi| value > hi) {
        return Evaluation::new(0.0, "Value too high - critical");
    }

    let score = (100.0 - beta * (value - ideal).abs().powf(gamma)).clamp(0.0, 100.0);
    let reading = match score {
        s if s >= 90.0 => "Optimal value",
        s if s >= 75.0 => "Very good balance",
        s if s >= 60.0 => "Acceptable balance",
        s if s >= 40.0 => "Moderate imbalance",
        _ => "Strong imbalance",
    };
    Evaluation::new(score, reading)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nitrates() -> ScoringKind {
        ScoringKind::ThresholdMax {
            ideal: 0.0,
            max: 50.0,
            alpha: 1.2,
        }
    }

    fn ecoli() -> ScoringKind {
        ScoringKind::ThresholdMax {
            ideal: 0.0,
            max: 0.0,
            alpha: 1.0,
        }
    }

    fn ph() -> ScoringKind {
        ScoringKind::OptimalCentral {
            ideal: 7.2,
            beta: 25.0,
            gamma: 1.6,
            min_acceptable: Some(6.5),
            max_acceptable: Some(9.0),
        }
    }

    #[test]
    fn test_threshold_end_points() {
        assert_eq!(evaluate(&nitrates(), 0.0).score, 100.0);
        assert_eq!(evaluate(&nitrates(), 50.0).score, 0.0);
        assert_eq!(evaluate(&nitrates(), 80.0).score, 0.0);
        assert_eq!(
            evaluate(&nitrates(), 50.0).interpretation,
            "Threshold exceeded - critical"
        );
    }

    #[test]
    fn test_threshold_intermediate() {
        let e = evaluate(&nitrates(), 25.0);
        let expected = 100.0 - 100.0 * 0.5_f64.powf(1.2);
        assert!((e.score - expected).abs() < 1e-9);
        assert_eq!(e.interpretation, "Concerning level");

        assert_eq!(evaluate(&nitrates(), 5.0).interpretation, "Very good level");
    }

    #[test]
    fn test_threshold_zero_tolerance() {
        let clean = evaluate(&ecoli(), 0.0);
        assert_eq!(clean.score, 100.0);
        assert_eq!(clean.interpretation, "Not detected - excellent");

        let dirty = evaluate(&ecoli(), 1.0);
        assert_eq!(dirty.score, 0.0);
        assert_eq!(dirty.interpretation, "Critical exceedance - unfit");
    }

    #[test]
    fn test_threshold_is_non_increasing() {
        let mut last = f64::INFINITY;
        for i in 0..=120 {
            let score = evaluate(&nitrates(), i as f64 * 0.5).score;
            assert!(score <= last);
            assert!((0.0..=100.0).contains(&score));
            last = score;
        }
    }

    #[test]
    fn test_optimal_central_peak_and_bounds() {
        assert_eq!(evaluate(&ph(), 7.2).score, 100.0);
        assert_eq!(evaluate(&ph(), 7.2).interpretation, "Optimal value");
        assert_eq!(evaluate(&ph(), 6.4).score, 0.0);
        assert_eq!(evaluate(&ph(), 6.4).interpretation, "Value too low - critical");
        assert_eq!(evaluate(&ph(), 9.5).interpretation, "Value too high - critical");
    }

    #[test]
    fn test_optimal_central_monotonic_away_from_ideal() {
        let mut last = 100.0;
        for i in 0..=18 {
            let score = evaluate(&ph(), 7.2 + i as f64 * 0.1).score;
            assert!(score <= last);
            last = score;
        }
        let mut last = 100.0;
        for i in 0..=7 {
            let score = evaluate(&ph(), 7.2 - i as f64 * 0.1).score;
            assert!(score <= last);
            last = score;
        }
    }

    #[test]
    fn test_optimal_central_clamped_at_zero() {
        let steep = ScoringKind::OptimalCentral {
            ideal: 0.0,
            beta: 1000.0,
            gamma: 1.0,
            min_acceptable: None,
            max_acceptable: None,
        };
        let e = evaluate(&steep, 5.0);
        assert_eq!(e.score, 0.0);
        assert_eq!(e.interpretation, "Strong imbalance");
    }
}
