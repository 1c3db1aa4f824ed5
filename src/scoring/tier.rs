use serde::Serialize;
use std::fmt;

/// Qualitative reading of the final score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QualityTier {
    MissingData,
    Critical,
    Bad,
    Concerning,
    Improvable,
    Correct,
    Good,
    VeryGood,
    Excellent,
}

impl QualityTier {
    /// Step function over a 0-100 score. Never yields `MissingData`.
    pub fn from_score(score: f64) -> Self {
        match score {
            s if s >= 85.0 => QualityTier::Excellent,
            s if s >= 75.0 => QualityTier::VeryGood,
            s if s >= 65.0 => QualityTier::Good,
            s if s >= 55.0 => QualityTier::Correct,
            s if s >= 45.0 => QualityTier::Improvable,
            s if s >= 35.0 => QualityTier::Concerning,
            s if s >= 20.0 => QualityTier::Bad,
            _ => QualityTier::Critical,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            QualityTier::MissingData => "MISSING_DATA",
            QualityTier::Critical => "CRITICAL",
            QualityTier::Bad => "BAD",
            QualityTier::Concerning => "CONCERNING",
            QualityTier::Improvable => "IMPROVABLE",
            QualityTier::Correct => "CORRECT",
            QualityTier::Good => "GOOD",
            QualityTier::VeryGood => "VERY_GOOD",
            QualityTier::Excellent => "EXCELLENT",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            QualityTier::MissingData => "No analysis available",
            QualityTier::Critical => "Unfit for consumption",
            QualityTier::Bad => "Health risks",
            QualityTier::Concerning => "Treatment is a priority",
            QualityTier::Improvable => "Treatment recommended",
            QualityTier::Correct => "Correct water, improvements possible",
            QualityTier::Good => "Satisfactory quality",
            QualityTier::VeryGood => "Very good quality",
            QualityTier::Excellent => "Exceptional quality",
        }
    }
}

impl fmt::Display for QualityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// How much of the score rests on actual measurements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReliabilityLevel {
    Reliable,
    Partial,
    Insufficient,
}

impl ReliabilityLevel {
    pub fn from_reliability(reliability: f64) -> Self {
        if reliability >= 80.0 {
            ReliabilityLevel::Reliable
        } else if reliability >= 60.0 {
            ReliabilityLevel::Partial
        } else {
            ReliabilityLevel::Insufficient
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            ReliabilityLevel::Reliable => "Analysis based on comprehensive data",
            ReliabilityLevel::Partial => "Analysis based on partial data",
            ReliabilityLevel::Insufficient => "Too few parameters tested for a firm conclusion",
        }
    }
}

impl fmt::Display for ReliabilityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ReliabilityLevel::Reliable => "RELIABLE",
            ReliabilityLevel::Partial => "PARTIAL",
            ReliabilityLevel::Insufficient => "INSUFFICIENT",
        };
        f.write_str(s)
    }
}
