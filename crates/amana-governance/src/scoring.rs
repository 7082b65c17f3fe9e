//! Risk classification.
//!
//! Pure and deterministic: the same (impact, likelihood) pair always
//! yields the same score and level.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Risk severity level, ordered from least to most severe.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    /// Score 1-3.
    VeryLow,
    /// Score 4-6.
    Low,
    /// Score 7-12.
    Medium,
    /// Score 13-20.
    High,
    /// Score 21-25.
    Critical,
}

impl RiskLevel {
    /// Classify a 1-25 score into a level.
    #[must_use]
    pub fn from_score(score: u8) -> Self {
        if score <= 3 {
            RiskLevel::VeryLow
        } else if score <= 6 {
            RiskLevel::Low
        } else if score <= 12 {
            RiskLevel::Medium
        } else if score <= 20 {
            RiskLevel::High
        } else {
            RiskLevel::Critical
        }
    }

    /// The canonical wire representation of this level.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::VeryLow => "VERY_LOW",
            RiskLevel::Low => "LOW",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::High => "HIGH",
            RiskLevel::Critical => "CRITICAL",
        }
    }

    /// All levels, least severe first.
    pub const ALL: [RiskLevel; 5] = [
        RiskLevel::VeryLow,
        RiskLevel::Low,
        RiskLevel::Medium,
        RiskLevel::High,
        RiskLevel::Critical,
    ];
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A derived score and its classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskRating {
    /// impact × likelihood, 1-25.
    pub score: u8,
    /// Deterministic classification of the score.
    pub level: RiskLevel,
}

/// Compute the rating for an impact/likelihood pair.
///
/// Both inputs must be in `1..=5`; out-of-range values are a caller
/// contract violation, not a handled error.
///
/// # Example
///
/// ```
/// use amana_governance::{classify, RiskLevel};
///
/// assert_eq!(classify(1, 3).level, RiskLevel::VeryLow);
/// assert_eq!(classify(4, 5).level, RiskLevel::High);
/// assert_eq!(classify(5, 5).level, RiskLevel::Critical);
/// ```
#[must_use]
pub fn classify(impact: u8, likelihood: u8) -> RiskRating {
    debug_assert!((1..=5).contains(&impact), "impact out of range: {impact}");
    debug_assert!(
        (1..=5).contains(&likelihood),
        "likelihood out of range: {likelihood}"
    );

    let score = impact * likelihood;
    RiskRating {
        score,
        level: RiskLevel::from_score(score),
    }
}
