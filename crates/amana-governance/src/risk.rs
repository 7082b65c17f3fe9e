//! Risk register entries.

use crate::error::GovernanceError;
use crate::scoring::{classify, RiskLevel};
use amana_core::{RiskId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Risk treatment strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskTreatment {
    Accept,
    #[default]
    Mitigate,
    Transfer,
    Avoid,
}

/// Risk lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskStatus {
    #[default]
    Open,
    Monitoring,
    Closed,
}

/// Fields supplied when registering a risk.
#[derive(Debug, Clone)]
pub struct NewRisk {
    /// Human-facing register key (e.g. "RISK-2024-001").
    pub risk_key: String,
    pub title_en: String,
    pub title_ar: String,
    pub description_en: String,
    pub description_ar: String,
    /// Asset at risk.
    pub asset: String,
    /// Threat source.
    pub threat: String,
    /// Vulnerability exploited.
    pub vulnerability: String,
    /// Impact, 1-5.
    pub impact: u8,
    /// Likelihood, 1-5.
    pub likelihood: u8,
    pub treatment: RiskTreatment,
    pub owner: UserId,
}

/// A risk register entry.
///
/// `score` and `level` are derived from `impact` and `likelihood` and are
/// recomputed on every assessment change; they are never set directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Risk {
    /// Unique identifier.
    pub id: RiskId,

    /// Human-facing register key, unique within the register.
    pub risk_key: String,

    /// Title, English locale.
    pub title_en: String,

    /// Title, Arabic locale.
    pub title_ar: String,

    /// Description, English locale.
    pub description_en: String,

    /// Description, Arabic locale.
    pub description_ar: String,

    /// Asset at risk.
    pub asset: String,

    /// Threat source.
    pub threat: String,

    /// Vulnerability exploited.
    pub vulnerability: String,

    /// Impact, 1-5.
    pub impact: u8,

    /// Likelihood, 1-5.
    pub likelihood: u8,

    /// Derived: impact × likelihood.
    pub score: u8,

    /// Derived: classification of the score.
    pub level: RiskLevel,

    /// Treatment strategy.
    pub treatment: RiskTreatment,

    /// Treatment plan, when one exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub treatment_plan: Option<String>,

    /// Lifecycle status.
    pub status: RiskStatus,

    /// Owning user.
    pub owner: UserId,

    /// Next scheduled review.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review_date: Option<DateTime<Utc>>,

    /// When the entry was created.
    pub created_at: DateTime<Utc>,

    /// When the entry was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Validate a 1-5 assessment input at the construction edge.
fn validate_assessment(field: &'static str, value: u8) -> Result<(), GovernanceError> {
    if (1..=5).contains(&value) {
        Ok(())
    } else {
        Err(GovernanceError::validation(
            field,
            format!("must be between 1 and 5, got {value}"),
        ))
    }
}

impl Risk {
    /// Register a new risk, deriving its initial score and level.
    ///
    /// # Errors
    ///
    /// `GovernanceError::Validation` when impact or likelihood is outside
    /// `1..=5` or the register key is empty.
    pub fn new(new_risk: NewRisk, now: DateTime<Utc>) -> Result<Self, GovernanceError> {
        if new_risk.risk_key.trim().is_empty() {
            return Err(GovernanceError::validation("risk_key", "must not be empty"));
        }
        validate_assessment("impact", new_risk.impact)?;
        validate_assessment("likelihood", new_risk.likelihood)?;

        let rating = classify(new_risk.impact, new_risk.likelihood);

        Ok(Self {
            id: RiskId::new(),
            risk_key: new_risk.risk_key,
            title_en: new_risk.title_en,
            title_ar: new_risk.title_ar,
            description_en: new_risk.description_en,
            description_ar: new_risk.description_ar,
            asset: new_risk.asset,
            threat: new_risk.threat,
            vulnerability: new_risk.vulnerability,
            impact: new_risk.impact,
            likelihood: new_risk.likelihood,
            score: rating.score,
            level: rating.level,
            treatment: new_risk.treatment,
            treatment_plan: None,
            status: RiskStatus::Open,
            owner: new_risk.owner,
            review_date: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// Change the assessment, recomputing score and level.
    ///
    /// This is the only mutation path for impact and likelihood, so the
    /// `score == impact × likelihood` invariant can never go stale.
    ///
    /// # Errors
    ///
    /// `GovernanceError::Validation` for out-of-range inputs; the entry is
    /// left unchanged.
    pub fn update_assessment(
        &mut self,
        impact: u8,
        likelihood: u8,
        now: DateTime<Utc>,
    ) -> Result<(), GovernanceError> {
        validate_assessment("impact", impact)?;
        validate_assessment("likelihood", likelihood)?;

        let rating = classify(impact, likelihood);
        self.impact = impact;
        self.likelihood = likelihood;
        self.score = rating.score;
        self.level = rating.level;
        self.updated_at = now;
        Ok(())
    }
}

/// Aggregate counts over a risk register, for dashboards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterSummary {
    /// Total number of entries.
    pub total: usize,
    /// Entries with `Open` status.
    pub open: usize,
    /// Entries classified `Critical`.
    pub critical: usize,
    /// Count per level, least severe first.
    pub by_level: [usize; 5],
}

impl RegisterSummary {
    /// Summarize a register.
    #[must_use]
    pub fn from_risks(risks: &[Risk]) -> Self {
        let mut by_level = [0usize; 5];
        let mut open = 0;
        for risk in risks {
            let index = RiskLevel::ALL
                .iter()
                .position(|l| *l == risk.level)
                .unwrap_or(0);
            by_level[index] += 1;
            if risk.status == RiskStatus::Open {
                open += 1;
            }
        }

        Self {
            total: risks.len(),
            open,
            critical: by_level[4],
            by_level,
        }
    }

    /// Count for one level.
    #[must_use]
    pub fn count_for(&self, level: RiskLevel) -> usize {
        let index = RiskLevel::ALL
            .iter()
            .position(|l| *l == level)
            .unwrap_or(0);
        self.by_level[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(impact: u8, likelihood: u8) -> NewRisk {
        NewRisk {
            risk_key: "RISK-2024-001".to_string(),
            title_en: "Unauthorized Access to Database".to_string(),
            title_ar: "وصول غير مصرح به إلى قاعدة البيانات".to_string(),
            description_en: "Production data exposed to external actors".to_string(),
            description_ar: "بيانات الإنتاج معرضة لجهات خارجية".to_string(),
            asset: "Production Database".to_string(),
            threat: "External Attacker".to_string(),
            vulnerability: "Weak Authentication".to_string(),
            impact,
            likelihood,
            treatment: RiskTreatment::Mitigate,
            owner: UserId::new(),
        }
    }

    #[test]
    fn test_new_risk_derives_rating() {
        let risk = Risk::new(entry(5, 3), Utc::now()).unwrap();

        assert_eq!(risk.score, 15);
        assert_eq!(risk.level, RiskLevel::High);
        assert_eq!(risk.status, RiskStatus::Open);
        assert_eq!(risk.treatment, RiskTreatment::Mitigate);
    }

    #[test]
    fn test_new_risk_rejects_out_of_range() {
        assert!(Risk::new(entry(0, 3), Utc::now()).is_err());
        assert!(Risk::new(entry(3, 6), Utc::now()).is_err());

        let mut bad_key = entry(3, 3);
        bad_key.risk_key = "  ".to_string();
        assert!(Risk::new(bad_key, Utc::now()).is_err());
    }

    #[test]
    fn test_update_assessment_recomputes() {
        let created = Utc::now();
        let mut risk = Risk::new(entry(2, 2), created).unwrap();
        assert_eq!(risk.level, RiskLevel::Low);

        let later = created + chrono::Duration::hours(1);
        risk.update_assessment(5, 5, later).unwrap();

        assert_eq!(risk.score, 25);
        assert_eq!(risk.level, RiskLevel::Critical);
        assert_eq!(risk.updated_at, later);
        assert_eq!(risk.created_at, created);
    }

    #[test]
    fn test_update_assessment_invalid_leaves_entry_unchanged() {
        let mut risk = Risk::new(entry(2, 3), Utc::now()).unwrap();
        let before = risk.clone();

        assert!(risk.update_assessment(9, 3, Utc::now()).is_err());
        assert_eq!(risk, before);
    }

    #[test]
    fn test_invariant_holds_across_all_updates() {
        let mut risk = Risk::new(entry(1, 1), Utc::now()).unwrap();
        for impact in 1..=5u8 {
            for likelihood in 1..=5u8 {
                risk.update_assessment(impact, likelihood, Utc::now()).unwrap();
                assert_eq!(risk.score, risk.impact * risk.likelihood);
                assert_eq!(risk.level, RiskLevel::from_score(risk.score));
            }
        }
    }

    #[test]
    fn test_register_summary_counts() {
        let now = Utc::now();
        let mut risks = vec![
            Risk::new(entry(1, 1), now).unwrap(),  // VeryLow
            Risk::new(entry(2, 3), now).unwrap(),  // Low
            Risk::new(entry(5, 5), now).unwrap(),  // Critical
            Risk::new(entry(5, 3), now).unwrap(),  // High
        ];
        risks[1].status = RiskStatus::Closed;

        let summary = RegisterSummary::from_risks(&risks);
        assert_eq!(summary.total, 4);
        assert_eq!(summary.open, 3);
        assert_eq!(summary.critical, 1);
        assert_eq!(summary.count_for(RiskLevel::VeryLow), 1);
        assert_eq!(summary.count_for(RiskLevel::Low), 1);
        assert_eq!(summary.count_for(RiskLevel::Medium), 0);
        assert_eq!(summary.count_for(RiskLevel::High), 1);
        assert_eq!(summary.count_for(RiskLevel::Critical), 1);
    }

    #[test]
    fn test_empty_register_summary() {
        let summary = RegisterSummary::from_risks(&[]);
        assert_eq!(summary.total, 0);
        assert_eq!(summary.open, 0);
        assert_eq!(summary.by_level, [0; 5]);
    }

    #[test]
    fn test_serialization_wire_forms() {
        let risk = Risk::new(entry(5, 5), Utc::now()).unwrap();
        let json = serde_json::to_string(&risk).unwrap();

        assert!(json.contains("\"level\":\"CRITICAL\""));
        assert!(json.contains("\"status\":\"OPEN\""));
        assert!(json.contains("\"treatment\":\"MITIGATE\""));
        assert!(!json.contains("treatment_plan"));
    }
}
