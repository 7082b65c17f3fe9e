//! Risk governance for Amana.
//!
//! Risk classification and the risk register entry model. A risk's score
//! is derived, never stored independently of its inputs: impact and
//! likelihood (each 1-5) multiply into a 1-25 score, which maps
//! deterministically onto one of five ordered levels. Every mutation of
//! the inputs recomputes the classification.
//!
//! # Example
//!
//! ```
//! use amana_governance::{classify, RiskLevel};
//!
//! let rating = classify(5, 3);
//! assert_eq!(rating.score, 15);
//! assert_eq!(rating.level, RiskLevel::High);
//! ```

mod error;
mod risk;
mod scoring;

pub use error::GovernanceError;
pub use risk::{NewRisk, RegisterSummary, Risk, RiskStatus, RiskTreatment};
pub use scoring::{classify, RiskLevel, RiskRating};
