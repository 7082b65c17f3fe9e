//! Amana core library
//!
//! Shared types for the Amana GRC platform.
//!
//! # Modules
//!
//! - [`ids`] - Strongly typed identifiers (`UserId`, `RiskId`)
//! - [`roles`] - The closed role enumeration used for authorization
//! - [`clock`] - Injectable time source for token lifetimes and audit stamps
//! - [`config`] - Shared configuration-loading error type and env helpers
//!
//! # Example
//!
//! ```
//! use amana_core::{Role, UserId};
//!
//! let user_id = UserId::new();
//! let role: Role = "RISK_OFFICER".parse().unwrap();
//! assert_eq!(role, Role::RiskOfficer);
//! ```

pub mod clock;
pub mod config;
pub mod ids;
pub mod roles;

// Re-export main types for convenient access
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::ConfigError;
pub use ids::{ParseIdError, RiskId, UserId};
pub use roles::{ParseRoleError, Role};
