//! Request authorization for Amana.
//!
//! [`AuthorizationGate`] stands between verified tokens and the CRUD
//! handlers: it resolves a presented credential to a live user record and
//! enforces role-membership checks. The pipeline per request is linear
//! (authenticate, then authorize) with no retries and no per-request state.
//!
//! # Example
//!
//! ```rust,ignore
//! use amana_authz::AuthorizationGate;
//! use amana_core::Role;
//!
//! let gate = AuthorizationGate::new(issuer, store);
//!
//! let user = gate.authenticate(bearer_token).await?;
//! gate.authorize(&user, &[Role::Admin, Role::RiskOfficer])?;
//! ```

mod error;
mod gate;

pub use error::AuthzError;
pub use gate::AuthorizationGate;
