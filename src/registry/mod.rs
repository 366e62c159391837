//! Entity model and registry.
//!
//! [`Registry`] holds the VPPs, sites, and batteries a settlement run works
//! over. Admission is rule-checked and fail-slow: every violated rule is
//! collected before the candidate is rejected.

mod entities;
mod rules;
mod store;

pub use entities::{Battery, Site, Vpp};
pub use rules::{Rule, RuleViolation, ValidationError, run_rules};
pub use store::{NotFoundError, Registry};
