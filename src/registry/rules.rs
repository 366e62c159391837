//! Validation rule engine applied at entity registration.
//!
//! A rule is a pure predicate over one entity kind. Rule sets run
//! exhaustively: every rule is checked even after one fails, so a rejected
//! registration reports the complete list of violations in one pass.

use std::fmt;

use rust_decimal::Decimal;
use thiserror::Error;

use super::entities::{Battery, Site, Vpp};

/// A validation rule for entities of type `T`.
///
/// Returns `Some(violation)` when the entity fails the check, `None` when
/// it passes.
pub type Rule<T> = fn(&T) -> Option<RuleViolation>;

/// A single violated registration rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleViolation {
    /// Field the rule constrains (e.g. `"revenue_percentage"`).
    pub field: String,
    /// Constraint description, including the offending value.
    pub message: String,
}

impl fmt::Display for RuleViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Registration failure carrying every violated rule, not just the first.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("validation failed: {}", join_violations(.violations))]
pub struct ValidationError {
    /// All violations found for the rejected entity.
    pub violations: Vec<RuleViolation>,
}

fn join_violations(violations: &[RuleViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Runs every rule in the set against the entity and collects the
/// violations (fail-slow, never short-circuits).
pub fn run_rules<T>(rules: &[Rule<T>], entity: &T) -> Vec<RuleViolation> {
    rules.iter().filter_map(|rule| rule(entity)).collect()
}

/// Built-in VPP rule set.
pub(crate) fn vpp_rules() -> Vec<Rule<Vpp>> {
    vec![revenue_percentage_in_unit_range, daily_fee_non_negative]
}

/// Built-in site rule set. Empty: the `vpp_name` reference is checked at
/// report time, not at creation.
pub(crate) fn site_rules() -> Vec<Rule<Site>> {
    Vec::new()
}

/// Built-in battery rule set.
pub(crate) fn battery_rules() -> Vec<Rule<Battery>> {
    vec![capacity_non_negative]
}

fn revenue_percentage_in_unit_range(vpp: &Vpp) -> Option<RuleViolation> {
    if (Decimal::ZERO..=Decimal::ONE).contains(&vpp.revenue_percentage) {
        None
    } else {
        Some(RuleViolation {
            field: "revenue_percentage".into(),
            message: format!("must be within [0.0, 1.0], got {}", vpp.revenue_percentage),
        })
    }
}

fn daily_fee_non_negative(vpp: &Vpp) -> Option<RuleViolation> {
    if vpp.daily_fee >= Decimal::ZERO {
        None
    } else {
        Some(RuleViolation {
            field: "daily_fee".into(),
            message: format!("must be >= 0, got {}", vpp.daily_fee),
        })
    }
}

fn capacity_non_negative(battery: &Battery) -> Option<RuleViolation> {
    if battery.capacity >= Decimal::ZERO {
        None
    } else {
        Some(RuleViolation {
            field: "capacity".into(),
            message: format!("must be >= 0, got {}", battery.capacity),
        })
    }
}
