//! Report assembly: rounding and rendering at the presentation boundary.
//!
//! Everything upstream works in full precision; fees become fixed-point
//! strings only here, so no binary-float representation ever leaks into
//! output.

use std::fmt;

use rust_decimal::Decimal;
use serde::Serialize;

use super::engine::{MonthlyAllocation, SiteAllocation};

/// Decimal places carried by every rendered currency figure.
pub const FEE_DECIMAL_PLACES: u32 = 4;

/// Rounds a fee to presentation precision (banker's rounding) and renders
/// it as a fixed-point string. An amount that rounds to zero collapses to
/// `"0"`; everything else carries exactly four decimal places.
pub fn render_fee(value: Decimal) -> String {
    let rounded = value.round_dp(FEE_DECIMAL_PLACES);
    if rounded.is_zero() {
        "0".to_string()
    } else {
        format!("{rounded:.4}")
    }
}

/// Rendered fee split for one site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SiteFees {
    pub nmi: String,
    pub direct_fees: String,
    pub shared_fees: String,
}

/// The final report structure handed to consumers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SettlementReport {
    /// VPP name.
    pub name: String,
    /// Fixed monthly fee, rendered.
    pub daily_fee_for_month: String,
    /// Per-site rows in allocation order (sorted by `nmi`).
    pub sites: Vec<SiteFees>,
}

impl SettlementReport {
    /// Shapes a full-precision allocation into the rendered report.
    pub fn from_allocation(allocation: &MonthlyAllocation) -> Self {
        Self {
            name: allocation.vpp_name.clone(),
            daily_fee_for_month: render_fee(allocation.daily_fee_for_month),
            sites: allocation.sites.iter().map(SiteFees::from_allocation).collect(),
        }
    }
}

impl SiteFees {
    fn from_allocation(allocation: &SiteAllocation) -> Self {
        Self {
            nmi: allocation.nmi.clone(),
            direct_fees: render_fee(allocation.direct_fees),
            shared_fees: render_fee(allocation.shared_fees),
        }
    }
}

impl fmt::Display for SettlementReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Settlement Report: {} ---", self.name)?;
        write!(f, "Monthly fixed fee:  {}", self.daily_fee_for_month)?;
        for site in &self.sites {
            write!(
                f,
                "\nSite {}:  direct {}, shared {}",
                site.nmi, site.direct_fees, site.shared_fees
            )?;
        }
        Ok(())
    }
}
