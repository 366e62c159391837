//! API response and query types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Summary row for one registered VPP.
///
/// Decimal fields serialize as exact decimal strings, matching the fee
/// strings in the report body.
#[derive(Debug, Serialize)]
pub struct VppSummary {
    /// VPP name.
    pub name: String,
    /// Fraction of gross fees retained by the operator.
    pub revenue_percentage: Decimal,
    /// Flat daily fee.
    pub daily_fee: Decimal,
    /// Registered sites referencing this VPP.
    pub site_count: usize,
    /// Registered batteries resolving to those sites.
    pub battery_count: usize,
}

/// Query parameters for the report endpoint. Both are required; axum
/// rejects a request missing either with a 400.
#[derive(Debug, Deserialize)]
pub struct ReportQuery {
    /// VPP name (exact match).
    pub vpp: String,
    /// Month selector, `"YYYY-MM"`.
    pub month: String,
}

/// Error response body for 400-class errors.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Human-readable error message.
    pub error: String,
}
