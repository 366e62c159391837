//! Registry entity records: VPPs, sites, and batteries.
//!
//! All monetary and physical quantities are `Decimal` so fee arithmetic
//! never touches binary floating point.

use std::fmt;

use rust_decimal::Decimal;

/// A virtual power plant: an aggregator entitled to a percentage share of
/// metered-energy fees across its member sites, plus a flat daily fee.
///
/// Registered once and immutable thereafter. Validation happens at
/// registration time, not in the constructor.
#[derive(Debug, Clone, PartialEq)]
pub struct Vpp {
    /// Registry key. Lookups are exact-match, first match wins.
    pub name: String,
    /// Fraction of each metered fee retained by the operator (0.0 to 1.0).
    pub revenue_percentage: Decimal,
    /// Flat fee charged per billing day.
    pub daily_fee: Decimal,
}

impl Vpp {
    /// Creates a VPP record.
    pub fn new(name: &str, revenue_percentage: Decimal, daily_fee: Decimal) -> Self {
        Self {
            name: name.to_string(),
            revenue_percentage,
            daily_fee,
        }
    }
}

impl fmt::Display for Vpp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "vpp {} | revenue share {} | daily fee {}",
            self.name, self.revenue_percentage, self.daily_fee
        )
    }
}

/// A metered connection point belonging to exactly one VPP.
///
/// The `vpp_name` reference is deliberately not checked at creation time;
/// a dangling reference surfaces as a lookup failure during report
/// generation instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Site {
    /// Name of the owning VPP.
    pub vpp_name: String,
    /// National metering identifier, stored lower-cased. Registry key.
    pub nmi: String,
    /// Street address of the connection point.
    pub address: String,
}

impl Site {
    /// Creates a site record, normalizing `nmi` to lower case.
    pub fn new(vpp_name: &str, nmi: &str, address: &str) -> Self {
        Self {
            vpp_name: vpp_name.to_string(),
            nmi: nmi.to_lowercase(),
            address: address.to_string(),
        }
    }
}

impl fmt::Display for Site {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "site {} | vpp {} | {}",
            self.nmi, self.vpp_name, self.address
        )
    }
}

/// A storage asset registered at a site. Capacity is additive per site:
/// the engine sums every battery a site owns before apportioning the
/// shared fee pool.
#[derive(Debug, Clone, PartialEq)]
pub struct Battery {
    /// nmi of the owning site, stored lower-cased.
    pub nmi: String,
    /// Manufacturer name, informational only.
    pub manufacturer: String,
    /// Manufacturer serial number, informational only.
    pub serial_num: String,
    /// Usable capacity in kWh.
    pub capacity: Decimal,
}

impl Battery {
    /// Creates a battery record, normalizing `nmi` to lower case.
    pub fn new(nmi: &str, manufacturer: &str, serial_num: &str, capacity: Decimal) -> Self {
        Self {
            nmi: nmi.to_lowercase(),
            manufacturer: manufacturer.to_string(),
            serial_num: serial_num.to_string(),
            capacity,
        }
    }
}

impl fmt::Display for Battery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "battery {}/{} | site {} | {} kWh",
            self.manufacturer, self.serial_num, self.nmi, self.capacity
        )
    }
}
