//! Raw and bound metering events.

use rust_decimal::Decimal;

/// One day's recorded energy and tariff for a meter, as read from input.
///
/// Events are not registry entities: they are read fresh for each report
/// request and carry no identity beyond their fields.
#[derive(Debug, Clone, PartialEq)]
pub struct MeterEvent {
    /// Meter identifier as it appeared in the input (any case).
    pub nmi: String,
    /// Day of the reading, `"YYYY-MM-DD"`.
    pub date: String,
    /// Metered energy in kWh.
    pub energy: Decimal,
    /// Tariff in currency per kWh.
    pub tariff: Decimal,
}

impl MeterEvent {
    pub fn new(nmi: &str, date: &str, energy: Decimal, tariff: Decimal) -> Self {
        Self {
            nmi: nmi.to_string(),
            date: date.to_string(),
            energy,
            tariff,
        }
    }
}

/// A metering event annotated with the VPP that owns its site.
///
/// The `nmi` here is the normalized (lower-case) form taken from the
/// resolved site, so downstream grouping never mixes cases.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundEvent {
    /// Normalized meter identifier.
    pub nmi: String,
    /// Day of the reading, `"YYYY-MM-DD"`.
    pub date: String,
    /// Metered energy in kWh.
    pub energy: Decimal,
    /// Tariff in currency per kWh.
    pub tariff: Decimal,
    /// Name of the VPP owning the site this meter belongs to.
    pub vpp: String,
}

impl BoundEvent {
    /// Gross metering fee for this event (energy times tariff).
    pub fn fee(&self) -> Decimal {
        self.energy * self.tariff
    }

    /// Returns `true` when the event's date falls in the given `"YYYY-MM"`
    /// month (prefix match on the date string).
    pub fn occurred_in(&self, month: &str) -> bool {
        self.date.starts_with(month)
    }
}
