//! Allocation engine: the multi-stage split of a month's metering fees
//! between a VPP and its battery-owning sites.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use thiserror::Error;

use crate::registry::{NotFoundError, Registry};

use super::binder::bind_events;
use super::event::MeterEvent;
use super::report::SettlementReport;

/// Fixed billing-month length. Every month is settled as 28 days regardless
/// of its calendar length.
pub const BILLING_DAYS_PER_MONTH: Decimal = dec!(28);

/// Fraction of the post-VPP residual paid directly to the metered site. The
/// remainder goes into the shared pool apportioned by battery capacity.
pub const DIRECT_SITE_SHARE: Decimal = dec!(0.8);

/// Shared-fee apportionment was requested over zero total battery capacity.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("cannot apportion shared fees for vpp \"{vpp_name}\": total battery capacity is zero")]
pub struct InvalidStateError {
    pub vpp_name: String,
}

/// Any failure that aborts report generation. No partial report survives.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ReportError {
    #[error(transparent)]
    NotFound(#[from] NotFoundError),
    #[error(transparent)]
    InvalidState(#[from] InvalidStateError),
}

/// Full-precision fee split for one site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteAllocation {
    /// Normalized meter identifier.
    pub nmi: String,
    /// 80% of the post-VPP residual of this site's own events.
    pub direct_fees: Decimal,
    /// Capacity-proportional slice of the shared pool.
    pub shared_fees: Decimal,
}

/// Full-precision allocation for one VPP and month, before any rounding.
///
/// Rounding to presentation precision happens only when this is shaped into
/// a [`SettlementReport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthlyAllocation {
    pub vpp_name: String,
    /// Requested month, `"YYYY-MM"`.
    pub month: String,
    /// `daily_fee` times the fixed billing-month length.
    pub daily_fee_for_month: Decimal,
    /// One row per battery-owning site, ordered by `nmi`.
    pub sites: Vec<SiteAllocation>,
}

/// Allocation engine borrowing an immutable registry.
///
/// A pure pipeline per invocation: no state persists between calls beyond
/// the registry contents.
pub struct SettlementEngine<'a> {
    registry: &'a Registry,
}

impl<'a> SettlementEngine<'a> {
    pub fn new(registry: &'a Registry) -> Self {
        Self { registry }
    }

    /// Computes the full-precision fee allocation for one VPP and month.
    ///
    /// Stages run in order; each consumes the residual left by the one
    /// before it. An empty in-scope event set yields all-zero fees, not an
    /// error.
    pub fn allocate(
        &self,
        events: &[MeterEvent],
        vpp_name: &str,
        month: &str,
    ) -> Result<MonthlyAllocation, ReportError> {
        // 1. Resolve the VPP and bind every event to its owner.
        let vpp = self.registry.find_vpp_by_name(vpp_name)?;
        let bound = bind_events(self.registry, events)?;

        // 2. Fixed fee for the 28-day billing month.
        let daily_fee_for_month = vpp.daily_fee * BILLING_DAYS_PER_MONTH;

        // 3.-5. Split each in-scope event: VPP cut first, then 80% of the
        // residual directly to the metered site, the rest into the pool.
        let mut direct_by_nmi: BTreeMap<String, Decimal> = BTreeMap::new();
        let mut total_fee_to_share = Decimal::ZERO;
        for event in bound
            .iter()
            .filter(|e| e.vpp == vpp.name && e.occurred_in(month))
        {
            let fee = event.fee();
            let fee_to_vpp = fee * vpp.revenue_percentage;
            let fee_direct_to_site = (fee - fee_to_vpp) * DIRECT_SITE_SHARE;
            let fee_to_share = fee - fee_to_vpp - fee_direct_to_site;

            *direct_by_nmi
                .entry(event.nmi.clone())
                .or_insert(Decimal::ZERO) += fee_direct_to_site;
            total_fee_to_share += fee_to_share;
        }

        // 6. Battery capacity per site under this VPP. Apportionment over
        // zero total capacity is undefined.
        let capacity_by_nmi = self.site_capacities(&vpp.name);
        let total_capacity: Decimal = capacity_by_nmi.values().sum();
        if total_capacity.is_zero() && !capacity_by_nmi.is_empty() {
            return Err(InvalidStateError {
                vpp_name: vpp.name.clone(),
            }
            .into());
        }

        // 7. One row per battery-owning site, ordered by nmi. A site with
        // events but no battery fed the pool above yet gets no row.
        let sites = capacity_by_nmi
            .iter()
            .map(|(nmi, capacity)| SiteAllocation {
                nmi: nmi.clone(),
                direct_fees: direct_by_nmi.get(nmi).copied().unwrap_or(Decimal::ZERO),
                shared_fees: capacity / total_capacity * total_fee_to_share,
            })
            .collect();

        Ok(MonthlyAllocation {
            vpp_name: vpp.name.clone(),
            month: month.to_string(),
            daily_fee_for_month,
            sites,
        })
    }

    /// Computes the allocation and shapes it into the serializable report,
    /// rounding every fee at that boundary.
    pub fn create_report(
        &self,
        events: &[MeterEvent],
        vpp_name: &str,
        month: &str,
    ) -> Result<SettlementReport, ReportError> {
        let allocation = self.allocate(events, vpp_name, month)?;
        Ok(SettlementReport::from_allocation(&allocation))
    }

    /// Additive battery capacity per battery-owning site under `vpp_name`.
    ///
    /// A battery whose `nmi` resolves to no site contributes nothing; its
    /// phantom site can never receive a payout row.
    fn site_capacities(&self, vpp_name: &str) -> BTreeMap<String, Decimal> {
        let mut by_nmi = BTreeMap::new();
        for battery in self.registry.batteries() {
            let site = match self.registry.find_site_by_nmi(&battery.nmi) {
                Ok(site) => site,
                Err(_) => continue,
            };
            if site.vpp_name == vpp_name {
                *by_nmi.entry(site.nmi.clone()).or_insert(Decimal::ZERO) += battery.capacity;
            }
        }
        by_nmi
    }
}

#[cfg(test)]
mod tests {
    use crate::registry::{Battery, Site, Vpp};

    use super::*;

    fn half_share_registry() -> Registry {
        let mut registry = Registry::new();
        registry
            .register_vpp(Vpp::new("Ampharos", dec!(0.5), dec!(4)))
            .unwrap();
        registry
            .register_site(Site::new("Ampharos", "nmi001", "12 Thunder Rd"))
            .unwrap();
        registry
            .register_battery(Battery::new("nmi001", "Tesla", "SN-1", dec!(10)))
            .unwrap();
        registry
    }

    fn one_event() -> Vec<MeterEvent> {
        vec![MeterEvent::new("nmi001", "2025-01-15", dec!(10), dec!(2))]
    }

    #[test]
    fn single_site_single_battery_split() {
        // fee 20, vpp cut 10, residual 10: direct 8, shared pool 2.
        let registry = half_share_registry();
        let engine = SettlementEngine::new(&registry);

        let allocation = engine.allocate(&one_event(), "Ampharos", "2025-01").unwrap();
        assert_eq!(allocation.daily_fee_for_month, dec!(112));
        assert_eq!(allocation.sites.len(), 1);
        assert_eq!(allocation.sites[0].direct_fees, dec!(8));
        assert_eq!(allocation.sites[0].shared_fees, dec!(2));
    }

    #[test]
    fn empty_month_still_lists_battery_sites() {
        let registry = half_share_registry();
        let engine = SettlementEngine::new(&registry);

        let allocation = engine.allocate(&one_event(), "Ampharos", "2025-02").unwrap();
        assert_eq!(allocation.sites.len(), 1);
        assert_eq!(allocation.sites[0].direct_fees, Decimal::ZERO);
        assert_eq!(allocation.sites[0].shared_fees, Decimal::ZERO);
        // The fixed fee does not depend on events.
        assert_eq!(allocation.daily_fee_for_month, dec!(112));
    }

    #[test]
    fn batteryless_site_feeds_pool_but_gets_no_row() {
        let mut registry = half_share_registry();
        registry
            .register_site(Site::new("Ampharos", "nmi002", "14 Thunder Rd"))
            .unwrap();
        let engine = SettlementEngine::new(&registry);

        // All events sit on the batteryless site.
        let events = vec![MeterEvent::new("nmi002", "2025-01-15", dec!(10), dec!(2))];
        let allocation = engine.allocate(&events, "Ampharos", "2025-01").unwrap();

        assert_eq!(allocation.sites.len(), 1);
        assert_eq!(allocation.sites[0].nmi, "nmi001");
        assert_eq!(allocation.sites[0].direct_fees, Decimal::ZERO);
        // nmi002's residual still filled the shared pool.
        assert_eq!(allocation.sites[0].shared_fees, dec!(2));
    }

    #[test]
    fn zero_total_capacity_is_invalid_state() {
        let mut registry = Registry::new();
        registry
            .register_vpp(Vpp::new("Ampharos", dec!(0.5), dec!(4)))
            .unwrap();
        registry
            .register_site(Site::new("Ampharos", "nmi001", "12 Thunder Rd"))
            .unwrap();
        registry
            .register_battery(Battery::new("nmi001", "Tesla", "SN-1", dec!(0)))
            .unwrap();
        let engine = SettlementEngine::new(&registry);

        let err = engine.allocate(&[], "Ampharos", "2025-01").unwrap_err();
        assert!(matches!(err, ReportError::InvalidState(_)));
    }

    #[test]
    fn vpp_without_batteries_reports_no_sites() {
        let mut registry = Registry::new();
        registry
            .register_vpp(Vpp::new("Ampharos", dec!(0.5), dec!(4)))
            .unwrap();
        registry
            .register_site(Site::new("Ampharos", "nmi001", "12 Thunder Rd"))
            .unwrap();
        let engine = SettlementEngine::new(&registry);

        let allocation = engine.allocate(&one_event(), "Ampharos", "2025-01").unwrap();
        assert!(allocation.sites.is_empty());
        assert_eq!(allocation.daily_fee_for_month, dec!(112));
    }

    #[test]
    fn events_outside_month_or_vpp_are_filtered_out() {
        let mut registry = half_share_registry();
        registry
            .register_vpp(Vpp::new("Zapdos", dec!(0.3), dec!(2)))
            .unwrap();
        registry
            .register_site(Site::new("Zapdos", "nmi009", "9 Storm Ave"))
            .unwrap();
        let engine = SettlementEngine::new(&registry);

        let events = vec![
            MeterEvent::new("nmi001", "2025-01-15", dec!(10), dec!(2)),
            MeterEvent::new("nmi001", "2025-02-01", dec!(100), dec!(2)),
            MeterEvent::new("nmi009", "2025-01-10", dec!(100), dec!(2)),
        ];
        let allocation = engine.allocate(&events, "Ampharos", "2025-01").unwrap();
        // Only the first event is in scope.
        assert_eq!(allocation.sites[0].direct_fees, dec!(8));
        assert_eq!(allocation.sites[0].shared_fees, dec!(2));
    }

    #[test]
    fn unknown_vpp_fails_lookup() {
        let registry = half_share_registry();
        let engine = SettlementEngine::new(&registry);

        let err = engine.allocate(&[], "Moltres", "2025-01").unwrap_err();
        assert!(matches!(err, ReportError::NotFound(_)));
    }

    #[test]
    fn dangling_battery_reference_is_skipped() {
        let mut registry = half_share_registry();
        registry
            .register_battery(Battery::new("ghost", "Tesla", "SN-2", dec!(1000)))
            .unwrap();
        let engine = SettlementEngine::new(&registry);

        let allocation = engine.allocate(&one_event(), "Ampharos", "2025-01").unwrap();
        // The phantom capacity must not dilute the real site's share.
        assert_eq!(allocation.sites.len(), 1);
        assert_eq!(allocation.sites[0].shared_fees, dec!(2));
    }

    #[test]
    fn capacity_is_additive_per_site_and_rows_sort_by_nmi() {
        let mut registry = Registry::new();
        registry
            .register_vpp(Vpp::new("Ampharos", dec!(0.5), dec!(4)))
            .unwrap();
        registry
            .register_site(Site::new("Ampharos", "nmi002", "14 Thunder Rd"))
            .unwrap();
        registry
            .register_site(Site::new("Ampharos", "nmi001", "12 Thunder Rd"))
            .unwrap();
        registry
            .register_battery(Battery::new("nmi002", "Tesla", "SN-1", dec!(10)))
            .unwrap();
        registry
            .register_battery(Battery::new("nmi001", "LG", "SN-2", dec!(20)))
            .unwrap();
        registry
            .register_battery(Battery::new("nmi001", "LG", "SN-3", dec!(10)))
            .unwrap();
        let engine = SettlementEngine::new(&registry);

        let allocation = engine.allocate(&one_event(), "Ampharos", "2025-01").unwrap();
        // Registration order was nmi002 first; output is sorted.
        assert_eq!(allocation.sites[0].nmi, "nmi001");
        assert_eq!(allocation.sites[1].nmi, "nmi002");
        // Pool of 2 split 30:10.
        assert_eq!(allocation.sites[0].shared_fees, dec!(1.5));
        assert_eq!(allocation.sites[1].shared_fees, dec!(0.5));
    }
}
