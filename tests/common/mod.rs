//! Shared test fixtures for integration tests.

use rust_decimal_macros::dec;

use vpp_settle::registry::{Battery, Registry, Site, Vpp};
use vpp_settle::settlement::MeterEvent;

/// Registry with a two-VPP fleet.
///
/// `Ampharos` (revenue 0.5, daily fee 4) owns `nmi001` (10 kWh battery),
/// `nmi002` (20 + 10 kWh batteries), and the batteryless `nmi003`.
/// `Zapdos` (revenue 0.3, daily fee 2) owns `nmi009` (5 kWh battery).
/// Some identifiers are registered upper-case to exercise normalization.
pub fn sample_registry() -> Registry {
    let mut registry = Registry::new();
    registry
        .register_vpp(Vpp::new("Ampharos", dec!(0.5), dec!(4)))
        .unwrap();
    registry
        .register_vpp(Vpp::new("Zapdos", dec!(0.3), dec!(2)))
        .unwrap();
    registry
        .register_site(Site::new("Ampharos", "NMI001", "12 Thunder Rd"))
        .unwrap();
    registry
        .register_site(Site::new("Ampharos", "nmi002", "14 Thunder Rd"))
        .unwrap();
    registry
        .register_site(Site::new("Ampharos", "nmi003", "16 Thunder Rd"))
        .unwrap();
    registry
        .register_site(Site::new("Zapdos", "nmi009", "9 Storm Ave"))
        .unwrap();
    registry
        .register_battery(Battery::new("nmi001", "Tesla", "PW-001", dec!(10)))
        .unwrap();
    registry
        .register_battery(Battery::new("NMI002", "LG", "RESU-77", dec!(20)))
        .unwrap();
    registry
        .register_battery(Battery::new("nmi002", "LG", "RESU-78", dec!(10)))
        .unwrap();
    registry
        .register_battery(Battery::new("nmi009", "Sonnen", "ECO-5", dec!(5)))
        .unwrap();
    registry
}

/// January 2023 events for the sample registry.
///
/// Three Ampharos events in scope (gross fees 20 + 3 + 10), plus one
/// February event and one Zapdos event that a January Ampharos report
/// must filter out.
pub fn january_events() -> Vec<MeterEvent> {
    vec![
        MeterEvent::new("nmi001", "2023-01-05", dec!(10), dec!(2)),
        MeterEvent::new("NMI001", "2023-01-06", dec!(6), dec!(0.5)),
        MeterEvent::new("nmi002", "2023-01-05", dec!(8), dec!(1.25)),
        MeterEvent::new("nmi001", "2023-02-01", dec!(100), dec!(2)),
        MeterEvent::new("nmi009", "2023-01-10", dec!(40), dec!(1)),
    ]
}
