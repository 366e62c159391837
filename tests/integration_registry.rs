//! Integration tests for entity registration, validation, and lookup.

use rust_decimal_macros::dec;

use vpp_settle::registry::{Battery, Registry, RuleViolation, Site, Vpp};

fn populated_registry() -> Registry {
    let mut registry = Registry::new();
    registry
        .register_vpp(Vpp::new("Ampharos", dec!(0.5), dec!(4)))
        .unwrap();
    registry
        .register_site(Site::new("Ampharos", "ABC123", "12 Thunder Rd"))
        .unwrap();
    registry
        .register_battery(Battery::new("abc123", "Tesla", "SN-001", dec!(13.5)))
        .unwrap();
    registry
}

#[test]
fn registration_round_trip() {
    let registry = populated_registry();
    assert_eq!(registry.vpps().len(), 1);
    assert_eq!(registry.sites().len(), 1);
    assert_eq!(registry.batteries().len(), 1);

    let vpp = registry.find_vpp_by_name("Ampharos").unwrap();
    assert_eq!(vpp.daily_fee, dec!(4));
}

#[test]
fn rejected_vpp_reports_every_violation_at_once() {
    let mut registry = Registry::new();
    let err = registry
        .register_vpp(Vpp::new("Raikou", dec!(-0.2), dec!(-1)))
        .unwrap_err();

    let rendered = err.to_string();
    assert!(rendered.contains("revenue_percentage"), "{rendered}");
    assert!(rendered.contains("daily_fee"), "{rendered}");
    assert!(registry.vpps().is_empty());
}

#[test]
fn boundary_revenue_percentages_are_accepted() {
    let mut registry = Registry::new();
    assert!(
        registry
            .register_vpp(Vpp::new("Floor", dec!(0), dec!(1)))
            .is_ok()
    );
    assert!(
        registry
            .register_vpp(Vpp::new("Ceiling", dec!(1), dec!(1)))
            .is_ok()
    );
    assert!(
        registry
            .register_vpp(Vpp::new("Above", dec!(1.01), dec!(1)))
            .is_err()
    );
}

#[test]
fn site_lookup_ignores_nmi_case() {
    let registry = populated_registry();

    let site = registry.find_site_by_nmi("abc123").unwrap();
    assert_eq!(site.address, "12 Thunder Rd");
    let shouted = registry.find_site_by_nmi("ABC123").unwrap();
    assert_eq!(shouted.nmi, site.nmi);
}

#[test]
fn duplicate_nmi_keeps_first_registration() {
    let mut registry = populated_registry();
    registry
        .register_vpp(Vpp::new("Zapdos", dec!(0.3), dec!(2)))
        .unwrap();
    registry
        .register_site(Site::new("Zapdos", "abc123", "9 Storm Ave"))
        .unwrap();

    let site = registry.find_site_by_nmi("ABC123").unwrap();
    assert_eq!(site.vpp_name, "Ampharos");
    assert_eq!(registry.sites().len(), 2);
}

#[test]
fn lookup_failure_names_kind_and_key() {
    let registry = populated_registry();
    let err = registry.find_vpp_by_name("Entei").unwrap_err();
    assert_eq!(err.to_string(), "no vpp found for key \"Entei\"");

    let err = registry.find_site_by_nmi("zzz999").unwrap_err();
    assert!(err.to_string().contains("zzz999"));
}

#[test]
fn vpp_name_lookup_is_exact() {
    let registry = populated_registry();
    assert!(registry.find_vpp_by_name("ampharos").is_err());
}

#[test]
fn custom_battery_rule_participates_in_validation() {
    fn serial_has_vendor_prefix(battery: &Battery) -> Option<RuleViolation> {
        if battery.serial_num.starts_with("SN-") {
            None
        } else {
            Some(RuleViolation {
                field: "serial_num".into(),
                message: format!("must start with SN-, got {}", battery.serial_num),
            })
        }
    }

    let mut registry = Registry::new();
    registry.add_battery_rule(serial_has_vendor_prefix);

    let err = registry
        .register_battery(Battery::new("abc123", "Tesla", "PW-001", dec!(10)))
        .unwrap_err();
    assert!(err.to_string().contains("serial_num"));
    assert!(
        registry
            .register_battery(Battery::new("abc123", "Tesla", "SN-001", dec!(10)))
            .is_ok()
    );
}

#[test]
fn custom_site_rule_participates_in_validation() {
    // Sites carry no built-in rules, so the custom rule is the only gate.
    fn address_not_empty(site: &Site) -> Option<RuleViolation> {
        site.address.is_empty().then(|| RuleViolation {
            field: "address".into(),
            message: "must not be empty".into(),
        })
    }

    let mut registry = Registry::new();
    registry.add_site_rule(address_not_empty);

    let err = registry
        .register_site(Site::new("Ampharos", "nmi001", ""))
        .unwrap_err();
    assert!(err.to_string().contains("address"));
    assert!(registry.sites().is_empty());
    assert!(
        registry
            .register_site(Site::new("Ampharos", "nmi001", "12 Thunder Rd"))
            .is_ok()
    );
}
