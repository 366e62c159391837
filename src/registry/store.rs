//! The entity registry: insertion-ordered collections with rule-checked
//! admission and first-match lookups.

use thiserror::Error;

use super::entities::{Battery, Site, Vpp};
use super::rules::{self, Rule, ValidationError, run_rules};

/// Lookup failure naming the entity kind and the missing key.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("no {kind} found for key \"{key}\"")]
pub struct NotFoundError {
    /// Entity kind searched for (`"vpp"` or `"site"`).
    pub kind: &'static str,
    /// The key that had no match.
    pub key: String,
}

/// Registry of VPPs, sites, and batteries.
///
/// Collections preserve insertion order and admit duplicates; lookups scan
/// in insertion order and return the first match. Constructed once, written
/// during startup, and read for the rest of the process; report generation
/// only ever borrows the registry immutably.
#[derive(Debug, Clone)]
pub struct Registry {
    vpps: Vec<Vpp>,
    sites: Vec<Site>,
    batteries: Vec<Battery>,
    vpp_rules: Vec<Rule<Vpp>>,
    site_rules: Vec<Rule<Site>>,
    battery_rules: Vec<Rule<Battery>>,
}

impl Registry {
    /// Creates an empty registry with the built-in rule sets installed.
    pub fn new() -> Self {
        Self {
            vpps: Vec::new(),
            sites: Vec::new(),
            batteries: Vec::new(),
            vpp_rules: rules::vpp_rules(),
            site_rules: rules::site_rules(),
            battery_rules: rules::battery_rules(),
        }
    }

    /// Registers a VPP after running the full VPP rule set.
    ///
    /// On success returns a reference to the stored record. On failure the
    /// collection is left unchanged and the error carries every violation.
    pub fn register_vpp(&mut self, vpp: Vpp) -> Result<&Vpp, ValidationError> {
        admit(&mut self.vpps, &self.vpp_rules, vpp)
    }

    /// Registers a site after running the full site rule set.
    ///
    /// The `vpp_name` reference is not resolved here; a dangling reference
    /// is only discovered as a lookup failure at report time.
    pub fn register_site(&mut self, site: Site) -> Result<&Site, ValidationError> {
        admit(&mut self.sites, &self.site_rules, site)
    }

    /// Registers a battery after running the full battery rule set.
    ///
    /// The `nmi` reference is not resolved here; batteries whose site never
    /// materializes are skipped by capacity apportionment.
    pub fn register_battery(&mut self, battery: Battery) -> Result<&Battery, ValidationError> {
        admit(&mut self.batteries, &self.battery_rules, battery)
    }

    /// Appends a custom VPP rule to the built-in set.
    pub fn add_vpp_rule(&mut self, rule: Rule<Vpp>) {
        self.vpp_rules.push(rule);
    }

    /// Appends a custom site rule to the built-in set.
    pub fn add_site_rule(&mut self, rule: Rule<Site>) {
        self.site_rules.push(rule);
    }

    /// Appends a custom battery rule to the built-in set.
    pub fn add_battery_rule(&mut self, rule: Rule<Battery>) {
        self.battery_rules.push(rule);
    }

    /// Finds the first VPP with the given name (exact match).
    pub fn find_vpp_by_name(&self, name: &str) -> Result<&Vpp, NotFoundError> {
        self.vpps
            .iter()
            .find(|vpp| vpp.name == name)
            .ok_or_else(|| NotFoundError {
                kind: "vpp",
                key: name.to_string(),
            })
    }

    /// Finds the first site with the given nmi (case-insensitive).
    pub fn find_site_by_nmi(&self, nmi: &str) -> Result<&Site, NotFoundError> {
        let needle = nmi.to_lowercase();
        self.sites
            .iter()
            .find(|site| site.nmi == needle)
            .ok_or(NotFoundError {
                kind: "site",
                key: needle,
            })
    }

    /// All registered VPPs in insertion order.
    pub fn vpps(&self) -> &[Vpp] {
        &self.vpps
    }

    /// All registered sites in insertion order.
    pub fn sites(&self) -> &[Site] {
        &self.sites
    }

    /// All registered batteries in insertion order.
    pub fn batteries(&self) -> &[Battery] {
        &self.batteries
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

/// Runs the rule set, then appends and returns a reference to the stored
/// entity. A rejected candidate is never appended.
fn admit<'a, T>(
    collection: &'a mut Vec<T>,
    rules: &[Rule<T>],
    entity: T,
) -> Result<&'a T, ValidationError> {
    let violations = run_rules(rules, &entity);
    if !violations.is_empty() {
        return Err(ValidationError { violations });
    }
    let idx = collection.len();
    collection.push(entity);
    Ok(&collection[idx])
}
