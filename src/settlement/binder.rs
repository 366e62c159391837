//! Binds raw metering events to the VPP that owns their site.

use crate::registry::{NotFoundError, Registry};

use super::event::{BoundEvent, MeterEvent};

/// Annotates every event with its owning VPP by resolving `nmi` to a site.
///
/// The whole batch either binds or fails: an event whose `nmi` matches no
/// registered site aborts the operation with the lookup error, since a
/// silently dropped event would understate the fee pool. Output order
/// follows input order.
pub fn bind_events(
    registry: &Registry,
    events: &[MeterEvent],
) -> Result<Vec<BoundEvent>, NotFoundError> {
    let mut bound = Vec::with_capacity(events.len());
    for event in events {
        let site = registry.find_site_by_nmi(&event.nmi)?;
        bound.push(BoundEvent {
            nmi: site.nmi.clone(),
            date: event.date.clone(),
            energy: event.energy,
            tariff: event.tariff,
            vpp: site.vpp_name.clone(),
        });
    }
    Ok(bound)
}
