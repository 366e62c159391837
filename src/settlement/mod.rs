//! Fee settlement pipeline: event binding, allocation, and report assembly.

mod binder;
mod engine;
mod event;
mod report;

pub use binder::bind_events;
pub use engine::{
    BILLING_DAYS_PER_MONTH, DIRECT_SITE_SHARE, InvalidStateError, MonthlyAllocation, ReportError,
    SettlementEngine, SiteAllocation,
};
pub use event::{BoundEvent, MeterEvent};
pub use report::{FEE_DECIMAL_PLACES, SettlementReport, SiteFees, render_fee};
