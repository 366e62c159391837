//! Metering-fee settlement for virtual-power-plant revenue sharing.
//!
//! Tracks VPPs, their member sites, and registered batteries, and computes
//! how a month's metering fees split between the VPP operator and its
//! battery-owning sites.

pub mod config;
/// CSV ingestion and report export.
pub mod io;
pub mod registry;
pub mod settlement;

#[cfg(feature = "api")]
pub mod api;
