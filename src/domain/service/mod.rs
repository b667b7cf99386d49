// src/domain/service/mod.rs
// Domain services: formatting and reconciliation

pub mod format;
pub mod reconcile;

pub use format::DisplayZone;
pub use reconcile::{reconcile_stats, reconcile_status, reconcile_trades, PULSE_DURATION};
