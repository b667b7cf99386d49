// src/domain/mod.rs
pub mod errors;
pub mod model;
pub mod repository;
pub mod service;

// Re-export common types for convenience
pub use errors::{DashboardError, DashboardResult, TransportError, TransportResult};
pub use model::{
    ElementId, EngineStatus, Interval, Notification, NotificationKind, NotificationTimings,
    RenderCommand, Side, SnapshotKind, StartCommand, StatsSnapshot, TradeRecord, ViewModel,
};
pub use repository::{DashboardView, EngineRepository, FormValues};
