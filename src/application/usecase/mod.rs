pub mod command_usecase;
pub mod notification_usecase;
pub mod polling_usecase;
pub mod reconcile_usecase;

// Re-export public API
pub use command_usecase::{CommandDispatcher, CommandOutcome, EMPTY_SELECTION_MESSAGE};
pub use notification_usecase::NotificationQueue;
pub use polling_usecase::{PollingCadence, PollingScheduler};
pub use reconcile_usecase::{SnapshotRefresher, StateReconciler};
