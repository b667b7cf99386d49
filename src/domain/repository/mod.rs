// src/domain/repository/mod.rs
// Ports to the trading engine and to the displayed document

use async_trait::async_trait;

use crate::domain::errors::DashboardResult;
use crate::domain::model::{ElementId, EngineStatus, RenderCommand, StartCommand, StatsSnapshot, TradeRecord};

/// Repository interface for the remote trading engine
#[async_trait]
pub trait EngineRepository: Send + Sync {
    /// Ask the engine to start; returns the engine's `ok` acknowledgement
    async fn start(&self, command: &StartCommand) -> DashboardResult<bool>;

    /// Ask the engine to stop; returns the engine's `ok` acknowledgement
    async fn stop(&self) -> DashboardResult<bool>;

    async fn status(&self) -> DashboardResult<EngineStatus>;
    async fn stats(&self) -> DashboardResult<StatsSnapshot>;
    async fn trades(&self) -> DashboardResult<Vec<TradeRecord>>;
}

/// Raw values of the start form controls, as the markup holds them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormValues {
    pub symbols: Vec<String>,
    pub interval: String,
    pub balance: String,
}

/// The displayed document. Writes go through render commands only.
pub trait DashboardView: Send + Sync {
    fn apply(&self, commands: Vec<RenderCommand>);

    /// Text content currently displayed by `element`
    fn text(&self, element: ElementId) -> String;

    fn is_disabled(&self, element: ElementId) -> bool;

    fn form_values(&self) -> FormValues;
}
