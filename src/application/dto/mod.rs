// src/application/dto/mod.rs
// Wire types of the engine's JSON API

pub mod parser;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Body of `POST /api/start`
#[derive(Debug, Clone, Serialize)]
pub struct StartRequest {
    pub symbols: Vec<String>,
    pub interval: String,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub account_balance: Decimal,
}

/// Body of `POST /api/stop`
#[derive(Debug, Clone, Default, Serialize)]
pub struct StopRequest {}

/// Acknowledgement of a start/stop command
#[derive(Debug, Clone, Deserialize)]
pub struct AckResponse {
    pub ok: bool,
}

/// Response of `GET /api/status`
#[derive(Debug, Clone, Deserialize)]
pub struct StatusResponse {
    pub running: bool,
    pub symbols: Vec<String>,
    pub interval: String,
    pub account_balance: Decimal,
}

/// Response of `GET /api/stats`
#[derive(Debug, Clone, Deserialize)]
pub struct StatsResponse {
    pub total_pnl: Decimal,
    pub total_trades: u64,
    pub wins: u64,
}

/// Response of `GET /api/trades`
#[derive(Debug, Clone, Deserialize)]
pub struct TradesResponse {
    pub rows: Vec<TradeRow>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TradeRow {
    pub ts_utc: String,
    pub symbol: String,
    pub side: String,
    pub entry: Decimal,
    pub exit: Decimal,
    pub qty: Decimal,
    pub pnl: Decimal,
}
