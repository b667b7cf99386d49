// src/test_support.rs
// Shared fakes for unit tests

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rust_decimal_macros::dec;
use tokio::sync::Notify;

use crate::domain::errors::{DashboardResult, TransportError};
use crate::domain::model::{EngineStatus, Interval, StartCommand, StatsSnapshot, TradeRecord};
use crate::domain::repository::EngineRepository;
use crate::infrastructure::view::{DashboardMarkup, Document};

pub(crate) fn document() -> Arc<Document> {
    Arc::new(Document::new(DashboardMarkup {
        symbols: vec!["ETHUSD".to_string(), "BTCUSD".to_string()],
        interval: Interval::Minutes5,
        balance: dec!(300),
    }))
}

/// In-memory engine. Acknowledges commands like the real engine and can be
/// switched to transport failures or negative acks.
pub(crate) struct FakeEngine {
    pub status: Mutex<EngineStatus>,
    pub stats: Mutex<StatsSnapshot>,
    pub trades: Mutex<Vec<TradeRecord>>,
    pub calls: Mutex<Vec<String>>,
    pub starts: Mutex<Vec<StartCommand>>,
    pub unreachable: AtomicBool,
    pub reject_commands: AtomicBool,
    /// When set, commands wait for `release` before answering
    pub gated: AtomicBool,
    pub release: Notify,
}

impl FakeEngine {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            status: Mutex::new(EngineStatus {
                running: false,
                symbols: BTreeSet::new(),
                interval: Some(Interval::Minutes1),
                account_balance: dec!(1000),
            }),
            stats: Mutex::new(StatsSnapshot {
                total_pnl: dec!(0),
                total_trades: 0,
                wins: 0,
            }),
            trades: Mutex::new(Vec::new()),
            calls: Mutex::new(Vec::new()),
            starts: Mutex::new(Vec::new()),
            unreachable: AtomicBool::new(false),
            reject_commands: AtomicBool::new(false),
            gated: AtomicBool::new(false),
            release: Notify::new(),
        })
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, name: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| c.as_str() == name).count()
    }

    fn record(&self, name: &str) -> DashboardResult<()> {
        self.calls.lock().unwrap().push(name.to_string());
        if self.unreachable.load(Ordering::SeqCst) {
            return Err(TransportError::Request("connection refused".to_string()).into());
        }
        Ok(())
    }

    async fn command_gate(&self) {
        if self.gated.load(Ordering::SeqCst) {
            self.release.notified().await;
        }
    }
}

#[async_trait]
impl EngineRepository for FakeEngine {
    async fn start(&self, command: &StartCommand) -> DashboardResult<bool> {
        self.record("start")?;
        self.command_gate().await;
        self.starts.lock().unwrap().push(command.clone());
        if self.reject_commands.load(Ordering::SeqCst) {
            return Ok(false);
        }

        let mut status = self.status.lock().unwrap();
        status.running = true;
        status.symbols = command.symbols.iter().cloned().collect();
        status.interval = Some(command.interval);
        status.account_balance = command.account_balance;
        Ok(true)
    }

    async fn stop(&self) -> DashboardResult<bool> {
        self.record("stop")?;
        self.command_gate().await;
        if self.reject_commands.load(Ordering::SeqCst) {
            return Ok(false);
        }

        self.status.lock().unwrap().running = false;
        Ok(true)
    }

    async fn status(&self) -> DashboardResult<EngineStatus> {
        self.record("status")?;
        Ok(self.status.lock().unwrap().clone())
    }

    async fn stats(&self) -> DashboardResult<StatsSnapshot> {
        self.record("stats")?;
        Ok(self.stats.lock().unwrap().clone())
    }

    async fn trades(&self) -> DashboardResult<Vec<TradeRecord>> {
        self.record("trades")?;
        Ok(self.trades.lock().unwrap().clone())
    }
}
