// src/domain/model/mod.rs
// Core domain models

pub mod view;

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal::RoundingStrategy;
use rust_decimal_macros::dec;
use tokio::time::Instant;

use crate::domain::errors::{DashboardError, DashboardResult};

pub use view::{ElementId, PnlTone, RenderCommand, TableCell, TableRow, ViewModel};

/// Candle granularity the engine trades on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Interval {
    Minutes1,
    Minutes3,
    Minutes5,
    Minutes15,
    Minutes30,
    Hours1,
    Hours2,
    Hours4,
    Hours6,
    Days1,
    Weeks1,
}

impl Interval {
    pub const ALL: [Interval; 11] = [
        Interval::Minutes1,
        Interval::Minutes3,
        Interval::Minutes5,
        Interval::Minutes15,
        Interval::Minutes30,
        Interval::Hours1,
        Interval::Hours2,
        Interval::Hours4,
        Interval::Hours6,
        Interval::Days1,
        Interval::Weeks1,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Interval::Minutes1 => "1m",
            Interval::Minutes3 => "3m",
            Interval::Minutes5 => "5m",
            Interval::Minutes15 => "15m",
            Interval::Minutes30 => "30m",
            Interval::Hours1 => "1h",
            Interval::Hours2 => "2h",
            Interval::Hours4 => "4h",
            Interval::Hours6 => "6h",
            Interval::Days1 => "1d",
            Interval::Weeks1 => "1w",
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Interval {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let label = s.trim();
        Interval::ALL
            .iter()
            .copied()
            .find(|interval| interval.as_str().eq_ignore_ascii_case(label))
            .ok_or_else(|| DashboardError::Validation(format!("Unknown interval: {}", s)))
    }
}

/// The three independently polled engine snapshots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SnapshotKind {
    Status,
    Stats,
    Trades,
}

impl SnapshotKind {
    pub const ALL: [SnapshotKind; 3] = [SnapshotKind::Status, SnapshotKind::Stats, SnapshotKind::Trades];
}

impl fmt::Display for SnapshotKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SnapshotKind::Status => write!(f, "status"),
            SnapshotKind::Stats => write!(f, "stats"),
            SnapshotKind::Trades => write!(f, "trades"),
        }
    }
}

/// Engine run state as reported by `/api/status`
#[derive(Debug, Clone, PartialEq)]
pub struct EngineStatus {
    pub running: bool,
    pub symbols: BTreeSet<String>,
    /// `None` when the engine runs on a label the selector does not offer
    pub interval: Option<Interval>,
    pub account_balance: Decimal,
}

/// Aggregate performance as reported by `/api/stats`
#[derive(Debug, Clone, PartialEq)]
pub struct StatsSnapshot {
    pub total_pnl: Decimal,
    pub total_trades: u64,
    pub wins: u64,
}

impl StatsSnapshot {
    pub fn new(total_pnl: Decimal, total_trades: u64, wins: u64) -> DashboardResult<Self> {
        if wins > total_trades {
            return Err(DashboardError::Malformed(format!(
                "wins ({}) exceeds total_trades ({})",
                wins, total_trades
            )));
        }

        Ok(Self {
            total_pnl,
            total_trades,
            wins,
        })
    }

    /// Percentage of winning trades rounded to one decimal place, zero when
    /// nothing has traded yet.
    pub fn win_rate(&self) -> Decimal {
        if self.total_trades == 0 {
            return Decimal::ZERO;
        }

        (Decimal::from(self.wins) / Decimal::from(self.total_trades) * dec!(100))
            .round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Long,
    Short,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Long => "LONG",
            Side::Short => "SHORT",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Side {
    type Err = DashboardError;

    // The engine records entries by signal direction, so buy/sell are accepted too.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "long" | "buy" => Ok(Side::Long),
            "short" | "sell" => Ok(Side::Short),
            _ => Err(DashboardError::Malformed(format!("Unknown trade side: {}", s))),
        }
    }
}

/// One closed trade from `/api/trades`
#[derive(Debug, Clone, PartialEq)]
pub struct TradeRecord {
    pub timestamp: DateTime<Utc>,
    pub symbol: String,
    pub side: Side,
    pub entry: Decimal,
    pub exit: Decimal,
    pub quantity: Decimal,
    pub pnl: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
    Info,
}

impl NotificationKind {
    pub fn css_class(&self) -> &'static str {
        match self {
            NotificationKind::Success => "notification-success",
            NotificationKind::Error => "notification-error",
            NotificationKind::Info => "notification-info",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            NotificationKind::Success => write!(f, "success"),
            NotificationKind::Error => write!(f, "error"),
            NotificationKind::Info => write!(f, "info"),
        }
    }
}

/// Lifetime of a notification element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotificationTimings {
    /// Delay between insertion and the enter transition
    pub enter_delay: Duration,

    /// How long the notification stays shown
    pub display: Duration,

    /// Exit transition length before the element is detached
    pub removal: Duration,
}

impl NotificationTimings {
    pub fn ttl(&self) -> Duration {
        self.display + self.removal
    }
}

impl Default for NotificationTimings {
    fn default() -> Self {
        Self {
            enter_delay: Duration::from_millis(10),
            display: Duration::from_millis(3000),
            removal: Duration::from_millis(300),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Notification {
    pub id: u64,
    pub message: String,
    pub kind: NotificationKind,
    pub created_at: Instant,
    pub ttl: Duration,
}

/// Parameters of a start command
#[derive(Debug, Clone, PartialEq)]
pub struct StartCommand {
    pub symbols: Vec<String>,
    pub interval: Interval,
    pub account_balance: Decimal,
}
