// src/domain/service/format.rs
// Display formatting for engine figures

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Local, Utc};
use rust_decimal::{Decimal, RoundingStrategy};

use crate::domain::errors::DashboardError;
use crate::domain::model::{PnlTone, StatsSnapshot};

pub const BALANCE_CURRENCY: &str = "₹";
pub const TRADE_CURRENCY: &str = "$";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Zone trade timestamps are shown in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayZone {
    #[default]
    Local,
    Utc,
}

impl fmt::Display for DisplayZone {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DisplayZone::Local => write!(f, "local"),
            DisplayZone::Utc => write!(f, "utc"),
        }
    }
}

impl FromStr for DisplayZone {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(DisplayZone::Local),
            "utc" => Ok(DisplayZone::Utc),
            _ => Err(DashboardError::Config(format!("Unknown display zone: {}", s))),
        }
    }
}

/// `value` rounded half away from zero to `dp` places, zero-padded.
/// A value that rounds to zero never carries a minus sign.
pub fn fixed(value: Decimal, dp: u32) -> String {
    let rounded = value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero);
    let digits = format!("{:.prec$}", rounded.abs(), prec = dp as usize);
    if rounded.is_sign_negative() && !rounded.is_zero() {
        format!("-{}", digits)
    } else {
        digits
    }
}

/// Currency amount with two decimals, sign ahead of the symbol: `-₹12.50`
pub fn money(currency: &str, value: Decimal) -> String {
    let rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() { "-" } else { "" };
    format!("{}{}{}", sign, currency, fixed(rounded.abs(), 2))
}

/// Currency amount with an explicit sign taken from the raw value:
/// `+$25.50`, `-$10.00`, `$0.00`
pub fn signed_money(currency: &str, value: Decimal) -> String {
    let sign = match PnlTone::of(value) {
        PnlTone::Positive => "+",
        PnlTone::Negative => "-",
        PnlTone::Neutral => "",
    };
    format!("{}{}{}", sign, currency, fixed(value.abs(), 2))
}

pub fn win_rate_text(stats: &StatsSnapshot) -> String {
    if stats.total_trades == 0 {
        return "0%".to_string();
    }
    format!("{}%", fixed(stats.win_rate(), 1))
}

pub fn timestamp(ts: &DateTime<Utc>, zone: DisplayZone) -> String {
    match zone {
        DisplayZone::Local => ts.with_timezone(&Local).format(TIMESTAMP_FORMAT).to_string(),
        DisplayZone::Utc => ts.format(TIMESTAMP_FORMAT).to_string(),
    }
}
