// src/application/dto/parser.rs
// Conversions between wire DTOs and domain snapshots

use chrono::{DateTime, NaiveDateTime, Utc};
use rust_decimal::Decimal;

use super::{StartRequest, StatsResponse, StatusResponse, TradeRow, TradesResponse};
use crate::domain::errors::{DashboardError, DashboardResult};
use crate::domain::model::{EngineStatus, Interval, Side, StartCommand, StatsSnapshot, TradeRecord};

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parse an engine body, reporting anything that is not the expected JSON as malformed
pub fn parse_body<T: serde::de::DeserializeOwned>(body: &[u8]) -> DashboardResult<T> {
    serde_json::from_slice(body).map_err(|e| {
        let preview: String = String::from_utf8_lossy(body).chars().take(120).collect();
        DashboardError::Malformed(format!("{} in body {:?}", e, preview))
    })
}

/// Engine timestamps are naive UTC (`2024-05-01T09:30:00.123456`); RFC 3339 is accepted too.
pub fn parse_timestamp(value: &str) -> DashboardResult<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Ok(ts.with_timezone(&Utc));
    }

    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .map(|naive| naive.and_utc())
        .ok_or_else(|| DashboardError::Malformed(format!("Invalid ts_utc: {}", value)))
}

impl From<&StartCommand> for StartRequest {
    fn from(command: &StartCommand) -> Self {
        Self {
            symbols: command.symbols.clone(),
            interval: command.interval.to_string(),
            account_balance: command.account_balance,
        }
    }
}

impl TryFrom<StatusResponse> for EngineStatus {
    type Error = DashboardError;

    fn try_from(response: StatusResponse) -> Result<Self, Self::Error> {
        let interval = match response.interval.parse::<Interval>() {
            Ok(interval) => Some(interval),
            Err(_) => {
                log::warn!("Engine reports unknown interval {:?}, leaving the selector as is", response.interval);
                None
            }
        };

        Ok(EngineStatus {
            running: response.running,
            symbols: response.symbols.into_iter().collect(),
            interval,
            account_balance: response.account_balance,
        })
    }
}

impl TryFrom<StatsResponse> for StatsSnapshot {
    type Error = DashboardError;

    fn try_from(response: StatsResponse) -> Result<Self, Self::Error> {
        StatsSnapshot::new(response.total_pnl, response.total_trades, response.wins)
    }
}

impl TryFrom<TradeRow> for TradeRecord {
    type Error = DashboardError;

    fn try_from(row: TradeRow) -> Result<Self, Self::Error> {
        let positive = |value: Decimal, field: &str| -> DashboardResult<Decimal> {
            if value > Decimal::ZERO {
                Ok(value)
            } else {
                Err(DashboardError::Malformed(format!(
                    "{} must be positive, got {} for {}",
                    field, value, row.symbol
                )))
            }
        };

        Ok(TradeRecord {
            timestamp: parse_timestamp(&row.ts_utc)?,
            side: row.side.parse::<Side>()?,
            entry: positive(row.entry, "entry")?,
            exit: positive(row.exit, "exit")?,
            quantity: positive(row.qty, "qty")?,
            pnl: row.pnl,
            symbol: row.symbol,
        })
    }
}

impl TryFrom<TradesResponse> for Vec<TradeRecord> {
    type Error = DashboardError;

    fn try_from(response: TradesResponse) -> Result<Self, Self::Error> {
        response.rows.into_iter().map(TradeRecord::try_from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    #[test]
    fn test_status_body() {
        let body = br#"{"running": false, "symbols": [], "interval": "1m", "account_balance": 1000}"#;
        let response: StatusResponse = parse_body(body).unwrap();
        let status = EngineStatus::try_from(response).unwrap();

        assert!(!status.running);
        assert!(status.symbols.is_empty());
        assert_eq!(status.interval, Some(Interval::Minutes1));
        assert_eq!(status.account_balance, dec!(1000));
    }

    #[test]
    fn test_status_with_unknown_interval_keeps_the_rest() {
        let body = br#"{"running": true, "symbols": ["ETHUSD"], "interval": "2d", "account_balance": 750}"#;
        let response: StatusResponse = parse_body(body).unwrap();
        let status = EngineStatus::try_from(response).unwrap();

        assert!(status.running);
        assert_eq!(status.interval, None);
        assert!(status.symbols.contains("ETHUSD"));
        assert_eq!(status.account_balance, dec!(750));
    }

    #[test]
    fn test_stats_body_ignores_extra_fields() {
        let body = br#"{"period": "last_7_days", "total_pnl": -12.75, "total_trades": 5,
                        "wins": 2, "losses": 3, "rows": []}"#;
        let response: StatsResponse = parse_body(body).unwrap();
        let stats = StatsSnapshot::try_from(response).unwrap();

        assert_eq!(stats.total_pnl, dec!(-12.75));
        assert_eq!(stats.total_trades, 5);
        assert_eq!(stats.wins, 2);
    }

    #[test]
    fn test_inconsistent_stats_are_malformed() {
        let body = br#"{"total_pnl": 1.0, "total_trades": 1, "wins": 2}"#;
        let response: StatsResponse = parse_body(body).unwrap();
        assert!(matches!(StatsSnapshot::try_from(response), Err(DashboardError::Malformed(_))));
    }

    #[test]
    fn test_trades_body() {
        let body = br#"{"rows": [{"ts_utc": "2024-05-01T09:30:00.123456", "symbol": "ETHUSD",
                        "side": "BUY", "entry": 3000.0, "exit": 3051.0, "qty": 0.5, "pnl": 25.5}]}"#;
        let response: TradesResponse = parse_body(body).unwrap();
        let trades = Vec::<TradeRecord>::try_from(response).unwrap();

        assert_eq!(trades.len(), 1);
        assert_eq!(trades[0].side, Side::Long);
        assert_eq!(trades[0].pnl, dec!(25.5));
        assert_eq!(trades[0].quantity, dec!(0.5));
    }

    #[test]
    fn test_trade_with_zero_entry_is_malformed() {
        let row = TradeRow {
            ts_utc: "2024-05-01T09:30:00".to_string(),
            symbol: "ETHUSD".to_string(),
            side: "SELL".to_string(),
            entry: dec!(0),
            exit: dec!(1),
            qty: dec!(1),
            pnl: dec!(-1),
        };
        assert!(matches!(TradeRecord::try_from(row), Err(DashboardError::Malformed(_))));
    }

    #[test]
    fn test_non_json_body_is_malformed() {
        let result: DashboardResult<StatusResponse> = parse_body(b"<html>502 Bad Gateway</html>");
        assert!(matches!(result, Err(DashboardError::Malformed(_))));
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let expected = Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap();
        assert_eq!(parse_timestamp("2024-05-01T09:30:00").unwrap(), expected);
        assert_eq!(parse_timestamp("2024-05-01 09:30:00").unwrap(), expected);
        assert_eq!(parse_timestamp("2024-05-01T11:30:00+02:00").unwrap(), expected);
        assert!(parse_timestamp("yesterday").is_err());
    }

    #[test]
    fn test_start_request_serializes_balance_as_number() {
        let command = StartCommand {
            symbols: vec!["ETHUSD".to_string()],
            interval: Interval::Minutes5,
            account_balance: dec!(300),
        };
        let json = serde_json::to_value(StartRequest::from(&command)).unwrap();

        assert_eq!(
            json,
            serde_json::json!({"symbols": ["ETHUSD"], "interval": "5m", "account_balance": 300.0})
        );
    }
}
