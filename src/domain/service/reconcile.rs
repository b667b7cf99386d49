// src/domain/service/reconcile.rs
// Pure snapshot → render command translation

use std::time::Duration;

use crate::domain::model::view::{CLASS_ACTIVE, CLASS_NO_DATA, CLASS_PNL_NEGATIVE, CLASS_PNL_POSITIVE};
use crate::domain::model::{
    ElementId, EngineStatus, PnlTone, RenderCommand, StatsSnapshot, TableCell, TableRow, TradeRecord,
    ViewModel,
};

use super::format::{self, DisplayZone, BALANCE_CURRENCY, TRADE_CURRENCY};

/// How long a changed stat keeps its update animation
pub const PULSE_DURATION: Duration = Duration::from_millis(600);

pub const NO_TRADES_TEXT: &str = "No trades yet";
pub const TRADE_COLUMNS: u32 = 7;

/// Indicator, control enablement, form selection and balance for a status snapshot
pub fn reconcile_status(status: &EngineStatus) -> Vec<RenderCommand> {
    let mut commands = Vec::with_capacity(8);

    if status.running {
        commands.push(RenderCommand::AddClass {
            element: ElementId::StatusIndicator,
            class: CLASS_ACTIVE,
        });
    } else {
        commands.push(RenderCommand::RemoveClass {
            element: ElementId::StatusIndicator,
            class: CLASS_ACTIVE,
        });
    }

    commands.push(RenderCommand::SetText {
        element: ElementId::StatusText,
        text: if status.running { "Running" } else { "Stopped" }.to_string(),
    });

    // Exactly one of start/stop is enabled
    commands.push(RenderCommand::SetDisabled {
        element: ElementId::StartButton,
        disabled: status.running,
    });
    commands.push(RenderCommand::SetDisabled {
        element: ElementId::StopButton,
        disabled: !status.running,
    });

    commands.push(RenderCommand::SelectOptions {
        element: ElementId::Symbols,
        values: status.symbols.clone(),
    });
    if let Some(interval) = status.interval {
        commands.push(RenderCommand::SetValue {
            element: ElementId::Interval,
            value: interval.to_string(),
        });
    }
    commands.push(RenderCommand::SetText {
        element: ElementId::ActiveBalance,
        text: format::money(BALANCE_CURRENCY, status.account_balance),
    });

    commands
}

/// Stat texts and P&L color. A stat is rewritten and pulsed only when its
/// text differs from what `previous` says is on screen.
pub fn reconcile_stats(previous: &ViewModel, stats: &StatsSnapshot) -> (ViewModel, Vec<RenderCommand>) {
    let next = ViewModel {
        total_pnl: Some(format::money(BALANCE_CURRENCY, stats.total_pnl)),
        total_trades: Some(stats.total_trades.to_string()),
        win_rate: Some(format::win_rate_text(stats)),
    };

    let mut commands = Vec::new();
    for (element, before, after) in [
        (ElementId::TotalPnl, &previous.total_pnl, &next.total_pnl),
        (ElementId::TotalTrades, &previous.total_trades, &next.total_trades),
        (ElementId::WinRate, &previous.win_rate, &next.win_rate),
    ] {
        if before == after {
            continue;
        }
        if let Some(text) = after {
            commands.push(RenderCommand::SetText {
                element,
                text: text.clone(),
            });
            commands.push(RenderCommand::Pulse {
                element,
                duration: PULSE_DURATION,
            });
        }
    }

    commands.push(RenderCommand::RemoveClass {
        element: ElementId::TotalPnl,
        class: CLASS_PNL_POSITIVE,
    });
    commands.push(RenderCommand::RemoveClass {
        element: ElementId::TotalPnl,
        class: CLASS_PNL_NEGATIVE,
    });
    if let Some(class) = PnlTone::of(stats.total_pnl).class() {
        commands.push(RenderCommand::AddClass {
            element: ElementId::TotalPnl,
            class,
        });
    }

    (next, commands)
}

/// Full trade table in engine order, or the placeholder row when empty
pub fn reconcile_trades(trades: &[TradeRecord], zone: DisplayZone) -> Vec<RenderCommand> {
    let rows = if trades.is_empty() {
        vec![TableRow {
            cells: vec![TableCell::new(NO_TRADES_TEXT)
                .with_class(Some(CLASS_NO_DATA))
                .with_colspan(TRADE_COLUMNS)],
        }]
    } else {
        trades.iter().map(|trade| trade_row(trade, zone)).collect()
    };

    vec![RenderCommand::SetRows {
        element: ElementId::TradesBody,
        rows,
    }]
}

fn trade_row(trade: &TradeRecord, zone: DisplayZone) -> TableRow {
    TableRow {
        cells: vec![
            TableCell::new(format::timestamp(&trade.timestamp, zone)),
            TableCell::new(trade.symbol.clone()),
            TableCell::new(trade.side.as_str()),
            TableCell::new(format!("{}{}", TRADE_CURRENCY, format::fixed(trade.entry, 2))),
            TableCell::new(format!("{}{}", TRADE_CURRENCY, format::fixed(trade.exit, 2))),
            TableCell::new(format::fixed(trade.quantity, 6)),
            TableCell::new(format::signed_money(TRADE_CURRENCY, trade.pnl))
                .with_class(PnlTone::of(trade.pnl).class()),
        ],
    }
}
