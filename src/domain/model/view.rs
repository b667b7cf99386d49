// src/domain/model/view.rs
// View-side models: element identifiers, render commands and change tracking

use std::collections::BTreeSet;
use std::fmt;
use std::time::Duration;

use rust_decimal::Decimal;

use super::NotificationKind;

pub const CLASS_ACTIVE: &str = "active";
pub const CLASS_LOADING: &str = "loading";
pub const CLASS_PNL_POSITIVE: &str = "pnl-positive";
pub const CLASS_PNL_NEGATIVE: &str = "pnl-negative";
pub const CLASS_STAT_UPDATING: &str = "stat-updating";
pub const CLASS_SHOW: &str = "show";
pub const CLASS_NO_DATA: &str = "no-data";

/// Named regions of the dashboard markup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ElementId {
    StartButton,
    StopButton,
    StatusIndicator,
    StatusText,
    Symbols,
    Interval,
    Balance,
    ActiveBalance,
    TotalPnl,
    TotalTrades,
    WinRate,
    TradesBody,
}

impl ElementId {
    pub const ALL: [ElementId; 12] = [
        ElementId::StartButton,
        ElementId::StopButton,
        ElementId::StatusIndicator,
        ElementId::StatusText,
        ElementId::Symbols,
        ElementId::Interval,
        ElementId::Balance,
        ElementId::ActiveBalance,
        ElementId::TotalPnl,
        ElementId::TotalTrades,
        ElementId::WinRate,
        ElementId::TradesBody,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ElementId::StartButton => "start-btn",
            ElementId::StopButton => "stop-btn",
            ElementId::StatusIndicator => "status-indicator",
            ElementId::StatusText => "status-text",
            ElementId::Symbols => "symbols",
            ElementId::Interval => "interval",
            ElementId::Balance => "balance",
            ElementId::ActiveBalance => "active-balance",
            ElementId::TotalPnl => "total-pnl",
            ElementId::TotalTrades => "total-trades",
            ElementId::WinRate => "win-rate",
            ElementId::TradesBody => "trades-body",
        }
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "#{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableCell {
    pub text: String,
    pub class: Option<&'static str>,
    pub colspan: Option<u32>,
}

impl TableCell {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            class: None,
            colspan: None,
        }
    }

    pub fn with_class(mut self, class: Option<&'static str>) -> Self {
        self.class = class;
        self
    }

    pub fn with_colspan(mut self, colspan: u32) -> Self {
        self.colspan = Some(colspan);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    pub cells: Vec<TableCell>,
}

/// A single mutation of the displayed document
#[derive(Debug, Clone, PartialEq)]
pub enum RenderCommand {
    SetText { element: ElementId, text: String },
    AddClass { element: ElementId, class: &'static str },
    RemoveClass { element: ElementId, class: &'static str },
    SetDisabled { element: ElementId, disabled: bool },
    SelectOptions { element: ElementId, values: BTreeSet<String> },
    SetValue { element: ElementId, value: String },
    SetRows { element: ElementId, rows: Vec<TableRow> },
    /// Flash the changed-value animation for `duration`
    Pulse { element: ElementId, duration: Duration },
    AppendNotification { id: u64, message: String, kind: NotificationKind },
    ShowNotification { id: u64 },
    HideNotification { id: u64 },
    RemoveNotification { id: u64 },
}

/// Sign of a profit figure, driving its color class
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PnlTone {
    Positive,
    Negative,
    Neutral,
}

impl PnlTone {
    pub fn of(value: Decimal) -> Self {
        if value.is_zero() {
            PnlTone::Neutral
        } else if value.is_sign_negative() {
            PnlTone::Negative
        } else {
            PnlTone::Positive
        }
    }

    pub fn class(&self) -> Option<&'static str> {
        match self {
            PnlTone::Positive => Some(CLASS_PNL_POSITIVE),
            PnlTone::Negative => Some(CLASS_PNL_NEGATIVE),
            PnlTone::Neutral => None,
        }
    }
}

/// Last strings rendered for each animated stat. Only used to decide whether
/// a new snapshot changes what is on screen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewModel {
    pub total_pnl: Option<String>,
    pub total_trades: Option<String>,
    pub win_rate: Option<String>,
}
