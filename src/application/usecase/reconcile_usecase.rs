// src/application/usecase/reconcile_usecase.rs
// Fetch-and-render passes for each engine snapshot

use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;

use crate::domain::errors::DashboardResult;
use crate::domain::model::{ElementId, SnapshotKind, ViewModel};
use crate::domain::repository::{DashboardView, EngineRepository};
use crate::domain::service::{reconcile_stats, reconcile_status, reconcile_trades, DisplayZone};

/// Something that can bring one kind of snapshot on screen up to date
#[async_trait]
pub trait SnapshotRefresher: Send + Sync {
    /// Never fails: errors are logged and the previous rendering stays.
    async fn refresh(&self, kind: SnapshotKind);
}

pub struct StateReconciler {
    engine: Arc<dyn EngineRepository>,
    view: Arc<dyn DashboardView>,
    view_model: Mutex<ViewModel>,
    zone: DisplayZone,
}

impl StateReconciler {
    pub fn new(engine: Arc<dyn EngineRepository>, view: Arc<dyn DashboardView>, zone: DisplayZone) -> Self {
        // Change detection starts from whatever the page currently shows
        let view_model = ViewModel {
            total_pnl: Some(view.text(ElementId::TotalPnl)),
            total_trades: Some(view.text(ElementId::TotalTrades)),
            win_rate: Some(view.text(ElementId::WinRate)),
        };

        Self {
            engine,
            view,
            view_model: Mutex::new(view_model),
            zone,
        }
    }

    pub async fn refresh_status(&self) {
        if let Err(e) = self.try_refresh_status().await {
            log::warn!("Error updating status: {}", e);
        }
    }

    pub async fn refresh_stats(&self) {
        if let Err(e) = self.try_refresh_stats().await {
            log::warn!("Error updating stats: {}", e);
        }
    }

    pub async fn refresh_trades(&self) {
        if let Err(e) = self.try_refresh_trades().await {
            log::warn!("Error updating trades: {}", e);
        }
    }

    /// One pass over every snapshot kind. The three fetches run concurrently.
    pub async fn refresh_all(&self) {
        tokio::join!(self.refresh_status(), self.refresh_stats(), self.refresh_trades());
    }

    async fn try_refresh_status(&self) -> DashboardResult<()> {
        let status = self.engine.status().await?;
        log::debug!("Status: running={} symbols={:?} interval={:?}", status.running, status.symbols, status.interval);
        self.view.apply(reconcile_status(&status));
        Ok(())
    }

    async fn try_refresh_stats(&self) -> DashboardResult<()> {
        let stats = self.engine.stats().await?;

        let commands = {
            let mut view_model = self.view_model.lock().unwrap_or_else(PoisonError::into_inner);
            let (next, commands) = reconcile_stats(&view_model, &stats);
            *view_model = next;
            commands
        };

        self.view.apply(commands);
        Ok(())
    }

    async fn try_refresh_trades(&self) -> DashboardResult<()> {
        let trades = self.engine.trades().await?;
        log::debug!("Rendering {} trades", trades.len());
        self.view.apply(reconcile_trades(&trades, self.zone));
        Ok(())
    }
}

#[async_trait]
impl SnapshotRefresher for StateReconciler {
    async fn refresh(&self, kind: SnapshotKind) {
        match kind {
            SnapshotKind::Status => self.refresh_status().await,
            SnapshotKind::Stats => self.refresh_stats().await,
            SnapshotKind::Trades => self.refresh_trades().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::view::{CLASS_ACTIVE, CLASS_PNL_NEGATIVE, CLASS_STAT_UPDATING};
    use crate::domain::model::{Side, StatsSnapshot, TradeRecord};
    use crate::domain::service::reconcile::NO_TRADES_TEXT;
    use crate::infrastructure::view::Document;
    use crate::test_support::{self, FakeEngine};
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    fn reconciler(engine: &Arc<FakeEngine>, document: &Arc<Document>) -> StateReconciler {
        StateReconciler::new(engine.clone(), document.clone(), DisplayZone::Utc)
    }

    #[tokio::test]
    async fn test_status_renders_stopped_engine() {
        let engine = FakeEngine::new();
        let document = test_support::document();

        reconciler(&engine, &document).refresh_status().await;

        assert!(!document.is_disabled(ElementId::StartButton));
        assert!(document.is_disabled(ElementId::StopButton));
        assert_eq!(document.text(ElementId::ActiveBalance), "₹1000.00");
        assert_eq!(document.text(ElementId::StatusText), "Stopped");
        assert_eq!(document.form_values().interval, "1m");
    }

    #[tokio::test]
    async fn test_status_renders_running_engine() {
        let engine = FakeEngine::new();
        {
            let mut status = engine.status.lock().unwrap();
            status.running = true;
            status.symbols = ["ETHUSD".to_string()].into_iter().collect();
        }
        let document = test_support::document();

        reconciler(&engine, &document).refresh_status().await;

        assert!(document.is_disabled(ElementId::StartButton));
        assert!(!document.is_disabled(ElementId::StopButton));
        assert!(document.has_class(ElementId::StatusIndicator, CLASS_ACTIVE));
        assert_eq!(document.form_values().symbols, vec!["ETHUSD".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unchanged_stats_do_not_pulse_again() {
        let engine = FakeEngine::new();
        *engine.stats.lock().unwrap() = StatsSnapshot::new(dec!(-7.5), 4, 1).unwrap();
        let document = test_support::document();
        let reconciler = reconciler(&engine, &document);

        reconciler.refresh_stats().await;
        assert_eq!(document.text(ElementId::TotalPnl), "-₹7.50");
        assert_eq!(document.text(ElementId::WinRate), "25.0%");
        assert!(document.has_class(ElementId::TotalPnl, CLASS_STAT_UPDATING));
        assert!(document.has_class(ElementId::TotalPnl, CLASS_PNL_NEGATIVE));

        tokio::time::sleep(Duration::from_millis(700)).await;
        assert!(!document.has_class(ElementId::TotalPnl, CLASS_STAT_UPDATING));

        reconciler.refresh_stats().await;
        assert!(!document.has_class(ElementId::TotalPnl, CLASS_STAT_UPDATING));
        assert!(!document.has_class(ElementId::TotalTrades, CLASS_STAT_UPDATING));
        assert!(!document.has_class(ElementId::WinRate, CLASS_STAT_UPDATING));
    }

    #[tokio::test]
    async fn test_stats_matching_markup_do_not_pulse() {
        let engine = FakeEngine::new();
        let document = test_support::document();

        reconciler(&engine, &document).refresh_stats().await;

        assert_eq!(document.text(ElementId::TotalTrades), "0");
        assert!(!document.has_class(ElementId::TotalTrades, CLASS_STAT_UPDATING));
        assert!(!document.has_class(ElementId::WinRate, CLASS_STAT_UPDATING));
    }

    #[tokio::test]
    async fn test_empty_trades_show_placeholder() {
        let engine = FakeEngine::new();
        let document = test_support::document();

        reconciler(&engine, &document).refresh_trades().await;

        let rows = document.rows(ElementId::TradesBody);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].cells[0].text, NO_TRADES_TEXT);
    }

    #[tokio::test]
    async fn test_failed_fetch_keeps_previous_rendering() {
        let engine = FakeEngine::new();
        engine.trades.lock().unwrap().push(TradeRecord {
            timestamp: Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap(),
            symbol: "BTCUSD".to_string(),
            side: Side::Short,
            entry: dec!(60000),
            exit: dec!(59000),
            quantity: dec!(0.01),
            pnl: dec!(10),
        });
        let document = test_support::document();
        let reconciler = reconciler(&engine, &document);

        reconciler.refresh_all().await;
        let before = document.to_string();

        engine.unreachable.store(true, Ordering::SeqCst);
        *engine.stats.lock().unwrap() = StatsSnapshot::new(dec!(99), 9, 9).unwrap();
        reconciler.refresh_all().await;

        assert_eq!(document.to_string(), before);
        assert!(document.notifications().is_empty());
        assert_eq!(document.rows(ElementId::TradesBody)[0].cells[1].text, "BTCUSD");
    }

    #[tokio::test]
    async fn test_refresh_dispatches_by_kind() {
        let engine = FakeEngine::new();
        let document = test_support::document();
        let reconciler = reconciler(&engine, &document);

        reconciler.refresh(SnapshotKind::Trades).await;
        reconciler.refresh(SnapshotKind::Status).await;

        assert_eq!(engine.calls(), vec!["trades".to_string(), "status".to_string()]);
    }
}
