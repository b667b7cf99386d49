// src/adapter/controller.rs
// Dashboard composition root: wiring, input events and lifecycle

use std::str::FromStr;
use std::sync::Arc;

use rust_decimal::Decimal;

use crate::application::usecase::{
    CommandDispatcher, CommandOutcome, NotificationQueue, PollingCadence, PollingScheduler, StateReconciler,
    EMPTY_SELECTION_MESSAGE,
};
use crate::domain::errors::{DashboardError, DashboardResult};
use crate::domain::model::{ElementId, Interval, NotificationTimings, StartCommand};
use crate::domain::repository::{DashboardView, EngineRepository, FormValues};
use crate::domain::service::DisplayZone;

#[derive(Debug, Clone, Copy, Default)]
pub struct ControllerSettings {
    pub cadence: PollingCadence,
    pub timings: NotificationTimings,
    pub zone: DisplayZone,
}

pub struct DashboardController {
    view: Arc<dyn DashboardView>,
    reconciler: Arc<StateReconciler>,
    dispatcher: CommandDispatcher,
    scheduler: PollingScheduler,
}

impl DashboardController {
    pub fn new(engine: Arc<dyn EngineRepository>, view: Arc<dyn DashboardView>, settings: ControllerSettings) -> Self {
        let reconciler = Arc::new(StateReconciler::new(engine.clone(), view.clone(), settings.zone));
        let notifications = Arc::new(NotificationQueue::new(view.clone(), settings.timings));
        let dispatcher = CommandDispatcher::new(engine, view.clone(), reconciler.clone(), notifications);
        let scheduler = PollingScheduler::new(reconciler.clone(), settings.cadence);

        Self {
            view,
            reconciler,
            dispatcher,
            scheduler,
        }
    }

    /// Render every snapshot once, then keep them fresh in the background
    pub async fn init(&self) {
        log::info!("Loading initial dashboard state");
        self.reconciler.refresh_all().await;
        self.scheduler.start();
    }

    /// Start button pressed. `None` when the control is disabled.
    pub async fn on_start_requested(&self) -> Option<CommandOutcome> {
        if self.view.is_disabled(ElementId::StartButton) {
            log::debug!("Start ignored, control disabled");
            return None;
        }

        let outcome = match start_command(&self.view.form_values()) {
            Ok(command) => {
                self.dispatcher
                    .start_trading(command.symbols, command.interval, command.account_balance)
                    .await
            }
            Err(e) => self.dispatcher.reject(e),
        };
        Some(outcome)
    }

    /// Stop button pressed. `None` when the control is disabled.
    pub async fn on_stop_requested(&self) -> Option<CommandOutcome> {
        if self.view.is_disabled(ElementId::StopButton) {
            log::debug!("Stop ignored, control disabled");
            return None;
        }

        Some(self.dispatcher.stop_trading().await)
    }

    /// One immediate pass over every snapshot kind
    pub async fn refresh(&self) {
        self.reconciler.refresh_all().await;
    }

    pub fn is_polling(&self) -> bool {
        self.scheduler.is_running()
    }

    pub fn shutdown(&self) {
        log::info!("Stopping dashboard polling");
        self.scheduler.stop();
    }
}

/// Read the start form. Selection is checked first, then interval and balance.
fn start_command(form: &FormValues) -> DashboardResult<StartCommand> {
    if form.symbols.is_empty() {
        return Err(DashboardError::Validation(EMPTY_SELECTION_MESSAGE.to_string()));
    }

    let interval = Interval::from_str(&form.interval)?;
    let account_balance = Decimal::from_str(form.balance.trim())
        .ok()
        .filter(|balance| *balance > Decimal::ZERO)
        .ok_or_else(|| DashboardError::Validation(format!("Invalid account balance: {}", form.balance)))?;

    Ok(StartCommand {
        symbols: form.symbols.clone(),
        interval,
        account_balance,
    })
}
