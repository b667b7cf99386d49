// src/application/usecase/command_usecase.rs
// Start/stop commands with optimistic control locking

use std::sync::Arc;

use rust_decimal::Decimal;

use crate::application::usecase::notification_usecase::NotificationQueue;
use crate::application::usecase::reconcile_usecase::StateReconciler;
use crate::domain::errors::{DashboardError, DashboardResult};
use crate::domain::model::view::CLASS_LOADING;
use crate::domain::model::{ElementId, Interval, RenderCommand, StartCommand};
use crate::domain::repository::{DashboardView, EngineRepository};

pub const EMPTY_SELECTION_MESSAGE: &str = "Please select at least one symbol";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    /// Refused locally, nothing was sent
    Rejected,
    /// Engine answered `ok: true`
    Acknowledged,
    /// Negative acknowledgement or transport failure
    Failed,
}

#[derive(Debug, Clone)]
enum EngineCommand {
    Start(StartCommand),
    Stop,
}

impl EngineCommand {
    fn control(&self) -> ElementId {
        match self {
            EngineCommand::Start(_) => ElementId::StartButton,
            EngineCommand::Stop => ElementId::StopButton,
        }
    }

    fn verb(&self) -> &'static str {
        match self {
            EngineCommand::Start(_) => "start",
            EngineCommand::Stop => "stop",
        }
    }

    fn success_message(&self) -> &'static str {
        match self {
            EngineCommand::Start(_) => "Trading started successfully",
            EngineCommand::Stop => "Trading stopped successfully",
        }
    }

    fn failure_message(&self) -> &'static str {
        match self {
            EngineCommand::Start(_) => "Failed to start trading",
            EngineCommand::Stop => "Failed to stop trading",
        }
    }

    /// Control states once the engine has acknowledged
    fn settled_controls(&self) -> Vec<RenderCommand> {
        let running = matches!(self, EngineCommand::Start(_));
        vec![
            RenderCommand::SetDisabled {
                element: ElementId::StartButton,
                disabled: running,
            },
            RenderCommand::SetDisabled {
                element: ElementId::StopButton,
                disabled: !running,
            },
        ]
    }
}

/// Disables a control and marks it busy for as long as it is held. The busy
/// marker is cleared on drop whatever the outcome; enablement is left to the
/// caller and to the next status reconciliation.
struct BusyGuard<'a> {
    view: &'a dyn DashboardView,
    control: ElementId,
}

impl<'a> BusyGuard<'a> {
    fn acquire(view: &'a dyn DashboardView, control: ElementId) -> Self {
        view.apply(vec![
            RenderCommand::AddClass {
                element: control,
                class: CLASS_LOADING,
            },
            RenderCommand::SetDisabled {
                element: control,
                disabled: true,
            },
        ]);
        Self { view, control }
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.view.apply(vec![RenderCommand::RemoveClass {
            element: self.control,
            class: CLASS_LOADING,
        }]);
    }
}

pub struct CommandDispatcher {
    engine: Arc<dyn EngineRepository>,
    view: Arc<dyn DashboardView>,
    reconciler: Arc<StateReconciler>,
    notifications: Arc<NotificationQueue>,
}

impl CommandDispatcher {
    pub fn new(
        engine: Arc<dyn EngineRepository>,
        view: Arc<dyn DashboardView>,
        reconciler: Arc<StateReconciler>,
        notifications: Arc<NotificationQueue>,
    ) -> Self {
        Self {
            engine,
            view,
            reconciler,
            notifications,
        }
    }

    pub async fn start_trading(&self, symbols: Vec<String>, interval: Interval, balance: Decimal) -> CommandOutcome {
        if symbols.is_empty() {
            return self.reject(DashboardError::Validation(EMPTY_SELECTION_MESSAGE.to_string()));
        }

        self.dispatch(EngineCommand::Start(StartCommand {
            symbols,
            interval,
            account_balance: balance,
        }))
        .await
    }

    pub async fn stop_trading(&self) -> CommandOutcome {
        self.dispatch(EngineCommand::Stop).await
    }

    /// Refuse a command locally. Validation messages are shown as written.
    pub fn reject(&self, error: DashboardError) -> CommandOutcome {
        log::warn!("{}", error);
        let message = match error {
            DashboardError::Validation(message) => message,
            other => other.to_string(),
        };
        self.notifications.error(message);
        CommandOutcome::Rejected
    }

    async fn dispatch(&self, command: EngineCommand) -> CommandOutcome {
        let verb = command.verb();
        log::info!("Requesting engine {}", verb);

        let result = {
            let _busy = BusyGuard::acquire(self.view.as_ref(), command.control());
            let result = self.send(&command).await;
            if result.is_ok() {
                self.view.apply(command.settled_controls());
            }
            result
        };

        match result {
            Ok(()) => {
                log::info!("Engine acknowledged {}", verb);
                self.notifications.success(command.success_message());
                self.reconciler.refresh_status().await;
                CommandOutcome::Acknowledged
            }
            Err(e) => {
                log::error!("Engine {} failed: {}", verb, e);
                self.notifications.error(command.failure_message());
                CommandOutcome::Failed
            }
        }
    }

    async fn send(&self, command: &EngineCommand) -> DashboardResult<()> {
        let ok = match command {
            EngineCommand::Start(start) => self.engine.start(start).await?,
            EngineCommand::Stop => self.engine.stop().await?,
        };

        if ok {
            Ok(())
        } else {
            Err(DashboardError::CommandFailure(format!("engine refused to {}", command.verb())))
        }
    }
}
