// src/infrastructure/view/mod.rs
// In-memory document standing in for the dashboard markup

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use rust_decimal::Decimal;

use crate::domain::model::view::{CLASS_ACTIVE, CLASS_LOADING, CLASS_SHOW, CLASS_STAT_UPDATING};
use crate::domain::model::{ElementId, Interval, NotificationKind, RenderCommand, TableRow};
use crate::domain::repository::{DashboardView, FormValues};

/// Initial content of the page before any engine data arrives
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardMarkup {
    /// Options offered by the symbol multi-select
    pub symbols: Vec<String>,
    pub interval: Interval,
    pub balance: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub value: String,
    pub selected: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    pub text: String,
    pub classes: BTreeSet<String>,
    pub disabled: bool,
    pub value: String,
    pub options: Vec<SelectOption>,
    pub rows: Vec<TableRow>,
}

impl Element {
    fn with_text(text: &str) -> Self {
        Self {
            text: text.to_string(),
            ..Default::default()
        }
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.contains(class)
    }

    pub fn selected(&self) -> Vec<String> {
        self.options
            .iter()
            .filter(|option| option.selected)
            .map(|option| option.value.clone())
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationElement {
    pub id: u64,
    pub message: String,
    pub kind: NotificationKind,
    pub classes: BTreeSet<String>,
}

impl NotificationElement {
    pub fn is_shown(&self) -> bool {
        self.classes.contains(CLASS_SHOW)
    }
}

#[derive(Debug, Default)]
struct DocumentState {
    elements: HashMap<ElementId, Element>,
    notifications: Vec<NotificationElement>,
    // Bumped on every pulse so an older pulse cannot clear a newer one
    pulse_generation: HashMap<ElementId, u64>,
}

/// Shared handle to the page. Clones see the same elements.
#[derive(Debug, Clone)]
pub struct Document {
    state: Arc<Mutex<DocumentState>>,
}

impl Document {
    pub fn new(markup: DashboardMarkup) -> Self {
        let mut elements: HashMap<ElementId, Element> = ElementId::ALL
            .iter()
            .map(|id| (*id, Element::default()))
            .collect();

        elements.insert(ElementId::StatusText, Element::with_text("Stopped"));
        elements.insert(
            ElementId::StopButton,
            Element {
                disabled: true,
                ..Default::default()
            },
        );
        elements.insert(
            ElementId::Symbols,
            Element {
                options: markup
                    .symbols
                    .iter()
                    .map(|value| SelectOption {
                        value: value.clone(),
                        selected: false,
                    })
                    .collect(),
                ..Default::default()
            },
        );
        elements.insert(
            ElementId::Interval,
            Element {
                value: markup.interval.to_string(),
                ..Default::default()
            },
        );
        elements.insert(
            ElementId::Balance,
            Element {
                value: markup.balance.to_string(),
                ..Default::default()
            },
        );
        elements.insert(ElementId::ActiveBalance, Element::with_text("₹0.00"));
        elements.insert(ElementId::TotalPnl, Element::with_text("₹0.00"));
        elements.insert(ElementId::TotalTrades, Element::with_text("0"));
        elements.insert(ElementId::WinRate, Element::with_text("0%"));

        Self {
            state: Arc::new(Mutex::new(DocumentState {
                elements,
                ..Default::default()
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, DocumentState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn element(&self, element: ElementId) -> Element {
        self.lock().elements.get(&element).cloned().unwrap_or_default()
    }

    pub fn has_class(&self, element: ElementId, class: &str) -> bool {
        self.lock()
            .elements
            .get(&element)
            .map_or(false, |e| e.has_class(class))
    }

    pub fn rows(&self, element: ElementId) -> Vec<TableRow> {
        self.element(element).rows
    }

    pub fn notifications(&self) -> Vec<NotificationElement> {
        self.lock().notifications.clone()
    }

    fn schedule_pulse_clear(&self, element: ElementId, generation: u64, duration: std::time::Duration) {
        let document = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            let mut state = document.lock();
            if state.pulse_generation.get(&element) == Some(&generation) {
                if let Some(e) = state.elements.get_mut(&element) {
                    e.classes.remove(CLASS_STAT_UPDATING);
                }
            }
        });
    }
}

impl DashboardView for Document {
    fn apply(&self, commands: Vec<RenderCommand>) {
        let mut pulses = Vec::new();

        {
            let mut state = self.lock();
            for command in commands {
                match command {
                    RenderCommand::SetText { element, text } => {
                        state.elements.entry(element).or_default().text = text;
                    }
                    RenderCommand::AddClass { element, class } => {
                        state.elements.entry(element).or_default().classes.insert(class.to_string());
                    }
                    RenderCommand::RemoveClass { element, class } => {
                        state.elements.entry(element).or_default().classes.remove(class);
                    }
                    RenderCommand::SetDisabled { element, disabled } => {
                        state.elements.entry(element).or_default().disabled = disabled;
                    }
                    RenderCommand::SelectOptions { element, values } => {
                        // Values without a matching option are ignored, as a select would
                        for option in &mut state.elements.entry(element).or_default().options {
                            option.selected = values.contains(&option.value);
                        }
                    }
                    RenderCommand::SetValue { element, value } => {
                        state.elements.entry(element).or_default().value = value;
                    }
                    RenderCommand::SetRows { element, rows } => {
                        state.elements.entry(element).or_default().rows = rows;
                    }
                    RenderCommand::Pulse { element, duration } => {
                        if tokio::runtime::Handle::try_current().is_err() {
                            log::debug!("No runtime to time the {} pulse, skipping animation", element);
                            continue;
                        }
                        state
                            .elements
                            .entry(element)
                            .or_default()
                            .classes
                            .insert(CLASS_STAT_UPDATING.to_string());
                        let generation = state.pulse_generation.entry(element).or_insert(0);
                        *generation += 1;
                        pulses.push((element, *generation, duration));
                    }
                    RenderCommand::AppendNotification { id, message, kind } => {
                        state.notifications.push(NotificationElement {
                            id,
                            message,
                            kind,
                            classes: ["notification".to_string(), kind.css_class().to_string()]
                                .into_iter()
                                .collect(),
                        });
                    }
                    RenderCommand::ShowNotification { id } => {
                        if let Some(n) = state.notifications.iter_mut().find(|n| n.id == id) {
                            n.classes.insert(CLASS_SHOW.to_string());
                        }
                    }
                    RenderCommand::HideNotification { id } => {
                        if let Some(n) = state.notifications.iter_mut().find(|n| n.id == id) {
                            n.classes.remove(CLASS_SHOW);
                        }
                    }
                    RenderCommand::RemoveNotification { id } => {
                        state.notifications.retain(|n| n.id != id);
                    }
                }
            }
        }

        for (element, generation, duration) in pulses {
            self.schedule_pulse_clear(element, generation, duration);
        }
    }

    fn text(&self, element: ElementId) -> String {
        self.element(element).text
    }

    fn is_disabled(&self, element: ElementId) -> bool {
        self.element(element).disabled
    }

    fn form_values(&self) -> FormValues {
        let state = self.lock();
        let get = |id: ElementId| state.elements.get(&id).cloned().unwrap_or_default();

        FormValues {
            symbols: get(ElementId::Symbols).selected(),
            interval: get(ElementId::Interval).value,
            balance: get(ElementId::Balance).value,
        }
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let state = self.lock();
        let get = |id: ElementId| state.elements.get(&id).cloned().unwrap_or_default();
        let control = |id: ElementId| {
            let e = get(id);
            match (e.disabled, e.has_class(CLASS_LOADING)) {
                (_, true) => "busy",
                (true, false) => "disabled",
                (false, false) => "enabled",
            }
        };

        let indicator = get(ElementId::StatusIndicator);
        writeln!(
            f,
            "Engine: {}{}",
            get(ElementId::StatusText).text,
            if indicator.has_class(CLASS_ACTIVE) { " ●" } else { "" }
        )?;
        writeln!(
            f,
            "Controls: start {}, stop {}",
            control(ElementId::StartButton),
            control(ElementId::StopButton)
        )?;
        writeln!(
            f,
            "Form: symbols [{}], interval {}, balance {}",
            get(ElementId::Symbols).selected().join(", "),
            get(ElementId::Interval).value,
            get(ElementId::Balance).value
        )?;
        writeln!(f, "Active balance: {}", get(ElementId::ActiveBalance).text)?;
        writeln!(
            f,
            "P&L: {}  Trades: {}  Win rate: {}",
            get(ElementId::TotalPnl).text,
            get(ElementId::TotalTrades).text,
            get(ElementId::WinRate).text
        )?;

        writeln!(f, "Trades:")?;
        for row in &get(ElementId::TradesBody).rows {
            let cells: Vec<&str> = row.cells.iter().map(|c| c.text.as_str()).collect();
            writeln!(f, "  {}", cells.join(" | "))?;
        }

        for notification in &state.notifications {
            writeln!(f, "[{}] {}", notification.kind, notification.message)?;
        }

        Ok(())
    }
}
