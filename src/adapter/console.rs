// src/adapter/console.rs
// Line-oriented input binding for the headless dashboard

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::task::JoinHandle;

use super::controller::DashboardController;
use crate::application::usecase::CommandOutcome;
use crate::domain::errors::{DashboardError, DashboardResult};
use crate::domain::model::{ElementId, RenderCommand};
use crate::domain::repository::DashboardView;
use crate::infrastructure::view::Document;

const HELP: &str = "\
Commands:
  select SYM[,SYM...]   choose symbols (empty clears the selection)
  interval LABEL        set the candle interval, e.g. 5m
  balance AMOUNT        set the account balance
  start | stop          send a command to the engine
  refresh               fetch every snapshot now
  show                  print the dashboard
  help                  this text
  quit                  exit";

/// One console line, the equivalent of a user event on the page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Select(Vec<String>),
    Interval(String),
    Balance(String),
    Start,
    Stop,
    Refresh,
    Show,
    Help,
    Quit,
}

impl FromStr for ConsoleCommand {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let line = s.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        let argument = |name: &str| {
            if rest.is_empty() {
                Err(DashboardError::Validation(format!("{} needs a value", name)))
            } else {
                Ok(rest.to_string())
            }
        };

        match word.to_lowercase().as_str() {
            "select" => Ok(ConsoleCommand::Select(
                rest.split(',')
                    .map(|symbol| symbol.trim().to_uppercase())
                    .filter(|symbol| !symbol.is_empty())
                    .collect(),
            )),
            "interval" => argument("interval").map(ConsoleCommand::Interval),
            "balance" => argument("balance").map(ConsoleCommand::Balance),
            "start" => Ok(ConsoleCommand::Start),
            "stop" => Ok(ConsoleCommand::Stop),
            "refresh" => Ok(ConsoleCommand::Refresh),
            "show" => Ok(ConsoleCommand::Show),
            "help" | "?" => Ok(ConsoleCommand::Help),
            "quit" | "exit" => Ok(ConsoleCommand::Quit),
            _ => Err(DashboardError::Validation(format!("Unknown command: {}", line))),
        }
    }
}

impl fmt::Display for ConsoleCommand {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConsoleCommand::Select(symbols) => write!(f, "select {}", symbols.join(",")),
            ConsoleCommand::Interval(label) => write!(f, "interval {}", label),
            ConsoleCommand::Balance(amount) => write!(f, "balance {}", amount),
            ConsoleCommand::Start => write!(f, "start"),
            ConsoleCommand::Stop => write!(f, "stop"),
            ConsoleCommand::Refresh => write!(f, "refresh"),
            ConsoleCommand::Show => write!(f, "show"),
            ConsoleCommand::Help => write!(f, "help"),
            ConsoleCommand::Quit => write!(f, "quit"),
        }
    }
}

/// Why `Console::run` returned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleExit {
    /// The user asked to leave
    Quit,
    /// Input closed; the dashboard should keep running
    EndOfInput,
}

/// Reads commands line by line and applies them to the dashboard.
/// Start and stop run in the background so input stays live while the
/// engine answers; they are awaited before `run` returns.
pub struct Console<W> {
    controller: Arc<DashboardController>,
    document: Arc<Document>,
    out: W,
    pending: Vec<JoinHandle<Option<CommandOutcome>>>,
}

impl<W: AsyncWrite + Unpin> Console<W> {
    pub fn new(controller: Arc<DashboardController>, document: Arc<Document>, out: W) -> Self {
        Self {
            controller,
            document,
            out,
            pending: Vec::new(),
        }
    }

    pub async fn run<R: AsyncRead + Unpin>(&mut self, input: R) -> DashboardResult<ConsoleExit> {
        let mut lines = BufReader::new(input).lines();
        let mut exit = ConsoleExit::EndOfInput;

        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }

            match line.parse::<ConsoleCommand>() {
                Ok(ConsoleCommand::Quit) => {
                    exit = ConsoleExit::Quit;
                    break;
                }
                Ok(command) => {
                    log::debug!("Console: {}", command);
                    self.execute(command).await?;
                }
                Err(e) => self.write_line(&e.to_string()).await?,
            }
        }

        self.settle().await;
        Ok(exit)
    }

    async fn execute(&mut self, command: ConsoleCommand) -> DashboardResult<()> {
        match command {
            ConsoleCommand::Select(symbols) => {
                let offered: Vec<String> = self
                    .document
                    .element(ElementId::Symbols)
                    .options
                    .into_iter()
                    .map(|option| option.value)
                    .collect();
                for symbol in symbols.iter().filter(|s| !offered.contains(s)) {
                    self.write_line(&format!("Unknown symbol: {}", symbol)).await?;
                }

                self.document.apply(vec![RenderCommand::SelectOptions {
                    element: ElementId::Symbols,
                    values: symbols.into_iter().collect(),
                }]);
            }
            ConsoleCommand::Interval(value) => self.document.apply(vec![RenderCommand::SetValue {
                element: ElementId::Interval,
                value,
            }]),
            ConsoleCommand::Balance(value) => self.document.apply(vec![RenderCommand::SetValue {
                element: ElementId::Balance,
                value,
            }]),
            ConsoleCommand::Start => {
                let controller = self.controller.clone();
                self.pending
                    .push(tokio::spawn(async move { controller.on_start_requested().await }));
            }
            ConsoleCommand::Stop => {
                let controller = self.controller.clone();
                self.pending
                    .push(tokio::spawn(async move { controller.on_stop_requested().await }));
            }
            ConsoleCommand::Refresh => self.controller.refresh().await,
            ConsoleCommand::Show => {
                let dump = self.document.to_string();
                self.out.write_all(dump.as_bytes()).await?;
                self.out.flush().await?;
            }
            ConsoleCommand::Help => self.write_line(HELP).await?,
            ConsoleCommand::Quit => {}
        }

        self.pending.retain(|handle| !handle.is_finished());
        Ok(())
    }

    async fn settle(&mut self) {
        for handle in self.pending.drain(..) {
            match handle.await {
                Ok(Some(outcome)) => log::debug!("Command settled: {:?}", outcome),
                Ok(None) => log::debug!("Command ignored"),
                Err(e) => log::error!("Command task failed: {}", e),
            }
        }
    }

    async fn write_line(&mut self, text: &str) -> DashboardResult<()> {
        self.out.write_all(text.as_bytes()).await?;
        self.out.write_all(b"\n").await?;
        self.out.flush().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::controller::ControllerSettings;
    use crate::domain::model::Interval;
    use crate::domain::service::DisplayZone;
    use crate::test_support::{self, FakeEngine};
    use rust_decimal_macros::dec;

    fn console(engine: &Arc<FakeEngine>, document: &Arc<Document>) -> Console<Vec<u8>> {
        let controller = DashboardController::new(
            engine.clone(),
            document.clone(),
            ControllerSettings {
                zone: DisplayZone::Utc,
                ..Default::default()
            },
        );
        Console::new(Arc::new(controller), document.clone(), Vec::new())
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(
            "select ethusd, BTCUSD,".parse::<ConsoleCommand>().unwrap(),
            ConsoleCommand::Select(vec!["ETHUSD".to_string(), "BTCUSD".to_string()])
        );
        assert_eq!("select".parse::<ConsoleCommand>().unwrap(), ConsoleCommand::Select(vec![]));
        assert_eq!(
            "  INTERVAL 15m ".parse::<ConsoleCommand>().unwrap(),
            ConsoleCommand::Interval("15m".to_string())
        );
        assert_eq!("exit".parse::<ConsoleCommand>().unwrap(), ConsoleCommand::Quit);
        assert!("balance".parse::<ConsoleCommand>().is_err());
        assert!("launch".parse::<ConsoleCommand>().is_err());
    }

    #[tokio::test]
    async fn test_script_starts_engine() {
        let engine = FakeEngine::new();
        let document = test_support::document();
        let mut console = console(&engine, &document);

        let script = "select ETHUSD\ninterval 15m\nbalance 500\nstart\nshow\nquit\nstop\n";
        let exit = console.run(script.as_bytes()).await.unwrap();
        assert_eq!(exit, ConsoleExit::Quit);

        assert_eq!(engine.count("start"), 1);
        assert_eq!(engine.count("stop"), 0);
        let start = engine.starts.lock().unwrap()[0].clone();
        assert_eq!(start.symbols, vec!["ETHUSD".to_string()]);
        assert_eq!(start.interval, Interval::Minutes15);
        assert_eq!(start.account_balance, dec!(500));
        assert_eq!(document.text(ElementId::StatusText), "Running");

        let output = String::from_utf8(console.out.clone()).unwrap();
        assert!(output.contains("Form: symbols [ETHUSD], interval 15m, balance 500"));
    }

    #[tokio::test]
    async fn test_closed_input_ends_without_quit() {
        let engine = FakeEngine::new();
        let document = test_support::document();
        let mut console = console(&engine, &document);

        assert_eq!(console.run(tokio::io::empty()).await.unwrap(), ConsoleExit::EndOfInput);
        assert_eq!(console.run("quit\n".as_bytes()).await.unwrap(), ConsoleExit::Quit);
        assert!(engine.calls().is_empty());
    }

    #[tokio::test]
    async fn test_reports_bad_input() {
        let engine = FakeEngine::new();
        let document = test_support::document();
        let mut console = console(&engine, &document);

        console.run("launch\nselect DOGEUSD\nbalance\n".as_bytes()).await.unwrap();

        let output = String::from_utf8(console.out.clone()).unwrap();
        assert!(output.contains("Unknown command: launch"));
        assert!(output.contains("Unknown symbol: DOGEUSD"));
        assert!(output.contains("balance needs a value"));
        assert!(engine.calls().is_empty());
    }

    #[tokio::test]
    async fn test_refresh_and_eof_settle_pending_commands() {
        let engine = FakeEngine::new();
        engine.status.lock().unwrap().running = true;
        let document = test_support::document();
        let mut console = console(&engine, &document);

        let exit = console.run("refresh\nstop\n".as_bytes()).await.unwrap();

        assert_eq!(exit, ConsoleExit::EndOfInput);
        assert_eq!(engine.count("stop"), 1);
        assert!(console.pending.is_empty());
        assert_eq!(document.text(ElementId::StatusText), "Stopped");
    }
}
