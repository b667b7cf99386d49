// src/main.rs
use std::sync::Arc;

use engine_dashboard::adapter::{Console, ConsoleExit, DashboardController};
use engine_dashboard::config::Config;
use engine_dashboard::domain::errors::DashboardResult;
use engine_dashboard::infrastructure::engine::HttpEngineRepository;
use engine_dashboard::infrastructure::view::Document;
use tokio::signal::ctrl_c;

#[tokio::main(flavor = "current_thread")]
async fn main() -> DashboardResult<()> {
    // Load configuration
    let config = Config::load()?;

    // Initialize logging
    config.init_logging()?;

    log::info!("Starting engine_dashboard v{}", env!("CARGO_PKG_VERSION"));

    let engine = Arc::new(HttpEngineRepository::new(&config.engine.base_url, config.request_timeout())?);
    let document = Arc::new(Document::new(config.markup()?));
    let controller = Arc::new(DashboardController::new(
        engine,
        document.clone(),
        config.controller_settings()?,
    ));

    controller.init().await;
    println!("{}", document);
    println!("Type `help` for commands.");

    let mut console = Console::new(controller.clone(), document.clone(), tokio::io::stdout());

    let finished = tokio::select! {
        result = console.run(tokio::io::stdin()) => Some(result?),
        signal = ctrl_c() => {
            if let Err(e) = signal {
                log::error!("Failed to listen for Ctrl-C: {}", e);
            }
            None
        }
    };

    // Closed input is not a request to leave
    if finished == Some(ConsoleExit::EndOfInput) {
        log::info!("Input closed. Dashboard is running. Press Ctrl+C to stop.");
        ctrl_c().await?;
    }

    // Shutdown
    log::info!("Shutting down...");
    controller.shutdown();

    log::info!("Shutdown complete. Goodbye!");
    Ok(())
}
