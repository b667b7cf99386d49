// src/adapter/mod.rs
pub mod console;
pub mod controller;

pub use console::{Console, ConsoleCommand, ConsoleExit};
pub use controller::{ControllerSettings, DashboardController};
