// src/infrastructure/mod.rs
pub mod engine;
pub mod view;
