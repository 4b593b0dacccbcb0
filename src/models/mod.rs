// src/models/mod.rs

//! Domain models for the bot.
//!
//! This module contains all data structures used throughout the
//! application, organized by their primary purpose.

mod config;
mod message;
mod product;
mod promotion;
mod strategy;

// Re-export all public types
pub use config::{Config, SearchConfig, TimingConfig};
pub use message::OutboundMessage;
pub use product::ProductRecord;
pub use promotion::Promotion;
pub use strategy::{Category, Strategy, StrategyCatalog, StrategyKind, StrategyPool};
