//! Pipeline entry points and state.
//!
//! - `DiscoveryCycle`: the main select/fetch/publish loop
//! - `DailyBroadcaster`: the fixed-schedule promotional broadcast
//! - `Deduplicator`: the process-lifetime posted-ID set
//! - `format`: message composition rules

pub mod broadcast;
pub mod dedup;
pub mod discover;
pub mod format;

pub use broadcast::DailyBroadcaster;
pub use dedup::Deduplicator;
pub use discover::{CycleSettings, DiscoveryCycle};
