// src/pipeline/broadcast.rs

//! Daily promotional broadcast task.
//!
//! Runs independently of the discovery cycle: it polls the local clock at
//! coarse granularity and, once per calendar day at the configured time,
//! publishes the fixed promotion list in order.

use std::time::Duration;

use chrono::{Local, NaiveDate, NaiveTime};

use crate::models::Promotion;
use crate::pipeline::format;
use crate::services::Publisher;

/// Summary of one broadcast run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BroadcastStats {
    /// Promotions delivered
    pub sent: usize,
    /// Promotions that failed to deliver
    pub failed: usize,
}

/// Fixed-schedule publisher of the daily promotion list.
pub struct DailyBroadcaster<P> {
    publisher: P,
    promotions: Vec<Promotion>,
    fire_at: NaiveTime,
    item_delay: Duration,
    poll_interval: Duration,
}

impl<P: Publisher> DailyBroadcaster<P> {
    pub fn new(
        publisher: P,
        promotions: Vec<Promotion>,
        fire_at: NaiveTime,
        item_delay: Duration,
        poll_interval: Duration,
    ) -> Self {
        Self {
            publisher,
            promotions,
            fire_at,
            item_delay,
            poll_interval,
        }
    }

    /// Publish every promotion in order.
    ///
    /// A failed item is logged and does not block the remaining ones.
    pub async fn broadcast_once(&self) -> BroadcastStats {
        log::info!(
            "Starting daily promotional broadcast ({} items)",
            self.promotions.len()
        );
        let mut stats = BroadcastStats::default();
        for (i, promotion) in self.promotions.iter().enumerate() {
            if i > 0 && !self.item_delay.is_zero() {
                tokio::time::sleep(self.item_delay).await;
            }
            let message = format::format_promotion(promotion);
            match self.publisher.publish(&message).await {
                Ok(()) => {
                    stats.sent += 1;
                    log::info!("Published promotion '{}'", promotion.name);
                }
                Err(e) => {
                    stats.failed += 1;
                    log::error!("Failed to publish promotion '{}': {e}", promotion.name);
                }
            }
        }
        log::info!(
            "Daily broadcast complete: {} sent, {} failed",
            stats.sent,
            stats.failed
        );
        stats
    }

    /// Poll the local clock and fire once per calendar day at `fire_at`.
    ///
    /// Each broadcast runs to completion before polling resumes. Starting
    /// the process after today's trigger time does not fire a late
    /// broadcast.
    pub async fn run(&self) {
        let now = Local::now();
        let mut last_fired = if now.time() >= self.fire_at {
            Some(now.date_naive())
        } else {
            None
        };
        log::info!(
            "Daily broadcaster armed for {} local time",
            self.fire_at.format("%H:%M")
        );
        loop {
            let now = Local::now();
            if Self::is_due(now.time(), now.date_naive(), self.fire_at, last_fired) {
                last_fired = Some(now.date_naive());
                self.broadcast_once().await;
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    /// Trigger condition: past the firing time and not yet fired today.
    fn is_due(
        now: NaiveTime,
        today: NaiveDate,
        fire_at: NaiveTime,
        last_fired: Option<NaiveDate>,
    ) -> bool {
        now >= fire_at && last_fired != Some(today)
    }
}
