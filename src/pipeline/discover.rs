// src/pipeline/discover.rs

//! Discovery cycle: pick a strategy, fetch candidates, publish new deals.
//!
//! One cycle publishes at most `per_cycle_cap` products, with a fixed delay
//! between successive publishes to respect downstream rate limits. Source
//! and publish failures are recovered per candidate; the loop never stalls.

use std::time::Duration;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::models::{Config, StrategyCatalog};
use crate::pipeline::dedup::Deduplicator;
use crate::pipeline::format;
use crate::services::{ProductSource, Publisher};

/// Summary of one discovery cycle.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CycleStats {
    /// Messages delivered to the channel
    pub published: usize,
    /// Candidates skipped because their ID was already published
    pub skipped_seen: usize,
    /// Candidates skipped because formatting found them incomplete
    pub skipped_incomplete: usize,
    /// Publish attempts that failed
    pub publish_failures: usize,
}

/// Knobs for the discovery loop.
#[derive(Debug, Clone)]
pub struct CycleSettings {
    /// Maximum publishes per cycle
    pub per_cycle_cap: usize,
    /// Result pages are chosen at random from 1..=max_page
    pub max_page: u32,
    /// Delay between successive publishes within a cycle
    pub publish_delay: Duration,
    /// Sleep between cycles
    pub cycle_interval: Duration,
}

impl CycleSettings {
    /// Derive loop settings from the application config.
    pub fn from_config(config: &Config) -> Self {
        Self {
            per_cycle_cap: config.search.per_cycle_cap,
            max_page: config.search.max_page,
            publish_delay: Duration::from_secs(config.timing.publish_delay_secs),
            cycle_interval: Duration::from_secs(config.timing.cycle_interval_secs),
        }
    }
}

/// The main discovery loop.
///
/// Owns all mutable state (the posted-ID set and the RNG); everything is
/// touched on this single execution context only.
pub struct DiscoveryCycle<S, P> {
    source: S,
    publisher: P,
    catalog: StrategyCatalog,
    settings: CycleSettings,
    dedup: Deduplicator,
    rng: StdRng,
}

impl<S: ProductSource, P: Publisher> DiscoveryCycle<S, P> {
    /// Create a cycle seeded from entropy.
    pub fn new(source: S, publisher: P, catalog: StrategyCatalog, settings: CycleSettings) -> Self {
        Self::with_rng(source, publisher, catalog, settings, StdRng::from_entropy())
    }

    /// Create a cycle with an injected RNG for reproducible runs.
    pub fn with_rng(
        source: S,
        publisher: P,
        catalog: StrategyCatalog,
        settings: CycleSettings,
        rng: StdRng,
    ) -> Self {
        Self {
            source,
            publisher,
            catalog,
            settings,
            dedup: Deduplicator::new(),
            rng,
        }
    }

    /// Number of products published over the lifetime of this cycle.
    pub fn posted_count(&self) -> usize {
        self.dedup.len()
    }

    /// Run discovery cycles forever, sleeping between them.
    pub async fn run(&mut self) {
        loop {
            let stats = self.run_once().await;
            log::info!(
                "Cycle complete: {} published, {} already seen, {} incomplete, {} failed. \
                 Sleeping {}s.",
                stats.published,
                stats.skipped_seen,
                stats.skipped_incomplete,
                stats.publish_failures,
                self.settings.cycle_interval.as_secs()
            );
            tokio::time::sleep(self.settings.cycle_interval).await;
        }
    }

    /// Execute a single cycle: select, fetch, filter and publish.
    pub async fn run_once(&mut self) -> CycleStats {
        let (strategy, category) = {
            let (s, c) = self.catalog.pick(&mut self.rng);
            (s.clone(), c)
        };
        let page = self.rng.gen_range(1..=self.settings.max_page);
        log::info!(
            "Searching '{}' ('{}', page {})",
            strategy.name,
            strategy.value,
            page
        );

        // A source failure counts as an empty result; the cycle goes on.
        let mut candidates = match self.source.search(&strategy, page).await {
            Ok(items) => items,
            Err(e) => {
                log::warn!("Search failed for '{}': {e}", strategy.name);
                Vec::new()
            }
        };
        candidates.shuffle(&mut self.rng);

        let mut stats = CycleStats::default();
        for product in &candidates {
            if stats.published >= self.settings.per_cycle_cap {
                break;
            }
            if self.dedup.has_seen(&product.id) {
                stats.skipped_seen += 1;
                continue;
            }
            let Some(message) = format::format_product(product, category) else {
                stats.skipped_incomplete += 1;
                continue;
            };
            if stats.published > 0 && !self.settings.publish_delay.is_zero() {
                tokio::time::sleep(self.settings.publish_delay).await;
            }
            match self.publisher.publish(&message).await {
                Ok(()) => {
                    // Only a delivered candidate is marked; failures stay
                    // eligible for later cycles.
                    self.dedup.mark_seen(&product.id);
                    stats.published += 1;
                    log::info!(
                        "Published ({}/{}): {}",
                        stats.published,
                        self.settings.per_cycle_cap,
                        product.title
                    );
                }
                Err(e) => {
                    stats.publish_failures += 1;
                    log::error!("Failed to publish {}: {e}", product.id);
                }
            }
        }

        if stats.published == 0 {
            log::info!("No new deals published this cycle.");
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;

    use crate::error::{AppError, Result};
    use crate::models::{
        Category, OutboundMessage, ProductRecord, Strategy, StrategyKind, StrategyPool,
    };

    /// Source fed with scripted responses; `None` simulates a failure.
    #[derive(Clone, Default)]
    struct StubSource {
        responses: Arc<Mutex<VecDeque<Option<Vec<ProductRecord>>>>>,
    }

    impl StubSource {
        fn push(&self, response: Option<Vec<ProductRecord>>) {
            self.responses.lock().unwrap().push_back(response);
        }
    }

    #[async_trait]
    impl ProductSource for StubSource {
        async fn search(&self, strategy: &Strategy, _page: u32) -> Result<Vec<ProductRecord>> {
            match self.responses.lock().unwrap().pop_front() {
                Some(Some(items)) => Ok(items),
                Some(None) => Err(AppError::source(strategy.name.clone(), "stub failure")),
                None => Ok(Vec::new()),
            }
        }
    }

    /// Publisher recording button URLs; scripted failures per call.
    #[derive(Clone, Default)]
    struct RecordingPublisher {
        sent: Arc<Mutex<Vec<String>>>,
        failures: Arc<Mutex<VecDeque<bool>>>,
    }

    impl RecordingPublisher {
        fn fail_next(&self, pattern: &[bool]) {
            self.failures.lock().unwrap().extend(pattern.iter().copied());
        }

        fn sent(&self) -> Vec<String> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Publisher for RecordingPublisher {
        async fn publish(&self, message: &OutboundMessage) -> Result<()> {
            let fail = self.failures.lock().unwrap().pop_front().unwrap_or(false);
            if fail {
                return Err(AppError::publish("stub", "delivery refused"));
            }
            self.sent.lock().unwrap().push(message.button_url.clone());
            Ok(())
        }
    }

    fn candidate(id: &str, price: Option<&str>) -> ProductRecord {
        ProductRecord {
            id: id.to_string(),
            title: format!("Producto {id}"),
            detail_url: format!("https://www.amazon.es/dp/{id}"),
            price_display: price.map(str::to_string),
            saving_display: None,
            image_url: None,
        }
    }

    fn single_pool_catalog() -> StrategyCatalog {
        StrategyCatalog::new(vec![StrategyPool {
            name: "back-to-school".to_string(),
            category: Category::BackToSchool,
            weight: 1,
            strategies: vec![Strategy {
                kind: StrategyKind::Keyword,
                value: "mochilas escolares".to_string(),
                name: "Mochilas Escolares".to_string(),
                min_saving: Some(15),
            }],
        }])
        .unwrap()
    }

    fn fast_settings() -> CycleSettings {
        CycleSettings {
            per_cycle_cap: 2,
            max_page: 5,
            publish_delay: Duration::ZERO,
            cycle_interval: Duration::ZERO,
        }
    }

    fn make_cycle(
        source: StubSource,
        publisher: RecordingPublisher,
    ) -> DiscoveryCycle<StubSource, RecordingPublisher> {
        DiscoveryCycle::with_rng(
            source,
            publisher,
            single_pool_catalog(),
            fast_settings(),
            StdRng::seed_from_u64(1),
        )
    }

    #[tokio::test]
    async fn cap_limits_publishes_and_third_stays_eligible() {
        // Scenario A: 3 fresh candidates, cap 2.
        let source = StubSource::default();
        let publisher = RecordingPublisher::default();
        let all = vec![
            candidate("B001", Some("10 €")),
            candidate("B002", Some("11 €")),
            candidate("B003", Some("12 €")),
        ];
        source.push(Some(all.clone()));
        source.push(Some(all));

        let mut cycle = make_cycle(source, publisher.clone());
        let first = cycle.run_once().await;
        assert_eq!(first.published, 2);
        assert_eq!(cycle.posted_count(), 2);

        // The unpublished candidate is picked up next cycle.
        let second = cycle.run_once().await;
        assert_eq!(second.published, 1);
        assert_eq!(second.skipped_seen, 2);
        assert_eq!(cycle.posted_count(), 3);

        // No ID was ever published twice.
        let sent = publisher.sent();
        assert_eq!(sent.len(), 3);
        let mut unique = sent.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), 3);
    }

    #[tokio::test]
    async fn source_failure_is_recovered_as_empty_cycle() {
        // Scenario B: the source raises.
        let source = StubSource::default();
        let publisher = RecordingPublisher::default();
        source.push(None);
        source.push(Some(vec![candidate("B001", Some("10 €"))]));

        let mut cycle = make_cycle(source, publisher.clone());
        let first = cycle.run_once().await;
        assert_eq!(first, CycleStats::default());

        // The next cycle proceeds normally.
        let second = cycle.run_once().await;
        assert_eq!(second.published, 1);
        assert_eq!(publisher.sent().len(), 1);
    }

    #[tokio::test]
    async fn incomplete_candidate_is_skipped_not_marked() {
        // Scenario D: missing price now, available later.
        let source = StubSource::default();
        let publisher = RecordingPublisher::default();
        source.push(Some(vec![candidate("B001", None)]));
        source.push(Some(vec![candidate("B001", Some("10 €"))]));

        let mut cycle = make_cycle(source, publisher.clone());
        let first = cycle.run_once().await;
        assert_eq!(first.skipped_incomplete, 1);
        assert_eq!(first.published, 0);
        assert_eq!(cycle.posted_count(), 0);

        let second = cycle.run_once().await;
        assert_eq!(second.published, 1);
        assert_eq!(publisher.sent(), vec!["https://www.amazon.es/dp/B001"]);
    }

    #[tokio::test]
    async fn publish_failure_does_not_mark_or_abort() {
        let source = StubSource::default();
        let publisher = RecordingPublisher::default();
        source.push(Some(vec![
            candidate("B001", Some("10 €")),
            candidate("B002", Some("11 €")),
            candidate("B003", Some("12 €")),
        ]));
        // First attempt fails, the loop keeps going.
        publisher.fail_next(&[true]);

        let mut cycle = make_cycle(source, publisher.clone());
        let stats = cycle.run_once().await;
        assert_eq!(stats.publish_failures, 1);
        assert_eq!(stats.published, 2);
        // The failed candidate was not marked seen.
        assert_eq!(cycle.posted_count(), 2);
    }

    #[tokio::test]
    async fn seen_ids_are_never_republished() {
        let source = StubSource::default();
        let publisher = RecordingPublisher::default();
        let batch = vec![candidate("B001", Some("10 €"))];
        for _ in 0..5 {
            source.push(Some(batch.clone()));
        }

        let mut cycle = make_cycle(source, publisher.clone());
        for _ in 0..5 {
            cycle.run_once().await;
        }
        assert_eq!(publisher.sent().len(), 1);
        assert_eq!(cycle.posted_count(), 1);
    }

    #[tokio::test]
    async fn empty_source_publishes_nothing() {
        let source = StubSource::default();
        let publisher = RecordingPublisher::default();
        let mut cycle = make_cycle(source, publisher.clone());
        let stats = cycle.run_once().await;
        assert_eq!(stats, CycleStats::default());
        assert!(publisher.sent().is_empty());
    }
}
