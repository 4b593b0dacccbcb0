//! Search strategies and weighted pool selection.

use rand::Rng;
use rand::distributions::{Distribution, WeightedIndex};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Kind of catalog query a strategy performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StrategyKind {
    /// Free-text keyword search
    Keyword,
    /// Browse-node (category) search
    CategoryNode,
}

/// Theme tag attached to a strategy pool.
///
/// Drives the caption header and button label chosen by the formatter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    BackToSchool,
    YouthApparel,
    /// Unclassified / promotional content
    Promotion,
}

/// A parameterized catalog query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Strategy {
    /// Query kind
    pub kind: StrategyKind,

    /// Keyword text or browse-node ID, depending on `kind`
    pub value: String,

    /// Human-readable display name
    pub name: String,

    /// Minimum saving percentage filter passed to the source
    #[serde(default)]
    pub min_saving: Option<u8>,
}

/// A named, weighted group of strategies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyPool {
    /// Pool name (e.g. "back-to-school")
    pub name: String,

    /// Theme tag for message formatting
    pub category: Category,

    /// Relative selection weight across pools
    pub weight: u32,

    /// Strategies chosen uniformly within the pool
    pub strategies: Vec<Strategy>,
}

/// Static catalog of strategy pools with weighted-random selection.
#[derive(Debug, Clone)]
pub struct StrategyCatalog {
    pools: Vec<StrategyPool>,
    weights: WeightedIndex<u32>,
}

impl StrategyCatalog {
    /// Build a catalog from validated pools.
    ///
    /// Fails if there are no pools, a pool is empty, or all weights are zero.
    pub fn new(pools: Vec<StrategyPool>) -> Result<Self> {
        if pools.is_empty() {
            return Err(AppError::validation("No strategy pools defined"));
        }
        for pool in &pools {
            if pool.strategies.is_empty() {
                return Err(AppError::validation(format!(
                    "Strategy pool '{}' has no strategies",
                    pool.name
                )));
            }
        }
        let weights = WeightedIndex::new(pools.iter().map(|p| p.weight))
            .map_err(|e| AppError::validation(format!("Invalid pool weights: {e}")))?;
        Ok(Self { pools, weights })
    }

    /// Pick a strategy: weighted-random over pools, uniform within the pool.
    pub fn pick<R: Rng>(&self, rng: &mut R) -> (&Strategy, Category) {
        let pool = &self.pools[self.weights.sample(rng)];
        let strategy = &pool.strategies[rng.gen_range(0..pool.strategies.len())];
        (strategy, pool.category)
    }
}
