//! Application configuration structures.

use std::fs;
use std::path::Path;

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::promotion::Promotion;
use crate::models::strategy::{Category, Strategy, StrategyKind, StrategyPool};

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Cycle, delay and schedule settings
    #[serde(default)]
    pub timing: TimingConfig,

    /// Catalog search behavior settings
    #[serde(default)]
    pub search: SearchConfig,

    /// Weighted strategy pools
    #[serde(default = "defaults::default_pools")]
    pub pools: Vec<StrategyPool>,

    /// Daily promotional messages, published in order
    #[serde(default = "defaults::default_promotions")]
    pub promotions: Vec<Promotion>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.search.per_cycle_cap == 0 {
            return Err(AppError::validation("search.per_cycle_cap must be > 0"));
        }
        if self.search.max_page == 0 {
            return Err(AppError::validation("search.max_page must be > 0"));
        }
        if self.search.item_count == 0 {
            return Err(AppError::validation("search.item_count must be > 0"));
        }
        if self.search.timeout_secs == 0 {
            return Err(AppError::validation("search.timeout_secs must be > 0"));
        }
        if self.search.user_agent.trim().is_empty() {
            return Err(AppError::validation("search.user_agent is empty"));
        }
        if self.timing.cycle_interval_secs == 0 {
            return Err(AppError::validation("timing.cycle_interval_secs must be > 0"));
        }
        if self.timing.poll_interval_secs == 0 {
            return Err(AppError::validation("timing.poll_interval_secs must be > 0"));
        }
        self.broadcast_time()?;
        if self.pools.is_empty() {
            return Err(AppError::validation("No strategy pools defined"));
        }
        for pool in &self.pools {
            if pool.strategies.is_empty() {
                return Err(AppError::validation(format!(
                    "Strategy pool '{}' has no strategies",
                    pool.name
                )));
            }
        }
        if self.pools.iter().all(|p| p.weight == 0) {
            return Err(AppError::validation("All pool weights are zero"));
        }
        for promo in &self.promotions {
            if promo.url.trim().is_empty() {
                return Err(AppError::validation(format!(
                    "Promotion '{}' has an empty URL",
                    promo.name
                )));
            }
        }
        Ok(())
    }

    /// Parse the daily broadcast trigger time.
    pub fn broadcast_time(&self) -> Result<NaiveTime> {
        NaiveTime::parse_from_str(&self.timing.broadcast_at, "%H:%M").map_err(|e| {
            AppError::validation(format!(
                "Invalid timing.broadcast_at '{}': {e}",
                self.timing.broadcast_at
            ))
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timing: TimingConfig::default(),
            search: SearchConfig::default(),
            pools: defaults::default_pools(),
            promotions: defaults::default_promotions(),
        }
    }
}

/// Cycle, delay and schedule settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingConfig {
    /// Sleep between discovery cycles, in seconds
    #[serde(default = "defaults::cycle_interval")]
    pub cycle_interval_secs: u64,

    /// Delay between successive publishes within a cycle, in seconds
    #[serde(default = "defaults::publish_delay")]
    pub publish_delay_secs: u64,

    /// Delay between promotional messages in the daily broadcast, in seconds
    #[serde(default = "defaults::broadcast_delay")]
    pub broadcast_delay_secs: u64,

    /// Local wall-clock time of the daily broadcast ("HH:MM")
    #[serde(default = "defaults::broadcast_at")]
    pub broadcast_at: String,

    /// Clock-poll interval of the broadcaster, in seconds
    #[serde(default = "defaults::poll_interval")]
    pub poll_interval_secs: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            cycle_interval_secs: defaults::cycle_interval(),
            publish_delay_secs: defaults::publish_delay(),
            broadcast_delay_secs: defaults::broadcast_delay(),
            broadcast_at: defaults::broadcast_at(),
            poll_interval_secs: defaults::poll_interval(),
        }
    }
}

/// Catalog search behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Items requested per search call
    #[serde(default = "defaults::item_count")]
    pub item_count: u8,

    /// Result pages are chosen at random from 1..=max_page
    #[serde(default = "defaults::max_page")]
    pub max_page: u32,

    /// Maximum publishes per discovery cycle
    #[serde(default = "defaults::per_cycle_cap")]
    pub per_cycle_cap: usize,

    /// HTTP request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            item_count: defaults::item_count(),
            max_page: defaults::max_page(),
            per_cycle_cap: defaults::per_cycle_cap(),
            timeout_secs: defaults::timeout(),
            user_agent: defaults::user_agent(),
        }
    }
}

mod defaults {
    use super::{Category, Promotion, Strategy, StrategyKind, StrategyPool};

    // Timing defaults
    pub fn cycle_interval() -> u64 {
        45 * 60
    }
    pub fn publish_delay() -> u64 {
        30
    }
    pub fn broadcast_delay() -> u64 {
        10
    }
    pub fn broadcast_at() -> String {
        "12:00".into()
    }
    pub fn poll_interval() -> u64 {
        60
    }

    // Search defaults
    pub fn item_count() -> u8 {
        10
    }
    pub fn max_page() -> u32 {
        5
    }
    pub fn per_cycle_cap() -> usize {
        2
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; chollobot/1.0)".into()
    }

    fn keyword(value: &str, name: &str, min_saving: u8) -> Strategy {
        Strategy {
            kind: StrategyKind::Keyword,
            value: value.to_string(),
            name: name.to_string(),
            min_saving: Some(min_saving),
        }
    }

    // Pool defaults
    pub fn default_pools() -> Vec<StrategyPool> {
        vec![
            StrategyPool {
                name: "back-to-school".to_string(),
                category: Category::BackToSchool,
                weight: 80,
                strategies: vec![
                    keyword("mochilas escolares", "Mochilas Escolares", 15),
                    keyword("estuches escolares", "Estuches", 10),
                    keyword("libros de texto", "Libros de Texto", 5),
                    keyword("material escolar", "Material Escolar", 20),
                    keyword("calculadoras cientificas", "Calculadoras Científicas", 10),
                    keyword("agendas escolares 2025 2026", "Agendas Escolares", 15),
                    keyword(
                        "portatiles para estudiantes",
                        "Portátiles para Estudiantes",
                        20,
                    ),
                    keyword("monitores para ordenador", "Monitores", 25),
                    keyword("uniforme escolar", "Uniformes Escolares", 15),
                    keyword("zapatos colegiales", "Zapatos Colegiales", 20),
                ],
            },
            StrategyPool {
                name: "youth-apparel".to_string(),
                category: Category::YouthApparel,
                weight: 20,
                strategies: vec![
                    keyword("sudaderas con capucha joven", "Sudaderas con Capucha", 25),
                    keyword("zapatillas casual mujer", "Zapatillas Casual (Mujer)", 30),
                    keyword("zapatillas casual hombre", "Zapatillas Casual (Hombre)", 30),
                    keyword("vaqueros slim fit hombre", "Vaqueros Slim Fit", 20),
                    keyword("vestidos juveniles", "Vestidos Juveniles", 25),
                    keyword("ropa deportiva niño", "Ropa Deportiva (Niño)", 20),
                ],
            },
        ]
    }

    // Promotion defaults
    pub fn default_promotions() -> Vec<Promotion> {
        vec![
            Promotion {
                name: "Prime Student".to_string(),
                text: "🎓 **¡Atención, Estudiante! 90 DÍAS GRATIS de Amazon Prime** 🎓\n\n\
                       Consigue todas las ventajas de Prime y ahorra como nunca:\n\n\
                       ✅ **90 días de prueba GRATIS**\n\
                       ✅ 50% de descuento tras la prueba (solo 24,95 €/año)\n\
                       ✅ Envíos rápidos y GRATIS en millones de productos\n\
                       ✅ Acceso a Prime Video, Music, Reading y más\n\
                       ✅ Descuentos exclusivos en productos para estudiantes\n\n\
                       ¡Prepárate para el curso y ahorra a lo grande!"
                    .to_string(),
                url: "http://www.amazon.es/joinstudent?tag={tag}".to_string(),
                image_url: Some("https://i.imgur.com/O515d1f.png".to_string()),
            },
            Promotion {
                name: "Amazon Prime (Prueba Gratuita)".to_string(),
                text: "🔥 **Prueba Amazon Prime GRATIS durante 30 días** 🔥\n\n\
                       Descubre un mundo de ventajas sin coste alguno:\n\n\
                       ✅ Envíos GRATIS y rápidos (en 1 día para millones de productos)\n\
                       ✅ Acceso a miles de películas y series en **Prime Video**\n\
                       ✅ Más de 2 millones de canciones sin anuncios con **Prime Music**\n\
                       ✅ Cientos de eBooks gratis con **Prime Reading**\n\
                       ✅ Ofertas Flash exclusivas\n\n\
                       ¿A qué esperas para disfrutar de todo esto?"
                    .to_string(),
                url: "https://www.amazon.es/tryprime?tag={tag}".to_string(),
                image_url: Some("https://i.imgur.com/2E35Y1e.png".to_string()),
            },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn validate_default_config_ok() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn default_pools_carry_expected_weights() {
        let config = Config::default();
        assert_eq!(config.pools.len(), 2);
        assert_eq!(config.pools[0].weight, 80);
        assert_eq!(config.pools[1].weight, 20);
        assert_eq!(config.promotions.len(), 2);
    }

    #[test]
    fn validate_rejects_zero_cap() {
        let mut config = Config::default();
        config.search.per_cycle_cap = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_bad_broadcast_time() {
        let mut config = Config::default();
        config.timing.broadcast_at = "noon".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_empty_pool() {
        let mut config = Config::default();
        config.pools[0].strategies.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn broadcast_time_parses_default() {
        let config = Config::default();
        let time = config.broadcast_time().unwrap();
        assert_eq!(time, NaiveTime::from_hms_opt(12, 0, 0).unwrap());
    }

    #[test]
    fn partial_toml_falls_back_to_defaults() {
        let toml = "[timing]\ncycle_interval_secs = 60\n";
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.timing.cycle_interval_secs, 60);
        assert_eq!(config.timing.publish_delay_secs, 30);
        assert_eq!(config.search.per_cycle_cap, 2);
        assert_eq!(config.pools.len(), 2);
    }

    #[test]
    fn load_or_default_survives_missing_file() {
        let config = Config::load_or_default("no/such/config.toml");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn load_reads_a_written_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            "[search]\nper_cycle_cap = 3\n\n[timing]\nbroadcast_at = \"09:30\"\n"
        )
        .unwrap();
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.search.per_cycle_cap, 3);
        assert_eq!(
            config.broadcast_time().unwrap(),
            NaiveTime::from_hms_opt(9, 30, 0).unwrap()
        );
    }
}
