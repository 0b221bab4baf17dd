use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use shared::balance::Balances;
use shared::constants::{INITIAL_COINS, INITIAL_SCRATCHES, INITIAL_SPINS};
use shared::shared_wheel_game::SPIN_DURATION_MS;

use crate::services::ads::{ExternalRewardProvider, MockRewardProvider, RewardProvider};
use crate::storage::{FileStore, KeyValueStore, MemoryStore, RedisStore, StorageResult};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreKind {
    Memory,
    File(PathBuf),
    Redis(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdMode {
    Mock { delay: Duration, grant: bool },
    External { timeout: Duration },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub bind: SocketAddr,
    pub store: StoreKind,
    pub ads: AdMode,
    pub spin_duration: Duration,
    pub initial_balances: Balances,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 3000)),
            store: StoreKind::File(PathBuf::from("spinwin-state.json")),
            ads: AdMode::Mock {
                delay: Duration::from_millis(1500),
                grant: true,
            },
            spin_duration: Duration::from_millis(SPIN_DURATION_MS),
            initial_balances: Balances {
                coins: INITIAL_COINS,
                spins: INITIAL_SPINS,
                scratches: INITIAL_SCRATCHES,
            },
        }
    }
}

impl Config {
    /// Reads `SPINWIN_*` variables from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Config::default();
        let read = |key: &'static str| lookup(key).filter(|v| !v.trim().is_empty());

        let bind = parse_or(read("SPINWIN_BIND"), "SPINWIN_BIND", defaults.bind)?;

        let store = match read("SPINWIN_STORE").as_deref().map(str::trim) {
            None | Some("file") => StoreKind::File(
                read("SPINWIN_STORE_PATH")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from("spinwin-state.json")),
            ),
            Some("memory") => StoreKind::Memory,
            Some("redis") => StoreKind::Redis(
                read("REDIS_URL").unwrap_or_else(|| "redis://127.0.0.1:6379".to_string()),
            ),
            Some(other) => return Err(invalid("SPINWIN_STORE", other, "expected file, redis or memory")),
        };

        let ads = match read("SPINWIN_ADS").as_deref().map(str::trim) {
            None | Some("mock") => AdMode::Mock {
                delay: Duration::from_millis(parse_or(read("SPINWIN_AD_DELAY_MS"), "SPINWIN_AD_DELAY_MS", 1500u64)?),
                grant: parse_or(read("SPINWIN_AD_GRANT"), "SPINWIN_AD_GRANT", true)?,
            },
            Some("external") => AdMode::External {
                timeout: Duration::from_secs(parse_or(read("SPINWIN_AD_TIMEOUT_SECS"), "SPINWIN_AD_TIMEOUT_SECS", 60u64)?),
            },
            Some(other) => return Err(invalid("SPINWIN_ADS", other, "expected mock or external")),
        };

        let spin_duration = Duration::from_millis(parse_or(
            read("SPINWIN_SPIN_DURATION_MS"),
            "SPINWIN_SPIN_DURATION_MS",
            SPIN_DURATION_MS,
        )?);

        let initial_balances = Balances {
            coins: INITIAL_COINS,
            spins: parse_or(read("SPINWIN_INITIAL_SPINS"), "SPINWIN_INITIAL_SPINS", INITIAL_SPINS)?,
            scratches: parse_or(read("SPINWIN_INITIAL_SCRATCHES"), "SPINWIN_INITIAL_SCRATCHES", INITIAL_SCRATCHES)?,
        };

        Ok(Self {
            bind,
            store,
            ads,
            spin_duration,
            initial_balances,
        })
    }

    /// Fails only on a malformed Redis URL. An unreachable server surfaces
    /// later as per-call storage errors.
    pub fn build_store(&self) -> StorageResult<Arc<dyn KeyValueStore>> {
        Ok(match &self.store {
            StoreKind::Memory => Arc::new(MemoryStore::new()),
            StoreKind::File(path) => Arc::new(FileStore::new(path.clone())),
            StoreKind::Redis(url) => Arc::new(RedisStore::open(url)?),
        })
    }

    pub fn build_reward_provider(&self) -> Arc<dyn RewardProvider> {
        match self.ads {
            AdMode::Mock { delay, grant } => Arc::new(MockRewardProvider::new(delay, grant)),
            AdMode::External { timeout } => Arc::new(ExternalRewardProvider::new(timeout)),
        }
    }
}

fn parse_or<T>(raw: Option<String>, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|e: T::Err| invalid(key, &value, &e.to_string())),
    }
}

fn invalid(key: &'static str, value: &str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        key,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.initial_balances, Balances { coins: 0, spins: 10, scratches: 10 });
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("SPINWIN_BIND", "0.0.0.0:8080"),
            ("SPINWIN_STORE", "redis"),
            ("REDIS_URL", "redis://cache:6379"),
            ("SPINWIN_ADS", "external"),
            ("SPINWIN_AD_TIMEOUT_SECS", "30"),
            ("SPINWIN_SPIN_DURATION_MS", "0"),
            ("SPINWIN_INITIAL_SPINS", "2"),
        ]))
        .unwrap();
        assert_eq!(config.bind.port(), 8080);
        assert_eq!(config.store, StoreKind::Redis("redis://cache:6379".to_string()));
        assert_eq!(config.ads, AdMode::External { timeout: Duration::from_secs(30) });
        assert_eq!(config.spin_duration, Duration::ZERO);
        assert_eq!(config.initial_balances.spins, 2);
        assert_eq!(config.initial_balances.scratches, 10);
    }

    #[test]
    fn test_invalid_values() {
        assert!(Config::from_lookup(lookup(&[("SPINWIN_STORE", "sqlite")])).is_err());
        assert!(Config::from_lookup(lookup(&[("SPINWIN_AD_GRANT", "maybe")])).is_err());
        let err = Config::from_lookup(lookup(&[("SPINWIN_INITIAL_SPINS", "-1")])).unwrap_err();
        assert!(err.to_string().contains("SPINWIN_INITIAL_SPINS"));
    }
}
