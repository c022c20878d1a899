//! Engine settings loaded from the environment.
//!
//! Every value has a default; a variable that is set but cannot be parsed is
//! ignored with a warning rather than failing startup.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::retry::RetryConfig;

pub const ENV_TICK_INTERVAL_MS: &str = "WARBANNER_TICK_INTERVAL_MS";
pub const ENV_TICK_TIMEOUT_MS: &str = "WARBANNER_TICK_TIMEOUT_MS";
pub const ENV_TERRITORY_SWEEP_SECS: &str = "WARBANNER_TERRITORY_SWEEP_SECS";
pub const ENV_PREPARATION_SECS: &str = "WARBANNER_PREPARATION_SECS";
pub const ENV_TERRITORY_XP_BONUS: &str = "WARBANNER_TERRITORY_XP_BONUS";
pub const ENV_STORE_RETRIES: &str = "WARBANNER_STORE_RETRIES";
pub const ENV_STORE_RETRY_DELAY_MS: &str = "WARBANNER_STORE_RETRY_DELAY_MS";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Interval between combat ticks.
    pub tick_interval_ms: u64,
    /// Upper bound for one tick, storage calls included.
    pub tick_timeout_ms: u64,
    /// Interval between territory battle sweeps.
    pub territory_sweep_secs: u64,
    /// Delay between declaring a contested battle and its start.
    pub preparation_secs: u64,
    /// Experience granted to every participant of a completed battle.
    pub territory_xp_bonus: u64,
    /// Retries for a single storage write within a tick.
    pub store_retries: u32,
    pub store_retry_delay_ms: u64,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            tick_interval_ms: 3000,
            tick_timeout_ms: 2000,
            territory_sweep_secs: 10,
            preparation_secs: 300,
            territory_xp_bonus: 100,
            store_retries: 2,
            store_retry_delay_ms: 50,
        }
    }
}

impl EngineSettings {
    /// Read settings from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through an arbitrary lookup (tests pass a map).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            tick_interval_ms: parse_or(&lookup, ENV_TICK_INTERVAL_MS, defaults.tick_interval_ms),
            tick_timeout_ms: parse_or(&lookup, ENV_TICK_TIMEOUT_MS, defaults.tick_timeout_ms),
            territory_sweep_secs: parse_or(
                &lookup,
                ENV_TERRITORY_SWEEP_SECS,
                defaults.territory_sweep_secs,
            ),
            preparation_secs: parse_or(&lookup, ENV_PREPARATION_SECS, defaults.preparation_secs),
            territory_xp_bonus: parse_or(
                &lookup,
                ENV_TERRITORY_XP_BONUS,
                defaults.territory_xp_bonus,
            ),
            store_retries: parse_or(&lookup, ENV_STORE_RETRIES, defaults.store_retries),
            store_retry_delay_ms: parse_or(
                &lookup,
                ENV_STORE_RETRY_DELAY_MS,
                defaults.store_retry_delay_ms,
            ),
        }
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn tick_timeout(&self) -> Duration {
        Duration::from_millis(self.tick_timeout_ms)
    }

    pub fn territory_sweep_interval(&self) -> Duration {
        Duration::from_secs(self.territory_sweep_secs)
    }

    pub fn preparation_window(&self) -> chrono::Duration {
        i64::try_from(self.preparation_secs)
            .ok()
            .and_then(chrono::Duration::try_seconds)
            .unwrap_or_else(|| chrono::Duration::minutes(5))
    }

    /// Retry policy for storage writes inside a tick.
    pub fn store_retry(&self) -> RetryConfig {
        RetryConfig {
            max_retries: self.store_retries,
            base_delay_ms: self.store_retry_delay_ms,
            max_delay_ms: self.store_retry_delay_ms.saturating_mul(8),
            jitter_factor: 0.2,
        }
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy + std::fmt::Display,
{
    match lookup(key) {
        None => default,
        Some(raw) => match raw.trim().parse::<T>() {
            Ok(value) => value,
            Err(_) => {
                tracing::warn!(
                    key = key,
                    value = %raw,
                    default = %default,
                    "Invalid setting, using default"
                );
                default
            }
        },
    }
}
