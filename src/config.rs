//! Process configuration loaded from the environment.
//!
//! Everything is read once at startup into a [`Settings`] value that is
//! passed explicitly to the components that need it. Tests build their own
//! instances instead of touching the environment.

use std::env;

use crate::errors::PumpwatchError;

/// Thresholds consumed by the scoring engine. Immutable after construction.
#[derive(Debug, Clone)]
pub struct ScoringConfig {
    /// Minimum score for a token to count as "passed".
    pub min_score: i64,
    /// Maximum tolerated developer holdings, fraction of supply.
    pub max_dev_holdings: f64,
    /// Minimum holder count before the low-holder penalties fire.
    pub min_holders: i64,
    /// Maximum tolerated top-10 concentration, fraction of supply.
    pub max_top10: f64,
    /// Minimum unique-trader / total-trade ratio.
    pub min_unique_ratio: f64,
    /// Minimum age in hours before the youngest-token penalty band ends.
    pub min_token_age_hours: f64,
    /// Minimum liquidity / market-cap ratio.
    pub min_liquidity_ratio: f64,
    /// Maximum tolerated short-window price move, percent.
    pub max_price_volatility: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            min_score: 60,
            max_dev_holdings: 0.15,
            min_holders: 50,
            max_top10: 0.30,
            min_unique_ratio: 0.60,
            min_token_age_hours: 1.0,
            min_liquidity_ratio: 0.05,
            max_price_volatility: 50.0,
        }
    }
}

impl ScoringConfig {
    /// Build from environment, falling back to defaults for unset or
    /// unparseable variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            min_score: env_parse("MIN_SCORE_THRESHOLD", defaults.min_score),
            max_dev_holdings: env_parse("MAX_DEV_HOLDINGS", defaults.max_dev_holdings),
            min_holders: env_parse("MIN_HOLDERS", defaults.min_holders),
            max_top10: env_parse("MAX_TOP10_CONCENTRATION", defaults.max_top10),
            min_unique_ratio: env_parse("MIN_UNIQUE_TRADER_RATIO", defaults.min_unique_ratio),
            min_token_age_hours: env_parse("MIN_TOKEN_AGE_HOURS", defaults.min_token_age_hours),
            min_liquidity_ratio: env_parse("MIN_LIQUIDITY_RATIO", defaults.min_liquidity_ratio),
            max_price_volatility: env_parse("MAX_PRICE_VOLATILITY", defaults.max_price_volatility),
        }
    }
}

/// Credentials and endpoints for the external providers.
#[derive(Debug, Clone, Default)]
pub struct ProviderSettings {
    /// Ordered market-data API keys: primary first, fallbacks after.
    pub market_data_keys: Vec<String>,
    /// Solana JSON-RPC endpoints, tried round-robin.
    pub rpc_urls: Vec<String>,
    /// Enhanced transaction-history API key (optional).
    pub history_api_key: Option<String>,
    /// Upstream migration stream URL.
    pub migration_ws_url: String,
}

/// Full process settings.
#[derive(Debug, Clone)]
pub struct Settings {
    pub scoring: ScoringConfig,
    pub providers: ProviderSettings,
    pub port: u16,
}

impl Settings {
    pub fn from_env() -> Result<Self, PumpwatchError> {
        let mut market_data_keys = Vec::new();
        for var in ["MARKET_DATA_API_KEY", "MARKET_DATA_API_KEY_2", "MARKET_DATA_API_KEY_3"] {
            if let Ok(key) = env::var(var) {
                let key = key.trim().to_string();
                if !key.is_empty() {
                    market_data_keys.push(key);
                }
            }
        }

        let mut rpc_urls: Vec<String> = env::var("RPC_URLS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        if rpc_urls.is_empty() {
            rpc_urls.push("https://api.mainnet-beta.solana.com".to_string());
        }

        let history_api_key = env::var("HISTORY_API_KEY")
            .ok()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());

        let migration_ws_url = env::var("MIGRATION_WS_URL")
            .unwrap_or_else(|_| "wss://pumpportal.fun/api/data".to_string());

        let port = match env::var("PORT") {
            Ok(raw) => raw.parse::<u16>().map_err(|_| {
                PumpwatchError::configuration(format!("invalid PORT value: {}", raw))
            })?,
            Err(_) => 3000,
        };

        Ok(Self {
            scoring: ScoringConfig::from_env(),
            providers: ProviderSettings {
                market_data_keys,
                rpc_urls,
                history_api_key,
                migration_ws_url,
            },
            port,
        })
    }
}

fn env_parse<T: std::str::FromStr>(var: &str, default: T) -> T {
    env::var(var)
        .ok()
        .and_then(|raw| raw.trim().parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scoring_defaults() {
        let config = ScoringConfig::default();
        assert_eq!(config.min_score, 60);
        assert!((config.max_dev_holdings - 0.15).abs() < f64::EPSILON);
        assert_eq!(config.min_holders, 50);
        assert!((config.max_top10 - 0.30).abs() < f64::EPSILON);
    }
}
