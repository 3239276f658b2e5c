//! SOL/USD price oracle.
//!
//! Caches the price for 30 seconds and tries independent public sources in
//! order, accepting the first positive finite number. When every source
//! fails the oracle returns `None`: conversions must degrade, never run on a
//! fabricated or stale price.

use std::time::{Duration, Instant};

use parking_lot::RwLock;
use serde::Deserialize;

use crate::logger::{self, LogTag};

const CACHE_TTL: Duration = Duration::from_secs(30);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

const JUPITER_PRICE_API: &str =
    "https://lite-api.jup.ag/price/v3?ids=So11111111111111111111111111111111111111112";
const COINGECKO_PRICE_API: &str =
    "https://api.coingecko.com/api/v3/simple/price?ids=solana&vs_currencies=usd";
const BINANCE_PRICE_API: &str = "https://api.binance.com/api/v3/ticker/price?symbol=SOLUSDT";

#[derive(Debug, Clone, Copy)]
struct CachedPrice {
    price: f64,
    fetched_at: Instant,
}

/// Shared SOL price cache. Construct once and pass by `Arc`.
pub struct SolPriceOracle {
    client: reqwest::Client,
    cached: RwLock<Option<CachedPrice>>,
}

#[derive(Deserialize)]
struct JupiterTokenPrice {
    #[serde(rename = "usdPrice")]
    usd_price: f64,
}

#[derive(Deserialize)]
struct CoinGeckoSolana {
    usd: f64,
}

#[derive(Deserialize)]
struct CoinGeckoResponse {
    solana: CoinGeckoSolana,
}

#[derive(Deserialize)]
struct BinanceTicker {
    price: String,
}

impl SolPriceOracle {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            client,
            cached: RwLock::new(None),
        }
    }

    /// Current SOL price in USD, or `None` when no source is reachable.
    pub async fn get_price_usd(&self) -> Option<f64> {
        if let Some(cached) = *self.cached.read() {
            if cached.fetched_at.elapsed() < CACHE_TTL {
                return Some(cached.price);
            }
        }

        for name in ["jupiter", "coingecko", "binance"] {
            let fetch = match name {
                "jupiter" => self.fetch_jupiter().await,
                "coingecko" => self.fetch_coingecko().await,
                _ => self.fetch_binance().await,
            };
            match fetch {
                Ok(price) if price > 0.0 && price.is_finite() => {
                    *self.cached.write() = Some(CachedPrice {
                        price,
                        fetched_at: Instant::now(),
                    });
                    logger::debug(
                        LogTag::SolPrice,
                        &format!("SOL price ${:.4} from {}", price, name),
                    );
                    return Some(price);
                }
                Ok(price) => {
                    logger::warning(
                        LogTag::SolPrice,
                        &format!("{} returned invalid SOL price: {}", name, price),
                    );
                }
                Err(e) => {
                    logger::debug(LogTag::SolPrice, &format!("{} failed: {}", name, e));
                }
            }
        }

        logger::warning(LogTag::SolPrice, "All SOL price sources failed");
        None
    }

    pub async fn sol_to_usd(&self, amount_sol: f64) -> Option<f64> {
        self.get_price_usd().await.map(|price| amount_sol * price)
    }

    pub async fn usd_to_sol(&self, amount_usd: f64) -> Option<f64> {
        self.get_price_usd()
            .await
            .filter(|price| *price > 0.0)
            .map(|price| amount_usd / price)
    }

    async fn fetch_jupiter(&self) -> Result<f64, String> {
        let response: serde_json::Value = self
            .client
            .get(JUPITER_PRICE_API)
            .send()
            .await
            .map_err(|e| format!("request failed: {}", e))?
            .error_for_status()
            .map_err(|e| format!("http error: {}", e))?
            .json()
            .await
            .map_err(|e| format!("parse error: {}", e))?;

        let token: JupiterTokenPrice = response
            .get("So11111111111111111111111111111111111111112")
            .cloned()
            .and_then(|v| serde_json::from_value(v).ok())
            .ok_or_else(|| "missing SOL entry".to_string())?;
        Ok(token.usd_price)
    }

    async fn fetch_coingecko(&self) -> Result<f64, String> {
        let response: CoinGeckoResponse = self
            .client
            .get(COINGECKO_PRICE_API)
            .send()
            .await
            .map_err(|e| format!("request failed: {}", e))?
            .error_for_status()
            .map_err(|e| format!("http error: {}", e))?
            .json()
            .await
            .map_err(|e| format!("parse error: {}", e))?;
        Ok(response.solana.usd)
    }

    async fn fetch_binance(&self) -> Result<f64, String> {
        let response: BinanceTicker = self
            .client
            .get(BINANCE_PRICE_API)
            .send()
            .await
            .map_err(|e| format!("request failed: {}", e))?
            .error_for_status()
            .map_err(|e| format!("http error: {}", e))?
            .json()
            .await
            .map_err(|e| format!("parse error: {}", e))?;
        response
            .price
            .parse::<f64>()
            .map_err(|e| format!("bad price string: {}", e))
    }

    /// Seed the cache directly. Test helper.
    #[cfg(test)]
    pub fn with_cached_price(price: f64) -> Self {
        let oracle = Self::new();
        *oracle.cached.write() = Some(CachedPrice {
            price,
            fetched_at: Instant::now(),
        });
        oracle
    }
}

impl Default for SolPriceOracle {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn cached_price_is_served_and_converted() {
        let oracle = SolPriceOracle::with_cached_price(200.0);
        assert_eq!(oracle.get_price_usd().await, Some(200.0));
        assert_eq!(oracle.sol_to_usd(2.0).await, Some(400.0));
        assert_eq!(oracle.usd_to_sol(100.0).await, Some(0.5));
    }
}
