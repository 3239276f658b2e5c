//! Trading-pair index client.
//!
//! Fetches every AMM pair for a mint from the public DexScreener API. No
//! credential required. Pairs carry the liquidity, volume, transaction, and
//! social-link data that enrichment fuses into the token record.

use std::time::{Duration, Instant};

use serde::Deserialize;

use crate::logger::{self, LogTag};

use super::client::{RateLimiter, TtlCache};
use super::stats::{ApiStats, ApiStatsTracker};

const BASE_URL: &str = "https://api.dexscreener.com";
const CHAIN_ID: &str = "solana";
const TIMEOUT: Duration = Duration::from_secs(10);
const RATE_LIMIT_PER_MINUTE: usize = 300;
const CACHE_TTL: Duration = Duration::from_secs(30);

/// One trading pair, flattened from the provider's nested payload.
#[derive(Debug, Clone, Default)]
pub struct TokenPair {
    pub pair_address: String,
    pub exchange: String,
    pub price_usd: f64,
    pub liquidity_usd: f64,
    pub market_cap: Option<f64>,
    pub volume_24h: f64,
    pub volume_1h: f64,
    pub volume_5m: f64,
    pub buys_24h: i64,
    pub sells_24h: i64,
    pub buys_1h: i64,
    pub sells_1h: i64,
    pub buys_5m: i64,
    pub sells_5m: i64,
    pub price_change_24h: f64,
    pub price_change_1h: f64,
    pub price_change_5m: f64,
    /// Pair creation time, ms since epoch.
    pub pair_created_at: Option<i64>,
    pub image_url: Option<String>,
    pub websites: Vec<String>,
    /// (platform, url) pairs, e.g. ("twitter", "https://...").
    pub socials: Vec<(String, String)>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PairRaw {
    pair_address: Option<String>,
    dex_id: Option<String>,
    price_usd: Option<String>,
    liquidity: Option<LiquidityRaw>,
    market_cap: Option<f64>,
    fdv: Option<f64>,
    volume: Option<WindowsRaw>,
    txns: Option<TxnsRaw>,
    price_change: Option<WindowsRaw>,
    pair_created_at: Option<i64>,
    info: Option<PairInfoRaw>,
}

#[derive(Debug, Deserialize)]
struct LiquidityRaw {
    usd: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct WindowsRaw {
    m5: Option<f64>,
    h1: Option<f64>,
    h24: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct TxnsRaw {
    m5: Option<TxnWindowRaw>,
    h1: Option<TxnWindowRaw>,
    h24: Option<TxnWindowRaw>,
}

#[derive(Debug, Deserialize)]
struct TxnWindowRaw {
    buys: Option<i64>,
    sells: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PairInfoRaw {
    image_url: Option<String>,
    websites: Option<Vec<LinkRaw>>,
    socials: Option<Vec<SocialRaw>>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LinkRaw {
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SocialRaw {
    #[serde(alias = "type")]
    platform: Option<String>,
    url: Option<String>,
}

impl PairRaw {
    fn into_pair(self) -> TokenPair {
        let txns = self.txns;
        let (buys_5m, sells_5m) = window_counts(txns.as_ref().and_then(|t| t.m5.as_ref()));
        let (buys_1h, sells_1h) = window_counts(txns.as_ref().and_then(|t| t.h1.as_ref()));
        let (buys_24h, sells_24h) = window_counts(txns.as_ref().and_then(|t| t.h24.as_ref()));

        let volume = self.volume.unwrap_or_default();
        let price_change = self.price_change.unwrap_or_default();

        let info = self.info;
        let (image_url, websites, socials, description) = match info {
            Some(info) => (
                info.image_url,
                info.websites
                    .unwrap_or_default()
                    .into_iter()
                    .filter_map(|w| w.url)
                    .collect(),
                info.socials
                    .unwrap_or_default()
                    .into_iter()
                    .filter_map(|s| match (s.platform, s.url) {
                        (Some(platform), Some(url)) => Some((platform.to_lowercase(), url)),
                        _ => None,
                    })
                    .collect(),
                info.description,
            ),
            None => (None, Vec::new(), Vec::new(), None),
        };

        TokenPair {
            pair_address: self.pair_address.unwrap_or_default(),
            exchange: self.dex_id.unwrap_or_default(),
            price_usd: self
                .price_usd
                .and_then(|p| p.parse::<f64>().ok())
                .unwrap_or(0.0),
            liquidity_usd: self.liquidity.and_then(|l| l.usd).unwrap_or(0.0),
            market_cap: self.market_cap.or(self.fdv),
            volume_24h: volume.h24.unwrap_or(0.0),
            volume_1h: volume.h1.unwrap_or(0.0),
            volume_5m: volume.m5.unwrap_or(0.0),
            buys_24h,
            sells_24h,
            buys_1h,
            sells_1h,
            buys_5m,
            sells_5m,
            price_change_24h: price_change.h24.unwrap_or(0.0),
            price_change_1h: price_change.h1.unwrap_or(0.0),
            price_change_5m: price_change.m5.unwrap_or(0.0),
            pair_created_at: self.pair_created_at,
            image_url,
            websites,
            socials,
            description,
        }
    }
}

fn window_counts(window: Option<&TxnWindowRaw>) -> (i64, i64) {
    match window {
        Some(w) => (w.buys.unwrap_or(0), w.sells.unwrap_or(0)),
        None => (0, 0),
    }
}

pub struct PairIndexClient {
    client: reqwest::Client,
    limiter: RateLimiter,
    stats: ApiStatsTracker,
    cache: TtlCache<String, Vec<TokenPair>>,
}

impl PairIndexClient {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            client,
            limiter: RateLimiter::new(RATE_LIMIT_PER_MINUTE),
            stats: ApiStatsTracker::new(),
            cache: TtlCache::new(CACHE_TTL),
        }
    }

    /// All trading pairs for a mint, most liquid first. Empty on any failure.
    pub async fn get_pairs(&self, mint: &str) -> Vec<TokenPair> {
        if let Some(cached) = self.cache.get(&mint.to_string()) {
            self.stats.record_cache_hit();
            return cached;
        }

        match self.fetch(mint).await {
            Ok(mut pairs) => {
                pairs.sort_by(|a, b| {
                    b.liquidity_usd
                        .partial_cmp(&a.liquidity_usd)
                        .unwrap_or(std::cmp::Ordering::Equal)
                });
                self.cache.insert(mint.to_string(), pairs.clone());
                pairs
            }
            Err(e) => {
                self.stats.record_error(e.clone());
                logger::warning(
                    LogTag::Api,
                    &format!("pair index failed for {}: {}", mint, e),
                );
                Vec::new()
            }
        }
    }

    async fn fetch(&self, mint: &str) -> Result<Vec<TokenPair>, String> {
        let url = format!("{}/token-pairs/v1/{}/{}", BASE_URL, CHAIN_ID, mint);
        let _guard = self.limiter.acquire().await?;

        let start = Instant::now();
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| format!("request failed: {}", e))?;
        let elapsed = start.elapsed().as_millis() as f64;

        if !response.status().is_success() {
            self.stats.record_request(false, elapsed);
            return Err(format!("http {}", response.status()));
        }

        let pairs: Vec<PairRaw> = response
            .json()
            .await
            .map_err(|e| format!("parse error: {}", e))?;
        self.stats.record_request(true, elapsed);
        Ok(pairs.into_iter().map(PairRaw::into_pair).collect())
    }

    pub fn stats(&self) -> ApiStats {
        self.stats.snapshot()
    }
}

impl Default for PairIndexClient {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_pair_flattens_nested_payload() {
        let raw: PairRaw = serde_json::from_str(
            r#"{
                "pairAddress": "PAIR",
                "dexId": "raydium",
                "priceUsd": "0.00123",
                "liquidity": {"usd": 45000.0},
                "marketCap": 250000.0,
                "volume": {"m5": 100.0, "h1": 1200.0, "h24": 90000.0},
                "txns": {"h24": {"buys": 400, "sells": 350}, "h1": {"buys": 30, "sells": 20}},
                "priceChange": {"m5": -2.5, "h1": 10.0, "h24": 45.0},
                "pairCreatedAt": 1736900000000,
                "info": {
                    "imageUrl": "https://cdn.example/img.png",
                    "websites": [{"url": "https://token.example"}],
                    "socials": [{"type": "twitter", "url": "https://x.com/token"}]
                }
            }"#,
        )
        .unwrap();

        let pair = raw.into_pair();
        assert_eq!(pair.exchange, "raydium");
        assert!((pair.price_usd - 0.00123).abs() < 1e-12);
        assert_eq!(pair.buys_24h, 400);
        assert_eq!(pair.sells_24h, 350);
        assert_eq!(pair.volume_1h, 1200.0);
        assert_eq!(pair.pair_created_at, Some(1736900000000));
        assert_eq!(pair.websites, vec!["https://token.example".to_string()]);
        assert_eq!(
            pair.socials,
            vec![("twitter".to_string(), "https://x.com/token".to_string())]
        );
    }

    #[test]
    fn empty_payload_yields_zeroed_pair() {
        let raw: PairRaw = serde_json::from_str("{}").unwrap();
        let pair = raw.into_pair();
        assert_eq!(pair.price_usd, 0.0);
        assert_eq!(pair.liquidity_usd, 0.0);
        assert_eq!(pair.buys_24h, 0);
        assert!(pair.websites.is_empty());
    }
}
