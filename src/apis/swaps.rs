//! Swap feed client.
//!
//! Pages through recent swaps for a mint. Enrichment aggregates the result
//! into 24h trade counts, unique traders, and wash-trading signals.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::DateTime;
use reqwest::StatusCode;
use serde::Deserialize;

use crate::logger::{self, log, LogTag};

use super::client::{KeyRing, RateLimiter, TtlCache};
use super::stats::{ApiStats, ApiStatsTracker};
use super::flex_f64;

const BASE_URL: &str = "https://solana-gateway.moralis.io";
const TIMEOUT: Duration = Duration::from_secs(10);
const RATE_LIMIT_PER_MINUTE: usize = 120;
const CACHE_TTL: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapKind {
    Buy,
    Sell,
}

/// One swap against the token's pools.
#[derive(Debug, Clone)]
pub struct SwapEvent {
    pub kind: SwapKind,
    pub value_usd: f64,
    pub wallet: String,
    /// Ms since epoch.
    pub timestamp: i64,
}

#[derive(Debug, Deserialize)]
struct SwapsResponse {
    #[serde(default)]
    result: Vec<SwapRaw>,
    cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SwapRaw {
    transaction_type: Option<String>,
    #[serde(default, deserialize_with = "flex_f64")]
    total_value_usd: Option<f64>,
    wallet_address: Option<String>,
    block_timestamp: Option<String>,
}

impl SwapRaw {
    fn into_event(self) -> Option<SwapEvent> {
        let kind = match self.transaction_type.as_deref() {
            Some("buy") => SwapKind::Buy,
            Some("sell") => SwapKind::Sell,
            _ => return None,
        };
        let timestamp = self
            .block_timestamp
            .as_deref()
            .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
            .map(|dt| dt.timestamp_millis())?;
        Some(SwapEvent {
            kind,
            value_usd: self.total_value_usd.unwrap_or(0.0),
            wallet: self.wallet_address?,
            timestamp,
        })
    }
}

pub struct SwapsClient {
    client: reqwest::Client,
    keys: Arc<KeyRing>,
    limiter: RateLimiter,
    stats: ApiStatsTracker,
    cache: TtlCache<String, Vec<SwapEvent>>,
}

impl SwapsClient {
    pub fn new(keys: Arc<KeyRing>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            client,
            keys,
            limiter: RateLimiter::new(RATE_LIMIT_PER_MINUTE),
            stats: ApiStatsTracker::new(),
            cache: TtlCache::new(CACHE_TTL),
        }
    }

    /// Swaps newer than `since` (ms since epoch), newest first. Pages until
    /// `max_pages` or until entries fall behind `since`. Empty on failure.
    pub async fn get_recent_swaps(
        &self,
        mint: &str,
        since: i64,
        page_limit: usize,
        max_pages: usize,
    ) -> Vec<SwapEvent> {
        // Cached by mint only: `since` moves with the clock, but within the
        // cache TTL the answer is the same page set.
        let cache_key = mint.to_string();
        if let Some(cached) = self.cache.get(&cache_key) {
            self.stats.record_cache_hit();
            return cached;
        }

        let mut swaps: Vec<SwapEvent> = Vec::new();
        let mut cursor: Option<String> = None;

        for _ in 0..max_pages.max(1) {
            match self.fetch_page(mint, page_limit, cursor.as_deref()).await {
                Ok(page) => {
                    let mut reached_since = false;
                    for raw in page.result {
                        if let Some(event) = raw.into_event() {
                            if event.timestamp < since {
                                reached_since = true;
                                break;
                            }
                            swaps.push(event);
                        }
                    }
                    cursor = page.cursor;
                    if reached_since || cursor.is_none() {
                        break;
                    }
                }
                Err(e) => {
                    self.stats.record_error(e.clone());
                    logger::warning(
                        LogTag::Api,
                        &format!("swap feed failed for {}: {}", mint, e),
                    );
                    break;
                }
            }
        }

        self.cache.insert(cache_key, swaps.clone());
        swaps
    }

    async fn fetch_page(
        &self,
        mint: &str,
        limit: usize,
        cursor: Option<&str>,
    ) -> Result<SwapsResponse, String> {
        if self.keys.is_empty() {
            return Err("no market-data API keys configured".to_string());
        }

        let mut url = format!(
            "{}/token/mainnet/{}/swaps?order=DESC&limit={}",
            BASE_URL, mint, limit
        );
        if let Some(cursor) = cursor {
            url.push_str("&cursor=");
            url.push_str(cursor);
        }

        let _guard = self.limiter.acquire().await?;

        let mut attempts = 0;
        let mut key = self.keys.current().map(str::to_string);
        loop {
            let Some(api_key) = key else {
                return Err("key ring exhausted".to_string());
            };

            let start = Instant::now();
            let response = self
                .client
                .get(&url)
                .header("X-API-Key", &api_key)
                .send()
                .await
                .map_err(|e| format!("request failed: {}", e))?;
            let elapsed = start.elapsed().as_millis() as f64;
            let status = response.status();

            if status == StatusCode::UNAUTHORIZED || status == StatusCode::TOO_MANY_REQUESTS {
                self.stats.record_request(false, elapsed);
                attempts += 1;
                if attempts >= self.keys.len() {
                    return Err(format!("all {} keys rejected ({})", attempts, status));
                }
                log(
                    LogTag::Api,
                    "ROTATE",
                    &format!("swap feed got {}, rotating key", status),
                );
                key = self.keys.advance().map(str::to_string);
                continue;
            }

            if status == StatusCode::NOT_FOUND {
                self.stats.record_request(true, elapsed);
                return Ok(SwapsResponse {
                    result: Vec::new(),
                    cursor: None,
                });
            }

            if !status.is_success() {
                self.stats.record_request(false, elapsed);
                return Err(format!("http {}", status));
            }

            let parsed = response
                .json::<SwapsResponse>()
                .await
                .map_err(|e| format!("parse error: {}", e))?;
            self.stats.record_request(true, elapsed);
            return Ok(parsed);
        }
    }

    pub fn stats(&self) -> ApiStats {
        self.stats.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn swap_payload_parses() {
        let raw: SwapRaw = serde_json::from_str(
            r#"{
                "transactionType": "buy",
                "totalValueUsd": "12.34",
                "walletAddress": "WALLET",
                "blockTimestamp": "2025-01-15T10:30:00.000Z"
            }"#,
        )
        .unwrap();

        let event = raw.into_event().unwrap();
        assert_eq!(event.kind, SwapKind::Buy);
        assert!((event.value_usd - 12.34).abs() < 1e-12);
        assert_eq!(event.wallet, "WALLET");
    }

    #[test]
    fn unknown_transaction_type_is_dropped() {
        let raw: SwapRaw = serde_json::from_str(
            r#"{"transactionType": "addLiquidity", "walletAddress": "W",
                "blockTimestamp": "2025-01-15T10:30:00.000Z"}"#,
        )
        .unwrap();
        assert!(raw.into_event().is_none());
    }
}
