//! Graduated-token index client.
//!
//! Lists recently graduated pump.fun tokens from the market-data gateway.
//! Authenticated with the shared key ring: a 401/429 rotates to the next
//! credential and retries until the ring is exhausted.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::DateTime;
use reqwest::StatusCode;
use serde::Deserialize;

use crate::logger::{self, log, LogTag};

use super::client::{KeyRing, RateLimiter, TtlCache};
use super::stats::{ApiStats, ApiStatsTracker};
use super::{flex_f64, flex_i64};

const BASE_URL: &str = "https://solana-gateway.moralis.io";
const TIMEOUT: Duration = Duration::from_secs(10);
const RATE_LIMIT_PER_MINUTE: usize = 120;
const CACHE_TTL: Duration = Duration::from_secs(30);

/// One graduated token as reported by the index.
#[derive(Debug, Clone, Default)]
pub struct GraduatedToken {
    pub mint: String,
    pub name: String,
    pub symbol: String,
    pub logo: String,
    pub price_usd: Option<f64>,
    pub liquidity: Option<f64>,
    pub fully_diluted_valuation: Option<f64>,
    /// Graduation time, ms since epoch.
    pub graduated_at: Option<i64>,
    pub pair_address: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GraduatedResponse {
    #[serde(default)]
    result: Vec<GraduatedTokenRaw>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GraduatedTokenRaw {
    token_address: Option<String>,
    name: Option<String>,
    symbol: Option<String>,
    logo: Option<String>,
    #[serde(default, deserialize_with = "flex_f64")]
    price_usd: Option<f64>,
    #[serde(default, deserialize_with = "flex_f64")]
    liquidity: Option<f64>,
    #[serde(default, deserialize_with = "flex_f64")]
    fully_diluted_valuation: Option<f64>,
    graduated_at: Option<String>,
    pair_address: Option<String>,
    #[serde(default, deserialize_with = "flex_i64")]
    #[allow(dead_code)]
    decimals: Option<i64>,
}

impl GraduatedTokenRaw {
    fn into_token(self) -> Option<GraduatedToken> {
        let mint = self.token_address?;
        let graduated_at = self
            .graduated_at
            .as_deref()
            .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
            .map(|dt| dt.timestamp_millis());
        Some(GraduatedToken {
            mint,
            name: self.name.unwrap_or_default(),
            symbol: self.symbol.unwrap_or_default(),
            logo: self.logo.unwrap_or_default(),
            price_usd: self.price_usd,
            liquidity: self.liquidity,
            fully_diluted_valuation: self.fully_diluted_valuation,
            graduated_at,
            pair_address: self.pair_address,
        })
    }
}

pub struct GraduatedIndexClient {
    client: reqwest::Client,
    keys: Arc<KeyRing>,
    limiter: RateLimiter,
    stats: ApiStatsTracker,
    cache: TtlCache<usize, Vec<GraduatedToken>>,
}

impl GraduatedIndexClient {
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

    /// Most recently graduated tokens, newest first. Empty on any failure.
    pub async fn list(&self, limit: usize) -> Vec<GraduatedToken> {
        if let Some(cached) = self.cache.get(&limit) {
            self.stats.record_cache_hit();
            return cached;
        }

        match self.fetch(limit).await {
            Ok(tokens) => {
                self.cache.insert(limit, tokens.clone());
                tokens
            }
            Err(e) => {
                self.stats.record_error(e.clone());
                logger::warning(LogTag::Api, &format!("graduated index failed: {}", e));
                Vec::new()
            }
        }
    }

    async fn fetch(&self, limit: usize) -> Result<Vec<GraduatedToken>, String> {
        if self.keys.is_empty() {
            return Err("no market-data API keys configured".to_string());
        }

        let url = format!(
            "{}/token/mainnet/exchange/pumpfun/graduated?limit={}",
            BASE_URL, limit
        );
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
                .await;
            let elapsed = start.elapsed().as_millis() as f64;

            match response {
                Ok(response) => {
                    let status = response.status();
                    if status == StatusCode::UNAUTHORIZED || status == StatusCode::TOO_MANY_REQUESTS
                    {
                        self.stats.record_request(false, elapsed);
                        attempts += 1;
                        if attempts >= self.keys.len() {
                            return Err(format!("all {} keys rejected ({})", attempts, status));
                        }
                        log(
                            LogTag::Api,
                            "ROTATE",
                            &format!("graduated index got {}, rotating key", status),
                        );
                        key = self.keys.advance().map(str::to_string);
                        continue;
                    }

                    if !status.is_success() {
                        self.stats.record_request(false, elapsed);
                        return Err(format!("http {}", status));
                    }

                    let parsed: GraduatedResponse = response
                        .json()
                        .await
                        .map_err(|e| format!("parse error: {}", e))?;
                    self.stats.record_request(true, elapsed);
                    return Ok(parsed
                        .result
                        .into_iter()
                        .filter_map(GraduatedTokenRaw::into_token)
                        .collect());
                }
                Err(e) => {
                    self.stats.record_request(false, elapsed);
                    return Err(format!("request failed: {}", e));
                }
            }
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
    fn raw_token_parses_flexible_payload() {
        let raw: GraduatedTokenRaw = serde_json::from_str(
            r#"{
                "tokenAddress": "A8C3xuqscfmyLrte3VmTqrAq8kgMASius9AFNANwpump",
                "name": "Test",
                "symbol": "TST",
                "priceUsd": "0.0005",
                "liquidity": 12345.6,
                "fullyDilutedValuation": "500000",
                "graduatedAt": "2025-01-15T10:30:00.000Z"
            }"#,
        )
        .unwrap();

        let token = raw.into_token().unwrap();
        assert_eq!(token.symbol, "TST");
        assert_eq!(token.price_usd, Some(0.0005));
        assert_eq!(token.liquidity, Some(12345.6));
        assert_eq!(token.fully_diluted_valuation, Some(500000.0));
        assert!(token.graduated_at.unwrap() > 0);
    }

    #[test]
    fn missing_mint_is_dropped() {
        let raw: GraduatedTokenRaw = serde_json::from_str(r#"{"name": "x"}"#).unwrap();
        assert!(raw.into_token().is_none());
    }
}
