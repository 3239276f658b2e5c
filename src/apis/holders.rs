//! Holder registry client.
//!
//! Holder counts and top-holder breakdowns from the market-data gateway.
//! A 404 is the registry's normal answer for tokens it has not indexed yet
//! and maps to the "unknown" sentinel, not an error.

use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::StatusCode;
use serde::Deserialize;

use crate::logger::{self, log, LogTag};

use super::client::{KeyRing, RateLimiter, TtlCache};
use super::stats::{ApiStats, ApiStatsTracker};
use super::{flex_f64, flex_i64};

const BASE_URL: &str = "https://solana-gateway.moralis.io";
const TIMEOUT: Duration = Duration::from_secs(8);
const RATE_LIMIT_PER_MINUTE: usize = 120;
const CACHE_TTL: Duration = Duration::from_secs(60);

/// Aggregate holder statistics.
#[derive(Debug, Clone, Default)]
pub struct HolderStats {
    pub total_holders: i64,
    /// Fraction of supply held by the top ten, 0..1, when reported.
    pub top10_percent: Option<f64>,
    /// Fraction of supply held by the creator, 0..1, when reported.
    pub dev_holdings_percent: Option<f64>,
}

/// One entry from the top-holders list.
#[derive(Debug, Clone, Default)]
pub struct TopHolder {
    pub owner: String,
    /// Fraction of total supply, 0..1.
    pub pct: f64,
    /// Exchange/program label when the registry knows one.
    pub label: Option<String>,
    pub is_contract: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HolderStatsRaw {
    #[serde(default, deserialize_with = "flex_i64")]
    total_holders: Option<i64>,
    holder_supply: Option<HolderSupplyRaw>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HolderSupplyRaw {
    top10: Option<SupplyBucketRaw>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SupplyBucketRaw {
    #[serde(default, deserialize_with = "flex_f64")]
    supply_percent: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct TopHoldersResponse {
    #[serde(default)]
    result: Vec<TopHolderRaw>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TopHolderRaw {
    owner_address: Option<String>,
    #[serde(default, deserialize_with = "flex_f64")]
    percentage_relative_to_total_supply: Option<f64>,
    owner_address_label: Option<String>,
    #[serde(default)]
    is_contract: bool,
}

pub struct HolderRegistryClient {
    client: reqwest::Client,
    keys: Arc<KeyRing>,
    limiter: RateLimiter,
    stats: ApiStatsTracker,
    stats_cache: TtlCache<String, Option<HolderStats>>,
    holders_cache: TtlCache<String, Vec<TopHolder>>,
}

impl HolderRegistryClient {
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
            stats_cache: TtlCache::new(CACHE_TTL),
            holders_cache: TtlCache::new(CACHE_TTL),
        }
    }

    /// Holder statistics for a mint. `None` means the registry does not know
    /// this token (or the call failed) — never zero holders.
    pub async fn get_holder_stats(&self, mint: &str) -> Option<HolderStats> {
        if let Some(cached) = self.stats_cache.get(&mint.to_string()) {
            self.stats.record_cache_hit();
            return cached;
        }

        let url = format!("{}/token/mainnet/holders/{}", BASE_URL, mint);
        match self.get_json::<HolderStatsRaw>(&url).await {
            Ok(Some(raw)) => {
                let stats = raw.total_holders.map(|total_holders| HolderStats {
                    total_holders,
                    top10_percent: raw
                        .holder_supply
                        .and_then(|s| s.top10)
                        .and_then(|b| b.supply_percent)
                        .map(|pct| pct / 100.0),
                    dev_holdings_percent: None,
                });
                self.stats_cache.insert(mint.to_string(), stats.clone());
                stats
            }
            Ok(None) => {
                self.stats_cache.insert(mint.to_string(), None);
                None
            }
            Err(e) => {
                self.stats.record_error(e.clone());
                logger::warning(
                    LogTag::Api,
                    &format!("holder stats failed for {}: {}", mint, e),
                );
                None
            }
        }
    }

    /// Largest holders, biggest first. Empty when unknown or on failure.
    pub async fn get_top_holders(&self, mint: &str, limit: usize) -> Vec<TopHolder> {
        if let Some(cached) = self.holders_cache.get(&mint.to_string()) {
            self.stats.record_cache_hit();
            return cached.into_iter().take(limit).collect();
        }

        let url = format!("{}/token/mainnet/{}/top-holders?limit={}", BASE_URL, mint, limit);
        match self.get_json::<TopHoldersResponse>(&url).await {
            Ok(Some(parsed)) => {
                let holders: Vec<TopHolder> = parsed
                    .result
                    .into_iter()
                    .filter_map(|raw| {
                        Some(TopHolder {
                            owner: raw.owner_address?,
                            pct: raw.percentage_relative_to_total_supply.unwrap_or(0.0) / 100.0,
                            label: raw.owner_address_label,
                            is_contract: raw.is_contract,
                        })
                    })
                    .collect();
                self.holders_cache.insert(mint.to_string(), holders.clone());
                holders
            }
            Ok(None) => Vec::new(),
            Err(e) => {
                self.stats.record_error(e.clone());
                logger::warning(
                    LogTag::Api,
                    &format!("top holders failed for {}: {}", mint, e),
                );
                Vec::new()
            }
        }
    }

    /// GET with key rotation. `Ok(None)` is the 404 "not indexed" answer.
    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
    ) -> Result<Option<T>, String> {
        if self.keys.is_empty() {
            return Err("no market-data API keys configured".to_string());
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
                .get(url)
                .header("X-API-Key", &api_key)
                .send()
                .await
                .map_err(|e| format!("request failed: {}", e))?;
            let elapsed = start.elapsed().as_millis() as f64;
            let status = response.status();

            if status == StatusCode::NOT_FOUND {
                self.stats.record_request(true, elapsed);
                return Ok(None);
            }

            if status == StatusCode::UNAUTHORIZED || status == StatusCode::TOO_MANY_REQUESTS {
                self.stats.record_request(false, elapsed);
                attempts += 1;
                if attempts >= self.keys.len() {
                    return Err(format!("all {} keys rejected ({})", attempts, status));
                }
                log(
                    LogTag::Api,
                    "ROTATE",
                    &format!("holder registry got {}, rotating key", status),
                );
                key = self.keys.advance().map(str::to_string);
                continue;
            }

            if !status.is_success() {
                self.stats.record_request(false, elapsed);
                return Err(format!("http {}", status));
            }

            let parsed = response
                .json::<T>()
                .await
                .map_err(|e| format!("parse error: {}", e))?;
            self.stats.record_request(true, elapsed);
            return Ok(Some(parsed));
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
    fn holder_stats_payload_parses() {
        let raw: HolderStatsRaw = serde_json::from_str(
            r#"{
                "totalHolders": "842",
                "holderSupply": {"top10": {"supplyPercent": "34.5"}}
            }"#,
        )
        .unwrap();
        assert_eq!(raw.total_holders, Some(842));
        let top10 = raw.holder_supply.unwrap().top10.unwrap().supply_percent;
        assert_eq!(top10, Some(34.5));
    }

    #[test]
    fn top_holder_percentages_scale_to_fractions() {
        let raw: TopHolderRaw = serde_json::from_str(
            r#"{"ownerAddress": "WALLET", "percentageRelativeToTotalSupply": 12.5}"#,
        )
        .unwrap();
        assert_eq!(raw.percentage_relative_to_total_supply, Some(12.5));
    }
}
