//! Enhanced transaction history client.
//!
//! Wraps a Helius-style enriched-transaction REST endpoint. Without an API
//! key every call returns the empty sentinel, which quietly disables the
//! launch, funding, and airdrop analyses that depend on it.

use std::time::{Duration, Instant};

use serde_json::Value;

use crate::logger::{self, LogTag};

use super::types::{EnhancedTransaction, NativeTransfer, TokenTransfer};
use crate::apis::client::TtlCache;
use crate::apis::stats::{ApiStats, ApiStatsTracker};

const BASE_URL: &str = "https://api.helius.xyz/v0";
const TIMEOUT: Duration = Duration::from_secs(10);
const CACHE_TTL: Duration = Duration::from_secs(30);

pub struct TransactionHistoryClient {
    client: reqwest::Client,
    api_key: Option<String>,
    stats: ApiStatsTracker,
    cache: TtlCache<String, Vec<EnhancedTransaction>>,
}

impl TransactionHistoryClient {
    pub fn new(api_key: Option<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            client,
            api_key,
            stats: ApiStatsTracker::new(),
            cache: TtlCache::new(CACHE_TTL),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.api_key.is_some()
    }

    /// Recent transactions touching `address`, newest first. Optionally
    /// filtered by provider transaction type (e.g. `"SWAP"`). Empty on any
    /// failure or when no key is configured.
    pub async fn get_transaction_history(
        &self,
        address: &str,
        limit: usize,
        type_filter: Option<&str>,
    ) -> Vec<EnhancedTransaction> {
        let Some(api_key) = &self.api_key else {
            return Vec::new();
        };

        let cache_key = format!("{}:{}:{}", address, limit, type_filter.unwrap_or("*"));
        if let Some(cached) = self.cache.get(&cache_key) {
            self.stats.record_cache_hit();
            return cached;
        }

        let mut url = format!(
            "{}/addresses/{}/transactions?api-key={}&limit={}",
            BASE_URL, address, api_key, limit
        );
        if let Some(filter) = type_filter {
            url.push_str("&type=");
            url.push_str(filter);
        }

        let start = Instant::now();
        let result = self.fetch(&url).await;
        let elapsed = start.elapsed().as_millis() as f64;

        match result {
            Ok(transactions) => {
                self.stats.record_request(true, elapsed);
                self.cache.insert(cache_key, transactions.clone());
                transactions
            }
            Err(e) => {
                self.stats.record_request(false, elapsed);
                self.stats.record_error(e.clone());
                logger::warning(
                    LogTag::Rpc,
                    &format!("transaction history failed for {}: {}", address, e),
                );
                Vec::new()
            }
        }
    }

    async fn fetch(&self, url: &str) -> Result<Vec<EnhancedTransaction>, String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| format!("request failed: {}", e))?;

        if !response.status().is_success() {
            return Err(format!("http {}", response.status()));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| format!("parse error: {}", e))?;
        let items = body
            .as_array()
            .ok_or_else(|| "expected a transaction array".to_string())?;
        Ok(items.iter().filter_map(parse_transaction).collect())
    }

    pub fn stats(&self) -> ApiStats {
        self.stats.snapshot()
    }
}

fn parse_transaction(value: &Value) -> Option<EnhancedTransaction> {
    Some(EnhancedTransaction {
        signature: value.get("signature")?.as_str()?.to_string(),
        slot: value.get("slot").and_then(Value::as_u64).unwrap_or(0),
        timestamp: value.get("timestamp").and_then(Value::as_i64).unwrap_or(0),
        fee_payer: value
            .get("feePayer")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        tx_type: value
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        native_transfers: value
            .get("nativeTransfers")
            .and_then(Value::as_array)
            .map(|transfers| {
                transfers
                    .iter()
                    .filter_map(|t| {
                        Some(NativeTransfer {
                            from_account: t.get("fromUserAccount")?.as_str()?.to_string(),
                            to_account: t.get("toUserAccount")?.as_str()?.to_string(),
                            amount: t.get("amount").and_then(Value::as_u64).unwrap_or(0),
                        })
                    })
                    .collect()
            })
            .unwrap_or_default(),
        token_transfers: value
            .get("tokenTransfers")
            .and_then(Value::as_array)
            .map(|transfers| {
                transfers
                    .iter()
                    .filter_map(|t| {
                        Some(TokenTransfer {
                            from_account: t
                                .get("fromUserAccount")
                                .and_then(Value::as_str)
                                .unwrap_or_default()
                                .to_string(),
                            to_account: t
                                .get("toUserAccount")
                                .and_then(Value::as_str)
                                .unwrap_or_default()
                                .to_string(),
                            mint: t.get("mint")?.as_str()?.to_string(),
                            amount: t.get("tokenAmount").and_then(Value::as_f64).unwrap_or(0.0),
                        })
                    })
                    .collect()
            })
            .unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn disabled_client_returns_empty() {
        let client = TransactionHistoryClient::new(None);
        assert!(!client.is_enabled());
    }

    #[test]
    fn transaction_parsing_extracts_transfers() {
        let value = json!({
            "signature": "SIG",
            "slot": 312000000u64,
            "timestamp": 1736900000,
            "feePayer": "BUYER",
            "type": "SWAP",
            "nativeTransfers": [
                {"fromUserAccount": "BUYER", "toUserAccount": "POOL", "amount": 1500000000u64}
            ],
            "tokenTransfers": [
                {"fromUserAccount": "POOL", "toUserAccount": "BUYER", "mint": "MINT", "tokenAmount": 42.0}
            ]
        });

        let tx = parse_transaction(&value).unwrap();
        assert_eq!(tx.signature, "SIG");
        assert_eq!(tx.tx_type, "SWAP");
        assert_eq!(tx.native_transfers.len(), 1);
        assert_eq!(tx.token_transfers[0].mint, "MINT");
        assert!((tx.sol_spent_by_fee_payer() - 1.5).abs() < 1e-9);
    }
}
