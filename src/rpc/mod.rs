//! Solana JSON-RPC client.
//!
//! Hand-rolled `jsonrpc: 2.0` POSTs over the shared reqwest client, rotating
//! round-robin across the configured endpoints on failure. Every operation
//! fails soft into its sentinel: enrichment treats the chain as an optional
//! data source.

pub mod history;
pub mod types;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use serde_json::{json, Value};

use crate::logger::{self, LogTag};

pub use history::TransactionHistoryClient;
pub use types::{
    AssetInfo, EnhancedTransaction, MintInfo, NativeTransfer, TokenAccountBalance, TokenTransfer,
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(8);

pub struct ChainRpcClient {
    client: reqwest::Client,
    urls: Vec<String>,
    cursor: AtomicUsize,
}

impl ChainRpcClient {
    pub fn new(urls: Vec<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            client,
            urls,
            cursor: AtomicUsize::new(0),
        }
    }

    fn next_url(&self) -> Option<&str> {
        if self.urls.is_empty() {
            return None;
        }
        let i = self.cursor.fetch_add(1, Ordering::Relaxed);
        Some(&self.urls[i % self.urls.len()])
    }

    /// Issue one JSON-RPC call. Tries each endpoint at most once.
    async fn call(&self, method: &str, params: Value) -> Result<Value, String> {
        let payload = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });

        let mut last_error = String::from("no RPC endpoints configured");
        for _ in 0..self.urls.len().max(1) {
            let Some(url) = self.next_url() else {
                break;
            };

            let response = match self
                .client
                .post(url)
                .header("Content-Type", "application/json")
                .json(&payload)
                .send()
                .await
            {
                Ok(response) => response,
                Err(e) => {
                    last_error = format!("request failed: {}", e);
                    continue;
                }
            };

            if !response.status().is_success() {
                last_error = format!("http {} from {}", response.status(), url);
                continue;
            }

            let body: Value = match response.json().await {
                Ok(body) => body,
                Err(e) => {
                    last_error = format!("parse error: {}", e);
                    continue;
                }
            };

            if let Some(error) = body.get("error") {
                last_error = format!("rpc error: {}", error);
                continue;
            }

            if let Some(result) = body.get("result") {
                return Ok(result.clone());
            }
            last_error = "missing result field".to_string();
        }

        Err(last_error)
    }

    /// Mint account info: decimals, authorities, supply. `None` on failure.
    pub async fn get_mint_info(&self, mint: &str) -> Option<MintInfo> {
        let result = self
            .call(
                "getAccountInfo",
                json!([mint, {"encoding": "jsonParsed"}]),
            )
            .await;

        match result {
            Ok(result) => {
                let info = result.pointer("/value/data/parsed/info")?;
                Some(MintInfo {
                    decimals: info.get("decimals").and_then(Value::as_u64).unwrap_or(6) as u8,
                    mint_authority: info
                        .get("mintAuthority")
                        .and_then(Value::as_str)
                        .map(str::to_string),
                    freeze_authority: info
                        .get("freezeAuthority")
                        .and_then(Value::as_str)
                        .map(str::to_string),
                    supply: info
                        .get("supply")
                        .and_then(Value::as_str)
                        .unwrap_or_default()
                        .to_string(),
                })
            }
            Err(e) => {
                logger::debug(LogTag::Rpc, &format!("getAccountInfo({}) failed: {}", mint, e));
                None
            }
        }
    }

    /// Total supply in UI units. `None` on failure.
    pub async fn get_token_supply(&self, mint: &str) -> Option<f64> {
        match self.call("getTokenSupply", json!([mint])).await {
            Ok(result) => result.pointer("/value/uiAmount").and_then(Value::as_f64),
            Err(e) => {
                logger::debug(LogTag::Rpc, &format!("getTokenSupply({}) failed: {}", mint, e));
                None
            }
        }
    }

    /// Up to 20 largest token accounts, biggest first. Empty on failure.
    pub async fn get_largest_token_accounts(&self, mint: &str) -> Vec<TokenAccountBalance> {
        match self.call("getTokenLargestAccounts", json!([mint])).await {
            Ok(result) => result
                .pointer("/value")
                .and_then(Value::as_array)
                .map(|accounts| {
                    accounts
                        .iter()
                        .filter_map(|entry| {
                            Some(TokenAccountBalance {
                                token_account: entry.get("address")?.as_str()?.to_string(),
                                ui_amount: entry.get("uiAmount").and_then(Value::as_f64)?,
                            })
                        })
                        .collect()
                })
                .unwrap_or_default(),
            Err(e) => {
                logger::debug(
                    LogTag::Rpc,
                    &format!("getTokenLargestAccounts({}) failed: {}", mint, e),
                );
                Vec::new()
            }
        }
    }

    /// Owner wallet of a token account. `None` on failure.
    pub async fn get_account_owner(&self, token_account: &str) -> Option<String> {
        let result = self
            .call(
                "getAccountInfo",
                json!([token_account, {"encoding": "jsonParsed"}]),
            )
            .await
            .ok()?;
        result
            .pointer("/value/data/parsed/info/owner")
            .and_then(Value::as_str)
            .map(str::to_string)
    }

    /// Whether a wallet is an executable (program) account. `None` on failure
    /// or for accounts that do not exist.
    pub async fn is_executable_account(&self, wallet: &str) -> Option<bool> {
        let result = self
            .call("getAccountInfo", json!([wallet, {"encoding": "base64"}]))
            .await
            .ok()?;
        result.pointer("/value/executable").and_then(Value::as_bool)
    }

    /// DAS asset lookup for a mint; used to recover the creator wallet and
    /// metadata URI. `None` when the endpoint lacks DAS support or fails.
    pub async fn get_asset(&self, mint: &str) -> Option<AssetInfo> {
        match self.call("getAsset", json!({"id": mint})).await {
            Ok(result) => Some(parse_asset(&result)?),
            Err(e) => {
                logger::debug(LogTag::Rpc, &format!("getAsset({}) failed: {}", mint, e));
                None
            }
        }
    }

    /// Assets created by a wallet, via DAS. Empty on failure.
    pub async fn get_assets_by_creator(&self, creator: &str, limit: usize) -> Vec<AssetInfo> {
        let params = json!({
            "creatorAddress": creator,
            "onlyVerified": false,
            "page": 1,
            "limit": limit,
        });
        match self.call("getAssetsByCreator", params).await {
            Ok(result) => result
                .pointer("/items")
                .and_then(Value::as_array)
                .map(|items| items.iter().filter_map(parse_asset).collect())
                .unwrap_or_default(),
            Err(e) => {
                logger::debug(
                    LogTag::Rpc,
                    &format!("getAssetsByCreator({}) failed: {}", creator, e),
                );
                Vec::new()
            }
        }
    }
}

fn parse_asset(value: &Value) -> Option<AssetInfo> {
    let id = value.get("id")?.as_str()?.to_string();
    let name = value
        .pointer("/content/metadata/name")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let interface = value
        .get("interface")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let creator = value
        .pointer("/creators/0/address")
        .and_then(Value::as_str)
        .or_else(|| value.pointer("/authorities/0/address").and_then(Value::as_str))
        .map(str::to_string);
    let json_uri = value
        .pointer("/content/json_uri")
        .and_then(Value::as_str)
        .map(str::to_string);
    // DAS reports creation as a unix-seconds field on some providers only.
    let created_at = value
        .pointer("/created_at")
        .and_then(Value::as_i64)
        .map(|secs| secs * 1000)
        .unwrap_or(0);
    let supply = value
        .pointer("/token_info/supply")
        .and_then(Value::as_f64)
        .or_else(|| value.pointer("/supply/print_current_supply").and_then(Value::as_f64));

    Some(AssetInfo {
        id,
        name,
        interface,
        creator,
        json_uri,
        created_at,
        supply,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn asset_parsing_reads_nested_fields() {
        let value = json!({
            "id": "MINT",
            "interface": "FungibleToken",
            "content": {
                "json_uri": "https://meta.example/token.json",
                "metadata": {"name": "Test Token"}
            },
            "creators": [{"address": "CREATOR"}],
            "token_info": {"supply": 1e15},
            "created_at": 1736900000
        });

        let asset = parse_asset(&value).unwrap();
        assert_eq!(asset.id, "MINT");
        assert_eq!(asset.name, "Test Token");
        assert_eq!(asset.interface, "FungibleToken");
        assert_eq!(asset.creator.as_deref(), Some("CREATOR"));
        assert_eq!(asset.created_at, 1736900000000);
        assert_eq!(asset.supply, Some(1e15));
    }

    #[test]
    fn asset_without_id_is_rejected() {
        assert!(parse_asset(&json!({"interface": "V1_NFT"})).is_none());
    }
}
