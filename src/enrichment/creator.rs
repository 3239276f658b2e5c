//! Creator-history analysis: how many fungible tokens this wallet has
//! launched, how recently, and how they ended up.

use crate::apis::pairs::PairIndexClient;
use crate::rpc::{AssetInfo, ChainRpcClient};
use crate::tokens::types::{CreatedToken, CreatorHistory};

const ASSET_LOOKUP_LIMIT: usize = 100;
const RECENT_WINDOW_MS: i64 = 30 * 24 * 3_600_000;
const SERIAL_CREATOR_THRESHOLD: usize = 3;
/// Supply above this marks an asset as fungible even when the DAS interface
/// field is unhelpful.
const FUNGIBLE_SUPPLY_FLOOR: f64 = 1e6;

/// Outcome probing is bounded to a handful of the most recent launches.
const OUTCOME_PROBE_LIMIT: usize = 5;
const RUGGED_LIQUIDITY_CEILING: f64 = 1_000.0;
const SUCCESS_LIQUIDITY_FLOOR: f64 = 10_000.0;

pub async fn analyze_creator(
    rpc: &ChainRpcClient,
    pairs: Option<&PairIndexClient>,
    creator: &str,
    current_mint: &str,
    now_ms: i64,
) -> CreatorHistory {
    let assets = rpc.get_assets_by_creator(creator, ASSET_LOOKUP_LIMIT).await;
    let mut history = history_from_assets(&assets, current_mint, now_ms);

    // Outcome probe (full mode only, signalled by a pairs client): a prior
    // launch with its liquidity gone was rugged or abandoned; one still
    // holding real liquidity counts as a success.
    if let Some(pairs) = pairs {
        for token in history.recent_tokens.iter().take(OUTCOME_PROBE_LIMIT) {
            let best_liquidity = pairs
                .get_pairs(&token.mint)
                .await
                .first()
                .map(|p| p.liquidity_usd)
                .unwrap_or(0.0);
            if best_liquidity < RUGGED_LIQUIDITY_CEILING {
                history.rugged_tokens += 1;
            } else if best_liquidity >= SUCCESS_LIQUIDITY_FLOOR {
                history.successful_tokens += 1;
            }
        }
    }

    history
}

/// Pure classification of the creator's asset list.
pub fn history_from_assets(assets: &[AssetInfo], current_mint: &str, now_ms: i64) -> CreatorHistory {
    let fungible: Vec<&AssetInfo> = assets
        .iter()
        .filter(|asset| asset.id != current_mint)
        .filter(|asset| {
            asset.interface.to_lowercase().contains("fungible")
                || asset.supply.map(|s| s > FUNGIBLE_SUPPLY_FLOOR).unwrap_or(false)
        })
        .collect();

    let recent_tokens: Vec<CreatedToken> = fungible
        .iter()
        .filter(|asset| asset.created_at > 0 && asset.created_at > now_ms - RECENT_WINDOW_MS)
        .map(|asset| CreatedToken {
            mint: asset.id.clone(),
            name: asset.name.clone(),
            created_at: asset.created_at,
        })
        .collect();

    CreatorHistory {
        token_count: fungible.len() as u32,
        is_serial_creator: recent_tokens.len() >= SERIAL_CREATOR_THRESHOLD,
        recent_tokens,
        rugged_tokens: 0,
        successful_tokens: 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asset(id: &str, interface: &str, created_at: i64, supply: Option<f64>) -> AssetInfo {
        AssetInfo {
            id: id.to_string(),
            name: format!("token-{}", id),
            interface: interface.to_string(),
            creator: None,
            json_uri: None,
            created_at,
            supply,
        }
    }

    #[test]
    fn serial_creator_threshold() {
        let now = 1_700_000_000_000i64;
        let fresh = now - 24 * 3_600_000;
        let assets = vec![
            asset("a", "FungibleToken", fresh, None),
            asset("b", "FungibleToken", fresh, None),
            asset("c", "V1_NFT", fresh, None),               // not fungible
            asset("d", "Custom", fresh, Some(1e9)),          // fungible by supply
            asset("e", "FungibleToken", now - 60 * 24 * 3_600_000, None), // too old
        ];

        let history = history_from_assets(&assets, "current", now);
        assert_eq!(history.token_count, 4);
        assert_eq!(history.recent_tokens.len(), 3);
        assert!(history.is_serial_creator);
    }

    #[test]
    fn current_mint_is_excluded() {
        let now = 1_700_000_000_000i64;
        let assets = vec![asset("current", "FungibleToken", now - 1000, None)];
        let history = history_from_assets(&assets, "current", now);
        assert_eq!(history.token_count, 0);
        assert!(!history.is_serial_creator);
    }
}
