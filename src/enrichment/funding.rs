//! Wallet-funding analysis.
//!
//! Walks the recent transaction history of the top holders looking for a
//! shared funding source (one wallet topping up many holders) and for
//! holders whose wallets only came into existence in the last day.

use std::collections::{HashMap, HashSet};

use futures::future::join_all;

use crate::apis::holders::TopHolder;
use crate::constants::INFRASTRUCTURE_WALLETS;
use crate::rpc::TransactionHistoryClient;
use crate::tokens::types::WalletFunding;

const MAX_HOLDERS_PROBED: usize = 10;
const BATCH_SIZE: usize = 5;
const TXS_PER_HOLDER: usize = 20;
/// Incoming transfers below this are dust, not funding (lamports).
const MIN_FUNDING_LAMPORTS: u64 = 10_000_000;
const FRESH_WALLET_WINDOW_MS: i64 = 24 * 3_600_000;

pub async fn analyze_funding(
    history: &TransactionHistoryClient,
    holders: &[TopHolder],
    now_ms: i64,
) -> WalletFunding {
    let probed: Vec<&TopHolder> = holders
        .iter()
        .filter(|h| !is_infrastructure(h))
        .take(MAX_HOLDERS_PROBED)
        .collect();

    if probed.is_empty() || !history.is_enabled() {
        return WalletFunding::default();
    }

    // source wallet -> holders it funded
    let mut funded_by: HashMap<String, HashSet<String>> = HashMap::new();
    let mut fresh_wallets = 0u32;

    for batch in probed.chunks(BATCH_SIZE) {
        let pages = join_all(batch.iter().map(|holder| {
            history.get_transaction_history(&holder.owner, TXS_PER_HOLDER, None)
        }))
        .await;

        for (holder, transactions) in batch.iter().zip(pages.into_iter()) {
            let mut earliest_seen = i64::MAX;
            for tx in &transactions {
                if tx.timestamp > 0 {
                    earliest_seen = earliest_seen.min(tx.timestamp * 1000);
                }
                for transfer in &tx.native_transfers {
                    if transfer.to_account == holder.owner
                        && transfer.amount > MIN_FUNDING_LAMPORTS
                        && transfer.from_account != holder.owner
                    {
                        funded_by
                            .entry(transfer.from_account.clone())
                            .or_default()
                            .insert(holder.owner.clone());
                    }
                }
            }

            // A wallet whose entire visible history began inside the last
            // day was almost certainly created for this launch.
            if earliest_seen != i64::MAX && earliest_seen > now_ms - FRESH_WALLET_WINDOW_MS {
                fresh_wallets += 1;
            }
        }
    }

    let (common_funding_source, clustered_wallets) = funded_by
        .iter()
        .max_by_key(|(_, holders)| holders.len())
        .map(|(source, holders)| (Some(source.clone()), holders.len() as u32))
        .unwrap_or((None, 0));

    let probed_count = probed.len() as u32;
    let suspicious = clustered_wallets >= 3
        || (fresh_wallets >= 3 && fresh_wallets * 2 >= probed_count);

    WalletFunding {
        clustered_wallets,
        common_funding_source: common_funding_source.filter(|_| clustered_wallets >= 2),
        fresh_wallet_buyers: fresh_wallets,
        suspicious_funding_pattern: suspicious,
    }
}

fn is_infrastructure(holder: &TopHolder) -> bool {
    if holder.is_contract {
        return true;
    }
    if INFRASTRUCTURE_WALLETS.contains(&holder.owner.as_str()) {
        return true;
    }
    holder
        .label
        .as_deref()
        .map(|label| {
            let label = label.to_lowercase();
            label.contains("pool") || label.contains("amm") || label.contains("exchange")
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn holder(owner: &str) -> TopHolder {
        TopHolder {
            owner: owner.to_string(),
            pct: 0.01,
            label: None,
            is_contract: false,
        }
    }

    #[test]
    fn infrastructure_holders_are_skipped() {
        let mut labeled = holder("W1");
        labeled.label = Some("Raydium Pool".to_string());
        assert!(is_infrastructure(&labeled));

        let mut contract = holder("W2");
        contract.is_contract = true;
        assert!(is_infrastructure(&contract));

        assert!(is_infrastructure(&holder(
            "5Q544fKrFoe6tsEbD7S8EmxGTJYAKtTVhAW5Q5pge4j1"
        )));
        assert!(!is_infrastructure(&holder("W3")));
    }
}
