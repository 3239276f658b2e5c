//! Launch-window analysis: bundled buys, snipers, and first-buy sizing from
//! the token's earliest swap transactions.

use std::collections::HashSet;

use crate::apis::holders::TopHolder;
use crate::rpc::{EnhancedTransaction, TransactionHistoryClient};
use crate::tokens::types::LaunchAnalysis;

const EARLY_BUYER_WINDOW_SECS: i64 = 60;
const SNIPER_WINDOW_SECS: i64 = 300;
const HISTORY_LIMIT: usize = 100;

/// Reference time drift beyond which the first transaction, not the
/// migration event, anchors the launch window (backfilled events can be
/// minutes late).
const REFERENCE_DRIFT_SECS: i64 = 600;

pub async fn analyze_launch(
    history: &TransactionHistoryClient,
    mint: &str,
    migration_timestamp_ms: i64,
    creator: Option<&str>,
    top_holders: &[TopHolder],
) -> LaunchAnalysis {
    let transactions = history
        .get_transaction_history(mint, HISTORY_LIMIT, Some("SWAP"))
        .await;
    analyze_transactions(&transactions, migration_timestamp_ms, creator, top_holders)
}

/// Pure aggregation over a fetched transaction list.
pub fn analyze_transactions(
    transactions: &[EnhancedTransaction],
    migration_timestamp_ms: i64,
    creator: Option<&str>,
    top_holders: &[TopHolder],
) -> LaunchAnalysis {
    let mut analysis = LaunchAnalysis::default();
    let timed: Vec<&EnhancedTransaction> =
        transactions.iter().filter(|tx| tx.timestamp > 0).collect();
    if timed.is_empty() {
        return analysis;
    }

    let first_tx_ts = timed.iter().map(|tx| tx.timestamp).min().unwrap_or(0);
    let migration_ts = migration_timestamp_ms / 1000;

    // Anchor on the first transaction when the migration timestamp is off
    // by more than ten minutes.
    let reference = if (first_tx_ts - migration_ts).abs() > REFERENCE_DRIFT_SECS {
        first_tx_ts
    } else {
        migration_ts
    };

    let mut early_buyers: HashSet<&str> = HashSet::new();
    let mut snipers: HashSet<&str> = HashSet::new();
    let mut early_sol_spent: Vec<f64> = Vec::new();

    for tx in &timed {
        let offset = tx.timestamp - reference;
        if (0..=SNIPER_WINDOW_SECS).contains(&offset) {
            snipers.insert(tx.fee_payer.as_str());
            if offset <= EARLY_BUYER_WINDOW_SECS {
                if early_buyers.insert(tx.fee_payer.as_str()) {
                    let spent = tx.sol_spent_by_fee_payer();
                    if spent > 0.0 {
                        early_sol_spent.push(spent);
                    }
                }
            }
        }
        if let Some(creator) = creator {
            if tx.fee_payer == creator && offset > SNIPER_WINDOW_SECS {
                analysis.creator_bought_back = true;
            }
        }
    }

    let earliest_slot = timed.iter().map(|tx| tx.slot).filter(|s| *s > 0).min();
    if let Some(slot) = earliest_slot {
        analysis.bundled_buys = timed.iter().filter(|tx| tx.slot == slot).count() as u32;
    }

    analysis.sniper_count = snipers.len() as u32;
    if !early_sol_spent.is_empty() {
        analysis.avg_first_buy_size =
            early_sol_spent.iter().sum::<f64>() / early_sol_spent.len() as f64;
    }

    // How much of the supply the launch-window buyers still hold.
    analysis.first_buyer_holdings = top_holders
        .iter()
        .filter(|holder| early_buyers.contains(holder.owner.as_str()))
        .map(|holder| holder.pct)
        .sum::<f64>()
        .clamp(0.0, 1.0);

    analysis
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rpc::NativeTransfer;

    fn swap(sig: &str, slot: u64, ts: i64, buyer: &str, lamports: u64) -> EnhancedTransaction {
        EnhancedTransaction {
            signature: sig.to_string(),
            slot,
            timestamp: ts,
            fee_payer: buyer.to_string(),
            tx_type: "SWAP".to_string(),
            native_transfers: vec![NativeTransfer {
                from_account: buyer.to_string(),
                to_account: "POOL".to_string(),
                amount: lamports,
            }],
            token_transfers: Vec::new(),
        }
    }

    #[test]
    fn bundled_and_sniper_counting() {
        let base = 1_700_000_000i64;
        let txs = vec![
            swap("a", 100, base, "W1", 2_000_000_000),
            swap("b", 100, base, "W2", 4_000_000_000),
            swap("c", 101, base + 30, "W3", 1_000_000_000),
            swap("d", 105, base + 200, "W4", 500_000_000),
            swap("e", 110, base + 400, "W5", 500_000_000),
        ];

        let analysis = analyze_transactions(&txs, base * 1000, None, &[]);
        assert_eq!(analysis.bundled_buys, 2);
        // W1, W2, W3, W4 are inside the 300s window; W5 is not.
        assert_eq!(analysis.sniper_count, 4);
        // Early buyers (60s): W1 2 SOL, W2 4 SOL, W3 1 SOL.
        assert!((analysis.avg_first_buy_size - 7.0 / 3.0).abs() < 1e-9);
        assert!(!analysis.creator_bought_back);
    }

    #[test]
    fn creator_buyback_detected_after_window() {
        let base = 1_700_000_000i64;
        let txs = vec![
            swap("a", 100, base, "W1", 1_000_000_000),
            swap("b", 200, base + 900, "CREATOR", 1_000_000_000),
        ];
        let analysis = analyze_transactions(&txs, base * 1000, Some("CREATOR"), &[]);
        assert!(analysis.creator_bought_back);
    }

    #[test]
    fn reference_falls_back_to_first_transaction() {
        let migration = 1_700_000_000i64;
        // Transactions start an hour before the (late) migration timestamp.
        let first = migration - 3600;
        let txs = vec![
            swap("a", 100, first, "W1", 1_000_000_000),
            swap("b", 101, first + 20, "W2", 1_000_000_000),
        ];
        let analysis = analyze_transactions(&txs, migration * 1000, None, &[]);
        assert_eq!(analysis.sniper_count, 2);
    }
}
