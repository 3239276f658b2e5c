//! Composite risks: booleans derived from combinations of signals that the
//! individual checks already computed. Each active risk appends a flag and
//! reduces the score beyond the per-check caps.

use std::collections::BTreeMap;

use crate::tokens::types::TokenRecord;

use super::types::{CheckResult, CompositeRisks};

pub const RUG_IN_PROGRESS_FLAG: &str = "🚨 RUG IN PROGRESS";
pub const PUMP_SETUP_FLAG: &str = "⚠️ Pump setup pattern";
pub const WASH_TRADING_FLAG: &str = "Wash trading suspected";
pub const COORDINATED_DUMP_FLAG: &str = "🚨 Coordinated dump";
pub const INSIDER_FLAG: &str = "Insider accumulation pattern";

/// Score penalties applied when a composite risk is active.
pub const COMPOSITE_SCORE_PENALTIES: [f64; 5] = [20.0, 10.0, 10.0, 15.0, 15.0];

/// Danger-score boosts, in the same risk order.
pub const COMPOSITE_DANGER_BOOSTS: [i64; 5] = [20, 15, 10, 10, 5];

/// Evaluate all five composite risks against the finished check results.
///
/// Returns the risk set, the extra score penalty, and the flags to append.
pub fn evaluate(
    record: &TokenRecord,
    breakdown: &BTreeMap<String, CheckResult>,
) -> (CompositeRisks, f64, Vec<String>) {
    let price = &record.price_data;
    let total_trades = price.buys_24h + price.sells_24h;
    let sell_ratio = if total_trades > 0 {
        price.sells_24h as f64 / total_trades as f64
    } else {
        0.0
    };
    let buy_ratio = if total_trades > 0 {
        price.buys_24h as f64 / total_trades as f64
    } else {
        0.0
    };
    let age_hours = record.age_hours();
    let holders = record.statistics.holder_count;

    let holder_check = breakdown.get("holderDistribution");
    let has_extreme_concentration = holder_check
        .map(|c| {
            c.has_flag_containing("very high concentration") || c.has_flag_containing("mega whale")
        })
        .unwrap_or(false);
    let has_whale_flag = holder_check
        .map(|c| c.has_flag_containing("whale"))
        .unwrap_or(false);

    let velocity_penalty = breakdown
        .get("tradeVelocity")
        .map(|c| c.penalty)
        .unwrap_or(0.0);
    let trades_per_holder = if holders > 0 {
        price.trades_24h as f64 / holders as f64
    } else {
        0.0
    };

    let risks = CompositeRisks {
        rug_in_progress: has_extreme_concentration && sell_ratio > 0.70 && age_hours < 12.0,
        // holders < 100 covers the unknown sentinel (-1) as well.
        pump_setup: buy_ratio > 0.85
            && holders < 100
            && age_hours < 6.0
            && price.trades_24h > 100,
        wash_trading: trades_per_holder > 10.0 && velocity_penalty > 5.0,
        coordinated_dump: sell_ratio > 0.80 && price.trades_24h > 50 && age_hours < 24.0,
        insider_accumulation: record.launch_analysis.bundled_buys > 2
            && record.wallet_funding.clustered_wallets >= 2
            && has_whale_flag,
    };

    let mut penalty = 0.0;
    let mut flags = Vec::new();
    let active = [
        (risks.rug_in_progress, RUG_IN_PROGRESS_FLAG),
        (risks.pump_setup, PUMP_SETUP_FLAG),
        (risks.wash_trading, WASH_TRADING_FLAG),
        (risks.coordinated_dump, COORDINATED_DUMP_FLAG),
        (risks.insider_accumulation, INSIDER_FLAG),
    ];
    for (i, (is_active, flag)) in active.iter().enumerate() {
        if *is_active {
            penalty += COMPOSITE_SCORE_PENALTIES[i];
            flags.push(flag.to_string());
        }
    }

    (risks, penalty, flags)
}

/// Danger-score boost for the active risk set.
pub fn danger_boost(risks: &CompositeRisks) -> i64 {
    let active = [
        risks.rug_in_progress,
        risks.pump_setup,
        risks.wash_trading,
        risks.coordinated_dump,
        risks.insider_accumulation,
    ];
    active
        .iter()
        .zip(COMPOSITE_DANGER_BOOSTS.iter())
        .filter(|(is_active, _)| **is_active)
        .map(|(_, boost)| *boost)
        .sum()
}
