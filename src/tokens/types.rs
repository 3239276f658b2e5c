//! Core token entities.
//!
//! [`MigrationEvent`] is the pipeline input: one per token graduating from
//! the bonding curve to an AMM pool. [`TokenRecord`] is the fused output of
//! enrichment; once scored and inserted into history it is never mutated.
//!
//! All JSON field names are camelCase to match the downstream feed.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::scoring::types::AnalysisResult;

/// Substitute for an "LP locked forever" (burned) duration.
pub const LP_LOCK_FOREVER_DAYS: f64 = 36_500.0;

/// Source-quality marker for derived monetary figures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl Default for Confidence {
    fn default() -> Self {
        Confidence::Low
    }
}

/// A token graduating to an AMM pool. Immutable once received.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationEvent {
    pub mint: String,
    /// Transaction signature; empty for backfill-synthesized events,
    /// `"manual"` for API-triggered analyses.
    #[serde(default)]
    pub signature: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub symbol: String,
    /// Image or metadata URL, when the upstream frame carried one.
    pub uri: Option<String>,
    /// AMM pool identifier.
    pub pool: Option<String>,
    /// Milliseconds since epoch.
    pub timestamp: i64,
    /// USD market cap, when a source reported one directly.
    pub market_cap: Option<f64>,
    /// USD liquidity, when a source reported one directly.
    pub liquidity: Option<f64>,
    /// Creator wallet, when known at intake.
    pub creator: Option<String>,
}

impl MigrationEvent {
    /// Bare event for a mint with no upstream context (manual analysis).
    pub fn manual(mint: &str, creator: Option<String>) -> Self {
        Self {
            mint: mint.to_string(),
            signature: "manual".to_string(),
            name: String::new(),
            symbol: String::new(),
            uri: None,
            pool: None,
            timestamp: Utc::now().timestamp_millis(),
            market_cap: None,
            liquidity: None,
            creator,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenMetadata {
    pub name: String,
    pub symbol: String,
    pub image: String,
    pub creator: Option<String>,
    pub decimals: u8,
    /// Total supply as a decimal string (may exceed u64 in base units).
    pub supply: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceData {
    pub price: f64,
    pub market_cap: f64,
    pub market_cap_confidence: Confidence,
    pub liquidity: f64,
    pub volume_24h: f64,
    pub volume_1h: f64,
    pub volume_5m: f64,
    pub trades_24h: i64,
    pub buys_24h: i64,
    pub sells_24h: i64,
    pub buys_1h: i64,
    pub sells_1h: i64,
    pub buys_5m: i64,
    pub sells_5m: i64,
    pub price_change_24h: f64,
    pub price_change_1h: f64,
    pub price_change_5m: f64,
    /// Pool creation time, ms since epoch. None when no pair was found.
    pub pair_created_at: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenStatistics {
    /// -1 means unknown and must not trigger holder-count thresholds.
    pub holder_count: i64,
    pub unique_traders: i64,
    /// Fraction of supply held by the ten largest holders, 0..1.
    pub top10_concentration: f64,
    /// Fraction of supply held by the single largest holder, 0..1.
    pub largest_holder_pct: f64,
    /// Fraction of supply held by the creator wallet, 0..1.
    pub dev_holdings: f64,
    pub liquidity_ratio: f64,
    pub volume_to_liquidity_ratio: f64,
}

impl Default for TokenStatistics {
    fn default() -> Self {
        Self {
            holder_count: -1,
            unique_traders: 0,
            top10_concentration: 0.0,
            largest_holder_pct: 0.0,
            dev_holdings: 0.0,
            liquidity_ratio: 0.0,
            volume_to_liquidity_ratio: 0.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityInfo {
    pub mint_authority_revoked: bool,
    pub freeze_authority_revoked: bool,
    pub lp_locked: bool,
    /// Percent of LP locked or burned, 0..100.
    pub lp_lock_percentage: f64,
    /// Lock duration in days; [`LP_LOCK_FOREVER_DAYS`] when the LP is burned.
    pub lp_lock_duration: Option<f64>,
    /// True when at least two of the top five holder wallets are programs.
    pub top_holders_are_contracts: bool,
    pub is_rugpull_risk: bool,
}

impl SecurityInfo {
    /// pump.fun graduation revokes both authorities and burns the LP, so an
    /// unprobeable token defaults to the platform convention.
    pub fn platform_default() -> Self {
        Self {
            mint_authority_revoked: true,
            freeze_authority_revoked: true,
            lp_locked: true,
            lp_lock_percentage: 100.0,
            lp_lock_duration: Some(LP_LOCK_FOREVER_DAYS),
            top_holders_are_contracts: false,
            is_rugpull_risk: false,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LaunchAnalysis {
    /// Buy transactions sharing the earliest observed slot.
    pub bundled_buys: u32,
    /// Unique wallets buying within five minutes of launch.
    pub sniper_count: u32,
    /// Combined holdings of the earliest buyers, fraction of supply.
    pub first_buyer_holdings: f64,
    /// Mean SOL spent by the earliest buyers.
    pub avg_first_buy_size: f64,
    pub creator_bought_back: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletFunding {
    /// Size of the largest group of top holders funded by one source wallet.
    pub clustered_wallets: u32,
    pub common_funding_source: Option<String>,
    /// Top holders whose wallets first appeared within the last 24 hours.
    pub fresh_wallet_buyers: u32,
    pub suspicious_funding_pattern: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedToken {
    pub mint: String,
    pub name: String,
    /// Creation time, ms since epoch (0 when unknown).
    pub created_at: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatorHistory {
    /// Fungible tokens ever created by this wallet (bounded sample).
    pub token_count: u32,
    /// Tokens created within the last 30 days.
    pub recent_tokens: Vec<CreatedToken>,
    pub is_serial_creator: bool,
    pub rugged_tokens: u32,
    pub successful_tokens: u32,
}

/// Aggregates over recent swap and transfer activity, computed during
/// enrichment so the scoring engine never needs raw transaction lists.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradingActivity {
    /// Wallets with more than five buys and more than five sells.
    pub wash_trading_wallets: u32,
    /// Wallets averaging under 30s between trades across 10+ transactions.
    pub rapid_trade_wallets: u32,
    /// Share of buys below 0.01 units, 0..1.
    pub micro_buy_ratio: f64,
    /// Pre-first-trade transfer recipients that later sold.
    pub airdrop_transfers_sold: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialLinks {
    pub twitter: Option<String>,
    pub telegram: Option<String>,
    pub website: Option<String>,
    pub description: Option<String>,
}

/// The fused record produced by enrichment and scored by the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenRecord {
    pub address: String,
    pub metadata: TokenMetadata,
    pub price_data: PriceData,
    pub statistics: TokenStatistics,
    /// None when the security probe could not run at all.
    pub security: Option<SecurityInfo>,
    pub launch_analysis: LaunchAnalysis,
    pub wallet_funding: WalletFunding,
    pub creator_history: CreatorHistory,
    pub activity: TradingActivity,
    pub socials: SocialLinks,
    pub analysis: AnalysisResult,
    /// Migration receipt time, ms since epoch.
    pub migration_timestamp: i64,
    /// Enrichment completion time, ms since epoch.
    pub analyzed_at: i64,
}

impl TokenRecord {
    /// Skeleton record carrying only identity; enrichment fills the rest.
    pub fn skeleton(event: &MigrationEvent) -> Self {
        Self {
            address: event.mint.clone(),
            metadata: TokenMetadata {
                name: event.name.clone(),
                symbol: event.symbol.clone(),
                image: String::new(),
                creator: event.creator.clone(),
                decimals: 6,
                supply: String::new(),
            },
            price_data: PriceData::default(),
            statistics: TokenStatistics::default(),
            security: None,
            launch_analysis: LaunchAnalysis::default(),
            wallet_funding: WalletFunding::default(),
            creator_history: CreatorHistory::default(),
            activity: TradingActivity::default(),
            socials: SocialLinks::default(),
            analysis: AnalysisResult::default(),
            migration_timestamp: event.timestamp,
            analyzed_at: Utc::now().timestamp_millis(),
        }
    }

    /// Token age in hours at analysis time, preferring the pool creation
    /// time and falling back to the migration timestamp. Derived purely from
    /// record fields so re-scoring a serialized record is deterministic.
    pub fn age_hours(&self) -> f64 {
        let reference = self
            .price_data
            .pair_created_at
            .filter(|ts| *ts > 0)
            .unwrap_or(self.migration_timestamp);
        if reference <= 0 {
            return 0.0;
        }
        ((self.analyzed_at - reference) as f64 / 3_600_000.0).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn age_prefers_pair_created_at() {
        let event = MigrationEvent::manual("So11111111111111111111111111111111111111112", None);
        let mut record = TokenRecord::skeleton(&event);
        record.analyzed_at = 100 * 3_600_000;
        record.migration_timestamp = 90 * 3_600_000;
        record.price_data.pair_created_at = Some(40 * 3_600_000);

        assert!((record.age_hours() - 60.0).abs() < 1e-9);

        record.price_data.pair_created_at = None;
        assert!((record.age_hours() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn platform_default_security_is_fully_locked() {
        let sec = SecurityInfo::platform_default();
        assert!(sec.mint_authority_revoked && sec.freeze_authority_revoked && sec.lp_locked);
        assert_eq!(sec.lp_lock_duration, Some(LP_LOCK_FOREVER_DAYS));
    }
}
