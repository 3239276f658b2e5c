//! Enrichment orchestrator.
//!
//! `enrich(ctx, event, mode)` fans out to every provider in parallel,
//! bounds each call by its own timeout *and* the remaining per-event budget
//! (fast 6s, full 10s), and fuses whatever arrived into a scored
//! [`TokenRecord`]. The function is total: provider failures and elapsed
//! deadlines degrade fields to sentinels, they never propagate.

pub mod creator;
pub mod funding;
pub mod launch;
pub mod onchain;

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::time::Instant;

use crate::apis::holders::{HolderStats, TopHolder};
use crate::apis::pairs::TokenPair;
use crate::apis::swaps::{SwapEvent, SwapKind};
use crate::apis::ApiManager;
use crate::config::ScoringConfig;
use crate::constants::PUMPFUN_TOTAL_SUPPLY;
use crate::logger::{self, LogTag};
use crate::rpc::{ChainRpcClient, TransactionHistoryClient};
use crate::scoring;
use crate::sol_price::SolPriceOracle;
use crate::tokens::types::{
    Confidence, MigrationEvent, SocialLinks, TokenRecord, TradingActivity,
};

/// Enrichment depth. Backfill runs fast; live events and manual analyses
/// run full.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnrichMode {
    Fast,
    Full,
}

impl EnrichMode {
    fn budget(&self) -> Duration {
        match self {
            EnrichMode::Fast => Duration::from_secs(6),
            EnrichMode::Full => Duration::from_secs(10),
        }
    }

    fn is_full(&self) -> bool {
        matches!(self, EnrichMode::Full)
    }
}

/// Everything enrichment needs, passed explicitly so tests can assemble
/// fixtures without process-global state.
pub struct EnrichContext {
    pub apis: Arc<ApiManager>,
    pub rpc: Arc<ChainRpcClient>,
    pub history: Arc<TransactionHistoryClient>,
    pub sol_price: Arc<SolPriceOracle>,
    pub scoring: ScoringConfig,
    /// Short-timeout client for metadata-URI fetches.
    pub metadata_client: reqwest::Client,
}

impl EnrichContext {
    pub fn new(
        apis: Arc<ApiManager>,
        rpc: Arc<ChainRpcClient>,
        history: Arc<TransactionHistoryClient>,
        sol_price: Arc<SolPriceOracle>,
        scoring: ScoringConfig,
    ) -> Self {
        let metadata_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(3))
            .build()
            .unwrap_or_default();
        Self {
            apis,
            rpc,
            history,
            sol_price,
            scoring,
            metadata_client,
        }
    }
}

/// Remaining per-event budget. Each provider call is clipped to
/// `min(per_call_timeout, remaining)`; once the budget is gone every further
/// call yields its fallback immediately.
#[derive(Clone, Copy)]
struct Deadline {
    at: Instant,
}

impl Deadline {
    fn new(budget: Duration) -> Self {
        Self {
            at: Instant::now() + budget,
        }
    }

    fn remaining(&self) -> Duration {
        self.at.saturating_duration_since(Instant::now())
    }

    fn expired(&self) -> bool {
        self.remaining().is_zero()
    }
}

async fn bounded<T, F>(deadline: Deadline, per_call: Duration, fallback: T, future: F) -> T
where
    F: Future<Output = T>,
{
    let limit = per_call.min(deadline.remaining());
    if limit.is_zero() {
        return fallback;
    }
    match tokio::time::timeout(limit, future).await {
        Ok(value) => value,
        Err(_) => fallback,
    }
}

/// Enrich one migration event into a scored record.
pub async fn enrich(ctx: &EnrichContext, event: &MigrationEvent, mode: EnrichMode) -> TokenRecord {
    let deadline = Deadline::new(mode.budget());
    let now_ms = Utc::now().timestamp_millis();
    let mint = event.mint.as_str();
    let full = mode.is_full();

    // Step 1: resolve the creator (and asset metadata) when the event did
    // not carry one.
    let asset = if event.creator.is_none() || full {
        bounded(deadline, Duration::from_secs(3), None, ctx.rpc.get_asset(mint)).await
    } else {
        None
    };
    let creator = event
        .creator
        .clone()
        .or_else(|| asset.as_ref().and_then(|a| a.creator.clone()));

    // Step 2: independent provider fan-out.
    let per_call = if full {
        Duration::from_secs(6)
    } else {
        Duration::from_secs(4)
    };
    let swap_pages = if full { 3 } else { 1 };
    let since_24h = now_ms - 24 * 3_600_000;

    let (pairs, holder_stats, top_holders, swaps, probe, mint_info, launch_txs) = tokio::join!(
        bounded(deadline, per_call, Vec::new(), ctx.apis.pairs.get_pairs(mint)),
        bounded(
            deadline,
            per_call,
            None,
            ctx.apis.holders.get_holder_stats(mint)
        ),
        bounded(
            deadline,
            per_call,
            Vec::new(),
            ctx.apis.holders.get_top_holders(mint, 20)
        ),
        bounded(
            deadline,
            per_call,
            Vec::new(),
            ctx.apis.swaps.get_recent_swaps(mint, since_24h, 100, swap_pages)
        ),
        bounded(
            deadline,
            per_call,
            onchain::OnchainProbe::default(),
            onchain::holder_probe(&ctx.rpc, mint, creator.as_deref())
        ),
        bounded(
            deadline,
            if full { Duration::from_secs(5) } else { Duration::from_secs(3) },
            None,
            ctx.rpc.get_mint_info(mint)
        ),
        async {
            if full {
                bounded(
                    deadline,
                    Duration::from_secs(6),
                    Vec::new(),
                    ctx.history.get_transaction_history(mint, 100, Some("SWAP")),
                )
                .await
            } else {
                Vec::new()
            }
        },
    );

    // Step 3: dependent analyses. The security probe runs in every mode; a
    // spent budget (not a failed call) is the only thing that leaves the
    // record without security data.
    let security_timeout = if full {
        Duration::from_secs(5)
    } else {
        Duration::from_secs(3)
    };
    let security = if deadline.expired() {
        None
    } else {
        Some(
            bounded(
                deadline,
                security_timeout,
                crate::tokens::types::SecurityInfo::platform_default(),
                onchain::security_probe(&ctx.rpc, mint, mint_info.as_ref(), &probe.top5_owners),
            )
            .await,
        )
    };

    let (wallet_funding, creator_history, airdrop_transfers_sold) = tokio::join!(
        bounded(
            deadline,
            per_call,
            crate::tokens::types::WalletFunding::default(),
            funding::analyze_funding(&ctx.history, &top_holders, now_ms)
        ),
        async {
            match &creator {
                Some(creator_wallet) => {
                    let outcome_pairs = if full { Some(&ctx.apis.pairs) } else { None };
                    bounded(
                        deadline,
                        per_call,
                        crate::tokens::types::CreatorHistory::default(),
                        creator::analyze_creator(
                            &ctx.rpc,
                            outcome_pairs,
                            creator_wallet,
                            mint,
                            now_ms,
                        ),
                    )
                    .await
                }
                None => crate::tokens::types::CreatorHistory::default(),
            }
        },
        async {
            if full && !swaps.is_empty() {
                bounded(
                    deadline,
                    Duration::from_secs(4),
                    0u32,
                    airdrop_probe(&ctx.history, mint, &swaps),
                )
                .await
            } else {
                0u32
            }
        },
    );

    let launch_analysis = if full {
        launch::analyze_transactions(
            &launch_txs,
            event.timestamp,
            creator.as_deref(),
            &top_holders,
        )
    } else {
        Default::default()
    };

    // Step 4: image resolution (cheap precedence checks first, a bounded
    // metadata fetch only in full mode).
    let metadata_uri = asset.as_ref().and_then(|a| a.json_uri.clone());
    let image = resolve_image(ctx, deadline, event, metadata_uri.as_deref(), &pairs, full).await;

    // Step 5: aggregate, fuse, score.
    let sol_price = bounded(
        deadline,
        Duration::from_secs(2),
        None,
        ctx.sol_price.get_price_usd(),
    )
    .await;
    let aggregates = aggregate_swaps(&swaps, now_ms, sol_price);

    let mut record = fuse_record(FuseInputs {
        event,
        creator,
        asset_name: asset.as_ref().map(|a| a.name.clone()),
        pairs: &pairs,
        holder_stats,
        top_holders: &top_holders,
        probe: &probe,
        mint_info_supply: mint_info.as_ref().map(|m| m.supply.clone()),
        mint_info_decimals: mint_info.as_ref().map(|m| m.decimals),
        aggregates,
        security,
        image,
        now_ms,
    });
    record.launch_analysis = launch_analysis;
    record.wallet_funding = wallet_funding;
    record.creator_history = creator_history;
    record.activity.airdrop_transfers_sold = airdrop_transfers_sold;

    record.analysis = scoring::score(&record, &ctx.scoring);

    logger::debug(
        LogTag::Enrich,
        &format!(
            "{}: score={} danger={} flags={}",
            record.address,
            record.analysis.score,
            record.analysis.danger_score.overall,
            record.analysis.flags.len()
        ),
    );

    record
}

/// Swap-level aggregates: window counts, unique traders, wash signals.
#[derive(Debug, Clone, Default)]
pub struct SwapAggregates {
    pub buys_24h: i64,
    pub sells_24h: i64,
    pub buys_1h: i64,
    pub sells_1h: i64,
    pub buys_5m: i64,
    pub sells_5m: i64,
    pub volume_24h: f64,
    pub unique_traders: i64,
    pub wash_trading_wallets: u32,
    pub rapid_trade_wallets: u32,
    pub micro_buy_ratio: f64,
}

pub fn aggregate_swaps(swaps: &[SwapEvent], now_ms: i64, sol_price: Option<f64>) -> SwapAggregates {
    let mut aggregates = SwapAggregates::default();
    if swaps.is_empty() {
        return aggregates;
    }

    let hour_ago = now_ms - 3_600_000;
    let five_min_ago = now_ms - 300_000;
    // "Micro" means under 0.01 SOL of value; without a SOL price the signal
    // is skipped rather than guessed.
    let micro_threshold = sol_price.map(|p| 0.01 * p);

    let mut per_wallet: HashMap<&str, (u32, u32, Vec<i64>)> = HashMap::new();
    let mut micro_buys = 0u32;
    let mut total_buys = 0u32;

    for swap in swaps {
        let is_buy = swap.kind == SwapKind::Buy;
        if is_buy {
            aggregates.buys_24h += 1;
            total_buys += 1;
            if let Some(threshold) = micro_threshold {
                if swap.value_usd > 0.0 && swap.value_usd < threshold {
                    micro_buys += 1;
                }
            }
        } else {
            aggregates.sells_24h += 1;
        }
        if swap.timestamp >= hour_ago {
            if is_buy {
                aggregates.buys_1h += 1;
            } else {
                aggregates.sells_1h += 1;
            }
        }
        if swap.timestamp >= five_min_ago {
            if is_buy {
                aggregates.buys_5m += 1;
            } else {
                aggregates.sells_5m += 1;
            }
        }
        aggregates.volume_24h += swap.value_usd;

        let entry = per_wallet.entry(swap.wallet.as_str()).or_default();
        if is_buy {
            entry.0 += 1;
        } else {
            entry.1 += 1;
        }
        entry.2.push(swap.timestamp);
    }

    aggregates.unique_traders = per_wallet.len() as i64;
    if total_buys > 0 {
        aggregates.micro_buy_ratio = micro_buys as f64 / total_buys as f64;
    }

    for (_, (buys, sells, mut timestamps)) in per_wallet {
        if buys > 5 && sells > 5 {
            aggregates.wash_trading_wallets += 1;
        }
        let total = buys + sells;
        if total > 10 {
            timestamps.sort_unstable();
            let gaps: Vec<i64> = timestamps.windows(2).map(|w| w[1] - w[0]).collect();
            if !gaps.is_empty() {
                let mean_gap_ms = gaps.iter().sum::<i64>() as f64 / gaps.len() as f64;
                if mean_gap_ms < 30_000.0 {
                    aggregates.rapid_trade_wallets += 1;
                }
            }
        }
    }

    aggregates
}

/// Count pre-first-trade transfer recipients that later sold.
async fn airdrop_probe(
    history: &TransactionHistoryClient,
    mint: &str,
    swaps: &[SwapEvent],
) -> u32 {
    let Some(first_trade_ms) = swaps.iter().map(|s| s.timestamp).min() else {
        return 0;
    };

    let transfers = history
        .get_transaction_history(mint, 100, Some("TRANSFER"))
        .await;
    if transfers.is_empty() {
        return 0;
    }

    let sellers: HashSet<&str> = swaps
        .iter()
        .filter(|s| s.kind == SwapKind::Sell)
        .map(|s| s.wallet.as_str())
        .collect();

    let mut sold = HashSet::new();
    for tx in &transfers {
        if tx.timestamp <= 0 || tx.timestamp * 1000 >= first_trade_ms {
            continue;
        }
        for transfer in &tx.token_transfers {
            if transfer.mint == mint && sellers.contains(transfer.to_account.as_str()) {
                sold.insert(transfer.to_account.clone());
            }
        }
    }
    sold.len() as u32
}

const IMAGE_EXTENSIONS: &[&str] = &[".png", ".jpg", ".jpeg", ".gif", ".webp", ".svg"];
const IMAGE_CDN_HINTS: &[&str] = &["ipfs", "arweave", "pinata", "cf-ipfs"];

fn looks_like_image_url(url: &str) -> bool {
    let lower = url.to_lowercase();
    IMAGE_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
        || IMAGE_CDN_HINTS.iter().any(|hint| lower.contains(hint))
}

async fn resolve_image(
    ctx: &EnrichContext,
    deadline: Deadline,
    event: &MigrationEvent,
    metadata_uri: Option<&str>,
    pairs: &[TokenPair],
    full: bool,
) -> String {
    if let Some(uri) = &event.uri {
        if looks_like_image_url(uri) {
            return uri.clone();
        }
    }

    if full {
        let candidate = metadata_uri.or(event.uri.as_deref());
        if let Some(uri) = candidate {
            let fetched = bounded(deadline, Duration::from_secs(3), None, async {
                let body: serde_json::Value = ctx
                    .metadata_client
                    .get(uri)
                    .send()
                    .await
                    .ok()?
                    .json()
                    .await
                    .ok()?;
                body.get("image")
                    .and_then(serde_json::Value::as_str)
                    .map(str::to_string)
            })
            .await;
            if let Some(image) = fetched {
                return image;
            }
        }
    }

    pairs
        .iter()
        .find_map(|p| p.image_url.clone())
        .unwrap_or_default()
}

struct FuseInputs<'a> {
    event: &'a MigrationEvent,
    creator: Option<String>,
    asset_name: Option<String>,
    pairs: &'a [TokenPair],
    holder_stats: Option<HolderStats>,
    top_holders: &'a [TopHolder],
    probe: &'a onchain::OnchainProbe,
    mint_info_supply: Option<String>,
    mint_info_decimals: Option<u8>,
    aggregates: SwapAggregates,
    security: Option<crate::tokens::types::SecurityInfo>,
    image: String,
    now_ms: i64,
}

/// Apply the per-field precedence rules and assemble the record.
fn fuse_record(inputs: FuseInputs<'_>) -> TokenRecord {
    let FuseInputs {
        event,
        creator,
        asset_name,
        pairs,
        holder_stats,
        top_holders,
        probe,
        mint_info_supply,
        mint_info_decimals,
        aggregates,
        security,
        image,
        now_ms,
    } = inputs;

    let mut record = TokenRecord::skeleton(event);
    record.analyzed_at = now_ms;
    record.metadata.creator = creator.clone();
    record.metadata.image = image;
    if record.metadata.name.is_empty() {
        record.metadata.name = asset_name.unwrap_or_default();
    }
    record.metadata.decimals = mint_info_decimals.unwrap_or(probe.decimals);
    record.metadata.supply = mint_info_supply
        .filter(|s| !s.is_empty())
        .or_else(|| probe.supply_ui.map(|s| format!("{:.0}", s)))
        .unwrap_or_default();

    let best_pair = pairs.first();

    // price: best pair else 0.
    let price = best_pair.map(|p| p.price_usd).unwrap_or(0.0);
    record.price_data.price = price;

    // marketCap: event (high confidence) -> supply estimate (low) -> 0.
    match event.market_cap {
        Some(mc) if mc > 0.0 => {
            record.price_data.market_cap = mc;
            record.price_data.market_cap_confidence = Confidence::High;
        }
        _ if price > 0.0 => {
            record.price_data.market_cap = price * PUMPFUN_TOTAL_SUPPLY;
            record.price_data.market_cap_confidence = Confidence::Low;
        }
        _ => {
            record.price_data.market_cap = 0.0;
            record.price_data.market_cap_confidence = Confidence::Low;
        }
    }

    // liquidity: event -> pair sum -> 0.
    let pair_liquidity: f64 = pairs.iter().map(|p| p.liquidity_usd).sum();
    record.price_data.liquidity = event
        .liquidity
        .filter(|l| *l > 0.0)
        .unwrap_or(pair_liquidity);

    // volume: pair sum when positive, else swap-derived.
    let pair_volume: f64 = pairs.iter().map(|p| p.volume_24h).sum();
    record.price_data.volume_24h = if pair_volume > 0.0 {
        pair_volume
    } else {
        aggregates.volume_24h
    };
    record.price_data.volume_1h = pairs.iter().map(|p| p.volume_1h).sum();
    record.price_data.volume_5m = pairs.iter().map(|p| p.volume_5m).sum();

    // Trade counts: pairs when available, swap-derived otherwise.
    let pair_buys_24h: i64 = pairs.iter().map(|p| p.buys_24h).sum();
    let pair_sells_24h: i64 = pairs.iter().map(|p| p.sells_24h).sum();
    if pair_buys_24h + pair_sells_24h > 0 {
        record.price_data.buys_24h = pair_buys_24h;
        record.price_data.sells_24h = pair_sells_24h;
        record.price_data.buys_1h = pairs.iter().map(|p| p.buys_1h).sum();
        record.price_data.sells_1h = pairs.iter().map(|p| p.sells_1h).sum();
        record.price_data.buys_5m = pairs.iter().map(|p| p.buys_5m).sum();
        record.price_data.sells_5m = pairs.iter().map(|p| p.sells_5m).sum();
    } else {
        record.price_data.buys_24h = aggregates.buys_24h;
        record.price_data.sells_24h = aggregates.sells_24h;
        record.price_data.buys_1h = aggregates.buys_1h;
        record.price_data.sells_1h = aggregates.sells_1h;
        record.price_data.buys_5m = aggregates.buys_5m;
        record.price_data.sells_5m = aggregates.sells_5m;
    }
    record.price_data.trades_24h = record.price_data.buys_24h + record.price_data.sells_24h;

    record.price_data.price_change_24h = best_pair.map(|p| p.price_change_24h).unwrap_or(0.0);
    record.price_data.price_change_1h = best_pair.map(|p| p.price_change_1h).unwrap_or(0.0);
    record.price_data.price_change_5m = best_pair.map(|p| p.price_change_5m).unwrap_or(0.0);
    record.price_data.pair_created_at = best_pair.and_then(|p| p.pair_created_at);

    // Holder statistics: registry first, on-chain probe second, sentinel
    // last. A registry answer of zero holders for a live pool is "unknown".
    record.statistics.holder_count = holder_stats
        .as_ref()
        .map(|s| s.total_holders)
        .filter(|count| *count > 0)
        .unwrap_or(-1);

    let registry_dev: f64 = creator
        .as_deref()
        .map(|creator| {
            top_holders
                .iter()
                .filter(|h| h.owner == creator)
                .map(|h| h.pct)
                .sum()
        })
        .unwrap_or(0.0);
    record.statistics.dev_holdings = if registry_dev > 0.0 {
        registry_dev
    } else {
        probe.dev_holdings
    };

    let registry_top10 = holder_stats
        .as_ref()
        .and_then(|s| s.top10_percent)
        .filter(|pct| *pct > 0.0);
    let holders_top10: f64 = top_holders.iter().take(10).map(|h| h.pct).sum();
    record.statistics.top10_concentration = registry_top10
        .or(Some(holders_top10).filter(|pct| *pct > 0.0))
        .unwrap_or(probe.top10_concentration)
        .clamp(0.0, 1.0);

    record.statistics.largest_holder_pct = top_holders
        .first()
        .map(|h| h.pct)
        .filter(|pct| *pct > 0.0)
        .unwrap_or(probe.largest_pct)
        .clamp(0.0, 1.0);

    record.statistics.unique_traders = aggregates.unique_traders;

    if record.price_data.market_cap > 0.0 {
        record.statistics.liquidity_ratio =
            record.price_data.liquidity / record.price_data.market_cap;
    }
    if record.price_data.liquidity > 0.0 {
        record.statistics.volume_to_liquidity_ratio =
            record.price_data.volume_24h / record.price_data.liquidity;
    }

    record.activity = TradingActivity {
        wash_trading_wallets: aggregates.wash_trading_wallets,
        rapid_trade_wallets: aggregates.rapid_trade_wallets,
        micro_buy_ratio: aggregates.micro_buy_ratio,
        airdrop_transfers_sold: 0,
    };

    record.socials = extract_socials(pairs);
    record.security = security;

    record
}

fn extract_socials(pairs: &[TokenPair]) -> SocialLinks {
    let mut socials = SocialLinks::default();
    let Some(pair) = pairs.first() else {
        return socials;
    };

    for (platform, url) in &pair.socials {
        if socials.twitter.is_none() && (platform.contains("twitter") || platform == "x") {
            socials.twitter = Some(url.clone());
        } else if socials.telegram.is_none() && platform.contains("telegram") {
            socials.telegram = Some(url.clone());
        }
    }
    socials.website = pair.websites.first().cloned();
    socials.description = pair.description.clone();
    socials
}

#[cfg(test)]
mod tests {
    use super::*;

    fn swap(kind: SwapKind, wallet: &str, value: f64, ts: i64) -> SwapEvent {
        SwapEvent {
            kind,
            value_usd: value,
            wallet: wallet.to_string(),
            timestamp: ts,
        }
    }

    #[test]
    fn aggregates_count_windows_and_traders() {
        let now = 1_700_000_000_000i64;
        let swaps = vec![
            swap(SwapKind::Buy, "A", 50.0, now - 10_000),
            swap(SwapKind::Sell, "B", 20.0, now - 200_000),
            swap(SwapKind::Buy, "A", 30.0, now - 2 * 3_600_000),
            swap(SwapKind::Buy, "C", 10.0, now - 23 * 3_600_000),
        ];

        let aggregates = aggregate_swaps(&swaps, now, Some(200.0));
        assert_eq!(aggregates.buys_24h, 3);
        assert_eq!(aggregates.sells_24h, 1);
        assert_eq!(aggregates.buys_5m, 1);
        assert_eq!(aggregates.sells_5m, 1);
        assert_eq!(aggregates.unique_traders, 3);
        assert!((aggregates.volume_24h - 110.0).abs() < 1e-9);
        assert_eq!(aggregates.micro_buy_ratio, 0.0);
    }

    #[test]
    fn wash_and_rapid_wallets_detected() {
        let now = 1_700_000_000_000i64;
        let mut swaps = Vec::new();
        // One wallet buying and selling 6 times each, 10s apart.
        for i in 0..12 {
            let kind = if i % 2 == 0 { SwapKind::Buy } else { SwapKind::Sell };
            swaps.push(swap(kind, "WASH", 25.0, now - 3_600_000 + i * 10_000));
        }

        let aggregates = aggregate_swaps(&swaps, now, Some(200.0));
        assert_eq!(aggregates.wash_trading_wallets, 1);
        assert_eq!(aggregates.rapid_trade_wallets, 1);
    }

    #[test]
    fn micro_buys_need_a_sol_price() {
        let now = 1_700_000_000_000i64;
        // 0.01 SOL at $200 is $2; these buys are half that.
        let swaps = vec![
            swap(SwapKind::Buy, "A", 1.0, now - 1000),
            swap(SwapKind::Buy, "B", 1.0, now - 2000),
            swap(SwapKind::Buy, "C", 500.0, now - 3000),
        ];

        let with_price = aggregate_swaps(&swaps, now, Some(200.0));
        assert!((with_price.micro_buy_ratio - 2.0 / 3.0).abs() < 1e-9);

        let without_price = aggregate_swaps(&swaps, now, None);
        assert_eq!(without_price.micro_buy_ratio, 0.0);
    }

    #[test]
    fn image_url_detection() {
        assert!(looks_like_image_url("https://cdn.example/logo.png"));
        assert!(looks_like_image_url("https://ipfs.io/ipfs/Qm123"));
        assert!(!looks_like_image_url("https://example.com/metadata.json"));
    }

    fn fuse_defaults<'a>(
        event: &'a MigrationEvent,
        pairs: &'a [TokenPair],
        probe: &'a onchain::OnchainProbe,
        holders: &'a [TopHolder],
    ) -> FuseInputs<'a> {
        FuseInputs {
            event,
            creator: None,
            asset_name: None,
            pairs,
            holder_stats: None,
            top_holders: holders,
            probe,
            mint_info_supply: None,
            mint_info_decimals: None,
            aggregates: SwapAggregates::default(),
            security: None,
            image: String::new(),
            now_ms: 1_700_000_000_000,
        }
    }

    #[test]
    fn sentinel_inputs_fuse_to_zeroed_record() {
        let event = MigrationEvent::manual("So11111111111111111111111111111111111111112", None);
        let probe = onchain::OnchainProbe::default();
        let record = fuse_record(fuse_defaults(&event, &[], &probe, &[]));

        assert_eq!(record.price_data.price, 0.0);
        assert_eq!(record.price_data.market_cap, 0.0);
        assert_eq!(record.price_data.liquidity, 0.0);
        assert_eq!(record.price_data.trades_24h, 0);
        assert_eq!(record.statistics.holder_count, -1);
        assert_eq!(record.statistics.top10_concentration, 0.0);
        assert!(record.security.is_none());
    }

    #[test]
    fn event_market_cap_beats_estimate() {
        let mut event = MigrationEvent::manual("So11111111111111111111111111111111111111112", None);
        event.market_cap = Some(250_000.0);
        let pair = TokenPair {
            price_usd: 0.001,
            liquidity_usd: 40_000.0,
            ..TokenPair::default()
        };
        let pairs = vec![pair];
        let probe = onchain::OnchainProbe::default();
        let record = fuse_record(fuse_defaults(&event, &pairs, &probe, &[]));

        assert_eq!(record.price_data.market_cap, 250_000.0);
        assert_eq!(record.price_data.market_cap_confidence, Confidence::High);
        assert_eq!(record.price_data.liquidity, 40_000.0);

        // Without the event figure the estimate kicks in at low confidence.
        event.market_cap = None;
        let record = fuse_record(fuse_defaults(&event, &pairs, &probe, &[]));
        assert_eq!(record.price_data.market_cap, 0.001 * PUMPFUN_TOTAL_SUPPLY);
        assert_eq!(record.price_data.market_cap_confidence, Confidence::Low);
    }

    #[test]
    fn registry_zero_holders_means_unknown() {
        let event = MigrationEvent::manual("So11111111111111111111111111111111111111112", None);
        let probe = onchain::OnchainProbe::default();
        let mut inputs = fuse_defaults(&event, &[], &probe, &[]);
        inputs.holder_stats = Some(HolderStats {
            total_holders: 0,
            top10_percent: None,
            dev_holdings_percent: None,
        });
        let record = fuse_record(inputs);
        assert_eq!(record.statistics.holder_count, -1);
    }
}
