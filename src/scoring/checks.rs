//! The scoring check catalog.
//!
//! Every check is a pure function over the fused record and the threshold
//! config, returning an independent [`CheckResult`] whose penalty is capped
//! at the check's maximum. No check touches I/O or the clock: token age is
//! derived from the record's own timestamps.

use crate::config::ScoringConfig;
use crate::tokens::types::TokenRecord;

use super::types::CheckResult;

/// Words that mark a description as boilerplate when nothing else is in it.
const GENERIC_WORDS: &[&str] = &[
    "moon", "gem", "pump", "100x", "1000x", "best", "token", "coin", "safe", "rich", "buy",
    "now", "next", "big",
];

/// Name fragments commonly used to impersonate well-known figures or brands.
const IMPERSONATION_HINTS: &[&str] = &["elon", "musk", "trump", "doge", "shiba", "pepe", "official"];

pub fn wash_trading(record: &TokenRecord, _config: &ScoringConfig) -> CheckResult {
    let mut result = CheckResult::new(20.0);
    let activity = &record.activity;

    if activity.wash_trading_wallets > 0 {
        result.hit(
            12.0,
            format!(
                "Wash trading pattern: {} wallet(s) both buying and selling heavily",
                activity.wash_trading_wallets
            ),
        );
    }
    if activity.rapid_trade_wallets > 0 {
        result.hit(
            10.0,
            format!(
                "Rapid-fire trading: {} wallet(s) under 30s between trades",
                activity.rapid_trade_wallets
            ),
        );
    }

    result.finalize()
}

pub fn holder_distribution(record: &TokenRecord, config: &ScoringConfig) -> CheckResult {
    let mut result = CheckResult::new(25.0);
    let stats = &record.statistics;

    // holder_count == -1 means unknown and never triggers the count bands.
    if stats.holder_count >= 0 {
        if stats.holder_count < config.min_holders {
            result.hit(15.0, format!("Low holders: {}", stats.holder_count));
        } else if stats.holder_count < config.min_holders * 2 {
            result.hit(8.0, format!("Moderate holders: {}", stats.holder_count));
        }
    }

    if stats.top10_concentration > 0.50 {
        result.hit(
            15.0,
            format!(
                "🚨 Very high concentration: top 10 hold {:.1}%",
                stats.top10_concentration * 100.0
            ),
        );
    } else if stats.top10_concentration > config.max_top10 {
        result.hit(
            10.0,
            format!(
                "High concentration: top 10 hold {:.1}%",
                stats.top10_concentration * 100.0
            ),
        );
    }

    if stats.largest_holder_pct > 0.30 {
        result.hit(
            10.0,
            format!(
                "🐋 Mega whale: largest holder owns {:.1}%",
                stats.largest_holder_pct * 100.0
            ),
        );
    } else if stats.largest_holder_pct > 0.20 {
        result.hit(
            6.0,
            format!(
                "🐋 Whale: largest holder owns {:.1}%",
                stats.largest_holder_pct * 100.0
            ),
        );
    }

    result.finalize()
}

pub fn developer_holdings(record: &TokenRecord, config: &ScoringConfig) -> CheckResult {
    let mut result = CheckResult::new(15.0);
    let dev = record.statistics.dev_holdings;

    if dev > 0.25 {
        result.hit(15.0, format!("🚨 Dev holds {:.1}% of supply", dev * 100.0));
    } else if dev > config.max_dev_holdings {
        result.hit(10.0, format!("High dev holdings: {:.1}%", dev * 100.0));
    } else if dev > 0.05 {
        result.hit(5.0, format!("Elevated dev holdings: {:.1}%", dev * 100.0));
    }

    result.finalize()
}

pub fn volume_manipulation(record: &TokenRecord, config: &ScoringConfig) -> CheckResult {
    let mut result = CheckResult::new(20.0);
    let trades = record.price_data.trades_24h;
    let unique = record.statistics.unique_traders;

    // unique_traders == 0 is the sentinel for "no swap data", not for
    // "one wallet doing everything".
    if trades > 0 && unique > 0 {
        let ratio = unique as f64 / trades as f64;
        if ratio < 0.30 {
            result.hit(
                15.0,
                format!("Very low unique-trader ratio: {:.2}", ratio),
            );
        } else if ratio < config.min_unique_ratio {
            result.hit(8.0, format!("Low unique-trader ratio: {:.2}", ratio));
        }
    }

    if record.activity.micro_buy_ratio > 0.40 {
        result.hit(
            10.0,
            format!(
                "Micro-buy spam: {:.0}% of buys under 0.01",
                record.activity.micro_buy_ratio * 100.0
            ),
        );
    }

    result.finalize()
}

pub fn airdrop_scheme(record: &TokenRecord, _config: &ScoringConfig) -> CheckResult {
    let mut result = CheckResult::new(15.0);
    let sold = record.activity.airdrop_transfers_sold;

    if sold > 5 {
        result.hit(15.0, format!("🚨 Airdrop dump: {} recipients sold", sold));
    } else if sold > 2 {
        result.hit(8.0, format!("Airdrop recipients selling: {}", sold));
    }

    result.finalize()
}

pub fn social_signals(record: &TokenRecord, _config: &ScoringConfig) -> CheckResult {
    let mut result = CheckResult::new(10.0);
    let socials = &record.socials;
    let has_twitter = socials.twitter.is_some();
    let has_telegram = socials.telegram.is_some();

    if !has_twitter && !has_telegram {
        result.hit(6.0, "No social links".to_string());
    } else if !has_twitter {
        result.hit(3.0, "No Twitter account".to_string());
    }

    if socials.website.is_none() {
        result.hit(2.0, "No website".to_string());
    }

    if let Some(description) = &socials.description {
        if is_generic_description(description) {
            result.hit(3.0, "Generic hype description".to_string());
        }
    }

    let name = record.metadata.name.to_lowercase();
    if !has_twitter && IMPERSONATION_HINTS.iter().any(|hint| name.contains(hint)) {
        result.hit(4.0, "Possible impersonation with no social proof".to_string());
    }

    result.finalize()
}

fn is_generic_description(description: &str) -> bool {
    let words: Vec<&str> = description
        .split_whitespace()
        .filter(|w| w.chars().any(char::is_alphanumeric))
        .collect();
    if words.is_empty() || words.len() > 8 {
        return false;
    }
    words.iter().all(|word| {
        let cleaned: String = word
            .to_lowercase()
            .chars()
            .filter(|c| c.is_alphanumeric())
            .collect();
        cleaned.len() <= 2 || GENERIC_WORDS.contains(&cleaned.as_str())
    })
}

pub fn token_age(record: &TokenRecord, _config: &ScoringConfig) -> CheckResult {
    let mut result = CheckResult::new(15.0);
    let age_hours = record.age_hours();

    if age_hours < 0.5 {
        result.hit(
            15.0,
            format!("Brand new token: {:.0} minutes old", age_hours * 60.0),
        );
    } else if age_hours < 1.0 {
        result.hit(10.0, "Very new token: under an hour old".to_string());
    } else if age_hours < 6.0 {
        result.hit(5.0, format!("Young token: {:.1} hours old", age_hours));
    }

    result.finalize()
}

pub fn buy_pressure(record: &TokenRecord, _config: &ScoringConfig) -> CheckResult {
    let mut result = CheckResult::new(15.0);
    let price = &record.price_data;
    let total = price.buys_24h + price.sells_24h;

    if total > 0 {
        let buy_ratio = price.buys_24h as f64 / total as f64;
        if buy_ratio > 0.90 {
            result.hit(
                10.0,
                format!("Extreme buy pressure: {:.0}% buys", buy_ratio * 100.0),
            );
        } else if buy_ratio > 0.80 {
            result.hit(
                5.0,
                format!("Heavy buy pressure: {:.0}% buys", buy_ratio * 100.0),
            );
        }
        if buy_ratio < 0.20 {
            result.hit(
                15.0,
                format!("🚨 Dump in progress: {:.0}% sells", (1.0 - buy_ratio) * 100.0),
            );
        }
    }

    if price.volume_1h > 0.0 {
        let five_minute_average = price.volume_1h / 12.0;
        if price.volume_5m > five_minute_average * 5.0 {
            result.hit(
                8.0,
                format!(
                    "Volume spike: 5m volume {:.1}x the hourly average",
                    price.volume_5m / five_minute_average
                ),
            );
        }
    }

    if price.price_change_5m.abs() > 30.0 {
        result.hit(
            10.0,
            format!("Violent 5m price move: {:+.1}%", price.price_change_5m),
        );
    }
    if price.price_change_1h.abs() > 50.0 {
        result.hit(
            8.0,
            format!("Violent 1h price move: {:+.1}%", price.price_change_1h),
        );
    }

    result.finalize()
}

pub fn liquidity_health(record: &TokenRecord, _config: &ScoringConfig) -> CheckResult {
    let mut result = CheckResult::new(20.0);
    let price = &record.price_data;

    // market_cap == 0 means no market data at all; nothing to judge.
    if price.market_cap <= 0.0 {
        return result.finalize();
    }

    let ratio = price.liquidity / price.market_cap;
    if ratio < 0.02 {
        result.hit(
            20.0,
            format!(
                "🚨 Dangerously low liquidity: {:.1}% of market cap",
                ratio * 100.0
            ),
        );
    } else if ratio < 0.05 {
        result.hit(
            12.0,
            format!("Low liquidity: {:.1}% of market cap", ratio * 100.0),
        );
    } else if ratio < 0.10 {
        result.hit(
            5.0,
            format!("Thin liquidity: {:.1}% of market cap", ratio * 100.0),
        );
    }

    if price.liquidity > 0.0 && price.volume_24h > 0.0 {
        let turnover = price.volume_24h / price.liquidity;
        if turnover > 20.0 {
            result.hit(10.0, format!("Volume {:.0}x liquidity", turnover));
        } else if turnover > 10.0 {
            result.hit(5.0, format!("Volume {:.0}x liquidity", turnover));
        }
    }

    if price.liquidity < 5_000.0 {
        result.hit(10.0, "Liquidity under $5k".to_string());
    } else if price.liquidity < 10_000.0 {
        result.hit(5.0, "Liquidity under $10k".to_string());
    }

    result.finalize()
}

pub fn security(record: &TokenRecord, _config: &ScoringConfig) -> CheckResult {
    let mut result = CheckResult::new(25.0);

    let Some(security) = &record.security else {
        result.hit(5.0, "Security data unavailable".to_string());
        return result.finalize();
    };

    if !security.mint_authority_revoked {
        result.hit(15.0, "⚠️ Mint authority not revoked".to_string());
    }
    if !security.freeze_authority_revoked {
        result.hit(10.0, "⚠️ Freeze authority not revoked".to_string());
    }
    if !security.lp_locked {
        if security.lp_lock_percentage < 80.0 {
            result.hit(15.0, "🔓 LP not locked".to_string());
        }
        if security.lp_lock_percentage < 50.0 {
            result.hit(8.0, "LP lock below 50%".to_string());
        }
    }
    if security.top_holders_are_contracts {
        result.hit(10.0, "Top holders are contract accounts".to_string());
    }
    if security.is_rugpull_risk {
        result.hit(5.0, "Flagged as rugpull risk".to_string());
    }

    result.finalize()
}

pub fn snipers(record: &TokenRecord, _config: &ScoringConfig) -> CheckResult {
    let mut result = CheckResult::new(20.0);
    let launch = &record.launch_analysis;

    if launch.bundled_buys > 3 {
        result.hit(
            15.0,
            format!("🚨 Bundled launch: {} buys in creation slot", launch.bundled_buys),
        );
    } else if launch.bundled_buys > 1 {
        result.hit(
            8.0,
            format!("Bundled buys at launch: {}", launch.bundled_buys),
        );
    }

    if launch.sniper_count > 20 {
        result.hit(
            12.0,
            format!("Heavy sniper activity: {} snipers", launch.sniper_count),
        );
    } else if launch.sniper_count > 10 {
        result.hit(6.0, format!("Sniper activity: {}", launch.sniper_count));
    }

    if launch.avg_first_buy_size > 5.0 {
        result.hit(
            10.0,
            format!("Large first buys: avg {:.1} SOL", launch.avg_first_buy_size),
        );
    } else if launch.avg_first_buy_size > 2.0 {
        result.hit(
            5.0,
            format!("Sizable first buys: avg {:.1} SOL", launch.avg_first_buy_size),
        );
    }

    if launch.creator_bought_back {
        result.hit(8.0, "Creator bought back in".to_string());
    }

    result.finalize()
}

pub fn wallet_funding(record: &TokenRecord, _config: &ScoringConfig) -> CheckResult {
    let mut result = CheckResult::new(25.0);
    let funding = &record.wallet_funding;

    if funding.clustered_wallets >= 5 {
        result.hit(
            20.0,
            format!(
                "🚨 Wallet cluster: {} holders share a funding source",
                funding.clustered_wallets
            ),
        );
    } else if funding.clustered_wallets >= 3 {
        result.hit(
            12.0,
            format!(
                "Wallet cluster: {} holders share a funding source",
                funding.clustered_wallets
            ),
        );
    } else if funding.clustered_wallets >= 2 {
        result.hit(
            5.0,
            format!(
                "{} holders share a funding source",
                funding.clustered_wallets
            ),
        );
    }

    if funding.fresh_wallet_buyers >= 5 {
        result.hit(
            15.0,
            format!("Fresh wallets: {} brand-new buyer wallets", funding.fresh_wallet_buyers),
        );
    } else if funding.fresh_wallet_buyers >= 3 {
        result.hit(
            8.0,
            format!("Fresh wallets: {} new buyer wallets", funding.fresh_wallet_buyers),
        );
    }

    if funding.suspicious_funding_pattern {
        result.hit(5.0, "Suspicious funding pattern".to_string());
    }

    result.finalize()
}

pub fn trade_velocity(record: &TokenRecord, _config: &ScoringConfig) -> CheckResult {
    let mut result = CheckResult::new(15.0);
    let holders = record.statistics.holder_count;
    let trades = record.price_data.trades_24h;

    if holders <= 0 || trades == 0 {
        return result.finalize();
    }

    let per_holder = trades as f64 / holders as f64;
    if per_holder > 20.0 {
        result.hit(
            15.0,
            format!("Extreme trade velocity: {:.1} trades per holder", per_holder),
        );
    } else if per_holder > 10.0 {
        result.hit(
            10.0,
            format!("High trade velocity: {:.1} trades per holder", per_holder),
        );
    } else if per_holder > 5.0 {
        result.hit(
            5.0,
            format!("Elevated trade velocity: {:.1} trades per holder", per_holder),
        );
    }

    result.finalize()
}

pub fn creator_history(record: &TokenRecord, _config: &ScoringConfig) -> CheckResult {
    let mut result = CheckResult::new(35.0);
    let history = &record.creator_history;
    let recent = history.recent_tokens.len();

    if recent >= 10 {
        result.hit(
            30.0,
            format!("🚨 SERIAL SCAMMER: {} tokens in 30 days", recent),
        );
    } else if recent >= 5 {
        result.hit(20.0, format!("Serial creator: {} tokens in 30 days", recent));
    } else if recent >= 3 {
        result.hit(12.0, format!("Repeat creator: {} tokens in 30 days", recent));
    }

    if history.token_count >= 20 {
        result.hit(
            15.0,
            format!("Prolific creator: {} tokens total", history.token_count),
        );
    } else if history.token_count >= 10 {
        result.hit(
            8.0,
            format!("Experienced creator: {} tokens total", history.token_count),
        );
    } else if history.token_count >= 5 {
        result.hit(4.0, format!("Creator has {} prior tokens", history.token_count));
    }

    if history.rugged_tokens >= 3 {
        result.hit(
            15.0,
            format!("🚨 Creator has rugged {} tokens", history.rugged_tokens),
        );
    }

    result.finalize()
}

/// The full catalog, in breakdown order, with the keys used in the
/// per-check breakdown map.
pub fn run_all(record: &TokenRecord, config: &ScoringConfig) -> Vec<(&'static str, CheckResult)> {
    vec![
        ("washTrading", wash_trading(record, config)),
        ("holderDistribution", holder_distribution(record, config)),
        ("developerHoldings", developer_holdings(record, config)),
        ("volumeManipulation", volume_manipulation(record, config)),
        ("airdropScheme", airdrop_scheme(record, config)),
        ("socialSignals", social_signals(record, config)),
        ("tokenAge", token_age(record, config)),
        ("buyPressure", buy_pressure(record, config)),
        ("liquidityHealth", liquidity_health(record, config)),
        ("security", security(record, config)),
        ("snipers", snipers(record, config)),
        ("walletFunding", wallet_funding(record, config)),
        ("tradeVelocity", trade_velocity(record, config)),
        ("creatorHistory", creator_history(record, config)),
    ]
}
