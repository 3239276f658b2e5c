//! The scoring engine.
//!
//! Pure and synchronous: `score(record, config)` starts at 100, subtracts
//! the capped penalties from every check in the catalog, applies positive
//! bonuses (capped at +25) and composite-risk penalties, clamps to [0,100],
//! and derives the danger score from the result. Identical inputs always
//! produce identical output.

use std::collections::BTreeMap;

use crate::config::ScoringConfig;
use crate::tokens::types::{Confidence, TokenRecord};

use super::checks;
use super::composite;
use super::types::{AnalysisResult, CheckResult, DangerCategory, DangerScore};

/// Maximum total positive adjustment.
const BONUS_CAP: f64 = 25.0;

/// Flag fragments checked in order when selecting the primary risks.
const PRIMARY_RISK_PRIORITY: &[&str] = &[
    "rug in progress",
    "coordinated dump",
    "insider",
    "pump setup",
    "dump in progress",
    "mega whale",
    "mint authority not revoked",
    "lp not locked",
    "bundled",
    "very high concentration",
    "dangerously low liquidity",
    "sniper",
    "low holders",
    "no social links",
];

pub fn score(record: &TokenRecord, config: &ScoringConfig) -> AnalysisResult {
    let mut breakdown: BTreeMap<String, CheckResult> = BTreeMap::new();
    let mut flags: Vec<String> = Vec::new();
    let mut total_penalty = 0.0;

    for (name, result) in checks::run_all(record, config) {
        total_penalty += result.penalty;
        flags.extend(result.flags.iter().cloned());
        breakdown.insert(name.to_string(), result);
    }

    let (positive_signals, bonus) = positive_bonuses(record);
    let (composite_risks, composite_penalty, composite_flags) =
        composite::evaluate(record, &breakdown);
    flags.extend(composite_flags);

    let raw = 100.0 - total_penalty + bonus - composite_penalty;
    let score = raw.round().clamp(0.0, 100.0) as i64;

    let overall = (100 - score + composite::danger_boost(&composite_risks)).clamp(0, 100);
    let danger_score = DangerScore {
        overall,
        confidence: danger_confidence(record),
        category: DangerCategory::from_overall(overall),
        primary_risks: primary_risks(&flags),
        positive_signals: positive_signals.clone(),
    };

    AnalysisResult {
        passed: score >= config.min_score,
        score,
        flags,
        breakdown,
        danger_score,
        composite_risks,
        positive_signals,
    }
}

fn positive_bonuses(record: &TokenRecord) -> (Vec<String>, f64) {
    let mut signals = Vec::new();
    let mut bonus: f64 = 0.0;

    let age_hours = record.age_hours();
    if age_hours >= 24.0 {
        bonus += 5.0;
        signals.push("Token age > 24 hours".to_string());
    }
    if age_hours >= 72.0 {
        bonus += 5.0;
        signals.push("Mature token: over 3 days old".to_string());
    }

    let holders = record.statistics.holder_count;
    if holders >= 500 {
        bonus += 5.0;
        signals.push("Strong holder base".to_string());
    } else if holders >= 200 {
        bonus += 3.0;
        signals.push("Growing holder base".to_string());
    }

    let price = &record.price_data;
    let total_trades = price.buys_24h + price.sells_24h;
    if total_trades > 10 {
        let buy_ratio = price.buys_24h as f64 / total_trades as f64;
        if (0.40..=0.60).contains(&buy_ratio) {
            bonus += 5.0;
            signals.push("Balanced trading activity".to_string());
        }
    }

    if price.market_cap > 0.0 && price.liquidity / price.market_cap >= 0.10 {
        bonus += 5.0;
        signals.push("Healthy liquidity ratio".to_string());
    }

    if record.socials.twitter.is_some() && record.socials.website.is_some() {
        bonus += 3.0;
        signals.push("Social presence established".to_string());
    }

    if let Some(security) = &record.security {
        if security.mint_authority_revoked && security.freeze_authority_revoked && security.lp_locked
        {
            bonus += 5.0;
            signals.push("Authorities revoked and LP locked".to_string());
        }
    }

    (signals, bonus.min(BONUS_CAP))
}

fn danger_confidence(record: &TokenRecord) -> Confidence {
    if record.security.is_none() || record.price_data.trades_24h == 0 {
        return Confidence::Low;
    }
    if record.statistics.holder_count <= 0 {
        return Confidence::Medium;
    }
    Confidence::High
}

/// First up to three flags matching the fixed priority list.
fn primary_risks(flags: &[String]) -> Vec<String> {
    let mut picked: Vec<String> = Vec::new();
    for fragment in PRIMARY_RISK_PRIORITY.iter().copied() {
        if picked.len() >= 3 {
            break;
        }
        if let Some(flag) = flags
            .iter()
            .find(|f| f.to_lowercase().contains(fragment) && !picked.contains(*f))
        {
            picked.push(flag.clone());
        }
    }
    picked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokens::types::{MigrationEvent, SecurityInfo, TokenRecord};

    fn neutral_record() -> TokenRecord {
        let event = MigrationEvent::manual("So11111111111111111111111111111111111111112", None);
        let mut record = TokenRecord::skeleton(&event);
        // Two days old, so the age checks stay quiet.
        record.analyzed_at = 1_700_000_000_000;
        record.migration_timestamp = record.analyzed_at - 48 * 3_600_000;
        record.security = Some(SecurityInfo::platform_default());
        record
    }

    #[test]
    fn scoring_is_deterministic() {
        let config = ScoringConfig::default();
        let record = neutral_record();
        let first = score(&record, &config);
        let second = score(&record, &config);
        assert_eq!(first.score, second.score);
        assert_eq!(first.flags, second.flags);
        assert_eq!(first.danger_score.overall, second.danger_score.overall);
    }

    #[test]
    fn score_bounds_hold() {
        let config = ScoringConfig::default();
        let record = neutral_record();
        let analysis = score(&record, &config);
        assert!((0..=100).contains(&analysis.score));
        assert!((0..=100).contains(&analysis.danger_score.overall));
        assert_eq!(analysis.passed, analysis.score >= config.min_score);
    }

    #[test]
    fn per_check_penalties_stay_under_caps() {
        let config = ScoringConfig::default();
        let mut record = neutral_record();
        record.statistics.holder_count = 3;
        record.statistics.top10_concentration = 0.95;
        record.statistics.largest_holder_pct = 0.80;
        let analysis = score(&record, &config);
        for (name, check) in &analysis.breakdown {
            assert!(
                check.penalty <= check.max_score,
                "check {} exceeded its cap: {} > {}",
                name,
                check.penalty,
                check.max_score
            );
        }
    }

    #[test]
    fn min_score_boundaries() {
        let mut config = ScoringConfig::default();
        let record = neutral_record();

        config.min_score = 0;
        assert!(score(&record, &config).passed);

        config.min_score = 101;
        assert!(!score(&record, &config).passed);
    }

    #[test]
    fn flags_are_covered_by_breakdown_and_composites() {
        let config = ScoringConfig::default();
        let mut record = neutral_record();
        record.statistics.holder_count = 10;
        record.statistics.top10_concentration = 0.90;
        record.price_data.buys_24h = 20;
        record.price_data.sells_24h = 300;
        record.price_data.trades_24h = 320;
        record.migration_timestamp = record.analyzed_at - 2 * 3_600_000;
        let analysis = score(&record, &config);

        let composite_flags = [
            composite::RUG_IN_PROGRESS_FLAG,
            composite::PUMP_SETUP_FLAG,
            composite::WASH_TRADING_FLAG,
            composite::COORDINATED_DUMP_FLAG,
            composite::INSIDER_FLAG,
        ];
        for flag in &analysis.flags {
            let in_breakdown = analysis
                .breakdown
                .values()
                .any(|check| check.flags.contains(flag));
            let is_composite = composite_flags.iter().any(|c| c == flag);
            assert!(in_breakdown || is_composite, "orphan flag: {}", flag);
        }
    }
}
