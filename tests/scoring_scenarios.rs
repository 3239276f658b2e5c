//! End-to-end scoring scenarios over hand-built token records.

use pumpwatch::config::ScoringConfig;
use pumpwatch::scoring::{self, DangerCategory};
use pumpwatch::tokens::types::{
    Confidence, CreatedToken, MigrationEvent, SecurityInfo, TokenRecord,
};

const NOW_MS: i64 = 1_700_000_000_000;

fn base_record(age_hours: i64) -> TokenRecord {
    let event = MigrationEvent::manual("A8C3xuqscfmyLrte3VmTqrAq8kgMASius9AFNANwpump", None);
    let mut record = TokenRecord::skeleton(&event);
    record.metadata.name = "Solid Token".to_string();
    record.metadata.symbol = "SOLID".to_string();
    record.analyzed_at = NOW_MS;
    record.migration_timestamp = NOW_MS - age_hours * 3_600_000;
    record.security = Some(SecurityInfo::platform_default());
    record
}

fn score(record: &TokenRecord) -> pumpwatch::scoring::AnalysisResult {
    scoring::score(record, &ScoringConfig::default())
}

fn assert_universal_invariants(analysis: &pumpwatch::scoring::AnalysisResult) {
    assert!((0..=100).contains(&analysis.score));
    assert!((0..=100).contains(&analysis.danger_score.overall));
    // Danger = inverse score plus at most 60 points of composite boosts.
    assert!(analysis.danger_score.overall + analysis.score <= 160);
    for (name, check) in &analysis.breakdown {
        assert!(
            check.penalty >= 0.0 && check.penalty <= check.max_score,
            "{} penalty {} out of [0, {}]",
            name,
            check.penalty,
            check.max_score
        );
    }
}

#[test]
fn safe_mature_token_scores_high() {
    let mut record = base_record(73);
    record.statistics.holder_count = 1200;
    record.statistics.dev_holdings = 0.01;
    record.statistics.top10_concentration = 0.22;
    record.statistics.largest_holder_pct = 0.08;
    record.price_data.buys_24h = 480;
    record.price_data.sells_24h = 520;
    record.price_data.trades_24h = 1000;
    record.price_data.liquidity = 80_000.0;
    record.price_data.market_cap = 500_000.0;
    record.socials.twitter = Some("https://x.com/solid".to_string());
    record.socials.website = Some("https://solid.example".to_string());

    let analysis = score(&record);
    assert_universal_invariants(&analysis);

    assert!(analysis.score >= 85, "score was {}", analysis.score);
    assert!(analysis.passed);
    assert_eq!(analysis.danger_score.category, DangerCategory::Safe);

    for expected in [
        "Token age > 24 hours",
        "Strong holder base",
        "Balanced trading activity",
        "Healthy liquidity ratio",
    ] {
        assert!(
            analysis.positive_signals.iter().any(|s| s == expected),
            "missing positive signal: {}",
            expected
        );
    }
}

#[test]
fn rug_in_progress_is_flagged() {
    let mut record = base_record(4);
    record.statistics.holder_count = 60;
    record.statistics.top10_concentration = 0.78;
    record.statistics.largest_holder_pct = 0.42;
    record.price_data.buys_24h = 40;
    record.price_data.sells_24h = 260;
    record.price_data.trades_24h = 300;
    record.price_data.liquidity = 1_200.0;
    record.price_data.market_cap = 150_000.0;

    let analysis = score(&record);
    assert_universal_invariants(&analysis);

    assert!(analysis.flags.iter().any(|f| f == "🚨 RUG IN PROGRESS"));
    assert!(analysis.composite_risks.rug_in_progress);
    assert!(analysis.composite_risks.coordinated_dump);
    assert!(matches!(
        analysis.danger_score.category,
        DangerCategory::HighRisk | DangerCategory::Extreme
    ));
    assert!(!analysis.passed);
    // The rug flag outranks everything in the primary-risk list.
    assert_eq!(
        analysis.danger_score.primary_risks.first().map(String::as_str),
        Some("🚨 RUG IN PROGRESS")
    );
}

#[test]
fn pump_setup_detected() {
    let mut record = base_record(2);
    record.statistics.holder_count = 45;
    record.price_data.buys_24h = 900;
    record.price_data.sells_24h = 120;
    record.price_data.trades_24h = 1020;
    record.price_data.liquidity = 8_000.0;
    record.price_data.market_cap = 40_000.0;

    let analysis = score(&record);
    assert_universal_invariants(&analysis);

    assert!(analysis.composite_risks.pump_setup);
    assert!(
        analysis.danger_score.overall >= 60,
        "danger was {}",
        analysis.danger_score.overall
    );
}

#[test]
fn serial_scammer_caps_creator_penalty() {
    let mut record = base_record(48);
    record.price_data.buys_24h = 50;
    record.price_data.sells_24h = 50;
    record.price_data.trades_24h = 100;
    record.creator_history.token_count = 35;
    record.creator_history.rugged_tokens = 10;
    record.creator_history.is_serial_creator = true;
    record.creator_history.recent_tokens = (0..12)
        .map(|i| CreatedToken {
            mint: format!("Mint{:040}", i),
            name: format!("throwaway-{}", i),
            created_at: NOW_MS - (i as i64) * 86_400_000,
        })
        .collect();

    let analysis = score(&record);
    assert_universal_invariants(&analysis);

    let creator_check = &analysis.breakdown["creatorHistory"];
    assert_eq!(creator_check.penalty, 35.0);
    assert!(analysis
        .flags
        .iter()
        .any(|f| f.contains("SERIAL SCAMMER")));
}

#[test]
fn unknown_holder_count_never_penalizes_holders() {
    let mut record = base_record(48);
    record.statistics.holder_count = -1;
    record.statistics.top10_concentration = 0.0;
    record.price_data.buys_24h = 50;
    record.price_data.sells_24h = 50;
    record.price_data.trades_24h = 100;

    let analysis = score(&record);
    assert_universal_invariants(&analysis);

    let holder_check = &analysis.breakdown["holderDistribution"];
    assert_eq!(holder_check.penalty, 0.0);
    assert!(!analysis
        .flags
        .iter()
        .any(|f| f.contains("Low holders") || f.contains("Moderate holders")));
    // Unknown holders downgrade confidence, but only to medium.
    assert!(matches!(
        analysis.danger_score.confidence,
        Confidence::Medium | Confidence::High
    ));
    assert_eq!(analysis.danger_score.confidence, Confidence::Medium);
}

#[test]
fn zero_liquidity_with_market_cap_hits_lowest_band_once() {
    let mut record = base_record(48);
    record.price_data.liquidity = 0.0;
    record.price_data.market_cap = 100_000.0;

    let analysis = score(&record);
    assert_universal_invariants(&analysis);

    let liquidity_check = &analysis.breakdown["liquidityHealth"];
    // Lowest ratio band plus the absolute floor, clipped at the cap.
    assert_eq!(liquidity_check.penalty, 20.0);
}

#[test]
fn zero_market_cap_skips_liquidity_checks() {
    let mut record = base_record(48);
    record.price_data.liquidity = 0.0;
    record.price_data.market_cap = 0.0;
    record.price_data.volume_24h = 50_000.0;

    let analysis = score(&record);
    let liquidity_check = &analysis.breakdown["liquidityHealth"];
    assert_eq!(liquidity_check.penalty, 0.0);
}

#[test]
fn min_score_zero_and_101_boundaries() {
    let record = base_record(48);

    let mut config = ScoringConfig::default();
    config.min_score = 0;
    assert!(scoring::score(&record, &config).passed);

    config.min_score = 101;
    assert!(!scoring::score(&record, &config).passed);
}

#[test]
fn sentinel_record_scores_finite_and_low_confidence() {
    // Every provider failed: zeroed fields, unknown holders, no security.
    let event = MigrationEvent::manual("A8C3xuqscfmyLrte3VmTqrAq8kgMASius9AFNANwpump", None);
    let mut record = TokenRecord::skeleton(&event);
    record.analyzed_at = NOW_MS;
    record.migration_timestamp = NOW_MS;

    let analysis = score(&record);
    assert_universal_invariants(&analysis);
    assert!(analysis.flags.iter().any(|f| f == "Security data unavailable"));
    assert_eq!(analysis.danger_score.confidence, Confidence::Low);
}

#[test]
fn rescoring_a_serialized_record_is_identical() {
    let mut record = base_record(4);
    record.statistics.holder_count = 60;
    record.statistics.top10_concentration = 0.78;
    record.statistics.largest_holder_pct = 0.42;
    record.price_data.buys_24h = 40;
    record.price_data.sells_24h = 260;
    record.price_data.trades_24h = 300;
    record.price_data.liquidity = 1_200.0;
    record.price_data.market_cap = 150_000.0;
    record.analysis = score(&record);

    let json = serde_json::to_string(&record).expect("record serializes");
    let decoded: TokenRecord = serde_json::from_str(&json).expect("record deserializes");
    let rescored = score(&decoded);

    assert_eq!(rescored.score, record.analysis.score);
    assert_eq!(rescored.flags, record.analysis.flags);
    assert_eq!(
        rescored.danger_score.overall,
        record.analysis.danger_score.overall
    );
    assert_eq!(rescored.composite_risks, record.analysis.composite_risks);
}
