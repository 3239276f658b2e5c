//! Wire-contract tests: the JSON shapes pushed to subscribers.

use pumpwatch::config::ScoringConfig;
use pumpwatch::scoring;
use pumpwatch::tokens::types::{MigrationEvent, SecurityInfo, TokenRecord};

fn scored_record() -> TokenRecord {
    let event = MigrationEvent::manual("A8C3xuqscfmyLrte3VmTqrAq8kgMASius9AFNANwpump", None);
    let mut record = TokenRecord::skeleton(&event);
    record.analyzed_at = 1_700_000_000_000;
    record.migration_timestamp = record.analyzed_at - 3_600_000;
    record.security = Some(SecurityInfo::platform_default());
    record.statistics.holder_count = 250;
    record.price_data.buys_24h = 60;
    record.price_data.sells_24h = 40;
    record.price_data.trades_24h = 100;
    record.price_data.liquidity = 30_000.0;
    record.price_data.market_cap = 200_000.0;
    record.analysis = scoring::score(&record, &ScoringConfig::default());
    record
}

#[test]
fn record_serializes_with_camel_case_fields() {
    let record = scored_record();
    let value = serde_json::to_value(&record).expect("record serializes");

    for pointer in [
        "/address",
        "/metadata/name",
        "/priceData/marketCap",
        "/priceData/marketCapConfidence",
        "/priceData/pairCreatedAt",
        "/statistics/holderCount",
        "/statistics/top10Concentration",
        "/statistics/devHoldings",
        "/security/mintAuthorityRevoked",
        "/security/lpLockPercentage",
        "/launchAnalysis/bundledBuys",
        "/walletFunding/clusteredWallets",
        "/creatorHistory/isSerialCreator",
        "/analysis/passed",
        "/analysis/score",
        "/analysis/dangerScore/overall",
        "/analysis/dangerScore/primaryRisks",
        "/analysis/compositeRisks/rugInProgress",
        "/migrationTimestamp",
        "/analyzedAt",
    ] {
        assert!(
            value.pointer(pointer).is_some(),
            "missing field at {}",
            pointer
        );
    }
}

#[test]
fn danger_category_uses_screaming_case_on_the_wire() {
    let record = scored_record();
    let value = serde_json::to_value(&record.analysis).expect("analysis serializes");
    let category = value
        .pointer("/dangerScore/category")
        .and_then(|v| v.as_str())
        .expect("category present");
    assert!(
        ["SAFE", "LOW_RISK", "MODERATE", "HIGH_RISK", "EXTREME"].contains(&category),
        "unexpected category encoding: {}",
        category
    );

    let confidence = value
        .pointer("/dangerScore/confidence")
        .and_then(|v| v.as_str())
        .expect("confidence present");
    assert!(["high", "medium", "low"].contains(&confidence));
}

#[test]
fn migration_event_accepts_upstream_field_names() {
    let event: MigrationEvent = serde_json::from_str(
        r#"{
            "mint": "A8C3xuqscfmyLrte3VmTqrAq8kgMASius9AFNANwpump",
            "signature": "SIG",
            "name": "Token",
            "symbol": "TKN",
            "uri": "https://meta.example/t.json",
            "pool": "POOL",
            "timestamp": 1700000000000,
            "marketCap": 120000.5,
            "liquidity": 30000.0,
            "creator": "CREATOR"
        }"#,
    )
    .expect("event deserializes");

    assert_eq!(event.market_cap, Some(120_000.5));
    assert_eq!(event.creator.as_deref(), Some("CREATOR"));

    // Backfill events omit most fields.
    let sparse: MigrationEvent = serde_json::from_str(
        r#"{"mint": "A8C3xuqscfmyLrte3VmTqrAq8kgMASius9AFNANwpump", "timestamp": 1}"#,
    )
    .expect("sparse event deserializes");
    assert!(sparse.signature.is_empty());
    assert!(sparse.market_cap.is_none());
}

#[test]
fn breakdown_keys_are_stable() {
    let record = scored_record();
    let expected = [
        "airdropScheme",
        "buyPressure",
        "creatorHistory",
        "developerHoldings",
        "holderDistribution",
        "liquidityHealth",
        "security",
        "snipers",
        "socialSignals",
        "tokenAge",
        "tradeVelocity",
        "volumeManipulation",
        "walletFunding",
        "washTrading",
    ];
    let keys: Vec<&str> = record.analysis.breakdown.keys().map(String::as_str).collect();
    assert_eq!(keys, expected, "breakdown keys changed");
}
