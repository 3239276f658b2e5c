//! Token monitor: lifecycle owner of the ingest pipeline.
//!
//! One logical writer over the bounded in-memory history and the stats
//! counters. `start()` primes the SOL price cache, backfills recent
//! graduations in fast mode, then consumes the live migration stream in
//! full mode. Every result is published on the [`bus`] for the SSE gateway.

pub mod bus;

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use parking_lot::RwLock;
use serde::Serialize;
use tokio::sync::Notify;

use crate::constants::{
    BACKFILL_BATCH_DELAY_MS, BACKFILL_BATCH_SIZE, BACKFILL_LIMIT, BACKFILL_TOKEN_TIMEOUT_SECS,
    MAX_HISTORY,
};
use crate::apis::graduated::GraduatedToken;
use crate::enrichment::{self, EnrichContext, EnrichMode};
use crate::logger::{self, log, LogTag};
use crate::migrations::{MigrationSource, UpstreamEvent};
use crate::tokens::types::{MigrationEvent, TokenRecord};

use bus::{EventBus, MonitorEvent};

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct MonitorStats {
    pub monitored: u64,
    pub passed: u64,
    pub filtered: u64,
}

#[derive(Default)]
struct MonitorState {
    /// Newest first; at most [`MAX_HISTORY`] entries, one per mint.
    history: VecDeque<Arc<TokenRecord>>,
    stats: MonitorStats,
}

pub struct TokenMonitor {
    ctx: Arc<EnrichContext>,
    source: Arc<MigrationSource>,
    state: RwLock<MonitorState>,
    bus: EventBus,
    running: AtomicBool,
    initial_load_complete: AtomicBool,
    stop: Notify,
    /// Enrichments currently executing; drained on shutdown.
    in_flight: AtomicU32,
}

impl TokenMonitor {
    pub fn new(ctx: Arc<EnrichContext>, source: Arc<MigrationSource>) -> Arc<Self> {
        Arc::new(Self {
            ctx,
            source,
            state: RwLock::new(MonitorState::default()),
            bus: EventBus::new(),
            running: AtomicBool::new(false),
            initial_load_complete: AtomicBool::new(false),
            stop: Notify::new(),
            in_flight: AtomicU32::new(0),
        })
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn is_initial_load_complete(&self) -> bool {
        self.initial_load_complete.load(Ordering::SeqCst)
    }

    pub fn is_upstream_connected(&self) -> bool {
        self.source.is_connected()
    }

    pub fn stats(&self) -> MonitorStats {
        self.state.read().stats
    }

    pub fn in_flight(&self) -> u32 {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Newest-first history snapshot (shallow copies via `Arc`).
    pub fn history_snapshot(
        &self,
        limit: usize,
        passed_filter: Option<bool>,
    ) -> Vec<Arc<TokenRecord>> {
        let state = self.state.read();
        state
            .history
            .iter()
            .filter(|record| match passed_filter {
                Some(expected) => record.analysis.passed == expected,
                None => true,
            })
            .take(limit)
            .cloned()
            .collect()
    }

    pub fn get(&self, mint: &str) -> Option<Arc<TokenRecord>> {
        let state = self.state.read();
        state
            .history
            .iter()
            .find(|record| record.address == mint)
            .cloned()
    }

    /// Start backfill and the live subscription. Idempotent.
    pub fn start(self: &Arc<Self>) {
        if self.running.swap(true, Ordering::SeqCst) {
            return;
        }
        let monitor = self.clone();
        tokio::spawn(async move {
            monitor.run().await;
        });
    }

    /// Stop the live loop and disconnect upstream.
    pub fn stop(&self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            return;
        }
        self.source.stop();
        self.stop.notify_waiters();
        self.bus.publish(MonitorEvent::Stopped);
        log(LogTag::Monitor, "STOP", "Monitor stopped");
    }

    async fn run(self: Arc<Self>) {
        log(LogTag::Monitor, "START", "Monitor starting");

        // Prime the SOL price cache so backfill conversions hit it warm.
        let _ = self.ctx.sol_price.get_price_usd().await;

        self.backfill().await;

        if !self.running.load(Ordering::SeqCst) {
            return;
        }
        self.live_loop().await;
    }

    /// One-shot load of recent graduations, batched and throttled.
    async fn backfill(self: &Arc<Self>) {
        let graduated = self.ctx.apis.graduated.list(BACKFILL_LIMIT).await;
        self.bus.publish(MonitorEvent::LoadingHistory {
            count: graduated.len(),
        });
        log(
            LogTag::Monitor,
            "BACKFILL",
            &format!("Loading {} graduated tokens", graduated.len()),
        );

        for batch in graduated.chunks(BACKFILL_BATCH_SIZE) {
            if !self.running.load(Ordering::SeqCst) {
                break;
            }

            let results = futures::future::join_all(batch.iter().map(|token| {
                let monitor = self.clone();
                let event = synthesize_event(token);
                async move {
                    monitor.in_flight.fetch_add(1, Ordering::SeqCst);
                    let result = tokio::time::timeout(
                        Duration::from_secs(BACKFILL_TOKEN_TIMEOUT_SECS),
                        enrichment::enrich(&monitor.ctx, &event, EnrichMode::Fast),
                    )
                    .await;
                    monitor.in_flight.fetch_sub(1, Ordering::SeqCst);
                    (event.mint, result)
                }
            }))
            .await;

            for (mint, result) in results {
                match result {
                    Ok(record) => self.insert_and_emit(record),
                    Err(_) => {
                        logger::warning(
                            LogTag::Monitor,
                            &format!("Backfill enrichment timed out for {}", mint),
                        );
                    }
                }
            }

            tokio::time::sleep(Duration::from_millis(BACKFILL_BATCH_DELAY_MS)).await;
        }

        let count = self.state.read().history.len();
        self.initial_load_complete.store(true, Ordering::SeqCst);
        self.bus.publish(MonitorEvent::HistoryLoaded { count });
        log(
            LogTag::Monitor,
            "BACKFILL",
            &format!("History loaded: {} records", count),
        );
    }

    async fn live_loop(self: &Arc<Self>) {
        self.source.start();
        let mut upstream = self.source.subscribe();

        loop {
            tokio::select! {
                _ = self.stop.notified() => break,
                event = upstream.recv() => {
                    match event {
                        Ok(UpstreamEvent::Migration(event)) => {
                            self.process_live_event(event).await;
                        }
                        Ok(UpstreamEvent::Connected) => {
                            self.bus.publish(MonitorEvent::Connected);
                        }
                        Ok(UpstreamEvent::Disconnected) => {
                            self.bus.publish(MonitorEvent::Disconnected);
                        }
                        Err(tokio::sync::broadcast::error::RecvError::Lagged(missed)) => {
                            logger::warning(
                                LogTag::Monitor,
                                &format!("Upstream bus lagged, {} events missed", missed),
                            );
                        }
                        Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                    }
                }
            }

            if !self.running.load(Ordering::SeqCst) {
                break;
            }
        }
    }

    /// Enrich one live event in an isolated task: a panic inside enrichment
    /// fails that token only, never the monitor loop.
    async fn process_live_event(self: &Arc<Self>, event: MigrationEvent) {
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        let ctx = self.ctx.clone();
        let handle =
            tokio::spawn(async move { enrichment::enrich(&ctx, &event, EnrichMode::Full).await });

        match handle.await {
            Ok(record) => self.insert_and_emit(record),
            Err(e) => {
                logger::error(LogTag::Monitor, &format!("Enrichment task failed: {}", e));
                self.bus
                    .publish(MonitorEvent::Error(format!("enrichment failed: {}", e)));
            }
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }

    /// Analyze a single mint on demand (manual API trigger). The record is
    /// inserted into history and emitted like any live result.
    pub async fn analyze_once(
        self: &Arc<Self>,
        mint: &str,
        creator: Option<String>,
    ) -> Arc<TokenRecord> {
        let event = MigrationEvent::manual(mint, creator);
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        let record = enrichment::enrich(&self.ctx, &event, EnrichMode::Full).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let record = Arc::new(record);
        self.insert_record(record.clone());
        record
    }

    fn insert_and_emit(&self, record: TokenRecord) {
        // A malformed record is dropped silently rather than published.
        let score = record.analysis.score;
        if !(0..=100).contains(&score) || !(0..=100).contains(&record.analysis.danger_score.overall)
        {
            logger::error(
                LogTag::Monitor,
                &format!("Dropping {}: score out of range ({})", record.address, score),
            );
            return;
        }

        let record = Arc::new(record);
        self.insert_record(record.clone());

        self.bus.publish(MonitorEvent::TokenAnalyzed(record.clone()));
        self.bus.publish(MonitorEvent::for_verdict(&record));

        logger::info(
            LogTag::Monitor,
            &format!(
                "{} {} score={} danger={}",
                if record.analysis.passed { "PASS" } else { "FILTER" },
                record.address,
                record.analysis.score,
                record.analysis.danger_score.overall,
            ),
        );
    }

    fn insert_record(&self, record: Arc<TokenRecord>) {
        let mut state = self.state.write();

        // Re-processing a mint replaces the stale record.
        state.history.retain(|r| r.address != record.address);
        state.history.push_front(record.clone());
        while state.history.len() > MAX_HISTORY {
            state.history.pop_back();
        }

        state.stats.monitored += 1;
        if record.analysis.passed {
            state.stats.passed += 1;
        } else {
            state.stats.filtered += 1;
        }
    }

    /// Wait for in-flight enrichments to finish, up to `timeout`.
    pub async fn drain(&self, timeout: Duration) {
        let deadline = tokio::time::Instant::now() + timeout;
        while self.in_flight() > 0 && tokio::time::Instant::now() < deadline {
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
    }
}

fn synthesize_event(token: &GraduatedToken) -> MigrationEvent {
    MigrationEvent {
        mint: token.mint.clone(),
        signature: String::new(),
        name: token.name.clone(),
        symbol: token.symbol.clone(),
        uri: if token.logo.is_empty() {
            None
        } else {
            Some(token.logo.clone())
        },
        pool: token.pair_address.clone(),
        timestamp: token.graduated_at.unwrap_or_else(|| Utc::now().timestamp_millis()),
        market_cap: token.fully_diluted_valuation.filter(|fdv| *fdv > 0.0),
        liquidity: token.liquidity.filter(|l| *l > 0.0),
        creator: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ProviderSettings, ScoringConfig};
    use crate::rpc::{ChainRpcClient, TransactionHistoryClient};
    use crate::sol_price::SolPriceOracle;

    fn offline_monitor() -> Arc<TokenMonitor> {
        let providers = ProviderSettings::default();
        let sol_price = Arc::new(SolPriceOracle::new());
        let ctx = Arc::new(EnrichContext::new(
            Arc::new(crate::apis::ApiManager::new(&providers)),
            Arc::new(ChainRpcClient::new(Vec::new())),
            Arc::new(TransactionHistoryClient::new(None)),
            sol_price.clone(),
            ScoringConfig::default(),
        ));
        let source = MigrationSource::new("ws://unused".to_string(), sol_price);
        TokenMonitor::new(ctx, source)
    }

    fn record(mint: &str, score: i64, passed: bool) -> TokenRecord {
        let event = MigrationEvent::manual(mint, None);
        let mut record = TokenRecord::skeleton(&event);
        record.analysis.score = score;
        record.analysis.passed = passed;
        record
    }

    #[tokio::test]
    async fn history_dedupes_per_mint_and_counts_stats() {
        let monitor = offline_monitor();
        monitor.insert_and_emit(record("MintA111111111111111111111111111111111111111", 80, true));
        monitor.insert_and_emit(record("MintA111111111111111111111111111111111111111", 40, false));
        monitor.insert_and_emit(record("MintB111111111111111111111111111111111111111", 70, true));

        let snapshot = monitor.history_snapshot(100, None);
        assert_eq!(snapshot.len(), 2);
        // The re-processed mint keeps only its fresh version.
        let a = monitor
            .get("MintA111111111111111111111111111111111111111")
            .unwrap();
        assert_eq!(a.analysis.score, 40);

        let stats = monitor.stats();
        assert_eq!(stats.monitored, 3);
        assert_eq!(stats.passed, 2);
        assert_eq!(stats.filtered, 1);
    }

    #[tokio::test]
    async fn history_is_bounded() {
        let monitor = offline_monitor();
        for i in 0..(MAX_HISTORY + 20) {
            monitor.insert_and_emit(record(&format!("Mint{:040}", i), 50, false));
        }
        assert_eq!(monitor.history_snapshot(1000, None).len(), MAX_HISTORY);
        // The newest record survives eviction.
        assert!(monitor
            .get(&format!("Mint{:040}", MAX_HISTORY + 19))
            .is_some());
    }

    #[tokio::test]
    async fn out_of_range_score_is_dropped_silently() {
        let monitor = offline_monitor();
        monitor.insert_and_emit(record("MintBad1111111111111111111111111111111111111", 150, true));

        assert!(monitor.history_snapshot(10, None).is_empty());
        let stats = monitor.stats();
        assert_eq!(stats.monitored, 0);
        assert_eq!(stats.passed + stats.filtered, 0);
    }

    #[tokio::test]
    async fn bus_receives_analyzed_and_verdict_events() {
        let monitor = offline_monitor();
        let mut rx = monitor.bus().subscribe();

        monitor.insert_and_emit(record("MintC111111111111111111111111111111111111111", 90, true));

        match rx.recv().await.unwrap() {
            MonitorEvent::TokenAnalyzed(r) => {
                assert_eq!(r.address, "MintC111111111111111111111111111111111111111")
            }
            other => panic!("expected TokenAnalyzed, got {:?}", other),
        }
        match rx.recv().await.unwrap() {
            MonitorEvent::TokenPassed(r) => assert!(r.analysis.passed),
            other => panic!("expected TokenPassed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn snapshot_filters_by_verdict() {
        let monitor = offline_monitor();
        monitor.insert_and_emit(record("MintD111111111111111111111111111111111111111", 90, true));
        monitor.insert_and_emit(record("MintE111111111111111111111111111111111111111", 10, false));

        assert_eq!(monitor.history_snapshot(10, Some(true)).len(), 1);
        assert_eq!(monitor.history_snapshot(10, Some(false)).len(), 1);
        assert_eq!(monitor.history_snapshot(10, None).len(), 2);
    }

    #[test]
    fn synthesized_event_prefers_fdv() {
        let token = GraduatedToken {
            mint: "MINT".to_string(),
            name: "Token".to_string(),
            symbol: "TKN".to_string(),
            logo: "https://cdn.example/logo.png".to_string(),
            price_usd: Some(0.001),
            liquidity: Some(20_000.0),
            fully_diluted_valuation: Some(900_000.0),
            graduated_at: Some(1_700_000_000_000),
            pair_address: Some("PAIR".to_string()),
        };

        let event = synthesize_event(&token);
        assert_eq!(event.market_cap, Some(900_000.0));
        assert_eq!(event.liquidity, Some(20_000.0));
        assert_eq!(event.timestamp, 1_700_000_000_000);
        assert_eq!(event.uri.as_deref(), Some("https://cdn.example/logo.png"));
        assert!(event.signature.is_empty());
    }
}
