//! Upstream migration stream.
//!
//! One persistent WebSocket subscription to the pump.fun event feed. Frames
//! with `txType == "migration"` become [`MigrationEvent`]s and are fanned out
//! over a broadcast bus; buy/sell frames are only counted. The connection
//! loop reconnects with linear backoff (5s × attempts, capped at 25s) and
//! cools down for 60s after ten consecutive failures.

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use serde_json::json;
use tokio::sync::{broadcast, Notify};
use tokio_tungstenite::{connect_async, tungstenite::Message};

use crate::logger::{self, log, LogTag};
use crate::sol_price::SolPriceOracle;
use crate::tokens::types::MigrationEvent;

const RECONNECT_BASE_DELAY: Duration = Duration::from_secs(5);
const RECONNECT_MAX_MULTIPLIER: u32 = 5;
const MAX_ATTEMPTS: u32 = 10;
const COOLDOWN: Duration = Duration::from_secs(60);
const PING_INTERVAL: Duration = Duration::from_secs(30);
const BUS_CAPACITY: usize = 256;

/// Everything the upstream connection reports to subscribers.
#[derive(Debug, Clone)]
pub enum UpstreamEvent {
    Migration(MigrationEvent),
    Connected,
    Disconnected,
}

/// Raw frame from the upstream feed.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StreamFrame {
    tx_type: Option<String>,
    signature: Option<String>,
    mint: Option<String>,
    name: Option<String>,
    symbol: Option<String>,
    uri: Option<String>,
    pool: Option<String>,
    market_cap_sol: Option<f64>,
    creator: Option<String>,
}

pub struct MigrationSource {
    url: String,
    sol_price: Arc<SolPriceOracle>,
    sender: broadcast::Sender<UpstreamEvent>,
    running: AtomicBool,
    connected: AtomicBool,
    stop: Notify,
    trade_frames_seen: AtomicU64,
}

impl MigrationSource {
    pub fn new(url: String, sol_price: Arc<SolPriceOracle>) -> Arc<Self> {
        let (sender, _) = broadcast::channel(BUS_CAPACITY);
        Arc::new(Self {
            url,
            sol_price,
            sender,
            running: AtomicBool::new(false),
            connected: AtomicBool::new(false),
            stop: Notify::new(),
            trade_frames_seen: AtomicU64::new(0),
        })
    }

    pub fn subscribe(&self) -> broadcast::Receiver<UpstreamEvent> {
        self.sender.subscribe()
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Relaxed)
    }

    /// Spawn the connection loop. Idempotent.
    pub fn start(self: &Arc<Self>) {
        if self.running.swap(true, Ordering::SeqCst) {
            return;
        }
        let source = self.clone();
        tokio::spawn(async move {
            source.connection_loop().await;
        });
    }

    /// Request shutdown; the loop exits at its next await point.
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
        self.stop.notify_waiters();
    }

    async fn connection_loop(self: Arc<Self>) {
        let attempts = AtomicU32::new(0);

        while self.running.load(Ordering::SeqCst) {
            log(LogTag::Migration, "CONNECT", &format!("Dialing {}", self.url));

            match self.run_connection(&attempts).await {
                Ok(()) => {
                    // Clean close still means we lost the stream.
                    attempts.fetch_add(1, Ordering::Relaxed);
                }
                Err(e) => {
                    attempts.fetch_add(1, Ordering::Relaxed);
                    logger::warning(LogTag::Migration, &format!("Connection failed: {}", e));
                }
            }

            self.set_connected(false);

            if !self.running.load(Ordering::SeqCst) {
                break;
            }

            let current = attempts.load(Ordering::Relaxed);
            if current >= MAX_ATTEMPTS {
                logger::warning(
                    LogTag::Migration,
                    &format!("{} consecutive failures, cooling down 60s", current),
                );
                if self.wait_or_stop(COOLDOWN).await {
                    break;
                }
                attempts.store(0, Ordering::Relaxed);
                continue;
            }

            let delay = RECONNECT_BASE_DELAY * current.min(RECONNECT_MAX_MULTIPLIER).max(1);
            logger::info(
                LogTag::Migration,
                &format!("Reconnecting in {}s (attempt {})", delay.as_secs(), current),
            );
            if self.wait_or_stop(delay).await {
                break;
            }
        }

        self.set_connected(false);
        log(LogTag::Migration, "STOPPED", "Migration source loop exited");
    }

    /// Returns true when stop was requested during the wait.
    async fn wait_or_stop(&self, delay: Duration) -> bool {
        tokio::select! {
            _ = tokio::time::sleep(delay) => !self.running.load(Ordering::SeqCst),
            _ = self.stop.notified() => true,
        }
    }

    async fn run_connection(&self, attempts: &AtomicU32) -> Result<(), String> {
        let (stream, _) = connect_async(&self.url)
            .await
            .map_err(|e| format!("dial failed: {}", e))?;
        let (mut write, mut read) = stream.split();

        // Subscribe to migration events before anything else.
        let subscribe_frame = json!({"method": "subscribeMigration"}).to_string();
        write
            .send(Message::Text(subscribe_frame))
            .await
            .map_err(|e| format!("subscribe failed: {}", e))?;

        attempts.store(0, Ordering::Relaxed);
        self.set_connected(true);
        log(LogTag::Migration, "OPEN", "Subscribed to migration stream");

        let mut ping = tokio::time::interval(PING_INTERVAL);
        ping.tick().await; // First tick fires immediately; skip it.

        loop {
            tokio::select! {
                _ = self.stop.notified() => {
                    let _ = write.send(Message::Close(None)).await;
                    return Ok(());
                }
                _ = ping.tick() => {
                    write
                        .send(Message::Ping(Vec::new()))
                        .await
                        .map_err(|e| format!("ping failed: {}", e))?;
                }
                frame = read.next() => {
                    match frame {
                        Some(Ok(Message::Text(text))) => self.handle_text(&text).await,
                        Some(Ok(Message::Ping(payload))) => {
                            let _ = write.send(Message::Pong(payload)).await;
                        }
                        Some(Ok(Message::Close(_))) | None => {
                            return Err("stream closed by upstream".to_string());
                        }
                        Some(Ok(_)) => {}
                        Some(Err(e)) => return Err(format!("read error: {}", e)),
                    }
                }
            }
        }
    }

    async fn handle_text(&self, text: &str) {
        let frame: StreamFrame = match serde_json::from_str(text) {
            Ok(frame) => frame,
            Err(e) => {
                let snippet: String = text.chars().take(120).collect();
                logger::debug(
                    LogTag::Migration,
                    &format!("Unparseable frame ({}): {}", e, snippet),
                );
                return;
            }
        };

        match frame.tx_type.as_deref() {
            Some("migration") => {
                if let Some(event) = self.build_event(frame).await {
                    log(
                        LogTag::Migration,
                        "MIGRATION",
                        &format!("{} ({})", event.mint, event.symbol),
                    );
                    // Send failures just mean nobody is listening yet.
                    let _ = self.sender.send(UpstreamEvent::Migration(event));
                }
            }
            Some("buy") | Some("sell") => {
                let seen = self.trade_frames_seen.fetch_add(1, Ordering::Relaxed) + 1;
                if seen % 1000 == 0 {
                    logger::debug(
                        LogTag::Migration,
                        &format!("{} trade frames observed", seen),
                    );
                }
            }
            _ => {}
        }
    }

    async fn build_event(&self, frame: StreamFrame) -> Option<MigrationEvent> {
        let mint = frame.mint?;

        // Market cap arrives denominated in SOL; convert only when the
        // oracle actually has a price. No price means no market cap.
        let market_cap = match frame.market_cap_sol {
            Some(sol) if sol > 0.0 => self.sol_price.sol_to_usd(sol).await,
            _ => None,
        };

        Some(MigrationEvent {
            mint,
            signature: frame.signature.unwrap_or_default(),
            name: frame.name.unwrap_or_default(),
            symbol: frame.symbol.unwrap_or_default(),
            uri: frame.uri,
            pool: frame.pool,
            timestamp: Utc::now().timestamp_millis(),
            market_cap,
            liquidity: None,
            creator: frame.creator,
        })
    }

    fn set_connected(&self, connected: bool) {
        let was = self.connected.swap(connected, Ordering::Relaxed);
        if was != connected {
            let _ = self.sender.send(if connected {
                UpstreamEvent::Connected
            } else {
                UpstreamEvent::Disconnected
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn migration_frame_becomes_event() {
        let oracle = Arc::new(SolPriceOracle::with_cached_price(200.0));
        let source = MigrationSource::new("ws://unused".to_string(), oracle);

        let frame: StreamFrame = serde_json::from_str(
            r#"{
                "txType": "migration",
                "signature": "SIG",
                "mint": "MINT",
                "name": "Token",
                "symbol": "TKN",
                "pool": "POOL",
                "marketCapSol": 500.0,
                "creator": "CREATOR"
            }"#,
        )
        .unwrap();

        let event = source.build_event(frame).await.unwrap();
        assert_eq!(event.mint, "MINT");
        assert_eq!(event.market_cap, Some(100_000.0));
        assert_eq!(event.creator.as_deref(), Some("CREATOR"));
        assert!(event.timestamp > 0);
    }

    #[tokio::test]
    async fn missing_mint_is_dropped() {
        let oracle = Arc::new(SolPriceOracle::with_cached_price(200.0));
        let source = MigrationSource::new("ws://unused".to_string(), oracle);
        let frame: StreamFrame =
            serde_json::from_str(r#"{"txType": "migration", "name": "x"}"#).unwrap();
        assert!(source.build_event(frame).await.is_none());
    }
}
