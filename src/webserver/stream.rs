//! SSE gateway.
//!
//! One long-lived event stream per subscriber. The handshake replays the
//! bounded history (`initial`), then live monitor events are forwarded in
//! bus order with a 30-second heartbeat. A subscriber that disconnects just
//! drops its channel; no shared state needs cleanup.

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::response::sse::{Event, Sse};
use chrono::Utc;
use futures_util::stream::Stream;
use serde_json::json;
use tokio::sync::mpsc;

use crate::logger::{self, log, LogTag};
use crate::monitor::bus::MonitorEvent;

use super::AppState;

const INITIAL_SNAPSHOT_LIMIT: usize = 30;
const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);
/// Per-subscriber buffer; a consumer further behind than this is dropped.
const SUBSCRIBER_BUFFER: usize = 64;

/// `GET /stream`.
pub async fn stream_handler(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let (tx, mut rx) = mpsc::channel::<Result<Event, Infallible>>(SUBSCRIBER_BUFFER);

    tokio::spawn(subscriber_task(state, tx));

    let stream = futures_util::stream::poll_fn(move |cx| rx.poll_recv(cx));
    Sse::new(stream)
}

/// Drives one subscriber: handshake, replay, live forwarding, heartbeat.
async fn subscriber_task(state: Arc<AppState>, tx: mpsc::Sender<Result<Event, Infallible>>) {
    let monitor = &state.monitor;
    log(LogTag::Stream, "CONNECT", "SSE subscriber connected");

    // Subscribe before snapshotting so no live event can fall between the
    // snapshot and the first forwarded event.
    let mut bus = monitor.bus().subscribe();

    let status = if monitor.is_upstream_connected() {
        "connected"
    } else {
        "connecting"
    };
    if !send(
        &tx,
        "connected",
        json!({"status": status, "timestamp": Utc::now().timestamp_millis()}),
    )
    .await
    {
        return;
    }

    if !monitor.is_running() {
        monitor.start();
    }

    let mut awaiting_history = !monitor.is_initial_load_complete();
    if !awaiting_history {
        if !send_initial(monitor, &tx).await {
            return;
        }
    }

    let mut heartbeat = tokio::time::interval(HEARTBEAT_INTERVAL);
    heartbeat.tick().await; // Immediate first tick is not a heartbeat.

    loop {
        tokio::select! {
            _ = heartbeat.tick() => {
                let payload = json!({
                    "timestamp": Utc::now().timestamp_millis(),
                    "stats": monitor.stats(),
                });
                if !send(&tx, "heartbeat", payload).await {
                    break;
                }
            }
            event = bus.recv() => {
                match event {
                    Ok(event) => {
                        if !forward(monitor, &tx, event, &mut awaiting_history).await {
                            break;
                        }
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(missed)) => {
                        logger::warning(
                            LogTag::Stream,
                            &format!("Subscriber lagged, {} events dropped", missed),
                        );
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }

    log(LogTag::Stream, "DISCONNECT", "SSE subscriber closed");
}

/// Map one bus event onto the wire. Returns false when the client is gone.
async fn forward(
    monitor: &crate::monitor::TokenMonitor,
    tx: &mpsc::Sender<Result<Event, Infallible>>,
    event: MonitorEvent,
    awaiting_history: &mut bool,
) -> bool {
    match event {
        MonitorEvent::LoadingHistory { count } => {
            send(
                tx,
                "loading",
                json!({"status": "loading_history", "count": count}),
            )
            .await
        }
        MonitorEvent::HistoryLoaded { count } => {
            if *awaiting_history {
                *awaiting_history = false;
                if !send_snapshot(monitor, tx).await {
                    return false;
                }
            }
            send(
                tx,
                "loaded",
                json!({"status": "history_loaded", "count": count}),
            )
            .await
        }
        MonitorEvent::TokenPassed(record) => {
            send(tx, "token", json!({"token": record, "type": "passed"})).await
        }
        MonitorEvent::TokenFiltered(record) => {
            send(tx, "token", json!({"token": record, "type": "filtered"})).await
        }
        MonitorEvent::TokenAnalyzed(_) => true,
        MonitorEvent::Connected => send(tx, "status", json!({"status": "connected"})).await,
        MonitorEvent::Disconnected => send(tx, "status", json!({"status": "disconnected"})).await,
        MonitorEvent::Error(_) | MonitorEvent::Stopped => true,
    }
}

/// `initial` snapshot followed by `loaded`.
async fn send_initial(
    monitor: &crate::monitor::TokenMonitor,
    tx: &mpsc::Sender<Result<Event, Infallible>>,
) -> bool {
    if !send_snapshot(monitor, tx).await {
        return false;
    }
    let count = monitor.history_snapshot(usize::MAX, None).len();
    send(
        tx,
        "loaded",
        json!({"status": "history_loaded", "count": count}),
    )
    .await
}

async fn send_snapshot(
    monitor: &crate::monitor::TokenMonitor,
    tx: &mpsc::Sender<Result<Event, Infallible>>,
) -> bool {
    let tokens = monitor.history_snapshot(INITIAL_SNAPSHOT_LIMIT, None);
    send(
        tx,
        "initial",
        json!({"tokens": tokens, "stats": monitor.stats()}),
    )
    .await
}

/// Serialize and enqueue one SSE event. Returns false when the subscriber
/// has disconnected.
async fn send(
    tx: &mpsc::Sender<Result<Event, Infallible>>,
    name: &str,
    payload: serde_json::Value,
) -> bool {
    let event = Event::default().event(name).data(payload.to_string());
    tx.send(Ok(event)).await.is_ok()
}
