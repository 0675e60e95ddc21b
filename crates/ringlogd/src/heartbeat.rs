//! Periodic timestamp records.
//!
//! While the server runs, a `timestamp:<time>\n` record is committed at a
//! fixed interval. It goes through [`LogStore::append_record`], never the
//! write accumulator, so it cannot splice into a client's partially
//! received record; it counts against capacity like any other record.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use chrono::{DateTime, Local};
use ringlog_core::LogStore;
use tokio::sync::broadcast;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error};

pub const TIMESTAMP_PREFIX: &str = "timestamp:";

/// Renders one timestamp record, RFC 2822 style.
pub fn format_timestamp(now: DateTime<Local>) -> String {
    format!("{TIMESTAMP_PREFIX}{}\n", now.format("%a, %d %b %Y %H:%M:%S %z"))
}

/// Commits a timestamp record every `interval_secs` seconds until shutdown.
///
/// The first record lands one full interval after startup.
pub async fn run(store: Arc<LogStore>, interval_secs: u64, mut shutdown: broadcast::Receiver<()>) {
    let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately; swallow it.
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = shutdown.recv() => {
                debug!("Heartbeat stopped");
                return;
            }
            _ = ticker.tick() => {
                let mark = format_timestamp(Local::now());
                match store.append_record(Bytes::from(mark)) {
                    Ok(()) => debug!("Recorded timestamp"),
                    Err(e) => error!("Failed to record timestamp: {}", e),
                }
            }
        }
    }
}
