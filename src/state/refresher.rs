use crate::state::messages::IngestRequest;
use chrono::Local;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{MissedTickBehavior, interval};

/// Periodic scoreboard rescan for `watch` mode.
/// Always asks for the local calendar day, so it rolls over at midnight.
pub struct PeriodicRefresher {
    requests: mpsc::Sender<IngestRequest>,
    every: Duration,
}

impl PeriodicRefresher {
    pub fn new(requests: mpsc::Sender<IngestRequest>, every: Duration) -> Self {
        Self { requests, every: every.max(Duration::from_secs(1)) }
    }

    pub async fn run(self) {
        let mut ticker = interval(self.every);
        // A scan that overruns pushes the next one back instead of bunching them up.
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            // First tick completes immediately, so the initial scan happens at startup.
            ticker.tick().await;
            let date = Local::now().date_naive();
            if self.requests.send(IngestRequest::ScanDate { date }).await.is_err() {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn sends_a_scan_per_tick() {
        let (tx, mut rx) = mpsc::channel(8);
        let task = tokio::spawn(PeriodicRefresher::new(tx, Duration::from_secs(30)).run());

        let first = rx.recv().await;
        assert!(matches!(first, Some(IngestRequest::ScanDate { .. })));
        tokio::time::advance(Duration::from_secs(30)).await;
        assert!(matches!(rx.recv().await, Some(IngestRequest::ScanDate { .. })));

        drop(rx);
        tokio::time::advance(Duration::from_secs(30)).await;
        task.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn slow_consumer_does_not_get_a_burst_of_scans() {
        let (tx, mut rx) = mpsc::channel(8);
        let task = tokio::spawn(PeriodicRefresher::new(tx, Duration::from_secs(30)).run());
        assert!(rx.recv().await.is_some());

        // Three intervals go by without the refresher being polled.
        tokio::time::advance(Duration::from_secs(95)).await;
        assert!(rx.recv().await.is_some());
        tokio::task::yield_now().await;
        assert!(rx.try_recv().is_err(), "missed ticks were replayed");

        task.abort();
    }
}
