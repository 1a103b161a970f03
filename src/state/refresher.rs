use crate::state::messages::SessionRequest;
use log::debug;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{MissedTickBehavior, interval};

/// Asks the session worker for a poll on a fixed interval while a session runs.
/// The first poll fires immediately so the watermark is set right away.
pub struct PeriodicRefresher {
    session_requests: mpsc::Sender<SessionRequest>,
    period: Duration,
}

impl PeriodicRefresher {
    pub fn new(session_requests: mpsc::Sender<SessionRequest>, period: Duration) -> Self {
        Self { session_requests, period }
    }

    pub async fn run(self) {
        let mut poll_interval = interval(self.period);
        // A slow poll delays the next one instead of bunching them up.
        poll_interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            poll_interval.tick().await;
            if self.session_requests.send(SessionRequest::Poll).await.is_err() {
                debug!("session worker gone, refresher stopping");
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn polls_immediately_then_every_period() {
        let (tx, mut rx) = mpsc::channel(8);
        let task = tokio::spawn(PeriodicRefresher::new(tx, Duration::from_secs(480)).run());

        assert!(matches!(rx.recv().await, Some(SessionRequest::Poll)));
        tokio::time::advance(Duration::from_secs(479)).await;
        assert!(rx.try_recv().is_err());
        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(matches!(rx.recv().await, Some(SessionRequest::Poll)));

        task.abort();
    }

    #[tokio::test]
    async fn stops_when_the_worker_is_gone() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        PeriodicRefresher::new(tx, Duration::from_millis(5)).run().await;
    }
}
