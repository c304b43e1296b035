use crate::client::SessionEvent;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

/// Fixed-period reconnect timer.
///
/// While armed it sends a [`SessionEvent::RetryTick`] every period, starting
/// one period after arming. At most one tick loop runs at a time.
pub struct RetryTimer {
    period: Duration,
    task: Option<JoinHandle<()>>,
}

impl RetryTimer {
    pub fn new(period: Duration) -> Self {
        Self { period, task: None }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn is_armed(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Start ticking. Returns `false` and leaves the running loop alone if
    /// the timer is already armed.
    pub fn arm(&mut self, epoch: u64, events: mpsc::Sender<SessionEvent>) -> bool {
        if self.is_armed() {
            return false;
        }

        let period = self.period;
        self.task = Some(tokio::spawn(async move {
            let mut ticker = time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                tracing::debug!("Retry timer fired (epoch {})", epoch);
                if events.send(SessionEvent::RetryTick { epoch }).await.is_err() {
                    break;
                }
            }
        }));
        true
    }

    /// Stop ticking. Returns whether a loop was running.
    pub fn cancel(&mut self) -> bool {
        match self.task.take() {
            Some(task) => {
                task.abort();
                true
            }
            None => false,
        }
    }
}

impl Drop for RetryTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}
