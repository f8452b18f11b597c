use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::state::Event;

/// Quiet-period timer for the search box.
///
/// At most one timer is armed at a time. Arming replaces the previous timer;
/// when a timer fires it reports the generation it was armed for, and the
/// state machine ignores generations that are no longer current, so a timer
/// that slips past `cancel` still cannot trigger a fetch for old text.
pub struct QuietTimer {
    /// How long input must be unchanged before it is committed
    period: Duration,
    armed: Option<JoinHandle<()>>,
    fired_tx: mpsc::UnboundedSender<Event>,
}

impl QuietTimer {
    pub fn new(period: Duration, fired_tx: mpsc::UnboundedSender<Event>) -> Self {
        Self {
            period,
            armed: None,
            fired_tx,
        }
    }

    /// Start (or restart) the quiet period for `generation`
    pub fn arm(&mut self, generation: u64) {
        self.cancel();

        let period = self.period;
        let tx = self.fired_tx.clone();
        self.armed = Some(tokio::spawn(async move {
            tokio::time::sleep(period).await;
            if tx.send(Event::QuietPeriodElapsed { generation }).is_err() {
                tracing::trace!(generation, "coordinator gone before quiet period elapsed");
            }
        }));
    }

    /// Drop the armed timer, if any
    pub fn cancel(&mut self) {
        if let Some(handle) = self.armed.take() {
            handle.abort();
        }
    }

    pub fn is_armed(&self) -> bool {
        self.armed.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for QuietTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}
