//! Depletion Alert
//!
//! A single notification slot. Showing a message replaces whatever is
//! there and restarts the dismiss timer; the slot clears itself once the
//! timer runs out unless a newer message took its place.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

pub const DEFAULT_ALERT_DURATION: Duration = Duration::from_millis(4000);

/// The message currently on screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    /// Increments with every `show`
    pub seq: u64,
    pub message: String,
}

#[derive(Default)]
struct Slot {
    seq: u64,
    timer: Option<JoinHandle<()>>,
}

struct Inner {
    tx: watch::Sender<Option<Alert>>,
    dismiss_after: Duration,
    slot: Mutex<Slot>,
}

impl Inner {
    fn slot(&self) -> MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[derive(Clone)]
pub struct AlertNotifier {
    inner: Arc<Inner>,
}

impl AlertNotifier {
    pub fn new(dismiss_after: Duration) -> Self {
        let (tx, _rx) = watch::channel(None);
        Self {
            inner: Arc::new(Inner {
                tx,
                dismiss_after,
                slot: Mutex::new(Slot::default()),
            }),
        }
    }

    /// Put `message` in the slot and (re)start the dismiss timer
    pub fn show(&self, message: impl Into<String>) -> u64 {
        let message = message.into();
        log::warn!("Alert: {}", message);

        let mut slot = self.inner.slot();
        if let Some(timer) = slot.timer.take() {
            timer.abort();
        }
        slot.seq += 1;
        let seq = slot.seq;
        self.inner.tx.send_replace(Some(Alert { seq, message }));

        let inner = Arc::clone(&self.inner);
        slot.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(inner.dismiss_after).await;
            inner.tx.send_if_modified(|current| match current {
                Some(alert) if alert.seq == seq => {
                    *current = None;
                    true
                }
                _ => false,
            });
        }));
        seq
    }

    pub fn dismiss(&self) {
        let mut slot = self.inner.slot();
        if let Some(timer) = slot.timer.take() {
            timer.abort();
        }
        self.inner.tx.send_if_modified(|current| current.take().is_some());
    }

    pub fn current(&self) -> Option<Alert> {
        self.inner.tx.borrow().clone()
    }

    /// Receive every change to the slot
    pub fn subscribe(&self) -> watch::Receiver<Option<Alert>> {
        self.inner.tx.subscribe()
    }
}

impl Default for AlertNotifier {
    fn default() -> Self {
        Self::new(DEFAULT_ALERT_DURATION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(alerts: &AlertNotifier) -> Option<String> {
        alerts.current().map(|a| a.message)
    }

    #[tokio::test(start_paused = true)]
    async fn test_alert_clears_after_duration() {
        let alerts = AlertNotifier::default();
        alerts.show("Vaskemiddel er tom (0%).");
        assert_eq!(message(&alerts).as_deref(), Some("Vaskemiddel er tom (0%)."));

        tokio::time::sleep(Duration::from_millis(3999)).await;
        assert!(alerts.current().is_some());

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert!(alerts.current().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_newer_alert_restarts_timer() {
        let alerts = AlertNotifier::default();
        alerts.show("Kaffe er tom (0%).");
        tokio::time::sleep(Duration::from_millis(3000)).await;

        let seq = alerts.show("Vaskemiddel er tom (0%).");
        tokio::time::sleep(Duration::from_millis(1500)).await;
        let current = alerts.current().expect("second alert still visible");
        assert_eq!(current.seq, seq);
        assert_eq!(current.message, "Vaskemiddel er tom (0%).");

        tokio::time::sleep(Duration::from_millis(2600)).await;
        assert!(alerts.current().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_dismiss_and_subscribe() {
        let alerts = AlertNotifier::new(Duration::from_millis(100));
        let mut rx = alerts.subscribe();

        alerts.show("Dopapir er tom (0%).");
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().as_ref().map(|a| a.seq), Some(1));

        alerts.dismiss();
        rx.changed().await.unwrap();
        assert!(rx.borrow_and_update().is_none());

        // Dismissing an empty slot is not a change
        alerts.dismiss();
        assert!(!rx.has_changed().unwrap());
    }
}
