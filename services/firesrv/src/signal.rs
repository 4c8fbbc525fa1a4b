//! Alarm signal bus
//!
//! Edge-triggered alarm signals fan out to every subscriber over a
//! `tokio::sync::broadcast` channel. A [`Subscription`] sees every signal
//! published after it was created, in publish order.

use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, warn};

/// Capacity of the broadcast buffer; signals arrive at most once per poll
///
/// A subscriber that falls further behind loses the oldest signals and
/// resumes with the newest `BUS_CAPACITY`. Start and Clear alternate, so
/// that window always ends on the current alarm state and holds a Clear
/// whenever one is due.
pub const BUS_CAPACITY: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlarmSignal {
    /// Reading crossed the threshold upwards
    Start,
    /// Reading dropped back below the threshold
    Clear,
}

#[derive(Debug, Clone)]
pub struct SignalBus {
    tx: broadcast::Sender<AlarmSignal>,
}

impl Default for SignalBus {
    fn default() -> Self {
        Self::new()
    }
}

impl SignalBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(BUS_CAPACITY);
        Self { tx }
    }

    /// Publish to all current subscribers, returns how many received it
    pub fn publish(&self, signal: AlarmSignal) -> usize {
        match self.tx.send(signal) {
            Ok(receivers) => receivers,
            Err(_) => {
                debug!("{:?} published with no subscribers", signal);
                0
            },
        }
    }

    /// Persistent subscription to every signal published from now on
    pub fn subscribe(&self) -> Subscription {
        Subscription {
            rx: self.tx.subscribe(),
        }
    }
}

pub struct Subscription {
    rx: broadcast::Receiver<AlarmSignal>,
}

impl Subscription {
    /// Next signal, or `None` once every publisher is gone
    ///
    /// Cancel-safe.
    pub async fn recv(&mut self) -> Option<AlarmSignal> {
        loop {
            match self.rx.recv().await {
                Ok(signal) => return Some(signal),
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Signal subscriber lagged, {} signals dropped", skipped);
                },
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// One-shot listener for the next `wanted` signal on this subscription
    ///
    /// The listener starts at this subscription's current position, so a
    /// signal published right after the one just received is never missed.
    /// Other signals seen while waiting are consumed and ignored.
    pub fn once(&mut self, wanted: AlarmSignal) -> OnceSubscription<'_> {
        OnceSubscription {
            subscription: self,
            wanted,
        }
    }
}

/// Listener that resolves at most once, see [`Subscription::once`]
pub struct OnceSubscription<'a> {
    subscription: &'a mut Subscription,
    wanted: AlarmSignal,
}

impl OnceSubscription<'_> {
    /// Wait for the wanted signal; `None` if the bus closed first
    ///
    /// Consumes the listener, so it can fire only once.
    pub async fn wait(self) -> Option<AlarmSignal> {
        loop {
            let signal = self.subscription.recv().await?;
            if signal == self.wanted {
                return Some(signal);
            }
            debug!("Ignoring {:?} while waiting for {:?}", signal, self.wanted);
        }
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_publish_without_subscribers() {
        let bus = SignalBus::new();
        assert_eq!(bus.publish(AlarmSignal::Start), 0);
    }

    #[tokio::test]
    async fn test_subscribers_see_signals_in_order() {
        let bus = SignalBus::new();
        let mut a = bus.subscribe();
        let mut b = bus.subscribe();

        assert_eq!(bus.publish(AlarmSignal::Start), 2);
        bus.publish(AlarmSignal::Clear);

        assert_eq!(a.recv().await, Some(AlarmSignal::Start));
        assert_eq!(a.recv().await, Some(AlarmSignal::Clear));
        assert_eq!(b.recv().await, Some(AlarmSignal::Start));
        assert_eq!(b.recv().await, Some(AlarmSignal::Clear));
    }

    #[tokio::test]
    async fn test_late_subscriber_misses_earlier_signals() {
        let bus = SignalBus::new();
        let _keep = bus.subscribe();
        bus.publish(AlarmSignal::Start);

        let mut late = bus.subscribe();
        bus.publish(AlarmSignal::Clear);
        assert_eq!(late.recv().await, Some(AlarmSignal::Clear));
    }

    #[tokio::test]
    async fn test_once_skips_other_signals() {
        let bus = SignalBus::new();
        let mut sub = bus.subscribe();

        bus.publish(AlarmSignal::Start);
        bus.publish(AlarmSignal::Start);
        bus.publish(AlarmSignal::Clear);
        bus.publish(AlarmSignal::Start);

        assert_eq!(sub.once(AlarmSignal::Clear).wait().await, Some(AlarmSignal::Clear));
        // Signals after the wanted one stay on the subscription
        assert_eq!(sub.recv().await, Some(AlarmSignal::Start));
    }

    #[tokio::test]
    async fn test_once_sees_signal_published_before_registration() {
        let bus = SignalBus::new();
        let mut sub = bus.subscribe();

        bus.publish(AlarmSignal::Start);
        bus.publish(AlarmSignal::Clear);

        assert_eq!(sub.recv().await, Some(AlarmSignal::Start));
        let clear = sub.once(AlarmSignal::Clear);
        assert_eq!(clear.wait().await, Some(AlarmSignal::Clear));
    }

    #[tokio::test]
    async fn test_lagged_once_still_sees_latest_clear() {
        let bus = SignalBus::new();
        let mut sub = bus.subscribe();

        // Overrun the buffer, ending on Clear
        for i in 0..BUS_CAPACITY * 2 + 1 {
            bus.publish(if i % 2 == 0 { AlarmSignal::Clear } else { AlarmSignal::Start });
        }

        assert_eq!(sub.once(AlarmSignal::Clear).wait().await, Some(AlarmSignal::Clear));

        let mut last = None;
        drop(bus);
        while let Some(signal) = sub.recv().await {
            last = Some(signal);
        }
        assert_eq!(last, Some(AlarmSignal::Clear));
    }

    #[tokio::test]
    async fn test_closed_bus() {
        let bus = SignalBus::new();
        let mut sub = bus.subscribe();
        drop(bus);

        assert_eq!(sub.recv().await, None);
        assert_eq!(sub.once(AlarmSignal::Clear).wait().await, None);
    }
}
