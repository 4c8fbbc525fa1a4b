//! Alarm presenter
//!
//! State machine over {Idle, Blinking}. `Start` while idle enters Blinking:
//! red backlight, "fire detected!" on the alert line, buzzer on, then a
//! blink timer alternates white+silent / red+buzzing. Each episode captures
//! a one-shot `Clear` listener at entry; when it fires the timer is dropped
//! and the panel is reset. A `Start` while Blinking is ignored.

use std::time::Duration;

use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::drivers::panel::ALERT_LINE;
use crate::drivers::SharedPanel;
use crate::signal::{AlarmSignal, Subscription};

pub const ALERT_MESSAGE: &str = "fire detected!";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresenterState {
    Idle,
    Blinking,
}

pub struct AlarmPresenter {
    panel: SharedPanel,
    blink_interval: Duration,
    state: PresenterState,
}

impl AlarmPresenter {
    pub fn new(panel: SharedPanel, blink_interval: Duration) -> Self {
        Self {
            panel,
            blink_interval,
            state: PresenterState::Idle,
        }
    }

    pub fn state(&self) -> PresenterState {
        self.state
    }

    fn transition(&mut self, to: PresenterState) {
        info!("Alarm presenter {:?} -> {:?}", self.state, to);
        self.state = to;
    }

    /// Present alarms from `subscription` until the bus closes
    pub async fn run(mut self, mut subscription: Subscription) {
        while let Some(signal) = subscription.recv().await {
            match signal {
                AlarmSignal::Start => {
                    if !self.blink_episode(&mut subscription).await {
                        break;
                    }
                },
                AlarmSignal::Clear => debug!("Clear while idle, nothing to do"),
            }
        }
        debug!("Signal bus closed, alarm presenter stopping");
    }

    /// One Blinking episode; returns `false` if the bus closed during it
    async fn blink_episode(&mut self, subscription: &mut Subscription) -> bool {
        let clear = subscription.once(AlarmSignal::Clear).wait();
        tokio::pin!(clear);

        self.transition(PresenterState::Blinking);
        {
            let mut panel = self.panel.lock();
            panel.alert();
            panel.message(ALERT_LINE, ALERT_MESSAGE);
            panel.buzz();
        }

        // First flip one interval after entry; entry already shows red+buzzing
        let mut ticker = interval_at(Instant::now() + self.blink_interval, self.blink_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut tick = true;

        let open = loop {
            tokio::select! {
                biased;
                cleared = &mut clear => break cleared.is_some(),
                _ = ticker.tick() => {
                    let mut panel = self.panel.lock();
                    if tick {
                        panel.idle();
                        panel.silence();
                    } else {
                        panel.alert();
                        panel.buzz();
                    }
                    tick = !tick;
                },
            }
        };

        drop(ticker);
        self.panel.lock().reset();
        self.transition(PresenterState::Idle);
        open
    }
}
