//! Test Common Utilities
//!
//! Monitor rig with a fake sensor, a recording panel and recording
//! notification clients, driven on paused tokio time.

#![allow(dead_code)]
#![allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use firesrv::drivers::mock::{recording_panel, CallLog, FakeSensor, SensorFeed};
use firesrv::notifier::{Datastore, DatastoreRoute, SmsClient, SmsRoute};
use firesrv::{FireConfig, FireMonitor, Hardware, MonitorHandle, NotifierClients, Result};

pub const THRESHOLD: f64 = 50.0;
pub const POLL: Duration = Duration::from_millis(500);
pub const BLINK: Duration = Duration::from_millis(250);

#[derive(Default)]
pub struct RecordingSms {
    pub sent: Mutex<Vec<String>>,
}

#[async_trait]
impl SmsClient for RecordingSms {
    async fn send(&self, _to: &str, _from: &str, body: &str) -> Result<()> {
        self.sent.lock().push(body.to_string());
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingStore {
    pub timestamps: Mutex<Vec<String>>,
}

#[async_trait]
impl Datastore for RecordingStore {
    async fn put_timestamp(&self, _endpoint: &str, _token: &str, timestamp: &str) -> Result<()> {
        self.timestamps.lock().push(timestamp.to_string());
        Ok(())
    }
}

pub struct Rig {
    pub feed: SensorFeed,
    pub panel: CallLog,
    pub sms: Arc<RecordingSms>,
    pub store: Arc<RecordingStore>,
    pub handle: MonitorHandle,
}

/// Which notification routes the rig enables
#[derive(Clone, Copy)]
pub struct Routes {
    pub sms: bool,
    pub datastore: bool,
}

impl Routes {
    pub const ALL: Routes = Routes {
        sms: true,
        datastore: true,
    };
}

impl Rig {
    /// Start a monitor whose sensor reads `initial` until told otherwise
    pub fn start(initial: f64, routes: Routes) -> Self {
        let (sensor, feed) = FakeSensor::new(initial);
        let (panel, log) = recording_panel();
        let sms = Arc::new(RecordingSms::default());
        let store = Arc::new(RecordingStore::default());

        let clients = NotifierClients {
            sms: routes.sms.then(|| SmsRoute {
                to: "+15550001".to_string(),
                from: "+15550002".to_string(),
                client: sms.clone(),
            }),
            datastore: routes.datastore.then(|| DatastoreRoute {
                endpoint: "http://datastore.local/fire".to_string(),
                auth_token: "token".to_string(),
                client: store.clone(),
            }),
        };

        let handle = FireMonitor::new(
            FireConfig::with_threshold(THRESHOLD),
            Hardware::new(Box::new(sensor), panel),
            clients,
        )
        .start();

        Self {
            feed,
            panel: log,
            sms,
            store,
            handle,
        }
    }

    /// Let the next poll happen and every task react to it
    pub async fn poll(&self) {
        advance(POLL).await;
    }

    /// Push `value` and run one poll on it
    pub async fn read(&self, value: f64) {
        self.feed.push(value);
        self.poll().await;
    }

    pub fn sms_count(&self) -> usize {
        self.sms.sent.lock().len()
    }

    pub fn store_count(&self) -> usize {
        self.store.timestamps.lock().len()
    }
}

/// Step paused time forward, letting woken tasks run after every step
///
/// A single large `advance` would fire each interval only once.
pub async fn advance(by: Duration) {
    const STEP: Duration = Duration::from_millis(50);
    let mut remaining = by;
    while !remaining.is_zero() {
        let step = remaining.min(STEP);
        tokio::time::advance(step).await;
        settle().await;
        remaining -= step;
    }
}

pub async fn settle() {
    for _ in 0..20 {
        tokio::task::yield_now().await;
    }
}
