//! Alarm notifications
//!
//! On every `Start` the notifier logs the alarm and dispatches the SMS and
//! datastore notifications as independent spawned tasks. Neither is awaited;
//! failures are logged and dropped. `Clear` sends nothing.

pub mod datastore;
pub mod twilio;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use errors::log_service_error;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::config::FireConfig;
use crate::error::{FireSrvError, Result};
use crate::signal::{AlarmSignal, Subscription};

pub use datastore::HttpDatastore;
pub use twilio::TwilioSms;

pub const SMS_BODY: &str = "fire alarm";

/// Outbound SMS gateway
#[async_trait]
pub trait SmsClient: Send + Sync {
    async fn send(&self, to: &str, from: &str, body: &str) -> Result<()>;
}

/// Remote datastore accepting a timestamp
#[async_trait]
pub trait Datastore: Send + Sync {
    async fn put_timestamp(&self, endpoint: &str, auth_token: &str, timestamp: &str) -> Result<()>;
}

/// Enabled SMS target
#[derive(Clone)]
pub struct SmsRoute {
    pub to: String,
    pub from: String,
    pub client: Arc<dyn SmsClient>,
}

/// Enabled datastore target
#[derive(Clone)]
pub struct DatastoreRoute {
    pub endpoint: String,
    pub auth_token: String,
    pub client: Arc<dyn Datastore>,
}

/// Notification targets; an absent route disables that notification
#[derive(Clone, Default)]
pub struct NotifierClients {
    pub sms: Option<SmsRoute>,
    pub datastore: Option<DatastoreRoute>,
}

impl NotifierClients {
    /// HTTP clients for the groups enabled in `config`
    pub fn from_config(config: &FireConfig) -> Result<Self> {
        let sms = config.sms();
        if config.sms_numbers_missing() {
            warn!("SMS credentials set but NUMBER_TO_SEND_TO or TWILIO_OUTGOING_NUMBER missing, SMS disabled");
        }
        let datastore = config.datastore();
        if sms.is_none() && datastore.is_none() {
            return Ok(Self::default());
        }

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.http_timeout() {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| FireSrvError::ConfigError(format!("HTTP client: {}", e)))?;

        Ok(Self {
            sms: sms.map(|settings| SmsRoute {
                to: settings.to.clone(),
                from: settings.from.clone(),
                client: Arc::new(TwilioSms::new(http.clone(), &settings)),
            }),
            datastore: datastore.map(|settings| DatastoreRoute {
                endpoint: settings.endpoint,
                auth_token: settings.auth_token,
                client: Arc::new(HttpDatastore::new(http.clone())),
            }),
        })
    }
}

/// Current time as RFC 3339 UTC with milliseconds, e.g. `2025-01-01T00:00:00.000Z`
pub fn iso_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub struct Notifier {
    clients: NotifierClients,
}

impl Notifier {
    pub fn new(clients: NotifierClients) -> Self {
        match &clients.sms {
            Some(route) => info!("SMS notifications enabled to {}", route.to),
            None => info!("SMS notifications disabled"),
        }
        match &clients.datastore {
            Some(route) => info!("Datastore notifications enabled at {}", route.endpoint),
            None => info!("Datastore notifications disabled"),
        }
        Self { clients }
    }

    /// Log the alarm and dispatch the enabled notifications
    ///
    /// Returns the spawned tasks; callers are not expected to wait on them.
    pub fn notify(&self) -> Vec<JoinHandle<()>> {
        warn!("fire alarm");

        let mut tasks = Vec::with_capacity(2);

        if let Some(route) = self.clients.sms.clone() {
            tasks.push(tokio::spawn(async move {
                match route.client.send(&route.to, &route.from, SMS_BODY).await {
                    Ok(()) => info!("SMS sent"),
                    Err(e) => log_service_error("SMS notification failed", &e),
                }
            }));
        }

        if let Some(route) = self.clients.datastore.clone() {
            let timestamp = iso_timestamp();
            tasks.push(tokio::spawn(async move {
                match route
                    .client
                    .put_timestamp(&route.endpoint, &route.auth_token, &timestamp)
                    .await
                {
                    Ok(()) => info!("datastore notified"),
                    Err(e) => log_service_error("Datastore notification failed", &e),
                }
            }));
        }

        tasks
    }

    /// React to `Start` signals until the bus closes
    pub async fn run(self, mut subscription: Subscription) {
        while let Some(signal) = subscription.recv().await {
            if signal == AlarmSignal::Start {
                self.notify();
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use tracing_test::traced_test;

    #[derive(Default)]
    struct RecordingSms {
        sent: Mutex<Vec<(String, String, String)>>,
        fail: bool,
    }

    #[async_trait]
    impl SmsClient for RecordingSms {
        async fn send(&self, to: &str, from: &str, body: &str) -> Result<()> {
            self.sent
                .lock()
                .push((to.to_string(), from.to_string(), body.to_string()));
            if self.fail {
                return Err(FireSrvError::SmsError("gateway down".to_string()));
            }
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingStore {
        puts: Mutex<Vec<(String, String, String)>>,
    }

    #[async_trait]
    impl Datastore for RecordingStore {
        async fn put_timestamp(&self, endpoint: &str, token: &str, timestamp: &str) -> Result<()> {
            self.puts
                .lock()
                .push((endpoint.to_string(), token.to_string(), timestamp.to_string()));
            Ok(())
        }
    }

    fn sms_route(client: Arc<RecordingSms>) -> SmsRoute {
        SmsRoute {
            to: "+15550001".to_string(),
            from: "+15550002".to_string(),
            client,
        }
    }

    fn store_route(client: Arc<RecordingStore>) -> DatastoreRoute {
        DatastoreRoute {
            endpoint: "http://store/fire".to_string(),
            auth_token: "tok".to_string(),
            client,
        }
    }

    async fn finish(tasks: Vec<JoinHandle<()>>) {
        for task in tasks {
            task.await.unwrap();
        }
    }

    #[tokio::test]
    async fn test_both_routes_notified() {
        let sms = Arc::new(RecordingSms::default());
        let store = Arc::new(RecordingStore::default());
        let notifier = Notifier::new(NotifierClients {
            sms: Some(sms_route(sms.clone())),
            datastore: Some(store_route(store.clone())),
        });

        finish(notifier.notify()).await;

        assert_eq!(
            sms.sent.lock().clone(),
            vec![(
                "+15550001".to_string(),
                "+15550002".to_string(),
                "fire alarm".to_string()
            )]
        );
        let puts = store.puts.lock().clone();
        assert_eq!(puts.len(), 1);
        assert_eq!(puts[0].0, "http://store/fire");
        assert_eq!(puts[0].1, "tok");
    }

    #[tokio::test]
    async fn test_routes_are_independent() {
        let store = Arc::new(RecordingStore::default());
        let notifier = Notifier::new(NotifierClients {
            sms: None,
            datastore: Some(store_route(store.clone())),
        });
        let tasks = notifier.notify();
        assert_eq!(tasks.len(), 1);
        finish(tasks).await;
        assert_eq!(store.puts.lock().len(), 1);

        let sms = Arc::new(RecordingSms::default());
        let notifier = Notifier::new(NotifierClients {
            sms: Some(sms_route(sms.clone())),
            datastore: None,
        });
        finish(notifier.notify()).await;
        assert_eq!(sms.sent.lock().len(), 1);
    }

    #[tokio::test]
    #[traced_test]
    async fn test_no_routes_only_logs() {
        let notifier = Notifier::new(NotifierClients::default());
        assert!(notifier.notify().is_empty());
        assert!(logs_contain("fire alarm"));
    }

    #[tokio::test]
    #[traced_test]
    async fn test_sms_failure_does_not_block_datastore() {
        let sms = Arc::new(RecordingSms {
            fail: true,
            ..Default::default()
        });
        let store = Arc::new(RecordingStore::default());
        let notifier = Notifier::new(NotifierClients {
            sms: Some(sms_route(sms)),
            datastore: Some(store_route(store.clone())),
        });

        finish(notifier.notify()).await;

        assert_eq!(store.puts.lock().len(), 1);
        assert!(logs_contain("SMS notification failed"));
        assert!(logs_contain("datastore notified"));
    }

    #[tokio::test]
    async fn test_run_ignores_clear() {
        let sms = Arc::new(RecordingSms::default());
        let notifier = Notifier::new(NotifierClients {
            sms: Some(sms_route(sms.clone())),
            datastore: None,
        });
        let bus = crate::signal::SignalBus::new();
        let task = tokio::spawn(notifier.run(bus.subscribe()));

        bus.publish(AlarmSignal::Clear);
        bus.publish(AlarmSignal::Start);
        bus.publish(AlarmSignal::Clear);
        drop(bus);
        task.await.unwrap();

        // Let the detached send finish
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
        assert_eq!(sms.sent.lock().len(), 1);
    }

    #[test]
    fn test_iso_timestamp_format() {
        let ts = iso_timestamp();
        assert!(ts.ends_with('Z'));
        assert_eq!(ts.len(), "2025-01-01T00:00:00.000Z".len());
        assert!(chrono::DateTime::parse_from_rfc3339(&ts).is_ok());
    }

    #[test]
    fn test_clients_from_config_follow_groups() {
        let mut config = FireConfig::with_threshold(30.0);
        let clients = NotifierClients::from_config(&config).unwrap();
        assert!(clients.sms.is_none());
        assert!(clients.datastore.is_none());

        config.server = Some("http://store/fire".to_string());
        config.auth_token = Some("tok".to_string());
        let clients = NotifierClients::from_config(&config).unwrap();
        assert!(clients.sms.is_none());
        assert_eq!(clients.datastore.unwrap().endpoint, "http://store/fire");
    }

    #[test]
    #[traced_test]
    fn test_sms_without_numbers_warns_once() {
        let mut config = FireConfig::with_threshold(30.0);
        config.twilio_acct_sid = Some("AC123".to_string());
        config.twilio_auth_token = Some("secret".to_string());

        let clients = NotifierClients::from_config(&config).unwrap();
        assert!(clients.sms.is_none());
        config.summary();

        logs_assert(|lines: &[&str]| {
            match lines.iter().filter(|line| line.contains("SMS disabled")).count() {
                1 => Ok(()),
                n => Err(format!("expected one warning, got {}", n)),
            }
        });
    }
}
