//! Twilio REST SMS client

use async_trait::async_trait;
use tracing::debug;

use super::SmsClient;
use crate::config::SmsSettings;
use crate::error::{FireSrvError, Result};

pub struct TwilioSms {
    http: reqwest::Client,
    account_sid: String,
    auth_token: String,
    messages_url: String,
}

impl TwilioSms {
    pub fn new(http: reqwest::Client, settings: &SmsSettings) -> Self {
        Self {
            http,
            account_sid: settings.account_sid.clone(),
            auth_token: settings.auth_token.clone(),
            messages_url: format!(
                "{}/2010-04-01/Accounts/{}/Messages.json",
                settings.api_base, settings.account_sid
            ),
        }
    }
}

#[async_trait]
impl SmsClient for TwilioSms {
    async fn send(&self, to: &str, from: &str, body: &str) -> Result<()> {
        debug!("POST {}", self.messages_url);
        let response = self
            .http
            .post(&self.messages_url)
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&[("To", to), ("From", from), ("Body", body)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(FireSrvError::SmsError(format!("{}: {}", status, detail.trim())));
        }
        Ok(())
    }
}
