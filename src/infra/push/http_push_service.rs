use crate::domain::models::notification::Notification;
use crate::domain::ports::PushService;
use crate::error::AppError;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::error;

pub struct HttpPushService {
    client: Client,
    api_url: String,
    api_key: String,
}

impl HttpPushService {
    pub fn new(api_url: String, api_key: String) -> Self {
        Self {
            client: Client::new(),
            api_url,
            api_key,
        }
    }
}

#[derive(Serialize)]
struct PushPayload<'a> {
    recipient_user_id: &'a str,
    booking_id: &'a str,
    title_en: &'a str,
    title_de: &'a str,
    body_en: &'a str,
    body_de: &'a str,
}

#[async_trait]
impl PushService for HttpPushService {
    async fn send(&self, notification: &Notification) -> Result<(), AppError> {
        let payload = PushPayload {
            recipient_user_id: &notification.recipient_user_id,
            booking_id: &notification.booking_id,
            title_en: &notification.title_en,
            title_de: &notification.title_de,
            body_en: &notification.body_en,
            body_de: &notification.body_de,
        };

        let res = self.client.post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                let msg = format!("Push service connection error: {}", e);
                error!("{}", msg);
                AppError::InternalWithMsg(msg)
            })?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            let msg = format!("Push service failed. Status: {}, Body: {}", status, text);
            error!("{}", msg);
            return Err(AppError::InternalWithMsg(msg));
        }

        Ok(())
    }
}
