//! Outbound email through the Resend HTTP API.

pub mod templates;

use crate::error::NotifyError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;
use tracing::{debug, info, instrument};

pub const DEFAULT_API_URL: &str = "https://api.resend.com/emails";

/// Email provider and branding settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EmailSettings {
    /// Without a key messages are only logged.
    pub api_key: Option<String>,
    pub api_url: String,
    pub from_address: String,
    pub app_name: String,
    /// Base URL used to build links in emails.
    pub frontend_url: String,
    pub timeout_secs: u64,
}

impl Default for EmailSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: DEFAULT_API_URL.to_string(),
            from_address: "noreply@agri-smart-detect.com".to_string(),
            app_name: "Agri Smart Detect".to_string(),
            frontend_url: "https://agri-smart-detect.onrender.com".to_string(),
            timeout_secs: 10,
        }
    }
}

impl EmailSettings {
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().map(str::trim).filter(|key| !key.is_empty())
    }
}

/// A rendered email ready to send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub html: String,
}

/// Delivers emails to users.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> Result<(), NotifyError>;

    /// Whether messages actually leave the process.
    fn is_configured(&self) -> bool;
}

pub struct ResendNotifier {
    client: reqwest::Client,
    settings: EmailSettings,
}

impl ResendNotifier {
    pub fn new(settings: EmailSettings) -> Result<Self, NotifyError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("agrismart/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;
        Ok(Self { client, settings })
    }
}

#[async_trait]
impl Notifier for ResendNotifier {
    #[instrument(skip(self, message), fields(to = %message.to, subject = %message.subject))]
    async fn send(&self, message: &EmailMessage) -> Result<(), NotifyError> {
        let Some(api_key) = self.settings.api_key() else {
            info!("Email provider not configured, skipping delivery");
            return Ok(());
        };

        let payload = json!({
            "from": format!("{} <{}>", self.settings.app_name, self.settings.from_address),
            "to": [message.to],
            "subject": message.subject,
            "html": message.html,
        });

        let response = self
            .client
            .post(&self.settings.api_url)
            .bearer_auth(api_key)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        debug!("Email accepted by provider");
        Ok(())
    }

    fn is_configured(&self) -> bool {
        self.settings.api_key().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Json, Router, http::StatusCode, routing::post};
    use std::sync::{Arc, Mutex};
    use tokio::net::TcpListener;

    fn message() -> EmailMessage {
        EmailMessage {
            to: "farmer@example.com".to_string(),
            subject: "Hello".to_string(),
            html: "<p>Hi</p>".to_string(),
        }
    }

    #[tokio::test]
    async fn unconfigured_notifier_skips_delivery() {
        let notifier = ResendNotifier::new(EmailSettings::default()).unwrap();
        assert!(!notifier.is_configured());
        assert!(notifier.send(&message()).await.is_ok());
    }

    async fn spawn_provider(status: StatusCode) -> (String, Arc<Mutex<Vec<serde_json::Value>>>) {
        let received = Arc::new(Mutex::new(Vec::new()));
        let sink = received.clone();
        let app = Router::new().route(
            "/emails",
            post(move |Json(body): Json<serde_json::Value>| {
                let sink = sink.clone();
                async move {
                    sink.lock().unwrap().push(body);
                    status
                }
            }),
        );
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{addr}/emails"), received)
    }

    #[tokio::test]
    async fn posts_payload_to_provider() {
        let (url, received) = spawn_provider(StatusCode::OK).await;
        let notifier = ResendNotifier::new(EmailSettings {
            api_key: Some("re_test".to_string()),
            api_url: url,
            ..EmailSettings::default()
        })
        .unwrap();

        notifier.send(&message()).await.unwrap();

        let bodies = received.lock().unwrap();
        assert_eq!(bodies.len(), 1);
        assert_eq!(bodies[0]["to"][0], "farmer@example.com");
        assert_eq!(bodies[0]["from"], "Agri Smart Detect <noreply@agri-smart-detect.com>");
    }

    #[tokio::test]
    async fn provider_rejection_is_an_error() {
        let (url, _) = spawn_provider(StatusCode::UNPROCESSABLE_ENTITY).await;
        let notifier = ResendNotifier::new(EmailSettings {
            api_key: Some("re_test".to_string()),
            api_url: url,
            ..EmailSettings::default()
        })
        .unwrap();

        let result = notifier.send(&message()).await;
        assert!(matches!(result, Err(NotifyError::Rejected { status: 422, .. })));
    }
}
