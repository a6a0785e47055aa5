//! Webhook delivery.

use std::time::Duration;

use reqwest::Client;
use tracing::{info, instrument, warn};
use url::Url;

use dailybread_shared::{DailyBreadError, Result};

use crate::embed::WebhookMessage;

const REQUEST_TIMEOUT_SECS: u64 = 30;

/// What the webhook endpoint made of a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishOutcome {
    /// Accepted with 200 or 204.
    Delivered { status: u16 },
    /// Any other status. Not retried.
    Rejected { status: u16, body: String },
}

impl PublishOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered { .. })
    }
}

/// Posts assembled messages to one webhook URL.
pub struct WebhookPublisher {
    client: Client,
    url: Url,
}

impl WebhookPublisher {
    pub fn new(url: Url) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| DailyBreadError::Network(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client, url })
    }

    /// POST `message` as JSON.
    ///
    /// A non-success status is returned as [`PublishOutcome::Rejected`];
    /// only transport failures are errors.
    #[instrument(skip(self, message), fields(embeds = message.embeds.len()))]
    pub async fn publish(&self, reference: &str, message: &WebhookMessage) -> Result<PublishOutcome> {
        // The URL embeds the webhook token; never log it.
        let response = self
            .client
            .post(self.url.clone())
            .json(message)
            .send()
            .await
            .map_err(|e| DailyBreadError::Network(format!("webhook request failed: {}", e.without_url())))?;

        let status = response.status().as_u16();
        if matches!(status, 200 | 204) {
            info!(reference, status, "posted daily reading");
            return Ok(PublishOutcome::Delivered { status });
        }

        let body = response.text().await.unwrap_or_default();
        warn!(reference, status, body = %body, "webhook rejected the message");
        Ok(PublishOutcome::Rejected { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embed::{Embed, EmbedFooter};
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn message() -> WebhookMessage {
        WebhookMessage {
            username: "Daily DT Bot".into(),
            thread_name: Some("03/05 - John 3:16".into()),
            embeds: vec![Embed {
                title: "🌿 Daily Bread: John 3:16".into(),
                color: 3_066_993,
                fields: vec![],
                footer: EmbedFooter {
                    text: "Posted on March 05, 2026".into(),
                },
            }],
        }
    }

    fn publisher(server: &MockServer) -> WebhookPublisher {
        let url = Url::parse(&format!("{}/api/webhooks/1/token", server.uri())).unwrap();
        WebhookPublisher::new(url).unwrap()
    }

    #[tokio::test]
    async fn posts_json_and_accepts_204() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/webhooks/1/token"))
            .and(header("content-type", "application/json"))
            .and(body_partial_json(serde_json::json!({
                "username": "Daily DT Bot",
                "thread_name": "03/05 - John 3:16",
                "embeds": [{ "color": 3066993 }]
            })))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let outcome = publisher(&server).publish("John 3:16", &message()).await.unwrap();
        assert_eq!(outcome, PublishOutcome::Delivered { status: 204 });
        assert!(outcome.is_delivered());
    }

    #[tokio::test]
    async fn accepts_200() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
            .mount(&server)
            .await;

        let outcome = publisher(&server).publish("John 3:16", &message()).await.unwrap();
        assert_eq!(outcome, PublishOutcome::Delivered { status: 200 });
    }

    #[tokio::test]
    async fn other_status_is_rejected_with_body() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_string(r#"{"message": "Invalid Form Body", "code": 50035}"#),
            )
            .expect(1)
            .mount(&server)
            .await;

        let outcome = publisher(&server).publish("John 3:16", &message()).await.unwrap();
        match outcome {
            PublishOutcome::Rejected { status, body } => {
                assert_eq!(status, 400);
                assert!(body.contains("Invalid Form Body"));
            }
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn transport_failure_is_network_error() {
        // Nothing listens on the discard port.
        let url = Url::parse("http://127.0.0.1:9/api/webhooks/1/token").unwrap();
        let publisher = WebhookPublisher::new(url).unwrap();

        let err = publisher.publish("John 3:16", &message()).await.unwrap_err();
        assert!(matches!(err, DailyBreadError::Network(_)));
        assert!(!err.to_string().contains("token"));
    }
}
