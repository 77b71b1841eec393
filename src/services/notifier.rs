use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

use crate::models::{Event, API_PREFIX};

/// Errors that can occur when delivering a notification
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Mail relay returned error: {0}")]
    ApiError(String),
}

/// A rendered message for one recipient
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub recipient: String,
    pub subject: String,
    pub body: String,
}

/// Delivers notifications; callers only supply content
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError>;
}

/// Writes notifications to the log instead of delivering them
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        tracing::info!(
            "Notification for {} (no mail relay configured): {}",
            notification.recipient,
            notification.subject
        );
        tracing::debug!("Notification body:\n{}", notification.body);
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct RelayPayload<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    text: &'a str,
}

/// Sends mail by POSTing JSON to an HTTP mail relay
pub struct HttpMailNotifier {
    relay_url: String,
    api_key: Option<String>,
    sender: String,
    client: Client,
}

impl HttpMailNotifier {
    pub fn new(
        relay_url: String,
        api_key: Option<String>,
        sender: String,
    ) -> Result<Self, NotifyError> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;

        Ok(Self {
            relay_url,
            api_key,
            sender,
            client,
        })
    }
}

#[async_trait]
impl Notifier for HttpMailNotifier {
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        let payload = RelayPayload {
            from: &self.sender,
            to: &notification.recipient,
            subject: &notification.subject,
            text: &notification.body,
        };

        let mut request = self.client.post(&self.relay_url).json(&payload);
        if let Some(api_key) = &self.api_key {
            request = request.bearer_auth(api_key);
        }

        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read body".to_string());
            tracing::error!("Mail relay rejected message: {} - {}", status, body);
            return Err(NotifyError::ApiError(format!("Failed to send mail: {}", status)));
        }

        tracing::debug!("Sent notification to {}", notification.recipient);
        Ok(())
    }
}

/// Links handed to an organizer once their event exists
///
/// All three point at routes this service serves under `public_url`.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfirmationLinks {
    pub share_link: String,
    pub dashboard_link: String,
    pub presentation_link: String,
}

impl ConfirmationLinks {
    pub fn for_event(public_url: &str, event: &Event) -> Self {
        let base = public_url.trim_end_matches('/');
        Self {
            share_link: event.share_link(base),
            dashboard_link: format!("{}{}/events/{}", base, API_PREFIX, event.code()),
            presentation_link: format!("{}{}/events/{}/share", base, API_PREFIX, event.code()),
        }
    }
}

/// Confirmation mail sent to the organizer after event creation
pub fn render_confirmation(event: &Event, links: &ConfirmationLinks) -> Notification {
    let body = format!(
        "Hello {creator},

Your event \"{name}\" has been successfully created on EventMatch.

Event Details:
- Event Code: {code}
- Location: {address}
- Radius: {radius} km

You can share this link with your attendees:
{share}

To access your event dashboard and manage your event, use this link:
{dashboard}

To present the QR code for attendees to scan and register, use this link:
{presentation}

Keep the event code private: anyone holding it can manage the event.

Thank you for using EventMatch!
",
        creator = event.creator,
        name = event.name,
        code = event.code(),
        address = event.location.address,
        radius = event.radius,
        share = links.share_link,
        dashboard = links.dashboard_link,
        presentation = links.presentation_link,
    );

    Notification {
        recipient: event.creator_email.clone(),
        subject: format!("Your EventMatch Event '{}' Has Been Created", event.name),
        body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Location;

    fn create_event() -> Event {
        Event::create("Rust Night", Location::new("Main St"), "Ada", "ada@example.com", 2.5).unwrap()
    }

    #[test]
    fn test_confirmation_links() {
        let event = create_event();
        let links = ConfirmationLinks::for_event("https://em.example/", &event);

        assert_eq!(
            links.share_link,
            format!("https://em.example/api/v1/register/{}", event.share_id())
        );
        assert_eq!(
            links.dashboard_link,
            format!("https://em.example/api/v1/events/{}", event.code())
        );
        assert_eq!(
            links.presentation_link,
            format!("https://em.example/api/v1/events/{}/share", event.code())
        );
    }

    #[test]
    fn test_render_confirmation() {
        let event = create_event();
        let links = ConfirmationLinks::for_event("https://em.example", &event);
        let notification = render_confirmation(&event, &links);

        assert_eq!(notification.recipient, "ada@example.com");
        assert!(notification.subject.contains("Rust Night"));
        assert!(notification.body.contains(event.code()));
        assert!(notification.body.contains("Radius: 2.5 km"));
        assert!(notification.body.contains(&links.share_link));
    }

    #[tokio::test]
    async fn test_log_notifier_always_succeeds() {
        let event = create_event();
        let links = ConfirmationLinks::for_event("http://localhost", &event);
        assert!(LogNotifier.send(&render_confirmation(&event, &links)).await.is_ok());
    }

    #[tokio::test]
    async fn test_http_notifier_posts_payload() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/send")
            .match_header("authorization", "Bearer secret")
            .match_body(mockito::Matcher::PartialJson(serde_json::json!({
                "from": "noreply@em.example",
                "to": "ada@example.com",
            })))
            .with_status(202)
            .create_async()
            .await;

        let notifier = HttpMailNotifier::new(
            format!("{}/send", server.url()),
            Some("secret".to_string()),
            "noreply@em.example".to_string(),
        )
        .unwrap();

        let notification = Notification {
            recipient: "ada@example.com".to_string(),
            subject: "Hi".to_string(),
            body: "Body".to_string(),
        };

        notifier.send(&notification).await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_http_notifier_reports_rejection() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/send")
            .with_status(500)
            .with_body("relay down")
            .create_async()
            .await;

        let notifier =
            HttpMailNotifier::new(format!("{}/send", server.url()), None, "a@b.c".to_string())
                .unwrap();
        let notification = Notification {
            recipient: "ada@example.com".to_string(),
            subject: "Hi".to_string(),
            body: "Body".to_string(),
        };

        assert!(matches!(
            notifier.send(&notification).await,
            Err(NotifyError::ApiError(_))
        ));
    }
}
