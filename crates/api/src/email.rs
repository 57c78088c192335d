//! Transactional email via Resend
//!
//! Sending is best-effort: failures are logged and never fail the request
//! that triggered them.

use invoicely_billing::{Account, Client};
use serde::Serialize;
use thiserror::Error;

use crate::config::Config;

#[derive(Debug, Error)]
pub enum EmailError {
    #[error("Email sending is not configured")]
    Disabled,
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Resend rejected the message ({status}): {body}")]
    Rejected { status: u16, body: String },
}

#[derive(Debug, Serialize)]
struct ResendEmail<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: String,
    html: String,
}

#[derive(Clone)]
pub struct NotificationEmailService {
    http: reqwest::Client,
    api_key: Option<String>,
    api_url: String,
    from: String,
}

impl NotificationEmailService {
    pub fn from_config(config: &Config) -> Self {
        if config.resend_api_key.is_none() {
            tracing::warn!("RESEND_API_KEY not set - client notification emails disabled");
        }
        Self {
            http: reqwest::Client::new(),
            api_key: config.resend_api_key.clone(),
            api_url: config.resend_api_url.trim_end_matches('/').to_string(),
            from: config.email_from.clone(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.api_key.is_some()
    }

    /// Tell a newly created client who will be invoicing them
    pub async fn send_client_welcome(
        &self,
        client: &Client,
        account: &Account,
    ) -> Result<(), EmailError> {
        let api_key = self.api_key.as_deref().ok_or(EmailError::Disabled)?;

        let email = ResendEmail {
            from: &self.from,
            to: [client.email.as_str()],
            subject: format!("{} added you as a client", account.name),
            html: format!(
                "<p>Hi {},</p><p>{} has added you as a client on Invoicely. \
                 Invoices and payment receipts from {} will be sent to this address.</p>",
                html_escape(&client.name),
                html_escape(&account.name),
                html_escape(&account.name),
            ),
        };

        let response = self
            .http
            .post(format!("{}/emails", self.api_url))
            .bearer_auth(api_key)
            .json(&email)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EmailError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        tracing::info!(client_id = %client.id, account_id = %account.id, "Client welcome email sent");
        Ok(())
    }

    /// Fire-and-forget wrapper around [`Self::send_client_welcome`]
    pub fn spawn_client_welcome(&self, client: Client, account: Account) {
        if !self.is_enabled() {
            return;
        }
        let service = self.clone();
        tokio::spawn(async move {
            if let Err(e) = service.send_client_welcome(&client, &account).await {
                tracing::warn!(
                    client_id = %client.id,
                    account_id = %account.id,
                    error = %e,
                    "Failed to send client welcome email"
                );
            }
        });
    }
}

fn html_escape(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;
    use uuid::Uuid;

    fn service(api_key: Option<&str>, api_url: &str) -> NotificationEmailService {
        NotificationEmailService {
            http: reqwest::Client::new(),
            api_key: api_key.map(String::from),
            api_url: api_url.to_string(),
            from: "Invoicely <billing@invoicely.test>".to_string(),
        }
    }

    fn fixtures() -> (Client, Account) {
        let now = OffsetDateTime::now_utc();
        let account = Account {
            id: Uuid::new_v4(),
            name: "Acme & Co".to_string(),
            email: "owner@acme.test".to_string(),
            parent_account_id: None,
            reseller_credit_limit: None,
            plan_id: None,
            created_at: now,
            updated_at: now,
        };
        let client = Client {
            id: Uuid::new_v4(),
            owner_account_id: account.id,
            name: "Jane".to_string(),
            email: "jane@example.com".to_string(),
            company: None,
            phone: None,
            notes: None,
            created_at: now,
            updated_at: now,
        };
        (client, account)
    }

    #[tokio::test]
    async fn test_welcome_email_posts_to_resend() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/emails")
            .match_header("authorization", "Bearer re_test_key")
            .match_body(mockito::Matcher::PartialJson(serde_json::json!({
                "to": ["jane@example.com"],
                "subject": "Acme & Co added you as a client",
            })))
            .with_status(200)
            .with_body(r#"{"id":"email_123"}"#)
            .create_async()
            .await;

        let (client, account) = fixtures();
        service(Some("re_test_key"), &server.url())
            .send_client_welcome(&client, &account)
            .await
            .unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_rejection_surfaces_status() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/emails")
            .with_status(500)
            .with_body("boom")
            .create_async()
            .await;

        let (client, account) = fixtures();
        let err = service(Some("re_test_key"), &server.url())
            .send_client_welcome(&client, &account)
            .await
            .unwrap_err();

        match err {
            EmailError::Rejected { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body, "boom");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_disabled_without_key() {
        let (client, account) = fixtures();
        let svc = service(None, "http://127.0.0.1:9");
        assert!(!svc.is_enabled());
        assert!(matches!(
            svc.send_client_welcome(&client, &account).await,
            Err(EmailError::Disabled)
        ));
    }

    #[test]
    fn test_html_escape() {
        assert_eq!(html_escape("<b>A&B</b>"), "&lt;b&gt;A&amp;B&lt;/b&gt;");
    }
}
