use contract_models::{AuditEntry, NotificationMessage, MESSAGE_TYPE_PROPERTY};
use contract_notifications::{AuditSink, MessageSender, NotificationQueue, TaggedMessage};

/// HttpQueue enqueues messages by POSTing their body to a queue endpoint,
/// with the message type carried as a header.
#[derive(derivative::Derivative, Clone)]
#[derivative(Debug)]
pub struct HttpQueue {
    url: url::Url,
    #[derivative(Debug = "ignore")]
    http_client: reqwest::Client,
    #[derivative(Debug = "ignore")]
    bearer_token: Option<String>,
}

impl HttpQueue {
    pub fn new(url: url::Url, http_client: reqwest::Client, bearer_token: Option<String>) -> Self {
        Self {
            url,
            http_client,
            bearer_token,
        }
    }

    async fn post(&self, message_type: &str, body: Vec<u8>) -> anyhow::Result<()> {
        let mut builder = self
            .http_client
            .post(self.url.clone())
            .header(MESSAGE_TYPE_PROPERTY, message_type)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body);
        if let Some(token) = &self.bearer_token {
            builder = builder.bearer_auth(token);
        }

        tracing::debug!(url = %self.url, %message_type, "enqueueing message");
        check_status("POST", &self.url, builder.send().await?).await
    }
}

#[async_trait::async_trait]
impl NotificationQueue for HttpQueue {
    async fn send(&self, notification: &NotificationMessage) -> anyhow::Result<()> {
        let body = serde_json::to_vec(notification)?;
        self.post(notification.email_message_type.name(), body).await
    }
}

#[async_trait::async_trait]
impl MessageSender for HttpQueue {
    async fn send(&self, message: TaggedMessage) -> anyhow::Result<()> {
        let TaggedMessage { message_type, body } = message;
        self.post(&message_type, body).await
    }
}

/// HttpAuditSink writes audit entries to the audit API.
#[derive(derivative::Derivative, Clone)]
#[derivative(Debug)]
pub struct HttpAuditSink {
    url: url::Url,
    #[derivative(Debug = "ignore")]
    http_client: reqwest::Client,
    #[derivative(Debug = "ignore")]
    bearer_token: Option<String>,
}

impl HttpAuditSink {
    pub fn new(
        base_url: &url::Url,
        http_client: reqwest::Client,
        bearer_token: Option<String>,
    ) -> anyhow::Result<Self> {
        Ok(Self {
            url: base_url.join("api/audit")?,
            http_client,
            bearer_token,
        })
    }
}

#[async_trait::async_trait]
impl AuditSink for HttpAuditSink {
    async fn audit(&self, entry: &AuditEntry) -> anyhow::Result<()> {
        let mut builder = self.http_client.post(self.url.clone()).json(entry);
        if let Some(token) = &self.bearer_token {
            builder = builder.bearer_auth(token);
        }
        check_status("POST", &self.url, builder.send().await?).await
    }
}

async fn check_status(
    method: &str,
    url: &url::Url,
    response: reqwest::Response,
) -> anyhow::Result<()> {
    let status = response.status();

    if !status.is_success() {
        let body = response.text().await?;
        anyhow::bail!("{method} {url}: {status}: {body}");
    }
    Ok(())
}
