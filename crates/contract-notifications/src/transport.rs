use anyhow::Context;
use contract_models::{AuditEntry, InboundMessage, NotificationMessage};
use std::collections::BTreeMap;

/// NotificationQueue publishes notifications to the shared email processor.
#[async_trait::async_trait]
pub trait NotificationQueue: Send + Sync {
    async fn send(&self, notification: &NotificationMessage) -> anyhow::Result<()>;
}

/// AuditSink records audit entries.
#[async_trait::async_trait]
pub trait AuditSink: Send + Sync {
    async fn audit(&self, entry: &AuditEntry) -> anyhow::Result<()>;

    /// Audit `entry`, logging rather than returning a failure to do so.
    /// Used where an audit failure must not mask the outcome being audited.
    async fn try_audit(&self, entry: &AuditEntry) {
        if let Err(err) = self.audit(entry).await {
            tracing::warn!(
                action = ?entry.action,
                ukprn = ?entry.ukprn,
                error = ?err,
                "failed to write audit entry"
            );
        }
    }
}

/// A message body tagged with its message type, as carried on a queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedMessage {
    pub message_type: String,
    pub body: Vec<u8>,
}

impl TaggedMessage {
    pub fn encode<M: InboundMessage>(message: &M) -> anyhow::Result<Self> {
        let body = serde_json::to_vec(message)
            .with_context(|| format!("encoding {}", M::MESSAGE_TYPE))?;

        Ok(Self {
            message_type: M::MESSAGE_TYPE.to_string(),
            body,
        })
    }
}

/// MessageSender enqueues tagged messages for consumption by processors.
#[async_trait::async_trait]
pub trait MessageSender: Send + Sync {
    async fn send(&self, message: TaggedMessage) -> anyhow::Result<()>;
}

/// Configuration is a source of named configuration values which are read
/// when a message is processed, not at startup.
pub trait Configuration: Send + Sync {
    fn get_value(&self, key: &str) -> Option<String>;
}

impl Configuration for BTreeMap<String, String> {
    fn get_value(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

#[derive(Debug, thiserror::Error)]
#[error("{key} configuration value is not set.")]
pub struct MissingConfiguration {
    pub key: String,
}

/// Read a required configuration value. Missing and empty values are errors.
pub fn required_setting(
    config: &dyn Configuration,
    key: &str,
) -> Result<String, MissingConfiguration> {
    match config.get_value(key) {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => {
            tracing::error!(%key, "configuration value is not set");
            Err(MissingConfiguration {
                key: key.to_string(),
            })
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_required_setting() {
        let config: BTreeMap<String, String> = [
            ("ServiceNowEmailAddress".to_string(), "queries@agency.test".to_string()),
            ("CdsUserExceptionEmail".to_string(), "  ".to_string()),
        ]
        .into_iter()
        .collect();

        assert_eq!(
            required_setting(&config, "ServiceNowEmailAddress").unwrap(),
            "queries@agency.test"
        );
        assert_eq!(
            required_setting(&config, "CdsUserExceptionEmail")
                .unwrap_err()
                .to_string(),
            "CdsUserExceptionEmail configuration value is not set."
        );
        assert_eq!(
            required_setting(&config, "Other").unwrap_err().key,
            "Other"
        );
    }

    #[test]
    fn test_tagged_message_encoding() {
        let message = contract_models::messages::ContractReminderEmailMessage { contract_id: 42 };
        let tagged = TaggedMessage::encode(&message).unwrap();

        assert_eq!(tagged.message_type, "ContractReminderEmailMessage");
        assert_eq!(tagged.body, br#"{"contractId":42}"#.to_vec());
    }
}
