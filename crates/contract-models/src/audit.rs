use serde::{Deserialize, Serialize};

/// A record of an action taken (or not taken) by a processor, written to
/// the audit API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    pub severity: Severity,
    pub action: ActionType,
    pub ukprn: Option<i32>,
    pub message: String,
    pub user: String,
}

impl AuditEntry {
    /// Build an entry attributed to `component`.
    pub fn new(
        message: impl Into<String>,
        ukprn: Option<i32>,
        action: ActionType,
        component: &str,
        severity: Severity,
    ) -> Self {
        Self {
            severity,
            action,
            ukprn,
            message: message.into(),
            user: format!("[{component}]"),
        }
    }

    /// Extend the message with the reason an action could not be completed.
    pub fn append_error(&mut self, error: impl AsRef<str>) {
        self.message.push_str(" and ");
        self.message.push_str(error.as_ref());
    }
}

/// Severity of an audit entry. Encoded as an integer on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u8", from = "u8")]
pub enum Severity {
    Information,
    Error,
}

impl From<Severity> for u8 {
    fn from(severity: Severity) -> u8 {
        match severity {
            Severity::Information => 0,
            Severity::Error => 1,
        }
    }
}

// Unknown severities are treated as errors.
impl From<u8> for Severity {
    fn from(value: u8) -> Self {
        match value {
            0 => Severity::Information,
            _ => Severity::Error,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionType {
    /// A notification was published to the email queue, or could not be.
    EmailMessagePushed,
    /// A contract status change was forwarded to the contract events queue.
    ContractStatusChangeForwarded,
    /// A contract signing reminder was queued and marked as sent.
    ContractReminderSent,
    /// A contract's document was prepared for signing.
    ContractContentPrepared,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_append_error_extends_message_once() {
        let mut entry = AuditEntry::new(
            "ContractApprovedEmailMessage processed",
            Some(10001234),
            ActionType::EmailMessagePushed,
            "ContractApprovedEmailService",
            Severity::Information,
        );
        entry.append_error("no users found with roles [SignContractsAndAgreements] for organisation [10001234]");

        assert_eq!(
            entry.message,
            "ContractApprovedEmailMessage processed and no users found with roles [SignContractsAndAgreements] for organisation [10001234]"
        );
        assert_eq!(entry.user, "[ContractApprovedEmailService]");
    }

    #[test]
    fn test_audit_entry_wire_shape() {
        let entry = AuditEntry::new(
            "forwarded",
            None,
            ActionType::ContractStatusChangeForwarded,
            "ContractStatusChangePublisher",
            Severity::Information,
        );

        insta::assert_json_snapshot!(entry, @r###"
        {
          "severity": 0,
          "action": "ContractStatusChangeForwarded",
          "ukprn": null,
          "message": "forwarded",
          "user": "[ContractStatusChangePublisher]"
        }
        "###);
    }
}
