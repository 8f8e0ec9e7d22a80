use super::transport::{AuditSink, MessageSender, TaggedMessage};
use anyhow::Context;
use contract_models::{
    messages::{
        ContractApprovedEmailMessage, ContractReadyToReviewEmailMessage,
        ContractReadyToSignEmailMessage, ContractWithdrawnEmailMessage,
    },
    queues, ActionType, AuditEntry, Contract, ContractAmendmentType, ContractStatus,
    InboundMessage, Severity,
};
use std::sync::Arc;

const COMPONENT: &str = "ContractStatusChangePublisher";

const FORWARDED_TEMPLATE: &str = "Contract [{ContractNumber}] version [{ContractVersion}] with status [{Status}] and amendment type [{AmendmentType}] has been forwarded by [{Method}] to the [{Queue}] queue.";

/// Status change messages which a contract snapshot can be forwarded as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusChange {
    Approved,
    ReadyForReview,
    ReadyToSign,
    Withdrawn,
}

impl StatusChange {
    /// Select the status change message which applies to `contract`,
    /// if any does.
    pub fn for_contract(contract: &Contract) -> Option<Self> {
        match (contract.status, contract.amendment_type) {
            (ContractStatus::Approved, _) => Some(Self::Approved),
            (ContractStatus::PublishedToProvider, ContractAmendmentType::Notfication) => {
                Some(Self::ReadyForReview)
            }
            (ContractStatus::PublishedToProvider, _) => Some(Self::ReadyToSign),
            (status, _) if status.is_withdrawn() => Some(Self::Withdrawn),
            _ => None,
        }
    }
}

/// ContractStatusChangePublisher forwards contract status changes to the
/// contract events queue, where they're picked up by the email processors.
pub struct ContractStatusChangePublisher {
    sender: Arc<dyn MessageSender>,
    audit: Arc<dyn AuditSink>,
}

impl ContractStatusChangePublisher {
    pub fn new(sender: Arc<dyn MessageSender>, audit: Arc<dyn AuditSink>) -> Self {
        Self { sender, audit }
    }

    pub async fn notify_contract_approved(&self, contract: &Contract) -> anyhow::Result<()> {
        let message = ContractApprovedEmailMessage {
            contract_id: contract.id,
        };
        self.forward(contract, &message, "NotifyContractApproved").await
    }

    pub async fn notify_contract_changes_are_ready_for_review(
        &self,
        contract: &Contract,
    ) -> anyhow::Result<()> {
        let message = ContractReadyToReviewEmailMessage {
            contract_id: contract.id,
        };
        self.forward(contract, &message, "NotifyContractChangesAreReadyForReview")
            .await
    }

    pub async fn notify_contract_is_ready_to_sign(&self, contract: &Contract) -> anyhow::Result<()> {
        let message = ContractReadyToSignEmailMessage {
            contract_id: contract.id,
        };
        self.forward(contract, &message, "NotifyContractIsReadyToSign")
            .await
    }

    pub async fn notify_contract_withdrawn(&self, contract: &Contract) -> anyhow::Result<()> {
        let message = ContractWithdrawnEmailMessage {
            contract_id: contract.id,
        };
        self.forward(contract, &message, "NotifyContractWithdrawn")
            .await
    }

    /// Forward `contract` as whichever status change message applies to it.
    /// Returns None if no message applies, in which case nothing is sent.
    pub async fn forward_status_change(
        &self,
        contract: &Contract,
    ) -> anyhow::Result<Option<StatusChange>> {
        let Some(change) = StatusChange::for_contract(contract) else {
            tracing::info!(
                contract_id = contract.id,
                status = %contract.status,
                amendment_type = %contract.amendment_type,
                "contract status change has no notification"
            );
            return Ok(None);
        };

        match change {
            StatusChange::Approved => self.notify_contract_approved(contract).await,
            StatusChange::ReadyForReview => {
                self.notify_contract_changes_are_ready_for_review(contract)
                    .await
            }
            StatusChange::ReadyToSign => self.notify_contract_is_ready_to_sign(contract).await,
            StatusChange::Withdrawn => self.notify_contract_withdrawn(contract).await,
        }?;

        Ok(Some(change))
    }

    #[tracing::instrument(
        skip_all,
        fields(contract_id = contract.id, message_type = M::MESSAGE_TYPE)
    )]
    async fn forward<M: InboundMessage>(
        &self,
        contract: &Contract,
        message: &M,
        method: &str,
    ) -> anyhow::Result<()> {
        self.sender
            .send(TaggedMessage::encode(message)?)
            .await
            .with_context(|| format!("forwarding {} to {}", M::MESSAGE_TYPE, queues::CONTRACT_EVENTS))?;

        let contract_version = contract.contract_version.to_string();
        let audit_message = replace_tokens(
            FORWARDED_TEMPLATE,
            &[
                ("ContractNumber", contract.contract_number.as_str()),
                ("ContractVersion", contract_version.as_str()),
                ("Status", contract.status.name()),
                ("AmendmentType", contract.amendment_type.name()),
                ("Method", method),
                ("Queue", queues::CONTRACT_EVENTS),
            ],
        );
        tracing::info!("{audit_message}");

        let entry = AuditEntry::new(
            audit_message,
            Some(contract.ukprn),
            ActionType::ContractStatusChangeForwarded,
            COMPONENT,
            Severity::Information,
        );
        self.audit
            .audit(&entry)
            .await
            .context("auditing forwarded status change")
    }
}

/// Replace each `{Key}` of `template` with its value from `tokens`.
/// Unknown tokens are left as they are.
fn replace_tokens(template: &str, tokens: &[(&str, &str)]) -> String {
    tokens
        .iter()
        .fold(template.to_string(), |rendered, (key, value)| {
            rendered.replace(&format!("{{{key}}}"), value)
        })
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_replace_tokens() {
        assert_eq!(
            replace_tokens(
                "[{A}] then [{B}] then [{A}] and [{C}]",
                &[("A", "one"), ("B", "two")]
            ),
            "[one] then [two] then [one] and [{C}]"
        );
    }

    #[test]
    fn test_status_change_routing() {
        let mut contract: Contract = serde_json::from_value(serde_json::json!({
            "id": 7,
            "contractNumber": "AEBP-7",
            "contractVersion": 1,
            "ukprn": 10001234,
            "title": "Adult education budget",
            "status": "Draft",
        }))
        .unwrap();

        for (status, amendment_type, expect) in [
            (ContractStatus::Approved, ContractAmendmentType::None, Some(StatusChange::Approved)),
            (
                ContractStatus::PublishedToProvider,
                ContractAmendmentType::Notfication,
                Some(StatusChange::ReadyForReview),
            ),
            (
                ContractStatus::PublishedToProvider,
                ContractAmendmentType::Variation,
                Some(StatusChange::ReadyToSign),
            ),
            (
                ContractStatus::WithdrawnByProvider,
                ContractAmendmentType::None,
                Some(StatusChange::Withdrawn),
            ),
            (ContractStatus::Draft, ContractAmendmentType::None, None),
            (ContractStatus::Replaced, ContractAmendmentType::None, None),
        ] {
            contract.status = status;
            contract.amendment_type = amendment_type;
            assert_eq!(StatusChange::for_contract(&contract), expect, "{status}");
        }
    }
}
