use super::transport::{AuditSink, MessageSender, TaggedMessage};
use anyhow::Context;
use contract_models::{
    messages::ContractReminderEmailMessage, queues, ActionType, AuditEntry, ContractReminderItem,
    Severity,
};
use data_api::ContractsApi;
use std::collections::BTreeSet;
use std::sync::Arc;

const COMPONENT: &str = "ContractReminderProcessingService";

/// Every reminder of a page of overdue contracts failed, and no further
/// pages were scanned.
#[derive(Debug, thiserror::Error)]
#[error("all {failed} contract reminders of page {page} failed to be issued")]
pub struct ContractReminderProcessingError {
    pub page: usize,
    pub failed: usize,
}

/// ContractReminderProcessingService scans contracts which are overdue a
/// signing reminder, and queues a ContractReminderEmailMessage for each.
pub struct ContractReminderProcessingService {
    contracts: Arc<dyn ContractsApi>,
    sender: Arc<dyn MessageSender>,
    audit: Arc<dyn AuditSink>,
}

impl ContractReminderProcessingService {
    pub fn new(
        contracts: Arc<dyn ContractsApi>,
        sender: Arc<dyn MessageSender>,
        audit: Arc<dyn AuditSink>,
    ) -> Self {
        Self {
            contracts,
            sender,
            audit,
        }
    }

    /// Issue reminders until no overdue contracts remain, returning the
    /// number of reminders issued.
    ///
    /// Contracts are marked as reminded once their message is queued, which
    /// removes them from the overdue set. The first page is therefore always
    /// re-requested. A contract whose reminder failed stays overdue and is
    /// returned again, so it's skipped for the remainder of the scan. The
    /// scan ends once a page holds no contract which wasn't already
    /// attempted. A page on which every attempted reminder failed ends the
    /// scan with a ContractReminderProcessingError.
    #[tracing::instrument(skip_all)]
    pub async fn issue_contract_reminders(&self) -> anyhow::Result<usize> {
        let mut issued = 0;
        let mut failed_ids = BTreeSet::new();

        for page in 1.. {
            let overdue = self
                .contracts
                .get_overdue_contracts()
                .await
                .context("fetching contracts overdue a reminder")?;

            let pending: Vec<&ContractReminderItem> = overdue
                .contracts
                .iter()
                .filter(|contract| !failed_ids.contains(&contract.id))
                .collect();

            if pending.is_empty() {
                if !overdue.contracts.is_empty() {
                    tracing::warn!(
                        page,
                        remaining = overdue.contracts.len(),
                        "only contracts with failed reminders remain overdue"
                    );
                }
                break;
            }
            let total = pending.len();

            let results = futures::future::join_all(
                pending
                    .iter()
                    .map(|contract| self.issue_reminder(contract)),
            )
            .await;

            let mut failed = 0;
            for (contract, result) in pending.iter().zip(results) {
                if let Err(err) = result {
                    tracing::error!(
                        contract_id = contract.id,
                        contract_number = %contract.contract_number,
                        contract_version = contract.contract_version,
                        error = ?err,
                        "failed to issue contract reminder"
                    );
                    failed_ids.insert(contract.id);
                    failed += 1;
                }
            }
            issued += total - failed;

            if failed == total {
                tracing::error!(page, failed, fatal = true, "every contract reminder of the page failed");
                return Err(ContractReminderProcessingError { page, failed }.into());
            }
            tracing::debug!(page, total, failed, "issued page of contract reminders");
        }

        tracing::info!(issued, failed = failed_ids.len(), "finished issuing contract reminders");
        Ok(issued)
    }

    async fn issue_reminder(&self, contract: &ContractReminderItem) -> anyhow::Result<()> {
        let message = TaggedMessage::encode(&ContractReminderEmailMessage {
            contract_id: contract.id,
        })?;

        self.sender
            .send(message)
            .await
            .with_context(|| format!("queueing reminder for contract {}", contract.id))?;

        self.contracts
            .mark_reminder_sent(contract)
            .await
            .with_context(|| format!("marking reminder sent for contract {}", contract.id))?;

        let entry = AuditEntry::new(
            format!(
                "Email reminder has been queued to [{}] for contract [{}] version [{}].",
                queues::CONTRACT_REMINDERS,
                contract.contract_number,
                contract.contract_version,
            ),
            Some(contract.ukprn),
            ActionType::ContractReminderSent,
            COMPONENT,
            Severity::Information,
        );
        self.audit.try_audit(&entry).await;

        Ok(())
    }
}
