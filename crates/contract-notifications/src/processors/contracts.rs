use super::origin;
use crate::{
    personalization::{contract_fields, format_date, required},
    Notifier, Outcome, Processor,
};
use anyhow::Context;
use contract_models::{
    messages::{
        ContractApprovedEmailMessage, ContractContentToBeSignedMessage,
        ContractReadyToReviewEmailMessage, ContractReadyToSignEmailMessage,
        ContractReminderEmailMessage, ContractWithdrawnEmailMessage,
    },
    ActionType, AuditEntry, Contract, ContractAmendmentType, ContractStatus, EmailMessageType,
    InboundMessage, RequestingService, Role, Severity,
};
use data_api::ContractsApi;
use std::sync::Arc;

const CONTRACT_ROLES: [Role; 2] = [
    Role::ViewContractsAndAgreements,
    Role::SignContractsAndAgreements,
];

macro_rules! contract_service {
    ($($service:ident),* $(,)?) => {
        $(
            pub struct $service {
                contracts: Arc<dyn ContractsApi>,
                notifier: Notifier,
            }

            impl $service {
                pub const NAME: &'static str = stringify!($service);

                pub fn new(contracts: Arc<dyn ContractsApi>, notifier: Notifier) -> Self {
                    Self { contracts, notifier }
                }
            }
        )*
    };
}

contract_service!(
    ContractApprovedEmailService,
    ContractReadyToSignEmailService,
    ContractReadyToReviewEmailService,
    ContractWithdrawnEmailService,
    ContractReminderEmailService,
    ContractContentToBeSignedService,
);

async fn fetch(contracts: &dyn ContractsApi, contract_id: i32) -> anyhow::Result<Contract> {
    contracts
        .get_contract(contract_id)
        .await
        .with_context(|| format!("fetching contract {contract_id}"))
}

/// A published contract which awaits signature. Notification amendments
/// are only ever reviewed, never signed.
fn is_ready_to_sign(contract: &Contract) -> bool {
    contract.status == ContractStatus::PublishedToProvider
        && contract.amendment_type != ContractAmendmentType::Notfication
}

fn is_ready_to_review(contract: &Contract) -> bool {
    contract.status == ContractStatus::PublishedToProvider
        && contract.amendment_type == ContractAmendmentType::Notfication
}

fn ineligible<M: InboundMessage>(contract: &Contract) -> Outcome {
    tracing::error!(
        contract_id = contract.id,
        contract_number = %contract.contract_number,
        contract_version = contract.contract_version,
        "contract has status [{}], amendment type [{}] and funding type [{}] which is not eligible for {}",
        contract.status,
        contract.amendment_type,
        contract.funding_type,
        M::MESSAGE_TYPE,
    );
    Outcome::Skipped
}

impl Processor for ContractApprovedEmailService {
    type Message = ContractApprovedEmailMessage;

    #[tracing::instrument(skip_all, fields(contract_id = message.contract_id))]
    async fn process<'s>(&'s self, message: Self::Message) -> anyhow::Result<Outcome> {
        let contract = fetch(self.contracts.as_ref(), message.contract_id).await?;

        if contract.status != ContractStatus::Approved {
            return Ok(ineligible::<Self::Message>(&contract));
        }

        self.notifier
            .notify_organisation(
                origin::<Self::Message>(Self::NAME, RequestingService::Contracts),
                contract.ukprn,
                &CONTRACT_ROLES,
                EmailMessageType::ContractSigned,
                || {
                    let signed_on = required(contract.signed_on.as_ref(), "SignedOn")?;

                    let mut fields = contract_fields(&contract);
                    fields.insert("signed_on".to_string(), format_date(signed_on).into());
                    if let Some(signed_by) = &contract.signed_by_name {
                        fields.insert("signed_by".to_string(), signed_by.as_str().into());
                    }
                    Ok(fields)
                },
            )
            .await
    }
}

impl Processor for ContractReadyToSignEmailService {
    type Message = ContractReadyToSignEmailMessage;

    #[tracing::instrument(skip_all, fields(contract_id = message.contract_id))]
    async fn process<'s>(&'s self, message: Self::Message) -> anyhow::Result<Outcome> {
        let contract = fetch(self.contracts.as_ref(), message.contract_id).await?;

        if !is_ready_to_sign(&contract) {
            return Ok(ineligible::<Self::Message>(&contract));
        }

        self.notifier
            .notify_sign_and_view_only(
                origin::<Self::Message>(Self::NAME, RequestingService::Contracts),
                contract.ukprn,
                (
                    Role::ViewContractsAndAgreements,
                    Role::SignContractsAndAgreements,
                ),
                (
                    EmailMessageType::ContractReadyToSign,
                    EmailMessageType::ContractReadyToView,
                ),
                || Ok(contract_fields(&contract)),
            )
            .await
    }
}

impl Processor for ContractReadyToReviewEmailService {
    type Message = ContractReadyToReviewEmailMessage;

    #[tracing::instrument(skip_all, fields(contract_id = message.contract_id))]
    async fn process<'s>(&'s self, message: Self::Message) -> anyhow::Result<Outcome> {
        let contract = fetch(self.contracts.as_ref(), message.contract_id).await?;

        if !is_ready_to_review(&contract) {
            return Ok(ineligible::<Self::Message>(&contract));
        }

        self.notifier
            .notify_organisation(
                origin::<Self::Message>(Self::NAME, RequestingService::Contracts),
                contract.ukprn,
                &CONTRACT_ROLES,
                EmailMessageType::ContractReadyToReview,
                || Ok(contract_fields(&contract)),
            )
            .await
    }
}

impl Processor for ContractWithdrawnEmailService {
    type Message = ContractWithdrawnEmailMessage;

    #[tracing::instrument(skip_all, fields(contract_id = message.contract_id))]
    async fn process<'s>(&'s self, message: Self::Message) -> anyhow::Result<Outcome> {
        let contract = fetch(self.contracts.as_ref(), message.contract_id).await?;

        let withdrawn_by = match contract.status {
            ContractStatus::WithdrawnByAgency => "agency",
            ContractStatus::WithdrawnByProvider => "provider",
            _ => return Ok(ineligible::<Self::Message>(&contract)),
        };

        self.notifier
            .notify_organisation(
                origin::<Self::Message>(Self::NAME, RequestingService::Contracts),
                contract.ukprn,
                &CONTRACT_ROLES,
                EmailMessageType::ContractWithdrawn,
                || {
                    let mut fields = contract_fields(&contract);
                    fields.insert("withdrawn_by".to_string(), withdrawn_by.into());
                    Ok(fields)
                },
            )
            .await
    }
}

impl Processor for ContractReminderEmailService {
    type Message = ContractReminderEmailMessage;

    #[tracing::instrument(skip_all, fields(contract_id = message.contract_id))]
    async fn process<'s>(&'s self, message: Self::Message) -> anyhow::Result<Outcome> {
        let contract = fetch(self.contracts.as_ref(), message.contract_id).await?;

        if !is_ready_to_sign(&contract) {
            return Ok(ineligible::<Self::Message>(&contract));
        }

        self.notifier
            .notify_organisation(
                origin::<Self::Message>(Self::NAME, RequestingService::Contracts),
                contract.ukprn,
                &[Role::SignContractsAndAgreements],
                EmailMessageType::ContractReminder,
                || Ok(contract_fields(&contract)),
            )
            .await
    }
}

impl Processor for ContractContentToBeSignedService {
    type Message = ContractContentToBeSignedMessage;

    #[tracing::instrument(
        skip_all,
        fields(
            contract_number = %message.contract_number,
            contract_version = message.contract_version,
            ukprn = message.ukprn,
        )
    )]
    async fn process<'s>(&'s self, message: Self::Message) -> anyhow::Result<Outcome> {
        let ContractContentToBeSignedMessage {
            contract_number,
            contract_version,
            ukprn,
        } = message;

        let contract = self
            .contracts
            .get_contract_by_key(&contract_number, contract_version, ukprn)
            .await
            .with_context(|| {
                format!("fetching contract {contract_number} version {contract_version}")
            })?;

        if !is_ready_to_sign(&contract) {
            return Ok(ineligible::<Self::Message>(&contract));
        }

        self.contracts
            .prepare_document_for_signing(&contract)
            .await
            .with_context(|| format!("preparing contract {} for signing", contract.id))?;
        tracing::info!(contract_id = contract.id, "prepared contract document for signing");

        let entry = AuditEntry::new(
            format!(
                "{} processed and contract [{contract_number}] version [{contract_version}] prepared for signing.",
                ContractContentToBeSignedMessage::MESSAGE_TYPE
            ),
            Some(contract.ukprn),
            ActionType::ContractContentPrepared,
            Self::NAME,
            Severity::Information,
        );
        self.notifier
            .audit_sink()
            .audit(&entry)
            .await
            .context("auditing prepared contract")?;

        Ok(Outcome::Updated)
    }
}
