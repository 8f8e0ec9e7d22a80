//! Notification eligibility and dispatch.
//!
//! Each inbound event message is handled by a `Processor` which re-fetches
//! the entity it refers to, decides whether the entity's current state
//! warrants a notification, resolves the audience through the user
//! directory, publishes a `NotificationMessage` to the shared email queue and
//! writes an `AuditEntry` describing what happened.
//!
//! Processors are stateless across invocations. Delivery is at-least-once,
//! so processing the same message twice re-fetches state and may notify
//! twice; nothing here attempts to deduplicate.
//!
//! Alongside the processors live the contract reminder scan
//! (`reminders`) and the contract status change publisher (`publisher`),
//! which feed messages back into processors through the message transport.

use std::sync::Arc;

pub mod dispatch;
mod notifier;
pub mod personalization;
pub mod processors;
pub mod publisher;
pub mod reminders;
pub mod transport;

pub use dispatch::{Dispatcher, InvalidMessage, Processor};
pub use notifier::Notifier;
pub use publisher::{ContractStatusChangePublisher, StatusChange};
pub use reminders::{ContractReminderProcessingError, ContractReminderProcessingService};
pub use transport::{AuditSink, Configuration, MessageSender, NotificationQueue, TaggedMessage};

/// Outcome of processing one inbound message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The entity's current state doesn't warrant a notification.
    Skipped,
    /// A single audience was evaluated.
    Notified(Delivery),
    /// Separate sign and view-only audiences were evaluated.
    Split { sign: Delivery, view_only: Delivery },
    /// An upstream update was applied; no notification is involved.
    Updated,
}

/// Result of evaluating one audience bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Published { recipients: usize },
    NoRecipients,
}

/// Collaborators shared by all processors.
#[derive(Clone)]
pub struct Services {
    pub contracts: Arc<dyn data_api::ContractsApi>,
    pub funding_claims: Arc<dyn data_api::FundingClaimsApi>,
    pub subcontractor_declarations: Arc<dyn data_api::SubcontractorDeclarationsApi>,
    pub config: Arc<dyn Configuration>,
    pub notifier: Notifier,
}

/// Build a Dispatcher with every processor registered.
pub fn dispatcher(services: &Services) -> Dispatcher {
    use processors::*;

    let Services {
        contracts,
        funding_claims,
        subcontractor_declarations,
        config,
        notifier,
    } = services;

    Dispatcher::new()
        .register(ContractApprovedEmailService::new(contracts.clone(), notifier.clone()))
        .register(ContractReadyToSignEmailService::new(contracts.clone(), notifier.clone()))
        .register(ContractReadyToReviewEmailService::new(contracts.clone(), notifier.clone()))
        .register(ContractWithdrawnEmailService::new(contracts.clone(), notifier.clone()))
        .register(ContractReminderEmailService::new(contracts.clone(), notifier.clone()))
        .register(ContractContentToBeSignedService::new(contracts.clone(), notifier.clone()))
        .register(ContractsQueryEmailService::new(config.clone(), notifier.clone()))
        .register(ProcessContractFromFeedExceptionService::new(
            config.clone(),
            notifier.clone(),
        ))
        .register(FundingClaimReadyToSignEmailService::new(
            funding_claims.clone(),
            notifier.clone(),
        ))
        .register(FundingClaimSignedEmailService::new(
            funding_claims.clone(),
            notifier.clone(),
        ))
        .register(FundingClaimWithdrawnEmailService::new(
            funding_claims.clone(),
            notifier.clone(),
        ))
        .register(ReconciliationReadyToBeViewedEmailService::new(
            funding_claims.clone(),
            notifier.clone(),
        ))
        .register(SubcontractorDeclarationSubmittedEmailService::new(
            subcontractor_declarations.clone(),
            notifier.clone(),
        ))
}
