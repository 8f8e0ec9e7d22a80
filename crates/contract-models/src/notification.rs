use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Personalization fields which the downstream template system substitutes
/// into an email template.
pub type Personalization = BTreeMap<String, serde_json::Value>;

/// Payload published to the shared email processor queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationMessage {
    /// Selects the downstream email template.
    pub email_message_type: EmailMessageType,
    pub requesting_service: RequestingService,
    pub email_addresses: Vec<String>,
    pub personalization: Personalization,
}

/// Email templates known to the downstream email processor.
///
/// Variant names are the wire values and must never change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EmailMessageType {
    ContractSigned,
    ContractReadyToSign,
    ContractReadyToView,
    ContractReadyToReview,
    ContractWithdrawn,
    ContractReminder,
    ContractsQuery,
    ContractFeedReadException,
    FundingClaimReadyToSign,
    FundingClaimReadyToView,
    FundingClaimSigned,
    FundingClaimWithdrawnNotSigned,
    FundingClaimWithdrawnPreviouslySigned,
    ReconciliationReadyToView,
    SubcontractorDeclarationSubmitted,
}

impl EmailMessageType {
    pub fn name(&self) -> &'static str {
        match self {
            EmailMessageType::ContractSigned => "ContractSigned",
            EmailMessageType::ContractReadyToSign => "ContractReadyToSign",
            EmailMessageType::ContractReadyToView => "ContractReadyToView",
            EmailMessageType::ContractReadyToReview => "ContractReadyToReview",
            EmailMessageType::ContractWithdrawn => "ContractWithdrawn",
            EmailMessageType::ContractReminder => "ContractReminder",
            EmailMessageType::ContractsQuery => "ContractsQuery",
            EmailMessageType::ContractFeedReadException => "ContractFeedReadException",
            EmailMessageType::FundingClaimReadyToSign => "FundingClaimReadyToSign",
            EmailMessageType::FundingClaimReadyToView => "FundingClaimReadyToView",
            EmailMessageType::FundingClaimSigned => "FundingClaimSigned",
            EmailMessageType::FundingClaimWithdrawnNotSigned => "FundingClaimWithdrawnNotSigned",
            EmailMessageType::FundingClaimWithdrawnPreviouslySigned => {
                "FundingClaimWithdrawnPreviouslySigned"
            }
            EmailMessageType::ReconciliationReadyToView => "ReconciliationReadyToView",
            EmailMessageType::SubcontractorDeclarationSubmitted => {
                "SubcontractorDeclarationSubmitted"
            }
        }
    }

    pub fn all() -> &'static [EmailMessageType] {
        &[
            EmailMessageType::ContractSigned,
            EmailMessageType::ContractReadyToSign,
            EmailMessageType::ContractReadyToView,
            EmailMessageType::ContractReadyToReview,
            EmailMessageType::ContractWithdrawn,
            EmailMessageType::ContractReminder,
            EmailMessageType::ContractsQuery,
            EmailMessageType::ContractFeedReadException,
            EmailMessageType::FundingClaimReadyToSign,
            EmailMessageType::FundingClaimReadyToView,
            EmailMessageType::FundingClaimSigned,
            EmailMessageType::FundingClaimWithdrawnNotSigned,
            EmailMessageType::FundingClaimWithdrawnPreviouslySigned,
            EmailMessageType::ReconciliationReadyToView,
            EmailMessageType::SubcontractorDeclarationSubmitted,
        ]
    }
}

impl std::fmt::Display for EmailMessageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Service on whose behalf a notification is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestingService {
    Contracts,
    FundingClaims,
    SubcontractorDeclarations,
}

impl RequestingService {
    pub fn name(&self) -> &'static str {
        match self {
            RequestingService::Contracts => "Contracts",
            RequestingService::FundingClaims => "FundingClaims",
            RequestingService::SubcontractorDeclarations => "SubcontractorDeclarations",
        }
    }
}

impl std::fmt::Display for RequestingService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
