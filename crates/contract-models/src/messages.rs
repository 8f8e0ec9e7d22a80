//! Inbound event messages. Each carries the minimum key needed to re-fetch
//! the entity it refers to, except for the two static-recipient flows which
//! carry their full payload.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// InboundMessage is implemented by every message a processor consumes.
pub trait InboundMessage:
    Serialize + serde::de::DeserializeOwned + Validate + Send + Sync + 'static
{
    /// Type tag carried alongside the message on the transport.
    const MESSAGE_TYPE: &'static str;
}

macro_rules! inbound_message {
    ($($message:ident),* $(,)?) => {
        $(
            impl InboundMessage for $message {
                const MESSAGE_TYPE: &'static str = stringify!($message);
            }
        )*
    };
}

inbound_message!(
    ContractApprovedEmailMessage,
    ContractReadyToSignEmailMessage,
    ContractReadyToReviewEmailMessage,
    ContractWithdrawnEmailMessage,
    ContractReminderEmailMessage,
    ContractContentToBeSignedMessage,
    ContractsQueryEmailMessage,
    FeedReadExceptionEmailMessage,
    FundingClaimReadyToSignEmailMessage,
    FundingClaimSignedEmailMessage,
    FundingClaimWithdrawnEmailMessage,
    ReconciliationReadyToBeViewedEmailMessage,
    SubcontractorDeclarationSubmittedEmailMessage,
);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ContractApprovedEmailMessage {
    #[validate(range(min = 1))]
    pub contract_id: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ContractReadyToSignEmailMessage {
    #[validate(range(min = 1))]
    pub contract_id: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ContractReadyToReviewEmailMessage {
    #[validate(range(min = 1))]
    pub contract_id: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ContractWithdrawnEmailMessage {
    #[validate(range(min = 1))]
    pub contract_id: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ContractReminderEmailMessage {
    #[validate(range(min = 1))]
    pub contract_id: i32,
}

/// Identifies a contract by its natural key rather than its id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ContractContentToBeSignedMessage {
    #[validate(length(min = 1))]
    pub contract_number: String,
    #[validate(range(min = 1))]
    pub contract_version: i32,
    #[validate(range(min = 1))]
    pub ukprn: i32,
}

/// A query about a contract raised by a provider user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ContractsQueryEmailMessage {
    #[validate(range(min = 1))]
    pub ukprn: i32,
    #[validate(length(min = 1))]
    pub contract_number: String,
    #[validate(range(min = 1))]
    pub contract_version: i32,
    #[serde(default)]
    pub provider_name: String,
    #[validate(length(min = 1))]
    pub query_subject: String,
    #[validate(length(min = 1))]
    pub query_detail: String,
    #[validate(length(min = 1))]
    pub user_name: String,
    #[validate(email)]
    pub user_email: String,
}

/// A contract which could not be read from the contracts feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct FeedReadExceptionEmailMessage {
    #[validate(length(min = 1))]
    pub contract_number: String,
    #[validate(range(min = 1))]
    pub contract_version: i32,
    #[serde(default)]
    pub parent_contract_number: Option<String>,
    #[validate(length(min = 1))]
    pub exception_message: String,
    pub exception_time: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct FundingClaimReadyToSignEmailMessage {
    #[validate(range(min = 1))]
    pub funding_claim_id: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct FundingClaimSignedEmailMessage {
    #[validate(range(min = 1))]
    pub funding_claim_id: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct FundingClaimWithdrawnEmailMessage {
    #[validate(range(min = 1))]
    pub funding_claim_id: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ReconciliationReadyToBeViewedEmailMessage {
    #[validate(range(min = 1))]
    pub funding_claim_id: i32,
    #[validate(range(min = 1))]
    pub reconciliation_id: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubcontractorDeclarationSubmittedEmailMessage {
    #[validate(range(min = 1))]
    pub subcontractor_declaration_id: i32,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_message_type_tags() {
        assert_eq!(
            ContractReadyToSignEmailMessage::MESSAGE_TYPE,
            "ContractReadyToSignEmailMessage"
        );
        assert_eq!(
            FeedReadExceptionEmailMessage::MESSAGE_TYPE,
            "FeedReadExceptionEmailMessage"
        );
    }

    #[test]
    fn test_default_keys_are_rejected() {
        assert!(ContractApprovedEmailMessage { contract_id: 0 }
            .validate()
            .is_err());
        assert!(ContractApprovedEmailMessage { contract_id: 7 }
            .validate()
            .is_ok());

        let natural_key = ContractContentToBeSignedMessage {
            contract_number: String::new(),
            contract_version: 1,
            ukprn: 10001234,
        };
        assert!(natural_key.validate().is_err());
    }

    #[test]
    fn test_query_requires_valid_user_email() {
        let mut query = ContractsQueryEmailMessage {
            ukprn: 10001234,
            contract_number: "AEBP-1234".to_string(),
            contract_version: 2,
            provider_name: "Test Provider".to_string(),
            query_subject: "Allocation".to_string(),
            query_detail: "Why did our allocation change?".to_string(),
            user_name: "Pat Provider".to_string(),
            user_email: "not-an-email".to_string(),
        };
        assert!(query.validate().is_err());

        query.user_email = "pat@provider.test".to_string();
        assert!(query.validate().is_ok());
    }
}
