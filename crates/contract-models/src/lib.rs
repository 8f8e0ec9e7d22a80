//! Wire types shared by the contract notification processors: snapshots of
//! upstream entities, inbound event messages, outbound notifications and
//! audit entries.
//!
//! String values which cross a process boundary (message-type tags, role
//! names, queue names, configuration keys) are modeled as closed enums and
//! mapped to their wire form by a `name()` accessor, so that the literal
//! values live in exactly one place.

pub mod audit;
pub mod contracts;
pub mod funding_claims;
pub mod messages;
pub mod notification;
pub mod subcontractor_declarations;
pub mod users;

pub use audit::{ActionType, AuditEntry, Severity};
pub use contracts::{
    Contract, ContractAmendmentType, ContractFundingType, ContractReminderItem,
    ContractReminders, ContractStatus,
};
pub use funding_claims::{FundingClaim, FundingClaimStatus, Reconciliation, ReconciliationStatus};
pub use messages::InboundMessage;
pub use notification::{EmailMessageType, NotificationMessage, Personalization, RequestingService};
pub use subcontractor_declarations::{FullSubcontractorDeclaration, SubmissionStatus};
pub use users::{Role, UserContact};

/// Names of queues which this system publishes to.
pub mod queues {
    /// Outbound queue consumed by the shared email processor.
    pub const SHARED_EMAIL_PROCESSOR: &str = "SharedEmailprocessorQueue";
    /// Queue carrying contract status change messages to the email processors.
    pub const CONTRACT_EVENTS: &str = "contract-events-queue";
    /// Queue carrying contract reminder messages to the reminder processor.
    pub const CONTRACT_REMINDERS: &str = "contract-reminders-queue";
}

/// Keys of configuration values read by processors at the time of processing.
pub mod config_keys {
    /// Mailbox which receives contract queries raised by providers.
    pub const SERVICE_NOW_EMAIL_ADDRESS: &str = "ServiceNowEmailAddress";
    /// Mailbox which receives contract feed-read exceptions.
    pub const CDS_USER_EXCEPTION_EMAIL: &str = "CdsUserExceptionEmail";
}

/// Name of the application property carrying a message's type tag.
pub const MESSAGE_TYPE_PROPERTY: &str = "MessageType";

/// Format used for dates rendered into notification personalization.
pub const PERSONALIZATION_DATE_FORMAT: &str = "%-d %B %Y";
