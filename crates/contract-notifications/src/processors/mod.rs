mod contracts;
mod funding_claims;
mod static_recipients;
mod subcontractor_declarations;

pub use contracts::{
    ContractApprovedEmailService, ContractContentToBeSignedService,
    ContractReadyToReviewEmailService, ContractReadyToSignEmailService,
    ContractReminderEmailService, ContractWithdrawnEmailService,
};
pub use funding_claims::{
    FundingClaimReadyToSignEmailService, FundingClaimSignedEmailService,
    FundingClaimWithdrawnEmailService, ReconciliationReadyToBeViewedEmailService,
};
pub use static_recipients::{ContractsQueryEmailService, ProcessContractFromFeedExceptionService};
pub use subcontractor_declarations::SubcontractorDeclarationSubmittedEmailService;

use crate::notifier::Origin;
use contract_models::{InboundMessage, RequestingService};

fn origin<M: InboundMessage>(component: &'static str, service: RequestingService) -> Origin {
    Origin {
        component,
        message_name: M::MESSAGE_TYPE,
        service,
    }
}
