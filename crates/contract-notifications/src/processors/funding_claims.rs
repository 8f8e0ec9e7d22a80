use super::origin;
use crate::{
    personalization::{format_date, funding_claim_fields, required},
    Notifier, Outcome, Processor,
};
use anyhow::Context;
use contract_models::{
    messages::{
        FundingClaimReadyToSignEmailMessage, FundingClaimSignedEmailMessage,
        FundingClaimWithdrawnEmailMessage, ReconciliationReadyToBeViewedEmailMessage,
    },
    EmailMessageType, FundingClaim, FundingClaimStatus, ReconciliationStatus, RequestingService,
    Role,
};
use data_api::FundingClaimsApi;
use std::sync::Arc;

const FUNDING_CLAIM_ROLES: [Role; 2] = [
    Role::ViewFundingClaimsAndReconciliationStatements,
    Role::SignFundingClaims,
];

macro_rules! funding_claim_service {
    ($($service:ident),* $(,)?) => {
        $(
            pub struct $service {
                funding_claims: Arc<dyn FundingClaimsApi>,
                notifier: Notifier,
            }

            impl $service {
                pub const NAME: &'static str = stringify!($service);

                pub fn new(funding_claims: Arc<dyn FundingClaimsApi>, notifier: Notifier) -> Self {
                    Self { funding_claims, notifier }
                }
            }
        )*
    };
}

funding_claim_service!(
    FundingClaimReadyToSignEmailService,
    FundingClaimSignedEmailService,
    FundingClaimWithdrawnEmailService,
    ReconciliationReadyToBeViewedEmailService,
);

async fn fetch(
    funding_claims: &dyn FundingClaimsApi,
    funding_claim_id: i32,
) -> anyhow::Result<FundingClaim> {
    funding_claims
        .get_funding_claim(funding_claim_id)
        .await
        .with_context(|| format!("fetching funding claim {funding_claim_id}"))
}

fn ineligible(claim: &FundingClaim, expected: FundingClaimStatus) -> Outcome {
    tracing::error!(
        funding_claim_id = claim.id,
        ukprn = claim.ukprn,
        "funding claim has status [{}] but [{expected}] is required",
        claim.status,
    );
    Outcome::Skipped
}

impl Processor for FundingClaimReadyToSignEmailService {
    type Message = FundingClaimReadyToSignEmailMessage;

    #[tracing::instrument(skip_all, fields(funding_claim_id = message.funding_claim_id))]
    async fn process<'s>(&'s self, message: Self::Message) -> anyhow::Result<Outcome> {
        let claim = fetch(self.funding_claims.as_ref(), message.funding_claim_id).await?;

        if claim.status != FundingClaimStatus::AwaitingSignature {
            return Ok(ineligible(&claim, FundingClaimStatus::AwaitingSignature));
        }

        self.notifier
            .notify_sign_and_view_only(
                origin::<Self::Message>(Self::NAME, RequestingService::FundingClaims),
                claim.ukprn,
                (
                    Role::ViewFundingClaimsAndReconciliationStatements,
                    Role::SignFundingClaims,
                ),
                (
                    EmailMessageType::FundingClaimReadyToSign,
                    EmailMessageType::FundingClaimReadyToView,
                ),
                || {
                    let close_date =
                        required(claim.signature_close_date.as_ref(), "SignatureCloseDate")?;

                    let mut fields = funding_claim_fields(&claim);
                    fields.insert(
                        "signature_close_date".to_string(),
                        format_date(close_date).into(),
                    );
                    Ok(fields)
                },
            )
            .await
    }
}

impl Processor for FundingClaimSignedEmailService {
    type Message = FundingClaimSignedEmailMessage;

    #[tracing::instrument(skip_all, fields(funding_claim_id = message.funding_claim_id))]
    async fn process<'s>(&'s self, message: Self::Message) -> anyhow::Result<Outcome> {
        let claim = fetch(self.funding_claims.as_ref(), message.funding_claim_id).await?;

        if claim.status != FundingClaimStatus::Signed {
            return Ok(ineligible(&claim, FundingClaimStatus::Signed));
        }

        self.notifier
            .notify_organisation(
                origin::<Self::Message>(Self::NAME, RequestingService::FundingClaims),
                claim.ukprn,
                &FUNDING_CLAIM_ROLES,
                EmailMessageType::FundingClaimSigned,
                || {
                    let signed_on = required(claim.signed_on.as_ref(), "SignedOn")?;

                    let mut fields = funding_claim_fields(&claim);
                    fields.insert("signed_on".to_string(), format_date(signed_on).into());
                    if let Some(signed_by) = &claim.signed_by {
                        fields.insert("signed_by".to_string(), signed_by.clone().into());
                    }
                    Ok(fields)
                },
            )
            .await
    }
}

impl Processor for FundingClaimWithdrawnEmailService {
    type Message = FundingClaimWithdrawnEmailMessage;

    #[tracing::instrument(skip_all, fields(funding_claim_id = message.funding_claim_id))]
    async fn process<'s>(&'s self, message: Self::Message) -> anyhow::Result<Outcome> {
        let claim = fetch(self.funding_claims.as_ref(), message.funding_claim_id).await?;

        if claim.status != FundingClaimStatus::Withdrawn {
            return Ok(ineligible(&claim, FundingClaimStatus::Withdrawn));
        }

        // The template depends on whether an earlier version of this claim
        // was signed before the withdrawal.
        let previously_signed = self
            .funding_claims
            .get_latest_signed_funding_claim(claim.ukprn, &claim.funding_stream_period_code)
            .await
            .with_context(|| {
                format!(
                    "fetching latest signed funding claim for period {}",
                    claim.funding_stream_period_code
                )
            })?;

        let message_type = match &previously_signed {
            Some(_) => EmailMessageType::FundingClaimWithdrawnPreviouslySigned,
            None => EmailMessageType::FundingClaimWithdrawnNotSigned,
        };

        self.notifier
            .notify_organisation(
                origin::<Self::Message>(Self::NAME, RequestingService::FundingClaims),
                claim.ukprn,
                &FUNDING_CLAIM_ROLES,
                message_type,
                || {
                    let mut fields = funding_claim_fields(&claim);
                    if let Some(signed) = &previously_signed {
                        fields.insert(
                            "signed_by".to_string(),
                            signed.signed_by.clone().unwrap_or_default().into(),
                        );
                    }
                    Ok(fields)
                },
            )
            .await
    }
}

impl Processor for ReconciliationReadyToBeViewedEmailService {
    type Message = ReconciliationReadyToBeViewedEmailMessage;

    #[tracing::instrument(
        skip_all,
        fields(
            funding_claim_id = message.funding_claim_id,
            reconciliation_id = message.reconciliation_id,
        )
    )]
    async fn process<'s>(&'s self, message: Self::Message) -> anyhow::Result<Outcome> {
        let claim = fetch(self.funding_claims.as_ref(), message.funding_claim_id).await?;

        let reconciliation = self
            .funding_claims
            .get_reconciliation(message.reconciliation_id)
            .await
            .with_context(|| format!("fetching reconciliation {}", message.reconciliation_id))?;

        let Some(reconciliation) = reconciliation else {
            tracing::error!("reconciliation was not found");
            anyhow::bail!("Error fetching reconciliation.");
        };

        if reconciliation.status != ReconciliationStatus::Published {
            tracing::error!(
                ukprn = reconciliation.ukprn,
                "reconciliation has status [{:?}] which is not eligible for notification",
                reconciliation.status,
            );
            return Ok(Outcome::Skipped);
        }

        self.notifier
            .notify_organisation(
                origin::<Self::Message>(Self::NAME, RequestingService::FundingClaims),
                reconciliation.ukprn,
                &[Role::ViewFundingClaimsAndReconciliationStatements],
                EmailMessageType::ReconciliationReadyToView,
                || {
                    let mut fields = funding_claim_fields(&claim);
                    fields.insert(
                        "reconciliation_title".to_string(),
                        reconciliation.title.clone().into(),
                    );
                    Ok(fields)
                },
            )
            .await
    }
}
