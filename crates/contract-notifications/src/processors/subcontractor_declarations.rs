use super::origin;
use crate::{
    personalization::{fields, format_date, required},
    Notifier, Outcome, Processor,
};
use anyhow::Context;
use contract_models::{
    messages::SubcontractorDeclarationSubmittedEmailMessage, EmailMessageType, RequestingService,
    Role, SubmissionStatus,
};
use data_api::SubcontractorDeclarationsApi;
use std::sync::Arc;

pub struct SubcontractorDeclarationSubmittedEmailService {
    declarations: Arc<dyn SubcontractorDeclarationsApi>,
    notifier: Notifier,
}

impl SubcontractorDeclarationSubmittedEmailService {
    pub const NAME: &'static str = "SubcontractorDeclarationSubmittedEmailService";

    pub fn new(declarations: Arc<dyn SubcontractorDeclarationsApi>, notifier: Notifier) -> Self {
        Self {
            declarations,
            notifier,
        }
    }
}

impl Processor for SubcontractorDeclarationSubmittedEmailService {
    type Message = SubcontractorDeclarationSubmittedEmailMessage;

    #[tracing::instrument(
        skip_all,
        fields(subcontractor_declaration_id = message.subcontractor_declaration_id)
    )]
    async fn process<'s>(&'s self, message: Self::Message) -> anyhow::Result<Outcome> {
        let id = message.subcontractor_declaration_id;
        let declaration = self
            .declarations
            .get_full_subcontractor_declaration(id)
            .await
            .with_context(|| format!("fetching subcontractor declaration {id}"))?;

        if declaration.submission_status != SubmissionStatus::Submitted {
            tracing::error!(
                ukprn = declaration.ukprn,
                "subcontractor declaration has submission status [{:?}] which is not eligible for notification",
                declaration.submission_status,
            );
            return Ok(Outcome::Skipped);
        }

        self.notifier
            .notify_organisation(
                origin::<Self::Message>(Self::NAME, RequestingService::SubcontractorDeclarations),
                declaration.ukprn,
                &[
                    Role::ViewSubcontractorDeclarations,
                    Role::SubmitSubcontractorDeclarations,
                ],
                EmailMessageType::SubcontractorDeclarationSubmitted,
                || {
                    let submitted_at = required(declaration.submitted_at.as_ref(), "SubmittedAt")?;

                    Ok(fields([
                        ("period", declaration.period.clone().into()),
                        ("ukprn", declaration.ukprn.into()),
                        ("submitted_at", format_date(submitted_at).into()),
                        (
                            "submitted_by",
                            declaration.submitted_by_name.clone().unwrap_or_default().into(),
                        ),
                    ]))
                },
            )
            .await
    }
}
