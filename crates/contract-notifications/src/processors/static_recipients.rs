//! Processors which notify a fixed mailbox named by configuration, rather
//! than the users of an organisation.

use super::origin;
use crate::{
    notifier::published_message,
    personalization::{fields, format_date},
    transport::{required_setting, Configuration},
    Delivery, Notifier, Outcome, Processor,
};
use contract_models::{
    config_keys,
    messages::{ContractsQueryEmailMessage, FeedReadExceptionEmailMessage},
    EmailMessageType, InboundMessage, RequestingService,
};
use std::sync::Arc;

pub struct ContractsQueryEmailService {
    config: Arc<dyn Configuration>,
    notifier: Notifier,
}

impl ContractsQueryEmailService {
    pub const NAME: &'static str = "ContractsQueryEmailService";

    pub fn new(config: Arc<dyn Configuration>, notifier: Notifier) -> Self {
        Self { config, notifier }
    }
}

impl Processor for ContractsQueryEmailService {
    type Message = ContractsQueryEmailMessage;

    #[tracing::instrument(
        skip_all,
        fields(ukprn = message.ukprn, contract_number = %message.contract_number)
    )]
    async fn process<'s>(&'s self, message: Self::Message) -> anyhow::Result<Outcome> {
        let recipient = required_setting(
            self.config.as_ref(),
            config_keys::SERVICE_NOW_EMAIL_ADDRESS,
        )?;

        let ContractsQueryEmailMessage {
            ukprn,
            contract_number,
            contract_version,
            provider_name,
            query_subject,
            query_detail,
            user_name,
            user_email,
        } = message;

        let personalization = fields([
            ("ukprn", ukprn.into()),
            ("provider_name", provider_name.into()),
            ("contract_number", contract_number.into()),
            ("contract_version", contract_version.into()),
            ("query_subject", query_subject.into()),
            ("query_detail", query_detail.into()),
            ("user_name", user_name.into()),
            ("user_email", user_email.into()),
        ]);

        self.notifier
            .publish(
                origin::<Self::Message>(Self::NAME, RequestingService::Contracts),
                Some(ukprn),
                vec![recipient],
                EmailMessageType::ContractsQuery,
                personalization,
                published_message(ContractsQueryEmailMessage::MESSAGE_TYPE),
            )
            .await?;

        Ok(Outcome::Notified(Delivery::Published { recipients: 1 }))
    }
}

pub struct ProcessContractFromFeedExceptionService {
    config: Arc<dyn Configuration>,
    notifier: Notifier,
}

impl ProcessContractFromFeedExceptionService {
    pub const NAME: &'static str = "ProcessContractFromFeedExceptionService";

    pub fn new(config: Arc<dyn Configuration>, notifier: Notifier) -> Self {
        Self { config, notifier }
    }
}

impl Processor for ProcessContractFromFeedExceptionService {
    type Message = FeedReadExceptionEmailMessage;

    #[tracing::instrument(
        skip_all,
        fields(
            contract_number = %message.contract_number,
            contract_version = message.contract_version,
        )
    )]
    async fn process<'s>(&'s self, message: Self::Message) -> anyhow::Result<Outcome> {
        let recipient = required_setting(
            self.config.as_ref(),
            config_keys::CDS_USER_EXCEPTION_EMAIL,
        )?;

        let FeedReadExceptionEmailMessage {
            contract_number,
            contract_version,
            parent_contract_number,
            exception_message,
            exception_time,
        } = message;

        let personalization = fields([
            ("contract_number", contract_number.into()),
            ("contract_version", contract_version.into()),
            (
                "parent_contract_number",
                parent_contract_number.unwrap_or_default().into(),
            ),
            ("exception_message", exception_message.into()),
            ("exception_date", format_date(&exception_time).into()),
            (
                "exception_time",
                exception_time.format("%H:%M:%S").to_string().into(),
            ),
        ]);

        // Feed exceptions aren't attributable to an organisation.
        self.notifier
            .publish(
                origin::<Self::Message>(Self::NAME, RequestingService::Contracts),
                None,
                vec![recipient],
                EmailMessageType::ContractFeedReadException,
                personalization,
                published_message(FeedReadExceptionEmailMessage::MESSAGE_TYPE),
            )
            .await?;

        Ok(Outcome::Notified(Delivery::Published { recipients: 1 }))
    }
}
