use super::{
    transport::{AuditSink, NotificationQueue},
    Delivery, Outcome,
};
use anyhow::Context;
use contract_models::{
    queues, ActionType, AuditEntry, EmailMessageType, NotificationMessage, Personalization,
    RequestingService, Role, Severity, UserContact,
};
use data_api::DirectoryClient;
use std::collections::BTreeSet;
use std::sync::Arc;

/// Notifier resolves the audience of a notification, publishes it to the
/// shared email processor queue, and audits the result.
#[derive(Clone)]
pub struct Notifier {
    directory: Arc<dyn DirectoryClient>,
    queue: Arc<dyn NotificationQueue>,
    audit: Arc<dyn AuditSink>,
}

/// Origin identifies the processor and message on whose behalf a
/// notification is sent.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Origin {
    /// Name of the processor, recorded as the audit entry's user.
    pub component: &'static str,
    /// Type tag of the inbound message being processed.
    pub message_name: &'static str,
    pub service: RequestingService,
}

impl Notifier {
    pub fn new(
        directory: Arc<dyn DirectoryClient>,
        queue: Arc<dyn NotificationQueue>,
        audit: Arc<dyn AuditSink>,
    ) -> Self {
        Self {
            directory,
            queue,
            audit,
        }
    }

    pub(crate) fn audit_sink(&self) -> &dyn AuditSink {
        self.audit.as_ref()
    }

    /// Notify every user of the organisation who holds any of `roles`.
    pub(crate) async fn notify_organisation(
        &self,
        origin: Origin,
        ukprn: i32,
        roles: &[Role],
        message_type: EmailMessageType,
        personalization: impl FnOnce() -> anyhow::Result<Personalization> + Send,
    ) -> anyhow::Result<Outcome> {
        let users = self.users(ukprn, roles).await?;

        if users.is_empty() {
            self.no_recipients(origin, ukprn, roles).await?;
            return Ok(Outcome::Notified(Delivery::NoRecipients));
        }
        let recipients: Vec<String> = users.into_iter().map(|user| user.email).collect();
        let recipient_count = recipients.len();

        self.publish(
            origin,
            Some(ukprn),
            recipients,
            message_type,
            personalization()?,
            published_message(origin.message_name),
        )
        .await?;

        Ok(Outcome::Notified(Delivery::Published {
            recipients: recipient_count,
        }))
    }

    /// Notify signers of the organisation with `sign_template`, and users
    /// who may only view with `view_template`. Users holding both roles
    /// receive only the sign notification.
    pub(crate) async fn notify_sign_and_view_only(
        &self,
        origin: Origin,
        ukprn: i32,
        (view_role, sign_role): (Role, Role),
        (sign_template, view_template): (EmailMessageType, EmailMessageType),
        personalization: impl Fn() -> anyhow::Result<Personalization> + Send,
    ) -> anyhow::Result<Outcome> {
        let users = self.users(ukprn, &[view_role, sign_role]).await?;
        let (sign, view_only) = split_audience(users, view_role, sign_role);

        let sign = if sign.is_empty() {
            self.no_recipients(origin, ukprn, &[sign_role]).await?;
            Delivery::NoRecipients
        } else {
            let recipients = sign.len();
            self.publish(
                origin,
                Some(ukprn),
                sign,
                sign_template,
                personalization()?,
                published_message(origin.message_name),
            )
            .await?;
            Delivery::Published { recipients }
        };

        let view_only = if view_only.is_empty() {
            tracing::info!(
                ukprn,
                inbound = origin.message_name,
                role = %view_role,
                "no view only users found for organisation"
            );
            Delivery::NoRecipients
        } else {
            let recipients = view_only.len();
            self.publish(
                origin,
                Some(ukprn),
                view_only,
                view_template,
                personalization()?,
                format!(
                    "{} processed and view only notification published to {}.",
                    origin.message_name,
                    queues::SHARED_EMAIL_PROCESSOR
                ),
            )
            .await?;
            Delivery::Published { recipients }
        };

        Ok(Outcome::Split { sign, view_only })
    }

    /// Publish a notification to `recipients` and audit it with
    /// `audit_message`. A failure to publish is audited on a best-effort
    /// basis before being returned.
    #[tracing::instrument(
        skip_all,
        fields(
            ukprn = ?ukprn,
            inbound = origin.message_name,
            template = %message_type,
            recipients = recipients.len(),
        )
    )]
    pub(crate) async fn publish(
        &self,
        origin: Origin,
        ukprn: Option<i32>,
        recipients: Vec<String>,
        message_type: EmailMessageType,
        personalization: Personalization,
        audit_message: String,
    ) -> anyhow::Result<()> {
        let notification = NotificationMessage {
            email_message_type: message_type,
            requesting_service: origin.service,
            email_addresses: recipients,
            personalization,
        };

        if let Err(err) = self.queue.send(&notification).await {
            let err = err.context(format!(
                "publishing {message_type} notification to {}",
                queues::SHARED_EMAIL_PROCESSOR
            ));
            tracing::error!(error = ?err, "failed to publish notification");

            let mut entry = AuditEntry::new(
                format!("{} processed", origin.message_name),
                ukprn,
                ActionType::EmailMessagePushed,
                origin.component,
                Severity::Error,
            );
            entry.append_error(format!("{err:#}"));
            self.audit.try_audit(&entry).await;

            return Err(err);
        }
        tracing::info!("published notification");

        let entry = AuditEntry::new(
            audit_message,
            ukprn,
            ActionType::EmailMessagePushed,
            origin.component,
            Severity::Information,
        );
        self.audit
            .audit(&entry)
            .await
            .context("auditing published notification")
    }

    async fn users(&self, ukprn: i32, roles: &[Role]) -> anyhow::Result<Vec<UserContact>> {
        self.directory
            .get_user_contacts(ukprn, roles)
            .await
            .with_context(|| format!("resolving users of organisation {ukprn}"))
    }

    async fn no_recipients(&self, origin: Origin, ukprn: i32, roles: &[Role]) -> anyhow::Result<()> {
        let reason = format!(
            "no users found with roles {} for organisation [{ukprn}]",
            Role::display_list(roles),
        );
        tracing::error!(inbound = origin.message_name, "{reason}");

        let mut entry = AuditEntry::new(
            format!("{} processed", origin.message_name),
            Some(ukprn),
            ActionType::EmailMessagePushed,
            origin.component,
            Severity::Information,
        );
        entry.append_error(reason);

        self.audit
            .audit(&entry)
            .await
            .context("auditing missing recipients")
    }
}

pub(crate) fn published_message(message_name: &str) -> String {
    format!(
        "{message_name} processed and published to {}.",
        queues::SHARED_EMAIL_PROCESSOR
    )
}

/// Partition `users` into the email addresses of signers, and of users who
/// can view but not sign. Emails are compared case-insensitively and each
/// address appears at most once.
fn split_audience(
    users: Vec<UserContact>,
    view_role: Role,
    sign_role: Role,
) -> (Vec<String>, Vec<String>) {
    let mut seen = BTreeSet::new();
    let mut sign = Vec::new();

    for user in users.iter().filter(|user| user.has_role(sign_role)) {
        if seen.insert(user.email.to_lowercase()) {
            sign.push(user.email.clone());
        }
    }

    let mut view_only = Vec::new();
    for user in users.into_iter().filter(|user| user.has_role(view_role)) {
        if seen.insert(user.email.to_lowercase()) {
            view_only.push(user.email);
        }
    }

    (sign, view_only)
}

#[cfg(test)]
mod test {
    use super::*;

    fn user(email: &str, roles: &[Role]) -> UserContact {
        UserContact {
            email: email.to_string(),
            first_name: String::new(),
            last_name: String::new(),
            roles: roles.iter().map(|role| role.name().to_string()).collect(),
        }
    }

    #[test]
    fn test_split_audience_is_a_set_difference() {
        let (view, sign) = (
            Role::ViewContractsAndAgreements,
            Role::SignContractsAndAgreements,
        );
        let users = vec![
            user("viewer@provider.test", &[view]),
            user("Both@Provider.test", &[view, sign]),
            user("signer@provider.test", &[sign]),
            // Same mailbox as a signer, listed with a view role only.
            user("both@provider.test", &[view]),
        ];

        let (sign_emails, view_emails) = split_audience(users, view, sign);

        assert_eq!(
            sign_emails,
            vec!["Both@Provider.test".to_string(), "signer@provider.test".to_string()]
        );
        assert_eq!(view_emails, vec!["viewer@provider.test".to_string()]);
    }
}
