//! Outbound run notifications
//!
//! One email per terminal run, success or failure, carrying the triggering
//! message and the full cluster snapshot rendering. Delivery is
//! best-effort: incomplete email settings downgrade to a logged warning so
//! a missing SMTP relay never masks the run result.

use lettre::message::Mailbox;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{info, warn};

use crate::config::EmailSettings;
use crate::models::ClusterStatus;
use crate::utils::{FailoverError, FailoverResult};

/// Sends run-outcome emails over plain SMTP.
pub struct EmailNotifier {
    settings: EmailSettings,
}

impl EmailNotifier {
    pub fn new(settings: EmailSettings) -> Self {
        Self { settings }
    }

    /// Send a notification with the given body. Skips (with a warning)
    /// when the email settings are incomplete.
    pub async fn notify(&self, body: String) -> FailoverResult<()> {
        if !self.settings.is_complete() {
            warn!("email settings are not fully configured, no notification will be sent");
            return Ok(());
        }

        // is_complete() guarantees the fields below are present.
        let from = self.settings.from.clone().unwrap_or_default();
        let host = self.settings.smtp_host.clone().unwrap_or_default();
        let port = self.settings.smtp_port.unwrap_or(25);

        let from_mailbox: Mailbox = from.parse().map_err(|e| {
            FailoverError::Config(format!("invalid `email.from` address {from}: {e}"))
        })?;

        let mut builder = Message::builder()
            .from(from_mailbox)
            .subject(self.settings.subject.clone());

        for recipient in &self.settings.to {
            let mailbox: Mailbox = recipient.parse().map_err(|e| {
                FailoverError::Config(format!("invalid `email.to` address {recipient}: {e}"))
            })?;
            builder = builder.to(mailbox);
        }

        let message = builder
            .body(body)
            .map_err(|e| FailoverError::Smtp(e.to_string()))?;

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&host)
            .port(port)
            .build();

        mailer
            .send(message)
            .await
            .map_err(|e| FailoverError::Smtp(e.to_string()))?;

        info!(recipients = ?self.settings.to, "notification sent");
        Ok(())
    }

    /// Body for a completed failover/failback.
    pub fn success_body(primary: &str, status: &ClusterStatus) -> String {
        format!(
            "Failover procedure completed without detected errors.\n\
             Please see the output below to verify that the cluster looks healthy.\n\n\
             Current Primary Node: {primary}\n\n\
             Cluster Status:\n{status}"
        )
    }

    /// Body for a failed run, with whatever snapshot was taken last.
    pub fn failure_body(error: &FailoverError, status: Option<&ClusterStatus>) -> String {
        let rendered = status.map_or_else(
            || "(no cluster status available)".to_string(),
            ClusterStatus::to_string,
        );

        format!(
            "There was an error encountered while attempting to perform a failover on the cluster.\n\
             Failover procedures will not be performed until this is corrected. Please see the \
             error message below along with the cluster status.\n\n\
             Error Message:\n{error}\n\n\
             Cluster Status:\n{rendered}"
        )
    }
}
