//! Outbound email about new quote requests.
//!
//! Sending is best effort. [`Notifier::notify_new_request`] never returns an
//! error; it reports a [`NotificationOutcome`] instead, bounded by the
//! configured timeout, and logs failures with the request reference.

mod smtp;

pub use smtp::SmtpMailer;

use crate::config::Config;
use common::model::custom_request::CustomRequest;
use futures_util::future::BoxFuture;
use log::{info, warn};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

const NOT_PROVIDED: &str = "Provided on follow-up";

#[derive(Error, Debug)]
pub enum MailError {
    #[error("invalid address: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("could not build message: {0}")]
    Build(#[from] lettre::error::Error),

    #[error("smtp transport failed: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),
}

/// A plaintext message ready to hand to a [`Mailer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundEmail {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
}

pub trait Mailer: Send + Sync {
    fn send<'a>(&'a self, email: &'a OutboundEmail) -> BoxFuture<'a, Result<(), MailError>>;
}

/// Writes messages to the log instead of delivering them.
pub struct ConsoleMailer;

impl Mailer for ConsoleMailer {
    fn send<'a>(&'a self, email: &'a OutboundEmail) -> BoxFuture<'a, Result<(), MailError>> {
        Box::pin(async move {
            info!(
                "Email from {} to {}\nSubject: {}\n\n{}",
                email.from, email.to, email.subject, email.body
            );
            Ok(())
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationOutcome {
    Sent,
    /// No recipient is configured.
    Skipped,
    Failed(String),
}

pub struct Notifier {
    mailer: Arc<dyn Mailer>,
    from: String,
    recipient: Option<String>,
    timeout: Duration,
}

impl Notifier {
    pub fn new(
        mailer: Arc<dyn Mailer>,
        from: impl Into<String>,
        recipient: Option<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            mailer,
            from: from.into(),
            recipient: recipient.filter(|r| !r.trim().is_empty()),
            timeout,
        }
    }

    /// SMTP delivery when a relay is configured, the log otherwise.
    pub fn from_config(config: &Config) -> Self {
        let mailer: Arc<dyn Mailer> = match config.smtp_host.as_deref() {
            Some(host) if !host.trim().is_empty() => Arc::new(SmtpMailer::new(
                host.trim(),
                config.smtp_port,
                config.smtp_username.clone(),
                config.smtp_password.clone(),
                config.mail_timeout(),
            )),
            _ => Arc::new(ConsoleMailer),
        };
        Self::new(
            mailer,
            config.default_from_email.clone(),
            Some(config.contact_email.clone()),
            config.mail_timeout(),
        )
    }

    pub async fn notify_new_request(&self, request: &CustomRequest) -> NotificationOutcome {
        let Some(recipient) = self.recipient.as_deref() else {
            return NotificationOutcome::Skipped;
        };
        let email = new_request_email(request, &self.from, recipient);
        let outcome = match tokio::time::timeout(self.timeout, self.mailer.send(&email)).await {
            Ok(Ok(())) => NotificationOutcome::Sent,
            Ok(Err(e)) => NotificationOutcome::Failed(e.to_string()),
            Err(_) => NotificationOutcome::Failed(format!(
                "timed out after {}s",
                self.timeout.as_secs_f32()
            )),
        };
        if let NotificationOutcome::Failed(reason) = &outcome {
            warn!(
                "Notification for request {} failed: {}",
                request.reference_code, reason
            );
        }
        outcome
    }
}

/// The message sent to the sales inbox for a new request.
pub fn new_request_email(request: &CustomRequest, from: &str, to: &str) -> OutboundEmail {
    let or_later = |value: &str| {
        if value.is_empty() {
            NOT_PROVIDED.to_string()
        } else {
            value.to_string()
        }
    };
    let lines = [
        format!("Request Reference: {}", request.reference_code),
        format!("Company: {}", request.company_name),
        format!("Contact: {} ({})", request.contact_name, request.email),
        format!("Machine Type: {}", request.machine_type),
        format!("Budget: {}", request.budget_display()),
        String::new(),
        format!("Project Location: {}", or_later(&request.project_location)),
        format!("Timeline: {}", or_later(&request.deployment_timeline)),
        String::new(),
        "Description:".to_string(),
        request.description.clone(),
    ];
    OutboundEmail {
        from: from.to_string(),
        to: to.to_string(),
        subject: format!("New custom machinery request: {}", request.reference_code),
        body: lines.join("\n"),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::Utc;
    use common::model::custom_request::RequestStatus;
    use rust_decimal::Decimal;
    use std::sync::Mutex;

    /// Keeps every message it is asked to send.
    #[derive(Default)]
    pub(crate) struct RecordingMailer {
        pub(crate) sent: Mutex<Vec<OutboundEmail>>,
    }

    impl Mailer for RecordingMailer {
        fn send<'a>(&'a self, email: &'a OutboundEmail) -> BoxFuture<'a, Result<(), MailError>> {
            Box::pin(async move {
                self.sent.lock().unwrap().push(email.clone());
                Ok(())
            })
        }
    }

    /// Rejects every message as undeliverable.
    pub(crate) struct FailingMailer;

    impl Mailer for FailingMailer {
        fn send<'a>(&'a self, _email: &'a OutboundEmail) -> BoxFuture<'a, Result<(), MailError>> {
            Box::pin(async move {
                "relay refused".parse::<lettre::Address>()?;
                Ok(())
            })
        }
    }

    /// Never finishes within any sane timeout.
    pub(crate) struct StalledMailer;

    impl Mailer for StalledMailer {
        fn send<'a>(&'a self, _email: &'a OutboundEmail) -> BoxFuture<'a, Result<(), MailError>> {
            Box::pin(async move {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok(())
            })
        }
    }

    fn request() -> CustomRequest {
        let now = Utc::now();
        CustomRequest {
            id: 1,
            reference_code: "RQ250101ABCD".to_string(),
            contact_name: "Jane Doe".to_string(),
            company_name: "Acme Mills".to_string(),
            email: "jane@acme-mills.com".to_string(),
            phone: String::new(),
            industry_id: None,
            machine_type: "Roller mill".to_string(),
            capacity_requirement: String::new(),
            budget_min: Some(Decimal::new(50000, 0)),
            budget_max: None,
            currency: "USD".to_string(),
            project_location: "Karachi".to_string(),
            deployment_timeline: String::new(),
            description: "Two shifts.".to_string(),
            attachment: None,
            preferred_contact_method: String::new(),
            status: RequestStatus::New,
            internal_notes: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn email_lists_the_request_summary() {
        let email = new_request_email(&request(), "noreply@titannexus.com", "hello@titannexus.com");
        assert_eq!(email.subject, "New custom machinery request: RQ250101ABCD");
        assert_eq!(
            email.body,
            "Request Reference: RQ250101ABCD\n\
             Company: Acme Mills\n\
             Contact: Jane Doe (jane@acme-mills.com)\n\
             Machine Type: Roller mill\n\
             Budget: USD 50000.00 - —\n\
             \n\
             Project Location: Karachi\n\
             Timeline: Provided on follow-up\n\
             \n\
             Description:\n\
             Two shifts."
        );
    }

    #[actix_web::test]
    async fn outcomes() {
        let recorder = Arc::new(RecordingMailer::default());
        let notifier = Notifier::new(
            recorder.clone(),
            "noreply@titannexus.com",
            Some("hello@titannexus.com".to_string()),
            Duration::from_secs(1),
        );
        assert_eq!(
            notifier.notify_new_request(&request()).await,
            NotificationOutcome::Sent
        );
        assert_eq!(recorder.sent.lock().unwrap().len(), 1);

        let silent = Notifier::new(recorder.clone(), "noreply@titannexus.com", Some(" ".into()), Duration::from_secs(1));
        assert_eq!(
            silent.notify_new_request(&request()).await,
            NotificationOutcome::Skipped
        );

        let broken = Notifier::new(
            Arc::new(FailingMailer),
            "noreply@titannexus.com",
            Some("hello@titannexus.com".into()),
            Duration::from_secs(1),
        );
        assert!(matches!(
            broken.notify_new_request(&request()).await,
            NotificationOutcome::Failed(_)
        ));

        let slow = Notifier::new(
            Arc::new(StalledMailer),
            "noreply@titannexus.com",
            Some("hello@titannexus.com".into()),
            Duration::from_millis(20),
        );
        assert!(matches!(
            slow.notify_new_request(&request()).await,
            NotificationOutcome::Failed(reason) if reason.starts_with("timed out")
        ));
    }
}
