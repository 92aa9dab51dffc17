use super::{MailError, Mailer, OutboundEmail};
use futures_util::future::BoxFuture;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::time::Duration;

/// Plain SMTP relay delivery through lettre.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
    pub fn new(
        host: &str,
        port: u16,
        username: Option<String>,
        password: Option<String>,
        timeout: Duration,
    ) -> Self {
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host)
            .port(port)
            .timeout(Some(timeout));
        if let Some(username) = username {
            builder = builder.credentials(Credentials::new(username, password.unwrap_or_default()));
        }
        Self {
            transport: builder.build(),
        }
    }
}

fn build_message(email: &OutboundEmail) -> Result<Message, MailError> {
    Ok(Message::builder()
        .from(email.from.parse::<Mailbox>()?)
        .to(email.to.parse::<Mailbox>()?)
        .subject(email.subject.clone())
        .header(ContentType::TEXT_PLAIN)
        .body(email.body.clone())?)
}

impl Mailer for SmtpMailer {
    fn send<'a>(&'a self, email: &'a OutboundEmail) -> BoxFuture<'a, Result<(), MailError>> {
        Box::pin(async move {
            let message = build_message(email)?;
            self.transport.send(message).await?;
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_carries_headers() {
        let message = build_message(&OutboundEmail {
            from: "noreply@titannexus.com".to_string(),
            to: "hello@titannexus.com".to_string(),
            subject: "New custom machinery request: RQ250101ABCD".to_string(),
            body: "Request Reference: RQ250101ABCD".to_string(),
        })
        .unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();
        assert!(raw.contains("To: hello@titannexus.com"));
        assert!(raw.contains("Subject: New custom machinery request: RQ250101ABCD"));
    }

    #[test]
    fn bad_sender_is_an_address_error() {
        let result = build_message(&OutboundEmail {
            from: "nobody".to_string(),
            to: "hello@titannexus.com".to_string(),
            subject: String::new(),
            body: String::new(),
        });
        assert!(matches!(result, Err(MailError::Address(_))));
    }
}
