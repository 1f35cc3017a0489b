use crate::{Mail, MailTransport, MailerError};
use async_trait::async_trait;
use chub_domain::config::MailerDescriptor;
use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::any::Any;
use std::fmt;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Relay host and whether it speaks STARTTLS on 587 rather than implicit TLS on 465.
fn relay_for(service: &str) -> (&str, bool) {
    match service {
        "gmail" => ("smtp.gmail.com", false),
        "outlook" | "hotmail" => ("smtp-mail.outlook.com", true),
        "yahoo" => ("smtp.mail.yahoo.com", false),
        "icloud" => ("smtp.mail.me.com", true),
        host => (host, false),
    }
}

/// SMTP relay transport.
pub struct SmtpTransport {
    host: String,
    from: Mailbox,
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl fmt::Debug for SmtpTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpTransport").field("host", &self.host).field("from", &self.from).finish()
    }
}

impl SmtpTransport {
    /// Builds the relay; no connection is opened until the first send or [`Self::check_connection`].
    ///
    /// # Errors
    /// [`MailerError::Validation`] if the sender address is malformed or the relay host is
    /// rejected.
    pub fn from_descriptor(
        descriptor: &MailerDescriptor,
        timeout: Duration,
    ) -> Result<Self, MailerError> {
        let from: Mailbox = descriptor.address.parse().map_err(|e| MailerError::Validation {
            message: format!("invalid sender address: {e}").into(),
            context: Some(descriptor.address.clone().into()),
        })?;

        let (host, starttls) = relay_for(&descriptor.service);
        let relay = if starttls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::relay(host)
        };
        let builder = relay.map_err(|e| MailerError::Validation {
            message: e.to_string().into(),
            context: Some(host.to_owned().into()),
        })?;

        let transport = builder
            .credentials(Credentials::new(descriptor.address.clone(), descriptor.password.clone()))
            .timeout(Some(timeout))
            .build();

        Ok(Self { host: host.to_owned(), from, transport })
    }

    /// Opens a connection to the relay and issues `NOOP`.
    ///
    /// # Errors
    /// [`MailerError::Transport`] if the relay is unreachable or rejects the session.
    #[instrument(skip(self), fields(host = %self.host))]
    pub async fn check_connection(&self) -> Result<(), MailerError> {
        match self.transport.test_connection().await {
            Ok(true) => Ok(()),
            Ok(false) => Err(MailerError::Transport {
                message: "relay rejected the connection".into(),
                context: Some(self.host.clone().into()),
            }),
            Err(e) => {
                warn!(error = %e, "SMTP connection check failed");
                Err(MailerError::Transport {
                    message: e.to_string().into(),
                    context: Some(self.host.clone().into()),
                })
            },
        }
    }
}

#[async_trait]
impl MailTransport for SmtpTransport {
    #[instrument(skip(self, mail), fields(host = %self.host, to = %mail.to))]
    async fn send(&self, mail: &Mail) -> Result<(), MailerError> {
        let to: Mailbox = mail.to.parse().map_err(|e| MailerError::Validation {
            message: format!("invalid recipient: {e}").into(),
            context: Some(mail.to.clone().into()),
        })?;

        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(&mail.subject)
            .header(ContentType::TEXT_PLAIN)
            .body(mail.body.clone())
            .map_err(|e| MailerError::Build { message: e.to_string().into(), context: None })?;

        self.transport.send(message).await.map_err(|e| MailerError::Transport {
            message: e.to_string().into(),
            context: Some(self.host.clone().into()),
        })?;
        debug!("Mail delivered");
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
