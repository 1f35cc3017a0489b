use crate::{Mail, MailTransport, MailerError};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::any::Any;
use tracing::debug;

/// Records messages instead of delivering them.
#[derive(Debug, Default)]
pub struct MemoryTransport {
    sender: String,
    outbox: Mutex<Vec<Mail>>,
}

impl MemoryTransport {
    #[must_use]
    pub fn new(sender: impl Into<String>) -> Self {
        Self { sender: sender.into(), outbox: Mutex::default() }
    }

    #[must_use]
    pub fn sender(&self) -> &str {
        &self.sender
    }

    /// Every message sent so far, oldest first.
    #[must_use]
    pub fn sent(&self) -> Vec<Mail> {
        self.outbox.lock().clone()
    }
}

#[async_trait]
impl MailTransport for MemoryTransport {
    async fn send(&self, mail: &Mail) -> Result<(), MailerError> {
        if !mail.to.contains('@') {
            return Err(MailerError::Validation {
                message: format!("invalid recipient '{}'", mail.to).into(),
                context: None,
            });
        }
        debug!(to = %mail.to, subject = %mail.subject, "Mail recorded");
        self.outbox.lock().push(mail.clone());
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
