//! # Mailer Infrastructure
//!
//! Outbound mail for hub modules: the [`MailTransport`] contract, a [`MailerConnector`]
//! that turns a [`MailerDescriptor`] into a transport, and the [`Mailer`] handle modules
//! receive from the resolver.
//!
//! ## Services
//! - `gmail`, `outlook`, `yahoo`, `icloud`: SMTP relays with the descriptor's address and
//!   password as credentials.
//! - `memory`: an in-process [`MemoryTransport`] that records every message.
//! - anything else is used verbatim as the SMTP relay host.

mod error;
mod memory;
mod smtp;

pub use crate::error::{MailerError, MailerErrorExt};
pub use crate::memory::MemoryTransport;
pub use crate::smtp::SmtpTransport;

use async_trait::async_trait;
use chub_domain::config::MailerDescriptor;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::fmt::Debug;
use std::ops::Deref;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Service name selecting the recording transport.
pub const MEMORY_SERVICE: &str = "memory";

/// A plain-text message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

impl Mail {
    #[must_use]
    pub fn new(to: impl Into<String>, subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self { to: to.into(), subject: subject.into(), body: body.into() }
    }
}

#[async_trait]
pub trait MailTransport: Debug + Send + Sync {
    /// # Errors
    /// [`MailerError::Validation`] on a malformed recipient, [`MailerError::Transport`]
    /// when delivery fails.
    async fn send(&self, mail: &Mail) -> Result<(), MailerError>;

    fn as_any(&self) -> &dyn Any;
}

/// Builds transports from descriptors.
#[async_trait]
pub trait MailerConnector: Debug + Send + Sync {
    /// # Errors
    /// [`MailerError::Validation`] for an incomplete descriptor, [`MailerError::Transport`]
    /// when the eager `verify` connection check fails.
    async fn connect(
        &self,
        descriptor: &MailerDescriptor,
    ) -> Result<Arc<dyn MailTransport>, MailerError>;
}

/// Default connector: SMTP relays by service name plus the `memory` transport.
#[derive(Debug, Clone, Copy)]
pub struct ServiceConnector {
    timeout: Duration,
}

impl ServiceConnector {
    #[must_use]
    pub const fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for ServiceConnector {
    fn default() -> Self {
        Self::new(Duration::from_secs(10))
    }
}

#[async_trait]
impl MailerConnector for ServiceConnector {
    async fn connect(
        &self,
        descriptor: &MailerDescriptor,
    ) -> Result<Arc<dyn MailTransport>, MailerError> {
        if descriptor.service.trim().is_empty() {
            return Err(MailerError::Validation {
                message: "service is required".into(),
                context: None,
            });
        }
        if descriptor.service == MEMORY_SERVICE {
            return Ok(Arc::new(MemoryTransport::new(&descriptor.address)));
        }

        let transport = SmtpTransport::from_descriptor(descriptor, self.timeout)?;
        if descriptor.verify {
            transport.check_connection().await?;
        }
        Ok(Arc::new(transport))
    }
}

/// Inner state of the [`Mailer`] handle.
#[derive(Debug)]
pub struct MailerInner {
    name: String,
    service: String,
    address: String,
    transport: Arc<dyn MailTransport>,
}

impl Drop for MailerInner {
    fn drop(&mut self) {
        info!(name = %self.name, service = %self.service, "Mail transport handle dropped");
    }
}

/// An established mail transport bound to a logical name.
#[derive(Debug, Clone)]
pub struct Mailer {
    inner: Arc<MailerInner>,
}

impl Mailer {
    pub fn new(
        name: impl Into<String>,
        descriptor: &MailerDescriptor,
        transport: Arc<dyn MailTransport>,
    ) -> Self {
        Self {
            inner: Arc::new(MailerInner {
                name: name.into(),
                service: descriptor.service.clone(),
                address: descriptor.address.clone(),
                transport,
            }),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    #[must_use]
    pub fn service(&self) -> &str {
        &self.inner.service
    }

    /// Sender address of outgoing mail.
    #[must_use]
    pub fn address(&self) -> &str {
        &self.inner.address
    }

    #[must_use]
    pub fn same_as(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// The concrete transport, if it is a `T`.
    #[must_use]
    pub fn downcast_ref<T: MailTransport + 'static>(&self) -> Option<&T> {
        self.inner.transport.as_any().downcast_ref::<T>()
    }
}

impl Deref for Mailer {
    type Target = dyn MailTransport;

    fn deref(&self) -> &Self::Target {
        &*self.inner.transport
    }
}
