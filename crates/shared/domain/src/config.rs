use serde::{Deserialize, Serialize};
use std::fmt;

/// Document-store connection descriptor (`database.<name>`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseDescriptor {
    pub uri: String,
}

impl DatabaseDescriptor {
    #[must_use]
    pub fn new(uri: impl Into<String>) -> Self {
        Self { uri: uri.into() }
    }

    /// Scheme part of the URI (`mem` for `mem://blog`), if any.
    #[must_use]
    pub fn scheme(&self) -> Option<&str> {
        self.uri.split_once("://").map(|(scheme, _)| scheme)
    }
}

/// Mail transport descriptor (`mailer.<name>`).
#[derive(Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MailerDescriptor {
    /// Well-known provider (`gmail`, `outlook`, ...), a literal SMTP host, or `memory`.
    pub service: String,
    /// Sender address, also used as the SMTP username.
    pub address: String,
    pub password: String,
    /// Check the relay connection while establishing the transport instead of on first send.
    pub verify: bool,
}

impl MailerDescriptor {
    #[must_use]
    pub fn new(
        service: impl Into<String>,
        address: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            service: service.into(),
            address: address.into(),
            password: password.into(),
            verify: false,
        }
    }
}

impl fmt::Debug for MailerDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MailerDescriptor")
            .field("service", &self.service)
            .field("address", &self.address)
            .field("password", &"***")
            .field("verify", &self.verify)
            .finish()
    }
}
