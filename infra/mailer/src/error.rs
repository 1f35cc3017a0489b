use std::borrow::Cow;

/// A specialized [`MailerError`] enum of this crate.
#[chub_derive::hub_error]
pub enum MailerError {
    /// Incomplete descriptor or a malformed address.
    #[error("Mailer validation error{}: {message}", format_context(.context))]
    Validation { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The relay could not be reached or refused the message.
    #[error("Mail transport error{}: {message}", format_context(.context))]
    Transport { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The message could not be assembled.
    #[error("Mail build error{}: {message}", format_context(.context))]
    Build { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Internal fallback for unexpected issues or logic errors.
    #[error("Internal mailer error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
