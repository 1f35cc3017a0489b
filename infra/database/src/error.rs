use std::borrow::Cow;

/// A specialized [`DatabaseError`] enum of this crate.
#[chub_derive::hub_error]
pub enum DatabaseError {
    /// Malformed arguments: empty collection name, non-object criteria or document.
    #[error("Validation error{}: {message}", format_context(.context))]
    Validation { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// A document matching the uniqueness criteria already exists.
    #[error("Document already exists{}: {message}", format_context(.context))]
    Conflict { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// No document matched the criteria of an edit or remove.
    #[error("Document not found{}: {message}", format_context(.context))]
    NotFound { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The store could not be reached or the URI names no supported engine.
    #[error("Database connection failed{}: {message}", format_context(.context))]
    Connection { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Internal fallback for unexpected issues or logic errors.
    #[error("Internal database error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
