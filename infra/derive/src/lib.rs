#![allow(unreachable_pub)]
#![allow(clippy::needless_pass_by_value)]

//! # Macros
//!
//! Procedural macros shared by every crate of the hub workspace.
//!
//! * [`hub_error`] turns a named-field enum into a `thiserror` error with context support.
//! * [`hub_slice`] turns a struct into a cheaply cloneable, `Arc`-backed state handle that
//!   domain modules capture inside their registered operations.
//!
//! Examples are `ignore`d because a proc-macro crate cannot use its own macros in doctests.

mod macros;

use proc_macro::TokenStream;
use syn::{DeriveInput, ItemStruct, parse_macro_input};

/// Attribute macro for defining crate-level error enums.
///
/// # Injected items
///
/// * `#[derive(Debug, thiserror::Error)]` unless already derived.
/// * A companion `<Name>Ext` trait adding `.context(...)` to `Result<T, Name>` and to
///   `Result<T, Source>` for every variant carrying a `source` field.
/// * `From<Source>` for every variant carrying a `source` field, so `?` lifts lower-layer
///   errors into this one.
/// * `From<&'static str>` and `From<String>` when an `Internal` variant exists.
/// * A private `format_context` helper for use inside `#[error(...)]` strings.
///
/// # Requirements
///
/// 1. The macro must be applied to an **enum** with named-field variants only.
/// 2. A `context` field must be typed `Option<Cow<'static, str>>`.
/// 3. Variants with a `source` field (or a field marked `#[source]`/`#[from]`) must also
///    carry a `context` field.
///
/// Only one `hub_error` enum may live in a given module because of the generated
/// `format_context` helper.
///
/// # Example
///
/// ```rust,ignore
/// use std::borrow::Cow;
///
/// #[chub_derive::hub_error]
/// pub enum StoreError {
///     #[error("Store unavailable{}: {message}", format_context(.context))]
///     Unavailable { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
///
///     #[error("IO error{}: {source}", format_context(.context))]
///     Io { source: std::io::Error, context: Option<Cow<'static, str>> },
///
///     #[error("Internal store error{}: {message}", format_context(.context))]
///     Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
/// }
///
/// fn read(path: &str) -> Result<String, StoreError> {
///     std::fs::read_to_string(path).context("Reading snapshot")
/// }
/// ```
#[proc_macro_attribute]
pub fn hub_error(_args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    macros::error::expand_derive(input).into()
}

/// Attribute macro to define a shared module state handle.
///
/// The annotated struct is renamed to `<Name>Inner`, and `<Name>` becomes a thin
/// `Arc<<Name>Inner>` wrapper with `new`, `Clone`, `Debug` and `Deref<Target = <Name>Inner>`.
/// Operations registered by a module clone the handle instead of the state.
///
/// # Example
/// ```rust,ignore
/// #[chub_derive::hub_slice]
/// pub struct Catalog {
///     pub collection: String,
/// }
///
/// let catalog = Catalog::new(CatalogInner { collection: "products".to_owned() });
/// assert_eq!(catalog.collection, "products");
/// ```
#[proc_macro_attribute]
pub fn hub_slice(_attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemStruct);
    macros::slice::expand_slice(input).into()
}
