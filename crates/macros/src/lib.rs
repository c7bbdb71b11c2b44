//! Procedural macros for partial updates.
//!
//! Provides:
//! * `#[derive(Fields)]` - field metadata and typed field keys for a source type
//! * `field!` - compile-time checked structural accessor

use proc_macro::TokenStream;

/// `field!` implementation.
mod accessor;
/// Fields derive implementation.
mod fields;

/// Derives `partial_dispatch::Fields` for a struct with named fields.
///
/// ```ignore
/// #[derive(Deserialize, Fields)]
/// #[serde(rename_all = "camelCase")]
/// pub struct UpdateBookInput {
///     #[serde(rename = "title")]
///     pub differently_named_title: Option<String>,
///     pub increment_edition: Option<bool>,
///     #[field(skip)]
///     pub client_mutation_id: Option<String>,
/// }
/// ```
///
/// Generates:
/// * `Fields::FIELDS` with one `FieldDef` per field, in declaration order
/// * an associated `FieldKey<Self>` constant per field (`UpdateBookInput::INCREMENT_EDITION`)
///
/// Wire names follow serde's `rename`, `rename_all` and `alias` attributes.
/// `#[field(rename = "...")]` and `#[field(alias = "...")]` take precedence.
/// `#[field(skip)]` leaves a field out of `FIELDS` but lists its wire keys in
/// `Fields::IGNORED`, so they are accepted and never reported present.
/// `#[serde(skip)]` fields are left out entirely.
#[proc_macro_derive(Fields, attributes(field))]
pub fn derive_fields(input: TokenStream) -> TokenStream {
	fields::derive_fields(input)
}

/// Builds a `FieldKey` from a structural accessor, checked at compile time.
///
/// ```ignore
/// let key = field!(UpdateBookInput, |input| input.author);
/// assert_eq!(key.name(), "author");
/// ```
///
/// The accessor must read one top-level field of its argument. Method calls,
/// nested paths and computed expressions are rejected with a compile error,
/// and the field access is type-checked against the named source type. The
/// source type must implement `Fields` and declare the field; naming a
/// `#[field(skip)]` field fails const evaluation.
#[proc_macro]
pub fn field(input: TokenStream) -> TokenStream {
	accessor::field(input)
}
