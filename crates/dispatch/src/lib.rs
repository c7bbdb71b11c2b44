//! Presence-aware update dispatch.
//!
//! A [`PartialUpdater`] maps field identifiers of a source type to update
//! actions on a destination type. Applying it runs only the actions whose field
//! appears in the request's [`PresenceSet`], so a field that was omitted is left
//! alone while a field explicitly sent as `null` still reaches its action.
//!
//! ```ignore
//! let mut updater = PartialUpdater::<UpdateBookInput, Book, BookError>::new();
//! updater
//!     .register_field(UpdateBookInput::AUTHOR, |input, book| {
//!         book.author = input.author.clone().ok_or(BookError::Null("author"))?;
//!         Ok(())
//!     })
//!     .register_accessor("|input| input.increment_edition", |input, book| {
//!         if input.increment_edition.unwrap_or(false) {
//!             book.edition += 1;
//!         }
//!         Ok(())
//!     })?;
//!
//! updater.apply(&input, &mut book, &PresenceSet::from(["author"]))?;
//! ```
//!
//! Registration chains through `&mut Self`; once built the updater is only
//! read, so one instance can serve concurrent requests from behind an `Arc`.

/// Async dispatcher with cancellation.
pub mod asynchronous;
/// Field metadata and typed field keys.
pub mod field;
/// Async future aliases.
pub mod future;
/// Per-request presence sets.
pub mod presence;
mod table;
/// Synchronous dispatcher.
pub mod updater;

pub use asynchronous::{ApplyError, AsyncPartialUpdater, AsyncUpdateAction};
pub use field::{FieldDef, FieldKey, Fields};
pub use future::BoxFutureSend;
pub use partial_accessor::{InvalidFieldReference, Rejection};
#[cfg(feature = "derive")]
pub use partial_macros::{Fields, field};
pub use presence::PresenceSet;
pub use tokio_util::sync::CancellationToken;
pub use updater::{PartialUpdater, UpdateAction};
