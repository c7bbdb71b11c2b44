use anyhow::Context;
use partial_dispatch::{Fields, InvalidFieldReference, PartialUpdater, field};
use partial_presence::{Patch, PresenceOptions};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The only book the demo knows about.
pub const BOOK_ID: u32 = 17;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Book {
	pub id: u32,
	pub title: String,
	pub author: String,
	pub edition: u32,
}

impl Book {
	pub fn seeded() -> Self {
		Self {
			id: BOOK_ID,
			title: "Animal Farm".into(),
			author: "George Orwell".into(),
			edition: 4,
		}
	}
}

/// Input of the `updateBook` mutation.
///
/// Every field is optional on the wire; whether it was sent at all is tracked
/// separately by the presence set.
#[derive(Debug, Default, Deserialize, Fields)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBookInput {
	#[serde(rename = "title")]
	pub differently_named_title: Option<String>,
	pub author: Option<String>,
	pub increment_edition: Option<bool>,
}

/// `{ "id": 17, "input": { ... } }`
#[derive(Debug, Deserialize)]
pub struct UpdateBook {
	pub id: u32,
	pub input: Value,
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum BookError {
	#[error("{0} may not be null")]
	NullField(&'static str),
	#[error("book not found")]
	NotFound(u32),
}

pub type BookUpdater = PartialUpdater<UpdateBookInput, Book, BookError>;

/// Builds the book updater.
///
/// Uses each registration form: a derived key constant, the `field!` macro and
/// a runtime-checked accessor.
pub fn book_updater() -> Result<BookUpdater, InvalidFieldReference> {
	let mut updater = BookUpdater::new();
	updater
		.register_field(UpdateBookInput::DIFFERENTLY_NAMED_TITLE, |input, book| {
			book.title = input
				.differently_named_title
				.clone()
				.ok_or(BookError::NullField("title"))?;
			Ok(())
		})
		.register_field(field!(UpdateBookInput, |input| input.author), |input, book| {
			book.author = input.author.clone().ok_or(BookError::NullField("author"))?;
			Ok(())
		})
		.register_accessor("|input| input.increment_edition", |input, book| {
			if input.increment_edition.unwrap_or(false) {
				book.edition += 1;
			}
			Ok(())
		})?;
	Ok(updater)
}

/// Applies an `updateBook` request to `book` and returns the updated book.
///
/// # Errors
///
/// Fails with [`BookError::NotFound`] when the request targets another book,
/// with a presence error when the input is malformed, or with the first
/// failing action's [`BookError`].
pub fn update_book(
	updater: &BookUpdater,
	mut book: Book,
	request: UpdateBook,
	options: &PresenceOptions,
) -> anyhow::Result<Book> {
	if request.id != book.id {
		return Err(BookError::NotFound(request.id).into());
	}

	let patch = Patch::<UpdateBookInput>::from_value(request.input, options).context("invalid updateBook input")?;
	tracing::debug!(id = book.id, present = patch.present().len(), "partial.demo.update");
	patch.apply_to(updater, &mut book)?;
	Ok(book)
}
