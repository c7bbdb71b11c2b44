//! Presence reporting for JSON request bodies.
//!
//! A partial update must know which fields the caller actually wrote, which a
//! decoded value alone cannot tell: an omitted `Option` field and an explicit
//! `null` both decode to `None`. [`presence_of`] answers the question from the
//! keys of the JSON object itself, and [`Patch`] pairs the decoded source with
//! that answer so it can be handed to a [`PartialUpdater`].
//!
//! ```ignore
//! let patch: Patch<UpdateBookInput> = Patch::from_slice(body, &PresenceOptions::default())?;
//! patch.apply_to(&updater, &mut book)?;
//! ```

use std::any::type_name;

use partial_dispatch::{ApplyError, AsyncPartialUpdater, CancellationToken, Fields, PartialUpdater, PresenceSet};
use serde::de::{self, DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};


/// Policy for body keys that name no field of the source type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UnknownKeys {
	/// Leave them out of the presence set.
	#[default]
	Ignore,
	/// Fail with [`PresenceError::UnknownKey`].
	Reject,
}

/// Options for computing presence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct PresenceOptions {
	pub unknown_keys: UnknownKeys,
}

impl PresenceOptions {
	/// Options that reject keys naming no field.
	pub fn strict() -> Self {
		Self {
			unknown_keys: UnknownKeys::Reject,
		}
	}
}

/// Errors reading a request body into a [`Patch`].
#[derive(Debug, thiserror::Error)]
pub enum PresenceError {
	#[error("request body must be a JSON object, found {found}")]
	NotAnObject { found: &'static str },
	#[error("unknown field `{key}` for {owner}")]
	UnknownKey { key: String, owner: &'static str },
	#[error("cannot decode {owner}: {source}")]
	Decode {
		owner: &'static str,
		#[source]
		source: serde_json::Error,
	},
}

/// Computes the presence set of a JSON object for the source type `S`.
///
/// Every key literally present in `object` counts, whatever its value,
/// including `null`. Keys are matched against the wire names and aliases in
/// `S::FIELDS` and recorded under the field identifier, in body order. Keys
/// listed in `S::IGNORED` are accepted but never recorded.
///
/// # Errors
///
/// Returns [`PresenceError::UnknownKey`] for a key naming no field when
/// `options` rejects unknown keys.
pub fn presence_of<S: Fields>(object: &Map<String, Value>, options: &PresenceOptions) -> Result<PresenceSet, PresenceError> {
	let mut present = PresenceSet::new();
	for key in object.keys() {
		if let Some(def) = S::by_wire_name(key) {
			present.insert(def.name);
			continue;
		}
		if S::is_ignored(key) {
			tracing::trace!(key = key.as_str(), "partial.presence.ignored");
			continue;
		}
		match options.unknown_keys {
			UnknownKeys::Ignore => tracing::trace!(key = key.as_str(), "partial.presence.unknown_key"),
			UnknownKeys::Reject => {
				return Err(PresenceError::UnknownKey {
					key: key.clone(),
					owner: type_name::<S>(),
				});
			}
		}
	}
	Ok(present)
}

/// A decoded source value together with the fields its request wrote.
#[derive(Debug, Clone, PartialEq)]
pub struct Patch<S> {
	value: S,
	present: PresenceSet,
}

impl<S> Patch<S> {
	pub fn new(value: S, present: PresenceSet) -> Self {
		Self { value, present }
	}

	pub fn value(&self) -> &S {
		&self.value
	}

	pub fn present(&self) -> &PresenceSet {
		&self.present
	}

	pub fn into_parts(self) -> (S, PresenceSet) {
		(self.value, self.present)
	}

	/// Applies the patch to `destination` through `updater`.
	///
	/// # Errors
	///
	/// Returns the first failing action's error unchanged.
	pub fn apply_to<D, E>(&self, updater: &PartialUpdater<S, D, E>, destination: &mut D) -> Result<(), E> {
		updater.apply(&self.value, destination, &self.present)
	}

	/// Applies the patch through an async updater, stopping early on `cancel`.
	///
	/// # Errors
	///
	/// See [`AsyncPartialUpdater::apply`].
	pub async fn apply_to_async<D, E>(
		&self,
		updater: &AsyncPartialUpdater<S, D, E>,
		destination: &mut D,
		cancel: &CancellationToken,
	) -> Result<(), ApplyError<E>> {
		updater.apply(&self.value, destination, &self.present, cancel).await
	}
}

impl<S: Fields + DeserializeOwned> Patch<S> {
	/// Decodes a patch from an already parsed JSON value.
	///
	/// # Errors
	///
	/// Fails when `value` is not an object, when it carries an unknown key that
	/// `options` rejects, or when it does not decode into `S`.
	pub fn from_value(value: Value, options: &PresenceOptions) -> Result<Self, PresenceError> {
		let object = match value {
			Value::Object(object) => object,
			other => return Err(PresenceError::NotAnObject { found: kind(&other) }),
		};
		let present = presence_of::<S>(&object, options)?;
		let value = serde_json::from_value(Value::Object(object)).map_err(decode_error::<S>)?;
		tracing::trace!(owner = type_name::<S>(), present = present.len(), "partial.presence.decoded");
		Ok(Self { value, present })
	}

	/// Decodes a patch from a raw JSON body.
	///
	/// # Errors
	///
	/// As [`Patch::from_value`], plus malformed JSON.
	pub fn from_slice(body: &[u8], options: &PresenceOptions) -> Result<Self, PresenceError> {
		let value = serde_json::from_slice(body).map_err(decode_error::<S>)?;
		Self::from_value(value, options)
	}
}

/// Decodes with default options, so a patch can sit inside a request type.
impl<'de, S: Fields + DeserializeOwned> Deserialize<'de> for Patch<S> {
	fn deserialize<De: Deserializer<'de>>(deserializer: De) -> Result<Self, De::Error> {
		let value = Value::deserialize(deserializer)?;
		Self::from_value(value, &PresenceOptions::default()).map_err(de::Error::custom)
	}
}

fn decode_error<S>(source: serde_json::Error) -> PresenceError {
	PresenceError::Decode {
		owner: type_name::<S>(),
		source,
	}
}

fn kind(value: &Value) -> &'static str {
	match value {
		Value::Null => "null",
		Value::Bool(_) => "a boolean",
		Value::Number(_) => "a number",
		Value::String(_) => "a string",
		Value::Array(_) => "an array",
		Value::Object(_) => "an object",
	}
}
