use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

use partial_accessor::{InvalidFieldReference, Rejection};

/// Static description of one updatable field of a source type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldDef {
	/// Field identifier used as the registry key.
	pub name: &'static str,
	/// Key the field is written under in a request payload.
	pub wire_name: &'static str,
	/// Additional keys accepted for the field on the wire.
	pub aliases: &'static [&'static str],
}

impl FieldDef {
	/// Creates a definition whose wire name matches its identifier.
	pub const fn new(name: &'static str) -> Self {
		Self {
			name,
			wire_name: name,
			aliases: &[],
		}
	}

	/// Returns true when `key` names this field on the wire.
	pub fn matches_wire(&self, key: &str) -> bool {
		self.wire_name == key || self.aliases.iter().any(|alias| *alias == key)
	}
}

/// Source types that expose their field metadata.
///
/// Normally derived with `#[derive(Fields)]`, which also emits one
/// [`FieldKey`] constant per field.
pub trait Fields {
	/// Every updatable field, in declaration order.
	const FIELDS: &'static [FieldDef];

	/// Wire keys the source accepts but that never count as present, such as
	/// those of `#[field(skip)]` fields.
	const IGNORED: &'static [&'static str] = &[];

	/// Looks up a field by identifier.
	fn field(name: &str) -> Option<&'static FieldDef> {
		Self::FIELDS.iter().find(|def| def.name == name)
	}

	/// Looks up a field by the key it appears under in a request.
	fn by_wire_name(key: &str) -> Option<&'static FieldDef> {
		Self::FIELDS.iter().find(|def| def.matches_wire(key))
	}

	/// Returns true when `key` is accepted on the wire without naming a field.
	fn is_ignored(key: &str) -> bool {
		Self::IGNORED.iter().any(|ignored| *ignored == key)
	}
}

/// Returns true when `fields` declares the identifier `name`.
///
/// Usable in const context; `field!` asserts with it at compile time.
pub const fn declares(fields: &[FieldDef], name: &str) -> bool {
	let mut i = 0;
	while i < fields.len() {
		if str_eq(fields[i].name, name) {
			return true;
		}
		i += 1;
	}
	false
}

const fn str_eq(a: &str, b: &str) -> bool {
	let (a, b) = (a.as_bytes(), b.as_bytes());
	if a.len() != b.len() {
		return false;
	}
	let mut i = 0;
	while i < a.len() {
		if a[i] != b[i] {
			return false;
		}
		i += 1;
	}
	true
}

/// Typed handle to a top-level field of `S`.
///
/// Keys are produced by `#[derive(Fields)]` constants or the `field!` macro,
/// both of which check the field against `S` at compile time.
pub struct FieldKey<S> {
	name: &'static str,
	_source: PhantomData<fn() -> S>,
}

impl<S> FieldKey<S> {
	/// Creates a key for the field identifier `name`.
	pub const fn new(name: &'static str) -> Self {
		Self {
			name,
			_source: PhantomData,
		}
	}

	/// Returns the field identifier.
	pub const fn name(&self) -> &'static str {
		self.name
	}
}

impl<S> Clone for FieldKey<S> {
	fn clone(&self) -> Self {
		*self
	}
}

impl<S> Copy for FieldKey<S> {}

impl<S> PartialEq for FieldKey<S> {
	fn eq(&self, other: &Self) -> bool {
		self.name == other.name
	}
}

impl<S> Eq for FieldKey<S> {}

impl<S> Hash for FieldKey<S> {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.name.hash(state);
	}
}

impl<S> fmt::Debug for FieldKey<S> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("FieldKey").field(&self.name).finish()
	}
}

/// Resolves a structural accessor and checks the field is declared on `S`.
pub(crate) fn resolve_declared<S: Fields>(accessor: &str) -> Result<&'static str, InvalidFieldReference> {
	let resolved = partial_accessor::resolve(accessor)?;
	match S::field(&resolved.field) {
		Some(def) => Ok(def.name),
		None => Err(InvalidFieldReference::new(
			accessor,
			Rejection::UnknownField {
				field: resolved.field,
				owner: std::any::type_name::<S>(),
			},
		)),
	}
}
