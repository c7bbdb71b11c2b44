use indexmap::IndexSet;
use rustc_hash::FxBuildHasher;

use crate::FieldKey;

/// Field identifiers that were explicitly written in one request.
///
/// Presence is reported by whatever decoded the request, never inferred from
/// the decoded values: a field sent as `null` is present. Duplicates collapse
/// and iteration follows first insertion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PresenceSet {
	fields: IndexSet<Box<str>, FxBuildHasher>,
}

impl PresenceSet {
	/// Creates an empty presence set.
	pub fn new() -> Self {
		Self::default()
	}

	/// Marks `field` as present. Returns false if it already was.
	pub fn insert(&mut self, field: impl Into<Box<str>>) -> bool {
		self.fields.insert(field.into())
	}

	pub fn contains(&self, field: &str) -> bool {
		self.fields.contains(field)
	}

	pub fn len(&self) -> usize {
		self.fields.len()
	}

	pub fn is_empty(&self) -> bool {
		self.fields.is_empty()
	}

	/// Iterates present field identifiers in first-insertion order.
	pub fn iter(&self) -> Iter<'_> {
		Iter {
			inner: self.fields.iter(),
		}
	}
}

/// Iterator over the identifiers of a [`PresenceSet`].
pub struct Iter<'a> {
	inner: indexmap::set::Iter<'a, Box<str>>,
}

impl<'a> Iterator for Iter<'a> {
	type Item = &'a str;

	fn next(&mut self) -> Option<&'a str> {
		self.inner.next().map(|field| &**field)
	}

	fn size_hint(&self) -> (usize, Option<usize>) {
		self.inner.size_hint()
	}
}

impl ExactSizeIterator for Iter<'_> {}

impl<'a> IntoIterator for &'a PresenceSet {
	type Item = &'a str;
	type IntoIter = Iter<'a>;

	fn into_iter(self) -> Iter<'a> {
		self.iter()
	}
}

impl<'a> FromIterator<&'a str> for PresenceSet {
	fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
		let mut set = Self::new();
		set.extend(iter);
		set
	}
}

impl FromIterator<String> for PresenceSet {
	fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
		let mut set = Self::new();
		set.extend(iter);
		set
	}
}

impl<S> FromIterator<FieldKey<S>> for PresenceSet {
	fn from_iter<I: IntoIterator<Item = FieldKey<S>>>(iter: I) -> Self {
		iter.into_iter().map(|key| key.name()).collect()
	}
}

impl<'a> Extend<&'a str> for PresenceSet {
	fn extend<I: IntoIterator<Item = &'a str>>(&mut self, iter: I) {
		self.fields.extend(iter.into_iter().map(Box::from));
	}
}

impl Extend<String> for PresenceSet {
	fn extend<I: IntoIterator<Item = String>>(&mut self, iter: I) {
		self.fields.extend(iter.into_iter().map(String::into_boxed_str));
	}
}

impl<'a, const N: usize> From<[&'a str; N]> for PresenceSet {
	fn from(fields: [&'a str; N]) -> Self {
		fields.into_iter().collect()
	}
}
