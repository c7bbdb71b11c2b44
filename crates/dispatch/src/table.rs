use std::collections::hash_map::Entry;

use rustc_hash::FxHashMap as HashMap;

/// Field identifier to action mapping shared by the sync and async updaters.
pub(crate) struct ActionTable<A> {
	actions: HashMap<Box<str>, A>,
}

impl<A> Default for ActionTable<A> {
	fn default() -> Self {
		Self {
			actions: HashMap::default(),
		}
	}
}

impl<A> ActionTable<A> {
	/// Stores `action` under `field`, replacing any earlier registration.
	pub fn insert(&mut self, field: Box<str>, action: A) {
		match self.actions.entry(field) {
			Entry::Occupied(mut slot) => {
				tracing::debug!(field = &**slot.key(), "partial.register.replaced");
				slot.insert(action);
			}
			Entry::Vacant(slot) => {
				tracing::trace!(field = &**slot.key(), "partial.register");
				slot.insert(action);
			}
		}
	}

	#[inline]
	pub fn get(&self, field: &str) -> Option<&A> {
		self.actions.get(field)
	}

	pub fn contains(&self, field: &str) -> bool {
		self.actions.contains_key(field)
	}

	pub fn len(&self) -> usize {
		self.actions.len()
	}

	pub fn is_empty(&self) -> bool {
		self.actions.is_empty()
	}

	pub fn fields(&self) -> impl Iterator<Item = &str> {
		self.actions.keys().map(|field| &**field)
	}
}
