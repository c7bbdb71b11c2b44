use crate::field::resolve_declared;
use crate::table::ActionTable;
use crate::{FieldKey, Fields, InvalidFieldReference, PresenceSet};


/// Update action: mutates the destination from the whole source.
///
/// An action is keyed by one field but may read any field of the source, e.g.
/// to increment a counter only when a flag is set.
pub type UpdateAction<S, D, E> = Box<dyn Fn(&S, &mut D) -> Result<(), E> + Send + Sync>;

/// Registry of update actions applied according to a [`PresenceSet`].
///
/// Build once with the chained `register*` calls, then share it read-only,
/// typically behind an `Arc`. `apply` never mutates the registry, so
/// concurrent applications against one instance need no locking.
pub struct PartialUpdater<S, D, E> {
	table: ActionTable<UpdateAction<S, D, E>>,
}

impl<S, D, E> Default for PartialUpdater<S, D, E> {
	fn default() -> Self {
		Self {
			table: ActionTable::default(),
		}
	}
}

impl<S, D, E> PartialUpdater<S, D, E> {
	/// Creates an updater with no registered actions.
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers `action` for the field identifier `field`.
	///
	/// Registering the same identifier again replaces the earlier action.
	pub fn register<F>(&mut self, field: impl Into<Box<str>>, action: F) -> &mut Self
	where
		F: Fn(&S, &mut D) -> Result<(), E> + Send + Sync + 'static,
	{
		self.table.insert(field.into(), Box::new(action));
		self
	}

	/// Registers `action` for a compile-time checked field key.
	pub fn register_field<F>(&mut self, field: FieldKey<S>, action: F) -> &mut Self
	where
		F: Fn(&S, &mut D) -> Result<(), E> + Send + Sync + 'static,
	{
		self.register(field.name(), action)
	}

	/// Registers `action` for the field named by a structural accessor such as
	/// `"|input| input.title"`.
	///
	/// # Errors
	///
	/// Returns [`InvalidFieldReference`] when the accessor is anything but a
	/// direct top-level field access, or names a field `S` does not declare.
	/// A rejected accessor leaves the registry as it was.
	pub fn register_accessor<F>(&mut self, accessor: &str, action: F) -> Result<&mut Self, InvalidFieldReference>
	where
		S: Fields,
		F: Fn(&S, &mut D) -> Result<(), E> + Send + Sync + 'static,
	{
		let field = resolve_declared::<S>(accessor)?;
		Ok(self.register(field, action))
	}

	/// Runs the action of every present field that has one, in presence order.
	///
	/// Present fields without an action are skipped. The first failing action
	/// aborts the application and its error is returned unchanged; actions that
	/// already ran are not undone.
	pub fn apply(&self, source: &S, destination: &mut D, present: &PresenceSet) -> Result<(), E> {
		let _span = tracing::trace_span!("partial.apply", present = present.len()).entered();
		for field in present {
			let Some(action) = self.table.get(field) else {
				tracing::trace!(field, "partial.apply.unregistered");
				continue;
			};
			tracing::trace!(field, "partial.apply.invoke");
			if let Err(err) = action(source, destination) {
				tracing::debug!(field, "partial.apply.failed");
				return Err(err);
			}
		}
		Ok(())
	}

	/// Returns true if an action is registered for `field`.
	pub fn contains(&self, field: &str) -> bool {
		self.table.contains(field)
	}

	pub fn len(&self) -> usize {
		self.table.len()
	}

	pub fn is_empty(&self) -> bool {
		self.table.is_empty()
	}

	/// Registered field identifiers, in no particular order.
	pub fn fields(&self) -> impl Iterator<Item = &str> {
		self.table.fields()
	}
}
