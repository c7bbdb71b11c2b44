use tokio_util::sync::CancellationToken;

use crate::field::resolve_declared;
use crate::table::ActionTable;
use crate::{BoxFutureSend, FieldKey, Fields, InvalidFieldReference, PresenceSet};

#[cfg(test)]
mod tests;

/// Async update action: returns a future the dispatcher awaits before moving on.
pub type AsyncUpdateAction<S, D, E> =
	Box<dyn for<'a> Fn(&'a S, &'a mut D) -> BoxFutureSend<'a, Result<(), E>> + Send + Sync>;

/// Failure of an async application.
#[derive(Debug, thiserror::Error)]
pub enum ApplyError<E> {
	/// An action failed; carries its error unchanged.
	#[error(transparent)]
	Action(E),
	/// Cancellation was observed before every present action ran.
	#[error("update cancelled after {applied} action(s)")]
	Cancelled {
		/// Actions that completed before cancellation.
		applied: usize,
	},
}

impl<E> ApplyError<E> {
	pub fn is_cancelled(&self) -> bool {
		matches!(self, Self::Cancelled { .. })
	}

	/// Returns the action error, if that is what stopped the application.
	pub fn into_action(self) -> Option<E> {
		match self {
			Self::Action(err) => Some(err),
			Self::Cancelled { .. } => None,
		}
	}
}

/// [`crate::PartialUpdater`] counterpart whose actions are asynchronous.
///
/// Actions still run one at a time in presence order; each future is awaited
/// to completion before the next action is invoked.
pub struct AsyncPartialUpdater<S, D, E> {
	table: ActionTable<AsyncUpdateAction<S, D, E>>,
}

impl<S, D, E> Default for AsyncPartialUpdater<S, D, E> {
	fn default() -> Self {
		Self {
			table: ActionTable::default(),
		}
	}
}

impl<S, D, E> AsyncPartialUpdater<S, D, E> {
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers `action` for the field identifier `field`, replacing any
	/// earlier action for it.
	///
	/// ```ignore
	/// updater.register("title", |input, book| {
	///     Box::pin(async move {
	///         book.title = lookup_title(&input.title).await?;
	///         Ok(())
	///     })
	/// });
	/// ```
	pub fn register<F>(&mut self, field: impl Into<Box<str>>, action: F) -> &mut Self
	where
		F: for<'a> Fn(&'a S, &'a mut D) -> BoxFutureSend<'a, Result<(), E>> + Send + Sync + 'static,
	{
		self.table.insert(field.into(), Box::new(action));
		self
	}

	pub fn register_field<F>(&mut self, field: FieldKey<S>, action: F) -> &mut Self
	where
		F: for<'a> Fn(&'a S, &'a mut D) -> BoxFutureSend<'a, Result<(), E>> + Send + Sync + 'static,
	{
		self.register(field.name(), action)
	}

	/// Registers `action` for the field named by a structural accessor.
	///
	/// # Errors
	///
	/// Returns [`InvalidFieldReference`] under the same rules as
	/// [`crate::PartialUpdater::register_accessor`].
	pub fn register_accessor<F>(&mut self, accessor: &str, action: F) -> Result<&mut Self, InvalidFieldReference>
	where
		S: Fields,
		F: for<'a> Fn(&'a S, &'a mut D) -> BoxFutureSend<'a, Result<(), E>> + Send + Sync + 'static,
	{
		let field = resolve_declared::<S>(accessor)?;
		Ok(self.register(field, action))
	}

	/// Runs the action of every present field that has one, in presence order.
	///
	/// `cancel` is checked before each action and raced against the running
	/// one. Once it fires no further action is started and
	/// [`ApplyError::Cancelled`] is returned; the interrupted action's future is
	/// dropped. An action error aborts the remaining actions.
	pub async fn apply(
		&self,
		source: &S,
		destination: &mut D,
		present: &PresenceSet,
		cancel: &CancellationToken,
	) -> Result<(), ApplyError<E>> {
		let mut applied = 0;
		for field in present {
			if cancel.is_cancelled() {
				tracing::debug!(field, applied, "partial.apply.cancelled");
				return Err(ApplyError::Cancelled { applied });
			}
			let Some(action) = self.table.get(field) else {
				tracing::trace!(field, "partial.apply.unregistered");
				continue;
			};
			tracing::trace!(field, "partial.apply.invoke");
			tokio::select! {
				biased;
				() = cancel.cancelled() => {
					tracing::debug!(field, applied, "partial.apply.cancelled");
					return Err(ApplyError::Cancelled { applied });
				}
				result = action(source, destination) => {
					if let Err(err) = result {
						tracing::debug!(field, "partial.apply.failed");
						return Err(ApplyError::Action(err));
					}
				}
			}
			applied += 1;
		}
		Ok(())
	}

	pub fn contains(&self, field: &str) -> bool {
		self.table.contains(field)
	}

	pub fn len(&self) -> usize {
		self.table.len()
	}

	pub fn is_empty(&self) -> bool {
		self.table.is_empty()
	}

	pub fn fields(&self) -> impl Iterator<Item = &str> {
		self.table.fields()
	}
}
