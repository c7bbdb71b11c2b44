use std::collections::BTreeMap;
use std::convert::Infallible;
use std::time::Duration;

use proptest::prelude::*;

use super::*;
use crate::{FieldDef, Rejection};

#[derive(Debug, Default)]
struct Input {
	title: Option<String>,
	bump: bool,
}

impl Fields for Input {
	const FIELDS: &'static [FieldDef] = &[FieldDef::new("title"), FieldDef::new("bump")];
}

#[derive(Debug, Default, PartialEq, Eq)]
struct Record {
	title: String,
	revision: u32,
	log: Vec<&'static str>,
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
#[error("{0} may not be null")]
struct NullField(&'static str);

fn record_updater() -> AsyncPartialUpdater<Input, Record, NullField> {
	let mut updater = AsyncPartialUpdater::<Input, Record, NullField>::new();
	updater
		.register("title", |input, record| {
			Box::pin(async move {
				tokio::task::yield_now().await;
				record.title = input.title.clone().ok_or(NullField("title"))?;
				record.log.push("title");
				Ok(())
			})
		})
		.register("bump", |input, record| {
			Box::pin(async move {
				if input.bump {
					record.revision += 1;
				}
				record.log.push("bump");
				Ok(())
			})
		});
	updater
}

#[tokio::test]
async fn awaits_actions_in_presence_order() {
	let input = Input {
		title: Some("Homage to Catalonia".into()),
		bump: true,
	};
	let mut record = Record::default();

	record_updater()
		.apply(&input, &mut record, &["bump", "title"].into(), &CancellationToken::new())
		.await
		.unwrap();

	assert_eq!(record.title, "Homage to Catalonia");
	assert_eq!(record.revision, 1);
	assert_eq!(record.log, ["bump", "title"]);
}

#[tokio::test]
async fn action_error_is_returned_unchanged() {
	let input = Input {
		title: None,
		bump: true,
	};
	let mut record = Record::default();

	let err = record_updater()
		.apply(&input, &mut record, &["title", "bump"].into(), &CancellationToken::new())
		.await
		.unwrap_err();

	assert_eq!(err.into_action(), Some(NullField("title")));
	assert_eq!(record.revision, 0);
	assert!(record.log.is_empty());
}

#[tokio::test]
async fn cancelled_before_apply_runs_nothing() {
	let cancel = CancellationToken::new();
	cancel.cancel();
	let mut record = Record::default();

	let err = record_updater()
		.apply(&Input::default(), &mut record, &["bump"].into(), &cancel)
		.await
		.unwrap_err();

	assert!(matches!(err, ApplyError::Cancelled { applied: 0 }));
	assert_eq!(record, Record::default());
}

#[tokio::test]
async fn cancellation_interrupts_a_pending_action() {
	let mut updater = AsyncPartialUpdater::<Input, Record, Infallible>::new();
	updater
		.register("bump", |_, record| {
			Box::pin(async move {
				record.revision += 1;
				Ok(())
			})
		})
		.register("title", |_, _| Box::pin(std::future::pending::<Result<(), Infallible>>()));
	let cancel = CancellationToken::new();
	let trigger = cancel.clone();
	tokio::spawn(async move {
		tokio::time::sleep(Duration::from_millis(10)).await;
		trigger.cancel();
	});
	let mut record = Record::default();

	let err = updater
		.apply(&Input::default(), &mut record, &["bump", "title"].into(), &cancel)
		.await
		.unwrap_err();

	assert!(err.is_cancelled());
	assert!(matches!(err, ApplyError::Cancelled { applied: 1 }));
	assert_eq!(record.revision, 1);
}

#[tokio::test]
async fn unregistered_fields_are_skipped() {
	let mut record = Record::default();

	record_updater()
		.apply(&Input::default(), &mut record, &["isbn"].into(), &CancellationToken::new())
		.await
		.unwrap();

	assert_eq!(record, Record::default());
}

#[test]
fn cancelled_error_message() {
	let err = ApplyError::<NullField>::Cancelled { applied: 2 };
	assert_eq!(err.to_string(), "update cancelled after 2 action(s)");
	let err = ApplyError::Action(NullField("author"));
	assert_eq!(err.to_string(), "author may not be null");
}

#[tokio::test]
async fn absent_registered_fields_do_not_run() {
	let input = Input {
		title: Some("Burmese Days".into()),
		bump: true,
	};
	let mut record = Record::default();

	record_updater()
		.apply(&input, &mut record, &["title"].into(), &CancellationToken::new())
		.await
		.unwrap();

	assert_eq!(record.log, ["title"]);
	assert_eq!(record.revision, 0);
}

#[tokio::test]
async fn reregistration_keeps_the_last_action() {
	let mut updater = record_updater();
	updater.register("bump", |_, record| {
		Box::pin(async move {
			record.revision += 10;
			record.log.push("bump-again");
			Ok(())
		})
	});
	let mut record = Record::default();

	updater
		.apply(&Input::default(), &mut record, &["bump"].into(), &CancellationToken::new())
		.await
		.unwrap();

	assert_eq!(record.revision, 10);
	assert_eq!(record.log, ["bump-again"]);
	assert_eq!(updater.len(), 2);
}

#[tokio::test]
async fn accessor_and_typed_key_registration() {
	const BUMP: FieldKey<Input> = FieldKey::new("bump");
	let mut updater = AsyncPartialUpdater::<Input, Record, NullField>::new();
	updater
		.register_accessor("|input| input.title", |input, record| {
			Box::pin(async move {
				record.title = input.title.clone().ok_or(NullField("title"))?;
				Ok(())
			})
		})
		.unwrap()
		.register_field(BUMP, |_, record| {
			Box::pin(async move {
				record.revision += 1;
				Ok(())
			})
		});
	let input = Input {
		title: Some("Keep the Aspidistra Flying".into()),
		bump: false,
	};
	let mut record = Record::default();

	updater
		.apply(&input, &mut record, &["title", "bump"].into(), &CancellationToken::new())
		.await
		.unwrap();

	assert_eq!(record.title, "Keep the Aspidistra Flying");
	assert_eq!(record.revision, 1);
	assert!(updater.contains("title"));
}

#[test]
fn accessor_rejections_leave_registry_untouched() {
	let mut updater = record_updater();

	let err = updater
		.register_accessor("|input| input.title.len()", |_, _| Box::pin(async { Ok(()) }))
		.err()
		.expect("method call should be rejected");
	assert_eq!(err.reason, Rejection::MethodCall("len".into()));

	let err = updater
		.register_accessor("|input| input.isbn", |_, _| Box::pin(async { Ok(()) }))
		.err()
		.expect("undeclared field should be rejected");
	assert!(matches!(&err.reason, Rejection::UnknownField { field, .. } if field == "isbn"));

	let mut fields: Vec<_> = updater.fields().collect();
	fields.sort_unstable();
	assert_eq!(fields, ["bump", "title"]);
}

const UNIVERSE: [&str; 5] = ["title", "author", "edition", "isbn", "pages"];

type Counts = BTreeMap<&'static str, usize>;

proptest! {
	#[test]
	fn awaits_each_present_registered_field_once(
		registered in proptest::sample::subsequence(UNIVERSE.to_vec(), 0..=UNIVERSE.len()),
		present in proptest::collection::vec(proptest::sample::select(UNIVERSE.to_vec()), 0..10),
	) {
		let mut updater = AsyncPartialUpdater::<(), Counts, Infallible>::new();
		for &field in &registered {
			updater.register(field, move |_, counts| {
				Box::pin(async move {
					*counts.entry(field).or_default() += 1;
					Ok(())
				})
			});
		}
		let presence: PresenceSet = present.iter().copied().collect();
		let mut counts = Counts::new();

		let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
		runtime
			.block_on(updater.apply(&(), &mut counts, &presence, &CancellationToken::new()))
			.unwrap();

		let expected: Counts = registered
			.iter()
			.filter(|field| presence.contains(field))
			.map(|&field| (field, 1))
			.collect();
		prop_assert_eq!(counts, expected);
	}
}
