use rstest::rstest;

use super::*;

#[rstest]
#[case("|source| source.title", "title")]
#[case("|source: &Book| source.title", "title")]
#[case("|&source| source.edition", "edition")]
#[case("|source| (source.title)", "title")]
#[case("|source| &source.title", "title")]
#[case("|source| { source.title }", "title")]
#[case("|source| source.r#type", "type")]
#[case("|r#in| r#in.author", "author")]
#[case("|pair| pair.0", "0")]
#[case("|source| (*source).title", "title")]
fn resolves_direct_fields(#[case] accessor: &str, #[case] field: &str) {
	let resolved = resolve(accessor).expect("accessor should resolve");
	assert_eq!(resolved.field, field);
	assert!(!resolved.widened);
}

#[test]
fn single_cast_is_a_widening() {
	let resolved = resolve("|source| source.edition as u64").unwrap();
	assert_eq!(resolved.field, "edition");
	assert_eq!(resolved.binding, "source");
	assert!(resolved.widened);
}

#[rstest]
#[case("|source| &(source.edition as u64)")]
#[case("|source| (&source.edition) as u64")]
fn one_borrow_around_a_cast(#[case] accessor: &str) {
	let resolved = resolve(accessor).unwrap();
	assert_eq!(resolved.field, "edition");
	assert!(resolved.widened);
}

#[rstest]
#[case("|source| source.title.len()", Rejection::MethodCall("len".into()))]
#[case("|source| source.title.length", Rejection::NestedPath("title".into()))]
#[case("|source| source.edition + 1", Rejection::Computed)]
#[case("|source| !source.flag", Rejection::Computed)]
#[case("|source| source", Rejection::Identity)]
#[case("|source| source.clone()", Rejection::MethodCall("clone".into()))]
#[case("|source| source.title().len", Rejection::MethodCall("title".into()))]
#[case("|source| source.edition as u32 as u64", Rejection::RepeatedCast)]
#[case("|source| &&source.title", Rejection::Computed)]
#[case("|source| &mut source.title", Rejection::Computed)]
#[case("|source| &(&source.edition as u64)", Rejection::Computed)]
#[case("|source| (**source).title", Rejection::Computed)]
#[case("|source| { let t = source.title; t }", Rejection::Statements)]
#[case("|a, b| a.title", Rejection::ParameterCount(2))]
#[case("|| 1", Rejection::ParameterCount(0))]
#[case("|Book { title, .. }| title", Rejection::UnsupportedBinding)]
#[case("source.title", Rejection::NotAClosure)]
fn rejects_non_fields(#[case] accessor: &str, #[case] reason: Rejection) {
	let err = resolve(accessor).expect_err("accessor should be rejected");
	assert_eq!(err.reason, reason);
	assert_eq!(err.accessor, accessor);
}

#[test]
fn rejects_access_on_captured_value() {
	let err = resolve("|source| other.title").unwrap_err();
	assert_eq!(
		err.reason,
		Rejection::ForeignBase {
			found: "other".into(),
			binding: "source".into(),
		}
	);
}

#[test]
fn syntax_errors_are_invalid_references() {
	let err = resolve("|source| source.").unwrap_err();
	assert!(matches!(err.reason, Rejection::Syntax(_)), "got: {err:?}");
}

#[test]
fn error_message_names_the_accessor() {
	let err = resolve("  |source| source.title.len()").unwrap_err();
	assert_eq!(
		err.to_string(),
		"invalid field reference `|source| source.title.len()`: method call `len` is not a field access"
	);
}

#[test]
fn resolves_parsed_closures() {
	let closure: ExprClosure = syn::parse_quote!(|input| input.author);
	let resolved = resolve_closure(&closure).unwrap();
	assert_eq!(resolved.field, "author");
	assert_eq!(resolved.binding, "input");
}
