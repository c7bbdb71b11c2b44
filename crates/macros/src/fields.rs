use heck::{ToKebabCase, ToLowerCamelCase, ToShoutyKebabCase, ToShoutySnakeCase, ToUpperCamelCase};
use proc_macro::TokenStream;
use quote::{format_ident, quote};
use syn::ext::IdentExt;
use syn::punctuated::Punctuated;
use syn::{Attribute, Data, DeriveInput, Expr, Lit, LitStr, Meta, Token, parse_macro_input};

/// serde's `rename_all` rules, applied to snake_case field names.
#[derive(Clone, Copy)]
enum RenameRule {
	Lower,
	Upper,
	Pascal,
	Camel,
	Snake,
	ScreamingSnake,
	Kebab,
	ScreamingKebab,
}

impl RenameRule {
	fn parse(lit: &LitStr) -> syn::Result<Self> {
		Ok(match lit.value().as_str() {
			"lowercase" => Self::Lower,
			"UPPERCASE" => Self::Upper,
			"PascalCase" => Self::Pascal,
			"camelCase" => Self::Camel,
			"snake_case" => Self::Snake,
			"SCREAMING_SNAKE_CASE" => Self::ScreamingSnake,
			"kebab-case" => Self::Kebab,
			"SCREAMING-KEBAB-CASE" => Self::ScreamingKebab,
			other => return Err(syn::Error::new_spanned(lit, format!("unknown rename rule `{other}`"))),
		})
	}

	fn apply(self, field: &str) -> String {
		match self {
			Self::Lower => field.to_ascii_lowercase(),
			Self::Upper => field.to_ascii_uppercase(),
			Self::Pascal => field.to_upper_camel_case(),
			Self::Camel => field.to_lower_camel_case(),
			Self::Snake => field.to_owned(),
			Self::ScreamingSnake => field.to_shouty_snake_case(),
			Self::Kebab => field.to_kebab_case(),
			Self::ScreamingKebab => field.to_shouty_kebab_case(),
		}
	}
}

#[derive(Default)]
struct FieldAttrs {
	rename: Option<String>,
	serde_rename: Option<String>,
	aliases: Vec<String>,
	/// `#[field(skip)]`: still decoded, never present.
	ignore: bool,
	/// `#[serde(skip)]`: not read from the wire at all.
	skip: bool,
}

pub fn derive_fields(input: TokenStream) -> TokenStream {
	let input = parse_macro_input!(input as DeriveInput);
	match expand(&input) {
		Ok(tokens) => tokens.into(),
		Err(err) => err.to_compile_error().into(),
	}
}

fn expand(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
	let name = &input.ident;

	let Data::Struct(data) = &input.data else {
		return Err(syn::Error::new_spanned(name, "Fields can only be derived for structs"));
	};
	let syn::Fields::Named(named) = &data.fields else {
		return Err(syn::Error::new_spanned(name, "Fields requires a struct with named fields"));
	};

	let rename_all = container_rename_all(&input.attrs)?;

	let mut defs = Vec::new();
	let mut ignored = Vec::new();
	let mut keys = Vec::new();
	for field in &named.named {
		let Some(ident) = &field.ident else {
			continue;
		};
		let attrs = parse_field_attrs(&field.attrs)?;
		if attrs.skip {
			continue;
		}

		let field_name = ident.unraw().to_string();
		let wire_name = attrs
			.rename
			.or(attrs.serde_rename)
			.unwrap_or_else(|| rename_all.map_or_else(|| field_name.clone(), |rule| rule.apply(&field_name)));

		if attrs.ignore {
			ignored.push(wire_name);
			ignored.extend(attrs.aliases);
			continue;
		}
		let aliases = &attrs.aliases;

		defs.push(quote! {
			::partial_dispatch::FieldDef {
				name: #field_name,
				wire_name: #wire_name,
				aliases: &[#(#aliases),*],
			}
		});

		let key_ident = format_ident!("{}", field_name.to_shouty_snake_case());
		let vis = &field.vis;
		let doc = format!("Field key for `{field_name}`.");
		keys.push(quote! {
			#[doc = #doc]
			#vis const #key_ident: ::partial_dispatch::FieldKey<Self> =
				::partial_dispatch::FieldKey::new(#field_name);
		});
	}

	let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

	Ok(quote! {
		impl #impl_generics ::partial_dispatch::Fields for #name #ty_generics #where_clause {
			const FIELDS: &'static [::partial_dispatch::FieldDef] = &[#(#defs),*];
			const IGNORED: &'static [&'static str] = &[#(#ignored),*];
		}

		#[allow(dead_code)]
		impl #impl_generics #name #ty_generics #where_clause {
			#(#keys)*
		}
	})
}

fn container_rename_all(attrs: &[Attribute]) -> syn::Result<Option<RenameRule>> {
	let mut rule = None;
	for meta in serde_metas(attrs)? {
		if meta.path().is_ident("rename_all")
			&& let Some(lit) = deserialize_name(&meta)?
		{
			rule = Some(RenameRule::parse(&lit)?);
		}
	}
	Ok(rule)
}

fn parse_field_attrs(attrs: &[Attribute]) -> syn::Result<FieldAttrs> {
	let mut out = FieldAttrs::default();

	for meta in serde_metas(attrs)? {
		if meta.path().is_ident("rename") {
			if let Some(lit) = deserialize_name(&meta)? {
				out.serde_rename = Some(lit.value());
			}
		} else if meta.path().is_ident("alias") {
			if let Some(lit) = deserialize_name(&meta)? {
				out.aliases.push(lit.value());
			}
		} else if meta.path().is_ident("skip") || meta.path().is_ident("skip_deserializing") {
			out.skip = true;
		}
	}

	for attr in attrs.iter().filter(|attr| attr.path().is_ident("field")) {
		attr.parse_nested_meta(|meta| {
			if meta.path.is_ident("rename") {
				let value: LitStr = meta.value()?.parse()?;
				out.rename = Some(value.value());
				Ok(())
			} else if meta.path.is_ident("alias") {
				let value: LitStr = meta.value()?.parse()?;
				out.aliases.push(value.value());
				Ok(())
			} else if meta.path.is_ident("skip") {
				out.ignore = true;
				Ok(())
			} else {
				Err(meta.error("unknown field attribute"))
			}
		})?;
	}

	Ok(out)
}

/// Flattens every `#[serde(...)]` attribute into its individual items.
fn serde_metas(attrs: &[Attribute]) -> syn::Result<Vec<Meta>> {
	let mut metas = Vec::new();
	for attr in attrs.iter().filter(|attr| attr.path().is_ident("serde")) {
		metas.extend(attr.parse_args_with(Punctuated::<Meta, Token![,]>::parse_terminated)?);
	}
	Ok(metas)
}

/// Reads the deserialize-side name of `key = "..."` or
/// `key(deserialize = "...")`.
fn deserialize_name(meta: &Meta) -> syn::Result<Option<LitStr>> {
	match meta {
		Meta::NameValue(pair) => Ok(str_lit(&pair.value)),
		Meta::List(list) => {
			let nested = list.parse_args_with(Punctuated::<Meta, Token![,]>::parse_terminated)?;
			Ok(nested.iter().find_map(|meta| match meta {
				Meta::NameValue(pair) if pair.path.is_ident("deserialize") => str_lit(&pair.value),
				_ => None,
			}))
		}
		Meta::Path(_) => Ok(None),
	}
}

fn str_lit(expr: &Expr) -> Option<LitStr> {
	match expr {
		Expr::Lit(expr) => match &expr.lit {
			Lit::Str(lit) => Some(lit.clone()),
			_ => None,
		},
		_ => None,
	}
}
