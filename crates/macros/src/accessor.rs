use proc_macro::TokenStream;
use quote::quote;
use syn::parse::{Parse, ParseStream};
use syn::{ExprClosure, Token, Type, parse_macro_input};

struct FieldInput {
	source: Type,
	accessor: ExprClosure,
}

impl Parse for FieldInput {
	fn parse(input: ParseStream) -> syn::Result<Self> {
		let source = input.parse()?;
		input.parse::<Token![,]>()?;
		let accessor = input.parse()?;
		input.parse::<Option<Token![,]>>()?;
		Ok(Self { source, accessor })
	}
}

pub fn field(input: TokenStream) -> TokenStream {
	let FieldInput { source, accessor } = parse_macro_input!(input as FieldInput);

	let resolved = match partial_accessor::resolve_closure(&accessor) {
		Ok(resolved) => resolved,
		Err(reason) => {
			return syn::Error::new_spanned(&accessor, format!("invalid field reference: {reason}"))
				.to_compile_error()
				.into();
		}
	};
	// resolve_closure already accepted the binding, so this cannot fail.
	let Ok(binding) = partial_accessor::binding(&accessor.inputs[0]) else {
		return syn::Error::new_spanned(&accessor.inputs, "accessor argument must be a plain binding")
			.to_compile_error()
			.into();
	};
	let body = &accessor.body;
	let name = resolved.field;

	let undeclared = format!("`{name}` is not a declared field of the accessor's source type");

	quote! {{
		let _ = |#binding: &#source| {
			let _ = &(#body);
		};
		const {
			assert!(
				::partial_dispatch::field::declares(<#source as ::partial_dispatch::Fields>::FIELDS, #name),
				#undeclared,
			);
		}
		::partial_dispatch::FieldKey::<#source>::new(#name)
	}}
	.into()
}
