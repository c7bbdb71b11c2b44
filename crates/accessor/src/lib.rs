//! Structural accessor introspection.
//!
//! An accessor is a closure such as `|input| input.title` that points at one
//! top-level field of a source type. [`resolve`] and [`resolve_closure`] turn an
//! accessor into the name of that field, and reject anything that computes a
//! value instead of naming a field: method calls, nested paths, arithmetic, or
//! accesses on something other than the closure argument.
//!
//! Parentheses, a single immutable borrow, and a single `as` cast are
//! transparent, so `|input| &input.title` and `|input| input.count as i64`
//! both resolve. So is an explicit deref of the argument, as in
//! `|input| (*input).title`.

use syn::ext::IdentExt;
use syn::{Block, Expr, ExprClosure, ExprPath, Ident, Member, Pat, Stmt, UnOp};

#[cfg(test)]
mod tests;

/// A resolved top-level field access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRef {
	/// Field identifier with any raw identifier prefix stripped.
	///
	/// Tuple fields resolve to their decimal index.
	pub field: String,
	/// Name the closure binds its argument to.
	pub binding: String,
	/// Whether the access was wrapped in a single `as` cast.
	pub widened: bool,
}

/// Why an accessor does not denote a direct field of its argument.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
	#[error("expected a closure such as `|input| input.field`")]
	NotAClosure,
	#[error("accessor must take exactly one argument, found {0}")]
	ParameterCount(usize),
	#[error("accessor argument must be a plain binding")]
	UnsupportedBinding,
	#[error("accessor returns its argument instead of one of its fields")]
	Identity,
	#[error("method call `{0}` is not a field access")]
	MethodCall(String),
	#[error("nested path through `{0}` is not a top-level field")]
	NestedPath(String),
	#[error("computed expression is not a field access")]
	Computed,
	#[error("field is read from `{found}` instead of the accessor argument `{binding}`")]
	ForeignBase { found: String, binding: String },
	#[error("only a single `as` cast may wrap the field access")]
	RepeatedCast,
	#[error("block body must be a single expression")]
	Statements,
	#[error("not a valid Rust expression: {0}")]
	Syntax(String),
	#[error("`{field}` is not a field of `{owner}`")]
	UnknownField { field: String, owner: &'static str },
}

/// An accessor that does not denote a direct top-level field.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid field reference `{accessor}`: {reason}")]
pub struct InvalidFieldReference {
	/// Accessor source text as supplied by the caller.
	pub accessor: String,
	/// What disqualified it.
	pub reason: Rejection,
}

impl InvalidFieldReference {
	pub fn new(accessor: &str, reason: Rejection) -> Self {
		Self {
			accessor: accessor.trim().to_owned(),
			reason,
		}
	}
}

/// Parses `accessor` as a closure expression and resolves the field it reads.
pub fn resolve(accessor: &str) -> Result<FieldRef, InvalidFieldReference> {
	let expr: Expr = syn::parse_str(accessor)
		.map_err(|e| InvalidFieldReference::new(accessor, Rejection::Syntax(e.to_string())))?;
	let Expr::Closure(closure) = strip_groups(&expr) else {
		return Err(InvalidFieldReference::new(accessor, Rejection::NotAClosure));
	};
	resolve_closure(closure).map_err(|reason| InvalidFieldReference::new(accessor, reason))
}

/// Resolves the field read by an already parsed closure.
pub fn resolve_closure(closure: &ExprClosure) -> Result<FieldRef, Rejection> {
	if closure.inputs.len() != 1 {
		return Err(Rejection::ParameterCount(closure.inputs.len()));
	}
	if closure.asyncness.is_some() {
		return Err(Rejection::Computed);
	}
	let binding = binding(&closure.inputs[0])?.unraw().to_string();

	let mut borrowed = false;
	let mut expr = peel(&closure.body, &mut borrowed)?;
	let mut widened = false;
	if let Expr::Cast(cast) = expr {
		widened = true;
		expr = peel(&cast.expr, &mut borrowed)?;
		if matches!(expr, Expr::Cast(_)) {
			return Err(Rejection::RepeatedCast);
		}
	}

	match expr {
		Expr::Field(access) => match deref_base(&access.base) {
			Expr::Path(path) if is_binding(path, &binding) => Ok(FieldRef {
				field: member_name(&access.member),
				binding,
				widened,
			}),
			Expr::Path(path) => Err(Rejection::ForeignBase {
				found: path_string(path),
				binding,
			}),
			Expr::Field(inner) => Err(Rejection::NestedPath(member_name(&inner.member))),
			Expr::MethodCall(call) => Err(Rejection::MethodCall(call.method.to_string())),
			_ => Err(Rejection::Computed),
		},
		Expr::Path(path) if is_binding(path, &binding) => Err(Rejection::Identity),
		Expr::MethodCall(call) => Err(Rejection::MethodCall(call.method.to_string())),
		_ => Err(Rejection::Computed),
	}
}

/// Returns the identifier a closure parameter binds.
///
/// Type ascriptions (`|input: &Input|`) and reference patterns (`|&input|`)
/// are looked through; destructuring patterns are rejected.
pub fn binding(pat: &Pat) -> Result<&Ident, Rejection> {
	match pat {
		Pat::Ident(ident) if ident.subpat.is_none() => Ok(&ident.ident),
		Pat::Type(typed) => binding(&typed.pat),
		Pat::Reference(reference) => binding(&reference.pat),
		Pat::Paren(paren) => binding(&paren.pat),
		_ => Err(Rejection::UnsupportedBinding),
	}
}

/// Strips parentheses, invisible groups, single-expression blocks and at most
/// one immutable borrow across the whole accessor.
fn peel<'a>(mut expr: &'a Expr, borrowed: &mut bool) -> Result<&'a Expr, Rejection> {
	loop {
		expr = match expr {
			Expr::Paren(paren) => &paren.expr,
			Expr::Group(group) => &group.expr,
			Expr::Block(block) if block.label.is_none() => single_expr(&block.block)?,
			Expr::Reference(reference) if reference.mutability.is_none() && !*borrowed => {
				*borrowed = true;
				&reference.expr
			}
			_ => return Ok(expr),
		};
	}
}

fn strip_groups(mut expr: &Expr) -> &Expr {
	loop {
		expr = match expr {
			Expr::Paren(paren) => &paren.expr,
			Expr::Group(group) => &group.expr,
			_ => return expr,
		};
	}
}

/// Base of a field access, looking through one explicit deref: `(*input).title`.
fn deref_base(base: &Expr) -> &Expr {
	match strip_groups(base) {
		Expr::Unary(unary) if matches!(unary.op, UnOp::Deref(_)) => strip_groups(&unary.expr),
		base => base,
	}
}

fn single_expr(block: &Block) -> Result<&Expr, Rejection> {
	match block.stmts.as_slice() {
		[Stmt::Expr(expr, None)] => Ok(expr),
		_ => Err(Rejection::Statements),
	}
}

fn is_binding(path: &ExprPath, binding: &str) -> bool {
	path.qself.is_none() && path.path.get_ident().is_some_and(|ident| ident.unraw() == binding)
}

fn member_name(member: &Member) -> String {
	match member {
		Member::Named(ident) => ident.unraw().to_string(),
		Member::Unnamed(index) => index.index.to_string(),
	}
}

fn path_string(path: &ExprPath) -> String {
	path.path
		.segments
		.iter()
		.map(|segment| segment.ident.to_string())
		.collect::<Vec<_>>()
		.join("::")
}
