//! Caller-supplied wrappers around generated root resolvers.
//!
//! A wrapper receives the generated resolver for a query or mutation field
//! and returns a new resolver, which usually runs some code around a call to
//! the one it was given. This is where authorization checks or side effects
//! can be attached to generated fields.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_graphql::dynamic::{Field, FieldFuture, FieldValue, ResolverContext, TypeRef};
use futures::future::BoxFuture;

use super::utils::FieldSet;

/// The future returned by a [`Resolver`].
pub type ResolveFuture<'a> = BoxFuture<'a, async_graphql::Result<Option<FieldValue<'a>>>>;

/// A shareable field resolver.
pub type Resolver = Arc<dyn for<'a> Fn(ResolverContext<'a>) -> ResolveFuture<'a> + Send + Sync>;

type Wrapper = Arc<dyn Fn(Resolver) -> Resolver + Send + Sync>;

/// Boxes a closure as a [`Resolver`].
///
/// ```ignore
/// let resolver = resolver(move |ctx| {
/// 	let next = next.clone();
/// 	async move { next(ctx).await }.boxed()
/// });
/// ```
pub fn resolver<F>(f: F) -> Resolver
where
	F: for<'a> Fn(ResolverContext<'a>) -> ResolveFuture<'a> + Send + Sync + 'static,
{
	Arc::new(f)
}

/// Builds a field served by a [`Resolver`]
pub fn field(name: impl Into<String>, ty: impl Into<TypeRef>, resolver: Resolver) -> Field {
	Field::new(name, ty, move |ctx| FieldFuture::new(resolver(ctx)))
}

#[derive(Clone, Default)]
pub struct Resolvers {
	query: HashMap<String, Wrapper>,
	mutation: HashMap<String, Wrapper>,
}

impl fmt::Debug for Resolvers {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Resolvers")
			.field("query", &self.query.keys().collect::<Vec<_>>())
			.field("mutation", &self.mutation.keys().collect::<Vec<_>>())
			.finish()
	}
}

impl Resolvers {
	pub fn new() -> Self {
		Self::default()
	}

	/// Wraps the resolver of the query field with the given name
	pub fn query<W>(mut self, name: impl Into<String>, wrapper: W) -> Self
	where
		W: Fn(Resolver) -> Resolver + Send + Sync + 'static,
	{
		self.query.insert(name.into(), Arc::new(wrapper));
		self
	}

	/// Wraps the resolver of the mutation field with the given name
	pub fn mutation<W>(mut self, name: impl Into<String>, wrapper: W) -> Self
	where
		W: Fn(Resolver) -> Resolver + Send + Sync + 'static,
	{
		self.mutation.insert(name.into(), Arc::new(wrapper));
		self
	}

	pub(crate) fn wrap_query(&self, name: &str, resolver: Resolver) -> Resolver {
		wrap(&self.query, name, resolver)
	}

	pub(crate) fn wrap_mutation(&self, name: &str, resolver: Resolver) -> Resolver {
		wrap(&self.mutation, name, resolver)
	}

	/// Warns about wrappers which do not match any generated field
	pub(crate) fn check(&self, query: &FieldSet, mutation: &FieldSet) {
		for name in self.query.keys().filter(|n| !query.contains(n)) {
			warn!("No generated query field named `{name}`, the resolver wrapper is unused");
		}
		for name in self.mutation.keys().filter(|n| !mutation.contains(n)) {
			warn!("No generated mutation field named `{name}`, the resolver wrapper is unused");
		}
	}
}

fn wrap(wrappers: &HashMap<String, Wrapper>, name: &str, resolver: Resolver) -> Resolver {
	match wrappers.get(name) {
		Some(wrapper) => {
			trace!("wrapping generated resolver for `{name}`");
			wrapper(resolver)
		}
		None => resolver,
	}
}

#[cfg(test)]
mod tests {
	use std::sync::atomic::{AtomicUsize, Ordering};

	use futures::FutureExt;

	use super::*;

	#[test]
	fn unmatched_names_are_left_alone() {
		let calls = Arc::new(AtomicUsize::new(0));
		let counter = calls.clone();
		let resolvers = Resolvers::new().query("users", move |next| {
			counter.fetch_add(1, Ordering::SeqCst);
			next
		});
		let inner = resolver(|_| async { Ok(None) }.boxed());
		let _ = resolvers.wrap_query("users", inner.clone());
		let _ = resolvers.wrap_query("posts", inner.clone());
		let _ = resolvers.wrap_mutation("users", inner);
		assert_eq!(calls.load(Ordering::SeqCst), 1);
	}

	#[test]
	fn debug_lists_wrapped_names() {
		let resolvers = Resolvers::new().mutation("createUser", |next| next);
		assert_eq!(format!("{resolvers:?}"), r#"Resolvers { query: [], mutation: ["createUser"] }"#);
	}
}
