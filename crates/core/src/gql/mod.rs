//! Synthesis of a GraphQL API from an [`EntityModel`](crate::catalog::EntityModel).
//!
//! Every entity becomes an object type with a list field and a single row
//! field on the query root, and create, update and delete fields on the
//! mutation root. Associations become relationship fields on the object
//! types, and many-to-many associations also get link and unlink mutations.

pub mod args;
pub mod cache;
pub mod error;
pub mod filter;
pub mod hooks;
pub mod mutations;
pub mod relations;
pub mod schema;
pub mod tables;
mod utils;

pub use self::cache::{Invalidator, Optimistic, Pessimistic, SchemaCache};
pub use self::error::{ResolverError, SchemaError};
pub use self::hooks::{ResolveFuture, Resolver, Resolvers, resolver};
pub use self::schema::{
	build_schema, build_schema_from_database, build_schema_from_infile, build_schema_from_statements,
	generate_schema,
};
