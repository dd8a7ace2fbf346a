use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::gql::error::{ResolverError, SchemaError};

/// An error originating from the gqlite core library.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
	/// The GraphQL schema could not be generated from the database structure
	#[error("Unable to generate the GraphQL schema: {0}")]
	Schema(#[from] SchemaError),

	/// A generated resolver failed while handling a request
	#[error("{0}")]
	Resolver(#[from] ResolverError),

	/// There was a problem with the underlying datastore
	#[error("There was a problem with the datastore: {0}")]
	Ds(#[from] sqlx::Error),

	/// A database or statement file could not be read
	#[error("Unable to read '{}': {source}", path.display())]
	Io {
		path: PathBuf,
		source: io::Error,
	},
}
