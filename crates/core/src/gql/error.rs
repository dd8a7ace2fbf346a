use async_graphql::ErrorExtensions;
use thiserror::Error;

/// Raised while a schema is being built. A build that hits one of these
/// returns no schema at all.
#[derive(Debug, Error)]
pub enum SchemaError {
	#[error("Table '{table}' has no primary key")]
	NoPrimaryKey {
		table: String,
	},
	#[error("Table '{table}' has a composite primary key ({columns}), which is not supported")]
	CompositePrimaryKey {
		table: String,
		columns: String,
	},
	#[error("No table matches the reference '{name}'")]
	UnresolvedEntity {
		name: String,
	},
	#[error("The name '{name}' is defined more than once in '{scope}'")]
	DuplicateField {
		scope: String,
		name: String,
	},
	#[error("Unable to pair the keys of junction table '{table}': {detail}")]
	AmbiguousJunctionKey {
		table: String,
		detail: String,
	},
	#[error("No tables found in database")]
	NoTables,
	#[error("The generated schema is invalid: {0}")]
	Invalid(String),
}

/// Raised by a generated resolver while a request is handled.
#[derive(Debug, Error)]
pub enum ResolverError {
	#[error("No matching record found in '{table}'")]
	NotFound {
		table: String,
	},
	#[error("Storage failure: {0}")]
	StorageFailure(#[from] sqlx::Error),
	#[error("Invalid argument: {0}")]
	InvalidArgument(String),
	#[error("Internal error: {0}")]
	Internal(String),
}

impl ResolverError {
	/// The machine-readable code attached to the GraphQL error
	pub fn code(&self) -> &'static str {
		match self {
			Self::NotFound {
				..
			} => "NOT_FOUND",
			Self::StorageFailure(_) => "STORAGE_FAILURE",
			Self::InvalidArgument(_) => "INVALID_ARGUMENT",
			Self::Internal(_) => "INTERNAL",
		}
	}
}

pub fn not_found(table: impl Into<String>) -> ResolverError {
	ResolverError::NotFound {
		table: table.into(),
	}
}

pub fn invalid_argument(msg: impl Into<String>) -> ResolverError {
	ResolverError::InvalidArgument(msg.into())
}

pub fn internal_error(msg: impl Into<String>) -> ResolverError {
	let msg = msg.into();
	error!("{}", msg);
	ResolverError::Internal(msg)
}

pub fn duplicate_field(scope: impl Into<String>, name: impl Into<String>) -> SchemaError {
	SchemaError::DuplicateField {
		scope: scope.into(),
		name: name.into(),
	}
}

impl ErrorExtensions for ResolverError {
	fn extend(&self) -> async_graphql::Error {
		let code = self.code();
		async_graphql::Error::new(self.to_string()).extend_with(|_, e| e.set("code", code.to_owned()))
	}
}

impl From<ResolverError> for async_graphql::Error {
	fn from(value: ResolverError) -> Self {
		value.extend()
	}
}
