//! The storage collaborator behind a generated schema.
//!
//! Schema generation only ever talks to storage through the [`Datastore`]
//! trait: once to introspect the structure of the database, and then once per
//! resolver invocation to read or write rows.

mod sqlite;

use std::fmt::{self, Debug};

use futures::{StreamExt, TryStreamExt, stream};
use indexmap::IndexMap;

pub use self::sqlite::SqliteDatastore;
use crate::catalog::{ColumnInfo, ForeignKeyInfo, TableInfo};
use crate::cnf::INTROSPECTION_CONCURRENCY;
use crate::err::Error;
use crate::gql::error::ResolverError;

/// A single stored value.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
	Null,
	Integer(i64),
	Real(f64),
	Text(String),
	Blob(Vec<u8>),
}

impl Value {
	pub fn is_null(&self) -> bool {
		matches!(self, Value::Null)
	}
}

impl fmt::Display for Value {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match self {
			Self::Null => f.write_str("NULL"),
			Self::Integer(v) => write!(f, "{v}"),
			Self::Real(v) => write!(f, "{v}"),
			Self::Text(v) => write!(f, "'{v}'"),
			Self::Blob(v) => write!(f, "<{} bytes>", v.len()),
		}
	}
}

impl From<i64> for Value {
	fn from(v: i64) -> Self {
		Value::Integer(v)
	}
}

impl From<&str> for Value {
	fn from(v: &str) -> Self {
		Value::Text(v.to_owned())
	}
}

impl From<String> for Value {
	fn from(v: String) -> Self {
		Value::Text(v)
	}
}

/// A stored row, keyed by raw column name in column order.
pub type Row = IndexMap<String, Value>;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Operator {
	Equal,
	NotEqual,
	MoreThan,
	MoreThanOrEqual,
	LessThan,
	LessThanOrEqual,
	Like,
}

impl Operator {
	pub fn as_sql(&self) -> &'static str {
		match self {
			Self::Equal => "=",
			Self::NotEqual => "!=",
			Self::MoreThan => ">",
			Self::MoreThanOrEqual => ">=",
			Self::LessThan => "<",
			Self::LessThanOrEqual => "<=",
			Self::Like => "LIKE",
		}
	}
}

/// A filter predicate over the raw columns of a single table.
#[derive(Clone, Debug, PartialEq)]
pub enum Cond {
	And(Vec<Cond>),
	Or(Vec<Cond>),
	Not(Box<Cond>),
	Compare {
		column: String,
		op: Operator,
		value: Value,
	},
	In {
		column: String,
		values: Vec<Value>,
	},
	IsNull {
		column: String,
		null: bool,
	},
}

impl Cond {
	pub fn eq(column: impl Into<String>, value: Value) -> Self {
		Cond::Compare {
			column: column.into(),
			op: Operator::Equal,
			value,
		}
	}

	/// Combines two predicates, flattening nested conjunctions
	pub fn and(self, other: Cond) -> Self {
		match self {
			Cond::And(mut all) => {
				all.push(other);
				Cond::And(all)
			}
			one => Cond::And(vec![one, other]),
		}
	}
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Direction {
	Asc,
	Desc,
}

/// The filter, sort and pagination of a list read.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Query {
	pub cond: Option<Cond>,
	pub order: Vec<(String, Direction)>,
	pub limit: Option<i64>,
	pub start: Option<i64>,
}

impl Query {
	/// Restricts the query to rows also matching the given predicate
	pub fn with_cond(mut self, cond: Cond) -> Self {
		self.cond = Some(match self.cond.take() {
			Some(existing) => cond.and(existing),
			None => cond,
		});
		self
	}
}

/// A many-to-many traversal through a junction table, from a source table
/// to a target table.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Through {
	/// The junction table
	pub table: String,
	pub source: String,
	/// The primary key column of the source table
	pub source_key: String,
	/// The junction column referencing the source table
	pub source_column: String,
	pub target: String,
	/// The primary key column of the target table
	pub target_key: String,
	/// The junction column referencing the target table
	pub target_column: String,
}

#[async_trait::async_trait]
pub trait Datastore: Debug + Send + Sync + 'static {
	/// Identifies the underlying database, for caching generated schemas
	fn id(&self) -> &str;

	/// Lists the user tables, excluding system tables
	async fn tables(&self) -> Result<Vec<String>, Error>;

	async fn columns(&self, table: &str) -> Result<Vec<ColumnInfo>, Error>;

	async fn foreign_keys(&self, table: &str) -> Result<Vec<ForeignKeyInfo>, Error>;

	async fn find_many(&self, table: &str, query: &Query) -> Result<Vec<Row>, ResolverError>;

	async fn find_one(&self, table: &str, cond: &Cond) -> Result<Option<Row>, ResolverError>;

	async fn create(&self, table: &str, row: Row) -> Result<Row, ResolverError>;

	/// Creates all rows, or none of them
	async fn create_many(&self, table: &str, rows: Vec<Row>) -> Result<Vec<Row>, ResolverError>;

	/// Updates the row matching the condition, returning it when it exists
	async fn update(&self, table: &str, cond: &Cond, changes: Row) -> Result<Option<Row>, ResolverError>;

	/// Deletes the matching rows, returning how many were removed
	async fn delete(&self, table: &str, cond: &Cond) -> Result<u64, ResolverError>;

	/// Fetches the target rows linked to a source row
	async fn find_through(
		&self,
		through: &Through,
		key: &Value,
		query: &Query,
	) -> Result<Vec<Row>, ResolverError>;

	/// Links two rows, returning false when either of them does not exist
	async fn link(&self, through: &Through, source: &Value, target: &Value) -> Result<bool, ResolverError>;

	/// Unlinks two rows, returning false when they were not linked
	async fn unlink(&self, through: &Through, source: &Value, target: &Value)
	-> Result<bool, ResolverError>;
}

/// Collects the metadata of every table in the datastore.
///
/// Tables are introspected concurrently, but the result is only returned
/// once every table has been collected, in the order the datastore listed them.
pub async fn introspect(ds: &dyn Datastore) -> Result<Vec<TableInfo>, Error> {
	let tables = ds.tables().await?;
	trace!(?tables, "introspecting tables");
	stream::iter(tables)
		.map(|name| async move {
			let (columns, foreign_keys) =
				futures::try_join!(ds.columns(&name), ds.foreign_keys(&name))?;
			Ok::<_, Error>(TableInfo {
				name,
				columns,
				foreign_keys,
			})
		})
		.buffered((*INTROSPECTION_CONCURRENCY).max(1))
		.try_collect()
		.await
}
