use std::path::Path;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

use sqlx::query::Query as SqlxQuery;
use sqlx::sqlite::{
	Sqlite, SqliteArguments, SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow,
};
use sqlx::{Column, Row as _, TypeInfo, ValueRef};

use super::{Cond, Datastore, Direction, Query, Row, Through, Value};
use crate::catalog::{ColumnInfo, ForeignKeyInfo};
use crate::err::Error;
use crate::gql::error::ResolverError;

static MEMORY_ID: AtomicU64 = AtomicU64::new(0);

/// A [`Datastore`] over a SQLite database.
#[derive(Debug, Clone)]
pub struct SqliteDatastore {
	id: String,
	pool: SqlitePool,
}

impl SqliteDatastore {
	/// Opens an existing database file.
	pub async fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
		let path = path.as_ref();
		let io = |source| Error::Io {
			path: path.to_path_buf(),
			source,
		};
		if !tokio::fs::try_exists(path).await.map_err(io)? {
			return Err(io(std::io::Error::new(
				std::io::ErrorKind::NotFound,
				"database file does not exist",
			)));
		}
		info!("Opening database file {}", path.display());
		let opts = SqliteConnectOptions::new().filename(path).foreign_keys(true);
		let pool = SqlitePoolOptions::new().connect_with(opts).await?;
		Ok(SqliteDatastore {
			id: path.display().to_string(),
			pool,
		})
	}

	/// Creates an empty in-memory database.
	pub async fn memory() -> Result<Self, Error> {
		let opts = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
		// Every connection to an in-memory database sees its own database
		let pool = SqlitePoolOptions::new()
			.max_connections(1)
			.min_connections(1)
			.idle_timeout(None)
			.max_lifetime(None)
			.connect_with(opts)
			.await?;
		Ok(SqliteDatastore {
			id: format!("memory:{}", MEMORY_ID.fetch_add(1, Ordering::Relaxed)),
			pool,
		})
	}

	/// Creates an in-memory database and runs a batch of statements against it.
	pub async fn from_statements(sql: &str) -> Result<Self, Error> {
		let ds = Self::memory().await?;
		ds.execute_batch(sql).await?;
		Ok(ds)
	}

	/// Creates an in-memory database from a file of statements.
	pub async fn from_infile(path: impl AsRef<Path>) -> Result<Self, Error> {
		let path = path.as_ref();
		let sql = tokio::fs::read_to_string(path).await.map_err(|source| Error::Io {
			path: path.to_path_buf(),
			source,
		})?;
		info!("Loading statements from {}", path.display());
		Self::from_statements(&sql).await
	}

	/// Runs statements separated by a semicolon at the end of a line.
	pub async fn execute_batch(&self, sql: &str) -> Result<(), Error> {
		for statement in split_statements(sql) {
			trace!(statement, "executing statement");
			sqlx::query(statement).execute(&self.pool).await?;
		}
		Ok(())
	}

	pub fn pool(&self) -> &SqlitePool {
		&self.pool
	}
}

/// Splits a batch on `;` followed by a line break, skipping blank statements.
fn split_statements(sql: &str) -> impl Iterator<Item = &str> {
	let mut rest = sql;
	std::iter::from_fn(move || {
		while !rest.is_empty() {
			let (statement, next) = match find_terminator(rest) {
				Some((end, skip)) => (&rest[..end], &rest[end + skip..]),
				None => (rest, ""),
			};
			rest = next;
			let statement = statement.trim();
			if !statement.is_empty() {
				return Some(statement);
			}
		}
		None
	})
}

/// Finds the next `;\n`, `;\r\n` or `;\r`, returning its offset and length
fn find_terminator(sql: &str) -> Option<(usize, usize)> {
	let bytes = sql.as_bytes();
	sql.match_indices(';').find_map(|(i, _)| match bytes.get(i + 1) {
		Some(b'\n') => Some((i, 2)),
		Some(b'\r') if bytes.get(i + 2) == Some(&b'\n') => Some((i, 3)),
		Some(b'\r') => Some((i, 2)),
		_ => None,
	})
}

fn quote(ident: &str) -> String {
	format!("\"{}\"", ident.replace('"', "\"\""))
}

/// A SQL statement with its bound values, rendered with `?` placeholders.
#[derive(Debug, Default)]
struct Sql {
	text: String,
	binds: Vec<Value>,
}

impl Sql {
	fn new(text: impl Into<String>) -> Self {
		Sql {
			text: text.into(),
			binds: Vec::new(),
		}
	}

	fn push(&mut self, text: &str) -> &mut Self {
		self.text.push_str(text);
		self
	}

	fn ident(&mut self, alias: Option<&str>, ident: &str) -> &mut Self {
		if let Some(alias) = alias {
			self.text.push_str(&quote(alias));
			self.text.push('.');
		}
		self.text.push_str(&quote(ident));
		self
	}

	fn bind(&mut self, value: Value) -> &mut Self {
		self.text.push('?');
		self.binds.push(value);
		self
	}

	fn cond(&mut self, alias: Option<&str>, cond: &Cond) -> &mut Self {
		match cond {
			Cond::And(all) if all.is_empty() => self.push("1"),
			Cond::Or(any) if any.is_empty() => self.push("0"),
			Cond::And(conds) | Cond::Or(conds) => {
				let joiner = match cond {
					Cond::And(_) => " AND ",
					_ => " OR ",
				};
				for (i, cond) in conds.iter().enumerate() {
					if i > 0 {
						self.push(joiner);
					}
					self.push("(").cond(alias, cond).push(")");
				}
				self
			}
			Cond::Not(cond) => self.push("NOT (").cond(alias, cond).push(")"),
			Cond::Compare {
				column,
				op,
				value: Value::Null,
			} => {
				let op = match op {
					super::Operator::NotEqual => " IS NOT ",
					_ => " IS ",
				};
				self.ident(alias, column).push(op).push("NULL")
			}
			Cond::Compare {
				column,
				op,
				value,
			} => {
				self.ident(alias, column).push(" ").push(op.as_sql()).push(" ").bind(value.clone())
			}
			Cond::In {
				values,
				..
			} if values.is_empty() => self.push("0"),
			Cond::In {
				column,
				values,
			} => {
				self.ident(alias, column).push(" IN (");
				for (i, value) in values.iter().enumerate() {
					if i > 0 {
						self.push(", ");
					}
					self.bind(value.clone());
				}
				self.push(")")
			}
			Cond::IsNull {
				column,
				null,
			} => self.ident(alias, column).push(if *null {
				" IS NULL"
			} else {
				" IS NOT NULL"
			}),
		}
	}

	/// Appends the filter, sort and pagination clauses of a list read
	fn query(&mut self, alias: Option<&str>, query: &Query, has_where: bool) -> &mut Self {
		if let Some(cond) = &query.cond {
			self.push(if has_where {
				" AND ("
			} else {
				" WHERE ("
			});
			self.cond(alias, cond).push(")");
		}
		for (i, (column, direction)) in query.order.iter().enumerate() {
			self.push(if i == 0 {
				" ORDER BY "
			} else {
				", "
			});
			self.ident(alias, column).push(match direction {
				Direction::Asc => " ASC",
				Direction::Desc => " DESC",
			});
		}
		match (query.limit, query.start) {
			(Some(limit), start) => {
				self.push(" LIMIT ").bind(Value::Integer(limit));
				if let Some(start) = start {
					self.push(" OFFSET ").bind(Value::Integer(start));
				}
			}
			(None, Some(start)) => {
				self.push(" LIMIT -1 OFFSET ").bind(Value::Integer(start));
			}
			(None, None) => {}
		}
		self
	}

	fn build(&self) -> SqlxQuery<'_, Sqlite, SqliteArguments<'_>> {
		trace!(sql = %self.text, binds = ?self.binds, "executing query");
		let mut query = sqlx::query(&self.text);
		for value in &self.binds {
			query = match value {
				Value::Null => query.bind(None::<i64>),
				Value::Integer(v) => query.bind(*v),
				Value::Real(v) => query.bind(*v),
				Value::Text(v) => query.bind(v.as_str()),
				Value::Blob(v) => query.bind(v.as_slice()),
			};
		}
		query
	}
}

fn insert_sql(table: &str, row: &Row) -> Sql {
	let mut sql = Sql::new("INSERT INTO ");
	sql.ident(None, table);
	if row.is_empty() {
		sql.push(" DEFAULT VALUES");
	} else {
		sql.push(" (");
		for (i, column) in row.keys().enumerate() {
			if i > 0 {
				sql.push(", ");
			}
			sql.ident(None, column);
		}
		sql.push(") VALUES (");
		for (i, value) in row.values().enumerate() {
			if i > 0 {
				sql.push(", ");
			}
			sql.bind(value.clone());
		}
		sql.push(")");
	}
	sql.push(" RETURNING *");
	sql
}

fn decode_row(row: &SqliteRow) -> Result<Row, sqlx::Error> {
	let mut out = Row::with_capacity(row.columns().len());
	for column in row.columns() {
		let i = column.ordinal();
		let raw = row.try_get_raw(i)?;
		let value = if raw.is_null() {
			Value::Null
		} else {
			let storage = raw.type_info().name().to_owned();
			match storage.as_str() {
				"INTEGER" | "BOOLEAN" => Value::Integer(row.try_get_unchecked(i)?),
				"REAL" => Value::Real(row.try_get_unchecked(i)?),
				"TEXT" => Value::Text(row.try_get_unchecked(i)?),
				_ => Value::Blob(row.try_get_unchecked(i)?),
			}
		};
		out.insert(column.name().to_owned(), value);
	}
	Ok(out)
}

fn decode_rows(rows: &[SqliteRow]) -> Result<Vec<Row>, ResolverError> {
	rows.iter().map(|r| decode_row(r).map_err(ResolverError::from)).collect()
}

#[async_trait::async_trait]
impl Datastore for SqliteDatastore {
	fn id(&self) -> &str {
		&self.id
	}

	async fn tables(&self) -> Result<Vec<String>, Error> {
		let rows = sqlx::query(
			"SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
		)
		.fetch_all(&self.pool)
		.await?;
		let tables = rows.iter().map(|r| r.try_get::<String, _>("name")).collect::<Result<_, _>>()?;
		Ok(tables)
	}

	async fn columns(&self, table: &str) -> Result<Vec<ColumnInfo>, Error> {
		let rows = sqlx::query(
			r#"SELECT name, type, "notnull", dflt_value, pk FROM pragma_table_info(?) ORDER BY cid"#,
		)
		.bind(table)
		.fetch_all(&self.pool)
		.await?;
		let mut columns = Vec::with_capacity(rows.len());
		for row in rows {
			columns.push(ColumnInfo {
				name: row.try_get("name")?,
				declared_type: row.try_get("type")?,
				primary_key: row.try_get::<i64, _>("pk")? > 0,
				not_null: row.try_get::<i64, _>("notnull")? != 0,
				default_value: row.try_get("dflt_value")?,
			});
		}
		Ok(columns)
	}

	async fn foreign_keys(&self, table: &str) -> Result<Vec<ForeignKeyInfo>, Error> {
		// Only the first column of a composite foreign key is considered
		let rows = sqlx::query(
			r#"SELECT "from", "table" FROM pragma_foreign_key_list(?) WHERE seq = 0 ORDER BY id DESC"#,
		)
		.bind(table)
		.fetch_all(&self.pool)
		.await?;
		let mut keys = Vec::with_capacity(rows.len());
		for row in rows {
			keys.push(ForeignKeyInfo {
				from_column: row.try_get("from")?,
				referenced_table: row.try_get("table")?,
			});
		}
		Ok(keys)
	}

	async fn find_many(&self, table: &str, query: &Query) -> Result<Vec<Row>, ResolverError> {
		let mut sql = Sql::new("SELECT * FROM ");
		sql.ident(None, table).query(None, query, false);
		let rows = sql.build().fetch_all(&self.pool).await?;
		decode_rows(&rows)
	}

	async fn find_one(&self, table: &str, cond: &Cond) -> Result<Option<Row>, ResolverError> {
		let mut sql = Sql::new("SELECT * FROM ");
		sql.ident(None, table).push(" WHERE ").cond(None, cond).push(" LIMIT 1");
		match sql.build().fetch_optional(&self.pool).await? {
			Some(row) => Ok(Some(decode_row(&row)?)),
			None => Ok(None),
		}
	}

	async fn create(&self, table: &str, row: Row) -> Result<Row, ResolverError> {
		let sql = insert_sql(table, &row);
		let row = sql.build().fetch_one(&self.pool).await?;
		Ok(decode_row(&row)?)
	}

	async fn create_many(&self, table: &str, rows: Vec<Row>) -> Result<Vec<Row>, ResolverError> {
		let mut tx = self.pool.begin().await?;
		let mut created = Vec::with_capacity(rows.len());
		for row in &rows {
			let sql = insert_sql(table, row);
			let row = sql.build().fetch_one(&mut *tx).await?;
			created.push(decode_row(&row)?);
		}
		tx.commit().await?;
		Ok(created)
	}

	async fn update(&self, table: &str, cond: &Cond, changes: Row) -> Result<Option<Row>, ResolverError> {
		if changes.is_empty() {
			return self.find_one(table, cond).await;
		}
		let mut sql = Sql::new("UPDATE ");
		sql.ident(None, table).push(" SET ");
		for (i, (column, value)) in changes.into_iter().enumerate() {
			if i > 0 {
				sql.push(", ");
			}
			sql.ident(None, &column).push(" = ").bind(value);
		}
		sql.push(" WHERE ").cond(None, cond).push(" RETURNING *");
		match sql.build().fetch_optional(&self.pool).await? {
			Some(row) => Ok(Some(decode_row(&row)?)),
			None => Ok(None),
		}
	}

	async fn delete(&self, table: &str, cond: &Cond) -> Result<u64, ResolverError> {
		let mut sql = Sql::new("DELETE FROM ");
		sql.ident(None, table).push(" WHERE ").cond(None, cond);
		let done = sql.build().execute(&self.pool).await?;
		Ok(done.rows_affected())
	}

	async fn find_through(
		&self,
		through: &Through,
		key: &Value,
		query: &Query,
	) -> Result<Vec<Row>, ResolverError> {
		let mut sql = Sql::new("SELECT ");
		sql.push(&quote("t"))
			.push(".* FROM ")
			.ident(None, &through.target)
			.push(" AS ")
			.push(&quote("t"))
			.push(" INNER JOIN ")
			.ident(None, &through.table)
			.push(" AS ")
			.push(&quote("j"))
			.push(" ON ")
			.ident(Some("j"), &through.target_column)
			.push(" = ")
			.ident(Some("t"), &through.target_key)
			.push(" WHERE ")
			.ident(Some("j"), &through.source_column)
			.push(" = ")
			.bind(key.clone())
			.query(Some("t"), query, true);
		let rows = sql.build().fetch_all(&self.pool).await?;
		decode_rows(&rows)
	}

	async fn link(&self, through: &Through, source: &Value, target: &Value) -> Result<bool, ResolverError> {
		let mut sql = Sql::new("INSERT INTO ");
		sql.ident(None, &through.table)
			.push(" (")
			.ident(None, &through.source_column)
			.push(", ")
			.ident(None, &through.target_column)
			.push(") SELECT ")
			.bind(source.clone())
			.push(", ")
			.bind(target.clone())
			.push(" WHERE EXISTS (SELECT 1 FROM ")
			.ident(None, &through.source)
			.push(" WHERE ")
			.ident(None, &through.source_key)
			.push(" = ")
			.bind(source.clone())
			.push(") AND EXISTS (SELECT 1 FROM ")
			.ident(None, &through.target)
			.push(" WHERE ")
			.ident(None, &through.target_key)
			.push(" = ")
			.bind(target.clone())
			.push(")");
		let done = sql.build().execute(&self.pool).await?;
		Ok(done.rows_affected() > 0)
	}

	async fn unlink(&self, through: &Through, source: &Value, target: &Value)
	-> Result<bool, ResolverError> {
		let mut sql = Sql::new("DELETE FROM ");
		sql.ident(None, &through.table)
			.push(" WHERE ")
			.cond(
				None,
				&Cond::eq(&through.source_column, source.clone())
					.and(Cond::eq(&through.target_column, target.clone())),
			);
		let done = sql.build().execute(&self.pool).await?;
		Ok(done.rows_affected() > 0)
	}
}

#[cfg(test)]
mod tests {
	use test_log::test;

	use super::*;
	use crate::dbs::Operator;

	#[test]
	fn statements_are_split_on_line_ends() {
		let sql = "CREATE TABLE a (id INTEGER PRIMARY KEY);\nINSERT INTO a VALUES (1);\r\n\n;\rINSERT INTO a VALUES ('x;y')";
		let statements: Vec<&str> = split_statements(sql).collect();
		assert_eq!(
			statements,
			[
				"CREATE TABLE a (id INTEGER PRIMARY KEY)",
				"INSERT INTO a VALUES (1)",
				"INSERT INTO a VALUES ('x;y')"
			]
		);
	}

	#[test]
	fn identifiers_are_quoted() {
		assert_eq!(quote("users"), "\"users\"");
		assert_eq!(quote("we\"ird"), "\"we\"\"ird\"");
	}

	#[test]
	fn conditions_render_with_placeholders() {
		let cond = Cond::And(vec![
			Cond::eq("user_id", Value::Integer(1)),
			Cond::Or(vec![
				Cond::Compare {
					column: "title".to_owned(),
					op: Operator::Like,
					value: Value::Text("%rust%".to_owned()),
				},
				Cond::Not(Box::new(Cond::IsNull {
					column: "body".to_owned(),
					null: true,
				})),
			]),
			Cond::In {
				column: "id".to_owned(),
				values: vec![Value::Integer(1), Value::Integer(2)],
			},
			Cond::Compare {
				column: "deleted_at".to_owned(),
				op: Operator::Equal,
				value: Value::Null,
			},
		]);
		let mut sql = Sql::default();
		sql.cond(None, &cond);
		assert_eq!(
			sql.text,
			r#"("user_id" = ?) AND (("title" LIKE ?) OR (NOT ("body" IS NULL))) AND ("id" IN (?, ?)) AND ("deleted_at" IS NULL)"#
		);
		assert_eq!(sql.binds.len(), 4);
	}

	#[test]
	fn empty_conditions_are_constant() {
		let mut sql = Sql::default();
		sql.cond(None, &Cond::And(vec![])).push(" ").cond(None, &Cond::In {
			column: "id".to_owned(),
			values: vec![],
		});
		assert_eq!(sql.text, "1 0");
	}

	#[test]
	fn list_clauses() {
		let query = Query {
			cond: Some(Cond::eq("a", Value::Integer(1))),
			order: vec![("a".to_owned(), Direction::Desc), ("b".to_owned(), Direction::Asc)],
			limit: None,
			start: Some(5),
		};
		let mut sql = Sql::new("SELECT * FROM ");
		sql.ident(None, "t").query(Some("t"), &query, false);
		assert_eq!(
			sql.text,
			r#"SELECT * FROM "t" WHERE ("t"."a" = ?) ORDER BY "t"."a" DESC, "t"."b" ASC LIMIT -1 OFFSET ?"#
		);
		assert_eq!(sql.binds, [Value::Integer(1), Value::Integer(5)]);
	}

	#[test]
	fn empty_inserts_use_defaults() {
		let sql = insert_sql("things", &Row::new());
		assert_eq!(sql.text, r#"INSERT INTO "things" DEFAULT VALUES RETURNING *"#);
	}

	#[test(tokio::test)]
	async fn introspection() {
		let ds = SqliteDatastore::from_statements(
			"CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT NOT NULL, role TEXT NOT NULL DEFAULT 'member');
			CREATE TABLE posts (id INTEGER PRIMARY KEY, title VARCHAR(80), user_id INTEGER REFERENCES users(id));",
		)
		.await
		.unwrap();
		assert_eq!(ds.tables().await.unwrap(), ["posts", "users"]);
		let columns = ds.columns("users").await.unwrap();
		let names: Vec<&str> = columns.iter().map(|c| c.name.as_str()).collect();
		assert_eq!(names, ["id", "name", "role"]);
		assert!(columns[0].primary_key);
		assert!(columns[1].not_null);
		assert_eq!(columns[2].default_value.as_deref(), Some("'member'"));
		assert_eq!(columns[1].declared_type, "TEXT");
		let fks = ds.foreign_keys("posts").await.unwrap();
		assert_eq!(
			fks,
			[ForeignKeyInfo {
				from_column: "user_id".to_owned(),
				referenced_table: "users".to_owned(),
			}]
		);
		assert!(ds.foreign_keys("users").await.unwrap().is_empty());
	}

	#[test(tokio::test)]
	async fn crud() {
		let ds = SqliteDatastore::from_statements(
			"CREATE TABLE notes (id INTEGER PRIMARY KEY, body TEXT, score REAL, data BLOB);",
		)
		.await
		.unwrap();
		let mut row = Row::new();
		row.insert("body".to_owned(), Value::Text("hello".to_owned()));
		row.insert("score".to_owned(), Value::Real(1.5));
		row.insert("data".to_owned(), Value::Blob(vec![1, 2, 3]));
		let created = ds.create("notes", row).await.unwrap();
		assert_eq!(created["id"], Value::Integer(1));
		assert_eq!(created["data"], Value::Blob(vec![1, 2, 3]));

		let found = ds.find_one("notes", &Cond::eq("id", Value::Integer(1))).await.unwrap().unwrap();
		assert_eq!(found["body"], Value::Text("hello".to_owned()));
		assert_eq!(found["score"], Value::Real(1.5));

		let mut changes = Row::new();
		changes.insert("body".to_owned(), Value::Null);
		let updated = ds.update("notes", &Cond::eq("id", Value::Integer(1)), changes).await.unwrap();
		assert_eq!(updated.unwrap()["body"], Value::Null);
		let missing = ds.update("notes", &Cond::eq("id", Value::Integer(9)), Row::new()).await.unwrap();
		assert!(missing.is_none());

		assert_eq!(ds.delete("notes", &Cond::eq("id", Value::Integer(9))).await.unwrap(), 0);
		assert_eq!(ds.delete("notes", &Cond::eq("id", Value::Integer(1))).await.unwrap(), 1);
		assert!(ds.find_many("notes", &Query::default()).await.unwrap().is_empty());
	}

	#[test(tokio::test)]
	async fn bulk_create_is_atomic() {
		let ds = SqliteDatastore::from_statements(
			"CREATE TABLE tags (id INTEGER PRIMARY KEY, name TEXT NOT NULL UNIQUE);",
		)
		.await
		.unwrap();
		let tag = |name: &str| {
			let mut row = Row::new();
			row.insert("name".to_owned(), Value::Text(name.to_owned()));
			row
		};
		let err = ds.create_many("tags", vec![tag("a"), tag("b"), tag("a")]).await.unwrap_err();
		assert!(matches!(err, ResolverError::StorageFailure(_)));
		assert!(ds.find_many("tags", &Query::default()).await.unwrap().is_empty());
		let created = ds.create_many("tags", vec![tag("a"), tag("b")]).await.unwrap();
		assert_eq!(created.len(), 2);
	}

	#[test(tokio::test)]
	async fn junction_traversal() {
		let ds = SqliteDatastore::from_statements(
			"CREATE TABLE posts (id INTEGER PRIMARY KEY, title TEXT);
			CREATE TABLE tags (id INTEGER PRIMARY KEY, name TEXT);
			CREATE TABLE post_tag (post_id INTEGER, tag_id INTEGER);
			INSERT INTO posts VALUES (1, 'one');
			INSERT INTO tags VALUES (1, 'rust'), (2, 'sql');",
		)
		.await
		.unwrap();
		let through = Through {
			table: "post_tag".to_owned(),
			source: "posts".to_owned(),
			source_key: "id".to_owned(),
			source_column: "post_id".to_owned(),
			target: "tags".to_owned(),
			target_key: "id".to_owned(),
			target_column: "tag_id".to_owned(),
		};
		let post = Value::Integer(1);
		assert!(ds.link(&through, &post, &Value::Integer(1)).await.unwrap());
		assert!(ds.link(&through, &post, &Value::Integer(2)).await.unwrap());
		assert!(!ds.link(&through, &post, &Value::Integer(3)).await.unwrap());
		let query = Query {
			order: vec![("name".to_owned(), Direction::Desc)],
			..Default::default()
		};
		let tags = ds.find_through(&through, &post, &query).await.unwrap();
		let names: Vec<&Value> = tags.iter().map(|t| &t["name"]).collect();
		assert_eq!(names, [&Value::Text("sql".to_owned()), &Value::Text("rust".to_owned())]);
		assert!(ds.unlink(&through, &post, &Value::Integer(2)).await.unwrap());
		assert!(!ds.unlink(&through, &post, &Value::Integer(2)).await.unwrap());
		assert_eq!(ds.find_through(&through, &post, &Query::default()).await.unwrap().len(), 1);
	}

	#[test(tokio::test)]
	async fn missing_database_file() {
		let dir = tempfile::tempdir().unwrap();
		let err = SqliteDatastore::open(dir.path().join("missing.sqlite")).await.unwrap_err();
		assert!(matches!(err, Error::Io { .. }));
	}

	#[test(tokio::test)]
	async fn database_file() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("test.sqlite");
		std::fs::File::create(&path).unwrap();
		let ds = SqliteDatastore::open(&path).await.unwrap();
		ds.execute_batch("CREATE TABLE things (id INTEGER PRIMARY KEY);").await.unwrap();
		assert_eq!(ds.tables().await.unwrap(), ["things"]);
		assert_eq!(ds.id(), path.display().to_string());
	}
}
