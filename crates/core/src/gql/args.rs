use async_graphql::dynamic::indexmap::IndexMap;
use async_graphql::dynamic::{InputValue, TypeRef};
use async_graphql::{Name, Value as GqlValue};

use super::error::{ResolverError, invalid_argument};
use super::utils::{gql_to_value, kind_to_type_name};
use crate::catalog::naming::{singularize, to_field_name};
use crate::catalog::{Entity, FieldDefinition};
use crate::dbs::{Row, Value};

/// A generated argument.
#[derive(Clone, Debug)]
pub struct Arg {
	pub name: String,
	pub ty: TypeRef,
}

impl Arg {
	fn new(name: impl Into<String>, ty: TypeRef) -> Self {
		Arg {
			name: name.into(),
			ty,
		}
	}

	fn nullable(fd: &FieldDefinition) -> Self {
		Arg::new(&fd.name, TypeRef::named(kind_to_type_name(fd.kind)))
	}

	fn required(fd: &FieldDefinition) -> Self {
		Arg::new(&fd.name, TypeRef::named_nn(kind_to_type_name(fd.kind)))
	}

	pub fn input(&self) -> InputValue {
		InputValue::new(&self.name, self.ty.clone())
	}
}

/// The arguments of a create mutation.
///
/// A primary key assigned by storage is left out. Any other primary key is
/// accepted but not required, and every other field keeps its nullability.
pub fn create_args(entity: &Entity) -> Vec<Arg> {
	entity
		.fields
		.values()
		.filter(|fd| !fd.auto_increment)
		.map(|fd| {
			if fd.nullable || fd.primary_key {
				Arg::nullable(fd)
			} else {
				Arg::required(fd)
			}
		})
		.collect()
}

/// The arguments of an update mutation, none of them required
pub fn update_args(entity: &Entity) -> Vec<Arg> {
	entity.fields.values().map(Arg::nullable).collect()
}

/// The arguments of a delete mutation, only the required primary key
pub fn delete_args(entity: &Entity) -> Vec<Arg> {
	vec![key_arg(entity)]
}

pub fn key_arg(entity: &Entity) -> Arg {
	Arg::required(&entity.key)
}

/// The arguments of the link mutations between two entities.
///
/// Each side is identified by its own primary key field, except when both
/// keys share a name, in which case the second one is prefixed with the
/// singular name of its entity.
pub fn link_args(entity: &Entity, other: &Entity) -> [Arg; 2] {
	let first = key_arg(entity);
	let mut second = key_arg(other);
	if second.name == first.name {
		second.name = to_field_name(&format!("{}_{}", singularize(&other.table), other.key.column));
	}
	[first, second]
}

/// Collects the values of every argument naming a field of the entity
pub fn row_from_args(args: &IndexMap<Name, GqlValue>, entity: &Entity) -> Result<Row, ResolverError> {
	let mut row = Row::with_capacity(args.len());
	for (name, value) in args {
		if let Some(fd) = entity.fields.get(name.as_str()) {
			row.insert(fd.column.clone(), gql_to_value(fd.kind, value)?);
		}
	}
	Ok(row)
}

/// Reads a required key argument
pub fn key_from_args(
	args: &IndexMap<Name, GqlValue>,
	name: &str,
	fd: &FieldDefinition,
) -> Result<Value, ResolverError> {
	match args.get(name).map(|v| gql_to_value(fd.kind, v)).transpose()? {
		Some(Value::Null) | None => Err(invalid_argument(format!("missing key argument `{name}`"))),
		Some(key) => Ok(key),
	}
}

#[cfg(test)]
mod tests {
	use async_graphql::value;

	use super::*;
	use crate::catalog::ColumnInfo;

	fn column(name: &str, declared: &str, pk: bool, not_null: bool) -> ColumnInfo {
		ColumnInfo {
			name: name.to_owned(),
			declared_type: declared.to_owned(),
			primary_key: pk,
			not_null,
			default_value: None,
		}
	}

	fn posts() -> Entity {
		Entity::build(
			"posts",
			&[
				column("id", "INTEGER", true, true),
				column("title", "TEXT", false, true),
				column("body", "TEXT", false, false),
				column("user_id", "INTEGER", false, true),
			],
		)
		.unwrap()
	}

	fn categories() -> Entity {
		Entity::build("categories", &[column("id", "INTEGER", true, true), column("name", "TEXT", false, true)])
			.unwrap()
	}

	fn signature(args: &[Arg]) -> Vec<String> {
		args.iter().map(|a| format!("{}: {}", a.name, a.ty)).collect()
	}

	#[test]
	fn create_args_leave_out_generated_keys() {
		assert_eq!(signature(&create_args(&posts())), ["title: String!", "body: String", "userId: Int!"]);
	}

	#[test]
	fn create_args_accept_assigned_keys() {
		let tags = Entity::build("tags", &[column("slug", "TEXT", true, true), column("label", "TEXT", false, true)])
			.unwrap();
		assert_eq!(signature(&create_args(&tags)), ["slug: String", "label: String!"]);
	}

	#[test]
	fn update_args_are_never_required() {
		let args = update_args(&posts());
		assert_eq!(args.len(), 4);
		assert!(args.iter().all(|a| !a.ty.to_string().ends_with('!')));
	}

	#[test]
	fn delete_args_are_the_required_key() {
		assert_eq!(signature(&delete_args(&posts())), ["id: Int!"]);
	}

	#[test]
	fn link_args_disambiguate_shared_key_names() {
		assert_eq!(signature(&link_args(&posts(), &categories())), ["id: Int!", "categoryId: Int!"]);
	}

	#[test]
	fn link_args_keep_distinct_key_names() {
		let posts = Entity::build("posts", &[column("postId", "INTEGER", true, true)]).unwrap();
		let categories = Entity::build("categories", &[column("categoryId", "INTEGER", true, true)]).unwrap();
		assert_eq!(signature(&link_args(&posts, &categories)), ["postId: Int!", "categoryId: Int!"]);
	}

	#[test]
	fn rows_are_keyed_by_column() {
		let args = match value!({ "title": "Hello", "userId": 3, "unknown": true, "body": null }) {
			GqlValue::Object(o) => o,
			_ => unreachable!(),
		};
		let row = row_from_args(&args, &posts()).unwrap();
		let columns: Vec<&str> = row.keys().map(String::as_str).collect();
		assert_eq!(columns, ["title", "user_id", "body"]);
		assert_eq!(row["body"], Value::Null);
		assert!(key_from_args(&args, "id", &posts().key).is_err());
	}
}
