use std::collections::HashSet;

use async_graphql::dynamic::{Field, Object, TypeRef};
use async_graphql::{Number, Value as GqlValue};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use indexmap::IndexMap;

use super::error::{ResolverError, SchemaError, duplicate_field, internal_error, invalid_argument};
use crate::catalog::{FieldDefinition, ScalarKind};
use crate::dbs::{Row, Value};

pub const NUMERIC: &str = "Numeric";
pub const BLOB: &str = "Blob";

pub fn kind_to_type_name(kind: ScalarKind) -> &'static str {
	match kind {
		ScalarKind::Integer => TypeRef::INT,
		ScalarKind::Text => TypeRef::STRING,
		ScalarKind::Real => TypeRef::FLOAT,
		ScalarKind::Boolean => TypeRef::BOOLEAN,
		ScalarKind::Numeric => NUMERIC,
		ScalarKind::Binary => BLOB,
	}
}

/// The output type of a scalar field, non-null unless the column is nullable
pub fn field_type(fd: &FieldDefinition) -> TypeRef {
	let name = kind_to_type_name(fd.kind);
	if fd.nullable {
		TypeRef::named(name)
	} else {
		TypeRef::named_nn(name)
	}
}

/// Converts a stored value into the GraphQL value of a field of the given kind.
pub fn value_to_gql(kind: ScalarKind, value: &Value) -> Result<GqlValue, ResolverError> {
	let out = match value {
		Value::Null => GqlValue::Null,
		Value::Integer(v) if kind == ScalarKind::Boolean => GqlValue::Boolean(*v != 0),
		Value::Integer(v) => GqlValue::Number((*v).into()),
		Value::Real(v) => match Number::from_f64(*v) {
			Some(n) => GqlValue::Number(n),
			None => return Err(internal_error(format!("unable to represent {v} as a number"))),
		},
		Value::Text(v) => GqlValue::String(v.clone()),
		Value::Blob(v) => GqlValue::String(BASE64.encode(v)),
	};
	Ok(out)
}

/// Converts a GraphQL argument into a value that can be bound to a column.
pub fn gql_to_value(kind: ScalarKind, value: &GqlValue) -> Result<Value, ResolverError> {
	let out = match value {
		GqlValue::Null => Value::Null,
		GqlValue::Boolean(b) => Value::Integer(i64::from(*b)),
		GqlValue::Number(n) => match (n.as_i64(), n.as_f64()) {
			(Some(i), _) if kind != ScalarKind::Real => Value::Integer(i),
			(_, Some(f)) => Value::Real(f),
			_ => return Err(invalid_argument(format!("unsupported number {n}"))),
		},
		GqlValue::String(s) => Value::Text(s.clone()),
		GqlValue::Enum(name) => Value::Text(name.to_string()),
		GqlValue::Binary(b) => Value::Blob(b.to_vec()),
		v => {
			return Err(invalid_argument(format!("expected a {kind} value, found {v}")));
		}
	};
	Ok(out)
}

/// Reads the value of a raw column from a parent row
pub fn column_value<'a>(row: &'a Row, column: &str) -> Result<&'a Value, ResolverError> {
	row.get(column).ok_or_else(|| internal_error(format!("column `{column}` missing from row")))
}

/// The fields of one object type, kept by name until the type is finished.
pub struct FieldSet {
	name: String,
	description: Option<String>,
	fields: IndexMap<String, Field>,
}

impl FieldSet {
	pub fn new(name: impl Into<String>) -> Self {
		FieldSet {
			name: name.into(),
			description: None,
			fields: IndexMap::new(),
		}
	}

	pub fn description(mut self, description: impl Into<String>) -> Self {
		self.description = Some(description.into());
		self
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn contains(&self, name: &str) -> bool {
		self.fields.contains_key(name)
	}

	pub fn names(&self) -> impl Iterator<Item = &str> {
		self.fields.keys().map(String::as_str)
	}

	/// Adds a field, failing if the name is already taken on this type
	pub fn insert(&mut self, name: impl Into<String>, field: Field) -> Result<(), SchemaError> {
		let name = name.into();
		if self.fields.contains_key(&name) {
			return Err(duplicate_field(&self.name, name));
		}
		self.fields.insert(name, field);
		Ok(())
	}

	pub fn into_object(self) -> Object {
		let mut object = Object::new(self.name);
		if let Some(description) = self.description {
			object = object.description(description);
		}
		self.fields.into_values().fold(object, Object::field)
	}
}

/// Tracks every type name in a schema so that no two types share one.
#[derive(Debug, Default)]
pub struct TypeNames(HashSet<String>);

impl TypeNames {
	pub fn claim(&mut self, name: impl Into<String>) -> Result<(), SchemaError> {
		let name = name.into();
		if !self.0.insert(name.clone()) {
			return Err(duplicate_field("schema", name));
		}
		Ok(())
	}
}
