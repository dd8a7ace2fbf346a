use indexmap::IndexMap;

use super::ColumnInfo;
use super::kind::{ScalarKind, map_type};
use super::naming::{to_field_name, to_type_name};
use crate::gql::error::SchemaError;

/// A single column exposed as a GraphQL field.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FieldDefinition {
	/// The normalized field name
	pub name: String,
	/// The raw column name in the database
	pub column: String,
	pub kind: ScalarKind,
	pub primary_key: bool,
	pub nullable: bool,
	pub auto_increment: bool,
	pub default_value: Option<String>,
}

impl FieldDefinition {
	pub fn new(column: &ColumnInfo) -> Self {
		let kind = map_type(&column.declared_type);
		FieldDefinition {
			name: to_field_name(&column.name),
			column: column.name.clone(),
			kind,
			primary_key: column.primary_key,
			nullable: !column.not_null || column.default_value.is_some(),
			auto_increment: kind == ScalarKind::Integer && column.primary_key,
			default_value: column.default_value.clone(),
		}
	}
}

/// Builds the field definitions of a table, keyed by normalized field name
/// and kept in declaration order.
pub fn build_definitions(
	table: &str,
	columns: &[ColumnInfo],
) -> Result<IndexMap<String, FieldDefinition>, SchemaError> {
	let mut fields = IndexMap::with_capacity(columns.len());
	for column in columns {
		let field = FieldDefinition::new(column);
		if let Some(existing) = fields.get(&field.name) {
			let existing: &FieldDefinition = existing;
			return Err(SchemaError::DuplicateField {
				scope: table.to_owned(),
				name: format!(
					"{} (from columns '{}' and '{}')",
					field.name, existing.column, field.column
				),
			});
		}
		fields.insert(field.name.clone(), field);
	}
	Ok(fields)
}

/// A table-backed object with an independent identity.
#[derive(Clone, Debug)]
pub struct Entity {
	pub table: String,
	pub type_name: String,
	pub fields: IndexMap<String, FieldDefinition>,
	/// The single primary key field, also present in `fields`
	pub key: FieldDefinition,
}

impl Entity {
	pub fn build(table: &str, columns: &[ColumnInfo]) -> Result<Self, SchemaError> {
		let fields = build_definitions(table, columns)?;
		let mut keys = fields.values().filter(|f| f.primary_key);
		let key = match (keys.next(), keys.next()) {
			(Some(key), None) => key.clone(),
			(None, _) => {
				return Err(SchemaError::NoPrimaryKey {
					table: table.to_owned(),
				});
			}
			(Some(_), Some(_)) => {
				return Err(SchemaError::CompositePrimaryKey {
					table: table.to_owned(),
					columns: fields
						.values()
						.filter(|f| f.primary_key)
						.map(|f| f.column.clone())
						.collect::<Vec<_>>()
						.join(", "),
				});
			}
		};
		Ok(Entity {
			table: table.to_owned(),
			type_name: to_type_name(table),
			fields,
			key,
		})
	}

	/// Looks up a field by its raw column name
	pub fn field_by_column(&self, column: &str) -> Option<&FieldDefinition> {
		self.fields.values().find(|f| f.column == column)
	}
}
